//! Threshold-guarded trip test.
//!
//! A derived record trips the relay when the frequency sags below the
//! floor or the rate of change leaves the symmetric ceiling band. RoC is
//! compared in tenths of Hz/s so the operator-entered integer threshold
//! is matched without round-tripping it through a float.

use crate::deriver::DerivedRecord;
use crate::threshold::Threshold;

/// Which limit a record violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCause {
    /// Frequency below the floor.
    UnderFrequency,
    /// |RoC| above the ceiling.
    RocExcursion,
}

/// Test one record against the current thresholds.
///
/// Under-frequency takes precedence when both limits are violated; the
/// relay only needs one cause to act on.
pub fn assess(record: &DerivedRecord, threshold: &Threshold) -> Option<TripCause> {
    if record.frequency < threshold.frequency_floor_hz {
        return Some(TripCause::UnderFrequency);
    }

    let roc_tenths = record.roc * 10.0;
    let ceiling = f64::from(threshold.roc_ceiling_tenths);
    if roc_tenths > ceiling || roc_tenths < -ceiling {
        return Some(TripCause::RocExcursion);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(frequency: f64, roc: f64) -> DerivedRecord {
        DerivedRecord {
            frequency,
            roc,
            timestamp: 0,
        }
    }

    const T: Threshold = Threshold::DEFAULT; // 30.0 Hz floor, 300 tenths

    #[test]
    fn nominal_record_does_not_trip() {
        assert_eq!(assess(&record(50.0, 0.5), &T), None);
    }

    #[test]
    fn under_frequency_trips() {
        assert_eq!(
            assess(&record(29.9, 0.0), &T),
            Some(TripCause::UnderFrequency)
        );
    }

    #[test]
    fn frequency_exactly_at_floor_is_healthy() {
        assert_eq!(assess(&record(30.0, 0.0), &T), None);
    }

    #[test]
    fn roc_excursion_trips_both_directions() {
        assert_eq!(assess(&record(50.0, 30.1), &T), Some(TripCause::RocExcursion));
        assert_eq!(
            assess(&record(50.0, -30.1), &T),
            Some(TripCause::RocExcursion)
        );
    }

    #[test]
    fn roc_exactly_at_ceiling_is_healthy() {
        assert_eq!(assess(&record(50.0, 30.0), &T), None);
        assert_eq!(assess(&record(50.0, -30.0), &T), None);
    }

    #[test]
    fn under_frequency_wins_over_roc() {
        assert_eq!(
            assess(&record(10.0, 99.0), &T),
            Some(TripCause::UnderFrequency)
        );
    }

    #[test]
    fn tightened_thresholds_apply_immediately() {
        let tight = Threshold {
            frequency_floor_hz: 49.0,
            roc_ceiling_tenths: 5,
        };
        assert_eq!(
            assess(&record(48.5, 0.0), &tight),
            Some(TripCause::UnderFrequency)
        );
        assert_eq!(
            assess(&record(50.0, 0.6), &tight),
            Some(TripCause::RocExcursion)
        );
    }
}
