//! Rate-of-change derivation task.
//!
//! Consumes raw [`Sample`]s and emits [`DerivedRecord`]s carrying the
//! frequency, its rate of change, and the original capture timestamp.
//! The RoC between consecutive samples is normalised by their harmonic
//! mean, matching how per-unit rate-of-change is conventionally
//! expressed on a power system:
//!
//! ```text
//! roc = (f_new − f_old) · 2 / (1/f_new + 1/f_old)
//! ```
//!
//! The first sample ever received only seeds the "previous" slot — no
//! RoC exists for a single point. Zero-frequency samples would divide by
//! zero; they are treated as a fault and skipped without touching the
//! previous value.

use core::sync::atomic::{AtomicU32, Ordering};

use log::warn;

use crate::app::ports::RecordSource;
use crate::error::SampleError;
use crate::queue::SpscRing;
use crate::sampler::{Sample, poll_sample};

/// One slot more than the required capacity of 50 (see [`SpscRing`]).
const RECORD_QUEUE_SLOTS: usize = 51;

/// A frequency reading paired with its derived rate of change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRecord {
    /// Line frequency (Hz).
    pub frequency: f64,
    /// Harmonic-mean-weighted rate of change (Hz/s).
    pub roc: f64,
    /// Capture tick of the underlying sample.
    pub timestamp: u64,
}

impl DerivedRecord {
    const EMPTY: Self = Self {
        frequency: 0.0,
        roc: 0.0,
        timestamp: 0,
    };
}

// Producer: RoC deriver task. Consumer: load manager task.
static RECORD_QUEUE: SpscRing<DerivedRecord, RECORD_QUEUE_SLOTS> =
    SpscRing::new(DerivedRecord::EMPTY);
static DROPPED_RECORDS: AtomicU32 = AtomicU32::new(0);

/// Dequeue one derived record, if any.
pub fn poll_record() -> Option<DerivedRecord> {
    RECORD_QUEUE.pop()
}

/// Records lost to queue overflow since boot.
pub fn dropped_record_count() -> u32 {
    DROPPED_RECORDS.load(Ordering::Relaxed)
}

/// Production [`RecordSource`] backed by the static record queue.
pub struct QueueRecordSource;

impl RecordSource for QueueRecordSource {
    fn poll(&mut self) -> Option<DerivedRecord> {
        poll_record()
    }
}

// ---------------------------------------------------------------------------
// Deriver
// ---------------------------------------------------------------------------

/// Stateful sample-to-record converter.
pub struct RocDeriver {
    /// Frequency of the previously accepted sample.
    prev_frequency: Option<f64>,
    /// Zero-frequency samples rejected so far.
    zero_frequency_faults: u32,
}

impl RocDeriver {
    pub fn new() -> Self {
        Self {
            prev_frequency: None,
            zero_frequency_faults: 0,
        }
    }

    /// Feed one sample. Emits a record for every sample after the first
    /// valid one; `n` accepted samples yield exactly `n − 1` records.
    pub fn ingest(&mut self, sample: Sample) -> Option<DerivedRecord> {
        if sample.frequency == 0.0 {
            self.zero_frequency_faults += 1;
            warn!(
                "deriver: {} at tick {} skipped",
                SampleError::ZeroFrequency,
                sample.timestamp
            );
            return None;
        }

        let f_new = sample.frequency;
        let Some(f_old) = self.prev_frequency.replace(f_new) else {
            return None; // Bootstrap: no RoC for a single point.
        };

        let roc = ((f_new - f_old) * 2.0) / ((1.0 / f_new) + (1.0 / f_old));
        Some(DerivedRecord {
            frequency: f_new,
            roc,
            timestamp: sample.timestamp,
        })
    }

    /// One deriver task cycle: poll the sample queue once and publish
    /// the derived record, if any. Returns the record for telemetry.
    pub fn service_queues(&mut self) -> Option<DerivedRecord> {
        let record = self.ingest(poll_sample()?)?;
        if !RECORD_QUEUE.push(record) {
            DROPPED_RECORDS.fetch_add(1, Ordering::Relaxed);
        }
        Some(record)
    }

    /// Zero-frequency samples rejected so far.
    pub fn fault_count(&self) -> u32 {
        self.zero_frequency_faults
    }
}
