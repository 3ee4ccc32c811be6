//! Frequency sample capture — the interrupt side of the pipeline.
//!
//! The frequency analyser raises an interrupt once per measurement; the
//! handler inverts the raw period counter into a frequency, stamps it
//! with the current tick count, and enqueues it without blocking. This
//! is the only interrupt-context code in the core: O(1), allocation-free,
//! and it never waits on a consumer.
//!
//! The queue is a static so the capture routine can be registered as a
//! bare interrupt callback. Overflow drops the new sample and bumps a
//! diagnostic counter.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::queue::SpscRing;

/// Analyser calibration: `frequency = CALIBRATION / raw_count`.
pub const ANALYSER_CALIBRATION: f64 = 16_000.0;

/// One slot more than the required capacity of 100 (see [`SpscRing`]).
const SAMPLE_QUEUE_SLOTS: usize = 101;

/// A single frequency measurement, produced once per analyser interrupt
/// and consumed exactly once by the RoC deriver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Measured line frequency (Hz).
    pub frequency: f64,
    /// Tick count at capture time.
    pub timestamp: u64,
}

impl Sample {
    const EMPTY: Self = Self {
        frequency: 0.0,
        timestamp: 0,
    };
}

// Producer: sampling interrupt. Consumer: RoC deriver task.
static SAMPLE_QUEUE: SpscRing<Sample, SAMPLE_QUEUE_SLOTS> = SpscRing::new(Sample::EMPTY);
static DROPPED_SAMPLES: AtomicU32 = AtomicU32::new(0);

/// Interrupt handler body: convert a raw analyser count into a sample
/// and enqueue it. A zero count has no period to invert and is skipped.
///
/// Returns `true` if the sample was enqueued.
pub fn capture_sample(raw_count: u32, now_ticks: u64) -> bool {
    if raw_count == 0 {
        DROPPED_SAMPLES.fetch_add(1, Ordering::Relaxed);
        return false;
    }

    let sample = Sample {
        frequency: ANALYSER_CALIBRATION / f64::from(raw_count),
        timestamp: now_ticks,
    };

    if SAMPLE_QUEUE.push(sample) {
        true
    } else {
        DROPPED_SAMPLES.fetch_add(1, Ordering::Relaxed);
        false
    }
}

/// Dequeue one sample, if any. Called by the RoC deriver task; never
/// blocks — `None` just means "no data this cycle".
pub fn poll_sample() -> Option<Sample> {
    SAMPLE_QUEUE.pop()
}

/// Samples lost to queue overflow or a zero analyser count since boot.
pub fn dropped_sample_count() -> u32 {
    DROPPED_SAMPLES.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the static queue sees one orderly producer/consumer;
    // parallel test threads must not interleave on it.
    #[test]
    fn capture_and_poll_through_static_queue() {
        // Drain anything a previous run left behind.
        while poll_sample().is_some() {}

        assert!(capture_sample(320, 7)); // 16000 / 320 = 50 Hz
        assert!(capture_sample(400, 27)); // 40 Hz
        assert!(!capture_sample(0, 47), "zero count must be rejected");

        let first = poll_sample().unwrap();
        assert!((first.frequency - 50.0).abs() < 1e-9);
        assert_eq!(first.timestamp, 7);

        let second = poll_sample().unwrap();
        assert!((second.frequency - 40.0).abs() < 1e-9);
        assert_eq!(second.timestamp, 27);

        assert_eq!(poll_sample(), None);
        assert!(dropped_sample_count() >= 1);
    }
}
