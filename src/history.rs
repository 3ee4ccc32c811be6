//! Newest-first rolling history for display/telemetry.
//!
//! Capacity 50. Insertion is O(1) into a circular buffer with an
//! explicit head index; [`snapshot`](HistoryBuffer::snapshot) reads out
//! newest-first, so index 0 of the snapshot is always the most recent
//! value and the oldest entry falls off once the buffer is full.

use heapless::Vec;

/// Retained depth of each history (frequency, RoC).
pub const HISTORY_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: [f64; HISTORY_DEPTH],
    /// Index of the most recent entry (valid only when `count > 0`).
    head: usize,
    count: usize,
}

impl HistoryBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0.0; HISTORY_DEPTH],
            head: 0,
            count: 0,
        }
    }

    /// Insert a value as the new most-recent entry, evicting the oldest
    /// once the buffer holds [`HISTORY_DEPTH`] values.
    pub fn push(&mut self, value: f64) {
        self.head = (self.head + HISTORY_DEPTH - 1) % HISTORY_DEPTH;
        self.buf[self.head] = value;
        if self.count < HISTORY_DEPTH {
            self.count += 1;
        }
    }

    /// Most recent value, if any.
    pub fn latest(&self) -> Option<f64> {
        (self.count > 0).then(|| self.buf[self.head])
    }

    /// Number of values currently retained.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy out the retained values, newest first.
    pub fn snapshot(&self) -> Vec<f64, HISTORY_DEPTH> {
        let mut out = Vec::new();
        for i in 0..self.count {
            // Capacity equals HISTORY_DEPTH, push cannot fail.
            let _ = out.push(self.buf[(self.head + i) % HISTORY_DEPTH]);
        }
        out
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
