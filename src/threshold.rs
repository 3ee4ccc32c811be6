//! Tripping thresholds and their mutex-guarded store.
//!
//! The threshold pair is the only datum mutated by two different tasks:
//! the configuration collaborator writes it, the load manager reads a
//! snapshot once per decision cycle. Both fields must move together — a
//! reader must never observe a half-updated pair — so access goes
//! through a blocking critical-section mutex whose acquisition cannot
//! fail.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use serde::{Deserialize, Serialize};

/// The relay's tripping limits.
///
/// The RoC ceiling is stored in tenths of Hz/s so operator-entered
/// values compare without floating drift (310 tenths = 31.0 Hz/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Frequency floor (Hz); readings below it trip the relay.
    pub frequency_floor_hz: f64,
    /// Absolute RoC ceiling in tenths of Hz/s.
    pub roc_ceiling_tenths: i32,
}

impl Threshold {
    /// Boot-time thresholds: 30.0 Hz floor, 30.0 Hz/s ceiling.
    pub const DEFAULT: Self = Self {
        frequency_floor_hz: 30.0,
        roc_ceiling_tenths: 300,
    };
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shared store for the threshold pair.
///
/// `set` and `get` each hold the mutex for the duration of the whole
/// pair update/snapshot, so interleaved partial updates are
/// unrepresentable.
pub struct ThresholdStore {
    inner: CriticalSectionMutex<RefCell<Threshold>>,
}

impl ThresholdStore {
    pub const fn new(initial: Threshold) -> Self {
        Self {
            inner: CriticalSectionMutex::new(RefCell::new(initial)),
        }
    }

    /// Replace both fields atomically.
    pub fn set(&self, threshold: Threshold) {
        self.inner.lock(|cell| *cell.borrow_mut() = threshold);
    }

    /// Snapshot both fields atomically.
    pub fn get(&self) -> Threshold {
        self.inner.lock(|cell| *cell.borrow())
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(Threshold::DEFAULT)
    }
}
