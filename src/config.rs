//! System configuration parameters
//!
//! All tunable parameters for the relay. One tick is one millisecond,
//! matching the sampling hardware's tick counter.

use serde::{Deserialize, Serialize};

/// Core relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    // --- Thresholds (initial values for the threshold store) ---
    /// Frequency floor (Hz) below which a reading trips the relay
    pub frequency_floor_hz: f64,
    /// Rate-of-change ceiling, in tenths of Hz/s (300 = 30.0 Hz/s)
    pub roc_ceiling_tenths: i32,

    // --- Stability observation ---
    /// Hysteresis window: how long a condition must persist or clear
    /// before the relay sheds again or reconnects (ticks)
    pub stability_window_ticks: u64,

    // --- Timing ---
    /// Load manager polling period (ticks)
    pub manager_period_ticks: u64,
    /// RoC deriver polling period (ticks) — matches the physical
    /// sampling interval so the deriver never falls behind
    pub deriver_period_ticks: u64,
    /// Telemetry report period (ticks)
    pub telemetry_period_ticks: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            // Thresholds: 30.0 Hz floor, 30.0 Hz/s ceiling
            frequency_floor_hz: 30.0,
            roc_ceiling_tenths: 300,

            // Stability
            stability_window_ticks: 500, // 500 ms

            // Timing
            manager_period_ticks: 10, // 2x the sampling rate
            deriver_period_ticks: 20,
            telemetry_period_ticks: 1000,
        }
    }
}
