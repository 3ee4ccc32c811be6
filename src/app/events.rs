//! Outbound application events.
//!
//! The [`RelayService`](super::service::RelayService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them — log to serial, paint a
//! status page, record them in a test.

use crate::fsm::StateId;
use crate::reaction::ReactionStats;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The relay shed a load (carries its index).
    LoadShed(usize),

    /// The relay restored a load (carries its index).
    LoadReconnected(usize),

    /// The relay's view of grid stability flipped.
    StabilityChanged { stable: bool },

    /// The tripping thresholds were replaced.
    ThresholdChanged {
        frequency_floor_hz: f64,
        roc_ceiling_tenths: i32,
    },

    /// The application service has started (carries initial state).
    Started(StateId),
}

/// A point-in-time telemetry snapshot suitable for logging or display.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub state: StateId,
    /// Whether the last threshold verdict found the grid stable.
    pub stable: bool,
    /// Newest measured frequency (Hz), if any sample has arrived.
    pub frequency_hz: Option<f64>,
    /// Newest rate of change (Hz/s), if any record has been derived.
    pub roc_hz_per_s: Option<f64>,
    pub connected_mask: u8,
    pub shed_mask: u8,
    pub reaction: ReactionStats,
    /// Samples lost to queue overflow or bad analyser counts.
    pub dropped_samples: u32,
    /// Derived records lost to queue overflow.
    pub dropped_records: u32,
}
