//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RelayService (domain)
//! ```
//!
//! Driven adapters (the record queue, the switch bank, the indicator
//! panel, event sinks) implement these traits.  The
//! [`RelayService`](super::service::RelayService) consumes them via
//! generics, so the decision cycle never touches hardware directly and
//! the whole relay is testable with mock adapters.

use crate::deriver::DerivedRecord;
use crate::loads::NUM_LOADS;

// ───────────────────────────────────────────────────────────────
// Record source (driven adapter: derivation pipeline → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain polls this once per decision cycle for
/// the newest derived frequency record. `None` means no fresh data.
pub trait RecordSource {
    fn poll(&mut self) -> Option<DerivedRecord>;
}

// ───────────────────────────────────────────────────────────────
// Switch bank (driven adapter: operator panel → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the operator's load switches.
pub trait SwitchPort {
    /// Current position of every switch, index 0 = lowest priority.
    fn read_switches(&mut self) -> [bool; NUM_LOADS];
}

// ───────────────────────────────────────────────────────────────
// Indicator panel (driven adapter: domain → lamps)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain publishes load status after every cycle.
/// Bit `n` of each mask refers to load `n`.
pub trait IndicatorPort {
    /// Lamps showing which loads are drawing power.
    fn show_connected(&mut self, mask: u8);

    /// Lamps showing which loads the relay is holding off.
    fn show_shed(&mut self, mask: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`RelayEvent`](super::events::RelayEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// VGA status page, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RelayEvent);
}
