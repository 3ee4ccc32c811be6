//! Shared mutable context threaded through every FSM handler.
//!
//! `RelayContext` is the single struct that state handlers read from and
//! write to.  It carries the decision cycle's inputs (latest derived
//! record, threshold snapshot, maintenance request), the collaborators
//! the states drive (load registry, stability timer, reaction tracker),
//! and timing.  Think of it as the "blackboard" in a blackboard
//! architecture.

use crate::config::RelayConfig;
use crate::deriver::DerivedRecord;
use crate::loads::LoadRegistry;
use crate::reaction::ReactionTracker;
use crate::stability::OneShotTimer;
use crate::threshold::Threshold;

/// The shared context passed to every state handler function.
pub struct RelayContext {
    // -- Timing --
    /// Decision cycles elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total decision-cycle count.
    pub total_ticks: u64,
    /// Wall-clock tick count (ms) at the start of this cycle.
    pub now_ticks: u64,

    // -- Cycle inputs (written by the service before each tick) --
    /// Newest derived record this cycle, if one arrived.
    pub record: Option<DerivedRecord>,
    /// Threshold snapshot for this cycle.
    pub threshold: Threshold,
    /// Pending operator request to toggle maintenance mode.
    pub maintenance_requested: bool,

    // -- Collaborators driven by the states --
    pub loads: LoadRegistry,
    pub timer: OneShotTimer,
    pub reaction: ReactionTracker,

    // -- Bookkeeping --
    /// Verdict of the last assessed record: `true` = network stable.
    pub last_verdict_stable: bool,

    /// Relay configuration (tunable parameters).
    pub config: RelayConfig,
}

impl RelayContext {
    /// Create a new context with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            now_ticks: 0,
            record: None,
            threshold: Threshold::DEFAULT,
            maintenance_requested: false,
            loads: LoadRegistry::new(),
            timer: OneShotTimer::new(config.stability_window_ticks),
            reaction: ReactionTracker::new(),
            last_verdict_stable: true,
            config,
        }
    }
}
