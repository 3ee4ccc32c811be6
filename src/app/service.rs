//! Application service — the hexagonal core.
//!
//! [`RelayService`] owns the FSM, the histories, and the shared context.
//! It exposes a clean, hardware-agnostic API.  All I/O flows through
//! port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  RecordSource ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  SwitchPort   ──▶ │      RelayService      │
//!  IndicatorPort ◀──│  FSM · Trip · Loads    │
//!                   └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::fsm::context::RelayContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::history::HistoryBuffer;
use crate::loads::LoadState;
use crate::reaction::ReactionStats;
use crate::threshold::{Threshold, ThresholdStore};

use super::commands::RelayCommand;
use super::events::{RelayEvent, TelemetryData};
use super::ports::{EventSink, IndicatorPort, RecordSource, SwitchPort};

// ───────────────────────────────────────────────────────────────
// RelayService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates one decision cycle at a time.
pub struct RelayService {
    fsm: Fsm,
    ctx: RelayContext,
    freq_history: HistoryBuffer,
    roc_history: HistoryBuffer,
    /// Decision cycles between telemetry emissions.
    telemetry_every: u64,
    cycle_count: u64,
}

impl RelayService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: RelayConfig) -> Self {
        let telemetry_every =
            (config.telemetry_period_ticks / config.manager_period_ticks).max(1);
        let ctx = RelayContext::new(config);
        let state_table = build_state_table();
        let fsm = Fsm::new(state_table, StateId::Normal);

        Self {
            fsm,
            ctx,
            freq_history: HistoryBuffer::new(),
            roc_history: HistoryBuffer::new(),
            telemetry_every,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Normal).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&RelayEvent::Started(self.fsm.current_state()));
        info!("RelayService started in {:?}", self.fsm.current_state());
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full decision cycle: read switches → poll record →
    /// FSM → indicators → telemetry.
    ///
    /// The `io` parameter satisfies the record, switch, and indicator
    /// ports at once — this avoids a triple mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ticks: u64,
        io: &mut (impl RecordSource + SwitchPort + IndicatorPort),
        thresholds: &ThresholdStore,
        sink: &mut impl EventSink,
    ) {
        self.cycle_count += 1;
        let prev_state = self.fsm.current_state();
        let prev_connected = self.ctx.loads.connected_mask();
        let prev_shed = self.ctx.loads.shed_mask();
        let prev_stable = self.ctx.last_verdict_stable;

        // 1. Operator switch positions via SwitchPort
        let switches = io.read_switches();
        for (i, on) in switches.into_iter().enumerate() {
            self.ctx.loads.set_switch(i, on);
        }

        // 2. Newest derived record, mirrored into the histories
        let record = io.poll();
        if let Some(rec) = record {
            self.freq_history.push(rec.frequency);
            self.roc_history.push(rec.roc);
        }

        // 3. FSM tick with this cycle's inputs
        self.ctx.now_ticks = now_ticks;
        self.ctx.record = record;
        self.ctx.threshold = thresholds.get();
        self.fsm.tick(&mut self.ctx);

        // 4. Publish load status via IndicatorPort
        let connected = self.ctx.loads.connected_mask();
        let shed = self.ctx.loads.shed_mask();
        io.show_connected(connected);
        io.show_shed(shed);

        // 5. Emit what changed this cycle
        for i in 0..crate::loads::NUM_LOADS {
            let bit = 1u8 << i;
            if shed & !prev_shed & bit != 0 {
                sink.emit(&RelayEvent::LoadShed(i));
            }
            if prev_shed & !shed & connected & !prev_connected & bit != 0 {
                sink.emit(&RelayEvent::LoadReconnected(i));
            }
        }

        let stable = self.ctx.last_verdict_stable;
        if stable != prev_stable {
            sink.emit(&RelayEvent::StabilityChanged { stable });
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&RelayEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        if self.cycle_count % self.telemetry_every == 0 {
            sink.emit(&RelayEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the terminal or the panel).
    pub fn handle_command(
        &mut self,
        cmd: RelayCommand,
        thresholds: &ThresholdStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            RelayCommand::SetThreshold(t) => {
                if t.frequency_floor_hz.is_nan() || t.frequency_floor_hz <= 0.0 {
                    return Err(Error::Config("frequency floor must be positive"));
                }
                if t.roc_ceiling_tenths < 0 {
                    return Err(Error::Config("RoC ceiling must be non-negative"));
                }
                thresholds.set(t);
                info!(
                    "thresholds updated: floor {:.1} Hz, RoC ceiling {} tenths",
                    t.frequency_floor_hz, t.roc_ceiling_tenths
                );
                sink.emit(&RelayEvent::ThresholdChanged {
                    frequency_floor_hz: t.frequency_floor_hz,
                    roc_ceiling_tenths: t.roc_ceiling_tenths,
                });
            }
            RelayCommand::ToggleMaintenance => {
                if self.ctx.maintenance_requested {
                    warn!("maintenance toggle already pending");
                }
                self.ctx.maintenance_requested = true;
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            stable: self.ctx.last_verdict_stable,
            frequency_hz: self.freq_history.latest(),
            roc_hz_per_s: self.roc_history.latest(),
            connected_mask: self.ctx.loads.connected_mask(),
            shed_mask: self.ctx.loads.shed_mask(),
            reaction: self.ctx.reaction.stats(),
            dropped_samples: crate::sampler::dropped_sample_count(),
            dropped_records: crate::deriver::dropped_record_count(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Whether the last threshold verdict found the grid stable. Starts
    /// `true` and flips with each verdict while managing loads.
    pub fn is_stable(&self) -> bool {
        self.ctx.last_verdict_stable
    }

    /// Total decision cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Reaction-time statistics for the display.
    pub fn reaction_stats(&self) -> ReactionStats {
        self.ctx.reaction.stats()
    }

    /// Retained frequency readings, newest first.
    pub fn frequency_history(&self) -> heapless::Vec<f64, { crate::history::HISTORY_DEPTH }> {
        self.freq_history.snapshot()
    }

    /// Retained RoC values, newest first.
    pub fn roc_history(&self) -> heapless::Vec<f64, { crate::history::HISTORY_DEPTH }> {
        self.roc_history.snapshot()
    }

    /// Per-load snapshot for the display.
    pub fn load_states(&self) -> [LoadState; crate::loads::NUM_LOADS] {
        self.ctx.loads.states()
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> RelayConfig {
        self.ctx.config.clone()
    }

    /// Thresholds the next cycle will enforce.
    pub fn current_threshold(&self) -> Threshold {
        self.ctx.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &RelayEvent) {}
    }

    #[test]
    fn invalid_thresholds_are_rejected_and_not_stored() {
        let mut svc = RelayService::new(RelayConfig::default());
        let store = ThresholdStore::default();
        let mut sink = NullSink;

        let bad = Threshold {
            frequency_floor_hz: -1.0,
            roc_ceiling_tenths: 300,
        };
        assert!(svc.handle_command(RelayCommand::SetThreshold(bad), &store, &mut sink).is_err());
        assert_eq!(store.get(), Threshold::DEFAULT);

        let bad = Threshold {
            frequency_floor_hz: 30.0,
            roc_ceiling_tenths: -5,
        };
        assert!(svc.handle_command(RelayCommand::SetThreshold(bad), &store, &mut sink).is_err());
        assert_eq!(store.get(), Threshold::DEFAULT);
    }

    #[test]
    fn telemetry_starts_empty() {
        let svc = RelayService::new(RelayConfig::default());
        let t = svc.build_telemetry();
        assert_eq!(t.state, StateId::Normal);
        assert!(t.stable, "boot verdict is stable");
        assert_eq!(t.frequency_hz, None);
        assert_eq!(t.roc_hz_per_s, None);
        assert_eq!(t.connected_mask, 0b11111);
        assert_eq!(t.shed_mask, 0);
        assert_eq!(t.reaction.trip_count, 0);
        assert_eq!(t.dropped_records, 0);
    }
}
