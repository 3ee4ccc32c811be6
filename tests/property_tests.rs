//! Property tests for the decision core and the derivation pipeline.

use gridrelay::config::RelayConfig;
use gridrelay::deriver::{DerivedRecord, RocDeriver};
use gridrelay::fsm::context::RelayContext;
use gridrelay::fsm::{Fsm, StateId, states};
use gridrelay::loads::NUM_LOADS;
use gridrelay::sampler::Sample;
use gridrelay::stability::OneShotTimer;
use proptest::prelude::*;

// ── FSM invariants ────────────────────────────────────────────

/// One cycle's worth of simulated input.
fn arb_cycle_input() -> impl Strategy<Value = (f64, f64, bool)> {
    (
        0.1f64..60.0,   // frequency
        -40.0f64..40.0, // roc
        prop::bool::weighted(0.02), // maintenance toggle
    )
}

proptest! {
    /// With every switch on, the connected loads always form a
    /// contiguous highest-priority run: shedding eats from the bottom,
    /// reconnection refills from the top, and nothing else touches the
    /// bank.
    #[test]
    fn connected_loads_form_a_priority_suffix(
        inputs in proptest::collection::vec(arb_cycle_input(), 1..300),
    ) {
        let mut fsm = Fsm::new(states::build_state_table(), StateId::Normal);
        let mut ctx = RelayContext::new(RelayConfig::default());
        fsm.start(&mut ctx);

        let mut now = 0u64;
        for (frequency, roc, toggle) in inputs {
            now += 10;
            if toggle {
                ctx.maintenance_requested = true;
            }
            ctx.now_ticks = now;
            ctx.record = Some(DerivedRecord { frequency, roc, timestamp: now - 5 });
            fsm.tick(&mut ctx);

            let connected = ctx.loads.connected_mask();
            let shed = ctx.loads.shed_mask();

            prop_assert_eq!(connected & shed, 0, "a shed load cannot be connected");

            // Suffix check: any connected load implies every more
            // important load is connected too.
            let mut seen_connected = false;
            for i in 0..NUM_LOADS {
                let on = connected & (1 << i) != 0;
                if seen_connected {
                    prop_assert!(on, "gap in connected run: 0b{:05b}", connected);
                }
                seen_connected |= on;
            }

            // Outside load management nothing is ever held shed.
            match fsm.current_state() {
                StateId::LoadManage => {}
                StateId::Normal | StateId::Maintenance => {
                    prop_assert_eq!(shed, 0);
                }
            }
        }
    }

    /// The relay can always be driven back to Normal with a healthy
    /// grid, no matter what came before.
    #[test]
    fn healthy_grid_always_recovers(
        inputs in proptest::collection::vec(arb_cycle_input(), 1..100),
    ) {
        let mut fsm = Fsm::new(states::build_state_table(), StateId::Normal);
        let mut ctx = RelayContext::new(RelayConfig::default());
        fsm.start(&mut ctx);

        let mut now = 0u64;
        for (frequency, roc, toggle) in inputs {
            now += 10;
            if toggle {
                ctx.maintenance_requested = true;
            }
            ctx.now_ticks = now;
            ctx.record = Some(DerivedRecord { frequency, roc, timestamp: now - 5 });
            fsm.tick(&mut ctx);
        }

        // Leave maintenance if the toggles ended there, then feed a
        // healthy grid for plenty of windows.
        if fsm.current_state() == StateId::Maintenance {
            ctx.maintenance_requested = true;
        }
        for _ in 0..800 {
            now += 10;
            ctx.now_ticks = now;
            ctx.record = Some(DerivedRecord { frequency: 50.0, roc: 0.0, timestamp: now - 5 });
            fsm.tick(&mut ctx);
            // A stray pending toggle may legitimately park the relay in
            // maintenance; clear it back out.
            if fsm.current_state() == StateId::Maintenance {
                ctx.maintenance_requested = true;
            }
        }

        prop_assert_eq!(fsm.current_state(), StateId::Normal);
        prop_assert_eq!(ctx.loads.connected_mask(), 0b11111);
    }
}

// ── Derivation pipeline ───────────────────────────────────────

proptest! {
    /// `n` positive-frequency samples always yield exactly `n − 1`
    /// records, and each record's RoC sign follows the frequency step.
    #[test]
    fn deriver_emits_n_minus_one_signed_records(
        freqs in proptest::collection::vec(1.0f64..100.0, 2..50),
    ) {
        let mut deriver = RocDeriver::new();
        let mut emitted = 0usize;
        let mut prev: Option<f64> = None;

        for (i, f) in freqs.iter().enumerate() {
            let rec = deriver.ingest(Sample { frequency: *f, timestamp: i as u64 * 20 });
            if let Some(rec) = rec {
                emitted += 1;
                let step = f - prev.unwrap();
                prop_assert_eq!(rec.roc > 0.0, step > 0.0);
                prop_assert!((rec.frequency - f).abs() < 1e-12);
            }
            prev = Some(*f);
        }

        prop_assert_eq!(emitted, freqs.len() - 1);
    }
}

// ── Stability timer ───────────────────────────────────────────

proptest! {
    /// However restarts and polls interleave, the timer never fires
    /// before a full window has elapsed since the latest restart.
    #[test]
    fn timer_never_fires_early(
        steps in proptest::collection::vec((1u64..200, prop::bool::weighted(0.2)), 1..100),
    ) {
        const WINDOW: u64 = 500;
        let mut timer = OneShotTimer::new(WINDOW);
        let mut now = 0u64;

        timer.restart(now);
        let mut last_restart = Some(now);

        for (advance, restart) in steps {
            now += advance;
            if restart {
                timer.restart(now);
                last_restart = Some(now);
            }
            if timer.poll(now) {
                let armed_at = last_restart.expect("fired while unarmed");
                prop_assert!(now - armed_at >= WINDOW,
                    "fired {} ticks after restart", now - armed_at);
                last_restart = None;
            }
        }
    }
}
