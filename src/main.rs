//! Frequency Relay — Main Entry Point
//!
//! Hexagonal architecture around a simulated frequency analyser.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Analyser thread   Deriver thread   Terminal thread            │
//! │  (capture_sample)  (RocDeriver)     (stdin commands)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              RelayService (pure logic)                 │    │
//! │  │  FSM · Trip test · Load registry                       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Terminal commands:
//!
//! ```text
//!   floor <hz>     set the frequency floor
//!   roc <tenths>   set the RoC ceiling (tenths of Hz/s)
//!   m              toggle maintenance mode
//!   on <n>/off <n> flip load switch n (0-4)
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info, warn};

use gridrelay::app::commands::RelayCommand;
use gridrelay::app::events::RelayEvent;
use gridrelay::app::ports::{EventSink, IndicatorPort, RecordSource, SwitchPort};
use gridrelay::app::service::RelayService;
use gridrelay::config::RelayConfig;
use gridrelay::deriver::{DerivedRecord, QueueRecordSource, RocDeriver};
use gridrelay::loads::NUM_LOADS;
use gridrelay::sampler::{ANALYSER_CALIBRATION, capture_sample};
use gridrelay::threshold::{Threshold, ThresholdStore};

// ── Shared state ──────────────────────────────────────────────

// Written by the terminal thread, snapshotted by every decision cycle.
static THRESHOLDS: ThresholdStore = ThresholdStore::new(Threshold::DEFAULT);

// ── Adapters ──────────────────────────────────────────────────

/// Combined I/O adapter for the decision cycle: record queue in,
/// switch positions in, indicator lamps out (rendered to the log).
struct SimulatorIo {
    records: QueueRecordSource,
    switches: [bool; NUM_LOADS],
    last_connected: Option<u8>,
    last_shed: Option<u8>,
}

impl SimulatorIo {
    fn new() -> Self {
        Self {
            records: QueueRecordSource,
            switches: [true; NUM_LOADS],
            last_connected: None,
            last_shed: None,
        }
    }
}

impl RecordSource for SimulatorIo {
    fn poll(&mut self) -> Option<DerivedRecord> {
        self.records.poll()
    }
}

impl SwitchPort for SimulatorIo {
    fn read_switches(&mut self) -> [bool; NUM_LOADS] {
        self.switches
    }
}

impl IndicatorPort for SimulatorIo {
    fn show_connected(&mut self, mask: u8) {
        if self.last_connected != Some(mask) {
            info!("panel: connected 0b{mask:05b}");
            self.last_connected = Some(mask);
        }
    }

    fn show_shed(&mut self, mask: u8) {
        if self.last_shed != Some(mask) {
            info!("panel: shed      0b{mask:05b}");
            self.last_shed = Some(mask);
        }
    }
}

/// Event sink that renders relay events to the log.
struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RelayEvent) {
        match event {
            RelayEvent::Telemetry(t) => info!(
                "telemetry: state={:?} stable={} f={:?} roc={:?} connected=0b{:05b} trips={} avg_reaction={}ms drops={}/{}",
                t.state,
                t.stable,
                t.frequency_hz,
                t.roc_hz_per_s,
                t.connected_mask,
                t.reaction.trip_count,
                t.reaction.avg_ticks,
                t.dropped_samples,
                t.dropped_records
            ),
            other => debug!("event: {other:?}"),
        }
    }
}

// ── Terminal input ────────────────────────────────────────────

enum TerminalInput {
    Command(RelayCommand),
    Switch { index: usize, on: bool },
}

fn parse_line(line: &str, current: Threshold) -> Option<TerminalInput> {
    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    match keyword {
        "floor" => {
            let hz: f64 = words.next()?.parse().ok()?;
            Some(TerminalInput::Command(RelayCommand::SetThreshold(
                Threshold {
                    frequency_floor_hz: hz,
                    ..current
                },
            )))
        }
        "roc" => {
            let tenths: i32 = words.next()?.parse().ok()?;
            Some(TerminalInput::Command(RelayCommand::SetThreshold(
                Threshold {
                    roc_ceiling_tenths: tenths,
                    ..current
                },
            )))
        }
        "m" => Some(TerminalInput::Command(RelayCommand::ToggleMaintenance)),
        "on" | "off" => {
            let index: usize = words.next()?.parse().ok()?;
            (index < NUM_LOADS).then_some(TerminalInput::Switch {
                index,
                on: keyword == "on",
            })
        }
        _ => None,
    }
}

// ── Simulated grid ────────────────────────────────────────────

/// Line frequency the analyser would observe at `t_ms`: a gentle wobble
/// around 50 Hz, with a two-second sag below the floor out of every
/// thirty seconds to exercise shedding.
fn simulated_frequency(t_ms: u64) -> f64 {
    let t = t_ms as f64 / 1000.0;
    let phase = t % 30.0;
    if (20.0..22.0).contains(&phase) {
        28.5
    } else {
        50.0 + 0.4 * (t * 0.7).sin()
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("gridrelay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = RelayConfig::default();
    THRESHOLDS.set(Threshold {
        frequency_floor_hz: config.frequency_floor_hz,
        roc_ceiling_tenths: config.roc_ceiling_tenths,
    });

    let epoch = Instant::now();
    let now_ticks = move || epoch.elapsed().as_millis() as u64;

    // ── Analyser thread: one interrupt per sampling period ────
    {
        let period = Duration::from_millis(config.deriver_period_ticks);
        std::thread::spawn(move || {
            loop {
                let now = now_ticks();
                let raw = (ANALYSER_CALIBRATION / simulated_frequency(now)) as u32;
                capture_sample(raw, now);
                std::thread::sleep(period);
            }
        });
    }

    // ── Deriver thread: drain samples into derived records ────
    {
        let period = Duration::from_millis(config.deriver_period_ticks);
        std::thread::spawn(move || {
            let mut roc = RocDeriver::new();
            loop {
                while roc.service_queues().is_some() {}
                std::thread::sleep(period);
            }
        });
    }

    // ── Terminal thread: operator commands from stdin ─────────
    let (tx, rx) = mpsc::channel::<TerminalInput>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line, THRESHOLDS.get()) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => warn!("unrecognised command: {line:?}"),
            }
        }
    });

    // ── Decision loop ─────────────────────────────────────────
    let mut service = RelayService::new(config.clone());
    let mut io = SimulatorIo::new();
    let mut sink = LogEventSink;
    service.start(&mut sink);

    let period = Duration::from_millis(config.manager_period_ticks);
    loop {
        for input in rx.try_iter() {
            match input {
                TerminalInput::Command(cmd) => {
                    if let Err(e) = service.handle_command(cmd, &THRESHOLDS, &mut sink) {
                        warn!("command rejected: {e}");
                    }
                }
                TerminalInput::Switch { index, on } => {
                    io.switches[index] = on;
                    info!("switch {index} set {}", if on { "on" } else { "off" });
                }
            }
        }

        service.tick(now_ticks(), &mut io, &THRESHOLDS, &mut sink);
        std::thread::sleep(period);
    }
}
