//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  NORMAL ──[record trips, shed ok]──▶ LOAD_MANAGE
//!    ▲                                     │
//!    │                        [stable window, nothing left
//!    │                             to reconnect]
//!    └─────────────────────────────────────┘
//!
//!  NORMAL ──[maintenance toggle]──▶ MAINTENANCE ──[toggle]──▶ NORMAL
//!
//!  LOAD_MANAGE defers maintenance requests until the relay has
//!  restored every load it shed.
//! ```

use super::context::RelayContext;
use super::{StateDescriptor, StateId};
use crate::error::LoadError;
use crate::trip;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Normal
        StateDescriptor {
            id: StateId::Normal,
            name: "Normal",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 1 — LoadManage
        StateDescriptor {
            id: StateId::LoadManage,
            name: "LoadManage",
            on_enter: Some(load_manage_enter),
            on_exit: Some(load_manage_exit),
            on_update: load_manage_update,
        },
        // Index 2 — Maintenance
        StateDescriptor {
            id: StateId::Maintenance,
            name: "Maintenance",
            on_enter: Some(maintenance_enter),
            on_exit: Some(maintenance_exit),
            on_update: maintenance_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL state — monitoring, loads follow their switches
// ═══════════════════════════════════════════════════════════════════════════

fn normal_enter(ctx: &mut RelayContext) {
    ctx.timer.cancel();
    info!("NORMAL: monitoring, all load control with the operator");
}

fn normal_update(ctx: &mut RelayContext) -> Option<StateId> {
    // Outside management the switches are authoritative both ways.
    ctx.loads.mirror_switches();

    if let Some(record) = ctx.record {
        if let Some(cause) = trip::assess(&record, &ctx.threshold) {
            return match ctx.loads.shed_lowest() {
                Ok(index) => {
                    info!(
                        "NORMAL: trip ({cause:?}) at f={:.2} Hz roc={:.2} Hz/s, shed load {index}",
                        record.frequency, record.roc
                    );
                    ctx.reaction.record(ctx.now_ticks, record.timestamp);
                    Some(StateId::LoadManage)
                }
                Err(err) => {
                    warn!("NORMAL: trip ({cause:?}) but {err}, staying put");
                    None
                }
            };
        }
    }

    // Maintenance only starts from a fully-permitted bank: while any
    // switch is off the request stays pending and entry is refused.
    if ctx.maintenance_requested {
        if ctx.loads.all_switches_on() {
            ctx.maintenance_requested = false;
            return Some(StateId::Maintenance);
        }
        if ctx.ticks_in_state % 100 == 0 {
            warn!("NORMAL: maintenance refused until every switch is on");
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOAD_MANAGE state — hysteresis-driven shed/reconnect
// ═══════════════════════════════════════════════════════════════════════════

fn load_manage_enter(ctx: &mut RelayContext) {
    // The window starts unstable: the trip that brought us here is the
    // first verdict of the new window.
    ctx.last_verdict_stable = false;
    ctx.timer.restart(ctx.now_ticks);
    info!(
        "LOAD_MANAGE: engaged, shed mask 0b{:05b}",
        ctx.loads.shed_mask()
    );
}

fn load_manage_exit(ctx: &mut RelayContext) {
    ctx.timer.cancel();
    info!("LOAD_MANAGE: disengaged");
}

fn load_manage_update(ctx: &mut RelayContext) -> Option<StateId> {
    // Maintenance must wait until every shed load is restored. Keep the
    // request pending and remind the operator once per hundred cycles.
    if ctx.maintenance_requested && ctx.ticks_in_state % 100 == 0 {
        warn!("LOAD_MANAGE: maintenance request deferred while loads are shed");
    }

    // Off switches act immediately; on switches wait for the relay.
    ctx.loads.apply_switch_offs();

    if let Some(record) = ctx.record {
        let stable = trip::assess(&record, &ctx.threshold).is_none();
        if stable != ctx.last_verdict_stable {
            ctx.last_verdict_stable = stable;
            ctx.timer.restart(ctx.now_ticks);
        }
    }

    if ctx.timer.poll(ctx.now_ticks) {
        if ctx.last_verdict_stable {
            match ctx.loads.reconnect_highest() {
                Ok(index) => {
                    info!("LOAD_MANAGE: stable window, reconnected load {index}");
                    if ctx.loads.is_fully_connected() {
                        info!("LOAD_MANAGE: all loads restored");
                        return Some(StateId::Normal);
                    }
                    ctx.timer.restart(ctx.now_ticks);
                }
                Err(LoadError::AlreadyFullyConnected) => {
                    info!("LOAD_MANAGE: all loads restored");
                    return Some(StateId::Normal);
                }
                Err(err) => {
                    warn!("LOAD_MANAGE: {err}, returning control to the operator");
                    return Some(StateId::Normal);
                }
            }
        } else {
            match ctx.loads.shed_lowest() {
                Ok(index) => {
                    info!("LOAD_MANAGE: unstable window, shed load {index}");
                }
                Err(err) => warn!("LOAD_MANAGE: unstable window but {err}"),
            }
            ctx.timer.restart(ctx.now_ticks);
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAINTENANCE state — relay inert, operator owns the loads
// ═══════════════════════════════════════════════════════════════════════════

fn maintenance_enter(ctx: &mut RelayContext) {
    ctx.timer.cancel();
    // Entry precondition is an all-on switch bank, so mirroring forces
    // the registry fully connected.
    ctx.loads.mirror_switches();
    info!("MAINTENANCE: relay inert, thresholds may be tuned");
}

fn maintenance_exit(_ctx: &mut RelayContext) {
    info!("MAINTENANCE: complete");
}

fn maintenance_update(ctx: &mut RelayContext) -> Option<StateId> {
    if ctx.maintenance_requested {
        ctx.maintenance_requested = false;
        return Some(StateId::Normal);
    }

    // Records keep flowing for the display but never trip anything here.
    let before = ctx.loads.connected_mask();
    ctx.loads.mirror_switches();
    let after = ctx.loads.connected_mask();
    if before != after {
        debug!("MAINTENANCE: switch update applied, connected 0b{after:05b}");
    }
    None
}
