//! Table-driven state machine core.
//!
//! Each state is one row in a fixed array of [`StateDescriptor`]s
//! holding plain `fn` pointers for entry, exit, and the per-cycle
//! update. The engine knows nothing about relaying: once per decision
//! cycle it calls the active row's update, and a returned `Some(next)`
//! runs the exit/enter pair and moves the active index.
//!
//! ```text
//! tick ─▶ update(active) ─▶ None         stay
//!                       └─▶ Some(next)   exit(active), enter(next)
//! ```
//!
//! Everything a handler may touch travels in one `&mut RelayContext`,
//! so handlers stay free functions and the whole machine runs in unit
//! tests without any I/O behind it.

pub mod context;
pub mod states;

use context::RelayContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The relay's operating states, in table order.
/// [`states::build_state_table`] must list its rows in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Normal = 0,
    LoadManage = 1,
    Maintenance = 2,
}

impl StateId {
    /// Number of states, and therefore rows in the table.
    pub const COUNT: usize = 3;

    /// Recover a `StateId` from a table index. Out-of-range panics in
    /// debug builds and falls back to `Normal` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Normal,
            1 => Self::LoadManage,
            2 => Self::Maintenance,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Normal
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Entry and exit actions; each runs once per transition.
pub type StateActionFn = fn(&mut RelayContext);

/// Per-cycle update handler. `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut RelayContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// One row of the state table. Plain data, no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The engine: a state table plus the active index and cycle clock.
/// A [`RelayContext`] is threaded through every handler call.
pub struct Fsm {
    /// Indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the active state.
    current: usize,
    /// Decision cycles executed so far.
    tick_count: u64,
    /// Value of `tick_count` when the active state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Build the engine over `table`, positioned at `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Fire the starting state's entry action. Call once, before the
    /// first `tick()`; construction alone runs no handlers.
    pub fn start(&mut self, ctx: &mut RelayContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// One decision cycle: stamp the context's tick counters, run the
    /// active update, and carry out any transition it requested.
    pub fn tick(&mut self, ctx: &mut RelayContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Identity of the active state.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Decision cycles spent in the active state so far.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut RelayContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
