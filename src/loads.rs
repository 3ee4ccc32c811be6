//! Priority-ordered load bank.
//!
//! Five loads, index 0 the least important. Shedding walks up from
//! index 0 and drops the first powered load; reconnection walks down
//! from index 4 and restores the most important disconnected load whose
//! operator switch still permits it. A load dropped by the relay keeps
//! a "shed" mark until the relay itself restores it, so the display can
//! distinguish relay action from an operator flipping a switch.
//!
//! Operator switches are intent, not state: under load management a
//! switch turning off disconnects its load immediately, but a switch
//! turning on only makes the load eligible for relay reconnection.
//! Outside load management the connections simply mirror the switches.

use log::info;

use crate::error::LoadError;

/// Number of managed loads.
pub const NUM_LOADS: usize = 5;

/// Per-load snapshot for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadState {
    /// Operator switch position.
    pub switch_on: bool,
    /// Whether the load is drawing power.
    pub connected: bool,
    /// Set while the relay (not the operator) holds this load off.
    pub shed_by_relay: bool,
}

/// The relay's view of all five loads and their operator switches.
#[derive(Debug, Clone)]
pub struct LoadRegistry {
    loads: [LoadState; NUM_LOADS],
}

impl LoadRegistry {
    /// All switches on, all loads connected, nothing shed.
    pub const fn new() -> Self {
        Self {
            loads: [LoadState {
                switch_on: true,
                connected: true,
                shed_by_relay: false,
            }; NUM_LOADS],
        }
    }

    /// Record an operator switch position. Connection state is only
    /// touched by the scan methods, so callers decide which policy
    /// (managed or mirrored) applies this cycle.
    pub fn set_switch(&mut self, index: usize, on: bool) {
        if let Some(load) = self.loads.get_mut(index) {
            load.switch_on = on;
        }
    }

    pub fn state(&self, index: usize) -> Option<LoadState> {
        self.loads.get(index).copied()
    }

    pub fn states(&self) -> [LoadState; NUM_LOADS] {
        self.loads
    }

    /// Drop the lowest-priority load still drawing power.
    pub fn shed_lowest(&mut self) -> Result<usize, LoadError> {
        for (i, load) in self.loads.iter_mut().enumerate() {
            if load.connected && load.switch_on {
                load.connected = false;
                load.shed_by_relay = true;
                info!("load {i} shed");
                return Ok(i);
            }
        }
        Err(LoadError::NothingToShed)
    }

    /// Restore the highest-priority disconnected load whose switch is on.
    pub fn reconnect_highest(&mut self) -> Result<usize, LoadError> {
        let mut blocked = false;
        for (i, load) in self.loads.iter_mut().enumerate().rev() {
            if load.connected {
                continue;
            }
            if load.switch_on {
                load.connected = true;
                load.shed_by_relay = false;
                info!("load {i} reconnected");
                return Ok(i);
            }
            blocked = true;
        }
        if blocked {
            Err(LoadError::BlockedByManualSwitches)
        } else {
            Err(LoadError::AlreadyFullyConnected)
        }
    }

    /// Managed-mode switch policy: a switch turned off takes effect
    /// immediately, a switch turned on waits for relay reconnection.
    pub fn apply_switch_offs(&mut self) {
        for (i, load) in self.loads.iter_mut().enumerate() {
            if load.switch_on {
                continue;
            }
            if load.connected {
                load.connected = false;
                info!("load {i} switched off by operator");
            }
            // An operator turning off a shed load takes it over; the
            // relay no longer owes it a reconnection.
            load.shed_by_relay = false;
        }
    }

    /// Unmanaged-mode switch policy: connections mirror the switches in
    /// both directions. Clears relay-shed marks on anything restored.
    pub fn mirror_switches(&mut self) {
        for load in &mut self.loads {
            load.connected = load.switch_on;
            if load.connected {
                load.shed_by_relay = false;
            }
        }
    }

    /// Whether every switched-on load is drawing power.
    pub fn is_fully_connected(&self) -> bool {
        self.loads.iter().all(|l| !l.switch_on || l.connected)
    }

    /// Whether the operator currently permits every load.
    pub fn all_switches_on(&self) -> bool {
        self.loads.iter().all(|l| l.switch_on)
    }

    /// Whether the relay currently holds any load off.
    pub fn any_shed(&self) -> bool {
        self.loads.iter().any(|l| l.shed_by_relay)
    }

    /// Connected loads as a bitmask, bit 0 = load 0. Drives the load
    /// indicator bank.
    pub fn connected_mask(&self) -> u8 {
        self.loads
            .iter()
            .enumerate()
            .filter(|(_, l)| l.connected)
            .fold(0, |mask, (i, _)| mask | 1 << i)
    }

    /// Relay-shed loads as a bitmask. Drives the shed indicator bank.
    pub fn shed_mask(&self) -> u8 {
        self.loads
            .iter()
            .enumerate()
            .filter(|(_, l)| l.shed_by_relay)
            .fold(0, |mask, (i, _)| mask | 1 << i)
    }
}

impl Default for LoadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_state_is_fully_connected() {
        let r = LoadRegistry::new();
        assert!(r.is_fully_connected());
        assert!(!r.any_shed());
        assert_eq!(r.connected_mask(), 0b11111);
        assert_eq!(r.shed_mask(), 0);
    }

    #[test]
    fn shedding_walks_up_from_the_least_important() {
        let mut r = LoadRegistry::new();
        assert_eq!(r.shed_lowest(), Ok(0));
        assert_eq!(r.shed_lowest(), Ok(1));
        assert_eq!(r.connected_mask(), 0b11100);
        assert_eq!(r.shed_mask(), 0b00011);
    }

    #[test]
    fn shedding_skips_switched_off_loads() {
        let mut r = LoadRegistry::new();
        r.set_switch(0, false);
        r.apply_switch_offs();
        assert_eq!(r.shed_lowest(), Ok(1));
        // Load 0 is off but not relay-shed.
        assert_eq!(r.shed_mask(), 0b00010);
    }

    #[test]
    fn all_loads_off_leaves_nothing_to_shed() {
        let mut r = LoadRegistry::new();
        for i in 0..NUM_LOADS {
            r.set_switch(i, false);
        }
        r.apply_switch_offs();
        assert_eq!(r.shed_lowest(), Err(LoadError::NothingToShed));
    }

    #[test]
    fn reconnection_walks_down_from_the_most_important() {
        let mut r = LoadRegistry::new();
        r.shed_lowest().unwrap(); // 0
        r.shed_lowest().unwrap(); // 1
        r.shed_lowest().unwrap(); // 2
        assert_eq!(r.reconnect_highest(), Ok(2));
        assert_eq!(r.reconnect_highest(), Ok(1));
        assert_eq!(r.reconnect_highest(), Ok(0));
        assert!(r.is_fully_connected());
        assert!(!r.any_shed());
    }

    #[test]
    fn fully_connected_bank_reports_as_such() {
        let mut r = LoadRegistry::new();
        assert_eq!(
            r.reconnect_highest(),
            Err(LoadError::AlreadyFullyConnected)
        );
    }

    #[test]
    fn switched_off_loads_block_reconnection() {
        let mut r = LoadRegistry::new();
        r.shed_lowest().unwrap();
        r.set_switch(0, false);
        assert_eq!(
            r.reconnect_highest(),
            Err(LoadError::BlockedByManualSwitches)
        );
        // Switch back on: eligible again.
        r.set_switch(0, true);
        assert_eq!(r.reconnect_highest(), Ok(0));
    }

    #[test]
    fn managed_policy_honours_offs_but_not_ons() {
        let mut r = LoadRegistry::new();
        r.shed_lowest().unwrap(); // load 0 shed by relay
        r.set_switch(4, false);
        r.set_switch(0, true); // already on, but make intent explicit
        r.apply_switch_offs();

        let s = r.states();
        assert!(!s[4].connected, "off switch must act immediately");
        assert!(!s[0].connected, "on switch must not reconnect under management");
        assert!(s[0].shed_by_relay);
    }

    #[test]
    fn mirrored_policy_restores_and_clears_marks() {
        let mut r = LoadRegistry::new();
        r.shed_lowest().unwrap();
        r.set_switch(3, false);
        r.mirror_switches();

        let s = r.states();
        assert!(s[0].connected);
        assert!(!s[0].shed_by_relay);
        assert!(!s[3].connected);
        assert_eq!(r.connected_mask(), 0b10111);
    }
}
