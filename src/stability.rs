//! One-shot stability window timer.
//!
//! The load manager requires the network to hold a verdict (stable or
//! unstable) for a full hysteresis window before it acts on it. The
//! timer is armed when a window starts, restarted whenever the verdict
//! flips mid-window, and reports expiry exactly once per arming.

/// Tick-driven one-shot timer.
#[derive(Debug, Clone, Copy)]
pub struct OneShotTimer {
    window_ticks: u64,
    deadline: Option<u64>,
    fired: bool,
}

impl OneShotTimer {
    pub const fn new(window_ticks: u64) -> Self {
        Self {
            window_ticks,
            deadline: None,
            fired: false,
        }
    }

    /// Arm (or re-arm) the timer to fire one full window from `now`.
    /// Restarting clears any pending expiry.
    pub fn restart(&mut self, now_ticks: u64) {
        self.deadline = Some(now_ticks + self.window_ticks);
        self.fired = false;
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.fired = false;
    }

    /// Advance to `now`. Returns `true` on the cycle the window elapses
    /// and never again until the next [`restart`](Self::restart).
    pub fn poll(&mut self, now_ticks: u64) -> bool {
        match self.deadline {
            Some(deadline) if !self.fired && now_ticks >= deadline => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }

    /// Whether an armed window has elapsed (latched until restart).
    pub fn expired(&self) -> bool {
        self.fired
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some() && !self.fired
    }
}
