//! Reaction-time bookkeeping for trip events.
//!
//! Each time the relay sheds in response to a trip, the latency between
//! the offending sample's capture tick and the shed is recorded into a
//! depth-5 newest-first rolling window with running min/max/average.
//!
//! Two quirks are carried over from the reference relay deliberately:
//!
//! - the average always divides by the full window depth, so with fewer
//!   than 5 samples the missing slots weigh in as zero;
//! - min and max only ever compare against the newly inserted latency —
//!   a value falling out of the window never revises them, so they
//!   reflect the full insertion history.

use heapless::Vec;

/// Rolling window depth.
pub const REACTION_WINDOW: usize = 5;

/// Point-in-time reaction statistics for the display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionStats {
    /// Window sum divided by [`REACTION_WINDOW`] (zero-filled below depth).
    pub avg_ticks: u64,
    /// Smallest latency ever recorded, `None` before the first trip.
    pub min_ticks: Option<u64>,
    /// Largest latency ever recorded, `None` before the first trip.
    pub max_ticks: Option<u64>,
    /// Total trips recorded since boot.
    pub trip_count: u32,
}

pub struct ReactionTracker {
    window: [u64; REACTION_WINDOW],
    /// Index of the most recent entry (valid only when `count > 0`).
    head: usize,
    count: usize,
    min: Option<u64>,
    max: Option<u64>,
    trips: u32,
}

impl ReactionTracker {
    pub const fn new() -> Self {
        Self {
            window: [0; REACTION_WINDOW],
            head: 0,
            count: 0,
            min: None,
            max: None,
            trips: 0,
        }
    }

    /// Record the latency of one trip response.
    pub fn record(&mut self, now_ticks: u64, trip_ticks: u64) {
        let latency = now_ticks.saturating_sub(trip_ticks);

        self.head = (self.head + REACTION_WINDOW - 1) % REACTION_WINDOW;
        self.window[self.head] = latency;
        if self.count < REACTION_WINDOW {
            self.count += 1;
        }
        self.trips = self.trips.saturating_add(1);

        // Min/max track the insertion history, not the window contents.
        self.min = Some(self.min.map_or(latency, |m| m.min(latency)));
        self.max = Some(self.max.map_or(latency, |m| m.max(latency)));
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> ReactionStats {
        let sum: u64 = (0..self.count)
            .map(|i| self.window[(self.head + i) % REACTION_WINDOW])
            .sum();
        ReactionStats {
            avg_ticks: sum / REACTION_WINDOW as u64,
            min_ticks: self.min,
            max_ticks: self.max,
            trip_count: self.trips,
        }
    }

    /// Retained latencies, newest first.
    pub fn window_newest_first(&self) -> Vec<u64, REACTION_WINDOW> {
        let mut out = Vec::new();
        for i in 0..self.count {
            let _ = out.push(self.window[(self.head + i) % REACTION_WINDOW]);
        }
        out
    }
}

impl Default for ReactionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_has_no_extremes() {
        let t = ReactionTracker::new();
        let s = t.stats();
        assert_eq!(s.avg_ticks, 0);
        assert_eq!(s.min_ticks, None);
        assert_eq!(s.max_ticks, None);
        assert_eq!(s.trip_count, 0);
    }

    #[test]
    fn six_latencies_keep_newest_five() {
        let mut t = ReactionTracker::new();
        // Trip tick fixed at 5000; the "now" ticks reproduce latencies
        // 5, 10, 7, 6, 2, 3.
        for now in [5005, 5010, 5007, 5006, 5002, 5003] {
            t.record(now, 5000);
        }

        assert_eq!(t.window_newest_first().as_slice(), &[3, 2, 6, 7, 10]);

        let s = t.stats();
        assert_eq!(s.min_ticks, Some(2));
        assert_eq!(s.max_ticks, Some(10));
        assert_eq!(s.avg_ticks, (3 + 2 + 6 + 7 + 10) / 5);
        assert_eq!(s.trip_count, 6);
    }

    #[test]
    fn evicted_values_still_count_toward_extremes() {
        let mut t = ReactionTracker::new();
        t.record(100, 0); // latency 100 — will be evicted
        for _ in 0..5 {
            t.record(10, 0); // latency 10, five times
        }
        let s = t.stats();
        assert_eq!(t.window_newest_first().as_slice(), &[10, 10, 10, 10, 10]);
        assert_eq!(s.max_ticks, Some(100), "eviction must not lower max");
        assert_eq!(s.min_ticks, Some(10));
    }

    #[test]
    fn average_divides_by_five_before_window_fills() {
        let mut t = ReactionTracker::new();
        t.record(10, 0);
        t.record(20, 0);
        // Zero-fill bias: (10 + 20) / 5, not / 2.
        assert_eq!(t.stats().avg_ticks, 6);
    }

    #[test]
    fn clock_skew_saturates_to_zero() {
        let mut t = ReactionTracker::new();
        t.record(5, 10);
        assert_eq!(t.stats().min_ticks, Some(0));
    }
}
