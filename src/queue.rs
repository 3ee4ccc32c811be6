//! Fixed-capacity SPSC ring buffer for interrupt→task handoff.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Sampling ISR│────▶│  SpscRing    │────▶│ Consumer task│
//! │ (producer)  │     │ (lock-free)  │     │ (one reader) │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Delivery is FIFO; a full queue drops the *new* item so the producer
//! never blocks in interrupt context. Push and pop are O(1) and
//! allocation-free.
//!
//! The ring holds `N - 1` items: head == tail means empty, so one slot
//! stays unused to distinguish empty from full.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Single-producer single-consumer ring over `Copy` items.
///
/// # Contract
///
/// At most one context calls [`push`](Self::push) and at most one context
/// calls [`pop`](Self::pop). The atomic head/tail indices enforce the
/// happens-before edge between them; slot contents are only touched by
/// whichever side currently owns the slot.
pub struct SpscRing<T, const N: usize> {
    /// Next slot the producer will write. Owned by the producer.
    head: AtomicUsize,
    /// Next slot the consumer will read. Owned by the consumer.
    tail: AtomicUsize,
    buf: UnsafeCell<[T; N]>,
}

// SAFETY: the SPSC discipline (one producer, one consumer, index
// acquire/release ordering) guarantees no slot is accessed mutably by
// both sides at once.
unsafe impl<T: Copy + Send, const N: usize> Sync for SpscRing<T, N> {}

impl<T: Copy, const N: usize> SpscRing<T, N> {
    /// Create an empty ring. `fill` initialises the backing array and is
    /// never observed by consumers.
    pub const fn new(fill: T) -> Self {
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            buf: UnsafeCell::new([fill; N]),
        }
    }

    /// Usable capacity (one slot is sacrificed to the empty/full test).
    pub const fn capacity() -> usize {
        N - 1
    }

    /// Enqueue an item. Safe to call from interrupt context.
    /// Returns `false` if the queue is full (item dropped).
    pub fn push(&self, item: T) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % N;

        if next_head == tail {
            return false; // Queue full — drop the new item.
        }

        // SAFETY: slot `head` is outside tail..head, so the consumer
        // will not read it until the Release store below publishes it.
        unsafe {
            (*self.buf.get())[head] = item;
        }

        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Dequeue the oldest item, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None; // Empty.
        }

        // SAFETY: slot `tail` was published by the producer's Release
        // store, observed through the Acquire load of `head` above.
        let item = unsafe { (*self.buf.get())[tail] };
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(item)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        (head + N - tail) % N
    }

    /// True if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let q: SpscRing<u32, 8> = SpscRing::new(0);
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn fifo_order() {
        let q: SpscRing<u32, 8> = SpscRing::new(0);
        for v in [3, 1, 4, 1, 5] {
            assert!(q.push(v));
        }
        assert_eq!(q.len(), 5);
        for v in [3, 1, 4, 1, 5] {
            assert_eq!(q.pop(), Some(v));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops_newest() {
        let q: SpscRing<u32, 4> = SpscRing::new(0);
        assert_eq!(SpscRing::<u32, 4>::capacity(), 3);
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(q.push(3));
        assert!(!q.push(99), "fourth push must be rejected");
        // The oldest items survive; 99 was the one dropped.
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn wraps_around() {
        let q: SpscRing<u32, 4> = SpscRing::new(0);
        for round in 0..10u32 {
            assert!(q.push(round));
            assert_eq!(q.pop(), Some(round));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn cross_thread_handoff() {
        use std::sync::Arc;

        let q: Arc<SpscRing<u64, 16>> = Arc::new(SpscRing::new(0));
        let producer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || {
                let mut sent = 0u64;
                while sent < 1000 {
                    if q.push(sent) {
                        sent += 1;
                    } else {
                        std::thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0u64;
        while expected < 1000 {
            if let Some(v) = q.pop() {
                assert_eq!(v, expected, "FIFO order must hold across threads");
                expected += 1;
            } else {
                std::thread::yield_now();
            }
        }
        producer.join().unwrap();
    }
}
