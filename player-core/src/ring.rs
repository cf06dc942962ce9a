//! Bounded single-producer/single-consumer queue of fixed-size audio blocks.
//!
//! Frame-granularity queues would force per-frame atomics on the realtime
//! path; amortizing synchronization over a whole block bounds the worst-case
//! work the output callback has to do per invocation to one atomic load.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Slot {
    samples: UnsafeCell<Box<[f32]>>,
}

// Safety: a `Slot` is only ever touched through `RingProducer` (owns `head`)
// or `RingConsumer` (owns `tail`). The `available` counter in `Shared` is the
// single source of truth for which slots belong to which side; a slot index
// is never claimed by both a producer and a consumer at once (see
// `try_claim_write_slot`/`try_claim_read_slot`), so the `UnsafeCell` accesses
// never race.
unsafe impl Sync for Slot {}

struct Shared {
    slots: Box<[Slot]>,
    available: AtomicUsize,
    capacity: usize,
    block_len: usize,
}

/// Create a Ring with `capacity` slots, each holding `frames_per_block *
/// channels` interleaved samples.
pub fn ring(capacity: usize, frames_per_block: usize, channels: usize) -> (RingProducer, RingConsumer) {
    assert!(capacity >= 2, "Ring capacity must be at least 2");

    let block_len = frames_per_block * channels;
    let slots = (0..capacity)
        .map(|_| Slot { samples: UnsafeCell::new(vec![0.0f32; block_len].into_boxed_slice()) })
        .collect::<Vec<_>>()
        .into_boxed_slice();

    let shared = Arc::new(Shared {
        slots,
        available: AtomicUsize::new(0),
        capacity,
        block_len,
    });

    (
        RingProducer { shared: shared.clone(), head: 0 },
        RingConsumer { shared, tail: 0 },
    )
}

/// The producer-owned half of a [`Ring`](ring). Exclusively used by the
/// Producer task.
pub struct RingProducer {
    shared: Arc<Shared>,
    head: usize,
}

/// The consumer-owned half of a [`Ring`](ring). Exclusively used by the
/// Output callback.
pub struct RingConsumer {
    shared: Arc<Shared>,
    tail: usize,
}

impl RingProducer {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of slots currently filled, for diagnostics only: may be stale
    /// the instant it's read since the consumer can decrement concurrently.
    pub fn available(&self) -> usize {
        self.shared.available.load(Ordering::Acquire)
    }

    /// Returns a writable slot at `head`, or `None` if the ring is full.
    ///
    /// Pairs with the consumer's `commit_read`: the Acquire load here ensures
    /// that if we observe room, we also observe the consumer having finished
    /// reading whichever slot we're about to overwrite.
    pub fn try_claim_write_slot(&mut self) -> Option<&mut [f32]> {
        if self.shared.available.load(Ordering::Acquire) >= self.shared.capacity {
            return None;
        }

        let slot = &self.shared.slots[self.head];
        // Safety: see `Slot`'s Sync justification above.
        Some(unsafe { &mut *slot.samples.get() })
    }

    /// Advances `head` and publishes the slot contents to the consumer.
    ///
    /// The Release store ensures every write to the slot's memory made
    /// before this call happens-before the consumer's next Acquire load of
    /// `available` that observes the increment.
    pub fn commit_write(&mut self) {
        self.head = (self.head + 1) % self.shared.capacity;
        self.shared.available.fetch_add(1, Ordering::Release);
    }
}

impl RingConsumer {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    /// Returns a readable slot at `tail`, or `None` if the ring is empty.
    pub fn try_claim_read_slot(&mut self) -> Option<&[f32]> {
        if self.shared.available.load(Ordering::Acquire) == 0 {
            return None;
        }

        let slot = &self.shared.slots[self.tail];
        // Safety: see `Slot`'s Sync justification above.
        Some(unsafe { &*slot.samples.get() })
    }

    /// Advances `tail` and releases the slot back to the producer.
    pub fn commit_read(&mut self) {
        self.tail = (self.tail + 1) % self.shared.capacity;
        self.shared.available.fetch_sub(1, Ordering::Release);
    }
}
