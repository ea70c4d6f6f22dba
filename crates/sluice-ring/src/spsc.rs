//! The single-producer/single-consumer ring.
//!
//! Indices are free-running `usize` counters; a slot is `index & mask`.
//! `head` is written only by the producer and `tail` only by the consumer.
//! Each side keeps a private cache of the other side's index and reloads it
//! (with `Acquire`) only when the cache says the ring is full or empty, so
//! the common case touches no shared cache line but its own.
//!
//! Slots in `[tail, head)` are initialised and owned by the consumer. Slots
//! outside that range are uninitialised and owned by the producer.

#![allow(unsafe_code)]

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use crate::error::{PushError, RingError};

struct Slot<T>(UnsafeCell<MaybeUninit<T>>);

// Read-only header first, then one padded line per index.
#[repr(C)]
struct Shared<T> {
    capacity: usize,
    mask: usize,
    slots: Box<[Slot<T>]>,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
}

// SAFETY: a slot is accessed by at most one side at a time, decided by the
// head/tail protocol above, and the Release/Acquire pairs on the indices
// order the slot write before the read. Items cross threads, so `T: Send`.
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();
        while tail != head {
            let slot = &mut self.slots[tail & self.mask];
            // SAFETY: `[tail, head)` holds initialised items, and we have
            // exclusive access because both handles are gone.
            unsafe { slot.0.get_mut().assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

/// Create a ring with room for `capacity` items.
///
/// `capacity` must be a non-zero power of two.
pub fn channel<T>(capacity: usize) -> Result<(Producer<T>, Consumer<T>), RingError> {
    if capacity == 0 || !capacity.is_power_of_two() {
        return Err(RingError::InvalidCapacity { capacity });
    }
    let slots = (0..capacity)
        .map(|_| Slot(UnsafeCell::new(MaybeUninit::uninit())))
        .collect();
    let shared = Arc::new(Shared {
        capacity,
        mask: capacity - 1,
        slots,
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
    });
    let producer = Producer {
        shared: Arc::clone(&shared),
        head: 0,
        cached_tail: 0,
    };
    let consumer = Consumer {
        shared,
        tail: 0,
        cached_head: 0,
    };
    Ok((producer, consumer))
}

/// The write end of a ring.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
    head: usize,
    cached_tail: usize,
}

impl<T> Producer<T> {
    /// Enqueue `item`, or hand it back if the ring is full.
    ///
    /// Never blocks and never allocates.
    pub fn push(&mut self, item: T) -> Result<(), PushError<T>> {
        let head = self.head;
        if head.wrapping_sub(self.cached_tail) == self.shared.capacity {
            self.cached_tail = self.shared.tail.load(Ordering::Acquire);
            if head.wrapping_sub(self.cached_tail) == self.shared.capacity {
                return Err(PushError::Full(item));
            }
        }
        let slot = &self.shared.slots[head & self.shared.mask];
        // SAFETY: `head` is outside `[tail, head)`, so the consumer does not
        // touch this slot until the Release store below publishes it.
        unsafe { (*slot.0.get()).write(item) };
        self.head = head.wrapping_add(1);
        self.shared.head.store(self.head, Ordering::Release);
        Ok(())
    }

    /// Number of queued items. May be stale by the time it returns.
    pub fn len(&self) -> usize {
        self.head
            .wrapping_sub(self.shared.tail.load(Ordering::Acquire))
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the next push would fail.
    pub fn is_full(&self) -> bool {
        self.len() == self.shared.capacity
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

/// The read end of a ring.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    tail: usize,
    cached_head: usize,
}

impl<T> Consumer<T> {
    /// Dequeue the oldest item, if any. Never blocks.
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.tail;
        if tail == self.cached_head {
            self.cached_head = self.shared.head.load(Ordering::Acquire);
            if tail == self.cached_head {
                return None;
            }
        }
        let slot = &self.shared.slots[tail & self.shared.mask];
        // SAFETY: `tail` is inside `[tail, head)`; the Acquire load of head
        // makes the producer's write visible, and the producer does not
        // reuse the slot until the Release store below.
        let item = unsafe { (*slot.0.get()).assume_init_read() };
        self.tail = tail.wrapping_add(1);
        self.shared.tail.store(self.tail, Ordering::Release);
        Some(item)
    }

    /// Number of queued items. May be stale by the time it returns.
    pub fn len(&self) -> usize {
        self.shared
            .head
            .load(Ordering::Acquire)
            .wrapping_sub(self.tail)
    }

    /// Whether there is nothing to pop.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.shared.capacity)
            .field("head", &self.head)
            .finish()
    }
}

impl<T> std::fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.shared.capacity)
            .field("tail", &self.tail)
            .finish()
    }
}

// The handles move between threads but are never shared by reference.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Producer<String>>();
    assert::<Consumer<String>>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};
    use std::sync::atomic::AtomicUsize as Counter;
    use std::thread;

    #[test]
    fn capacity_must_be_power_of_two() {
        assert_eq!(
            channel::<u8>(0).unwrap_err(),
            RingError::InvalidCapacity { capacity: 0 }
        );
        assert!(channel::<u8>(6).is_err());
        assert!(channel::<u8>(1).is_ok());
        assert!(channel::<u8>(1024).is_ok());
    }

    #[test]
    fn fifo_order() {
        let (mut tx, mut rx) = channel(8).unwrap();
        for i in 0..5 {
            tx.push(i).unwrap();
        }
        let drained: Vec<_> = std::iter::from_fn(|| rx.pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_ring_returns_item() {
        let (mut tx, mut rx) = channel(4).unwrap();
        for i in 0..4 {
            tx.push(i).unwrap();
        }
        assert!(tx.is_full());
        assert_eq!(tx.push(99), Err(PushError::Full(99)));
        assert_eq!(rx.pop(), Some(0));
        tx.push(4).unwrap();
        assert_eq!(tx.len(), 4);
        assert_eq!(rx.len(), 4);
    }

    #[test]
    fn empty_ring_pops_none() {
        let (mut tx, mut rx) = channel::<u32>(2).unwrap();
        assert!(rx.is_empty());
        assert_eq!(rx.pop(), None);
        tx.push(1).unwrap();
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), None);
        assert!(tx.is_empty());
    }

    #[test]
    fn indices_wrap_many_times() {
        let (mut tx, mut rx) = channel(2).unwrap();
        for i in 0..1000u32 {
            tx.push(i).unwrap();
            assert_eq!(rx.pop(), Some(i));
        }
    }

    #[test]
    fn queued_items_dropped_with_ring() {
        struct Tracked<'a>(&'a Counter);
        impl Drop for Tracked<'_> {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let drops = Counter::new(0);
        {
            let (mut tx, mut rx) = channel(8).unwrap();
            for _ in 0..5 {
                tx.push(Tracked(&drops)).unwrap();
            }
            drop(rx.pop());
            assert_eq!(drops.load(Ordering::Relaxed), 1);
        }
        assert_eq!(drops.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn indices_on_separate_cache_lines() {
        type S = Shared<u64>;
        let head = offset_of!(S, head);
        let tail = offset_of!(S, tail);
        let header_end = offset_of!(S, slots) + size_of::<Box<[Slot<u64>]>>();
        let line = size_of::<CachePadded<AtomicUsize>>();

        assert!(offset_of!(S, capacity) < header_end);
        assert!(offset_of!(S, mask) < header_end);
        assert!(head >= header_end);
        assert_eq!(head % line, 0);
        assert!(tail >= head + line);
        assert!(line >= 64);
    }

    #[test]
    fn cross_thread_transfer_preserves_order() {
        let n: u64 = if cfg!(miri) { 1_000 } else { 100_000 };
        let (mut tx, mut rx) = channel(64).unwrap();

        let producer = thread::spawn(move || {
            for i in 0..n {
                let mut item = i;
                loop {
                    match tx.push(item) {
                        Ok(()) => break,
                        Err(PushError::Full(back)) => {
                            item = back;
                            std::hint::spin_loop();
                        }
                    }
                }
            }
        });

        let mut expected = 0;
        while expected < n {
            match rx.pop() {
                Some(v) => {
                    assert_eq!(v, expected);
                    expected += 1;
                }
                None => std::hint::spin_loop(),
            }
        }
        producer.join().unwrap();
        assert_eq!(rx.pop(), None);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        proptest! {
            #[test]
            fn behaves_like_bounded_vecdeque(
                cap_pow in 0u32..5,
                ops in proptest::collection::vec(proptest::option::of(any::<u16>()), 0..200),
            ) {
                let capacity = 1usize << cap_pow;
                let (mut tx, mut rx) = channel(capacity).unwrap();
                let mut model = VecDeque::new();

                for op in ops {
                    match op {
                        Some(v) => {
                            let accepted = tx.push(v).is_ok();
                            prop_assert_eq!(accepted, model.len() < capacity);
                            if accepted {
                                model.push_back(v);
                            }
                        }
                        None => prop_assert_eq!(rx.pop(), model.pop_front()),
                    }
                    prop_assert_eq!(rx.len(), model.len());
                    prop_assert_eq!(tx.is_full(), model.len() == capacity);
                }
            }
        }
    }
}
