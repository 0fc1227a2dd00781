//! The bounded SPSC ring-buffer engine: two cache-line-isolated cursors with
//! cached peer snapshots, publishing elements via release/acquire stores.
//!
//! This module is the inner, handle-agnostic engine. The public `Sender`/`Receiver`
//! pair and the blocking retry loops live in [`crate::spsc`]; this type only knows
//! about `try_send`/`try_receive`.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::{TryRecvError, TrySendError};
use crate::invariants::{debug_assert_cursor_in_bounds, debug_assert_usable_capacity};
use crate::metrics::Metrics;
use crate::overflow::OverflowPolicy;

/// Producer-owned cache line: the cursor the producer publishes, and a plain
/// shadow of the consumer's cursor that only the producer reads.
struct ProducerLine {
    send_cursor: AtomicU32,
    recv_cursor_cache: UnsafeCell<u32>,
}

/// Consumer-owned cache line: the cursor the consumer publishes, and a plain
/// shadow of the producer's cursor that only the consumer reads.
struct ConsumerLine {
    recv_cursor: AtomicU32,
    send_cursor_cache: UnsafeCell<u32>,
}

/// The handle-agnostic ring engine shared (via [`crate::arc_cell::ArcCell`])
/// between exactly one producer and one consumer.
///
/// `O` selects, at the type level, whether a full ring blocks or overwrites —
/// see [`OverflowPolicy`]. A full ring under [`crate::overflow::OverwriteOnFull`]
/// requires `recv_cursor` to be mutable from *either* side, so every mutation
/// of it goes through a `compare_exchange`: whichever side wins the CAS is the
/// side allowed to touch the reserved slot. Under
/// [`crate::overflow::WaitOnFull`] only the consumer ever touches
/// `recv_cursor`, so its advance is a plain release store.
pub(crate) struct Ring<T, O> {
    capacity: usize,
    mask: usize,
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    producer: CachePadded<ProducerLine>,
    consumer: CachePadded<ConsumerLine>,
    pub(crate) metrics: Metrics,
    _overflow: std::marker::PhantomData<fn() -> O>,
}

// SAFETY: `UnsafeCell<u32>` cursor caches are each read and written by exactly
// one side (producer or consumer); `UnsafeCell<MaybeUninit<T>>` slots are only
// ever touched by whichever side currently owns the index, established by the
// cursor protocol below. `T: Send` is required because a value constructed on
// the producer thread is destructed/read on the consumer thread.
unsafe impl<T: Send, O> Send for Ring<T, O> {}
unsafe impl<T: Send, O> Sync for Ring<T, O> {}

impl<T, O: OverflowPolicy> Ring<T, O> {
    /// Rounds `requested` up to the next power of two (minimum 2, so at least
    /// one usable slot remains after the sacrificed slot) and allocates.
    pub(crate) fn with_capacity(requested: usize) -> Self {
        let capacity = requested.max(1).next_power_of_two().max(2);
        assert!(
            capacity <= u32::MAX as usize,
            "requested capacity {requested} is too large"
        );
        let buffer = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ring {
            capacity,
            mask: capacity - 1,
            buffer,
            producer: CachePadded::new(ProducerLine {
                send_cursor: AtomicU32::new(0),
                recv_cursor_cache: UnsafeCell::new(0),
            }),
            consumer: CachePadded::new(ConsumerLine {
                recv_cursor: AtomicU32::new(0),
                send_cursor_cache: UnsafeCell::new(0),
            }),
            metrics: Metrics::new(),
            _overflow: std::marker::PhantomData,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn slot(&self, index: u32) -> *mut MaybeUninit<T> {
        debug_assert_cursor_in_bounds!(index, self.capacity);
        self.buffer[index as usize].get()
    }

    /// Non-blocking send. See the module-level engine description for the
    /// exact protocol this implements.
    pub(crate) fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let send_cursor = self.producer.send_cursor.load(Ordering::Relaxed);
        let next = (send_cursor + 1) & self.mask as u32;

        // SAFETY: only the producer thread ever reads or writes this cache.
        let recv_cache = unsafe { &mut *self.producer.recv_cursor_cache.get() };

        if next == *recv_cache {
            *recv_cache = self.consumer.recv_cursor.load(Ordering::Acquire);
            if next == *recv_cache {
                if O::OVERWRITE {
                    return self.overwrite_and_send(send_cursor, next, value);
                }
                return Err(TrySendError::Full(value));
            }
        }

        // SAFETY: index `send_cursor` is not in [recv_cursor, send_cursor) of
        // any live element (it's the slot one past the last live one), so no
        // other thread is reading or writing it.
        unsafe { self.slot(send_cursor).write(MaybeUninit::new(value)) };
        self.producer.send_cursor.store(next, Ordering::Release);
        self.metrics.record_sent();
        Ok(())
    }

    /// The overwrite step for [`crate::overflow::OverwriteOnFull`]: the ring
    /// observed full, so the producer must reclaim the oldest live slot before
    /// it can construct the new element there.
    ///
    /// Races against the consumer's own `try_receive` on the same
    /// `recv_cursor`: both sides only ever advance it through a
    /// `compare_exchange`, and whichever side wins is the only side that may
    /// touch the reserved index. This file calls the pattern CAS-before-read:
    /// the index is never read or destructed until its CAS has won.
    fn overwrite_and_send(
        &self,
        send_cursor: u32,
        next: u32,
        value: T,
    ) -> Result<(), TrySendError<T>> {
        loop {
            let recv_cursor = self.consumer.recv_cursor.load(Ordering::Acquire);
            if recv_cursor != next {
                // The consumer drained since we last checked; the ring is no
                // longer full. Fall through to the ordinary fast path.
                // SAFETY: as in `try_send`, index `send_cursor` is free.
                unsafe { self.slot(send_cursor).write(MaybeUninit::new(value)) };
                self.producer.send_cursor.store(next, Ordering::Release);
                self.metrics.record_sent();
                return Ok(());
            }

            let reclaimed_next = (recv_cursor + 1) & self.mask as u32;
            if self
                .consumer
                .recv_cursor
                .compare_exchange(
                    recv_cursor,
                    reclaimed_next,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                // Won the CAS: we now exclusively own destructing this slot.
                // SAFETY: index `recv_cursor` held a live element (the ring
                // was observed full) and no other thread may touch it after
                // losing this CAS.
                unsafe { self.slot(recv_cursor).assume_init_drop() };
                self.metrics.record_overwrite();
                // SAFETY: only the producer thread reads this cache.
                unsafe {
                    *self.producer.recv_cursor_cache.get() = reclaimed_next;
                }
                unsafe { self.slot(send_cursor).write(MaybeUninit::new(value)) };
                self.producer.send_cursor.store(next, Ordering::Release);
                self.metrics.record_sent();
                return Ok(());
            }

            // Lost the CAS: the consumer advanced this exact slot itself (an
            // ordinary receive) between our load and our CAS. Loop and
            // re-check whether the ring is still full.
        }
    }

    /// Non-blocking receive.
    pub(crate) fn try_receive(&self) -> Result<T, TryRecvError> {
        let recv_cursor = self.consumer.recv_cursor.load(Ordering::Relaxed);

        // SAFETY: only the consumer thread ever reads or writes this cache.
        let send_cache = unsafe { &mut *self.consumer.send_cursor_cache.get() };
        if recv_cursor == *send_cache {
            *send_cache = self.producer.send_cursor.load(Ordering::Acquire);
            if recv_cursor == *send_cache {
                return Err(TryRecvError::Empty);
            }
        }

        let next = (recv_cursor + 1) & self.mask as u32;

        if O::OVERWRITE {
            // CAS-before-read: claim the slot before touching it, since the
            // producer may be racing to reclaim this same index.
            if self
                .consumer
                .recv_cursor
                .compare_exchange(recv_cursor, next, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(TryRecvError::SkippedDueToOverwrite);
            }
            // SAFETY: won the CAS, so we exclusively own this index now.
            let value = unsafe { self.slot(recv_cursor).assume_init_read() };
            self.metrics.record_received();
            Ok(value)
        } else {
            // SAFETY: under WaitOnFull only the consumer ever mutates
            // `recv_cursor`, so no CAS is needed — a plain store suffices.
            let value = unsafe { self.slot(recv_cursor).assume_init_read() };
            self.consumer.recv_cursor.store(next, Ordering::Release);
            self.metrics.record_received();
            Ok(value)
        }
    }

    /// Snapshot of live element count. Racy by construction (the producer or
    /// consumer may be mutating concurrently); intended for diagnostics only.
    pub(crate) fn len(&self) -> usize {
        let send = self.producer.send_cursor.load(Ordering::Acquire);
        let recv = self.consumer.recv_cursor.load(Ordering::Acquire);
        let len = (send.wrapping_sub(recv)) as usize & self.mask;
        debug_assert_usable_capacity!(len, self.capacity);
        len
    }

    /// The word a stuck consumer's retry loop should park on: the producer's
    /// cursor, observed stale at the moment `try_receive` reported empty.
    pub(crate) fn send_cursor_word(&self) -> &AtomicU32 {
        &self.producer.send_cursor
    }

    /// The word a stuck producer's retry loop should park on: the consumer's
    /// cursor, observed stale at the moment `try_send` reported full.
    pub(crate) fn recv_cursor_word(&self) -> &AtomicU32 {
        &self.consumer.recv_cursor
    }
}

impl<T, O> Drop for Ring<T, O> {
    fn drop(&mut self) {
        let send = self.producer.send_cursor.load(Ordering::SeqCst);
        let recv = self.consumer.recv_cursor.load(Ordering::SeqCst);
        let mut i = recv;
        while i != send {
            // SAFETY: every index in [recv_cursor, send_cursor) holds a live,
            // never-double-destructed element by the engine's own invariant.
            unsafe { self.slot(i).assume_init_drop() };
            i = (i + 1) & self.mask as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overflow::{OverwriteOnFull, WaitOnFull};

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let ring: Ring<u32, WaitOnFull> = Ring::with_capacity(5);
        assert_eq!(ring.capacity(), 8);
    }

    #[test]
    fn send_then_receive_round_trips_in_order() {
        let ring: Ring<u32, WaitOnFull> = Ring::with_capacity(4);
        ring.try_send(1).unwrap();
        ring.try_send(2).unwrap();
        assert_eq!(ring.try_receive().unwrap(), 1);
        assert_eq!(ring.try_receive().unwrap(), 2);
        assert_eq!(ring.try_receive().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn wait_on_full_rejects_when_ring_is_full() {
        let ring: Ring<u32, WaitOnFull> = Ring::with_capacity(4);
        for v in 0..3 {
            ring.try_send(v).unwrap();
        }
        match ring.try_send(99) {
            Err(TrySendError::Full(99)) => {}
            other => panic!("expected Full(99), got {other:?}"),
        }
    }

    #[test]
    fn usable_capacity_is_capacity_minus_one() {
        let ring: Ring<u32, WaitOnFull> = Ring::with_capacity(4);
        let mut sent = 0;
        while ring.try_send(sent).is_ok() {
            sent += 1;
        }
        assert_eq!(sent, 3);
    }

    #[test]
    fn overwrite_on_full_clobbers_oldest_and_keeps_newest() {
        let ring: Ring<u32, OverwriteOnFull> = Ring::with_capacity(4);
        for v in 0..10u32 {
            ring.try_send(v).unwrap();
        }
        let mut received = Vec::new();
        while let Ok(v) = ring.try_receive() {
            received.push(v);
        }
        assert_eq!(received, vec![7, 8, 9]);
    }

    #[test]
    fn drop_runs_destructor_on_every_live_element() {
        use std::sync::atomic::AtomicU32 as Counter;
        use std::sync::Arc;

        struct Dropper(Arc<Counter>);
        impl Drop for Dropper {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(Counter::new(0));
        {
            let ring: Ring<Dropper, WaitOnFull> = Ring::with_capacity(4);
            ring.try_send(Dropper(drops.clone())).unwrap();
            ring.try_send(Dropper(drops.clone())).unwrap();
            // leave both unreceived; Drop must still run both destructors.
        }
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn len_reflects_live_element_count() {
        let ring: Ring<u32, WaitOnFull> = Ring::with_capacity(8);
        assert_eq!(ring.len(), 0);
        ring.try_send(1).unwrap();
        ring.try_send(2).unwrap();
        assert_eq!(ring.len(), 2);
        ring.try_receive().unwrap();
        assert_eq!(ring.len(), 1);
    }
}
