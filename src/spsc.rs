//! The public SPSC channel: a paired, move-only `Sender`/`Receiver` over a
//! shared [`Ring`] engine.
//!
//! `Overflow` and `Wait` are compile-time type parameters so the blocking
//! retry loop and the full/empty handling are monomorphized and inlined per
//! instantiation, rather than dispatched through a runtime `Config` value.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::sync::atomic::Ordering;

use crate::arc_cell::ArcCell;
use crate::error::{TryRecvError, TrySendError};
use crate::metrics::MetricsSnapshot;
use crate::overflow::{OverflowPolicy, OverwriteOnFull};
use crate::ring::Ring;
use crate::wait::WaitStrategy;

/// Constructs a bounded SPSC channel. `capacity` is rounded up to the next
/// power of two; the usable capacity (the largest number of elements that may
/// be in flight at once) is one less than that, since the ring always
/// sacrifices a slot to distinguish full from empty.
///
/// `Overflow` selects what a full ring does on `send`/`try_send`: the default
/// [`crate::overflow::WaitOnFull`] rejects/blocks, [`OverwriteOnFull`] clobbers
/// the oldest unreceived element instead. `Wait` selects the blocking retry
/// policy; see [`WaitStrategy`].
///
/// # Panics
/// Panics if `Overflow = OverwriteOnFull` is paired with any `Wait` other than
/// [`crate::wait::Spin`] — parking on a target the producer is concurrently
/// overwriting is meaningless, so this pairing is rejected up front rather
/// than left to manifest as a hang.
pub fn spsc_channel<T, Overflow, Wait>(
    capacity: usize,
) -> (Sender<T, Overflow, Wait>, Receiver<T, Overflow, Wait>)
where
    Overflow: OverflowPolicy,
    Wait: WaitStrategy,
{
    assert!(
        !Overflow::OVERWRITE || Wait::SUPPORTS_OVERWRITE,
        "OverwriteOnFull requires the Spin wait strategy"
    );

    let ring = ArcCell::make(Ring::<T, Overflow>::with_capacity(capacity));
    let sender = Sender {
        ring: ring.clone(),
        _not_sync: PhantomData,
        _wait: PhantomData,
    };
    let receiver = Receiver {
        ring,
        _not_sync: PhantomData,
        _wait: PhantomData,
    };
    (sender, receiver)
}

/// The producing end of an SPSC channel. Move-only: there is no [`Clone`]
/// impl, so at most one thread can ever hold the producer role at a time.
pub struct Sender<T, Overflow: OverflowPolicy, Wait: WaitStrategy> {
    ring: ArcCell<Ring<T, Overflow>>,
    _not_sync: PhantomData<UnsafeCell<()>>,
    _wait: PhantomData<Wait>,
}

// SAFETY: the handle may be moved to another thread (ownership transfer), but
// must never be shared by reference across threads — omitting `Sync` (via the
// `UnsafeCell<()>` marker field) enforces that at compile time.
unsafe impl<T: Send, Overflow: OverflowPolicy, Wait: WaitStrategy> Send
    for Sender<T, Overflow, Wait>
{
}

impl<T, Overflow: OverflowPolicy, Wait: WaitStrategy> Sender<T, Overflow, Wait> {
    /// Attempts to send without blocking. Returns `Full(value)` if the ring
    /// has no free slot, or `OtherClosed(value)` if the `Receiver` has
    /// already been dropped; either way the value is handed back so it isn't
    /// lost.
    ///
    /// On success, wakes a `Receiver` parked under `AtomicWait` — a parked
    /// peer is independent of whether this side used `try_send` or the
    /// blocking `send`, so both notify.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        if self.ring.use_count() < 2 {
            return Err(TrySendError::OtherClosed(value));
        }
        let result = self.ring.try_send(value);
        if result.is_ok() {
            Wait::notify(self.ring.recv_cursor_word());
        }
        result
    }

    /// Sends, retrying under `Wait` until a slot is free. Returns once the
    /// value is enqueued, or silently drops it if the `Receiver` is dropped
    /// while waiting — no one will ever read it either way.
    pub fn send(&self, mut value: T) {
        loop {
            match self.try_send(value) {
                Ok(()) => return,
                Err(TrySendError::OtherClosed(_)) => return,
                Err(TrySendError::Full(back)) => {
                    value = back;
                    self.ring.metrics.record_send_retry();
                    let stale = self.ring.recv_cursor_word().load(Ordering::Relaxed);
                    Wait::wait(self.ring.recv_cursor_word(), stale);
                }
            }
        }
    }

    /// Whether the paired [`Receiver`] has been dropped, observed at this
    /// instant. A `true` result is authoritative; a `false` result may be
    /// stale by the time the caller acts on it.
    pub fn is_closed(&self) -> bool {
        self.ring.use_count() < 2
    }

    /// A point-in-time copy of this channel's send/receive counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ring.metrics.snapshot()
    }
}

/// The consuming end of an SPSC channel. Move-only, for the same reason as
/// [`Sender`].
pub struct Receiver<T, Overflow: OverflowPolicy, Wait: WaitStrategy> {
    ring: ArcCell<Ring<T, Overflow>>,
    _not_sync: PhantomData<UnsafeCell<()>>,
    _wait: PhantomData<Wait>,
}

unsafe impl<T: Send, Overflow: OverflowPolicy, Wait: WaitStrategy> Send
    for Receiver<T, Overflow, Wait>
{
}

impl<T, Overflow: OverflowPolicy, Wait: WaitStrategy> Receiver<T, Overflow, Wait> {
    /// Attempts to receive without blocking. Reports `OtherClosed` only when
    /// the ring is empty *and* the `Sender` has been dropped — a dropped
    /// sender with items still in the ring keeps draining normally.
    ///
    /// On success, wakes a `Sender` parked under `AtomicWait` (see
    /// [`Sender::try_send`] for why both try and blocking paths notify).
    pub fn try_receive(&self) -> Result<T, TryRecvError> {
        match self.ring.try_receive() {
            Ok(value) => {
                Wait::notify(self.ring.send_cursor_word());
                Ok(value)
            }
            Err(TryRecvError::Empty) if self.ring.use_count() < 2 => {
                Err(TryRecvError::OtherClosed)
            }
            other => other,
        }
    }

    /// Receives, retrying under `Wait` until a value is available.
    ///
    /// Returns `None` once the sender is provably gone (its handle has
    /// dropped) *and* the ring has been fully drained — distinguishing "no
    /// producer left" from "producer is just slow."
    pub fn receive(&self) -> Option<T> {
        loop {
            match self.try_receive() {
                Ok(value) => return Some(value),
                Err(TryRecvError::SkippedDueToOverwrite) => continue,
                Err(TryRecvError::OtherClosed) => return None,
                Err(TryRecvError::Empty) => {
                    let stale = self.ring.send_cursor_word().load(Ordering::Relaxed);
                    Wait::wait(self.ring.send_cursor_word(), stale);
                }
            }
        }
    }

    /// Whether the paired [`Sender`] has been dropped, observed at this
    /// instant. See [`Sender::is_closed`] for the staleness caveat.
    pub fn is_closed(&self) -> bool {
        self.ring.use_count() < 2
    }

    /// The channel's usable capacity (`capacity - 1`, since one slot is
    /// always sacrificed to distinguish full from empty).
    pub fn capacity(&self) -> usize {
        self.ring.capacity() - 1
    }

    /// A point-in-time copy of this channel's send/receive counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ring.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overflow::WaitOnFull;
    use crate::wait::Spin;

    #[test]
    fn basic_send_receive_round_trip() {
        let (tx, rx) = spsc_channel::<u32, WaitOnFull, Spin>(16);
        tx.send(1);
        tx.send(2);
        assert_eq!(rx.receive(), Some(1));
        assert_eq!(rx.receive(), Some(2));
    }

    #[test]
    fn dropping_sender_lets_receiver_drain_then_see_none() {
        let (tx, rx) = spsc_channel::<u32, WaitOnFull, Spin>(4);
        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();
        drop(tx);
        assert_eq!(rx.receive(), Some(1));
        assert_eq!(rx.receive(), Some(2));
        assert_eq!(rx.receive(), None);
    }

    #[test]
    fn try_receive_reports_other_closed_only_once_empty() {
        let (tx, rx) = spsc_channel::<u32, WaitOnFull, Spin>(4);
        tx.try_send(1).unwrap();
        drop(tx);
        assert_eq!(rx.try_receive(), Ok(1));
        assert_eq!(rx.try_receive(), Err(TryRecvError::OtherClosed));
    }

    #[test]
    fn try_send_reports_other_closed_after_receiver_drop() {
        let (tx, rx) = spsc_channel::<u32, WaitOnFull, Spin>(4);
        drop(rx);
        match tx.try_send(5) {
            Err(TrySendError::OtherClosed(5)) => {}
            other => panic!("expected OtherClosed(5), got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "OverwriteOnFull requires the Spin wait strategy")]
    fn overwrite_with_yield_is_rejected_at_construction() {
        use crate::overflow::OverwriteOnFull;
        use crate::wait::Yield;
        let _ = spsc_channel::<u32, OverwriteOnFull, Yield>(4);
    }

    #[test]
    fn is_closed_reflects_peer_drop() {
        let (tx, rx) = spsc_channel::<u32, WaitOnFull, Spin>(4);
        assert!(!tx.is_closed());
        assert!(!rx.is_closed());
        drop(rx);
        assert!(tx.is_closed());
    }
}
