//! The one-shot slot engine: a single in-place storage cell governed by a
//! three-state atomic (`NotSent` -> `Sent` -> `Received`).
//!
//! Like [`crate::ring`], this is the inner, handle-agnostic engine; the public
//! `Sender`/`Receiver` pair lives in [`crate::oneshot`].

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{SendError, TryReceiveError};
use crate::invariants::debug_assert_state_monotonic;

const NOT_SENT: u32 = 0;
const SENT: u32 = 1;
const RECEIVED: u32 = 2;

pub(crate) struct Slot<T> {
    state: AtomicU32,
    value: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: `value` is constructed by at most one thread (the sender, before the
// `Sent` release store) and read by at most one other thread (the receiver,
// after the matching acquire load), with the state atomic serializing the
// handoff. `T: Send` is required since construction and destruction may
// happen on different threads.
unsafe impl<T: Send> Send for Slot<T> {}
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Slot {
            state: AtomicU32::new(NOT_SENT),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Constructs `value` in the slot and publishes it. Called at most once
    /// per slot because the public [`crate::oneshot::Sender::send`] consumes
    /// `self` — this inner method does not re-check the state before writing.
    pub(crate) fn send(&self, value: T) -> Result<(), SendError<T>> {
        debug_assert_state_monotonic!(NOT_SENT, SENT);
        // SAFETY: exactly one Sender handle can ever exist for this slot
        // (move-only, consumed on send), so no other thread constructs here
        // concurrently.
        unsafe { (*self.value.get()).write(value) };
        self.state.store(SENT, Ordering::Release);
        Ok(())
    }

    /// Non-blocking receive. Does not consume `self`, so it may be called
    /// again after `Empty` — but once it returns `Ok`, this slot's single
    /// value has been moved out and any further call reports
    /// `AlreadyReceived`.
    pub(crate) fn try_receive(&self) -> Result<T, TryReceiveError> {
        let state = self.state.load(Ordering::Acquire);
        match state {
            NOT_SENT => Err(TryReceiveError::Empty),
            RECEIVED => Err(TryReceiveError::AlreadyReceived),
            SENT => {
                // SAFETY: state = Sent guarantees the value was constructed
                // and not yet moved out; only one receiver thread reaches
                // here (move-only handle), so no concurrent read/write races.
                let value = unsafe { (*self.value.get()).assume_init_read() };
                debug_assert_state_monotonic!(SENT, RECEIVED);
                self.state.store(RECEIVED, Ordering::Release);
                Ok(value)
            }
            other => unreachable!("one-shot state machine observed invalid state {other}"),
        }
    }

    pub(crate) fn state_word(&self) -> &AtomicU32 {
        &self.state
    }

    pub(crate) fn is_sent_or_received(&self) -> bool {
        self.state.load(Ordering::Acquire) != NOT_SENT
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == SENT {
            // SAFETY: Sent with no intervening receive means the value was
            // constructed and never moved out; this is the only remaining
            // owner, so dropping it here is exactly-once.
            unsafe { (*self.value.get()).assume_init_drop() };
        }
    }
}
