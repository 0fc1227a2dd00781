//! The public one-shot channel: a paired `Sender`/`Receiver` over a shared
//! [`Slot`].
//!
//! Both `send` and the blocking `receive` consume `self`, so a second send or
//! a second blocking receive is a compile error rather than a runtime
//! `SenderClosed`/`ReceiverClosed` status — the handle itself is the proof
//! that at most one of each has happened. The non-blocking [`Receiver::try_receive`]
//! still takes `&self`, since it must be retryable while empty.

use std::cell::UnsafeCell;
use std::marker::PhantomData;

use crate::arc_cell::ArcCell;
use crate::error::{RecvError, SendError, TryReceiveError};
use crate::slot::Slot;
use crate::wait::WaitStrategy;

/// Constructs a one-shot channel: a handle pair that can carry at most one
/// `T` from the sender thread to the receiver thread.
pub fn oneshot_channel<T, Wait: WaitStrategy>() -> (Sender<T, Wait>, Receiver<T, Wait>) {
    let slot = ArcCell::make(Slot::new());
    let sender = Sender {
        slot: slot.clone(),
        _not_sync: PhantomData,
        _wait: PhantomData,
    };
    let receiver = Receiver {
        slot,
        _not_sync: PhantomData,
        _wait: PhantomData,
    };
    (sender, receiver)
}

/// The sending end. Consumed by [`Sender::send`], so at most one send can
/// ever be attempted through a given handle.
pub struct Sender<T, Wait: WaitStrategy> {
    slot: ArcCell<Slot<T>>,
    _not_sync: PhantomData<UnsafeCell<()>>,
    _wait: PhantomData<Wait>,
}

unsafe impl<T: Send, Wait: WaitStrategy> Send for Sender<T, Wait> {}

impl<T, Wait: WaitStrategy> Sender<T, Wait> {
    /// Sends `value`, consuming this handle. Fails only if the [`Receiver`]
    /// has already been dropped, handing `value` back.
    pub fn send(self, value: T) -> Result<(), SendError<T>> {
        if self.slot.use_count() < 2 {
            return Err(SendError(value));
        }
        let result = self.slot.send(value);
        Wait::notify(self.slot.state_word());
        result
    }

    /// Whether the paired [`Receiver`] has been dropped, observed at this
    /// instant; a hint that may lag the true state by the time it is acted
    /// on.
    pub fn is_closed(&self) -> bool {
        self.slot.use_count() < 2
    }
}

/// The receiving end.
pub struct Receiver<T, Wait: WaitStrategy> {
    slot: ArcCell<Slot<T>>,
    _not_sync: PhantomData<UnsafeCell<()>>,
    _wait: PhantomData<Wait>,
}

unsafe impl<T: Send, Wait: WaitStrategy> Send for Receiver<T, Wait> {}

impl<T, Wait: WaitStrategy> Receiver<T, Wait> {
    /// Attempts to receive without blocking. May be called repeatedly while
    /// the result is `Empty`; once it returns `Ok`, any further call reports
    /// `AlreadyReceived`.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.slot.try_receive()
    }

    /// Receives, consuming this handle and blocking (retrying under `Wait`)
    /// until a value arrives or the sender is dropped without ever sending
    /// one.
    pub fn receive(self) -> Result<T, RecvError> {
        loop {
            match self.slot.try_receive() {
                Ok(value) => return Ok(value),
                Err(TryReceiveError::AlreadyReceived) => unreachable!(
                    "receive() consumes the Receiver, so a prior successful \
                     try_receive on this same handle is the only way here"
                ),
                Err(TryReceiveError::Empty) => {
                    if self.slot.use_count() < 2 {
                        // Sender gone; check once more in case it sent its
                        // value between the failed try and this observation.
                        return self.slot.try_receive().map_err(|_| RecvError);
                    }
                    Wait::wait(self.slot.state_word(), 0);
                }
            }
        }
    }

    /// Whether the paired [`Sender`] has been dropped, observed at this
    /// instant; see [`Sender::is_closed`] for the staleness caveat.
    pub fn is_closed(&self) -> bool {
        self.slot.use_count() < 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wait::Spin;

    #[test]
    fn send_then_receive_round_trips() {
        let (tx, rx) = oneshot_channel::<u32, Spin>();
        tx.send(57).unwrap();
        assert_eq!(rx.receive(), Ok(57));
    }

    #[test]
    fn try_receive_after_consumed_receive_is_unreachable_path() {
        let (tx, rx) = oneshot_channel::<u32, Spin>();
        tx.send(1).unwrap();
        assert_eq!(rx.try_receive(), Ok(1));
        assert_eq!(rx.try_receive(), Err(TryReceiveError::AlreadyReceived));
    }

    #[test]
    fn send_after_receiver_dropped_reports_closed_and_returns_value() {
        let (tx, rx) = oneshot_channel::<u32, Spin>();
        drop(rx);
        match tx.send(5) {
            Err(SendError(5)) => {}
            other => panic!("expected SendError(5), got {other:?}"),
        }
    }

    #[test]
    fn receive_after_sender_dropped_without_sending_errs() {
        let (tx, rx) = oneshot_channel::<u32, Spin>();
        drop(tx);
        assert_eq!(rx.receive(), Err(RecvError));
    }

    #[test]
    fn is_closed_reflects_peer_drop() {
        let (tx, rx) = oneshot_channel::<u32, Spin>();
        assert!(!tx.is_closed());
        drop(rx);
        assert!(tx.is_closed());
    }
}
