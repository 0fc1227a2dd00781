//! Status/error types for the SPSC and one-shot channels.
//!
//! These are plain values returned from fallible calls, never panics — the hot
//! path never unwinds. Mirrors the `ChannelError` pattern from the ring-decomposed
//! MPSC channel this crate descends from.

use thiserror::Error;

/// Outcome of a non-blocking send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrySendError<T> {
    /// The ring has no free slot (`WaitOnFull`) or the one-shot slot already holds
    /// an unreceived value. The value the caller tried to send is returned so it
    /// isn't lost.
    #[error("channel is full")]
    Full(T),
    /// The peer handle has been dropped; no receiver will ever observe this value.
    #[error("receiver has been dropped")]
    OtherClosed(T),
}

impl<T> TrySendError<T> {
    /// Recovers the value that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) | TrySendError::OtherClosed(v) => v,
        }
    }
}

/// Outcome of a non-blocking receive attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
    /// No value is currently available.
    #[error("channel is empty")]
    Empty,
    /// The peer handle has been dropped and no more values will ever arrive.
    #[error("sender has been dropped")]
    OtherClosed,
    /// `OverwriteOnFull` only: the slot this call targeted was reclaimed by a
    /// concurrent overwriting send before it could be read. The caller should
    /// retry; newer data is available.
    #[error("slot was overwritten by a concurrent send before it could be read")]
    SkippedDueToOverwrite,
}

/// Outcome of a non-blocking one-shot receive attempt. Distinct from
/// [`TryRecvError`]: a one-shot's "closed" means *this receiver already
/// consumed its one value*, not that the peer went away mid-wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryReceiveError {
    /// No value has been sent yet.
    #[error("no value has been sent yet")]
    Empty,
    /// This receiver already received its one value on a prior call.
    #[error("this receiver has already received its value")]
    AlreadyReceived,
}

/// Outcome of a one-shot `send`, which consumes the [`crate::oneshot::Sender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("receiver has been dropped")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Recovers the value that could not be sent.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Outcome of a blocking one-shot `receive`, which consumes the
/// [`crate::oneshot::Receiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sender has been dropped without sending a value")]
pub struct RecvError;
