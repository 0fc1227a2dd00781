//! Overflow policies for the SPSC ring when the producer catches up to the consumer.

mod sealed {
    pub trait Sealed {}
}

/// What `send` does when the ring is full.
///
/// Selected as a type parameter on the channel handles, mirroring
/// [`crate::wait::WaitStrategy`]. Sealed: [`WaitOnFull`] and [`OverwriteOnFull`] are
/// the only implementors.
pub trait OverflowPolicy: sealed::Sealed + Send + Sync + 'static {
    /// Whether a full ring should clobber its oldest element instead of blocking.
    const OVERWRITE: bool;
}

/// `try_send` returns `Full` when the ring has no free slot; blocking `send` retries
/// under the wait strategy until the consumer drains a slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitOnFull;

impl sealed::Sealed for WaitOnFull {}
impl OverflowPolicy for WaitOnFull {
    const OVERWRITE: bool = false;
}

/// A full ring advances the receive cursor by one, destructing the oldest
/// in-flight element, before constructing the new one.
///
/// Only constructible paired with [`crate::wait::Spin`] — see
/// [`crate::wait::WaitStrategy::SUPPORTS_OVERWRITE`]. The channel factory asserts
/// this pairing at construction time.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverwriteOnFull;

impl sealed::Sealed for OverwriteOnFull {}
impl OverflowPolicy for OverwriteOnFull {
    const OVERWRITE: bool = true;
}
