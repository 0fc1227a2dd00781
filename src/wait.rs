//! Wait strategies for the blocking `send`/`receive` retry loops.
//!
//! A [`WaitStrategy`] is selected as a type parameter on the channel handles, not a
//! runtime value, so the compiler can inline the chosen strategy straight into the
//! hot retry loop. Three strategies are provided; see each type's docs.

use std::sync::atomic::AtomicU32;

mod sealed {
    pub trait Sealed {}
}

/// A policy for waiting between failed attempts of a non-blocking `try_*` operation.
///
/// This trait is sealed: [`Spin`], [`Yield`] and [`AtomicWait`] are the only
/// implementors, matching the three variants in the design.
pub trait WaitStrategy: sealed::Sealed + Send + Sync + 'static {
    /// Called once after a `try_*` operation fails.
    ///
    /// `word` is the atomic cursor/state word the caller is waiting on and `stale`
    /// is the value observed at the moment of the failed attempt. `Spin` and
    /// `Yield` ignore both; `AtomicWait` parks on `word` until a peer stores
    /// something other than `stale` and notifies.
    fn wait(word: &AtomicU32, stale: u32);

    /// Whether this strategy may be paired with [`crate::overflow::OverwriteOnFull`].
    ///
    /// Only `Spin` returns `true`: parking on a target that a concurrent producer
    /// keeps overwriting is meaningless, so the other strategies are rejected at
    /// channel-construction time.
    const SUPPORTS_OVERWRITE: bool = false;

    /// Wake up a single thread parked via `AtomicWait::wait` on `word`. A no-op for
    /// `Spin`/`Yield`, which never park.
    fn notify(word: &AtomicU32);
}

/// Busy-spin with a compiler barrier (`core::hint::spin_loop`) between attempts.
///
/// No system call, no voluntary yield. Lowest latency, highest CPU usage. This is
/// the only strategy permitted with [`crate::overflow::OverwriteOnFull`], since that
/// policy's "full" condition can be a moving target — parking on it would either
/// never wake or wake spuriously often.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl sealed::Sealed for Spin {}
impl WaitStrategy for Spin {
    #[inline]
    fn wait(_word: &AtomicU32, _stale: u32) {
        std::hint::spin_loop();
    }

    const SUPPORTS_OVERWRITE: bool = true;

    #[inline]
    fn notify(_word: &AtomicU32) {}
}

/// Cooperative yield (`std::thread::yield_now`) between attempts.
///
/// Balanced latency/CPU tradeoff for uncontended workloads where the peer is
/// expected to make progress soon but an OS-level park is overkill.
#[derive(Debug, Default, Clone, Copy)]
pub struct Yield;

impl sealed::Sealed for Yield {}
impl WaitStrategy for Yield {
    #[inline]
    fn wait(_word: &AtomicU32, _stale: u32) {
        std::thread::yield_now();
    }

    #[inline]
    fn notify(_word: &AtomicU32) {}
}

/// Futex-style park/wake between attempts.
///
/// Parks the calling thread on `word` via the OS's wait primitive (Linux futex,
/// macOS `__ulock`, Windows `WaitOnAddress`, as wired up by the `atomic-wait`
/// crate) and only wakes when the peer stores a different value and calls
/// [`WaitStrategy::notify`]. Best for waits expected to be long; has a per-suspend
/// syscall cost that `Spin`/`Yield` avoid.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicWait;

impl sealed::Sealed for AtomicWait {}
impl WaitStrategy for AtomicWait {
    #[inline]
    fn wait(word: &AtomicU32, stale: u32) {
        atomic_wait::wait(word, stale);
    }

    #[inline]
    fn notify(word: &AtomicU32) {
        atomic_wait::wake_one(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn spin_and_yield_return_immediately() {
        let word = AtomicU32::new(0);
        Spin::wait(&word, 0);
        Yield::wait(&word, 0);
    }

    #[test]
    fn atomic_wait_wakes_on_notify() {
        let word = Arc::new(AtomicU32::new(0));
        let waiter = Arc::clone(&word);

        let handle = thread::spawn(move || {
            AtomicWait::wait(&waiter, 0);
            waiter.load(Ordering::Acquire)
        });

        thread::sleep(Duration::from_millis(50));
        word.store(1, Ordering::Release);
        AtomicWait::notify(&word);

        assert_eq!(handle.join().unwrap(), 1);
    }
}
