//! A minimal atomic refcounted cell: a single heap allocation holding a refcount
//! next to its payload, shared between exactly the handles that clone it.
//!
//! This is the primitive the SPSC ring and the one-shot slot are both built on
//! top of — each channel factory makes one [`ArcCell<T>`] and gives one clone to
//! the producer/sender side and one to the consumer/receiver side. It is not a
//! general-purpose `Arc` replacement: there is no `Weak`, no `get_mut`, no
//! `try_unwrap`. It exists to avoid a second allocation (and a second atomic)
//! beyond `std::sync::Arc` would already cost for this crate's narrow use.

use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Inner<T> {
    count: AtomicUsize,
    value: T,
}

/// A shared handle to a `T` allocated once and refcounted atomically.
///
/// Cloning bumps the count with a relaxed increment (new handles only ever
/// observe state through the handle that created them, so no ordering is
/// needed to synchronize the bump itself — see the note on [`Clone`]).
/// Dropping the last handle frees the allocation after an acquire fence,
/// matching `std::sync::Arc`'s well-known protocol.
pub struct ArcCell<T> {
    ptr: NonNull<Inner<T>>,
}

unsafe impl<T: Send + Sync> Send for ArcCell<T> {}
unsafe impl<T: Send + Sync> Sync for ArcCell<T> {}

impl<T> ArcCell<T> {
    /// Allocates `value` once and returns a handle to it with a use-count of 1.
    pub fn make(value: T) -> Self {
        let boxed = Box::new(Inner {
            count: AtomicUsize::new(1),
            value,
        });
        ArcCell {
            ptr: NonNull::from(Box::leak(boxed)),
        }
    }

    fn inner(&self) -> &Inner<T> {
        unsafe { self.ptr.as_ref() }
    }

    /// The number of live handles sharing this allocation, observed at this
    /// instant. Used by the SPSC/one-shot `is_closed` hints to detect "the
    /// peer has gone away" without a separate closed flag.
    pub fn use_count(&self) -> usize {
        self.inner().count.load(Ordering::Acquire)
    }

    /// Mutable access to the payload. Safe only when the caller can prove no
    /// other handle is concurrently reading or writing it — the ring and slot
    /// engines uphold this through their own cursor/state protocols, never
    /// through `ArcCell` itself.
    ///
    /// # Safety
    /// The caller must ensure no other `ArcCell` clone accesses the payload
    /// for the duration of the returned reference.
    pub unsafe fn get_mut_unchecked(&self) -> &mut T {
        &mut (*self.ptr.as_ptr()).value
    }
}

impl<T> Deref for ArcCell<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner().value
    }
}

impl<T> Clone for ArcCell<T> {
    fn clone(&self) -> Self {
        // Relaxed: incrementing the count only needs to be atomic, not ordered
        // with respect to reads of `value` — those are synchronized separately
        // by the ring/slot cursor protocol, never by this refcount.
        self.inner().count.fetch_add(1, Ordering::Relaxed);
        ArcCell { ptr: self.ptr }
    }
}

impl<T> Drop for ArcCell<T> {
    fn drop(&mut self) {
        // Release: must happen-before the acquire fence below observes it, so
        // that every write made through this handle is visible to whichever
        // handle performs the final free.
        if self.inner().count.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        // Acquire: pairs with every Release fetch_sub above, including this
        // one, ensuring all prior writes by every dropped handle are visible
        // before we drop and deallocate the payload.
        std::sync::atomic::fence(Ordering::Acquire);
        unsafe {
            drop(Box::from_raw(self.ptr.as_ptr()));
        }
    }
}
