//! Optional metrics for monitoring channel activity.
//!
//! Each counter is a relaxed [`AtomicU64`], incremented on the hot path with no
//! synchronization beyond atomicity — these are observational, never load-bearing
//! for correctness, so paying for anything stronger than `Relaxed` would be pure
//! overhead.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live, shared counters updated by the sender/producer and consumer/receiver
/// sides of a channel.
#[derive(Debug, Default)]
pub struct Metrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    send_retries: AtomicU64,
    overwrites: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_send_retry(&self) {
        self.send_retries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_overwrite(&self) {
        self.overwrites.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough point-in-time snapshot for reporting. Each field
    /// is read independently, so the snapshot is not atomic as a whole.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            send_retries: self.send_retries.load(Ordering::Relaxed),
            overwrites: self.overwrites.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of a [`Metrics`] block's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub send_retries: u64,
    pub overwrites: u64,
}
