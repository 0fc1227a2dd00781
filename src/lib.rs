//! ringcell-rs - lock-free SPSC ring and one-shot channels over a shared atomic cell
//!
//! Two inter-thread primitives, each usable by exactly one producer and one
//! consumer thread:
//!
//! - [`spsc`]: a bounded ring-buffer channel for a FIFO stream of values.
//! - [`oneshot`]: a single-value channel, consumed at most once.
//!
//! Both are built on [`arc_cell::ArcCell`], a minimal atomic-refcounted control
//! block, and both take their blocking behavior from a compile-time
//! [`wait::WaitStrategy`] rather than a runtime configuration value.
//!
//! # Example
//!
//! ```
//! use ringcell_rs::spsc::spsc_channel;
//! use ringcell_rs::overflow::WaitOnFull;
//! use ringcell_rs::wait::Spin;
//!
//! let (tx, rx) = spsc_channel::<u64, WaitOnFull, Spin>(16);
//! tx.send(42);
//! assert_eq!(rx.receive(), Some(42));
//! ```
//!
//! ```
//! use ringcell_rs::oneshot::oneshot_channel;
//! use ringcell_rs::wait::Spin;
//!
//! let (tx, rx) = oneshot_channel::<u64, Spin>();
//! tx.send(57).unwrap();
//! assert_eq!(rx.receive(), Ok(57));
//! ```

pub mod arc_cell;
pub mod error;
mod invariants;
pub mod metrics;
pub mod oneshot;
pub mod overflow;
mod ring;
mod slot;
pub mod spsc;
pub mod wait;

pub use arc_cell::ArcCell;
pub use error::{RecvError, SendError, TryRecvError, TryReceiveError, TrySendError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use oneshot::{oneshot_channel, Receiver as OneshotReceiver, Sender as OneshotSender};
pub use overflow::{OverflowPolicy, OverwriteOnFull, WaitOnFull};
pub use spsc::{spsc_channel, Receiver as SpscReceiver, Sender as SpscSender};
pub use wait::{AtomicWait, Spin, WaitStrategy, Yield};
