//! Miri-compatible tests for detecting undefined behavior.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! These exercise the unsafe code paths directly: raw buffer construct/destruct
//! in the ring, the tri-state slot's construct-at-most-once/destruct-exactly-once
//! contract, and the Arc cell's free-on-last-drop path.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ringcell_rs::arc_cell::ArcCell;
use ringcell_rs::oneshot::oneshot_channel;
use ringcell_rs::overflow::{OverwriteOnFull, WaitOnFull};
use ringcell_rs::spsc::spsc_channel;
use ringcell_rs::wait::Spin;

#[test]
fn miri_ring_wrap_around_construct_destruct() {
    let (tx, rx) = spsc_channel::<u64, WaitOnFull, Spin>(4); // capacity rounds to 4
    for round in 0..5u64 {
        for i in 0..3 {
            tx.try_send(round * 10 + i).unwrap();
        }
        for i in 0..3 {
            assert_eq!(rx.try_receive().unwrap(), round * 10 + i);
        }
    }
}

#[test]
fn miri_ring_drop_destructs_every_live_non_trivial_element() {
    struct Boxed(Box<u64>);

    let (tx, rx) = spsc_channel::<Boxed, WaitOnFull, Spin>(8);
    tx.try_send(Boxed(Box::new(1))).unwrap();
    tx.try_send(Boxed(Box::new(2))).unwrap();
    assert_eq!(*rx.try_receive().unwrap().0, 1);
    tx.try_send(Boxed(Box::new(3))).unwrap();
    // Two elements (2, 3) remain live and unreceived; dropping both handles
    // must run their destructors with no leak and no double-free.
    drop(tx);
    drop(rx);
}

#[test]
fn miri_overwrite_destructs_the_clobbered_element() {
    struct Boxed(Box<u64>);

    let (tx, rx) = spsc_channel::<Boxed, OverwriteOnFull, Spin>(2); // usable = 1
    tx.send(Boxed(Box::new(1)));
    tx.send(Boxed(Box::new(2))); // overwrites the first, destructing it
    assert_eq!(*rx.try_receive().unwrap().0, 2);
    drop(tx);
    drop(rx);
}

#[test]
fn miri_oneshot_sent_but_unreceived_drops_exactly_once() {
    let (tx, rx) = oneshot_channel::<Box<u64>, Spin>();
    tx.send(Box::new(42)).unwrap();
    drop(rx); // never received; the slot's own Drop must run the destructor.
}

#[test]
fn miri_oneshot_received_value_is_not_double_dropped() {
    let (tx, rx) = oneshot_channel::<Box<u64>, Spin>();
    tx.send(Box::new(42)).unwrap();
    let v = rx.receive().unwrap();
    assert_eq!(*v, 42);
    drop(v);
}

#[test]
fn miri_arc_cell_concurrent_clone_drop_frees_exactly_once() {
    let cell = ArcCell::make(AtomicU32::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = cell.clone();
            std::thread::spawn(move || {
                c.fetch_add(1, Ordering::SeqCst);
                drop(c);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cell.load(Ordering::SeqCst), 4);
}

#[test]
fn miri_arc_cell_payload_survives_until_last_handle_drops() {
    let cell = ArcCell::make(Arc::new(7u64));
    let clone_a = cell.clone();
    let clone_b = cell.clone();
    drop(cell);
    assert_eq!(**clone_a, 7);
    drop(clone_a);
    assert_eq!(**clone_b, 7);
}
