//! Debug assertion macros for ring and slot invariants.
//!
//! Active only in debug builds (`debug_assert!` itself gates that), so there is
//! zero overhead in release builds.

// =============================================================================
// INV-RING-01: Cursor stays within bounds
// =============================================================================

/// Assert a cursor value is a valid index into a ring of the given capacity.
///
/// **Invariant**: `0 <= cursor < capacity`
macro_rules! debug_assert_cursor_in_bounds {
    ($cursor:expr, $capacity:expr) => {
        debug_assert!(
            ($cursor as usize) < $capacity,
            "INV-RING-01 violated: cursor {} out of bounds for capacity {}",
            $cursor,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-02: Never observe more than capacity - 1 live elements
// =============================================================================

/// Assert the ring never reports more live elements than its usable capacity.
///
/// **Invariant**: `len <= capacity - 1` (one slot is always sacrificed)
macro_rules! debug_assert_usable_capacity {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity - 1,
            "INV-RING-02 violated: len {} exceeds usable capacity {}",
            $len,
            $capacity - 1
        )
    };
}

// =============================================================================
// INV-SLOT-01: One-shot state is monotonic
// =============================================================================

/// Assert a one-shot state transition only moves forward: NotSent(0) -> Sent(1)
/// -> Received(2).
macro_rules! debug_assert_state_monotonic {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-SLOT-01 violated: state went from {} to {}",
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_cursor_in_bounds;
pub(crate) use debug_assert_state_monotonic;
pub(crate) use debug_assert_usable_capacity;
