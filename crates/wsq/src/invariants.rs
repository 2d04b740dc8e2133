//! Debug assertion macros for the ring invariants documented in spec §3/§7.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`) — zero overhead
//! in release. Used by [`crate::ring`].

// =============================================================================
// INV-RING-01: Bounded Count
// =============================================================================

/// Assert that `tail - head` never exceeds capacity.
///
/// **Invariant**: `0 <= tail (-) head <= N`
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "INV-RING-01 violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

/// Assert that `head` never advances past `tail`.
macro_rules! debug_assert_head_not_past_tail {
    ($new_head:expr, $tail:expr) => {
        debug_assert!(
            $new_head.wrapping_sub($tail) <= (u32::MAX / 2),
            "INV-RING-01 violated: advancing head {} beyond tail {}",
            $new_head,
            $tail
        )
    };
}

// =============================================================================
// INV-RING-02: Steal Halves
// =============================================================================

/// Assert that a completed `grab` copied at most half the ring.
macro_rules! debug_assert_steal_half {
    ($n:expr, $capacity:expr) => {
        debug_assert!(
            $n <= $capacity / 2,
            "INV-RING-02 violated: grab copied {} fibers, more than half of capacity {}",
            $n,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-03: Post-Steal Room
// =============================================================================

/// Assert the destination ring had room for a stolen batch (spec §4.6 step 6).
///
/// `$count` must be the *actual* post-steal live count (`tail - head + n`,
/// computed from a fresh load of the destination's head), not `n` in
/// isolation — `n` alone is always `<= capacity / 2` by construction of
/// `grab`, so it can never by itself reveal a caller contract breach.
///
/// Violation indicates a caller contract breach — stealing into a
/// non-empty ring — and is a fatal programming error, not a recoverable
/// outcome (spec §7). Always enforced, including in release builds.
macro_rules! assert_room_after_steal {
    ($count:expr, $capacity:expr) => {
        assert!(
            $count < $capacity,
            "INV-RING-03 violated: post-steal live count {} reaches or exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-04: Slow-Path Half-Batch Sanity
// =============================================================================

/// Assert that `push_slow` moved exactly `N/2` fibers (spec §4.3, §7).
macro_rules! assert_half_batch {
    ($n:expr, $capacity:expr) => {
        assert!(
            $n == $capacity / 2,
            "INV-RING-04 violated: push_slow moved {} fibers, expected exactly {}",
            $n,
            $capacity / 2
        )
    };
}

pub(crate) use assert_half_batch;
pub(crate) use assert_room_after_steal;
pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_not_past_tail;
pub(crate) use debug_assert_steal_half;
