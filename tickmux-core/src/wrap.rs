//! Wraparound-aware timestamp comparison
//!
//! The hardware counter is a free-running `u32` that wraps from
//! `0xFFFF_FFFF` to `0`. Timestamps are points on a circle, and two of them
//! can only be ordered when they lie within half the range (2^31 ticks) of
//! each other. Every ordering decision in the crate goes through here.

use tickmux_hal::Timestamp;

/// Signed distance from `b` to `a`
///
/// Positive when `a` is later than `b`, negative when earlier. Only
/// meaningful while the true distance is below 2^31 ticks.
#[inline]
pub const fn delta(a: Timestamp, b: Timestamp) -> i32 {
    a.wrapping_sub(b) as i32
}

/// True if deadline `a` must fire before deadline `b`
#[inline]
pub const fn comes_before(a: Timestamp, b: Timestamp) -> bool {
    delta(a, b) < 0
}

/// True if `deadline` has been reached at counter value `now`
///
/// A deadline equal to `now` counts as reached: arming the comparator for
/// the current instant can miss the match entirely.
#[inline]
pub const fn is_due(deadline: Timestamp, now: Timestamp) -> bool {
    delta(now, deadline) >= 0
}

/// Ticks left until `deadline`, or zero if it has already been reached
#[inline]
pub const fn ticks_until(deadline: Timestamp, now: Timestamp) -> u32 {
    let d = delta(deadline, now);
    if d > 0 {
        d as u32
    } else {
        0
    }
}
