//! The in-story clock: hours of the day and the doom threshold.
//!
//! Everything here is a pure function of the tick counter.

/// Ticks in one day.
pub const CYCLE_LENGTH: u64 = 24;

/// The doom clock fires once the tick counter exceeds this value.
pub const DOOM_TICK_THRESHOLD: u64 = 500;

/// Hour of the day for a tick counter.
pub fn cycle_position(tick_counter: u64) -> u64 {
    tick_counter % CYCLE_LENGTH
}

/// Day number (0-based) for a tick counter.
pub fn day_index(tick_counter: u64) -> u64 {
    tick_counter / CYCLE_LENGTH
}

/// Whether the hour of the day lies within `[start, end]`. Bounds are taken
/// modulo the cycle; when `start > end` the window wraps past midnight.
pub fn is_time_window(tick_counter: u64, start: i64, end: i64) -> bool {
    let cycle = CYCLE_LENGTH as i64;
    let start = start.rem_euclid(cycle);
    let end = end.rem_euclid(cycle);
    let current = cycle_position(tick_counter) as i64;
    if start <= end {
        start <= current && current <= end
    } else {
        current >= start || current <= end
    }
}

/// Whether the doom threshold has been crossed.
pub fn doom_reached(tick_counter: u64) -> bool {
    tick_counter > DOOM_TICK_THRESHOLD
}
