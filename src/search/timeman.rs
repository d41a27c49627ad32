//! Converts the game clock into a per-move think budget.

/// Never think for less than this, even when flagging.
pub const MIN_THINK_MS: u64 = 10;
/// Reserved for network latency when playing online.
pub const LAG_MARGIN_MS: u64 = 50;
/// Fraction of the remaining clock spent per move.
pub const CLOCK_FRACTION: u64 = 30;

/// Millisecond budget for the next move given the remaining clock and
/// increment. Never allocates more than half the remaining clock.
pub fn allocate(remaining_ms: u64, increment_ms: u64, online: bool) -> u64 {
    let mut budget = remaining_ms / CLOCK_FRACTION + increment_ms / 2;
    if online {
        budget = budget.saturating_sub(LAG_MARGIN_MS);
    }
    budget.min(remaining_ms / 2).max(MIN_THINK_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_scales_with_clock_and_increment() {
        assert_eq!(allocate(60_000, 0, false), 2_000);
        assert_eq!(allocate(60_000, 1_000, false), 2_500);
        assert!(allocate(300_000, 2_000, false) > allocate(60_000, 2_000, false));
    }

    #[test]
    fn never_spends_more_than_half_the_clock() {
        assert!(allocate(100, 10_000, false) <= 50.max(MIN_THINK_MS));
    }

    #[test]
    fn floors_at_minimum_think_time() {
        assert_eq!(allocate(0, 0, false), MIN_THINK_MS);
        assert_eq!(allocate(0, 0, true), MIN_THINK_MS);
    }

    #[test]
    fn online_reserves_lag_margin() {
        let offline = allocate(60_000, 0, false);
        let online = allocate(60_000, 0, true);
        assert_eq!(offline - online, LAG_MARGIN_MS);
    }
}
