use chrono::{DateTime, FixedOffset, TimeZone};
use proptest::prelude::*;

use market::hours::EXCHANGE_OFFSET;
use market::{Market, MarketHoursGate};

/// 2024-06-12 is a Wednesday, 2024-06-15 a Saturday.
fn local(day: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    EXCHANGE_OFFSET
        .with_ymd_and_hms(2024, 6, day, h, m, s)
        .single()
        .unwrap()
}

#[test]
fn a_share_morning_boundaries_are_inclusive() {
    let gate = MarketHoursGate::new();
    let a = [Market::AShare];

    assert!(gate.is_open(&local(12, 9, 30, 0), a, true));
    assert!(gate.is_open(&local(12, 11, 30, 0), a, true));
    assert!(!gate.is_open(&local(12, 11, 30, 1), a, true));
    assert!(!gate.is_open(&local(12, 9, 29, 59), a, true));
}

#[test]
fn a_share_afternoon_and_lunch_break() {
    let gate = MarketHoursGate::new();
    let a = [Market::AShare];

    assert!(!gate.is_open(&local(12, 12, 30, 0), a, true));
    assert!(gate.is_open(&local(12, 13, 0, 0), a, true));
    assert!(gate.is_open(&local(12, 15, 0, 0), a, true));
    assert!(!gate.is_open(&local(12, 15, 0, 1), a, true));
}

#[test]
fn hk_only_watchlist_uses_hk_windows() {
    let gate = MarketHoursGate::new();
    let hk = [Market::HongKong];

    assert!(gate.is_open(&local(12, 11, 45, 0), hk, true));
    assert!(gate.is_open(&local(12, 12, 0, 0), hk, true));
    assert!(gate.is_open(&local(12, 15, 30, 0), hk, true));
    assert!(gate.is_open(&local(12, 16, 0, 0), hk, true));
    assert!(!gate.is_open(&local(12, 16, 0, 1), hk, true));
}

#[test]
fn mixed_watchlist_is_a_union_of_sessions() {
    let gate = MarketHoursGate::new();
    let mixed = [Market::AShare, Market::HongKong];

    // HK only at 11:45 and 15:30, yet the mixed gate opens.
    assert!(gate.is_open(&local(12, 11, 45, 0), mixed, true));
    assert!(gate.is_open(&local(12, 15, 30, 0), mixed, true));
    // A-share only watchlist stays closed at the same instants.
    assert!(!gate.is_open(&local(12, 11, 45, 0), [Market::AShare], true));
    assert!(!gate.is_open(&local(12, 15, 30, 0), [Market::AShare], true));
}

#[test]
fn empty_watchlist_defaults_to_a_share_hours() {
    let gate = MarketHoursGate::new();
    assert!(gate.is_open(&local(12, 10, 0, 0), std::iter::empty::<Market>(), true));
    assert!(!gate.is_open(&local(12, 15, 30, 0), std::iter::empty::<Market>(), true));
}

proptest! {
    #[test]
    fn weekend_is_always_closed(day in 15u32..=16, h in 0u32..24, m in 0u32..60, s in 0u32..60) {
        let gate = MarketHoursGate::new();
        let now = local(day, h, m, s);
        prop_assert!(!gate.is_open(&now, [Market::AShare, Market::HongKong], true));
    }
}
