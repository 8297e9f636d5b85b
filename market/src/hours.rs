//! Trading-session gate.
//!
//! Pure function of wall-clock time and watchlist composition. Both markets
//! quote in UTC+08:00 and neither observes daylight saving, so a fixed offset
//! is exact.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday};

use crate::types::Market;

/// Exchange-local offset shared by Shanghai, Shenzhen and Hong Kong.
pub const EXCHANGE_OFFSET: FixedOffset = match FixedOffset::east_opt(8 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid exchange offset"),
};

/// One continuous trading window, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TradingSession {
    fn hm(open: (u32, u32), close: (u32, u32)) -> Self {
        Self {
            open: NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap_or_default(),
        }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.open <= t && t <= self.close
    }
}

impl Market {
    /// Morning and afternoon sessions in exchange-local time.
    pub fn sessions(&self) -> [TradingSession; 2] {
        match self {
            Market::AShare => [
                TradingSession::hm((9, 30), (11, 30)),
                TradingSession::hm((13, 0), (15, 0)),
            ],
            Market::HongKong => [
                TradingSession::hm((9, 30), (12, 0)),
                TradingSession::hm((13, 0), (16, 0)),
            ],
        }
    }

    pub fn is_in_session(&self, t: NaiveTime) -> bool {
        self.sessions().iter().any(|s| s.contains(t))
    }
}

/// Decides whether "now" is inside a tradable session for the watched markets.
#[derive(Debug, Clone, Default)]
pub struct MarketHoursGate {
    holidays: BTreeSet<NaiveDate>,
}

impl MarketHoursGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchange holidays on which the gate stays closed all day.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// Returns true when monitoring should proceed.
    ///
    /// - `market_hours_only == false` always opens the gate.
    /// - A mixed A/HK watchlist is open when either market is in session.
    /// - A watchlist with no recognised HK code uses A-share hours.
    pub fn is_open<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        markets: impl IntoIterator<Item = Market>,
        market_hours_only: bool,
    ) -> bool {
        if !market_hours_only {
            return true;
        }

        let local = now.with_timezone(&EXCHANGE_OFFSET);
        if !self.is_trading_day(local.date_naive()) {
            return false;
        }

        let t = local.time();

        let (mut has_a, mut has_hk) = (false, false);
        for market in markets {
            match market {
                Market::AShare => has_a = true,
                Market::HongKong => has_hk = true,
            }
        }

        match (has_a, has_hk) {
            (true, true) => Market::AShare.is_in_session(t) || Market::HongKong.is_in_session(t),
            (false, true) => Market::HongKong.is_in_session(t),
            _ => Market::AShare.is_in_session(t),
        }
    }
}
