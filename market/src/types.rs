use std::fmt;

use serde::{Deserialize, Serialize};

/// Amplitudes above this are treated as feed glitches and clamped.
pub const MAX_AMPLITUDE_PCT: f64 = 20.0;

/// Source market of a quote. Decides session hours and the volume unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    /// Shanghai / Shenzhen listed shares (`sh`, `sz` prefixes).
    #[serde(rename = "a_share")]
    AShare,

    /// Hong Kong listed shares (`hk` prefix).
    #[serde(rename = "hk")]
    HongKong,
}

impl Market {
    /// Derives the market from a market-prefixed ticker such as `sh600000`
    /// or `hk00700`.
    pub fn from_code(code: &str) -> Option<Market> {
        let prefix = code.get(..2)?.to_ascii_lowercase();
        match prefix.as_str() {
            "sh" | "sz" => Some(Market::AShare),
            "hk" => Some(Market::HongKong),
            _ => None,
        }
    }

    /// Unit that `Quote::volume` is expressed in for this market.
    pub fn volume_unit(&self) -> &'static str {
        match self {
            Market::AShare => "10k lots",
            Market::HongKong => "M shares",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Market::AShare => "A-share",
            Market::HongKong => "HK",
        };
        f.write_str(s)
    }
}

/// Raw prices as delivered by a quote source, before derivation.
///
/// `volume` must already be normalised to `Market::volume_unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub name: String,
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    pub volume: f64,
}

/// Snapshot of one instrument at one point in time, with derived change and
/// amplitude. Built fresh every run and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub name: String,
    pub market: Market,
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    pub volume: f64,

    /// `current - prev_close`.
    pub change: f64,

    /// Percent change against the previous close; 0 when the previous close
    /// is missing or non-positive.
    pub change_pct: f64,

    /// Intraday high-low range as a percent of the open (falling back to the
    /// previous close), clamped to `[0, MAX_AMPLITUDE_PCT]`.
    pub amplitude: f64,
}

impl Quote {
    pub fn new(market: Market, snapshot: PriceSnapshot) -> Self {
        let PriceSnapshot {
            name,
            current,
            open,
            high,
            low,
            prev_close,
            volume,
        } = snapshot;

        Self {
            change: current - prev_close,
            change_pct: change_pct(current, prev_close),
            amplitude: amplitude(open, high, low, prev_close),
            name,
            market,
            current,
            open,
            high,
            low,
            prev_close,
            volume,
        }
    }
}

/// Fail-safe: bad reference data yields 0, never an infinite percentage.
pub fn change_pct(current: f64, prev_close: f64) -> f64 {
    if prev_close <= 0.0 {
        return 0.0;
    }
    (current - prev_close) / prev_close * 100.0
}

pub fn amplitude(open: f64, high: f64, low: f64, prev_close: f64) -> f64 {
    let base = if open > 0.0 { open } else { prev_close };
    if base <= 0.0 {
        return 0.0;
    }

    let raw = (high - low) / base * 100.0;
    if raw > 0.0 {
        raw.min(MAX_AMPLITUDE_PCT)
    } else {
        0.0
    }
}
