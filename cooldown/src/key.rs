use std::fmt;

use chrono::TimeDelta;
use serde::Deserialize;

/// Deterministic identity of "this alert condition" for suppression.
///
/// The string form is what gets persisted, so it must stay stable across
/// releases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertKey {
    PriceAbove { code: String },
    PriceBelow { code: String },
    /// Move at or past the surge threshold, banded by signed whole percent.
    /// A negative threshold yields negative bands (`_up_-4`).
    Surge { code: String, band: i32 },
    /// Downward move, banded by whole percent of the magnitude.
    Plunge { code: String, band: u32 },
    Volatile { code: String },
}

impl AlertKey {
    pub fn price_above(code: &str) -> Self {
        AlertKey::PriceAbove { code: code.into() }
    }

    pub fn price_below(code: &str) -> Self {
        AlertKey::PriceBelow { code: code.into() }
    }

    pub fn surge(code: &str, change_pct: f64) -> Self {
        AlertKey::Surge {
            code: code.into(),
            band: signed_pct_band(change_pct),
        }
    }

    pub fn plunge(code: &str, change_pct: f64) -> Self {
        AlertKey::Plunge {
            code: code.into(),
            band: pct_band(change_pct),
        }
    }

    pub fn volatile(code: &str) -> Self {
        AlertKey::Volatile { code: code.into() }
    }

    pub fn code(&self) -> &str {
        match self {
            AlertKey::PriceAbove { code }
            | AlertKey::PriceBelow { code }
            | AlertKey::Surge { code, .. }
            | AlertKey::Plunge { code, .. }
            | AlertKey::Volatile { code } => code,
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKey::PriceAbove { code } => write!(f, "{code}_price_above"),
            AlertKey::PriceBelow { code } => write!(f, "{code}_price_below"),
            AlertKey::Surge { code, band } => write!(f, "{code}_up_{band}"),
            AlertKey::Plunge { code, band } => write!(f, "{code}_down_{band}"),
            AlertKey::Volatile { code } => write!(f, "{code}_volatile"),
        }
    }
}

/// Floor of a signed percent move: `5.9` is band 5, `-3.5` is band -4.
pub fn signed_pct_band(change_pct: f64) -> i32 {
    let floor = change_pct.floor();
    if floor.is_finite() {
        // `as` saturates at the i32 bounds
        floor as i32
    } else {
        0
    }
}

/// Band of a percent move: floor of its magnitude. `5.0` and `5.9` share
/// band 5, `-5.1` and `-5.9` share band 5, `6.0` starts band 6.
pub fn pct_band(change_pct: f64) -> u32 {
    let magnitude = change_pct.abs().floor();
    if magnitude.is_finite() {
        // `as` saturates at u32::MAX
        magnitude as u32
    } else {
        0
    }
}

/// Suppression windows per rule family, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CooldownWindows {
    pub price_minutes: u32,
    pub change_pct_minutes: u32,
    pub volatile_minutes: u32,
}

impl Default for CooldownWindows {
    fn default() -> Self {
        Self {
            price_minutes: 60,
            change_pct_minutes: 30,
            volatile_minutes: 60,
        }
    }
}

impl CooldownWindows {
    pub fn window_for(&self, key: &AlertKey) -> TimeDelta {
        let minutes = match key {
            AlertKey::PriceAbove { .. } | AlertKey::PriceBelow { .. } => self.price_minutes,
            AlertKey::Surge { .. } | AlertKey::Plunge { .. } => self.change_pct_minutes,
            AlertKey::Volatile { .. } => self.volatile_minutes,
        };
        TimeDelta::minutes(i64::from(minutes))
    }

    /// Longest window; records older than this can never suppress anything.
    pub fn horizon(&self) -> TimeDelta {
        let longest = self
            .price_minutes
            .max(self.change_pct_minutes)
            .max(self.volatile_minutes);
        TimeDelta::minutes(i64::from(longest))
    }
}
