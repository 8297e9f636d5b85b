use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use cooldown::CooldownWindows;
use market::{Market, MarketHoursGate};

use crate::error::ConfigError;

// =========================
// Monitor configuration (JSON document)
// =========================

/// Validated monitor configuration, built once at startup and immutable for
/// the life of the process.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub monitoring: MonitoringSettings,
    pub watchlist: Vec<WatchlistEntry>,
    pub cooldown: CooldownWindows,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    /// Master switch. A disabled monitor does nothing at all.
    pub enabled: bool,

    /// Restrict runs to trading sessions of the watched markets.
    pub market_hours_only: bool,

    /// Exchange holidays (`YYYY-MM-DD`) treated as non-trading days.
    pub holidays: Vec<NaiveDate>,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            market_hours_only: true,
            holidays: Vec::new(),
        }
    }
}

/// One monitored instrument.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchlistEntry {
    /// Market-prefixed ticker, e.g. `sh600000` or `hk00700`.
    pub code: String,

    /// Display name used when the feed does not supply one.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub alerts: AlertRuleConfig,
}

impl WatchlistEntry {
    pub fn market(&self) -> Option<Market> {
        Market::from_code(&self.code)
    }
}

/// Threshold per rule. `None` disables the rule for this entry; unknown keys
/// in the document are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct AlertRuleConfig {
    pub price_above: Option<f64>,
    pub price_below: Option<f64>,
    pub change_pct_above: Option<f64>,
    pub change_pct_below: Option<f64>,
}

impl AlertRuleConfig {
    fn thresholds(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("price_above", self.price_above),
            ("price_below", self.price_below),
            ("change_pct_above", self.change_pct_above),
            ("change_pct_below", self.change_pct_below),
        ]
    }
}

impl MonitorConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut cfg: MonitorConfig = serde_json::from_str(raw)?;
        cfg.drop_unsupported_codes();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Entries without a recognised market prefix can never be quoted; they
    /// are left out so the rest of the watchlist keeps running.
    fn drop_unsupported_codes(&mut self) {
        self.watchlist.retain(|entry| {
            let known = entry.market().is_some();
            if !known {
                warn!(code = %entry.code, "unsupported market prefix; watchlist entry skipped");
            }
            known
        });
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Never fails: an absent, malformed or invalid document yields the
    /// disabled, empty default.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => {
                info!(
                    path = %path.display(),
                    enabled = cfg.monitoring.enabled,
                    watchlist = cfg.watchlist.len(),
                    "monitor config loaded"
                );
                cfg
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "monitor config unavailable; monitoring disabled");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::with_capacity(self.watchlist.len());

        for entry in &self.watchlist {
            if entry.market().is_none() {
                return Err(ConfigError::UnknownMarket(entry.code.clone()));
            }

            if !seen.insert(entry.code.as_str()) {
                return Err(ConfigError::DuplicateCode(entry.code.clone()));
            }

            for (rule, threshold) in entry.alerts.thresholds() {
                if threshold.is_some_and(|v| !v.is_finite()) {
                    return Err(ConfigError::NonFiniteThreshold {
                        code: entry.code.clone(),
                        rule,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn codes(&self) -> Vec<String> {
        self.watchlist.iter().map(|e| e.code.clone()).collect()
    }

    pub fn markets(&self) -> impl Iterator<Item = Market> + '_ {
        self.watchlist.iter().filter_map(WatchlistEntry::market)
    }

    pub fn gate(&self) -> MarketHoursGate {
        MarketHoursGate::new().with_holidays(self.monitoring.holidays.iter().copied())
    }
}

// =========================
// Process configuration (environment)
// =========================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownBackend {
    JsonFile,
    Sqlite,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Monitor configuration document.
    pub config_path: PathBuf,

    /// Where cooldown state lives (JSON file or SQLite database).
    pub state_path: PathBuf,

    pub cooldown_backend: CooldownBackend,

    /// Primary quote feed.
    pub tencent_endpoint: String,

    /// Fallback quote feed (A-shares only).
    pub sina_endpoint: String,

    /// Per-request timeout enforced by the HTTP client.
    pub fetch_timeout: Duration,

    /// Loop period. `None` runs once and exits.
    pub interval: Option<Duration>,

    /// Structured JSON logs instead of pretty output.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());

        let cooldown_backend = match var("STOCK_MONITOR_COOLDOWN_BACKEND", "json").as_str() {
            "sqlite" => CooldownBackend::Sqlite,
            _ => CooldownBackend::JsonFile,
        };

        let secs = |name: &str| std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok());

        Self {
            config_path: var("STOCK_MONITOR_CONFIG", "stock_monitor_config.json").into(),
            state_path: var("STOCK_MONITOR_STATE", "stock_monitor_data.json").into(),
            cooldown_backend,
            tencent_endpoint: var("STOCK_MONITOR_TENCENT_URL", market::tencent::client::DEFAULT_ENDPOINT),
            sina_endpoint: var("STOCK_MONITOR_SINA_URL", market::sina::client::DEFAULT_ENDPOINT),
            fetch_timeout: Duration::from_secs(secs("STOCK_MONITOR_FETCH_TIMEOUT_SECS").unwrap_or(10)),
            interval: secs("STOCK_MONITOR_INTERVAL_SECS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            json_logs: std::env::var("APP_ENV").unwrap_or_default() == "production",
        }
    }
}
