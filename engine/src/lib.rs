pub mod alert;
pub mod config;
pub mod error;
pub mod monitor;
pub mod rules;
pub mod signals;

pub use alert::{AlertEvent, AlertKind, AlertLevel};
pub use config::{AlertRuleConfig, AppConfig, CooldownBackend, MonitorConfig, MonitoringSettings, WatchlistEntry};
pub use error::{ConfigError, EngineError};
pub use monitor::{MonitorRun, RunOutcome, RunReport};
pub use rules::AlertRuleEngine;
pub use signals::{Signal, SignalGenerator, SignalKind};
