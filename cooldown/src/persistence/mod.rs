pub mod json_file;
pub mod sqlite;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use market::hours::EXCHANGE_OFFSET;

pub use json_file::JsonFileCooldownStore;
pub use sqlite::SqliteCooldownStore;

/// Raw persisted form: alert key → ISO-8601 timestamp.
pub type RawCooldowns = BTreeMap<String, String>;

/// Durable backing for the cooldown map.
///
/// Implementations report failures; it is the caller's job to degrade.
#[async_trait]
pub trait CooldownPersistence: Send + Sync {
    async fn load(&self) -> anyhow::Result<RawCooldowns>;

    /// Replaces the persisted map as a whole. Must never leave a partially
    /// written state visible.
    async fn save(&self, records: &RawCooldowns) -> anyhow::Result<()>;
}

/// Accepts RFC 3339, or a naive ISO-8601 timestamp taken as exchange-local
/// time (the format older state files were written in).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    naive
        .and_local_timezone(EXCHANGE_OFFSET)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
