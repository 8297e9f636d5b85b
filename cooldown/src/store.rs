use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, instrument, warn};

use common::logger::warn_if_slow;

use crate::key::AlertKey;
use crate::persistence::{CooldownPersistence, RawCooldowns, format_timestamp, parse_timestamp};

/// In-memory cooldown map for one run: loaded at start, mutated during
/// evaluation, committed once at the end.
///
/// This is a plain value. Nothing global, so each run (and each test) owns
/// its own copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooldownStore {
    records: BTreeMap<String, DateTime<Utc>>,
}

impl CooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs state from persistence. Unreadable or corrupt state
    /// degrades to an empty store: cooldowns reset, the run goes on.
    #[instrument(skip(persistence), target = "cooldown")]
    pub async fn load(persistence: &dyn CooldownPersistence) -> Self {
        let raw = warn_if_slow("cooldown_load", Duration::from_millis(200), async {
            persistence.load().await
        })
        .await;

        match raw {
            Ok(raw) => Self::from_raw(raw),
            Err(e) => {
                warn!(error = ?e, "cooldown state unreadable; starting with empty history");
                Self::new()
            }
        }
    }

    /// Builds the store from persisted strings, dropping values that do not
    /// parse as timestamps.
    pub fn from_raw(raw: RawCooldowns) -> Self {
        let total = raw.len();
        let records: BTreeMap<_, _> = raw
            .into_iter()
            .filter_map(|(key, ts)| match parse_timestamp(&ts) {
                Some(t) => Some((key, t)),
                None => {
                    debug!(key = %key, value = %ts, "dropping unparsable cooldown timestamp");
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!(
                dropped = total - records.len(),
                kept = records.len(),
                "some cooldown records were unparsable"
            );
        }

        Self { records }
    }

    pub fn to_raw(&self) -> RawCooldowns {
        self.records
            .iter()
            .map(|(k, t)| (k.clone(), format_timestamp(*t)))
            .collect()
    }

    /// True iff `key` fired less than `window` before `now`.
    pub fn is_recently_fired(&self, key: &AlertKey, window: TimeDelta, now: DateTime<Utc>) -> bool {
        match self.records.get(&key.to_string()) {
            Some(last) => now.signed_duration_since(*last) < window,
            None => false,
        }
    }

    /// Marks `key` as fired at `now`. In memory only until `commit`.
    pub fn record(&mut self, key: &AlertKey, now: DateTime<Utc>) {
        self.records.insert(key.to_string(), now);
    }

    pub fn last_fired(&self, key: &AlertKey) -> Option<DateTime<Utc>> {
        self.records.get(&key.to_string()).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops records older than `horizon`; they can no longer suppress
    /// anything. Returns how many were removed.
    pub fn prune(&mut self, horizon: TimeDelta, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, last| now.signed_duration_since(*last) < horizon);
        before - self.records.len()
    }

    /// Persists the full map in one write.
    #[instrument(skip(self, persistence), target = "cooldown", fields(count = self.records.len()))]
    pub async fn commit(&self, persistence: &dyn CooldownPersistence) -> anyhow::Result<()> {
        let raw = self.to_raw();

        warn_if_slow("cooldown_commit", Duration::from_millis(200), async {
            persistence.save(&raw).await
        })
        .await?;

        info!("cooldown state committed");
        Ok(())
    }
}
