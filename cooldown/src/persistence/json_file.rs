//! JSON-file cooldown persistence.
//!
//! The file is a flat object `{ "<alert key>": "<RFC 3339 timestamp>" }`.
//! Saves go to a sibling `.tmp` file which is fsynced and then renamed over
//! the target, so a crash mid-write leaves the previous state intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{CooldownPersistence, RawCooldowns};

pub struct JsonFileCooldownStore {
    path: PathBuf,
}

impl JsonFileCooldownStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cooldowns.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CooldownPersistence for JsonFileCooldownStore {
    #[instrument(skip(self), fields(path = %self.path.display()), level = "debug")]
    async fn load(&self) -> anyhow::Result<RawCooldowns> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cooldown file yet; starting empty");
                return Ok(RawCooldowns::new());
            }
            Err(e) => return Err(e).context("failed to read cooldown file"),
        };

        let object: serde_json::Map<String, Value> =
            serde_json::from_str(&content).context("cooldown file is not a JSON object")?;

        let mut records = RawCooldowns::new();
        for (key, value) in object {
            match value {
                Value::String(ts) => {
                    records.insert(key, ts);
                }
                other => debug!(key = %key, value = %other, "ignoring non-string cooldown entry"),
            }
        }

        Ok(records)
    }

    #[instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()), level = "debug")]
    async fn save(&self, records: &RawCooldowns) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create cooldown directory")?;
        }

        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.tmp_path();

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;

        let written = async {
            file.write_all(json.as_bytes())
                .await
                .context("failed to write cooldown temp file")?;
            file.sync_all()
                .await
                .context("failed to sync cooldown temp file")?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path)
                .await
                .context("atomic rename of cooldown file failed")
        }
        .await;

        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }

        written
    }
}
