use crate::error::SyncError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Synchronization state, persisted as the reserved `config` entry in the
/// cache directory. `last_sync_date` names the first date that has NOT been
/// merged yet; it is absent until the first successful sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    pub token: String,
    pub gauge_id: String,
    pub host: String,
    #[serde(default)]
    pub signup_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_sync_date: Option<NaiveDate>,
}

/// Strip the URL scheme and trailing slashes from a configured site URL,
/// leaving the bare host used for the cross-host filter.
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

impl SyncState {
    pub fn new(token: String, gauge_id: String, host: String, signup_date: Option<NaiveDate>) -> Self {
        Self {
            token,
            gauge_id,
            host: normalize_host(&host),
            signup_date,
            last_sync_date: None,
        }
    }

    fn validate(&self) -> Result<(), SyncError> {
        if self.token.trim().is_empty() {
            return Err(SyncError::ConfigInvalid("token cannot be empty".into()));
        }
        if self.gauge_id.trim().is_empty() {
            return Err(SyncError::ConfigInvalid("gauge id cannot be empty".into()));
        }
        if self.host.trim().is_empty() {
            return Err(SyncError::ConfigInvalid(
                "canonical host cannot be empty".into(),
            ));
        }
        if self.host.contains("://") {
            return Err(SyncError::ConfigInvalid(format!(
                "canonical host must be scheme-less, got `{}`",
                self.host
            )));
        }
        Ok(())
    }

    /// Load and validate the sync state. A missing file is `ConfigMissing`,
    /// distinct from a present config that has never synced.
    pub fn load(file: &Path) -> Result<Self, SyncError> {
        if !file.exists() {
            return Err(SyncError::ConfigMissing(file.to_path_buf()));
        }
        let raw = fs::read_to_string(file).map_err(|err| SyncError::io("read", file, err))?;
        let state: SyncState = serde_json::from_str(&raw)
            .map_err(|err| SyncError::ConfigInvalid(format!("{}: {err}", file.display())))?;
        state.validate()?;
        Ok(state)
    }

    /// Full overwrite via temp file + rename so the state entry is never torn.
    pub fn save(&self, file: &Path) -> Result<(), SyncError> {
        self.validate()?;
        let parent = file.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|err| SyncError::io("create", parent, err))?;

        let data = serde_json::to_string_pretty(self)
            .map_err(|err| SyncError::ConfigInvalid(err.to_string()))?;
        let mut tmp =
            NamedTempFile::new_in(parent).map_err(|err| SyncError::io("create", parent, err))?;
        tmp.write_all(data.as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .map_err(|err| SyncError::io("write", file, err))?;
        tmp.persist(file)
            .map_err(|err| SyncError::io("write", file, err.error))?;
        Ok(())
    }
}
