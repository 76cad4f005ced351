use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the sync core. Config, lock, and cache I/O failures
/// are fatal for a run; a `Remote`/`Parse` failure aborts the run before
/// `last_sync_date` is advanced past the unfetched day.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync config not found at {0}; run `popsync init` first")]
    ConfigMissing(PathBuf),
    #[error("sync config invalid: {0}")]
    ConfigInvalid(String),
    #[error("gauges request for {date} failed: {reason}")]
    Remote { date: NaiveDate, reason: String },
    #[error("gauges response for {date} malformed: {reason}")]
    Parse { date: NaiveDate, reason: String },
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache record {path} is corrupt: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },
    #[error("cache directory {0} is locked by another sync run")]
    Locked(PathBuf),
}

impl SyncError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
