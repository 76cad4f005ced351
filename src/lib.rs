//! Incremental page-view sync against the Gauges analytics API, backed by a
//! file-per-resource cache, plus a stable popularity ranking over the cached
//! totals. The content pipeline that owns pages calls into this library; the
//! `popsync` binary is a thin CLI over the same API.

pub mod error;
pub mod gauges;

pub use error::SyncError;
