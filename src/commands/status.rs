use anyhow::Result;
use popsync::SyncError;
use popsync::gauges::paths::CachePaths;
use popsync::gauges::state::SyncState;
use popsync::gauges::store::ViewStore;

use crate::commands::CommandReport;

pub fn run(paths: &CachePaths) -> Result<CommandReport> {
    let mut report = CommandReport::new("status");

    report.detail(format!("cache_dir={}", paths.cache_dir.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));

    if !paths.cache_dir.exists() {
        report.issue("missing cache dir; run `popsync init`");
        return Ok(report);
    }

    let store = ViewStore::new(paths);
    let records = store.load_all()?;
    report.detail(format!("cached_resources={}", records.len()));

    match SyncState::load(&paths.config_file) {
        Ok(state) => {
            report.detail(format!("gauge_id={}", state.gauge_id));
            report.detail(format!("host={}", state.host));
            match state.signup_date {
                Some(date) => report.detail(format!("signup_date={date}")),
                None => report.detail("signup_date=unset".to_string()),
            }
            match state.last_sync_date {
                Some(date) => report.detail(format!("last_sync_date={date}")),
                None => report.detail("last_sync_date=never".to_string()),
            }
        }
        Err(SyncError::ConfigMissing(_)) => {
            report.issue("missing config; run `popsync init`");
        }
        Err(err) => {
            report.issue(format!("config unreadable: {err}"));
        }
    }

    Ok(report)
}
