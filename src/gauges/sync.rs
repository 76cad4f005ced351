use crate::error::SyncError;
use crate::gauges::client::ViewSource;
use crate::gauges::filter::{is_content_hit, normalize_path};
use crate::gauges::state::SyncState;
use crate::gauges::store::ViewStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Result of one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub fetched_dates: Vec<NaiveDate>,
    pub merged_paths: usize,
}

/// Incremental sync engine: sole writer of both the view store and the sync
/// state. One run fetches every missing date from the last sync (or the
/// account signup date) through yesterday, in chronological order, and merges
/// the per-day deltas additively into the cached totals.
///
/// The engine commits per date: after merging date D it persists that date's
/// changed totals and then advances `last_sync_date` to D+1. A crash between
/// the two writes can therefore re-apply at most one date on the next run,
/// not the whole range. After the final date (yesterday) the state lands on
/// today, which also makes a second run on the same day a zero-fetch no-op.
pub struct SyncEngine<'a, S: ViewSource> {
    store: &'a ViewStore,
    source: &'a S,
    state_file: PathBuf,
}

/// Dates that still need fetching: `[start, yesterday]` inclusive, where
/// start is the last sync date, falling back to the signup date, falling
/// back to yesterday alone. A run on the day of the last sync yields an
/// empty range.
pub fn dates_to_fetch(state: &SyncState, today: NaiveDate) -> Vec<NaiveDate> {
    let Some(yesterday) = today.pred_opt() else {
        return Vec::new();
    };
    let start = match state.last_sync_date {
        Some(last) if last == today => return Vec::new(),
        Some(last) => last,
        None => state.signup_date.unwrap_or(yesterday),
    };

    let mut dates = Vec::new();
    let mut date = start;
    while date <= yesterday {
        dates.push(date);
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    dates
}

impl<'a, S: ViewSource> SyncEngine<'a, S> {
    pub fn new(store: &'a ViewStore, source: &'a S, state_file: &Path) -> Self {
        Self {
            store,
            source,
            state_file: state_file.to_path_buf(),
        }
    }

    /// Run one sync. `progress` is invoked once per date before its fetch.
    /// Any fetch failure aborts the run; `last_sync_date` is never advanced
    /// past an unfetched day, so the next run retries it.
    pub fn run(
        &self,
        state: &mut SyncState,
        today: NaiveDate,
        mut progress: impl FnMut(NaiveDate),
    ) -> Result<SyncOutcome, SyncError> {
        let dates = dates_to_fetch(state, today);
        if dates.is_empty() {
            return Ok(SyncOutcome::default());
        }

        let mut totals = self.store.load_all()?;
        let mut outcome = SyncOutcome::default();

        for date in dates {
            progress(date);
            let hits = self.source.fetch(date)?;

            let mut changed = BTreeMap::new();
            for hit in hits {
                if !is_content_hit(&hit, &state.host) {
                    continue;
                }
                let key = normalize_path(&hit.path);
                let total = totals.get(&key).copied().unwrap_or(0) + hit.views;
                totals.insert(key.clone(), total);
                changed.insert(key, total);
            }

            self.store.put_all(&changed)?;
            state.last_sync_date = date.succ_opt();
            state.save(&self.state_file)?;
            outcome.fetched_dates.push(date);
        }

        outcome.merged_paths = totals.len();
        Ok(outcome)
    }
}
