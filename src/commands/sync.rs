use anyhow::Result;
use chrono::Local;
use fs2::FileExt;
use popsync::SyncError;
use popsync::gauges::client::GaugesClient;
use popsync::gauges::paths::CachePaths;
use popsync::gauges::state::SyncState;
use popsync::gauges::store::ViewStore;
use popsync::gauges::sync::SyncEngine;
use std::fs;

pub fn run(paths: &CachePaths) -> Result<()> {
    let mut state = SyncState::load(&paths.config_file)?;

    // At most one sync run per cache directory.
    fs::create_dir_all(&paths.cache_dir)
        .map_err(|err| SyncError::io("create", &paths.cache_dir, err))?;
    let lock = fs::File::create(&paths.lock_file)
        .map_err(|err| SyncError::io("create", &paths.lock_file, err))?;
    lock.try_lock_exclusive()
        .map_err(|_| SyncError::Locked(paths.cache_dir.clone()))?;

    let store = ViewStore::new(paths);
    let client = GaugesClient::new(&state)?;
    let engine = SyncEngine::new(&store, &client, &paths.config_file);

    let today = Local::now().date_naive();
    let outcome = engine.run(&mut state, today, |date| {
        println!("fetching views for {date}");
    })?;

    if outcome.fetched_dates.is_empty() {
        println!("already synced today; nothing to fetch");
    } else {
        println!(
            "merged {} day(s) across {} resource(s)",
            outcome.fetched_dates.len(),
            outcome.merged_paths
        );
    }
    Ok(())
}
