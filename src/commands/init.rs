use anyhow::Result;
use chrono::NaiveDate;
use popsync::gauges::paths::CachePaths;
use popsync::gauges::state::SyncState;

pub fn run(
    paths: &CachePaths,
    token: String,
    gauge_id: String,
    host: String,
    signup_date: Option<NaiveDate>,
    force: bool,
) -> Result<()> {
    if paths.config_file.exists() && !force {
        anyhow::bail!(
            "config already exists at {}; pass --force to overwrite",
            paths.config_file.display()
        );
    }

    let state = SyncState::new(token, gauge_id, host, signup_date);
    state.save(&paths.config_file)?;

    println!("initialized cache at {}", paths.cache_dir.display());
    println!("canonical host: {}", state.host);
    match state.signup_date {
        Some(date) => println!("signup date: {date}"),
        None => println!("signup date: unset (first sync fetches yesterday only)"),
    }
    Ok(())
}
