use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "popsync", version, about = "Incremental Gauges page-view sync and ranking")]
struct Cli {
    /// Cache directory (defaults to POPSYNC_CACHE_DIR, then .page_views)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the cache directory with credentials and the canonical host
    Init {
        /// Gauges API token
        #[arg(long)]
        token: String,
        /// Gauge (account) identifier
        #[arg(long)]
        gauge_id: String,
        /// Canonical site host or URL; the scheme is stripped
        #[arg(long)]
        host: String,
        /// Earliest date the account has data for (YYYY-MM-DD)
        #[arg(long)]
        signup_date: Option<NaiveDate>,
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Fetch missing dates and merge view deltas into the cache
    Sync,
    /// Print cached resources ordered by descending view count
    Rank {
        /// Show at most this many resources
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report cache layout, config presence, and sync dates
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = popsync::gauges::paths::resolve_cache_paths(cli.cache_dir);

    match cli.command {
        Command::Init {
            token,
            gauge_id,
            host,
            signup_date,
            force,
        } => commands::init::run(&paths, token, gauge_id, host, signup_date, force),
        Command::Sync => commands::sync::run(&paths),
        Command::Rank { limit } => commands::rank::run(&paths, limit),
        Command::Status => {
            let report = commands::status::run(&paths)?;
            report.print();
            if report.ok { Ok(()) } else { anyhow::bail!("status reported issues") }
        }
    }
}
