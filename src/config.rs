use crate::ingest::DEFAULT_WINDOW_DAYS;
use crate::leagues::League;
use clap::{Parser, Subcommand};
use espn_api::client::ESPN_SITE_V2;
use std::path::PathBuf;
use std::time::Duration;

/// Championship ingestion service: polls ESPN for finished title games and
/// records them, and serves the results over HTTP.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to the SQLite database file.
    #[clap(long, env = "RINGCOUNT_DB", default_value = "ringcount.db", global = true)]
    pub db_path: PathBuf,

    /// Address for the HTTP listener.
    #[clap(long, env = "RINGCOUNT_BIND", default_value = "127.0.0.1:8788", global = true)]
    pub bind: String,

    /// Minutes between scheduled ingestion runs.
    #[clap(long, env = "RINGCOUNT_INTERVAL_MINUTES", default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..), global = true)]
    pub interval_minutes: u64,

    /// Days of scoreboard history fetched per run, ending today.
    #[clap(long, env = "RINGCOUNT_WINDOW_DAYS", default_value_t = DEFAULT_WINDOW_DAYS,
        value_parser = clap::value_parser!(i64).range(0..=366), global = true)]
    pub window_days: i64,

    /// ESPN site API root.
    #[clap(long, env = "RINGCOUNT_ESPN_BASE_URL", default_value = ESPN_SITE_V2, global = true)]
    pub espn_base_url: String,

    /// Per-request timeout for ESPN calls, in seconds.
    #[clap(long, env = "RINGCOUNT_TIMEOUT_SECS", default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..), global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the scheduler and HTTP listener (default).
    Serve,
    /// Ingest once in the foreground and exit.
    RunOnce {
        /// Restrict the run to these league codes (comma-separated).
        #[clap(long = "league", value_delimiter = ',')]
        leagues: Vec<League>,
    },
    /// Upsert teams from a JSON array into the registry.
    ImportTeams {
        path: PathBuf,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
