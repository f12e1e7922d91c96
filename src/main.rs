mod config;
mod ingest;
mod leagues;
mod server;
mod state;
mod store;

use crate::config::{Cli, Command};
use crate::ingest::Ingestor;
use crate::leagues::{LEAGUES, League, LeagueConfig, config_for};
use crate::server::AppContext;
use crate::state::messages::RunRequest;
use crate::state::refresher::PeriodicRefresher;
use crate::state::worker::{LastRun, RunWorker};
use crate::store::{NewTeam, SqliteRingStore, TeamRegistry};
use anyhow::{Context, bail};
use clap::Parser;
use espn_api::client::EspnApi;
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("RINGCOUNT_LOG")
                .from_env_lossy(),
        )
        .try_init()
        .context("installing log subscriber")?;

    info!("Opening store at {:?}", cli.db_path);
    let store = Arc::new(
        SqliteRingStore::open(&cli.db_path)
            .with_context(|| format!("opening database {:?}", cli.db_path))?,
    );

    match cli.command() {
        Command::Serve => serve(&cli, store).await,
        Command::RunOnce { leagues } => run_once(&cli, store, &leagues).await,
        Command::ImportTeams { path } => import_teams(&path, &store),
    }
}

fn make_ingestor(cli: &Cli, store: Arc<SqliteRingStore>) -> Ingestor {
    let api = EspnApi::new()
        .with_base_url(cli.espn_base_url.as_str())
        .with_timeout(cli.timeout());
    Ingestor::new(api, store).with_window_days(cli.window_days)
}

async fn serve(cli: &Cli, store: Arc<SqliteRingStore>) -> anyhow::Result<()> {
    // One pending run absorbs any triggers that arrive while it waits.
    let (run_tx, run_rx) = mpsc::channel::<RunRequest>(1);
    let last_run = LastRun::default();

    let worker = RunWorker::new(make_ingestor(cli, store.clone()), &LEAGUES, run_rx, last_run.clone());
    let worker_task = tokio::spawn(worker.run());

    info!("Scheduling ingestion every {} minute(s)", cli.interval_minutes);
    let refresher = PeriodicRefresher::new(run_tx.clone(), cli.interval());
    let refresher_task = tokio::spawn(refresher.run());

    let ctx = AppContext { store, run_requests: run_tx, last_run };
    let result = server::serve(ctx, &cli.bind).await;

    refresher_task.abort();
    worker_task.abort();
    result
}

async fn run_once(cli: &Cli, store: Arc<SqliteRingStore>, only: &[League]) -> anyhow::Result<()> {
    let selected: Vec<&'static LeagueConfig> = if only.is_empty() {
        LEAGUES.iter().collect()
    } else {
        let mut only = only.to_vec();
        only.sort();
        only.dedup();
        only.into_iter().map(config_for).collect()
    };
    let report = make_ingestor(cli, store).run(selected).await;
    let summary = serde_json::to_string_pretty(&report.summary())?;
    println!("{summary}");

    if report.has_failures() {
        for (league, err) in report.failures() {
            error!("[{league}] {err}");
        }
        bail!("{} league(s) failed", report.failures().count());
    }
    Ok(())
}

fn import_teams(path: &Path, store: &SqliteRingStore) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let teams: Vec<NewTeam> =
        serde_json::from_str(&raw).with_context(|| format!("parsing teams from {path:?}"))?;

    for team in &teams {
        store
            .upsert_team(team)
            .with_context(|| format!("upserting {} team {}", team.league, team.espn_id))?;
    }
    info!("Imported {} team(s) from {path:?}", teams.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn import_teams_upserts_each_entry() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"[
                {{"espn_id": "21", "league": "NFL", "name": "Eagles", "city": "Philadelphia",
                  "abbreviation": "PHI", "primary_color": "#004C54", "secondary_color": "#A5ACAF"}},
                {{"espn_id": "19", "league": "MLB", "name": "Dodgers", "city": "Los Angeles"}}
            ]"##
        )
        .unwrap();

        import_teams(file.path(), &store).unwrap();
        import_teams(file.path(), &store).unwrap();

        let eagles = store.find_team("21", League::Nfl).unwrap().unwrap();
        assert_eq!(eagles.abbreviation, "PHI");
        let dodgers = store.find_team("19", League::Mlb).unwrap().unwrap();
        assert_eq!(dodgers.primary_color, "");
        assert_eq!(store.teams_by_ids(&[eagles.id, dodgers.id]).unwrap().len(), 2);
    }

    #[test]
    fn import_teams_rejects_unknown_league() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"espn_id": "1", "league": "XFL", "name": "Roughnecks", "city": "Houston"}}]"#)
            .unwrap();

        let err = import_teams(file.path(), &store).unwrap_err();
        assert!(format!("{err:#}").contains("XFL"), "{err:#}");
    }
}
