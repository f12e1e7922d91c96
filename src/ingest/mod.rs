//! Championship ingestion: fetch each league's postseason scoreboard, keep
//! the championship events, decide them, and record new titles.

pub mod classify;
mod report;

pub use report::{IngestError, LeagueRun, LeagueSummary, RunReport, RunSummary};

use crate::leagues::LeagueConfig;
use crate::store::{
    ChampionshipStore, InsertOutcome, NewChampionship, RingStore, StoreResult, TeamRegistry,
};
use chrono::{NaiveDate, Utc};
use classify::{DecidedGame, SkipReason};
use espn_api::client::EspnApi;
use espn_api::{Competitor, DateRange, Event};
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
enum EventOutcome {
    Inserted,
    Duplicate,
    Skipped(SkipReason),
}

#[derive(Clone)]
pub struct Ingestor {
    api: EspnApi,
    store: Arc<dyn RingStore>,
    window_days: i64,
}

impl Ingestor {
    pub fn new(api: EspnApi, store: Arc<dyn RingStore>) -> Self {
        Self { api, store, window_days: DEFAULT_WINDOW_DAYS }
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }

    /// Run the given leagues concurrently and wait for all of them to settle.
    pub async fn run<I>(&self, leagues: I) -> RunReport
    where
        I: IntoIterator<Item = &'static LeagueConfig>,
    {
        let started_at = Utc::now();
        let today = started_at.date_naive();
        let leagues: Vec<&'static LeagueConfig> = leagues.into_iter().collect();

        let handles: Vec<_> = leagues
            .iter()
            .map(|&config| {
                let ingestor = self.clone();
                tokio::spawn(async move { ingestor.ingest_on(config, today).await })
            })
            .collect();

        let results = join_all(handles).await;

        let leagues: Vec<LeagueRun> = leagues
            .iter()
            .zip(results)
            .map(|(config, joined)| LeagueRun {
                league: config.league,
                result: joined.unwrap_or_else(|e| Err(IngestError::TaskPanicked(e.to_string()))),
            })
            .collect();

        let report = RunReport { started_at, finished_at: Utc::now(), leagues };
        for (league, err) in report.errors() {
            if err.is_recoverable() {
                warn!("[{league}] {err}");
            } else {
                error!("[{league}] ERROR: {err}");
            }
        }
        info!("Run complete: {} championship(s) inserted", report.inserted());
        report
    }

    /// Ingest one league over the window ending on `today`.
    async fn ingest_on(
        &self,
        config: &LeagueConfig,
        today: NaiveDate,
    ) -> Result<LeagueSummary, IngestError> {
        let league = config.league;
        let dates = DateRange::trailing(today, self.window_days);
        debug!("[{league}] Fetching: {}", self.api.scoreboard_url(config.sport, config.espn_league, &dates));

        let events = match self
            .api
            .fetch_postseason_events(config.sport, config.espn_league, &dates)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                info!("[{league}] Scoreboard unavailable, skipping this run");
                return Err(e.into());
            }
        };

        let mut summary = LeagueSummary { events: events.len(), ..Default::default() };
        info!("[{league}] Found {} event(s)", events.len());

        for event in &events {
            if !classify::matches_keywords(event, config.keywords) {
                continue;
            }
            summary.matched += 1;
            info!("[{league}] Matched championship event: {}", event.name);

            match self.process_event(config, event)? {
                EventOutcome::Inserted => summary.inserted += 1,
                EventOutcome::Duplicate => summary.duplicates += 1,
                EventOutcome::Skipped(reason) => {
                    info!("[{league}] Skipping {}: {reason}", event.name);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    fn process_event(&self, config: &LeagueConfig, event: &Event) -> StoreResult<EventOutcome> {
        let game = match classify::decide(config, event) {
            Ok(game) => game,
            Err(reason) => return Ok(EventOutcome::Skipped(reason)),
        };
        self.record(config, game)
    }

    fn record(&self, config: &LeagueConfig, game: DecidedGame) -> StoreResult<EventOutcome> {
        let league = config.league;

        let (winning_team_id, winner_name) = self.resolve_team(config, &game.winner)?;
        let (losing_team_id, loser_name) = self.resolve_team(config, &game.loser)?;

        if self.store.championship_exists(league, game.year, &game.game_title)? {
            debug!("[{league}] Already have {} for {}, skipping", game.game_title, game.year);
            return Ok(EventOutcome::Duplicate);
        }

        info!(
            "[{league}] Inserting: {} {} - {} ({}) def. {} ({})",
            game.year,
            game.game_title,
            winner_name,
            score_label(game.winning_score),
            loser_name,
            score_label(game.losing_score),
        );

        let row = NewChampionship {
            year: game.year,
            league,
            winning_team_id,
            winning_team_display_name: winner_name,
            losing_team_id,
            losing_team_display_name: Some(loser_name),
            winning_score: game.winning_score,
            losing_score: game.losing_score,
            game_title: game.game_title,
            championship_date: game.championship_date,
        };

        match self.store.insert_championship(&row)? {
            InsertOutcome::Inserted(id) => {
                info!("[{league}] Inserted successfully (id {id})");
                Ok(EventOutcome::Inserted)
            }
            InsertOutcome::AlreadyExists => {
                debug!("[{league}] Lost insert race for {} {}", row.year, row.game_title);
                Ok(EventOutcome::Duplicate)
            }
        }
    }

    /// Registry id and display name for a competitor, falling back to ESPN's
    /// own name when the team is not seeded.
    fn resolve_team(
        &self,
        config: &LeagueConfig,
        competitor: &Competitor,
    ) -> StoreResult<(Option<i64>, String)> {
        let Some(espn_id) = competitor.team_id.as_deref() else {
            return Ok((None, competitor.display_name.clone()));
        };

        match self.store.find_team(espn_id, config.league)? {
            Some(team) => Ok((Some(team.id), team.display_name())),
            None => {
                debug!(
                    "[{}] No registry entry for ESPN team {espn_id} ({})",
                    config.league, competitor.display_name
                );
                Ok((None, competitor.display_name.clone()))
            }
        }
    }
}

fn score_label(score: Option<i64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "?".to_owned())
}
