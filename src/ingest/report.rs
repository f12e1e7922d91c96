use crate::leagues::League;
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use espn_api::client::ApiError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// ESPN unreachable, non-2xx, or an unreadable body. Nothing to ingest
    /// this run; the next run retries.
    #[error("scoreboard unavailable: {0}")]
    Upstream(#[from] ApiError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("league task panicked: {0}")]
    TaskPanicked(String),
}

impl IngestError {
    /// Upstream trouble is expected now and then; everything else points at
    /// our own infrastructure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::Upstream(_))
    }
}

/// Per-league tallies for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeagueSummary {
    pub events: usize,
    pub matched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct LeagueRun {
    pub league: League,
    pub result: Result<LeagueSummary, IngestError>,
}

/// Outcome of one pipeline pass across every configured league.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub leagues: Vec<LeagueRun>,
}

impl RunReport {
    pub fn inserted(&self) -> usize {
        self.leagues
            .iter()
            .filter_map(|run| run.result.as_ref().ok())
            .map(|summary| summary.inserted)
            .sum()
    }

    /// Every league that ended in an error, recoverable or not.
    pub fn errors(&self) -> impl Iterator<Item = (League, &IngestError)> {
        self.leagues
            .iter()
            .filter_map(|run| run.result.as_ref().err().map(|e| (run.league, e)))
    }

    /// Leagues whose run failed for reasons other than the provider.
    pub fn failures(&self) -> impl Iterator<Item = (League, &IngestError)> {
        self.errors().filter(|(_, e)| !e.is_recoverable())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            finished_at: self.finished_at,
            inserted: self.inserted(),
            leagues: self
                .leagues
                .iter()
                .map(|run| match &run.result {
                    Ok(summary) => LeagueRunSummary {
                        league: run.league,
                        summary: Some(summary.clone()),
                        error: None,
                        recoverable: true,
                    },
                    Err(e) => LeagueRunSummary {
                        league: run.league,
                        summary: None,
                        error: Some(e.to_string()),
                        recoverable: e.is_recoverable(),
                    },
                })
                .collect(),
        }
    }
}

/// Serializable view of a [`RunReport`], served by `/runs/last`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inserted: usize,
    pub leagues: Vec<LeagueRunSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueRunSummary {
    pub league: League,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LeagueSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub recoverable: bool,
}
