//! Store trait definitions.

use super::models::{
    InsertOutcome, LeagueTeams, NewChampionship, NewTeam, Team, TimelineEntry,
};
use super::StoreResult;
use crate::leagues::League;
use chrono::NaiveDate;

/// Pre-seeded team reference data.
pub trait TeamRegistry: Send + Sync {
    /// Look up a team by its ESPN id within one league.
    fn find_team(&self, espn_id: &str, league: League) -> StoreResult<Option<Team>>;

    /// Insert or refresh a team, keyed by (espn_id, league). Returns the row id.
    fn upsert_team(&self, team: &NewTeam) -> StoreResult<i64>;

    /// Every team, grouped by league in display order, each group sorted by
    /// city then name. Leagues without teams are present with an empty list.
    fn teams_by_league(&self) -> StoreResult<Vec<LeagueTeams>>;

    fn teams_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Team>>;
}

/// Championship rows written by ingestion and read by the timeline.
pub trait ChampionshipStore: Send + Sync {
    fn championship_exists(&self, league: League, year: i32, game_title: &str) -> StoreResult<bool>;

    /// Insert a championship. A row already present for the same
    /// (league, year, game_title) is reported, not treated as an error.
    fn insert_championship(&self, championship: &NewChampionship) -> StoreResult<InsertOutcome>;

    /// Titles won by any of `team_ids` since `since`, newest first.
    fn championships_won(&self, team_ids: &[i64], since: NaiveDate) -> StoreResult<Vec<TimelineEntry>>;

    /// Finals lost by any of `team_ids` since `since`, newest first.
    fn championships_lost(&self, team_ids: &[i64], since: NaiveDate) -> StoreResult<Vec<TimelineEntry>>;
}

/// Everything the service needs from its database.
pub trait RingStore: TeamRegistry + ChampionshipStore {}

impl<T: TeamRegistry + ChampionshipStore> RingStore for T {}
