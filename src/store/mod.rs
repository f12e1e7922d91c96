mod models;
mod schema;
mod sqlite;
mod trait_def;

pub use models::{InsertOutcome, LeagueTeams, NewChampionship, NewTeam, Team, TimelineEntry};
pub use sqlite::SqliteRingStore;
pub use trait_def::{ChampionshipStore, RingStore, TeamRegistry};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store connection lock poisoned")]
    Poisoned,
}
