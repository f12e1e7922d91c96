//! SQLite-backed store implementation.

use super::models::{
    Championship, InsertOutcome, LeagueTeams, NewChampionship, NewTeam, Team, TimelineEntry,
};
use super::schema::VERSIONED_SCHEMAS;
use super::trait_def::{ChampionshipStore, TeamRegistry};
use super::{StoreError, StoreResult};
use crate::leagues::League;
use chrono::{Datelike, NaiveDate};
use log::info;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const TEAM_COLUMNS: &str =
    "t.id, t.espn_id, t.league, t.name, t.city, t.abbreviation, t.primary_color, t.secondary_color";

const CHAMPIONSHIP_COLUMNS: &str = "c.id, c.year, c.league, c.winning_team_id, \
     c.winning_team_display_name, c.losing_team_id, c.losing_team_display_name, \
     c.winning_score, c.losing_score, c.game_title, c.championship_date";

/// SQLite-backed store. One connection behind a mutex; ingestion writes are
/// single-row and short.
#[derive(Clone)]
pub struct SqliteRingStore {
    conn: Arc<Mutex<Connection>>,
}

impl ToSql for League {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for League {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn migrate_if_needed(conn: &mut Connection) -> StoreResult<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let applied = usize::try_from(db_version).unwrap_or(0);
    let latest = VERSIONED_SCHEMAS.len();

    if applied >= latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (idx, sql) in VERSIONED_SCHEMAS.iter().enumerate().skip(applied) {
        info!("Migrating ringcount db from version {} to {}", idx, idx + 1);
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", latest as i64)?;
    tx.commit()?;
    Ok(())
}

impl SqliteRingStore {
    /// Open (creating if needed) the database file at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> StoreResult<Self> {
        let mut conn = Connection::open(db_path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::initialize(&mut conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        Self::initialize(&mut conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn initialize(conn: &mut Connection) -> StoreResult<()> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(conn)?;

        let teams: i64 = conn.query_row("SELECT COUNT(*) FROM teams", [], |r| r.get(0))?;
        let championships: i64 =
            conn.query_row("SELECT COUNT(*) FROM championships", [], |r| r.get(0))?;
        info!("Ring Count store ready: {teams} teams, {championships} championships");
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn timeline(
        &self,
        team_column: &str,
        team_ids: &[i64],
        since: NaiveDate,
    ) -> StoreResult<Vec<TimelineEntry>> {
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {CHAMPIONSHIP_COLUMNS}, {TEAM_COLUMNS}
             FROM championships c
             JOIN teams t ON c.{team_column} = t.id
             WHERE c.{team_column} IN ({})
               AND c.year >= ?
               AND (c.championship_date IS NULL OR c.championship_date >= ?)
             ORDER BY c.year DESC, c.league",
            placeholders(team_ids.len())
        );

        let mut values: Vec<Value> = team_ids.iter().map(|id| Value::Integer(*id)).collect();
        values.push(Value::Integer(i64::from(since.year())));
        values.push(Value::Text(since.format("%Y-%m-%d").to_string()));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(TimelineEntry::new(read_championship(row, 0)?, read_team(row, 11)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn read_team(row: &Row<'_>, offset: usize) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(offset)?,
        espn_id: row.get(offset + 1)?,
        league: row.get(offset + 2)?,
        name: row.get(offset + 3)?,
        city: row.get(offset + 4)?,
        abbreviation: row.get(offset + 5)?,
        primary_color: row.get(offset + 6)?,
        secondary_color: row.get(offset + 7)?,
    })
}

fn read_championship(row: &Row<'_>, offset: usize) -> rusqlite::Result<Championship> {
    Ok(Championship {
        id: row.get(offset)?,
        year: row.get(offset + 1)?,
        league: row.get(offset + 2)?,
        winning_team_id: row.get(offset + 3)?,
        winning_team_display_name: row.get(offset + 4)?,
        losing_team_id: row.get(offset + 5)?,
        losing_team_display_name: row.get(offset + 6)?,
        winning_score: row.get(offset + 7)?,
        losing_score: row.get(offset + 8)?,
        game_title: row.get(offset + 9)?,
        championship_date: row.get(offset + 10)?,
    })
}

impl TeamRegistry for SqliteRingStore {
    fn find_team(&self, espn_id: &str, league: League) -> StoreResult<Option<Team>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.espn_id = ?1 AND t.league = ?2"
        ))?;
        let team = stmt
            .query_row(params![espn_id, league], |row| read_team(row, 0))
            .optional()?;
        Ok(team)
    }

    fn upsert_team(&self, team: &NewTeam) -> StoreResult<i64> {
        let conn = self.conn()?;
        let id = conn.query_row(
            "INSERT INTO teams
                (espn_id, league, name, city, abbreviation, primary_color, secondary_color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (espn_id, league) DO UPDATE SET
                name = excluded.name,
                city = excluded.city,
                abbreviation = excluded.abbreviation,
                primary_color = excluded.primary_color,
                secondary_color = excluded.secondary_color
             RETURNING id",
            params![
                team.espn_id,
                team.league,
                team.name,
                team.city,
                team.abbreviation,
                team.primary_color,
                team.secondary_color,
            ],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    fn teams_by_league(&self) -> StoreResult<Vec<LeagueTeams>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams t ORDER BY t.city, t.name"))?;
        let teams = stmt
            .query_map([], |row| read_team(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: Vec<LeagueTeams> = League::ALL
            .into_iter()
            .map(|league| LeagueTeams { league, teams: Vec::new() })
            .collect();
        for team in teams {
            if let Some(group) = grouped.iter_mut().find(|g| g.league == team.league) {
                group.teams.push(team);
            }
        }
        Ok(grouped)
    }

    fn teams_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Team>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id IN ({}) ORDER BY t.league, t.city",
            placeholders(ids.len())
        ))?;
        let teams = stmt
            .query_map(params_from_iter(ids.iter()), |row| read_team(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }
}

impl ChampionshipStore for SqliteRingStore {
    fn championship_exists(&self, league: League, year: i32, game_title: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id FROM championships WHERE league = ?1 AND year = ?2 AND game_title = ?3",
        )?;
        let found: Option<i64> = stmt
            .query_row(params![league, year, game_title], |r| r.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_championship(&self, c: &NewChampionship) -> StoreResult<InsertOutcome> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "INSERT INTO championships
                (year, league, winning_team_id, winning_team_display_name, losing_team_id,
                 losing_team_display_name, winning_score, losing_score, game_title, championship_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (league, year, game_title) DO NOTHING",
            params![
                c.year,
                c.league,
                c.winning_team_id,
                c.winning_team_display_name,
                c.losing_team_id,
                c.losing_team_display_name,
                c.winning_score,
                c.losing_score,
                c.game_title,
                c.championship_date,
            ],
        )?;

        if changed == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted(conn.last_insert_rowid()))
        }
    }

    fn championships_won(&self, team_ids: &[i64], since: NaiveDate) -> StoreResult<Vec<TimelineEntry>> {
        self.timeline("winning_team_id", team_ids, since)
    }

    fn championships_lost(&self, team_ids: &[i64], since: NaiveDate) -> StoreResult<Vec<TimelineEntry>> {
        self.timeline("losing_team_id", team_ids, since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_team(espn_id: &str, league: League, city: &str, name: &str) -> NewTeam {
        NewTeam {
            espn_id: espn_id.to_string(),
            league,
            name: name.to_string(),
            city: city.to_string(),
            abbreviation: String::new(),
            primary_color: "#000000".to_string(),
            secondary_color: "#ffffff".to_string(),
        }
    }

    fn make_championship(league: League, year: i32, title: &str) -> NewChampionship {
        NewChampionship {
            year,
            league,
            winning_team_id: None,
            winning_team_display_name: "Winner".to_string(),
            losing_team_id: None,
            losing_team_display_name: Some("Loser".to_string()),
            winning_score: Some(4),
            losing_score: Some(1),
            game_title: title.to_string(),
            championship_date: Some(format!("{}-10-30", year)),
        }
    }

    #[test]
    fn test_find_team_is_scoped_by_league() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        store.upsert_team(&make_team("12", League::Nfl, "Kansas City", "Chiefs")).unwrap();
        store.upsert_team(&make_team("12", League::Nba, "Miami", "Heat")).unwrap();

        let chiefs = store.find_team("12", League::Nfl).unwrap().unwrap();
        assert_eq!(chiefs.display_name(), "Kansas City Chiefs");
        let heat = store.find_team("12", League::Nba).unwrap().unwrap();
        assert_eq!(heat.display_name(), "Miami Heat");
        assert!(store.find_team("12", League::Nhl).unwrap().is_none());
    }

    #[test]
    fn test_upsert_team_keeps_row_id() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let first = store.upsert_team(&make_team("21", League::Nfl, "Philadelphia", "Eagles")).unwrap();
        let mut renamed = make_team("21", League::Nfl, "Philadelphia", "Eagles");
        renamed.abbreviation = "PHI".to_string();
        let second = store.upsert_team(&renamed).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.find_team("21", League::Nfl).unwrap().unwrap().abbreviation, "PHI");
    }

    #[test]
    fn test_insert_then_exists() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        assert!(!store.championship_exists(League::Mlb, 2024, "World Series").unwrap());

        let outcome = store.insert_championship(&make_championship(League::Mlb, 2024, "World Series")).unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
        assert!(store.championship_exists(League::Mlb, 2024, "World Series").unwrap());
        assert!(!store.championship_exists(League::Mlb, 2023, "World Series").unwrap());
        assert!(!store.championship_exists(League::Nba, 2024, "World Series").unwrap());
    }

    #[test]
    fn test_duplicate_insert_is_reported_not_failed() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let row = make_championship(League::Nhl, 2024, "Stanley Cup Finals");
        store.insert_championship(&row).unwrap();

        let mut again = row.clone();
        again.winning_team_display_name = "Someone Else".to_string();
        assert_eq!(store.insert_championship(&again).unwrap(), InsertOutcome::AlreadyExists);

        let count: i64 = store
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM championships", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_timeline_filters_by_team_and_date() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let dodgers = store.upsert_team(&make_team("19", League::Mlb, "Los Angeles", "Dodgers")).unwrap();
        let yankees = store.upsert_team(&make_team("10", League::Mlb, "New York", "Yankees")).unwrap();

        for (year, date) in [(2020, Some("2020-10-27")), (2024, Some("2024-10-30")), (1988, None)] {
            let mut row = make_championship(League::Mlb, year, "World Series");
            row.winning_team_id = Some(dodgers);
            row.losing_team_id = Some(yankees);
            row.championship_date = date.map(str::to_owned);
            store.insert_championship(&row).unwrap();
        }

        let since = NaiveDate::from_ymd_opt(2020, 11, 1).unwrap();
        let won = store.championships_won(&[dodgers], since).unwrap();
        assert_eq!(won.len(), 1);
        assert_eq!(won[0].championship.year, 2024);
        assert_eq!(won[0].team.name, "Dodgers");

        let since = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        let won = store.championships_won(&[dodgers], since).unwrap();
        assert_eq!(won.iter().map(|e| e.championship.year).collect::<Vec<_>>(), vec![2024, 2020, 1988]);

        let lost = store.championships_lost(&[yankees], since).unwrap();
        assert_eq!(lost.len(), 3);
        assert_eq!(lost[0].team.name, "Yankees");

        assert!(store.championships_won(&[yankees], since).unwrap().is_empty());
        assert!(store.championships_won(&[], since).unwrap().is_empty());
    }

    #[test]
    fn test_teams_grouped_in_league_order() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        store.upsert_team(&make_team("1", League::Nhl, "Toronto", "Maple Leafs")).unwrap();
        store.upsert_team(&make_team("2", League::Nfl, "Philadelphia", "Eagles")).unwrap();
        store.upsert_team(&make_team("3", League::Nfl, "Kansas City", "Chiefs")).unwrap();

        let grouped = store.teams_by_league().unwrap();
        assert_eq!(grouped.iter().map(|g| g.league).collect::<Vec<_>>(), League::ALL.to_vec());
        let nfl: Vec<&str> = grouped[0].teams.iter().map(|t| t.city.as_str()).collect();
        assert_eq!(nfl, vec!["Kansas City", "Philadelphia"]);
        assert!(grouped[1].teams.is_empty());
        assert_eq!(grouped[3].teams.len(), 1);
    }

    #[test]
    fn test_teams_by_ids() {
        let store = SqliteRingStore::open_in_memory().unwrap();
        let a = store.upsert_team(&make_team("1", League::Nhl, "Toronto", "Maple Leafs")).unwrap();
        let b = store.upsert_team(&make_team("2", League::Cbb, "Storrs", "Huskies")).unwrap();
        store.upsert_team(&make_team("3", League::Nfl, "Denver", "Broncos")).unwrap();

        let teams = store.teams_by_ids(&[a, b]).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].league, League::Cbb);
        assert!(store.teams_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_keeps_rows_and_schema_version() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("ringcount.db");
        {
            let store = SqliteRingStore::open(&db_path).unwrap();
            store.insert_championship(&make_championship(League::Nba, 2024, "NBA Finals")).unwrap();
        }

        let store = SqliteRingStore::open(&db_path).unwrap();
        assert!(store.championship_exists(League::Nba, 2024, "NBA Finals").unwrap());
        let version: i64 = store
            .conn()
            .unwrap()
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version as usize, VERSIONED_SCHEMAS.len());
    }
}
