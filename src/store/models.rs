//! Rows of the `teams` and `championships` tables.

use crate::leagues::League;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub espn_id: String,
    pub league: League,
    pub name: String, // "Eagles"
    pub city: String, // "Philadelphia"
    pub abbreviation: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Team {
    /// "Philadelphia Eagles"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }
}

/// Seed record for the team registry, keyed by (espn_id, league).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTeam {
    pub espn_id: String,
    pub league: League,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Championship {
    pub id: i64,
    pub year: i32,
    pub league: League,
    pub winning_team_id: Option<i64>,
    pub winning_team_display_name: String,
    pub losing_team_id: Option<i64>,
    pub losing_team_display_name: Option<String>,
    pub winning_score: Option<i64>, // games won for series leagues
    pub losing_score: Option<i64>,
    pub game_title: String,
    pub championship_date: Option<String>, // YYYY-MM-DD
}

impl Championship {
    /// Calendar year the title was decided. Seasons straddle years, so the
    /// date wins over the season year when it is known.
    pub fn played_year(&self) -> i32 {
        self.championship_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year())
            .unwrap_or(self.year)
    }
}

/// Championship row as produced by the ingestion pipeline, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChampionship {
    pub year: i32,
    pub league: League,
    pub winning_team_id: Option<i64>,
    pub winning_team_display_name: String,
    pub losing_team_id: Option<i64>,
    pub losing_team_display_name: Option<String>,
    pub winning_score: Option<i64>,
    pub losing_score: Option<i64>,
    pub game_title: String,
    pub championship_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// A row for the same (league, year, game_title) was already present.
    AlreadyExists,
}

/// A championship joined with the team row it is being listed for (the
/// winner on the titles timeline, the loser on the losses timeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub championship: Championship,
    pub played_year: i32,
    pub team: Team,
}

impl TimelineEntry {
    pub fn new(championship: Championship, team: Team) -> Self {
        Self { played_year: championship.played_year(), championship, team }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueTeams {
    pub league: League,
    pub teams: Vec<Team>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn championship(year: i32, date: Option<&str>) -> Championship {
        Championship {
            id: 1,
            year,
            league: League::Nfl,
            winning_team_id: None,
            winning_team_display_name: "Philadelphia Eagles".into(),
            losing_team_id: None,
            losing_team_display_name: Some("Kansas City Chiefs".into()),
            winning_score: Some(40),
            losing_score: Some(22),
            game_title: "Super Bowl LIX".into(),
            championship_date: date.map(str::to_owned),
        }
    }

    #[test]
    fn played_year_prefers_the_game_date() {
        assert_eq!(championship(2024, Some("2025-02-09")).played_year(), 2025);
    }

    #[test]
    fn played_year_falls_back_to_season() {
        assert_eq!(championship(2024, None).played_year(), 2024);
        assert_eq!(championship(2024, Some("garbage")).played_year(), 2024);
    }

    #[test]
    fn team_display_name_is_city_then_name() {
        let team = Team {
            id: 7,
            espn_id: "21".into(),
            league: League::Nfl,
            name: "Eagles".into(),
            city: "Philadelphia".into(),
            abbreviation: "PHI".into(),
            primary_color: "#004C54".into(),
            secondary_color: "#A5ACAF".into(),
        };
        assert_eq!(team.display_name(), "Philadelphia Eagles");
    }
}
