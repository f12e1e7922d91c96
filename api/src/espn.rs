//! ESPN API raw wire types: serde shapes for deserializing ESPN responses.
//! These map to our clean domain types via the mapping functions in client.rs.
//! Every field is optional; ESPN omits keys freely between sports and seasons.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub season: Option<EspnSeason>,
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
    pub notes: Option<Vec<EspnNote>>,
    pub date: Option<String>, // ISO 8601
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnSeason {
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub season_type: Option<u8>, // 3 = postseason
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatusType {
    pub name: Option<String>, // "STATUS_SCHEDULED", "STATUS_IN_PROGRESS", "STATUS_FINAL"
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnNote {
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub headline: Option<String>, // "Super Bowl LIX", "World Series - Game 5"
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnCompetition {
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub series: Option<EspnSeries>,
    pub date: Option<String>, // "2025-02-09T23:30Z"
}

/// Best-of-series progress, only present for MLB/NBA/NHL playoff games.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnSeries {
    pub completed: Option<bool>,
    pub summary: Option<String>, // "LAD win series 4-1", "Series tied 2-2"
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnCompetitor {
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    pub team: Option<EspnTeam>,
    pub score: Option<String>, // ESPN sends scores as strings
    pub winner: Option<bool>,
    pub order: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnTeam {
    pub id: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub abbreviation: Option<String>,
}
