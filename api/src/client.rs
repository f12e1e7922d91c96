use crate::espn::{EspnCompetition, EspnCompetitor, EspnEvent, ScoreboardResponse};
use crate::{Competition, Competitor, DateRange, Event, SeriesStatus};
use reqwest::Client;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const ESPN_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// ESPN season type for the postseason.
const POSTSEASON: u8 = 3;

/// Scoreboard client backed by ESPN's public site endpoints.
#[derive(Debug, Clone)]
pub struct EspnApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for EspnApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("ringcount/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: ESPN_SITE_V2.to_owned(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("API error for {1}: {0}")]
    Api(#[source] reqwest::Error, String),
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),
}

impl EspnApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scoreboard_url(&self, sport: &str, league: &str, dates: &DateRange) -> String {
        format!(
            "{}/{sport}/{league}/scoreboard?seasontype={POSTSEASON}&dates={dates}",
            self.base_url
        )
    }

    /// Fetch postseason scoreboard events for a sport/league pair over `dates`.
    ///
    /// Any non-success status is an error here; callers decide whether that
    /// means "nothing to do this time".
    pub async fn fetch_postseason_events(
        &self,
        sport: &str,
        league: &str,
        dates: &DateRange,
    ) -> ApiResult<Vec<Event>> {
        let url = self.scoreboard_url(sport, league, dates);
        let raw: ScoreboardResponse = self.get(&url).await?;
        Ok(raw.events.unwrap_or_default().into_iter().map(map_event).collect())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_event(event: EspnEvent) -> Event {
    let completed = event
        .status
        .as_ref()
        .and_then(|s| s.status_type.as_ref())
        .and_then(|t| t.completed)
        .unwrap_or(false);

    let headlines = event
        .notes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| n.headline)
        .collect();

    Event {
        id: event.id.unwrap_or_default(),
        name: event.name.unwrap_or_default(),
        season_year: event.season.and_then(|s| s.year),
        completed,
        competitions: event
            .competitions
            .unwrap_or_default()
            .into_iter()
            .map(map_competition)
            .collect(),
        headlines,
    }
}

fn map_competition(competition: EspnCompetition) -> Competition {
    let series = competition.series.map(|s| SeriesStatus {
        completed: s.completed.unwrap_or(false),
        summary: s.summary.unwrap_or_default(),
    });

    Competition {
        competitors: competition
            .competitors
            .unwrap_or_default()
            .into_iter()
            .map(map_competitor)
            .collect(),
        series,
        date: competition.date,
    }
}

fn map_competitor(c: EspnCompetitor) -> Competitor {
    let (team_id, display_name) = match c.team {
        Some(team) => (team.id.or(c.id), team.display_name.unwrap_or_default()),
        None => (c.id, String::new()),
    };

    Competitor {
        team_id,
        display_name,
        score: c.score,
        winner: c.winner,
        order: c.order,
    }
}
