pub mod client;
pub mod espn;

use chrono::{Duration, NaiveDate};
use std::fmt;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of ESPN wire format
// ---------------------------------------------------------------------------

/// One scoreboard entry. Absent wire fields collapse to empty/`None` here so
/// downstream code never has to reach through nested `Option`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub season_year: Option<i32>,
    pub completed: bool,
    pub competitions: Vec<Competition>,
    pub headlines: Vec<String>,
}

impl Event {
    /// Event name followed by every note headline, space separated.
    pub fn searchable_text(&self) -> String {
        let mut text = self.name.clone();
        for headline in &self.headlines {
            text.push(' ');
            text.push_str(headline);
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Competition {
    pub competitors: Vec<Competitor>,
    pub series: Option<SeriesStatus>,
    pub date: Option<String>,
}

impl Competition {
    /// Calendar date of the game, `YYYY-MM-DD`, taken from the ISO timestamp.
    pub fn game_date(&self) -> Option<String> {
        let date = self.date.as_deref()?;
        let day = date.split('T').next().unwrap_or(date);
        if day.is_empty() { None } else { Some(day.to_owned()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Competitor {
    pub team_id: Option<String>, // ESPN team id, scoped per league
    pub display_name: String,    // "Philadelphia Eagles"
    pub score: Option<String>,
    pub winner: Option<bool>, // explicit flag, only present once decided
    pub order: Option<u32>,
}

impl Competitor {
    pub fn numeric_score(&self) -> Option<i64> {
        self.score.as_deref().and_then(|s| s.trim().parse::<i64>().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesStatus {
    pub completed: bool,
    pub summary: String,
}

/// Inclusive range of calendar days, rendered the way the scoreboard
/// `dates` parameter expects: `YYYYMMDD-YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Window ending on `today` and starting `days` days before it.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self { start: today - Duration::days(days), end: today }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%Y%m%d"), self.end.format("%Y%m%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_spans_seven_days_back() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 12).unwrap();
        let range = DateRange::trailing(today, 7);
        assert_eq!(range.to_string(), "20250205-20250212");
    }

    #[test]
    fn trailing_window_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        assert_eq!(DateRange::trailing(today, 7).to_string(), "20241227-20250103");
    }

    #[test]
    fn game_date_strips_time_component() {
        let comp = Competition { date: Some("2025-02-09T23:30Z".into()), ..Default::default() };
        assert_eq!(comp.game_date().as_deref(), Some("2025-02-09"));

        let bare = Competition { date: Some("2024-10-30".into()), ..Default::default() };
        assert_eq!(bare.game_date().as_deref(), Some("2024-10-30"));

        assert_eq!(Competition::default().game_date(), None);
    }

    #[test]
    fn searchable_text_joins_name_and_headlines() {
        let event = Event {
            name: "AFC/NFC Championship".into(),
            headlines: vec!["Super Bowl LIX".into(), "Caesars Superdome".into()],
            ..Default::default()
        };
        assert_eq!(event.searchable_text(), "AFC/NFC Championship Super Bowl LIX Caesars Superdome");
    }

    #[test]
    fn numeric_score_rejects_non_numbers() {
        let c = Competitor { score: Some(" 40 ".into()), ..Default::default() };
        assert_eq!(c.numeric_score(), Some(40));
        let blank = Competitor { score: Some("".into()), ..Default::default() };
        assert_eq!(blank.numeric_score(), None);
        assert_eq!(Competitor::default().numeric_score(), None);
    }
}
