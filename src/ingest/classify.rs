//! Pure event filtering and outcome resolution. Nothing here touches the
//! network or the store.

use crate::leagues::{LeagueConfig, TitleStrategy};
use espn_api::{Competitor, Event};
use regex::Regex;
use std::sync::LazyLock;

static SERIES_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)-(\d+)").expect("series score pattern is valid"));

/// Why a matched championship event did not produce a row this run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("game not yet completed")]
    NotCompleted,
    #[error("series not yet completed")]
    SeriesNotCompleted,
    #[error("could not parse series summary {0:?}")]
    UnparsableSeries(String),
    #[error("event has no competitions")]
    NoCompetition,
    #[error("expected two competitors, found {0}")]
    MissingCompetitors(usize),
    #[error("competitors carry winner flags but none is set")]
    NoFlaggedWinner,
    #[error("{0} competitors flagged as winner")]
    AmbiguousWinner(usize),
    #[error("event has no season year")]
    MissingSeason,
}

/// Outcome of a decided championship, before team identities are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DecidedGame {
    pub year: i32,
    pub game_title: String,
    pub winner: Competitor,
    pub loser: Competitor,
    pub winning_score: Option<i64>,
    pub losing_score: Option<i64>,
    pub championship_date: Option<String>,
}

/// Case-insensitive keyword search over the event name and its note headlines.
pub fn matches_keywords(event: &Event, keywords: &[&str]) -> bool {
    let haystack = event.searchable_text().to_lowercase();
    keywords.iter().any(|kw| haystack.contains(&kw.to_lowercase()))
}

/// First `<n>-<m>` in a series summary, as (winner games, loser games).
pub fn parse_series_summary(summary: &str) -> Option<(i64, i64)> {
    let caps = SERIES_SCORE.captures(summary)?;
    let a: i64 = caps[1].parse().ok()?;
    let b: i64 = caps[2].parse().ok()?;
    Some((a.max(b), a.min(b)))
}

/// Stored title for a single-game championship.
pub fn resolve_game_title(config: &LeagueConfig, event: &Event) -> String {
    match config.title_strategy {
        TitleStrategy::Canonical => config.game_title.to_owned(),
        TitleStrategy::NumberedEdition { marker } => numbered_title(marker, event),
    }
}

fn numbered_title(marker: &str, event: &Event) -> String {
    let needle = marker.to_lowercase();

    if let Some(headline) = event
        .headlines
        .iter()
        .find(|h| h.to_lowercase().contains(&needle))
    {
        return headline.clone();
    }

    if event.name.to_lowercase().contains(&needle) {
        let pattern = format!(r"(?i){} [LXVI0-9]+", regex::escape(marker));
        if let Ok(re) = Regex::new(&pattern)
            && let Some(m) = re.find(&event.name)
        {
            return m.as_str().to_owned();
        }
    }

    event.name.clone()
}

/// Split competitors into (winner, loser). Once the provider flags any
/// competitor, the flags alone decide; otherwise the higher score wins, with
/// the provider's listing order breaking ties.
pub fn split_winner_loser(
    competitors: &[Competitor],
) -> Result<(&Competitor, &Competitor), SkipReason> {
    if competitors.len() < 2 {
        return Err(SkipReason::MissingCompetitors(competitors.len()));
    }

    if competitors.iter().any(|c| c.winner.is_some()) {
        let mut flagged = competitors.iter().filter(|c| c.winner == Some(true));
        let winner = flagged.next().ok_or(SkipReason::NoFlaggedWinner)?;
        let extra = flagged.count();
        if extra > 0 {
            return Err(SkipReason::AmbiguousWinner(extra + 1));
        }
        let others = move || competitors.iter().filter(move |c| !std::ptr::eq(*c, winner));
        let loser = others()
            .find(|c| c.winner == Some(false))
            .or_else(|| others().next())
            .ok_or(SkipReason::MissingCompetitors(competitors.len()))?;
        return Ok((winner, loser));
    }

    let mut ranked: Vec<&Competitor> = competitors.iter().collect();
    // Stable: equal scores keep provider order. Unknown scores sort last.
    ranked.sort_by(|a, b| b.numeric_score().cmp(&a.numeric_score()));
    Ok((ranked[0], ranked[1]))
}

/// Resolve a matched event into a decided game, or say why it was skipped.
pub fn decide(config: &LeagueConfig, event: &Event) -> Result<DecidedGame, SkipReason> {
    if config.is_series {
        decide_series(config, event)
    } else {
        decide_single_game(config, event)
    }
}

fn decide_single_game(config: &LeagueConfig, event: &Event) -> Result<DecidedGame, SkipReason> {
    if !event.completed {
        return Err(SkipReason::NotCompleted);
    }

    let year = event.season_year.ok_or(SkipReason::MissingSeason)?;
    let competition = event.competitions.first().ok_or(SkipReason::NoCompetition)?;
    let (winner, loser) = split_winner_loser(&competition.competitors)?;

    Ok(DecidedGame {
        year,
        game_title: resolve_game_title(config, event),
        winning_score: winner.numeric_score(),
        losing_score: loser.numeric_score(),
        winner: winner.clone(),
        loser: loser.clone(),
        championship_date: competition.game_date(),
    })
}

fn decide_series(config: &LeagueConfig, event: &Event) -> Result<DecidedGame, SkipReason> {
    let competition = event.competitions.first().ok_or(SkipReason::NoCompetition)?;

    let series = match &competition.series {
        Some(series) if series.completed => series,
        _ => return Err(SkipReason::SeriesNotCompleted),
    };

    let (winner_games, loser_games) = parse_series_summary(&series.summary)
        .ok_or_else(|| SkipReason::UnparsableSeries(series.summary.clone()))?;

    let year = event.season_year.ok_or(SkipReason::MissingSeason)?;
    let (winner, loser) = split_winner_loser(&competition.competitors)?;

    Ok(DecidedGame {
        year,
        game_title: config.game_title.to_owned(),
        winner: winner.clone(),
        loser: loser.clone(),
        winning_score: Some(winner_games),
        losing_score: Some(loser_games),
        championship_date: competition.game_date(),
    })
}
