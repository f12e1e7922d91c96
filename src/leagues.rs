use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leagues Ring Count tracks, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "NFL")]
    Nfl,
    #[serde(rename = "MLB")]
    Mlb,
    #[serde(rename = "NBA")]
    Nba,
    #[serde(rename = "NHL")]
    Nhl,
    #[serde(rename = "CFB")]
    Cfb,
    #[serde(rename = "CBB")]
    Cbb,
}

impl League {
    pub const ALL: [League; 6] = [
        League::Nfl,
        League::Mlb,
        League::Nba,
        League::Nhl,
        League::Cfb,
        League::Cbb,
    ];

    /// Code stored in the `league` column of both tables.
    pub fn code(&self) -> &'static str {
        match self {
            League::Nfl => "NFL",
            League::Mlb => "MLB",
            League::Nba => "NBA",
            League::Nhl => "NHL",
            League::Cfb => "CFB",
            League::Cbb => "CBB",
        }
    }

    /// ESPN CDN image for a team in this league, or for the league itself
    /// when no team id is given. College teams share the `ncaa` path.
    pub fn logo_url(&self, team_espn_id: Option<&str>) -> String {
        const CDN: &str = "https://a.espncdn.com/i";
        let college = matches!(self, League::Cfb | League::Cbb);
        match team_espn_id {
            Some(id) if college => format!("{CDN}/teamlogos/ncaa/500/{id}.png"),
            Some(id) => format!("{CDN}/teamlogos/{}/500/{id}.png", self.code().to_lowercase()),
            None => match self {
                League::Cfb => format!("{CDN}/espn/misc_logos/500/ncaa_football.png"),
                League::Cbb => format!("{CDN}/espn/misc_logos/500/ncaa.png"),
                _ => format!("{CDN}/teamlogos/leagues/500/{}.png", self.code().to_lowercase()),
            },
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown league code {0:?}")]
pub struct UnknownLeague(pub String);

impl FromStr for League {
    type Err = UnknownLeague;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        League::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLeague(s.to_owned()))
    }
}

/// How the stored game title is chosen for a league's championship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Always the league's canonical title ("World Series").
    Canonical,
    /// Titles that carry an edition number ("Super Bowl LIX"). A note
    /// headline containing `marker` wins, then `marker <numeral>` cut from the
    /// event name, then the event name as-is.
    NumberedEdition { marker: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueConfig {
    pub league: League,
    pub sport: &'static str,
    pub espn_league: &'static str,
    pub keywords: &'static [&'static str],
    pub game_title: &'static str,
    /// Decided by a best-of series rather than one game.
    pub is_series: bool,
    pub title_strategy: TitleStrategy,
}

pub static LEAGUES: [LeagueConfig; 6] = [
    LeagueConfig {
        league: League::Nfl,
        sport: "football",
        espn_league: "nfl",
        keywords: &["Super Bowl"],
        game_title: "Super Bowl",
        is_series: false,
        title_strategy: TitleStrategy::NumberedEdition { marker: "Super Bowl" },
    },
    LeagueConfig {
        league: League::Mlb,
        sport: "baseball",
        espn_league: "mlb",
        keywords: &["World Series"],
        game_title: "World Series",
        is_series: true,
        title_strategy: TitleStrategy::Canonical,
    },
    LeagueConfig {
        league: League::Nba,
        sport: "basketball",
        espn_league: "nba",
        keywords: &["NBA Finals"],
        game_title: "NBA Finals",
        is_series: true,
        title_strategy: TitleStrategy::Canonical,
    },
    LeagueConfig {
        league: League::Nhl,
        sport: "hockey",
        espn_league: "nhl",
        keywords: &["Stanley Cup"],
        game_title: "Stanley Cup Finals",
        is_series: true,
        title_strategy: TitleStrategy::Canonical,
    },
    LeagueConfig {
        league: League::Cfb,
        sport: "football",
        espn_league: "college-football",
        keywords: &["National Championship"],
        game_title: "CFP National Championship",
        is_series: false,
        title_strategy: TitleStrategy::Canonical,
    },
    LeagueConfig {
        league: League::Cbb,
        sport: "basketball",
        espn_league: "mens-college-basketball",
        keywords: &["National Championship"],
        game_title: "NCAA Championship Game",
        is_series: false,
        title_strategy: TitleStrategy::Canonical,
    },
];

pub fn config_for(league: League) -> &'static LeagueConfig {
    // LEAGUES holds exactly one entry per variant, in League::ALL order.
    &LEAGUES[league as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_urls_follow_cdn_layout() {
        assert_eq!(
            League::Nfl.logo_url(Some("21")),
            "https://a.espncdn.com/i/teamlogos/nfl/500/21.png"
        );
        assert_eq!(
            League::Cbb.logo_url(Some("150")),
            "https://a.espncdn.com/i/teamlogos/ncaa/500/150.png"
        );
        assert_eq!(
            League::Nhl.logo_url(None),
            "https://a.espncdn.com/i/teamlogos/leagues/500/nhl.png"
        );
        assert_eq!(
            League::Cfb.logo_url(None),
            "https://a.espncdn.com/i/espn/misc_logos/500/ncaa_football.png"
        );
    }

    #[test]
    fn every_league_has_a_config_in_display_order() {
        for (idx, league) in League::ALL.into_iter().enumerate() {
            assert_eq!(LEAGUES[idx].league, league);
            assert_eq!(config_for(league).league, league);
        }
    }

    #[test]
    fn league_codes_round_trip_case_insensitively() {
        assert_eq!("nhl".parse::<League>(), Ok(League::Nhl));
        assert_eq!(" CBB ".parse::<League>(), Ok(League::Cbb));
        assert!("XFL".parse::<League>().is_err());
        assert_eq!(League::Cfb.to_string(), "CFB");
    }

    #[test]
    fn only_baseball_basketball_and_hockey_pros_play_series() {
        let series: Vec<League> = LEAGUES.iter().filter(|c| c.is_series).map(|c| c.league).collect();
        assert_eq!(series, vec![League::Mlb, League::Nba, League::Nhl]);
    }

    #[test]
    fn only_nfl_uses_numbered_titles() {
        for config in &LEAGUES {
            let numbered = matches!(config.title_strategy, TitleStrategy::NumberedEdition { .. });
            assert_eq!(numbered, config.league == League::Nfl, "{}", config.league);
        }
    }
}
