//! SQLite schema for the Ring Count database.
//!
//! Each entry is applied once, in order; `PRAGMA user_version` records how
//! many have run.

pub const VERSIONED_SCHEMAS: &[&str] = &[
    // v1: team registry and championships.
    "CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        espn_id TEXT NOT NULL,
        league TEXT NOT NULL,
        name TEXT NOT NULL,
        city TEXT NOT NULL,
        abbreviation TEXT NOT NULL DEFAULT '',
        primary_color TEXT NOT NULL DEFAULT '',
        secondary_color TEXT NOT NULL DEFAULT '',
        UNIQUE (espn_id, league)
    );
    CREATE TABLE IF NOT EXISTS championships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        league TEXT NOT NULL,
        winning_team_id INTEGER REFERENCES teams(id),
        winning_team_display_name TEXT NOT NULL,
        losing_team_id INTEGER REFERENCES teams(id),
        losing_team_display_name TEXT,
        winning_score INTEGER,
        losing_score INTEGER,
        game_title TEXT NOT NULL,
        championship_date TEXT,
        UNIQUE (league, year, game_title)
    );",
    // v2: timeline lookups by team.
    "CREATE INDEX IF NOT EXISTS idx_championships_winner ON championships (winning_team_id);
    CREATE INDEX IF NOT EXISTS idx_championships_loser ON championships (losing_team_id);",
];
