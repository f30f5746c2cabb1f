//! Table definitions.
//!
//! `migrate` is idempotent and runs on every server start.

use sqlx::PgPool;

use crate::errors::LeagueResult;

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS teams (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(64) NOT NULL,
        logo_url TEXT,
        captain_id BIGINT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS players (
        id BIGSERIAL PRIMARY KEY,
        team_id BIGINT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
        name VARCHAR(64) NOT NULL,
        jersey_number INTEGER NOT NULL,
        goals_scored INTEGER NOT NULL DEFAULT 0,
        red_cards INTEGER NOT NULL DEFAULT 0,
        is_banned BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id)",
    "CREATE TABLE IF NOT EXISTS tournaments (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(64) NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity >= 2),
        status VARCHAR(16) NOT NULL DEFAULT 'registration',
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS tournament_registrations (
        id BIGSERIAL PRIMARY KEY,
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        team_id BIGINT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
        registered_at TIMESTAMP NOT NULL DEFAULT NOW(),
        UNIQUE (tournament_id, team_id)
    )",
    "CREATE TABLE IF NOT EXISTS matches (
        id BIGSERIAL PRIMARY KEY,
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        round INTEGER NOT NULL,
        match_number INTEGER NOT NULL,
        team_a_id BIGINT REFERENCES teams(id),
        team_b_id BIGINT REFERENCES teams(id),
        score_a INTEGER NOT NULL DEFAULT 0,
        score_b INTEGER NOT NULL DEFAULT 0,
        status VARCHAR(32) NOT NULL DEFAULT 'scheduled',
        next_match_id BIGINT REFERENCES matches(id),
        next_slot VARCHAR(1),
        walkover BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE (tournament_id, round, match_number)
    )",
    "CREATE TABLE IF NOT EXISTS match_events (
        id BIGSERIAL PRIMARY KEY,
        match_id BIGINT NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        player_id BIGINT NOT NULL REFERENCES players(id),
        kind VARCHAR(16) NOT NULL,
        minute INTEGER NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_match_events_match ON match_events(match_id)",
    "CREATE TABLE IF NOT EXISTS standings (
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        team_id BIGINT NOT NULL REFERENCES teams(id),
        points INTEGER NOT NULL,
        wins INTEGER NOT NULL,
        losses INTEGER NOT NULL,
        draws INTEGER NOT NULL,
        goals_for INTEGER NOT NULL,
        goals_against INTEGER NOT NULL,
        PRIMARY KEY (tournament_id, team_id)
    )",
];

/// Create every table and index that does not exist yet
pub async fn migrate(pool: &PgPool) -> LeagueResult<()> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    log::info!("Schema up to date ({} statements)", STATEMENTS.len());
    Ok(())
}
