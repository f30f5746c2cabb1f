//! PostgreSQL store.
//!
//! Every multi-row mutation runs in one transaction. Rows that a mutation
//! reads and then rewrites are locked with `SELECT ... FOR UPDATE` first.
//! Match resolution locks in a fixed order: the resolved match, then its
//! tournament, then the next match. A next match cannot be resolved while
//! one of its feeders is still open, so no two resolutions wait on each
//! other in reverse order.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use std::sync::Arc;

use super::repository::{
    LeagueStore, MatchRepository, StandingRepository, TeamRepository, TournamentRepository,
};
use super::timeouts::{with_default_timeout, with_long_timeout, with_transaction_timeout};
use crate::auth::UserId;
use crate::errors::{LeagueError, LeagueResult};
use crate::matches::models::{
    Match, MatchEvent, MatchId, MatchStatus, NewMatchEvent, Resolution, Score, Slot,
};
use crate::standings::aggregator::aggregate;
use crate::standings::models::Standing;
use crate::team::models::{Player, PlayerId, Team, TeamId};
use crate::tournament::bracket::BracketPlan;
use crate::tournament::models::{
    Tournament, TournamentId, TournamentRegistration, TournamentStatus,
};

const MATCH_COLUMNS: &str = "id, tournament_id, round, match_number, team_a_id, team_b_id, \
     score_a, score_b, status, next_match_id, next_slot, walkover";

const PLAYER_COLUMNS: &str =
    "id, team_id, name, jersey_number, goals_scored, red_cards, is_banned, created_at";

fn decode<T: FromStr<Err = String>>(raw: &str) -> Result<T, sqlx::Error> {
    raw.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))
}

fn team_from_row(row: &PgRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
        logo_url: row.get("logo_url"),
        captain_id: row.get("captain_id"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn player_from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        team_id: row.get("team_id"),
        name: row.get("name"),
        jersey_number: row.get("jersey_number"),
        goals_scored: row.get("goals_scored"),
        red_cards: row.get("red_cards"),
        is_banned: row.get("is_banned"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn tournament_from_row(row: &PgRow) -> Result<Tournament, sqlx::Error> {
    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        capacity: row.get::<i32, _>("capacity") as u32,
        status: decode(row.get::<&str, _>("status"))?,
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    let next_slot: Option<String> = row.get("next_slot");
    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        round: row.get("round"),
        match_number: row.get("match_number"),
        team_a: row.get("team_a_id"),
        team_b: row.get("team_b_id"),
        score_a: row.get("score_a"),
        score_b: row.get("score_b"),
        status: decode(row.get::<&str, _>("status"))?,
        next_match_id: row.get("next_match_id"),
        next_slot: next_slot.as_deref().map(decode::<Slot>).transpose()?,
        walkover: row.get("walkover"),
    })
}

fn event_from_row(row: &PgRow) -> Result<MatchEvent, sqlx::Error> {
    Ok(MatchEvent {
        id: row.get("id"),
        match_id: row.get("match_id"),
        player_id: row.get("player_id"),
        kind: decode(row.get::<&str, _>("kind"))?,
        minute: row.get("minute"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

fn standing_from_row(row: &PgRow) -> Standing {
    Standing {
        tournament_id: row.get("tournament_id"),
        team_id: row.get("team_id"),
        points: row.get("points"),
        wins: row.get("wins"),
        losses: row.get("losses"),
        draws: row.get("draws"),
        goals_for: row.get("goals_for"),
        goals_against: row.get("goals_against"),
    }
}

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgLeagueStore {
    pool: Arc<PgPool>,
}

impl PgLeagueStore {
    /// Create a new store
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn lock_tournament(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> LeagueResult<Tournament> {
        let row = sqlx::query(
            "SELECT id, name, capacity, status, created_at FROM tournaments WHERE id = $1 FOR UPDATE",
        )
        .bind(tournament_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(LeagueError::TournamentNotFound(tournament_id))?;

        Ok(tournament_from_row(&row)?)
    }

    async fn lock_match(
        tx: &mut Transaction<'_, Postgres>,
        match_id: MatchId,
    ) -> LeagueResult<Match> {
        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE"
        ))
        .bind(match_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(LeagueError::MatchNotFound(match_id))?;

        Ok(match_from_row(&row)?)
    }

    /// Advance a locked tournament and persist its new status
    async fn set_tournament_status(
        tx: &mut Transaction<'_, Postgres>,
        tournament: &mut Tournament,
        status: TournamentStatus,
    ) -> LeagueResult<()> {
        tournament.advance_to(status)?;
        sqlx::query("UPDATE tournaments SET status = $1 WHERE id = $2")
            .bind(tournament.status.as_str())
            .bind(tournament.id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn register_team_tx(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<TournamentRegistration> {
        let mut tx = self.pool.begin().await?;
        let tournament = Self::lock_tournament(&mut tx, tournament_id).await?;

        let team_exists = sqlx::query("SELECT 1 FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !team_exists {
            return Err(LeagueError::TeamNotFound(team_id));
        }

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS registered,
                   COUNT(*) FILTER (WHERE team_id = $2) AS existing
            FROM tournament_registrations
            WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;
        let registered: i64 = row.get("registered");
        let existing: i64 = row.get("existing");

        if existing > 0 {
            return Err(LeagueError::AlreadyRegistered {
                tournament_id,
                team_id,
            });
        }
        tournament.ensure_registration_open(registered as usize)?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournament_registrations (tournament_id, team_id)
            VALUES ($1, $2)
            RETURNING registered_at
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(TournamentRegistration {
            tournament_id,
            team_id,
            registered_at: row.get::<chrono::NaiveDateTime, _>("registered_at").and_utc(),
        })
    }

    async fn create_bracket_tx(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        let mut tx = self.pool.begin().await?;
        let mut tournament = Self::lock_tournament(&mut tx, tournament_id).await?;
        tournament.ensure_not_started()?;

        let teams: Vec<TeamId> = sqlx::query(
            "SELECT team_id FROM tournament_registrations WHERE tournament_id = $1 ORDER BY id",
        )
        .bind(tournament_id)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| row.get("team_id"))
        .collect();

        let plan = BracketPlan::build(&teams, tournament.capacity)?;

        // Parents precede children in the plan, so every parent ID exists by
        // the time a child row references it.
        let mut created: Vec<Match> = Vec::with_capacity(plan.len());
        for planned in &plan.matches {
            let next_match_id = planned.parent.map(|parent| created[parent].id);
            let status = if planned.walkover {
                MatchStatus::Completed
            } else {
                MatchStatus::Scheduled
            };

            let row = sqlx::query(
                r#"
                INSERT INTO matches
                    (tournament_id, round, match_number, team_a_id, team_b_id,
                     status, next_match_id, next_slot, walkover)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(tournament_id)
            .bind(planned.round)
            .bind(planned.match_number)
            .bind(planned.team_a)
            .bind(planned.team_b)
            .bind(status.as_str())
            .bind(next_match_id)
            .bind(planned.parent_slot.map(Slot::as_str))
            .bind(planned.walkover)
            .fetch_one(&mut *tx)
            .await?;

            created.push(Match {
                id: row.get("id"),
                tournament_id,
                round: planned.round,
                match_number: planned.match_number,
                team_a: planned.team_a,
                team_b: planned.team_b,
                score_a: 0,
                score_b: 0,
                status,
                next_match_id,
                next_slot: planned.parent_slot,
                walkover: planned.walkover,
            });
        }

        Self::set_tournament_status(&mut tx, &mut tournament, TournamentStatus::Active).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn resolve_match_tx(&self, match_id: MatchId, score: Score) -> LeagueResult<Resolution> {
        let mut tx = self.pool.begin().await?;
        let mut resolved = Self::lock_match(&mut tx, match_id).await?;
        if resolved.is_completed() {
            return Err(LeagueError::AlreadyResolved(match_id));
        }
        let mut tournament = Self::lock_tournament(&mut tx, resolved.tournament_id).await?;
        tournament.ensure_active()?;

        let winner = resolved.complete(score)?;

        sqlx::query("UPDATE matches SET score_a = $1, score_b = $2, status = $3 WHERE id = $4")
            .bind(resolved.score_a)
            .bind(resolved.score_b)
            .bind(resolved.status.as_str())
            .bind(match_id)
            .execute(&mut *tx)
            .await?;

        let mut advanced_to = None;
        if let (Some(team_id), Some(next_id)) = (winner, resolved.next_match_id) {
            let mut next = Self::lock_match(&mut tx, next_id).await?;
            let slot = next.claim_slot(team_id, match_id, resolved.next_slot)?;

            let column = match slot {
                Slot::A => "team_a_id",
                Slot::B => "team_b_id",
            };
            sqlx::query(&format!("UPDATE matches SET {column} = $1 WHERE id = $2"))
                .bind(team_id)
                .bind(next_id)
                .execute(&mut *tx)
                .await?;

            advanced_to = Some((next_id, slot));
        }

        let tournament_completed = resolved.is_final();
        if tournament_completed {
            Self::set_tournament_status(&mut tx, &mut tournament, TournamentStatus::Completed)
                .await?;
        }

        tx.commit().await?;

        Ok(Resolution {
            resolved,
            winner,
            advanced_to,
            tournament_completed,
        })
    }

    async fn record_event_tx(
        &self,
        event: NewMatchEvent,
        team_id: TeamId,
    ) -> LeagueResult<MatchEvent> {
        event.validate()?;

        let mut tx = self.pool.begin().await?;
        let mut m = Self::lock_match(&mut tx, event.match_id).await?;
        if m.slot_of(team_id).is_none() {
            return Err(LeagueError::Forbidden("match does not involve your team"));
        }
        m.ensure_open()?;

        let row = sqlx::query(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1 FOR UPDATE"
        ))
        .bind(event.player_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LeagueError::PlayerNotFound(event.player_id))?;
        let mut player = player_from_row(&row);
        if player.is_banned {
            return Err(LeagueError::PlayerBanned(player.id));
        }

        let side = m
            .slot_of(player.team_id)
            .ok_or(LeagueError::PlayerNotInMatch {
                player_id: event.player_id,
                match_id: event.match_id,
            })?;

        m.apply_event(side, event.kind);
        player.apply_event(event.kind);

        let row = sqlx::query(
            r#"
            INSERT INTO match_events (match_id, player_id, kind, minute)
            VALUES ($1, $2, $3, $4)
            RETURNING id, match_id, player_id, kind, minute, created_at
            "#,
        )
        .bind(event.match_id)
        .bind(event.player_id)
        .bind(event.kind.as_str())
        .bind(event.minute)
        .fetch_one(&mut *tx)
        .await?;
        let recorded = event_from_row(&row)?;

        sqlx::query("UPDATE matches SET score_a = $1, score_b = $2 WHERE id = $3")
            .bind(m.score_a)
            .bind(m.score_b)
            .bind(m.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE players SET goals_scored = $1, red_cards = $2 WHERE id = $3")
            .bind(player.goals_scored)
            .bind(player.red_cards)
            .bind(player.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recorded)
    }

    async fn remove_player_tx(&self, team_id: TeamId, player_id: PlayerId) -> LeagueResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT id FROM players WHERE id = $1 AND team_id = $2 FOR UPDATE")
            .bind(player_id)
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LeagueError::PlayerNotFound(player_id))?;

        let has_events = sqlx::query("SELECT 1 FROM match_events WHERE player_id = $1 LIMIT 1")
            .bind(player_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if has_events {
            return Err(LeagueError::PlayerHasEvents(player_id));
        }

        sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn unregister_team_tx(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<()> {
        let mut tx = self.pool.begin().await?;
        let tournament = Self::lock_tournament(&mut tx, tournament_id).await?;
        if tournament.status != TournamentStatus::Registration {
            return Err(LeagueError::RegistrationClosed(tournament_id));
        }

        let removed = sqlx::query(
            "DELETE FROM tournament_registrations WHERE tournament_id = $1 AND team_id = $2",
        )
        .bind(tournament_id)
        .bind(team_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if removed == 0 {
            return Err(LeagueError::NotRegistered {
                tournament_id,
                team_id,
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn rebuild_standings_tx(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<Standing>> {
        let mut tx = self.pool.begin().await?;
        // Serializes rebuilds of the same tournament against each other
        Self::lock_tournament(&mut tx, tournament_id).await?;

        let matches = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 AND status = $2"
        ))
        .bind(tournament_id)
        .bind(MatchStatus::Completed.as_str())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(match_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        let rows = aggregate(tournament_id, &matches);

        sqlx::query("DELETE FROM standings WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        for standing in &rows {
            sqlx::query(
                r#"
                INSERT INTO standings
                    (tournament_id, team_id, points, wins, losses, draws, goals_for, goals_against)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(standing.tournament_id)
            .bind(standing.team_id)
            .bind(standing.points)
            .bind(standing.wins)
            .bind(standing.losses)
            .bind(standing.draws)
            .bind(standing.goals_for)
            .bind(standing.goals_against)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows)
    }

    async fn find_match_row(&self, match_id: MatchId) -> LeagueResult<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(match_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }
}

#[async_trait]
impl TeamRepository for PgLeagueStore {
    async fn create_team(
        &self,
        name: &str,
        logo_url: Option<&str>,
        captain_id: UserId,
    ) -> LeagueResult<Team> {
        with_default_timeout(async {
            let row = sqlx::query(
                r#"
                INSERT INTO teams (name, logo_url, captain_id)
                VALUES ($1, $2, $3)
                RETURNING id, name, logo_url, captain_id, created_at
                "#,
            )
            .bind(name)
            .bind(logo_url)
            .bind(captain_id)
            .fetch_one(self.pool.as_ref())
            .await?;

            Ok(team_from_row(&row))
        })
        .await
    }

    async fn find_team(&self, team_id: TeamId) -> LeagueResult<Option<Team>> {
        with_default_timeout(async {
            let row = sqlx::query(
                "SELECT id, name, logo_url, captain_id, created_at FROM teams WHERE id = $1",
            )
            .bind(team_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.as_ref().map(team_from_row))
        })
        .await
    }

    async fn add_player(
        &self,
        team_id: TeamId,
        name: &str,
        jersey_number: i32,
    ) -> LeagueResult<Player> {
        with_default_timeout(async {
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO players (team_id, name, jersey_number)
                SELECT id, $2, $3 FROM teams WHERE id = $1
                RETURNING {PLAYER_COLUMNS}
                "#
            ))
            .bind(team_id)
            .bind(name)
            .bind(jersey_number)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(LeagueError::TeamNotFound(team_id))?;

            Ok(player_from_row(&row))
        })
        .await
    }

    async fn find_player(&self, player_id: PlayerId) -> LeagueResult<Option<Player>> {
        with_default_timeout(async {
            let row = sqlx::query(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"))
                .bind(player_id)
                .fetch_optional(self.pool.as_ref())
                .await?;

            Ok(row.as_ref().map(player_from_row))
        })
        .await
    }

    async fn list_players(&self, team_id: TeamId) -> LeagueResult<Vec<Player>> {
        with_default_timeout(async {
            let rows = sqlx::query(&format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE team_id = $1 ORDER BY id"
            ))
            .bind(team_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows.iter().map(player_from_row).collect())
        })
        .await
    }

    async fn update_team(
        &self,
        team_id: TeamId,
        name: &str,
        logo_url: Option<&str>,
    ) -> LeagueResult<Team> {
        with_default_timeout(async {
            let row = sqlx::query(
                r#"
                UPDATE teams SET name = $2, logo_url = $3
                WHERE id = $1
                RETURNING id, name, logo_url, captain_id, created_at
                "#,
            )
            .bind(team_id)
            .bind(name)
            .bind(logo_url)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(LeagueError::TeamNotFound(team_id))?;

            Ok(team_from_row(&row))
        })
        .await
    }

    async fn remove_player(&self, team_id: TeamId, player_id: PlayerId) -> LeagueResult<()> {
        with_transaction_timeout(self.remove_player_tx(team_id, player_id)).await
    }

    async fn set_player_banned(
        &self,
        player_id: PlayerId,
        banned: bool,
    ) -> LeagueResult<Player> {
        with_default_timeout(async {
            let row = sqlx::query(&format!(
                "UPDATE players SET is_banned = $2 WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
            ))
            .bind(player_id)
            .bind(banned)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(LeagueError::PlayerNotFound(player_id))?;

            Ok(player_from_row(&row))
        })
        .await
    }
}

#[async_trait]
impl TournamentRepository for PgLeagueStore {
    async fn create_tournament(&self, name: &str, capacity: u32) -> LeagueResult<Tournament> {
        with_default_timeout(async {
            let row = sqlx::query(
                r#"
                INSERT INTO tournaments (name, capacity, status)
                VALUES ($1, $2, $3)
                RETURNING id, name, capacity, status, created_at
                "#,
            )
            .bind(name)
            .bind(capacity as i32)
            .bind(TournamentStatus::Registration.as_str())
            .fetch_one(self.pool.as_ref())
            .await?;

            Ok(tournament_from_row(&row)?)
        })
        .await
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Option<Tournament>> {
        with_default_timeout(async {
            let row = sqlx::query(
                "SELECT id, name, capacity, status, created_at FROM tournaments WHERE id = $1",
            )
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.as_ref().map(tournament_from_row).transpose()?)
        })
        .await
    }

    async fn list_tournaments(&self) -> LeagueResult<Vec<Tournament>> {
        with_default_timeout(async {
            let rows = sqlx::query(
                "SELECT id, name, capacity, status, created_at FROM tournaments \
                 ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .map(tournament_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn register_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<TournamentRegistration> {
        with_transaction_timeout(self.register_team_tx(tournament_id, team_id)).await
    }

    async fn unregister_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<()> {
        with_transaction_timeout(self.unregister_team_tx(tournament_id, team_id)).await
    }

    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<TournamentRegistration>> {
        if self.find_tournament(tournament_id).await?.is_none() {
            return Err(LeagueError::TournamentNotFound(tournament_id));
        }

        with_default_timeout(async {
            let rows = sqlx::query(
                r#"
                SELECT tournament_id, team_id, registered_at
                FROM tournament_registrations
                WHERE tournament_id = $1
                ORDER BY id
                "#,
            )
            .bind(tournament_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .map(|row| TournamentRegistration {
                    tournament_id: row.get("tournament_id"),
                    team_id: row.get("team_id"),
                    registered_at: row
                        .get::<chrono::NaiveDateTime, _>("registered_at")
                        .and_utc(),
                })
                .collect())
        })
        .await
    }

    async fn create_bracket(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        with_long_timeout(self.create_bracket_tx(tournament_id)).await
    }
}

#[async_trait]
impl MatchRepository for PgLeagueStore {
    async fn find_match(&self, match_id: MatchId) -> LeagueResult<Option<Match>> {
        with_default_timeout(self.find_match_row(match_id)).await
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        with_default_timeout(async {
            let rows = sqlx::query(&format!(
                "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 \
                 ORDER BY round, match_number"
            ))
            .bind(tournament_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .map(match_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn resolve_match(&self, match_id: MatchId, score: Score) -> LeagueResult<Resolution> {
        with_transaction_timeout(self.resolve_match_tx(match_id, score)).await
    }

    async fn record_event(
        &self,
        event: NewMatchEvent,
        team_id: TeamId,
    ) -> LeagueResult<MatchEvent> {
        with_transaction_timeout(self.record_event_tx(event, team_id)).await
    }

    async fn list_events(&self, match_id: MatchId) -> LeagueResult<Vec<MatchEvent>> {
        if self.find_match(match_id).await?.is_none() {
            return Err(LeagueError::MatchNotFound(match_id));
        }

        with_default_timeout(async {
            let rows = sqlx::query(
                r#"
                SELECT id, match_id, player_id, kind, minute, created_at
                FROM match_events
                WHERE match_id = $1
                ORDER BY id
                "#,
            )
            .bind(match_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .map(event_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }
}

#[async_trait]
impl StandingRepository for PgLeagueStore {
    async fn rebuild_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>> {
        with_long_timeout(self.rebuild_standings_tx(tournament_id)).await
    }

    async fn list_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>> {
        with_default_timeout(async {
            let rows = sqlx::query(
                r#"
                SELECT tournament_id, team_id, points, wins, losses, draws,
                       goals_for, goals_against
                FROM standings
                WHERE tournament_id = $1
                ORDER BY team_id
                "#,
            )
            .bind(tournament_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows.iter().map(standing_from_row).collect())
        })
        .await
    }
}

#[async_trait]
impl LeagueStore for PgLeagueStore {
    async fn health_check(&self) -> LeagueResult<()> {
        with_default_timeout(async {
            sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
            Ok(())
        })
        .await
    }
}
