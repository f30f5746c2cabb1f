//! In-memory store for tests and local runs.
//!
//! All state sits behind one mutex, and every repository call holds it for its
//! whole duration, so each call is serializable. Calls validate against
//! cloned rows and write back only once nothing can fail, so a rejected call
//! leaves no trace.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::repository::{
    LeagueStore, MatchRepository, StandingRepository, TeamRepository, TournamentRepository,
};
use crate::auth::UserId;
use crate::errors::{LeagueError, LeagueResult};
use crate::matches::models::{
    EventId, Match, MatchEvent, MatchId, MatchStatus, NewMatchEvent, Resolution, Score,
};
use crate::standings::aggregator::aggregate;
use crate::standings::models::Standing;
use crate::team::models::{Player, PlayerId, Team, TeamId};
use crate::tournament::bracket::BracketPlan;
use crate::tournament::models::{
    Tournament, TournamentId, TournamentRegistration, TournamentStatus,
};

#[derive(Default)]
struct MemoryState {
    last_team_id: TeamId,
    last_player_id: PlayerId,
    last_tournament_id: TournamentId,
    last_match_id: MatchId,
    last_event_id: EventId,
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    registrations: Vec<TournamentRegistration>,
    matches: BTreeMap<MatchId, Match>,
    events: Vec<MatchEvent>,
    standings: BTreeMap<(TournamentId, TeamId), Standing>,
}

impl MemoryState {
    fn tournament(&self, tournament_id: TournamentId) -> LeagueResult<Tournament> {
        self.tournaments
            .get(&tournament_id)
            .cloned()
            .ok_or(LeagueError::TournamentNotFound(tournament_id))
    }

    fn match_row(&self, match_id: MatchId) -> LeagueResult<Match> {
        self.matches
            .get(&match_id)
            .cloned()
            .ok_or(LeagueError::MatchNotFound(match_id))
    }

    fn registered_teams(&self, tournament_id: TournamentId) -> Vec<TeamId> {
        self.registrations
            .iter()
            .filter(|r| r.tournament_id == tournament_id)
            .map(|r| r.team_id)
            .collect()
    }
}

/// Store keeping every table in process memory
#[derive(Default)]
pub struct MemoryLeagueStore {
    state: Mutex<MemoryState>,
}

impl MemoryLeagueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TeamRepository for MemoryLeagueStore {
    async fn create_team(
        &self,
        name: &str,
        logo_url: Option<&str>,
        captain_id: UserId,
    ) -> LeagueResult<Team> {
        let mut state = self.state();
        state.last_team_id += 1;
        let team = Team {
            id: state.last_team_id,
            name: name.to_string(),
            logo_url: logo_url.map(str::to_string),
            captain_id,
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, team_id: TeamId) -> LeagueResult<Option<Team>> {
        Ok(self.state().teams.get(&team_id).cloned())
    }

    async fn add_player(
        &self,
        team_id: TeamId,
        name: &str,
        jersey_number: i32,
    ) -> LeagueResult<Player> {
        let mut state = self.state();
        if !state.teams.contains_key(&team_id) {
            return Err(LeagueError::TeamNotFound(team_id));
        }

        state.last_player_id += 1;
        let player = Player {
            id: state.last_player_id,
            team_id,
            name: name.to_string(),
            jersey_number,
            goals_scored: 0,
            red_cards: 0,
            is_banned: false,
            created_at: Utc::now(),
        };
        state.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn find_player(&self, player_id: PlayerId) -> LeagueResult<Option<Player>> {
        Ok(self.state().players.get(&player_id).cloned())
    }

    async fn list_players(&self, team_id: TeamId) -> LeagueResult<Vec<Player>> {
        Ok(self
            .state()
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn update_team(
        &self,
        team_id: TeamId,
        name: &str,
        logo_url: Option<&str>,
    ) -> LeagueResult<Team> {
        let mut state = self.state();
        let team = state
            .teams
            .get_mut(&team_id)
            .ok_or(LeagueError::TeamNotFound(team_id))?;
        team.name = name.to_string();
        team.logo_url = logo_url.map(str::to_string);
        Ok(team.clone())
    }

    async fn remove_player(&self, team_id: TeamId, player_id: PlayerId) -> LeagueResult<()> {
        let mut state = self.state();
        match state.players.get(&player_id) {
            Some(p) if p.team_id == team_id => {}
            _ => return Err(LeagueError::PlayerNotFound(player_id)),
        }
        if state.events.iter().any(|e| e.player_id == player_id) {
            return Err(LeagueError::PlayerHasEvents(player_id));
        }
        state.players.remove(&player_id);
        Ok(())
    }

    async fn set_player_banned(
        &self,
        player_id: PlayerId,
        banned: bool,
    ) -> LeagueResult<Player> {
        let mut state = self.state();
        let player = state
            .players
            .get_mut(&player_id)
            .ok_or(LeagueError::PlayerNotFound(player_id))?;
        player.is_banned = banned;
        Ok(player.clone())
    }
}

#[async_trait]
impl TournamentRepository for MemoryLeagueStore {
    async fn create_tournament(&self, name: &str, capacity: u32) -> LeagueResult<Tournament> {
        let mut state = self.state();
        state.last_tournament_id += 1;
        let tournament = Tournament {
            id: state.last_tournament_id,
            name: name.to_string(),
            capacity,
            status: TournamentStatus::Registration,
            created_at: Utc::now(),
        };
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Option<Tournament>> {
        Ok(self.state().tournaments.get(&tournament_id).cloned())
    }

    async fn list_tournaments(&self) -> LeagueResult<Vec<Tournament>> {
        Ok(self.state().tournaments.values().rev().cloned().collect())
    }

    async fn register_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<TournamentRegistration> {
        let mut state = self.state();
        let tournament = state.tournament(tournament_id)?;
        if !state.teams.contains_key(&team_id) {
            return Err(LeagueError::TeamNotFound(team_id));
        }

        let registered = state.registered_teams(tournament_id);
        if registered.contains(&team_id) {
            return Err(LeagueError::AlreadyRegistered {
                tournament_id,
                team_id,
            });
        }
        tournament.ensure_registration_open(registered.len())?;

        let registration = TournamentRegistration {
            tournament_id,
            team_id,
            registered_at: Utc::now(),
        };
        state.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn unregister_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<()> {
        let mut state = self.state();
        let tournament = state.tournament(tournament_id)?;
        if tournament.status != TournamentStatus::Registration {
            return Err(LeagueError::RegistrationClosed(tournament_id));
        }

        let before = state.registrations.len();
        state
            .registrations
            .retain(|r| !(r.tournament_id == tournament_id && r.team_id == team_id));
        if state.registrations.len() == before {
            return Err(LeagueError::NotRegistered {
                tournament_id,
                team_id,
            });
        }
        Ok(())
    }

    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<TournamentRegistration>> {
        let state = self.state();
        state.tournament(tournament_id)?;
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn create_bracket(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        let mut state = self.state();
        let mut tournament = state.tournament(tournament_id)?;
        tournament.advance_to(TournamentStatus::Active)?;

        let teams = state.registered_teams(tournament_id);
        let plan = BracketPlan::build(&teams, tournament.capacity)?;

        let mut ids: Vec<MatchId> = Vec::with_capacity(plan.len());
        let mut created = Vec::with_capacity(plan.len());
        for planned in &plan.matches {
            state.last_match_id += 1;
            let id = state.last_match_id;
            let next_match_id = planned.parent.map(|parent| ids[parent]);
            ids.push(id);

            created.push(Match {
                id,
                tournament_id,
                round: planned.round,
                match_number: planned.match_number,
                team_a: planned.team_a,
                team_b: planned.team_b,
                score_a: 0,
                score_b: 0,
                status: if planned.walkover {
                    MatchStatus::Completed
                } else {
                    MatchStatus::Scheduled
                },
                next_match_id,
                next_slot: planned.parent_slot,
                walkover: planned.walkover,
            });
        }

        for m in &created {
            state.matches.insert(m.id, m.clone());
        }
        state.tournaments.insert(tournament.id, tournament);

        Ok(created)
    }
}

#[async_trait]
impl MatchRepository for MemoryLeagueStore {
    async fn find_match(&self, match_id: MatchId) -> LeagueResult<Option<Match>> {
        Ok(self.state().matches.get(&match_id).cloned())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .state()
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round, m.match_number));
        Ok(matches)
    }

    async fn resolve_match(&self, match_id: MatchId, score: Score) -> LeagueResult<Resolution> {
        let mut state = self.state();
        let mut resolved = state.match_row(match_id)?;
        if resolved.is_completed() {
            return Err(LeagueError::AlreadyResolved(match_id));
        }
        let mut tournament = state.tournament(resolved.tournament_id)?;
        tournament.ensure_active()?;

        let winner = resolved.complete(score)?;

        let mut parent = None;
        if let (Some(team_id), Some(next_id)) = (winner, resolved.next_match_id) {
            let mut next = state.match_row(next_id)?;
            let slot = next.claim_slot(team_id, match_id, resolved.next_slot)?;
            parent = Some((next, slot));
        }

        let tournament_completed = resolved.is_final();
        if tournament_completed {
            tournament.advance_to(TournamentStatus::Completed)?;
        }
        let advanced_to = parent.as_ref().map(|(next, slot)| (next.id, *slot));

        state.matches.insert(resolved.id, resolved.clone());
        if let Some((next, _)) = parent {
            state.matches.insert(next.id, next);
        }
        state.tournaments.insert(tournament.id, tournament);

        Ok(Resolution {
            resolved,
            winner,
            advanced_to,
            tournament_completed,
        })
    }

    async fn record_event(
        &self,
        event: NewMatchEvent,
        team_id: TeamId,
    ) -> LeagueResult<MatchEvent> {
        event.validate()?;

        let mut state = self.state();
        let mut m = state.match_row(event.match_id)?;
        if m.slot_of(team_id).is_none() {
            return Err(LeagueError::Forbidden("match does not involve your team"));
        }
        m.ensure_open()?;

        let mut player = state
            .players
            .get(&event.player_id)
            .cloned()
            .ok_or(LeagueError::PlayerNotFound(event.player_id))?;
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

        state.last_event_id += 1;
        let recorded = MatchEvent {
            id: state.last_event_id,
            match_id: event.match_id,
            player_id: event.player_id,
            kind: event.kind,
            minute: event.minute,
            created_at: Utc::now(),
        };

        state.events.push(recorded.clone());
        state.matches.insert(m.id, m);
        state.players.insert(player.id, player);

        Ok(recorded)
    }

    async fn list_events(&self, match_id: MatchId) -> LeagueResult<Vec<MatchEvent>> {
        let state = self.state();
        state.match_row(match_id)?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StandingRepository for MemoryLeagueStore {
    async fn rebuild_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>> {
        let mut state = self.state();
        state.tournament(tournament_id)?;

        let matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        let rows = aggregate(tournament_id, &matches);

        state.standings.retain(|(t, _), _| *t != tournament_id);
        for row in &rows {
            state
                .standings
                .insert((tournament_id, row.team_id), row.clone());
        }

        Ok(rows)
    }

    async fn list_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>> {
        Ok(self
            .state()
            .standings
            .range((tournament_id, TeamId::MIN)..=(tournament_id, TeamId::MAX))
            .map(|(_, s)| s.clone())
            .collect())
    }
}

#[async_trait]
impl LeagueStore for MemoryLeagueStore {
    async fn health_check(&self) -> LeagueResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::models::{EventKind, Slot};

    async fn seeded(teams: usize) -> (MemoryLeagueStore, TournamentId, Vec<TeamId>) {
        let store = MemoryLeagueStore::new();
        let tournament = store.create_tournament("Cup", 8).await.unwrap();
        let mut ids = Vec::new();
        for i in 0..teams {
            let team = store
                .create_team(&format!("Team {i}"), None, i as i64 + 100)
                .await
                .unwrap();
            store.register_team(tournament.id, team.id).await.unwrap();
            ids.push(team.id);
        }
        (store, tournament.id, ids)
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (store, tid, teams) = seeded(2).await;
        let err = store.register_team(tid, teams[0]).await.unwrap_err();
        assert!(matches!(err, LeagueError::AlreadyRegistered { .. }));
        assert_eq!(store.list_registrations(tid).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_register_unknown_team() {
        let (store, tid, _) = seeded(0).await;
        assert!(matches!(
            store.register_team(tid, 42).await,
            Err(LeagueError::TeamNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_failed_bracket_leaves_tournament_untouched() {
        let (store, tid, _) = seeded(1).await;
        assert!(matches!(
            store.create_bracket(tid).await,
            Err(LeagueError::InsufficientTeams { .. })
        ));
        let t = store.find_tournament(tid).await.unwrap().unwrap();
        assert_eq!(t.status, TournamentStatus::Registration);
        assert!(store.list_matches(tid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_event_writes_nothing() {
        let (store, tid, teams) = seeded(4).await;
        store.create_bracket(tid).await.unwrap();
        let outsider = store.create_team("Outsiders", None, 999).await.unwrap();
        let player = store.add_player(outsider.id, "Nobody", 7).await.unwrap();
        let first = store
            .list_matches(tid)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.team_a == Some(teams[0]))
            .unwrap();

        let err = store
            .record_event(
                NewMatchEvent {
                    match_id: first.id,
                    player_id: player.id,
                    kind: EventKind::Goal,
                    minute: 10,
                },
                teams[0],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::PlayerNotInMatch { .. }));
        assert!(store.list_events(first.id).await.unwrap().is_empty());
        let after = store.find_match(first.id).await.unwrap().unwrap();
        assert_eq!((after.score_a, after.score_b), (0, 0));
        let p = store.find_player(player.id).await.unwrap().unwrap();
        assert_eq!(p.goals_scored, 0);
    }

    #[tokio::test]
    async fn test_list_matches_ordered_by_round() {
        let (store, tid, _) = seeded(4).await;
        store.create_bracket(tid).await.unwrap();
        let rounds: Vec<_> = store
            .list_matches(tid)
            .await
            .unwrap()
            .iter()
            .map(|m| (m.round, m.match_number))
            .collect();
        assert_eq!(rounds, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn test_occupied_parent_slot_rolls_back_resolution() {
        let (store, tid, _) = seeded(4).await;
        store.create_bracket(tid).await.unwrap();
        let matches = store.list_matches(tid).await.unwrap();
        let feeder = matches[0].clone();
        let parent_id = feeder.next_match_id.unwrap();
        let slot = feeder.next_slot.unwrap();

        // An earlier write already filled the slot this feeder advances into
        {
            let mut state = store.state();
            let parent = state.matches.get_mut(&parent_id).unwrap();
            match slot {
                Slot::A => parent.team_a = Some(9_999),
                Slot::B => parent.team_b = Some(9_999),
            }
        }

        let err = store
            .resolve_match(feeder.id, Score::new(2, 0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LeagueError::BracketInconsistency { match_id, parent_id: p }
                if match_id == feeder.id && p == parent_id
        ));

        let after = store.find_match(feeder.id).await.unwrap().unwrap();
        assert_eq!(after.status, MatchStatus::Scheduled);
        assert_eq!((after.score_a, after.score_b), (0, 0));
        let parent = store.find_match(parent_id).await.unwrap().unwrap();
        assert_eq!(parent.team_in(slot), Some(9_999));
        let t = store.find_tournament(tid).await.unwrap().unwrap();
        assert_eq!(t.status, TournamentStatus::Active);
    }

    #[tokio::test]
    async fn test_status_writes_follow_lifecycle() {
        let (store, tid, _) = seeded(2).await;
        store.create_bracket(tid).await.unwrap();
        assert!(matches!(
            store.create_bracket(tid).await,
            Err(LeagueError::AlreadyActive { .. })
        ));

        let final_match = store.list_matches(tid).await.unwrap().remove(0);
        let resolution = store
            .resolve_match(final_match.id, Score::new(1, 0).unwrap())
            .await
            .unwrap();
        assert!(resolution.tournament_completed);
        let t = store.find_tournament(tid).await.unwrap().unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);

        // A completed tournament can neither be rebuilt nor reopened
        assert!(matches!(
            store.create_bracket(tid).await,
            Err(LeagueError::AlreadyActive { .. })
        ));
        assert!(matches!(
            store.unregister_team(tid, final_match.team_a.unwrap()).await,
            Err(LeagueError::RegistrationClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_event_from_team_outside_match_is_forbidden() {
        let (store, tid, teams) = seeded(4).await;
        store.create_bracket(tid).await.unwrap();
        let first = store.list_matches(tid).await.unwrap().remove(0);
        let home = first.team_a.unwrap();
        let player = store.add_player(home, "Striker", 9).await.unwrap();
        let other = teams.iter().copied().find(|t| first.slot_of(*t).is_none()).unwrap();

        let event = NewMatchEvent {
            match_id: first.id,
            player_id: player.id,
            kind: EventKind::Goal,
            minute: 12,
        };
        assert!(matches!(
            store.record_event(event, other).await,
            Err(LeagueError::Forbidden(_))
        ));
        assert!(store.list_events(first.id).await.unwrap().is_empty());

        store.record_event(event, home).await.unwrap();
        assert_eq!(store.list_events(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_banned_player_cannot_log_events() {
        let (store, tid, _) = seeded(2).await;
        store.create_bracket(tid).await.unwrap();
        let final_match = store.list_matches(tid).await.unwrap().remove(0);
        let home = final_match.team_a.unwrap();
        let player = store.add_player(home, "Hothead", 4).await.unwrap();
        store.set_player_banned(player.id, true).await.unwrap();

        let event = NewMatchEvent {
            match_id: final_match.id,
            player_id: player.id,
            kind: EventKind::Goal,
            minute: 30,
        };
        assert!(matches!(
            store.record_event(event, home).await,
            Err(LeagueError::PlayerBanned(id)) if id == player.id
        ));
        let after = store.find_match(final_match.id).await.unwrap().unwrap();
        assert_eq!((after.score_a, after.score_b), (0, 0));

        store.set_player_banned(player.id, false).await.unwrap();
        store.record_event(event, home).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_player_keeps_event_history() {
        let (store, tid, teams) = seeded(2).await;
        let bench = store.add_player(teams[0], "Bench", 12).await.unwrap();
        let scorer = store.add_player(teams[0], "Scorer", 10).await.unwrap();
        assert!(matches!(
            store.remove_player(teams[1], bench.id).await,
            Err(LeagueError::PlayerNotFound(_))
        ));

        store.create_bracket(tid).await.unwrap();
        let final_match = store.list_matches(tid).await.unwrap().remove(0);
        store
            .record_event(
                NewMatchEvent {
                    match_id: final_match.id,
                    player_id: scorer.id,
                    kind: EventKind::Goal,
                    minute: 5,
                },
                teams[0],
            )
            .await
            .unwrap();

        assert!(matches!(
            store.remove_player(teams[0], scorer.id).await,
            Err(LeagueError::PlayerHasEvents(_))
        ));
        store.remove_player(teams[0], bench.id).await.unwrap();
        let roster = store.list_players(teams[0]).await.unwrap();
        assert_eq!(roster.iter().map(|p| p.id).collect::<Vec<_>>(), vec![scorer.id]);
    }

    #[tokio::test]
    async fn test_unregister_team() {
        let (store, tid, teams) = seeded(3).await;
        store.unregister_team(tid, teams[1]).await.unwrap();
        let left: Vec<_> = store
            .list_registrations(tid)
            .await
            .unwrap()
            .iter()
            .map(|r| r.team_id)
            .collect();
        assert_eq!(left, vec![teams[0], teams[2]]);
        assert!(matches!(
            store.unregister_team(tid, teams[1]).await,
            Err(LeagueError::NotRegistered { .. })
        ));

        store.register_team(tid, teams[1]).await.unwrap();
        store.create_bracket(tid).await.unwrap();
        assert!(matches!(
            store.unregister_team(tid, teams[0]).await,
            Err(LeagueError::RegistrationClosed(_))
        ));
    }
}
