//! Standings aggregation over completed matches.
//!
//! Standings are never patched in place: every rebuild replays the full set
//! of completed matches, so two rebuilds over the same history produce the
//! same rows in the same order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::models::Standing;
use crate::matches::models::Match;
use crate::tournament::models::TournamentId;

/// Fold completed matches into one standing per team, ordered by team id
///
/// Open matches, walkovers and matches missing a team are skipped.
pub fn aggregate(tournament_id: TournamentId, matches: &[Match]) -> Vec<Standing> {
    let mut table: BTreeMap<_, Standing> = BTreeMap::new();

    for m in matches {
        if !m.is_completed() || m.walkover || m.tournament_id != tournament_id {
            continue;
        }
        let (Some(team_a), Some(team_b)) = (m.team_a, m.team_b) else {
            continue;
        };

        table
            .entry(team_a)
            .or_insert_with(|| Standing::new(tournament_id, team_a))
            .record(m.score_a, m.score_b);
        table
            .entry(team_b)
            .or_insert_with(|| Standing::new(tournament_id, team_b))
            .record(m.score_b, m.score_a);
    }

    table.into_values().collect()
}

/// Display order: points, goals for, goal difference (all descending), then team id
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Sort standings into display order
pub fn rank(standings: &mut [Standing]) {
    standings.sort_by(compare);
}
