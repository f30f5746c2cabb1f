use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use league_engine::matches::{Match, MatchStatus};
use league_engine::standings::{aggregate, rank};
use league_engine::tournament::BracketPlan;
use std::hint::black_box;

/// Helper to build a fully played round-robin style match history
fn played_matches(teams: i64) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut id = 0;
    for a in 1..=teams {
        for b in (a + 1)..=teams {
            id += 1;
            matches.push(Match {
                id,
                tournament_id: 1,
                round: 1,
                match_number: id as i32,
                team_a: Some(a),
                team_b: Some(b),
                score_a: ((a * 7 + b) % 5) as i32,
                score_b: ((b * 3 + a) % 4) as i32,
                status: MatchStatus::Completed,
                next_match_id: None,
                next_slot: None,
                walkover: false,
            });
        }
    }
    matches
}

/// Benchmark bracket planning across roster sizes, with and without walkovers
fn bench_bracket_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("bracket_plan");

    for teams in [4usize, 13, 64, 200, 256] {
        let roster: Vec<i64> = (1..=teams as i64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(teams), &roster, |b, roster| {
            b.iter(|| BracketPlan::build(black_box(roster), 256));
        });
    }

    group.finish();
}

/// Benchmark standings aggregation and ranking
fn bench_standings(c: &mut Criterion) {
    let mut group = c.benchmark_group("standings");

    for teams in [8i64, 32, 128] {
        let matches = played_matches(teams);
        group.bench_with_input(
            BenchmarkId::new("aggregate_and_rank", teams),
            &matches,
            |b, matches| {
                b.iter(|| {
                    let mut standings = aggregate(1, black_box(matches));
                    rank(&mut standings);
                    standings
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_bracket_plan, bench_standings);
criterion_main!(benches);
