//! Integration tests for the HTTP API.
//!
//! The router runs over the in-memory store, so no database is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use league_engine::League;
use league_engine::auth::{AuthContext, TokenVerifier};
use league_engine::db::MemoryLeagueStore;
use league_server::api::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const SECRET: &str = "integration_test_secret_0123456789abcdef";

struct TestServer {
    app: axum::Router,
    tokens: Arc<TokenVerifier>,
}

impl TestServer {
    fn new() -> Self {
        let tokens = Arc::new(TokenVerifier::new(SECRET));
        let state = AppState {
            league: League::new(Arc::new(MemoryLeagueStore::new())),
            tokens: tokens.clone(),
            default_capacity: 8,
        };
        Self {
            app: create_router(state),
            tokens,
        }
    }

    fn admin_token(&self) -> String {
        self.tokens.issue(&AuthContext::admin(1)).unwrap()
    }

    fn captain_token(&self, user_id: i64, team_id: i64) -> String {
        self.tokens
            .issue(&AuthContext::captain(user_id, team_id))
            .unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Create a tournament with `teams` registered teams; captain ids are 100+i
    async fn seeded_tournament(&self, teams: usize, capacity: u32) -> (i64, Vec<i64>) {
        let admin = self.admin_token();
        let (status, tournament) = self
            .send(
                "POST",
                "/api/v1/admin/tournaments",
                Some(&admin),
                Some(json!({"name": "Spring Cup", "capacity": capacity})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let tid = tournament["id"].as_i64().unwrap();

        let mut team_ids = Vec::new();
        for i in 0..teams {
            let (status, team) = self
                .send(
                    "POST",
                    "/api/v1/admin/teams",
                    Some(&admin),
                    Some(json!({"name": format!("Team {i}"), "captain_id": 100 + i})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            let team_id = team["id"].as_i64().unwrap();

            let (status, _) = self
                .send(
                    "POST",
                    &format!("/api/v1/admin/tournaments/{tid}/teams"),
                    Some(&admin),
                    Some(json!({"team_id": team_id})),
                )
                .await;
            assert_eq!(status, StatusCode::NO_CONTENT);
            team_ids.push(team_id);
        }
        (tid, team_ids)
    }

    async fn matches(&self, tid: i64) -> Vec<Value> {
        let (status, body) = self
            .send("GET", &format!("/api/v1/tournaments/{tid}/matches"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new();
    let (status, body) = server.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::new();
    let request = Request::builder()
        .uri("/api/v1/tournaments")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let server = TestServer::new();
    let (status, body) = server
        .send(
            "POST",
            "/api/v1/admin/tournaments",
            None,
            Some(json!({"name": "Cup"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = server
        .send(
            "POST",
            "/api/v1/admin/tournaments",
            Some("not.a.token"),
            Some(json!({"name": "Cup"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_captain_cannot_use_admin_routes() {
    let server = TestServer::new();
    let captain = server.captain_token(100, 1);
    let (status, _) = server
        .send(
            "POST",
            "/api/v1/admin/tournaments",
            Some(&captain),
            Some(json!({"name": "Cup"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_use_mobile_routes() {
    let server = TestServer::new();
    let admin = server.admin_token();
    let (status, _) = server
        .send("GET", "/api/v1/mobile/my-team", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_tournament_uses_default_capacity() {
    let server = TestServer::new();
    let admin = server.admin_token();
    let (status, body) = server
        .send(
            "POST",
            "/api/v1/admin/tournaments",
            Some(&admin),
            Some(json!({"name": "Cup"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 8);
}

#[tokio::test]
async fn test_invalid_capacity_is_bad_request() {
    let server = TestServer::new();
    let admin = server.admin_token();
    let (status, _) = server
        .send(
            "POST",
            "/api/v1/admin/tournaments",
            Some(&admin),
            Some(json!({"name": "Cup", "capacity": 6})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_tournament_is_not_found() {
    let server = TestServer::new();
    let (status, body) = server
        .send("GET", "/api/v1/tournaments/999/standings", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_generate_requires_two_teams() {
    let server = TestServer::new();
    let (tid, _) = server.seeded_tournament(1, 4).await;
    let admin = server.admin_token();
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/generate"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_tournament_over_http() {
    let server = TestServer::new();
    let admin = server.admin_token();
    let (tid, teams) = server.seeded_tournament(4, 4).await;

    let (status, body) = server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/generate"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["matches_created"], 3);

    // A second generate is refused
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/generate"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let matches = server.matches(tid).await;
    assert_eq!(matches.len(), 3);
    let semi_1 = matches[0]["id"].as_i64().unwrap();
    let semi_2 = matches[1]["id"].as_i64().unwrap();
    let final_id = matches[2]["id"].as_i64().unwrap();
    assert_eq!(matches[0]["team_a"], teams[0]);
    assert_eq!(matches[0]["team_b"], teams[1]);

    // The final cannot be resolved before both semis
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{final_id}/resolve"),
            Some(&admin),
            Some(json!({"score_a": 1, "score_b": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Captain of the first team records a goal in the first semi
    let captain = server.captain_token(100, teams[0]);
    let (status, player) = server
        .send(
            "POST",
            "/api/v1/mobile/my-team/players",
            Some(&captain),
            Some(json!({"name": "Striker", "jersey_number": 9})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let player_id = player["id"].as_i64().unwrap();

    let (status, event) = server
        .send(
            "POST",
            &format!("/api/v1/mobile/matches/{semi_1}/events"),
            Some(&captain),
            Some(json!({"player_id": player_id, "type": "goal", "minute": 12})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["minute"], 12);

    // The same captain cannot touch the other semi
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/mobile/matches/{semi_2}/events"),
            Some(&captain),
            Some(json!({"player_id": player_id, "type": "goal", "minute": 20})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, events) = server
        .send("GET", &format!("/api/v1/matches/{semi_1}/events"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);

    let (status, body) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{semi_1}/resolve"),
            Some(&admin),
            Some(json!({"score_a": 2, "score_b": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], teams[0]);
    assert_eq!(body["tournament_completed"], false);

    // Resolving twice is a conflict
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{semi_1}/resolve"),
            Some(&admin),
            Some(json!({"score_a": 0, "score_b": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Events cannot be added once the match is closed
    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/mobile/matches/{semi_1}/events"),
            Some(&captain),
            Some(json!({"player_id": player_id, "type": "card_yellow", "minute": 80})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{semi_2}/resolve"),
            Some(&admin),
            Some(json!({"score_a": 0, "score_b": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, final_match) = server
        .send("GET", &format!("/api/v1/matches/{final_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(final_match["team_a"], teams[0]);
    assert_eq!(final_match["team_b"], teams[3]);

    let (status, body) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{final_id}/resolve"),
            Some(&admin),
            Some(json!({"score_a": 1, "score_b": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tournament_completed"], true);

    let (status, standings) = server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/standings/recompute"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let standings = standings.as_array().unwrap().clone();
    assert_eq!(standings.len(), 4);
    assert_eq!(standings[0]["team_id"], teams[0]);
    assert_eq!(standings[0]["points"], 6);

    let (status, stored) = server
        .send("GET", &format!("/api/v1/tournaments/{tid}/standings"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().unwrap(), &standings);

    let (status, tournament) = server
        .send("GET", &format!("/api/v1/tournaments/{tid}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tournament["status"], "completed");
}

#[tokio::test]
async fn test_my_team_and_roster() {
    let server = TestServer::new();
    let (tid, teams) = server.seeded_tournament(2, 2).await;
    let captain = server.captain_token(101, teams[1]);

    let (status, _) = server
        .send(
            "POST",
            "/api/v1/mobile/my-team/players",
            Some(&captain),
            Some(json!({"name": "Keeper", "jersey_number": 120})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, player) = server
        .send(
            "POST",
            "/api/v1/mobile/my-team/players",
            Some(&captain),
            Some(json!({"name": "Keeper", "jersey_number": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, team) = server
        .send("GET", "/api/v1/mobile/my-team", Some(&captain), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["id"], teams[1]);
    assert_eq!(team["players"].as_array().unwrap().len(), 1);

    let player_id = player["id"].as_i64().unwrap();
    let (status, fetched) = server
        .send("GET", &format!("/api/v1/players/{player_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Keeper");

    let (status, registered) = server
        .send("GET", &format!("/api/v1/tournaments/{tid}/teams"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_oversized_score_is_bad_request() {
    let server = TestServer::new();
    let (tid, _) = server.seeded_tournament(2, 2).await;
    let admin = server.admin_token();
    server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/generate"),
            Some(&admin),
            None,
        )
        .await;
    let final_id = server.matches(tid).await[0]["id"].as_i64().unwrap();

    let (status, body) = server
        .send(
            "POST",
            &format!("/api/v1/admin/matches/{final_id}/resolve"),
            Some(&admin),
            Some(json!({"score_a": i32::MAX, "score_b": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid score"));

    let (_, m) = server
        .send("GET", &format!("/api/v1/matches/{final_id}"), None, None)
        .await;
    assert_eq!(m["status"], "scheduled");
    assert_eq!(m["score_a"], 0);
}

#[tokio::test]
async fn test_roster_bans_and_withdrawal_over_http() {
    let server = TestServer::new();
    let (tid, teams) = server.seeded_tournament(3, 4).await;
    let admin = server.admin_token();
    let captain = server.captain_token(100, teams[0]);

    let (status, team) = server
        .send(
            "PUT",
            "/api/v1/mobile/my-team",
            Some(&captain),
            Some(json!({"name": "Team Zero FC", "logo_url": "https://img/zero.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["name"], "Team Zero FC");
    assert_eq!(team["logo_url"], "https://img/zero.png");

    let mut player_ids = Vec::new();
    for (name, jersey) in [("Bench", 12), ("Striker", 9)] {
        let (status, player) = server
            .send(
                "POST",
                "/api/v1/mobile/my-team/players",
                Some(&captain),
                Some(json!({"name": name, "jersey_number": jersey})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        player_ids.push(player["id"].as_i64().unwrap());
    }
    let (bench, striker) = (player_ids[0], player_ids[1]);

    let (status, _) = server
        .send(
            "DELETE",
            &format!("/api/v1/mobile/my-team/players/{bench}"),
            Some(&captain),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = server
        .send("GET", &format!("/api/v1/players/{bench}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Another captain cannot remove this roster's players
    let other = server.captain_token(101, teams[1]);
    let (status, _) = server
        .send(
            "DELETE",
            &format!("/api/v1/mobile/my-team/players/{striker}"),
            Some(&other),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let withdraw = format!("/api/v1/admin/tournaments/{tid}/teams/{}", teams[2]);
    let (status, _) = server.send("DELETE", &withdraw, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = server.send("DELETE", &withdraw, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.send("DELETE", &withdraw, Some(&captain), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .send(
            "POST",
            &format!("/api/v1/admin/tournaments/{tid}/generate"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let final_id = server.matches(tid).await[0]["id"].as_i64().unwrap();

    // No body bans the player
    let (status, player) = server
        .send(
            "POST",
            &format!("/api/v1/admin/players/{striker}/ban"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(player["is_banned"], true);

    let event_uri = format!("/api/v1/mobile/matches/{final_id}/events");
    let goal = json!({"player_id": striker, "type": "goal", "minute": 15});
    let (status, _) = server
        .send("POST", &event_uri, Some(&captain), Some(goal.clone()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, player) = server
        .send(
            "POST",
            &format!("/api/v1/admin/players/{striker}/ban"),
            Some(&admin),
            Some(json!({"is_banned": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(player["is_banned"], false);

    let (status, _) = server
        .send("POST", &event_uri, Some(&captain), Some(goal))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // The withdrawn team's captain is not part of the final
    let outsider = server.captain_token(102, teams[2]);
    let (status, _) = server
        .send(
            "POST",
            &event_uri,
            Some(&outsider),
            Some(json!({"player_id": striker, "type": "goal", "minute": 16})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .send(
            "DELETE",
            &format!("/api/v1/mobile/my-team/players/{striker}"),
            Some(&captain),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
