//! End-to-end tests driving the real router over TCP against the in-memory
//! store.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    missing_docs
)]

use std::sync::Arc;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio_test::assert_ok;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use uuid::Uuid;

use touchline::api::build_app;
use touchline::app_state::AppState;
use touchline::config::AppConfig;
use touchline::domain::{MatchId, MatchStatus, SchemaCapabilities};
use touchline::identity::TrustedHeaderIdentity;
use touchline::persistence::{MatchRecord, MemoryStore, SocialStore};

struct TestApp {
    base: String,
    client: Client,
}

struct Fan {
    id: Uuid,
    name: &'static str,
}

impl Fan {
    fn new(name: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

impl TestApp {
    async fn spawn(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        for (id, home, away) in [
            (42, "Liverpool", "Everton"),
            (43, "Celtic", "Rangers"),
            (44, "Roma", "Lazio"),
        ] {
            store
                .upsert_match(MatchRecord {
                    id: MatchId::new(id),
                    home_team: home.to_string(),
                    away_team: away.to_string(),
                    competition: None,
                    home_score: Some(2),
                    away_score: Some(0),
                    status: MatchStatus::Finished,
                    kickoff_at: Utc::now(),
                })
                .await;
        }

        let state = AppState::new(
            store as Arc<dyn SocialStore>,
            &config,
            SchemaCapabilities::default(),
            Arc::new(TrustedHeaderIdentity::from_config(&config)),
        );
        let app = build_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn ws_url(&self) -> String {
        format!("{}/ws", self.base.replacen("http://", "ws://", 1))
    }

    async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        fan: Option<&Fan>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(fan) = fan {
            req = req
                .header("x-user-id", fan.id.to_string())
                .header("x-user-name", fan.name);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = assert_ok!(req.send().await);
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, fan: Option<&Fan>) -> (StatusCode, Value) {
        self.call(reqwest::Method::GET, path, fan, None).await
    }

    async fn post(&self, path: &str, fan: &Fan, body: Option<Value>) -> (StatusCode, Value) {
        self.call(reqwest::Method::POST, path, Some(fan), body).await
    }

    async fn log_match(&self, fan: &Fan, rating: f64, review: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/logs",
                fan,
                Some(json!({ "match_id": 42, "rating": rating, "review": review })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["log"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["engagement_tables"], true);
    assert_eq!(body["live_connections"], 0);
}

#[tokio::test]
async fn anonymous_writes_are_unauthenticated() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let (status, body) = app
        .call(
            reqwest::Method::POST,
            "/api/v1/logs",
            None,
            Some(json!({ "match_id": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], 1101);
}

#[tokio::test]
async fn me_provisions_a_profile_once() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let ana = Fan::new("Ana");

    let (status, first) = app.get("/api/v1/me", Some(&ana)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["username"], "ana");
    let (_, second) = app.get("/api/v1/me", Some(&ana)).await;
    assert_eq!(first, second);

    let (status, profile) = app.get("/api/v1/users/ANA", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["profile"]["id"], ana.id.to_string());
    assert_eq!(profile["viewer_follows"], false);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let ana = Fan::new("Ana");

    let (status, body) = app.post("/api/v1/logs/not-a-uuid/like", &ana, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);

    let (status, _) = app.get("/api/v1/matches/abc/ratings", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_queries_and_bodies_use_the_error_envelope() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let ana = Fan::new("Ana");

    let (status, body) = app.get("/api/v1/feed?tab=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], 1001);

    let (status, body) = app
        .post("/api/v1/logs", &ana, Some(json!({ "match_id": "forty-two" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn friends_feed_is_empty_for_anonymous_viewers() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let ana = Fan::new("Ana");
    app.log_match(&ana, 4.0, "solid").await;

    let (status, body) = app.get("/api/v1/feed?tab=friends", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));

    let (_, body) = app.get("/api/v1/feed?tab=global&sort=trending", None).await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["match"]["title"], "Liverpool v Everton");
}

#[tokio::test]
async fn notifications_are_empty_for_anonymous_viewers() {
    let app = TestApp::spawn(AppConfig::default()).await;

    let (status, body) = app.get("/api/v1/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"].as_array().map(Vec::len), Some(0));
    assert!(body["next_cursor"].is_null());
}

#[tokio::test]
async fn follow_log_like_and_notify() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let a = Fan::new("Ana");
    let b = Fan::new("Ben");
    let _ = app.get("/api/v1/me", Some(&a)).await;
    let _ = app.get("/api/v1/me", Some(&b)).await;

    let (status, body) = app
        .post(&format!("/api/v1/users/{}/follow", a.id), &b, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["following"], true);
    let (status, _) = app.post("/api/v1/notifications/read-all", &a, None).await;
    assert_eq!(status, StatusCode::OK);

    let log_id = app.log_match(&a, 4.5, "Great game").await;

    let (_, feed) = app.get("/api/v1/feed?tab=friends&sort=newest", Some(&b)).await;
    let items = feed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["rating"], 4.5);
    assert_eq!(items[0]["like_count"], 0);
    assert_eq!(items[0]["viewer_liked"], false);

    let (status, like) = app
        .post(&format!("/api/v1/logs/{log_id}/like"), &b, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like["state"], "liked");

    let (_, feed) = app.get("/api/v1/feed?tab=friends&sort=newest", Some(&b)).await;
    assert_eq!(feed["items"][0]["like_count"], 1);
    assert_eq!(feed["items"][0]["viewer_liked"], true);

    let (_, unread) = app.get("/api/v1/notifications/unread-count", Some(&a)).await;
    assert_eq!(unread["count"], 1);
    let (_, list) = app.get("/api/v1/notifications", Some(&a)).await;
    let first = &list["notifications"][0];
    assert_eq!(first["kind"], "log_like");
    assert_eq!(first["actor"]["username"], "ben");
    assert!(first["read_at"].is_null());

    let id = first["id"].as_str().unwrap().to_string();
    let (_, marked) = app
        .post(&format!("/api/v1/notifications/{id}/read"), &a, None)
        .await;
    assert_eq!(marked["updated"], 1);
    let (_, unread) = app.get("/api/v1/notifications/unread-count", Some(&a)).await;
    assert_eq!(unread["count"], 0);
}

#[tokio::test]
async fn comments_are_listed_oldest_first() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let a = Fan::new("Ana");
    let b = Fan::new("Ben");
    let log_id = app.log_match(&a, 3.0, "tense").await;
    let path = format!("/api/v1/logs/{log_id}/comments");

    let (status, created) = app
        .post(&path, &b, Some(json!({ "body": "x".repeat(600) })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["comment"]["body"].as_str().map(str::len), Some(500));

    let (status, _) = app.post(&path, &b, Some(json!({ "body": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _ = app.post(&path, &a, Some(json!({ "body": "cheers" }))).await;
    let (_, list) = app.get(&path, None).await;
    let comments = list["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["author"]["username"], "ben");
    assert_eq!(comments[1]["body"], "cheers");
}

#[tokio::test]
async fn match_page_and_ratings() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let a = Fan::new("Ana");
    let b = Fan::new("Ben");
    app.log_match(&a, 4.5, "a").await;
    app.log_match(&b, 3.5, "b").await;

    let (_, logs) = app.get("/api/v1/matches/42/logs?sort=recency", None).await;
    assert_eq!(logs["items"].as_array().map(Vec::len), Some(2));

    let (_, stats) = app.get("/api/v1/matches/42/ratings", None).await;
    assert_eq!(stats["count"], 2);
    assert_eq!(stats["average"], 4.0);
    assert_eq!(stats["histogram"], json!([0, 0, 0, 1, 1]));
}

#[tokio::test]
async fn log_creation_is_rate_limited() {
    let config = AppConfig {
        log_rate_limit: 2,
        ..AppConfig::default()
    };
    let app = TestApp::spawn(config).await;
    let ana = Fan::new("Ana");
    for match_id in [42, 43] {
        let (status, _) = app
            .post("/api/v1/logs", &ana, Some(json!({ "match_id": match_id })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .post("/api/v1/logs", &ana, Some(json!({ "match_id": 44 })))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], 1201);
}

#[tokio::test]
async fn pinned_account_cannot_be_unfollowed() {
    let config = AppConfig {
        pinned_account_enabled: true,
        pinned_account_username: Some("touchline".to_string()),
        ..AppConfig::default()
    };
    let app = TestApp::spawn(config).await;
    let official = Fan::new("Touchline");
    let ben = Fan::new("Ben");
    let _ = app.get("/api/v1/me", Some(&official)).await;
    let path = format!("/api/v1/users/{}/follow", official.id);
    let _ = app.post(&path, &ben, None).await;

    let (status, body) = app
        .call(reqwest::Method::DELETE, &path, Some(&ben), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 1102);
}

#[tokio::test]
async fn websocket_pushes_own_notifications() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let a = Fan::new("Ana");
    let b = Fan::new("Ben");
    let log_id = app.log_match(&a, 4.0, "good").await;

    let mut request = app.ws_url().into_client_request().unwrap();
    request.headers_mut().insert(
        "x-user-id",
        HeaderValue::from_str(&a.id.to_string()).unwrap(),
    );
    let (mut socket, _) = assert_ok!(connect_async(request).await);

    let _ = app
        .post(&format!("/api/v1/logs/{log_id}/like"), &b, None)
        .await;

    let Some(Ok(pushed)) = socket.next().await else {
        panic!("no push received");
    };
    let pushed: Value = serde_json::from_str(pushed.to_text().unwrap()).unwrap();
    assert_eq!(pushed["type"], "notification");
    assert_eq!(pushed["payload"]["kind"], "log_like");
    assert_eq!(pushed["payload"]["log_id"], log_id);

    let command = json!({
        "id": "req-1",
        "type": "command",
        "payload": { "command": "unread_count" }
    });
    assert_ok!(socket.send(Message::text(command.to_string())).await);
    let Some(Ok(reply)) = socket.next().await else {
        panic!("no reply received");
    };
    let reply: Value = serde_json::from_str(reply.to_text().unwrap()).unwrap();
    assert_eq!(reply["id"], "req-1");
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["count"], 1);
}

#[tokio::test]
async fn websocket_requires_sign_in() {
    let app = TestApp::spawn(AppConfig::default()).await;
    let request = app.ws_url().into_client_request().unwrap();
    assert!(connect_async(request).await.is_err());
}
