// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use api_dashboard::config::Config;
use api_dashboard::db::SqliteDb;
use api_dashboard::routes::create_router;
use api_dashboard::services::{
    http_client, CryptoClient, GitHubClient, InMemoryNotificationStore, NewsClient, Providers,
    WeatherClient,
};
use api_dashboard::AppState;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Nothing listens here, so every upstream call fails fast.
#[allow(dead_code)]
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

#[allow(dead_code)]
pub const NEWS_KEY: &str = "test_news_key";
#[allow(dead_code)]
pub const WEATHER_KEY: &str = "test_weather_key";

/// Providers pointed at `base_url`, with news and weather keys configured.
#[allow(dead_code)]
pub fn providers_at(base_url: &str) -> Providers {
    let http = http_client().unwrap();
    let timeout = Duration::from_secs(2);
    Providers {
        news: NewsClient::new(http.clone(), Some(NEWS_KEY.to_string()))
            .with_base_url(base_url)
            .with_timeout(timeout),
        weather: WeatherClient::new(http.clone(), Some(WEATHER_KEY.to_string()))
            .with_base_url(base_url)
            .with_timeout(timeout),
        crypto: CryptoClient::new(http.clone(), None)
            .with_base_url(base_url)
            .with_timeout(timeout),
        github: GitHubClient::new(http, None)
            .with_base_url(base_url)
            .with_timeout(timeout),
    }
}

/// Create a test app over an in-memory database and the given providers.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(providers: Providers) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: SqliteDb::open_in_memory().unwrap(),
        providers,
        notifications: Arc::new(InMemoryNotificationStore::new()),
    });

    (create_router(state.clone()), state)
}

/// Create a test app whose upstreams are all unreachable.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(providers_at(UNREACHABLE))
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request and decode the JSON response body.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Register a user through the API and return its id.
#[allow(dead_code)]
pub async fn create_user(app: &axum::Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "correct horse battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["user"]["id"].as_i64().unwrap()
}
