// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod crypto;
pub mod github;
pub mod news;
pub mod notifications;
pub mod users;
pub mod weather;

use crate::error::{AppError, Result};
use crate::services::github::TrendingWindow;
use crate::services::news::HeadlinesParams;
use crate::services::weather::DEFAULT_UNITS;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// City shown on the dashboard overview.
const DASHBOARD_CITY: &str = "London";
const DASHBOARD_COINS: &[&str] = &["bitcoin", "ethereum", "cardano"];
const DASHBOARD_HEADLINES: u32 = 5;
const DASHBOARD_REPOS: u32 = 5;

/// Wrap `data` as `{"success": true, <key>: data}`.
pub(crate) fn envelope<T: Serialize>(key: &str, data: T) -> Result<Json<Value>> {
    let data = serde_json::to_value(data).map_err(anyhow::Error::from)?;
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(key.to_string(), data);
    Ok(Json(Value::Object(body)))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "API is running".to_string(),
    })
}

/// Per-provider availability.
#[derive(Debug, Serialize)]
pub struct ApiStatus {
    pub news: &'static str,
    pub weather: &'static str,
    pub crypto: &'static str,
    pub github: &'static str,
}

fn status_label(ok: bool, failure: &'static str) -> &'static str {
    if ok {
        "OK"
    } else {
        failure
    }
}

/// Probe every provider. News and weather only check that a key is
/// configured; crypto and GitHub make a live call.
async fn test_apis(State(state): State<Arc<AppState>>) -> Json<ApiStatus> {
    let providers = &state.providers;
    let (crypto_ok, github_ok) = tokio::join!(
        providers.crypto.check_status(),
        providers.github.check_status()
    );

    Json(ApiStatus {
        news: status_label(providers.news.check_status(), "API Key Missing"),
        weather: status_label(providers.weather.check_status(), "API Key Missing"),
        crypto: status_label(crypto_ok, "Error"),
        github: status_label(github_ok, "Error"),
    })
}

#[derive(Serialize)]
struct DashboardData {
    news: crate::services::news::NewsPage,
    weather: Option<crate::services::weather::WeatherReading>,
    crypto: crate::services::crypto::PriceMap,
    github: Vec<crate::services::github::RepoSummary>,
}

/// Overview of all four providers in one response. Each section degrades
/// independently; a failing provider never fails the whole request.
async fn dashboard_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let providers = &state.providers;
    let headlines = HeadlinesParams {
        page_size: DASHBOARD_HEADLINES,
        ..Default::default()
    };
    let coins: Vec<String> = DASHBOARD_COINS.iter().map(|c| c.to_string()).collect();

    let (news, weather, crypto, github) = tokio::join!(
        providers.news.top_headlines(&headlines),
        providers.weather.current(DASHBOARD_CITY, DEFAULT_UNITS),
        providers.crypto.prices(&coins, crate::services::crypto::DEFAULT_VS_CURRENCY),
        providers
            .github
            .trending(None, TrendingWindow::Daily, DASHBOARD_REPOS),
    );

    envelope(
        "data",
        DashboardData {
            news: news.into_data(),
            weather: weather.into_option(),
            crypto: crypto.into_data(),
            github: github.into_data(),
        },
    )
}

/// Fallback for unknown paths, in the same envelope as every other error.
async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(health_check))
        .route("/test-apis", get(test_apis))
        .route("/dashboard/data", get(dashboard_data))
        .merge(news::routes())
        .merge(weather::routes())
        .merge(crypto::routes())
        .merge(github::routes())
        .merge(notifications::routes())
        .merge(users::routes())
        .fallback(not_found)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let Json(body) = envelope("prices", vec![1, 2]).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["prices"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true, "Error"), "OK");
        assert_eq!(status_label(false, "API Key Missing"), "API Key Missing");
    }
}
