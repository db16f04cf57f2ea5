// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts and the records they own.
//!
//! Every owned-record route first checks that the user exists, so an unknown
//! user is always a 404 rather than a foreign-key failure.

use crate::error::{AppError, Result};
use crate::models::{
    HoldingUpdate, NewAlert, NewArticle, NewFavorite, NewHolding, NewStarredRepo, NewUser, User,
};
use crate::routes::envelope;
use crate::services::crypto::DEFAULT_VS_CURRENCY;
use crate::services::password::{spawn_hash, spawn_verify};
use crate::services::portfolio::{distinct_coin_ids, evaluate_alerts, value_portfolio};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .route("/api/users/{id}/articles", get(list_articles).post(save_article))
        .route("/api/users/{id}/articles/{article_id}", delete(delete_article))
        .route("/api/users/{id}/holdings", get(list_holdings).post(add_holding))
        .route(
            "/api/users/{id}/holdings/{holding_id}",
            put(update_holding).delete(delete_holding),
        )
        .route("/api/users/{id}/portfolio", get(portfolio))
        .route("/api/users/{id}/alerts", get(list_alerts).post(create_alert))
        .route("/api/users/{id}/alerts/check", post(check_alerts))
        .route("/api/users/{id}/alerts/{alert_id}", delete(delete_alert))
        .route("/api/users/{id}/favorites", get(list_favorites).post(add_favorite))
        .route("/api/users/{id}/favorites/{favorite_id}", delete(delete_favorite))
        .route("/api/users/{id}/repos", get(list_repos).post(star_repo))
        .route("/api/users/{id}/repos/{repo_id}", delete(delete_repo))
}

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Parse and validate a JSON body.
fn validated<T: Validate>(body: JsonBody<T>) -> Result<T> {
    let Json(payload) = body?;
    payload.validate()?;
    Ok(payload)
}

fn require_user(state: &AppState, id: i64) -> Result<User> {
    state
        .db
        .get_user(id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

/// Turn a `false` from a scoped delete into a 404.
fn deleted(found: bool, what: &str) -> Result<Json<Value>> {
    if !found {
        return Err(AppError::NotFound(format!("{} not found", what)));
    }
    envelope("message", format!("{} deleted", what))
}

fn created(body: Result<Json<Value>>) -> Result<(StatusCode, Json<Value>)> {
    Ok((StatusCode::CREATED, body?))
}

// ─── Accounts ────────────────────────────────────────────────

async fn create_user(
    State(state): State<Arc<AppState>>,
    body: JsonBody<NewUser>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    let password_hash = spawn_hash(payload.password).await?;
    let user = state
        .db
        .create_user(payload.username.trim(), payload.email.trim(), &password_hash)?;

    tracing::info!(user_id = user.id, "User created");
    created(envelope("user", user))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Check credentials. Unknown users and wrong passwords get the same answer.
async fn login(
    State(state): State<Arc<AppState>>,
    body: JsonBody<LoginRequest>,
) -> Result<Json<Value>> {
    let Json(payload) = body?;
    let rejected = || AppError::Unauthorized("Invalid username or password".to_string());
    let user = state
        .db
        .get_user_by_username(payload.username.trim())?
        .ok_or_else(rejected)?;
    if !spawn_verify(payload.password, user.password_hash.clone()).await? {
        return Err(rejected());
    }

    envelope("user", user)
}

async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<Value>> {
    envelope("user", require_user(&state, id)?)
}

/// Delete a user together with everything it owns.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let found = state.db.delete_user(id)?;
    if found {
        tracing::info!(user_id = id, "User deleted with all owned records");
    }
    deleted(found, "User")
}

// ─── Saved articles ──────────────────────────────────────────

async fn list_articles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    envelope("articles", state.db.list_articles(id)?)
}

async fn save_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: JsonBody<NewArticle>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    require_user(&state, id)?;
    created(envelope("article", state.db.save_article(id, &payload)?))
}

async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path((id, article_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    deleted(state.db.delete_article(id, article_id)?, "Article")
}

// ─── Crypto holdings ─────────────────────────────────────────

async fn list_holdings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    envelope("holdings", state.db.list_holdings(id)?)
}

async fn add_holding(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: JsonBody<NewHolding>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    require_user(&state, id)?;
    created(envelope("holding", state.db.add_holding(id, &payload)?))
}

async fn update_holding(
    State(state): State<Arc<AppState>>,
    Path((id, holding_id)): Path<(i64, i64)>,
    body: JsonBody<HoldingUpdate>,
) -> Result<Json<Value>> {
    let payload = validated(body)?;
    if payload.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }
    require_user(&state, id)?;

    let holding = state
        .db
        .update_holding(id, holding_id, &payload)?
        .ok_or_else(|| AppError::NotFound("Holding not found".to_string()))?;
    envelope("holding", holding)
}

async fn delete_holding(
    State(state): State<Arc<AppState>>,
    Path((id, holding_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    deleted(state.db.delete_holding(id, holding_id)?, "Holding")
}

#[derive(Debug, Deserialize)]
struct PortfolioQuery {
    vs_currency: Option<String>,
}

/// Value all holdings with one price lookup. Missing quotes leave the
/// affected holdings unpriced.
async fn portfolio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    params: std::result::Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let vs_currency = params
        .vs_currency
        .unwrap_or_else(|| DEFAULT_VS_CURRENCY.to_string());
    require_user(&state, id)?;

    let holdings = state.db.list_holdings(id)?;
    let coin_ids = distinct_coin_ids(holdings.iter().map(|h| h.coin_id.as_str()));
    let quotes = if coin_ids.is_empty() {
        Default::default()
    } else {
        state
            .providers
            .crypto
            .prices(&coin_ids, &vs_currency)
            .await
            .into_data()
    };

    envelope(
        "portfolio",
        value_portfolio(&holdings, &quotes, &vs_currency),
    )
}

// ─── Price alerts ────────────────────────────────────────────

async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    envelope("alerts", state.db.list_alerts(id)?)
}

async fn create_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: JsonBody<NewAlert>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    require_user(&state, id)?;
    created(envelope("alert", state.db.create_alert(id, &payload)?))
}

/// Evaluate active alerts against current USD prices. Alerts that fire are
/// deactivated and announced through the notification store.
async fn check_alerts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;

    let alerts = state.db.list_alerts(id)?;
    let coin_ids = distinct_coin_ids(
        alerts
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.coin_id.as_str()),
    );
    if coin_ids.is_empty() {
        return envelope("triggered", Vec::<()>::new());
    }

    let quotes = state
        .providers
        .crypto
        .prices(&coin_ids, DEFAULT_VS_CURRENCY)
        .await
        .into_data();
    let now = Utc::now();
    let mut triggered = Vec::new();
    for alert in evaluate_alerts(&alerts, &quotes) {
        // A concurrent check may have fired this alert already.
        if !state.db.mark_alert_triggered(alert.alert_id, now)? {
            continue;
        }
        state.notifications.create(
            format!(
                "{} is {} {} (now {})",
                alert.coin_id, alert.condition, alert.target_price, alert.current_price
            ),
            "alert".to_string(),
        );
        triggered.push(alert);
    }
    if !triggered.is_empty() {
        tracing::info!(user_id = id, count = triggered.len(), "Price alerts triggered");
    }

    envelope("triggered", triggered)
}

async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path((id, alert_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    deleted(state.db.delete_alert(id, alert_id)?, "Alert")
}

// ─── Weather favorites ───────────────────────────────────────

async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    envelope("favorites", state.db.list_favorites(id)?)
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: JsonBody<NewFavorite>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    require_user(&state, id)?;
    created(envelope("favorite", state.db.add_favorite(id, &payload)?))
}

async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    Path((id, favorite_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    deleted(state.db.delete_favorite(id, favorite_id)?, "Favorite")
}

// ─── Starred repositories ────────────────────────────────────

async fn list_repos(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    envelope("repos", state.db.list_starred_repos(id)?)
}

async fn star_repo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: JsonBody<NewStarredRepo>,
) -> Result<(StatusCode, Json<Value>)> {
    let payload = validated(body)?;
    require_user(&state, id)?;
    created(envelope("repo", state.db.star_repo(id, &payload)?))
}

async fn delete_repo(
    State(state): State<Arc<AppState>>,
    Path((id, repo_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    require_user(&state, id)?;
    deleted(state.db.delete_starred_repo(id, repo_id)?, "Repository")
}
