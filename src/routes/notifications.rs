// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification routes backed by the injected store.

use crate::error::{AppError, Result};
use crate::models::{NewNotification, Notification};
use crate::routes::envelope;
use crate::services::notifications::DEFAULT_KIND;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{routing::get, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications/api/", get(list).post(create))
        .route("/notifications/api/{id}/read", post(mark_read))
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
    pub count: usize,
}

async fn list(State(state): State<Arc<AppState>>) -> Json<NotificationsResponse> {
    let notifications = state.notifications.list();
    Json(NotificationsResponse {
        success: true,
        count: notifications.len(),
        notifications,
    })
}

async fn create(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewNotification>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(payload) =
        payload.map_err(|_| AppError::BadRequest("Message is required".to_string()))?;
    if payload.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }
    payload.validate()?;

    let kind = payload
        .kind
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_KIND.to_string());
    let notification = state.notifications.create(payload.message, kind);
    tracing::debug!(id = notification.id, kind = %notification.kind, "Notification created");

    Ok((StatusCode::CREATED, envelope("notification", notification)?))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>> {
    let notification = state
        .notifications
        .mark_read(id)
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    envelope("notification", notification)
}
