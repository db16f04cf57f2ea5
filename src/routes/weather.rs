// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather routes.

use crate::error::{AppError, Result};
use crate::routes::envelope;
use crate::services::weather::{DEFAULT_FORECAST_DAYS, DEFAULT_UNITS};
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather/api/current/{city}", get(current))
        .route("/weather/api/forecast/{city}", get(forecast))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct WeatherQuery {
    units: String,
    days: u32,
}

impl Default for WeatherQuery {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS.to_string(),
            days: DEFAULT_FORECAST_DAYS,
        }
    }
}

async fn current(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    params: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let reading = state
        .providers
        .weather
        .current(&city, &params.units)
        .await
        .into_option()
        .ok_or_else(|| AppError::BadRequest("Failed to fetch weather data".to_string()))?;

    envelope("weather", reading)
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    params: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let forecast = state
        .providers
        .weather
        .forecast(&city, params.days, &params.units)
        .await
        .into_option()
        .ok_or_else(|| AppError::BadRequest("Failed to fetch forecast data".to_string()))?;

    envelope("forecast", forecast)
}
