// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cryptocurrency routes.

use crate::error::{AppError, Result};
use crate::routes::envelope;
use crate::services::crypto::{
    DEFAULT_CHART_DAYS, DEFAULT_COINS, DEFAULT_TOP_LIMIT, DEFAULT_VS_CURRENCY,
};
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/crypto/api/prices", get(prices))
        .route("/crypto/api/coin/{coin_id}", get(coin))
        .route("/crypto/api/trending", get(trending))
        .route("/crypto/api/top", get(top))
        .route("/crypto/api/chart/{coin_id}", get(chart))
}

/// `coins` may repeat (`?coins=a&coins=b`) or carry a comma list.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct PricesQuery {
    coins: Vec<String>,
    vs_currency: String,
}

impl Default for PricesQuery {
    fn default() -> Self {
        Self {
            coins: Vec::new(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
        }
    }
}

/// Flatten repeated and comma-separated ids; fall back to the default set.
fn requested_coins(raw: &[String]) -> Vec<String> {
    let coins: Vec<String> = raw
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if coins.is_empty() {
        DEFAULT_COINS.iter().map(|c| c.to_string()).collect()
    } else {
        coins
    }
}

async fn prices(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<
        axum_extra::extract::Query<PricesQuery>,
        axum_extra::extract::QueryRejection,
    >,
) -> Result<Json<Value>> {
    let axum_extra::extract::Query(params) = params?;
    let coins = requested_coins(&params.coins);
    let prices = state
        .providers
        .crypto
        .prices(&coins, &params.vs_currency)
        .await;

    envelope("prices", prices.into_data())
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MarketQuery {
    vs_currency: String,
    limit: u32,
    page: u32,
    days: u32,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            limit: DEFAULT_TOP_LIMIT,
            page: 1,
            days: DEFAULT_CHART_DAYS,
        }
    }
}

async fn coin(
    State(state): State<Arc<AppState>>,
    Path(coin_id): Path<String>,
    params: std::result::Result<Query<MarketQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let details = state
        .providers
        .crypto
        .coin_details(&coin_id, &params.vs_currency)
        .await
        .into_option()
        .ok_or_else(|| AppError::NotFound("Coin not found".to_string()))?;

    envelope("coin", details)
}

async fn trending(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let trending = state.providers.crypto.trending().await;
    envelope("trending", trending.into_data())
}

async fn top(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<MarketQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let coins = state
        .providers
        .crypto
        .top_coins(&params.vs_currency, params.limit, params.page)
        .await;

    envelope("coins", coins.into_data())
}

/// Degraded charts come back as `chart_data: null`, not an error.
async fn chart(
    State(state): State<Arc<AppState>>,
    Path(coin_id): Path<String>,
    params: std::result::Result<Query<MarketQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let chart = state
        .providers
        .crypto
        .market_chart(&coin_id, &params.vs_currency, params.days)
        .await;

    envelope("chart_data", chart.into_option())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_coins_defaults() {
        assert_eq!(requested_coins(&[]).len(), DEFAULT_COINS.len());
        assert_eq!(requested_coins(&[" ".to_string()]).len(), DEFAULT_COINS.len());
    }

    #[test]
    fn test_requested_coins_mixed_forms() {
        let raw = vec!["bitcoin,ethereum".to_string(), " solana ".to_string()];
        assert_eq!(
            requested_coins(&raw),
            vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "solana".to_string()
            ]
        );
    }
}
