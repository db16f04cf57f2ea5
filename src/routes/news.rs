// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! News routes.

use crate::error::{AppError, Result};
use crate::routes::envelope;
use crate::services::news::{HeadlinesParams, NewsPage, SearchParams, SourcesParams, CATEGORIES};
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/news/api/headlines", get(headlines))
        .route("/news/api/search", get(search))
        .route("/news/api/sources", get(sources))
        .route("/news/api/categories", get(categories))
}

/// Article list response; `total_results` is the provider's count across
/// all pages.
#[derive(Serialize)]
pub struct ArticlesResponse {
    pub success: bool,
    pub articles: Vec<crate::services::news::Article>,
    pub total_results: u64,
}

impl From<NewsPage> for ArticlesResponse {
    fn from(page: NewsPage) -> Self {
        Self {
            success: true,
            articles: page.articles,
            total_results: page.total_results,
        }
    }
}

async fn headlines(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<HeadlinesParams>, QueryRejection>,
) -> Result<Json<ArticlesResponse>> {
    let Query(params) = params?;
    let page = state.providers.news.top_headlines(&params).await;
    Ok(Json(page.into_data().into()))
}

async fn search(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<ArticlesResponse>> {
    let Query(params) = params?;
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query required".to_string()));
    }

    let page = state.providers.news.search_everything(&params).await;
    Ok(Json(page.into_data().into()))
}

async fn sources(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SourcesParams>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let sources = state.providers.news.sources(&params).await;
    envelope("sources", sources.into_data())
}

async fn categories() -> Result<Json<Value>> {
    envelope("categories", CATEGORIES)
}
