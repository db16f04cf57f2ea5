// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub routes: search, trending and per-repository analytics.

use crate::error::{AppError, Result};
use crate::routes::envelope;
use crate::services::github::{
    RepoSearchParams, TrendingWindow, DEFAULT_COMMITS_LIMIT, DEFAULT_CONTRIBUTORS_LIMIT,
    DEFAULT_ISSUES_LIMIT, DEFAULT_PULLS_LIMIT, DEFAULT_STATE, DEFAULT_TRENDING_LIMIT,
};
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/github/api/trending", get(trending))
        .route("/github/api/search/repositories", get(search))
        .route("/github/api/rate_limit", get(rate_limit))
        .route("/github/api/repo/{owner}/{repo}", get(repository))
        .route("/github/api/repo/{owner}/{repo}/contributors", get(contributors))
        .route("/github/api/repo/{owner}/{repo}/languages", get(languages))
        .route("/github/api/repo/{owner}/{repo}/commits", get(commits))
        .route("/github/api/repo/{owner}/{repo}/issues", get(issues))
        .route("/github/api/repo/{owner}/{repo}/pulls", get(pulls))
        .route("/github/api/repo/{owner}/{repo}/releases", get(releases))
        .route("/github/api/repo/{owner}/{repo}/report", get(report))
}

type RepoPath = Path<(String, String)>;

// ─── Discovery ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TrendingQuery {
    language: Option<String>,
    since: String,
    limit: u32,
}

impl Default for TrendingQuery {
    fn default() -> Self {
        Self {
            language: None,
            since: "daily".to_string(),
            limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

async fn trending(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<TrendingQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let repos = state
        .providers
        .github
        .trending(
            params.language.as_deref(),
            TrendingWindow::parse(&params.since),
            params.limit,
        )
        .await;

    envelope("repositories", repos.into_data())
}

/// An empty query is rejected here, before any upstream call.
async fn search(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<RepoSearchParams>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query required".to_string()));
    }

    let repos = state.providers.github.search_repositories(&params).await;
    envelope("results", repos.into_data())
}

#[derive(Serialize)]
struct RateLimit {
    remaining: u64,
}

async fn rate_limit(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let remaining = state.providers.github.rate_limit_remaining().await;
    envelope(
        "rate_limit",
        RateLimit {
            remaining: remaining.into_data(),
        },
    )
}

// ─── Repository analytics ────────────────────────────────────

async fn repository(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
) -> Result<Json<Value>> {
    let repository = state
        .providers
        .github
        .repository(&owner, &repo)
        .await
        .into_option()
        .ok_or_else(|| AppError::NotFound("Repository not found".to_string()))?;

    envelope("repository", repository)
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListQuery {
    limit: Option<u32>,
    state: String,
    since: Option<String>,
    until: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: None,
            state: DEFAULT_STATE.to_string(),
            since: None,
            until: None,
        }
    }
}

async fn contributors(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
    params: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_CONTRIBUTORS_LIMIT);
    let contributors = state
        .providers
        .github
        .contributors(&owner, &repo, limit)
        .await;

    envelope("contributors", contributors.into_data())
}

async fn languages(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
) -> Result<Json<Value>> {
    let languages = state.providers.github.languages(&owner, &repo).await;
    envelope("languages", languages.into_data())
}

async fn commits(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
    params: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let commits = state
        .providers
        .github
        .commits(
            &owner,
            &repo,
            params.since.as_deref(),
            params.until.as_deref(),
            params.limit.unwrap_or(DEFAULT_COMMITS_LIMIT),
        )
        .await;

    envelope("commits", commits.into_data())
}

async fn issues(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
    params: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let issues = state
        .providers
        .github
        .issues(
            &owner,
            &repo,
            &params.state,
            params.limit.unwrap_or(DEFAULT_ISSUES_LIMIT),
        )
        .await;

    envelope("issues", issues.into_data())
}

async fn pulls(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
    params: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = params?;
    let pulls = state
        .providers
        .github
        .pull_requests(
            &owner,
            &repo,
            &params.state,
            params.limit.unwrap_or(DEFAULT_PULLS_LIMIT),
        )
        .await;

    envelope("pull_requests", pulls.into_data())
}

async fn releases(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
) -> Result<Json<Value>> {
    let releases = state.providers.github.releases(&owner, &repo).await;
    envelope("releases", releases.into_data())
}

async fn report(
    State(state): State<Arc<AppState>>,
    Path((owner, repo)): RepoPath,
) -> Result<Json<Value>> {
    let report = state.providers.github.full_report(&owner, &repo).await;
    envelope("report", report)
}
