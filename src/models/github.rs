// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Starred GitHub repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A repository bookmarked by a user, with the stats seen when it was starred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarredRepo {
    pub id: i64,
    pub user_id: i64,
    /// "owner/name"; unique per user
    pub repo_full_name: String,
    pub repo_name: String,
    pub owner: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub url: String,
    pub starred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStarredRepo {
    #[validate(length(min = 3, max = 200))]
    pub repo_full_name: String,
    #[validate(length(min = 1, max = 100))]
    pub repo_name: String,
    #[validate(length(min = 1, max = 100))]
    pub owner: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub language: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stars: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub forks: i64,
    #[validate(url, length(max = 500))]
    pub url: String,
}
