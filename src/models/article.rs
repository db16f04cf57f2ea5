// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved news article model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A news article a user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArticle {
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    /// Publisher name
    pub source: Option<String>,
    /// Publication time as reported by the provider
    pub published_at: Option<String>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewArticle {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url, length(max = 500))]
    pub url: String,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(length(max = 50))]
    pub published_at: Option<String>,
}
