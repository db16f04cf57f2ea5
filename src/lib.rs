// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! API Dashboard: one JSON backend over news, weather, crypto and GitHub.
//!
//! Each provider sits behind an adapter that turns any upstream failure into
//! an empty result, so a dead provider degrades its section of the dashboard
//! instead of failing requests. User favorites, holdings and alerts are kept
//! in SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SqliteDb;
use services::{NotificationStore, Providers};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SqliteDb,
    pub providers: Providers,
    pub notifications: Arc<dyn NotificationStore>,
}
