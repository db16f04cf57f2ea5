// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for persisted records and in-memory notifications.

pub mod article;
pub mod crypto;
pub mod github;
pub mod notification;
pub mod user;
pub mod weather;

pub use article::{NewArticle, SavedArticle};
pub use crypto::{AlertCondition, CryptoHolding, HoldingUpdate, NewAlert, NewHolding, PriceAlert};
pub use github::{NewStarredRepo, StarredRepo};
pub use notification::{NewNotification, Notification};
pub use user::{NewUser, User};
pub use weather::{NewFavorite, WeatherFavorite};
