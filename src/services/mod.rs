// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - provider adapters and business logic.

pub mod crypto;
pub mod fetch;
pub mod github;
pub mod news;
pub mod notifications;
pub mod password;
pub mod portfolio;
pub mod weather;

pub use crypto::CryptoClient;
pub use fetch::{Degraded, Fetched, UpstreamError};
pub use github::GitHubClient;
pub use news::NewsClient;
pub use notifications::{InMemoryNotificationStore, NotificationStore};
pub use weather::WeatherClient;

use crate::config::{credential_vars, resolve_credential, Config};
use std::time::Duration;

/// User-Agent sent on every outbound call. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The four provider adapters, built once at startup and shared by handlers.
#[derive(Clone)]
pub struct Providers {
    pub news: NewsClient,
    pub weather: WeatherClient,
    pub crypto: CryptoClient,
    pub github: GitHubClient,
}

impl Providers {
    /// Build all adapters over one pooled HTTP client.
    ///
    /// Credentials are resolved now: process environment first, then the
    /// values carried in `config`.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = http_client()?;
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        let providers = Self {
            news: NewsClient::new(
                http.clone(),
                resolve_credential(credential_vars::NEWS, config.news_api_key.as_deref()),
            )
            .with_timeout(timeout),
            weather: WeatherClient::new(
                http.clone(),
                resolve_credential(credential_vars::WEATHER, config.weather_api_key.as_deref()),
            )
            .with_timeout(timeout),
            crypto: CryptoClient::new(
                http.clone(),
                resolve_credential(credential_vars::CRYPTO, config.crypto_api_key.as_deref()),
            )
            .with_timeout(timeout),
            github: GitHubClient::new(
                http,
                resolve_credential(credential_vars::GITHUB, config.github_token.as_deref()),
            )
            .with_timeout(timeout),
        };

        tracing::info!(
            news = providers.news.check_status(),
            weather = providers.weather.check_status(),
            "Provider adapters initialized"
        );

        Ok(providers)
    }
}

/// Shared outbound HTTP client.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
