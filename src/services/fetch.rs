// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared plumbing for provider adapters.
//!
//! Every adapter operation issues at most one outbound GET. Whatever goes
//! wrong on the way (transport error, timeout, non-2xx status, malformed
//! JSON) is logged here and turned into [`Fetched::Degraded`], which callers
//! collapse into the empty value of the operation's return shape.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default bound on a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of body bytes kept in a status error for logging.
const ERROR_BODY_LIMIT: usize = 512;

/// Why an upstream call produced no data.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reason an operation returned the empty sentinel.
#[derive(Debug)]
pub enum Degraded {
    /// The provider needs a credential and none is configured.
    MissingCredential,
    /// The outbound call failed.
    Upstream(UpstreamError),
}

/// Outcome of an adapter operation.
///
/// The HTTP surface only ever sees the data or the empty sentinel; the
/// variant keeps the distinction visible to tests and diagnostics.
#[derive(Debug)]
pub enum Fetched<T> {
    Data(T),
    Degraded(Degraded),
}

impl<T> Fetched<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded(_))
    }

    pub fn degraded_reason(&self) -> Option<&Degraded> {
        match self {
            Fetched::Data(_) => None,
            Fetched::Degraded(reason) => Some(reason),
        }
    }

    /// For operations whose empty sentinel is "absent".
    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Data(value) => Some(value),
            Fetched::Degraded(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Data(value) => Fetched::Data(f(value)),
            Fetched::Degraded(reason) => Fetched::Degraded(reason),
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The data, or the shape's empty value (`[]`, `{}`, zeroed page).
    pub fn into_data(self) -> T {
        match self {
            Fetched::Data(value) => value,
            Fetched::Degraded(_) => T::default(),
        }
    }
}

/// HTTP access to one provider's base URL.
#[derive(Clone)]
pub struct Upstream {
    http: reqwest::Client,
    provider: &'static str,
    base_url: String,
    timeout: Duration,
}

impl Upstream {
    pub fn new(http: reqwest::Client, provider: &'static str, base_url: &str) -> Self {
        Self {
            http,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Start a GET to `path` (relative to the base URL) with the default timeout.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<R, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, ERROR_BODY_LIMIT);
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Run one operation: send, decode, reshape, or degrade.
    pub async fn fetch<R, T>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        reshape: impl FnOnce(R) -> T,
    ) -> Fetched<T>
    where
        R: DeserializeOwned,
    {
        match self.send_json::<R>(request).await {
            Ok(raw) => Fetched::Data(reshape(raw)),
            Err(e) => {
                tracing::warn!(
                    provider = self.provider,
                    operation,
                    error = %e,
                    "Upstream call failed, returning empty result"
                );
                Fetched::Degraded(Degraded::Upstream(e))
            }
        }
    }

    /// Degrade without a network call because no credential is configured.
    pub fn missing_credential<T>(&self, operation: &'static str) -> Fetched<T> {
        tracing::debug!(
            provider = self.provider,
            operation,
            "No credential configured, skipping upstream call"
        );
        Fetched::Degraded(Degraded::MissingCredential)
    }
}

/// Shorten `text` to at most `limit` bytes without splitting a character.
fn truncate_on_char_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
