//! Application configuration loaded from environment variables.
//!
//! Provider credentials are optional. A missing key never fails startup; the
//! affected provider degrades to empty results instead.

use std::env;

/// Environment variables consulted for each provider credential, in order.
/// The first name is the canonical one, the rest are legacy aliases.
pub mod credential_vars {
    pub const NEWS: &[&str] = &["NEWSAPI_KEY", "NEWS_API_KEY"];
    pub const WEATHER: &[&str] = &["OPENWEATHER_API_KEY", "WEATHER_API_KEY"];
    pub const CRYPTO: &[&str] = &["CRYPTO_API_KEY"];
    pub const GITHUB: &[&str] = &["GITHUB_TOKEN"];
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "dashboard.db";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite database file
    pub database_path: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Timeout applied to every outbound provider call
    pub upstream_timeout_secs: u64,

    // --- Provider credentials ---
    pub news_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub crypto_api_key: Option<String>,
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            upstream_timeout_secs: parse_var(
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            news_api_key: read_credential(credential_vars::NEWS),
            weather_api_key: read_credential(credential_vars::WEATHER),
            crypto_api_key: read_credential(credential_vars::CRYPTO),
            github_token: read_credential(credential_vars::GITHUB),
        })
    }

    /// Config for tests: in-memory friendly defaults and fake credentials.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: ":memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            upstream_timeout_secs: 2,
            news_api_key: Some("test_news_key".to_string()),
            weather_api_key: Some("test_weather_key".to_string()),
            crypto_api_key: None,
            github_token: None,
        }
    }
}

/// Resolve a provider credential at adapter construction time.
///
/// The process environment wins; `configured` is the fallback. Blank values
/// are treated as absent.
pub fn resolve_credential(vars: &[&str], configured: Option<&str>) -> Option<String> {
    read_credential(vars).or_else(|| non_blank(configured))
}

fn read_credential(vars: &[&str]) -> Option<String> {
    vars.iter()
        .find_map(|name| non_blank(env::var(name).ok().as_deref()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
