//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::SqliteDb;

/// Table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const SAVED_ARTICLES: &str = "saved_articles";
    pub const CRYPTO_HOLDINGS: &str = "crypto_holdings";
    pub const PRICE_ALERTS: &str = "price_alerts";
    pub const WEATHER_FAVORITES: &str = "weather_favorites";
    pub const STARRED_REPOS: &str = "starred_repos";

    /// Tables whose rows belong to exactly one user and go away with it.
    pub const OWNED: &[&str] = &[
        SAVED_ARTICLES,
        CRYPTO_HOLDINGS,
        PRICE_ALERTS,
        WEATHER_FAVORITES,
        STARRED_REPOS,
    ];
}
