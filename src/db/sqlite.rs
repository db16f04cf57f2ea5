// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite storage with typed operations.
//!
//! Provides operations for:
//! - Users (accounts, unique username and email)
//! - Saved articles, crypto holdings, price alerts, weather favorites and
//!   starred repositories, each owned by one user
//!
//! Foreign keys are enforced, so deleting a user removes everything it owns.

use crate::db::tables;
use crate::error::AppError;
use crate::models::{
    AlertCondition, CryptoHolding, HoldingUpdate, NewAlert, NewArticle, NewFavorite, NewHolding,
    NewStarredRepo, PriceAlert, SavedArticle, StarredRepo, User, WeatherFavorite,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS saved_articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    url TEXT NOT NULL,
    image_url TEXT,
    source TEXT,
    published_at TEXT,
    saved_at TEXT NOT NULL,
    UNIQUE (user_id, url)
);

CREATE TABLE IF NOT EXISTS crypto_holdings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    coin_id TEXT NOT NULL,
    coin_name TEXT NOT NULL,
    symbol TEXT NOT NULL,
    amount REAL NOT NULL,
    purchase_price REAL,
    purchase_date TEXT,
    added_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, coin_id)
);

CREATE TABLE IF NOT EXISTS price_alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    coin_id TEXT NOT NULL,
    target_price REAL NOT NULL,
    condition TEXT NOT NULL CHECK (condition IN ('above', 'below')),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    triggered_at TEXT
);

CREATE TABLE IF NOT EXISTS weather_favorites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    city_name TEXT NOT NULL,
    country TEXT,
    latitude REAL,
    longitude REAL,
    added_at TEXT NOT NULL,
    UNIQUE (user_id, city_name)
);

CREATE TABLE IF NOT EXISTS starred_repos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    repo_full_name TEXT NOT NULL,
    repo_name TEXT NOT NULL,
    owner TEXT NOT NULL,
    description TEXT,
    language TEXT,
    stars INTEGER NOT NULL DEFAULT 0,
    forks INTEGER NOT NULL DEFAULT 0,
    url TEXT NOT NULL,
    starred_at TEXT NOT NULL,
    UNIQUE (user_id, repo_full_name)
);

CREATE INDEX IF NOT EXISTS idx_saved_articles_user ON saved_articles(user_id);
CREATE INDEX IF NOT EXISTS idx_crypto_holdings_user ON crypto_holdings(user_id);
CREATE INDEX IF NOT EXISTS idx_price_alerts_user ON price_alerts(user_id);
CREATE INDEX IF NOT EXISTS idx_weather_favorites_user ON weather_favorites(user_id);
CREATE INDEX IF NOT EXISTS idx_starred_repos_user ON starred_repos(user_id);
";

/// SQLite database handle. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path.display(), e)))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_error)?;

        tracing::info!(path = %path.display(), "Opened SQLite database");
        Self::init(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(db_error)?;
        conn.execute_batch(SCHEMA).map_err(db_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Database("Connection lock poisoned".to_string()))
    }

    /// Number of rows in `table`. Only accepts known table names.
    pub fn count_rows(&self, table: &str) -> Result<i64, AppError> {
        if table != tables::USERS && !tables::OWNED.contains(&table) {
            return Err(AppError::BadRequest(format!("Unknown table: {}", table)));
        }
        let conn = self.conn()?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .map_err(db_error)
    }

    // ─── Users ───────────────────────────────────────────────────────────

    /// Insert a user. Fails with `Conflict` if the username or email is taken.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, email, password_hash, now.to_rfc3339()],
        )
        .map_err(|e| conflict_or(e, "Username or email already exists"))?;

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?1",
            [id],
            user_from_row,
        )
        .optional()
        .map_err(db_error)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?1",
            [username],
            user_from_row,
        )
        .optional()
        .map_err(db_error)
    }

    /// Delete a user and, through the foreign keys, every record it owns.
    /// Returns false if the user did not exist.
    pub fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM users WHERE id = ?1", [id])
            .map_err(db_error)?;
        Ok(deleted > 0)
    }

    // ─── Saved articles ──────────────────────────────────────────────────

    pub fn list_articles(&self, user_id: i64) -> Result<Vec<SavedArticle>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, title, description, url, image_url, source, published_at, saved_at
                 FROM saved_articles WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([user_id], article_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    pub fn save_article(
        &self,
        user_id: i64,
        article: &NewArticle,
    ) -> Result<SavedArticle, AppError> {
        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO saved_articles
                (user_id, title, description, url, image_url, source, published_at, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                article.title,
                article.description,
                article.url,
                article.image_url,
                article.source,
                article.published_at,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| conflict_or(e, "Article already saved"))?;

        Ok(SavedArticle {
            id: conn.last_insert_rowid(),
            user_id,
            title: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            image_url: article.image_url.clone(),
            source: article.source.clone(),
            published_at: article.published_at.clone(),
            saved_at: now,
        })
    }

    pub fn delete_article(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        self.delete_owned(tables::SAVED_ARTICLES, user_id, id)
    }

    // ─── Crypto holdings ─────────────────────────────────────────────────

    pub fn list_holdings(&self, user_id: i64) -> Result<Vec<CryptoHolding>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, coin_id, coin_name, symbol, amount, purchase_price,
                        purchase_date, added_at, updated_at
                 FROM crypto_holdings WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([user_id], holding_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    /// Add a holding. One holding per coin per user.
    pub fn add_holding(
        &self,
        user_id: i64,
        holding: &NewHolding,
    ) -> Result<CryptoHolding, AppError> {
        let now = Utc::now();
        let symbol = holding.symbol.to_uppercase();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO crypto_holdings
                (user_id, coin_id, coin_name, symbol, amount, purchase_price, purchase_date,
                 added_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                user_id,
                holding.coin_id,
                holding.coin_name,
                symbol,
                holding.amount,
                holding.purchase_price,
                holding.purchase_date.map(|d| d.to_rfc3339()),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| conflict_or(e, "Holding for this coin already exists"))?;

        Ok(CryptoHolding {
            id: conn.last_insert_rowid(),
            user_id,
            coin_id: holding.coin_id.clone(),
            coin_name: holding.coin_name.clone(),
            symbol,
            amount: holding.amount,
            purchase_price: holding.purchase_price,
            purchase_date: holding.purchase_date,
            added_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Returns `None` if the holding does not exist
    /// or belongs to another user.
    pub fn update_holding(
        &self,
        user_id: i64,
        id: i64,
        update: &HoldingUpdate,
    ) -> Result<Option<CryptoHolding>, AppError> {
        let conn = self.conn()?;
        let current = conn
            .query_row(
                "SELECT id, user_id, coin_id, coin_name, symbol, amount, purchase_price,
                        purchase_date, added_at, updated_at
                 FROM crypto_holdings WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                holding_from_row,
            )
            .optional()
            .map_err(db_error)?;
        let Some(mut holding) = current else {
            return Ok(None);
        };

        if let Some(amount) = update.amount {
            holding.amount = amount;
        }
        if let Some(price) = update.purchase_price {
            holding.purchase_price = Some(price);
        }
        if let Some(date) = update.purchase_date {
            holding.purchase_date = Some(date);
        }
        holding.updated_at = Utc::now();

        conn.execute(
            "UPDATE crypto_holdings
             SET amount = ?1, purchase_price = ?2, purchase_date = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                holding.amount,
                holding.purchase_price,
                holding.purchase_date.map(|d| d.to_rfc3339()),
                holding.updated_at.to_rfc3339(),
                holding.id,
            ],
        )
        .map_err(db_error)?;

        Ok(Some(holding))
    }

    pub fn delete_holding(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        self.delete_owned(tables::CRYPTO_HOLDINGS, user_id, id)
    }

    // ─── Price alerts ────────────────────────────────────────────────────

    pub fn list_alerts(&self, user_id: i64) -> Result<Vec<PriceAlert>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, coin_id, target_price, condition, is_active, created_at,
                        triggered_at
                 FROM price_alerts WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([user_id], alert_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    pub fn create_alert(&self, user_id: i64, alert: &NewAlert) -> Result<PriceAlert, AppError> {
        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO price_alerts (user_id, coin_id, target_price, condition, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![
                user_id,
                alert.coin_id,
                alert.target_price,
                alert.condition.as_str(),
                now.to_rfc3339(),
            ],
        )
        .map_err(db_error)?;

        Ok(PriceAlert {
            id: conn.last_insert_rowid(),
            user_id,
            coin_id: alert.coin_id.clone(),
            target_price: alert.target_price,
            condition: alert.condition,
            is_active: true,
            created_at: now,
            triggered_at: None,
        })
    }

    /// Deactivate an alert and record when it fired.
    pub fn mark_alert_triggered(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE price_alerts SET is_active = 0, triggered_at = ?1
                 WHERE id = ?2 AND is_active = 1",
                params![at.to_rfc3339(), id],
            )
            .map_err(db_error)?;
        Ok(updated > 0)
    }

    pub fn delete_alert(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        self.delete_owned(tables::PRICE_ALERTS, user_id, id)
    }

    // ─── Weather favorites ───────────────────────────────────────────────

    pub fn list_favorites(&self, user_id: i64) -> Result<Vec<WeatherFavorite>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, city_name, country, latitude, longitude, added_at
                 FROM weather_favorites WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([user_id], favorite_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    pub fn add_favorite(
        &self,
        user_id: i64,
        favorite: &NewFavorite,
    ) -> Result<WeatherFavorite, AppError> {
        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO weather_favorites
                (user_id, city_name, country, latitude, longitude, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                favorite.city_name,
                favorite.country,
                favorite.latitude,
                favorite.longitude,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| conflict_or(e, "City already in favorites"))?;

        Ok(WeatherFavorite {
            id: conn.last_insert_rowid(),
            user_id,
            city_name: favorite.city_name.clone(),
            country: favorite.country.clone(),
            latitude: favorite.latitude,
            longitude: favorite.longitude,
            added_at: now,
        })
    }

    pub fn delete_favorite(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        self.delete_owned(tables::WEATHER_FAVORITES, user_id, id)
    }

    // ─── Starred repositories ────────────────────────────────────────────

    pub fn list_starred_repos(&self, user_id: i64) -> Result<Vec<StarredRepo>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, repo_full_name, repo_name, owner, description, language,
                        stars, forks, url, starred_at
                 FROM starred_repos WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([user_id], repo_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    pub fn star_repo(&self, user_id: i64, repo: &NewStarredRepo) -> Result<StarredRepo, AppError> {
        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO starred_repos
                (user_id, repo_full_name, repo_name, owner, description, language, stars, forks,
                 url, starred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user_id,
                repo.repo_full_name,
                repo.repo_name,
                repo.owner,
                repo.description,
                repo.language,
                repo.stars,
                repo.forks,
                repo.url,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| conflict_or(e, "Repository already starred"))?;

        Ok(StarredRepo {
            id: conn.last_insert_rowid(),
            user_id,
            repo_full_name: repo.repo_full_name.clone(),
            repo_name: repo.repo_name.clone(),
            owner: repo.owner.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            stars: repo.stars,
            forks: repo.forks,
            url: repo.url.clone(),
            starred_at: now,
        })
    }

    pub fn delete_starred_repo(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        self.delete_owned(tables::STARRED_REPOS, user_id, id)
    }

    /// Delete one owned row, scoped to its owner so users cannot delete each
    /// other's records.
    fn delete_owned(&self, table: &str, user_id: i64, id: i64) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", table),
                params![id, user_id],
            )
            .map_err(db_error)?;
        Ok(deleted > 0)
    }
}

fn db_error(e: rusqlite::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
fn conflict_or(e: rusqlite::Error, message: &str) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::Conflict(message.to_string())
        }
        _ => db_error(e),
    }
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    parse_timestamp(idx, &value)
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(idx)?;
    value.map(|v| parse_timestamp(idx, &v)).transpose()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: timestamp(row, 4)?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<SavedArticle> {
    Ok(SavedArticle {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        url: row.get(4)?,
        image_url: row.get(5)?,
        source: row.get(6)?,
        published_at: row.get(7)?,
        saved_at: timestamp(row, 8)?,
    })
}

fn holding_from_row(row: &Row<'_>) -> rusqlite::Result<CryptoHolding> {
    Ok(CryptoHolding {
        id: row.get(0)?,
        user_id: row.get(1)?,
        coin_id: row.get(2)?,
        coin_name: row.get(3)?,
        symbol: row.get(4)?,
        amount: row.get(5)?,
        purchase_price: row.get(6)?,
        purchase_date: optional_timestamp(row, 7)?,
        added_at: timestamp(row, 8)?,
        updated_at: timestamp(row, 9)?,
    })
}

fn alert_from_row(row: &Row<'_>) -> rusqlite::Result<PriceAlert> {
    let condition: String = row.get(4)?;
    let condition = condition.parse::<AlertCondition>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
    })?;

    Ok(PriceAlert {
        id: row.get(0)?,
        user_id: row.get(1)?,
        coin_id: row.get(2)?,
        target_price: row.get(3)?,
        condition,
        is_active: row.get(5)?,
        created_at: timestamp(row, 6)?,
        triggered_at: optional_timestamp(row, 7)?,
    })
}

fn favorite_from_row(row: &Row<'_>) -> rusqlite::Result<WeatherFavorite> {
    Ok(WeatherFavorite {
        id: row.get(0)?,
        user_id: row.get(1)?,
        city_name: row.get(2)?,
        country: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        added_at: timestamp(row, 6)?,
    })
}

fn repo_from_row(row: &Row<'_>) -> rusqlite::Result<StarredRepo> {
    Ok(StarredRepo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        repo_full_name: row.get(2)?,
        repo_name: row.get(3)?,
        owner: row.get(4)?,
        description: row.get(5)?,
        language: row.get(6)?,
        stars: row.get(7)?,
        forks: row.get(8)?,
        url: row.get(9)?,
        starred_at: timestamp(row, 10)?,
    })
}
