// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crypto portfolio holdings and price alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Units of one coin a user holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoHolding {
    pub id: i64,
    pub user_id: i64,
    /// Provider coin id (e.g., "bitcoin"). Unique per user.
    pub coin_id: String,
    pub coin_name: String,
    /// Ticker, upper case
    pub symbol: String,
    pub amount: f64,
    /// Price paid per unit, in USD
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewHolding {
    #[validate(length(min = 1, max = 50))]
    pub coin_id: String,
    #[validate(length(min = 1, max = 100))]
    pub coin_name: String,
    #[validate(length(min = 1, max = 20))]
    pub symbol: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Partial update of a holding; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HoldingUpdate {
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<DateTime<Utc>>,
}

impl HoldingUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.purchase_price.is_none() && self.purchase_date.is_none()
    }
}

/// Direction of a price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }

    /// Whether `price` satisfies this condition against `target`.
    pub fn is_met(&self, price: f64, target: f64) -> bool {
        match self {
            AlertCondition::Above => price >= target,
            AlertCondition::Below => price <= target,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            other => Err(format!("Unknown alert condition: {other}")),
        }
    }
}

/// A one-shot alert on a coin's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: i64,
    pub user_id: i64,
    pub coin_id: String,
    pub target_price: f64,
    pub condition: AlertCondition,
    /// Cleared when the alert fires
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAlert {
    #[validate(length(min = 1, max = 50))]
    pub coin_id: String,
    #[validate(range(min = 0.0))]
    pub target_price: f64,
    pub condition: AlertCondition,
}
