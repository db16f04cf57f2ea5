//! Dashboard notification model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    /// Free-form category such as "info" or "warning"
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of a create request. `type` defaults to "info".
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewNotification {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
