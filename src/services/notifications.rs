// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification storage behind an injectable interface.

use crate::models::Notification;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_KIND: &str = "info";

/// Storage for dashboard notifications.
pub trait NotificationStore: Send + Sync {
    /// All notifications, oldest first.
    fn list(&self) -> Vec<Notification>;

    /// Store a new unread notification and return it.
    fn create(&self, message: String, kind: String) -> Notification;

    /// Mark a notification read. `None` if the id is unknown.
    fn mark_read(&self, id: u64) -> Option<Notification>;

    /// Drop every notification and restart ids at 1.
    fn reset(&self);
}

/// Process-local store; contents are lost on restart.
pub struct InMemoryNotificationStore {
    entries: DashMap<u64, Notification>,
    next_id: AtomicU64,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn list(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|n| n.id);
        all
    }

    fn create(&self, message: String, kind: String) -> Notification {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message,
            kind,
            read: false,
            created_at: Utc::now(),
        };
        self.entries.insert(id, notification.clone());
        notification
    }

    fn mark_read(&self, id: u64) -> Option<Notification> {
        let mut entry = self.entries.get_mut(&id)?;
        entry.read = true;
        Some(entry.value().clone())
    }

    fn reset(&self) {
        self.entries.clear();
        self.next_id.store(1, Ordering::Relaxed);
    }
}
