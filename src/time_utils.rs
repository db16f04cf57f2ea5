// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a Unix timestamp as `HH:MM` wall-clock time at a UTC offset.
///
/// Returns an empty string for out-of-range timestamps.
pub fn format_clock(unix_secs: i64, utc_offset_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs.saturating_add(utc_offset_secs), 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_applies_offset() {
        // 2024-01-01T06:30:00Z
        let ts = 1_704_090_600;
        assert_eq!(format_clock(ts, 0), "06:30");
        assert_eq!(format_clock(ts, 3600), "07:30");
        assert_eq!(format_clock(ts, -8 * 3600), "22:30");
    }

    #[test]
    fn test_format_utc_rfc3339_uses_z_suffix() {
        let dt = DateTime::from_timestamp(1_704_090_600, 0).unwrap();
        assert_eq!(format_utc_rfc3339(dt), "2024-01-01T06:30:00Z");
    }
}
