// SPDX-License-Identifier: MPL-2.0
//! Human-readable formatting helpers shared by the notification surfaces.

use chrono::{DateTime, Utc};

/// Formats the age of a timestamp relative to `now`.
///
/// Anything under a minute (or in the future) is "just now"; ages of four
/// weeks or more fall back to a calendar date, with the year only when the
/// timestamp is over a year old.
#[must_use]
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} h");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days} d");
    }

    let weeks = days / 7;
    if weeks < 4 {
        return format!("{weeks} wk");
    }

    if days > 365 {
        created_at.format("%d %b %Y").to_string()
    } else {
        created_at.format("%d %b").to_string()
    }
}

/// One-line summary of an inbox, e.g. "12 notifications, 3 unread".
#[must_use]
pub fn inbox_summary(total: usize, unread: usize) -> String {
    match (total, unread) {
        (0, _) => "No notifications".to_string(),
        (total, 0) => format!("{total} notifications, all read"),
        (total, unread) if unread == total => format!("{total} unread notifications"),
        (total, unread) => format!("{total} notifications, {unread} unread"),
    }
}

/// Text for the bell badge; large counts are capped.
#[must_use]
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        1..=99 => Some(unread.to_string()),
        _ => Some("99+".to_string()),
    }
}
