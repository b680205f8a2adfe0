// SPDX-License-Identifier: MPL-2.0
//! Server-backed notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Server-assigned notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a notification as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    /// Anything the server sends that this client does not know about.
    #[serde(other)]
    General,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::Info,
        NotificationKind::Success,
        NotificationKind::Warning,
        NotificationKind::Error,
        NotificationKind::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::General => "general",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A durable notification mirrored from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Presentation order: newest `created_at` first, ties broken by
    /// descending id so the order is total.
    #[must_use]
    pub fn newest_first(a: &Notification, b: &Notification) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }

    /// Short relative age, e.g. "5 min" or "3 h".
    #[must_use]
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        crate::ui::format::time_ago(self.created_at, now)
    }
}

/// Sorts a list into presentation order in place.
pub fn sort_newest_first(list: &mut [Notification]) {
    list.sort_by(Notification::newest_first);
}

/// Returns whether a list satisfies presentation order.
#[must_use]
pub fn is_newest_first(list: &[Notification]) -> bool {
    list.windows(2)
        .all(|pair| Notification::newest_first(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32, id: i64) -> Notification {
        Notification {
            id: NotificationId(id),
            title: format!("n{id}"),
            message: String::new(),
            kind: NotificationKind::Info,
            read: false,
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn deserializes_server_record() {
        let json = r#"{
            "id": 7,
            "title": "Late arrival",
            "message": "Emma arrived 10 minutes late",
            "type": "warning",
            "read": false,
            "created_at": "2025-03-10T08:15:00Z"
        }"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, NotificationId(7));
        assert_eq!(n.kind, NotificationKind::Warning);
        assert!(!n.read);
    }

    #[test]
    fn unknown_kind_maps_to_general() {
        let json = r#"{"id":1,"title":"t","message":"m","type":"reminder","read":true,
            "created_at":"2025-03-10T08:15:00Z"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::General);
    }

    #[test]
    fn sorting_puts_newest_first_and_breaks_ties_by_id() {
        let mut list = vec![at(1, 1), at(30, 2), at(30, 3), at(10, 4)];
        sort_newest_first(&mut list);
        let ids: Vec<i64> = list.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
        assert!(is_newest_first(&list));
    }

    #[test]
    fn detects_out_of_order_lists() {
        let list = vec![at(1, 1), at(2, 2)];
        assert!(!is_newest_first(&list));
    }
}
