// SPDX-License-Identifier: MPL-2.0
//! Fixed offline dataset shown when the notification service is unreachable.

use chrono::{DateTime, Duration, Utc};

use super::model::{Notification, NotificationId, NotificationKind};

/// Builds the fallback list with timestamps relative to `now`.
///
/// Two entries are unread and two are read; the list is already in
/// presentation order.
#[must_use]
pub fn dataset(now: DateTime<Utc>) -> Vec<Notification> {
    let entry = |id: i64,
                 minutes_ago: i64,
                 kind: NotificationKind,
                 read: bool,
                 title: &str,
                 message: &str| Notification {
        id: NotificationId(id),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        read,
        created_at: now - Duration::minutes(minutes_ago),
    };

    vec![
        entry(
            1,
            5,
            NotificationKind::Success,
            false,
            "New student registered",
            "Ana González Rivera has been registered in the system",
        ),
        entry(
            2,
            15,
            NotificationKind::Info,
            false,
            "Pickup completed",
            "Pablo Martínez Fernández was picked up successfully",
        ),
        entry(
            3,
            30,
            NotificationKind::Warning,
            true,
            "Late arrival",
            "Emma Rodríguez Silva arrived 10 minutes late",
        ),
        entry(
            4,
            60,
            NotificationKind::Warning,
            true,
            "Pending invitation",
            "Carmen López Ruiz has not accepted her invitation yet",
        ),
    ]
}
