// SPDX-License-Identifier: MPL-2.0
//! Inbox filtering criteria.
//!
//! Filtering never reorders: the result keeps the store's newest-first order.

use crate::store::{Notification, NotificationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-state filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl ReadFilter {
    pub const ALL: [ReadFilter; 3] = [ReadFilter::All, ReadFilter::Unread, ReadFilter::Read];

    #[must_use]
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            ReadFilter::All => true,
            ReadFilter::Unread => !notification.read,
            ReadFilter::Read => notification.read,
        }
    }
}

impl fmt::Display for ReadFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadFilter::All => "All",
            ReadFilter::Unread => "Unread",
            ReadFilter::Read => "Read",
        })
    }
}

/// Notification-type filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KindFilter {
    #[default]
    All,
    Info,
    Success,
    Warning,
    Error,
}

impl KindFilter {
    pub const ALL: [KindFilter; 5] = [
        KindFilter::All,
        KindFilter::Info,
        KindFilter::Success,
        KindFilter::Warning,
        KindFilter::Error,
    ];

    #[must_use]
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Info => notification.kind == NotificationKind::Info,
            KindFilter::Success => notification.kind == NotificationKind::Success,
            KindFilter::Warning => notification.kind == NotificationKind::Warning,
            KindFilter::Error => notification.kind == NotificationKind::Error,
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KindFilter::All => "All types",
            KindFilter::Info => "Information",
            KindFilter::Success => "Success",
            KindFilter::Warning => "Warning",
            KindFilter::Error => "Error",
        })
    }
}

/// Combined inbox filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub read: ReadFilter,
    pub kind: KindFilter,
    /// Case-insensitive substring matched against title and message.
    pub search: String,
}

impl Filter {
    #[must_use]
    pub fn new(read: ReadFilter, kind: KindFilter) -> Self {
        Self {
            read,
            kind,
            search: String::new(),
        }
    }

    #[must_use]
    pub fn matches(&self, notification: &Notification) -> bool {
        if !self.read.matches(notification) || !self.kind.matches(notification) {
            return false;
        }
        let needle = self.search.trim();
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        notification.title.to_lowercase().contains(&needle)
            || notification.message.to_lowercase().contains(&needle)
    }

    /// Returns the matching notifications in their original order.
    pub fn apply<'a>(&self, notifications: &'a [Notification]) -> Vec<&'a Notification> {
        notifications.iter().filter(|n| self.matches(n)).collect()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read != ReadFilter::All || self.kind != KindFilter::All || !self.search.trim().is_empty()
    }
}
