// SPDX-License-Identifier: MPL-2.0
//! User-facing outcomes of store operations.
//!
//! The store never talks to the toast queue directly; the app maps each
//! [`Feedback`] to a toast or banner.

use crate::store::NotificationId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
    /// The list now shows the offline dataset.
    FallbackActive,
    /// The server rejected the credentials.
    SessionExpired,
}

impl Feedback {
    pub(crate) fn marked_all(count: u64) -> Self {
        Feedback::Success(format!("Marked {count} notifications as read"))
    }

    pub(crate) fn deleted() -> Self {
        Feedback::Success("Notification deleted".to_string())
    }
}

/// A mutation refused before any state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRejected {
    /// Another mutation on this id has not settled yet.
    Busy(NotificationId),
    /// A mark-all request has not settled yet.
    BulkBusy,
    /// The id is not in the cache.
    NotFound(NotificationId),
}

impl fmt::Display for MutationRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationRejected::Busy(id) => write!(f, "notification {id} has a pending change"),
            MutationRejected::BulkBusy => write!(f, "mark all as read is already pending"),
            MutationRejected::NotFound(id) => write!(f, "notification {id} is not loaded"),
        }
    }
}

impl std::error::Error for MutationRejected {}
