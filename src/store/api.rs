// SPDX-License-Identifier: MPL-2.0
//! Port to the remote notification service.
//!
//! The store describes remote work as a [`Request`]; [`execute`] runs it
//! against any [`NotificationApi`] and packages the outcome as a [`Reply`]
//! that the store consumes. This keeps the store synchronous and lets the
//! app drive requests through `iced::Task`.

use std::future::Future;

use futures_util::future::try_join;

use super::model::{Notification, NotificationId};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ApiError;

/// Paging and filtering for a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    pub unread_only: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            unread_only: false,
        }
    }
}

/// Remote notification service.
///
/// Implementations must be `Send + Sync` so requests can run on the
/// runtime's worker threads.
pub trait NotificationApi: Send + Sync {
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<Vec<Notification>, ApiError>> + Send;

    fn unread_count(&self) -> impl Future<Output = Result<u64, ApiError>> + Send;

    fn mark_read(&self, id: NotificationId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Returns the number of records the server updated.
    fn mark_all_read(&self) -> impl Future<Output = Result<u64, ApiError>> + Send;

    fn delete(&self, id: NotificationId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Identifies a pending optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

/// Remote work requested by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Fetch { generation: u64, query: ListQuery },
    UnreadCount { generation: u64 },
    MarkRead { ticket: Ticket, id: NotificationId },
    MarkAllRead { ticket: Ticket },
    Delete { ticket: Ticket, id: NotificationId },
}

/// Outcome of a [`Request`], handed back to the store.
#[derive(Debug, Clone)]
pub enum Reply {
    Fetched {
        generation: u64,
        result: Result<(Vec<Notification>, u64), ApiError>,
    },
    UnreadCount {
        generation: u64,
        result: Result<u64, ApiError>,
    },
    /// `Ok(Some(n))` carries the server's updated count for mark-all.
    Mutated {
        ticket: Ticket,
        result: Result<Option<u64>, ApiError>,
    },
}

impl Reply {
    /// The reply for a request that could not be sent at all.
    #[must_use]
    pub fn failed(request: Request, err: ApiError) -> Self {
        match request {
            Request::Fetch { generation, .. } => Reply::Fetched {
                generation,
                result: Err(err),
            },
            Request::UnreadCount { generation } => Reply::UnreadCount {
                generation,
                result: Err(err),
            },
            Request::MarkRead { ticket, .. }
            | Request::MarkAllRead { ticket }
            | Request::Delete { ticket, .. } => Reply::Mutated {
                ticket,
                result: Err(err),
            },
        }
    }
}

/// Runs a request against the service.
///
/// A fetch loads the page and the unread count concurrently; either
/// failing fails the whole fetch.
pub async fn execute<A>(api: &A, request: Request) -> Reply
where
    A: NotificationApi + ?Sized,
{
    match request {
        Request::Fetch { generation, query } => Reply::Fetched {
            generation,
            result: try_join(api.list(query), api.unread_count()).await,
        },
        Request::UnreadCount { generation } => Reply::UnreadCount {
            generation,
            result: api.unread_count().await,
        },
        Request::MarkRead { ticket, id } => Reply::Mutated {
            ticket,
            result: api.mark_read(id).await.map(|()| None),
        },
        Request::MarkAllRead { ticket } => Reply::Mutated {
            ticket,
            result: api.mark_all_read().await.map(Some),
        },
        Request::Delete { ticket, id } => Reply::Mutated {
            ticket,
            result: api.delete(id).await.map(|()| None),
        },
    }
}
