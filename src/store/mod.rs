// SPDX-License-Identifier: MPL-2.0
//! Persistent notification store.
//!
//! Mirrors the server's notification list, applies mutations optimistically
//! and reconciles them with the service's answers. When the service cannot
//! be reached the store switches to a fixed offline dataset so the
//! surfaces keep working.
//!
//! # Architecture
//!
//! - [`Store`]: synchronous state machine (phase, cache, pending mutations)
//! - [`mutation`]: reversible apply/rollback transactions over the [`Cache`]
//! - [`api`]: the [`NotificationApi`] port plus [`execute`] to run requests
//! - [`HttpClient`]: `reqwest` adapter for the real service
//! - [`RefreshTimer`]: cancellable unread-count poll schedule

pub mod api;
pub mod fallback;
mod feedback;
mod http;
mod model;
pub mod mutation;
mod refresh;
mod state;

pub use api::{execute, ListQuery, NotificationApi, Reply, Request, Ticket};
pub use feedback::{Feedback, MutationRejected};
pub use http::HttpClient;
pub use model::{
    is_newest_first, sort_newest_first, Notification, NotificationId, NotificationKind,
};
pub use mutation::{Cache, Mutation, Snapshot};
pub use refresh::RefreshTimer;
pub use state::{Phase, Step, Store};
