// SPDX-License-Identifier: MPL-2.0
//! The notification store: cache, lifecycle phase and pending mutations.
//!
//! Every remote operation is split in two. A *begin* method applies the
//! optimistic change and hands back a [`Request`]; the matching *finish* or
//! [`Store::settle`] call consumes the result once the request completes.
//! Nothing here performs I/O.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::api::{ListQuery, Reply, Request, Ticket};
use super::feedback::{Feedback, MutationRejected};
use super::fallback;
use super::model::{Notification, NotificationId};
use super::mutation::{self, Cache, Mutation, Snapshot};
use super::refresh::RefreshTimer;
use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_SECS};
use crate::diagnostics::{DiagnosticsHandle, MutationOp, MutationOutcome, PhaseLabel};
use crate::error::ApiError;

/// Store lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Loading,
    Live,
    Fallback,
}

impl Phase {
    fn label(self) -> PhaseLabel {
        match self {
            Phase::Init => PhaseLabel::Init,
            Phase::Loading => PhaseLabel::Loading,
            Phase::Live => PhaseLabel::Live,
            Phase::Fallback => PhaseLabel::Fallback,
        }
    }
}

/// What the caller should do after starting a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run this request and pass the reply back to the store.
    Remote(Request),
    /// Already complete; nothing to send.
    Done(Option<Feedback>),
}

#[derive(Debug)]
struct Pending {
    op: MutationOp,
    id: Option<NotificationId>,
    snapshot: Snapshot,
    cache_generation: u64,
    bulk_epoch: u64,
}

#[derive(Debug)]
pub struct Store {
    cache: Cache,
    phase: Phase,
    using_fallback: bool,
    page_size: u32,
    last_query: ListQuery,
    last_error: Option<ApiError>,
    /// Bumped by every `begin_fetch`; replies from older fetches are ignored.
    fetch_generation: u64,
    /// Bumped whenever the cache is replaced wholesale.
    cache_generation: u64,
    /// Bumped by every mark-all.
    bulk_epoch: u64,
    next_ticket: u64,
    pending: HashMap<Ticket, Pending>,
    in_flight: HashSet<NotificationId>,
    bulk_in_flight: bool,
    timer: RefreshTimer,
    diagnostics: DiagnosticsHandle,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(
            DEFAULT_PAGE_SIZE,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            DiagnosticsHandle::disconnected(),
        )
    }
}

impl Store {
    #[must_use]
    pub fn new(page_size: u32, poll_interval: Duration, diagnostics: DiagnosticsHandle) -> Self {
        Self {
            cache: Cache::default(),
            phase: Phase::Init,
            using_fallback: false,
            page_size,
            last_query: ListQuery {
                limit: page_size,
                ..ListQuery::default()
            },
            last_error: None,
            fetch_generation: 0,
            cache_generation: 0,
            bulk_epoch: 0,
            next_ticket: 0,
            pending: HashMap::new(),
            in_flight: HashSet::new(),
            bulk_in_flight: false,
            timer: RefreshTimer::new(poll_interval),
            diagnostics,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Notifications in newest-first order.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.cache.notifications
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.cache.get(id)
    }

    #[must_use]
    pub fn unread_count(&self) -> u64 {
        self.cache.unread_count
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// True when the list shows the offline dataset.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.using_fallback
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// True while a mutation on `id` awaits its reply.
    #[must_use]
    pub fn is_pending(&self, id: NotificationId) -> bool {
        self.in_flight.contains(&id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn last_query(&self) -> ListQuery {
        self.last_query
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            self.diagnostics.log_transition(self.phase.label(), to.label());
            self.phase = to;
        }
    }

    /// Starts loading a page. Any fetch still in flight is superseded.
    pub fn begin_fetch(&mut self, query: ListQuery) -> Request {
        self.fetch_generation += 1;
        self.last_query = query;
        self.transition(Phase::Loading);
        Request::Fetch {
            generation: self.fetch_generation,
            query,
        }
    }

    /// Reloads the first page with the configured page size.
    pub fn refresh(&mut self) -> Request {
        self.begin_fetch(ListQuery {
            limit: self.page_size,
            offset: 0,
            unread_only: false,
        })
    }

    pub fn finish_fetch(
        &mut self,
        generation: u64,
        result: Result<(Vec<Notification>, u64), ApiError>,
    ) -> Option<Feedback> {
        self.finish_fetch_at(generation, result, Utc::now())
    }

    /// Settles a fetch; `now` anchors the fallback timestamps.
    pub fn finish_fetch_at(
        &mut self,
        generation: u64,
        result: Result<(Vec<Notification>, u64), ApiError>,
        now: DateTime<Utc>,
    ) -> Option<Feedback> {
        if generation != self.fetch_generation {
            tracing::debug!(generation, current = self.fetch_generation, "ignoring stale fetch");
            return None;
        }

        self.cache_generation += 1;
        match result {
            Ok((notifications, unread_count)) => {
                tracing::info!(count = notifications.len(), unread_count, "notifications loaded");
                self.cache = Cache::new(notifications, unread_count);
                self.using_fallback = false;
                self.last_error = None;
                self.transition(Phase::Live);
                None
            }
            Err(err) => {
                self.diagnostics
                    .log_warning(format!("loading notifications failed: {err}"));
                self.cache = Cache::from_list(fallback::dataset(now));
                let entered = !self.using_fallback;
                self.using_fallback = true;
                // Only the switch to offline data is announced.
                let feedback = if err.is_unauthorized() {
                    Some(Feedback::SessionExpired)
                } else {
                    entered.then_some(Feedback::FallbackActive)
                };
                self.last_error = Some(err);
                self.transition(Phase::Fallback);
                feedback
            }
        }
    }

    // =========================================================================
    // Unread-count polling
    // =========================================================================

    /// Starts the lighter count-only refresh.
    ///
    /// Offline, the count is recomputed from the list and no request is made.
    pub fn begin_unread_poll(&mut self) -> Option<Request> {
        match self.phase {
            Phase::Fallback => {
                self.cache.unread_count = self.cache.local_unread();
                None
            }
            Phase::Live => Some(Request::UnreadCount {
                generation: self.cache_generation,
            }),
            Phase::Init | Phase::Loading => None,
        }
    }

    /// Applies a polled unread count.
    ///
    /// While a mutation is unsettled the optimistic count stands: the
    /// server may not have seen the change yet, and the settle adjusts the
    /// count itself.
    pub fn finish_unread_poll(
        &mut self,
        generation: u64,
        result: Result<u64, ApiError>,
    ) -> Option<Feedback> {
        if generation != self.cache_generation || self.using_fallback {
            return None;
        }
        match result {
            Ok(count) if !self.pending.is_empty() => {
                tracing::debug!(
                    count,
                    pending = self.pending.len(),
                    "unread poll ignored while mutations are pending"
                );
                None
            }
            Ok(count) => {
                self.cache.unread_count = count;
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "unread poll failed, counting locally");
                if !self.cache.notifications.is_empty() {
                    self.cache.unread_count = self.cache.local_unread();
                }
                let expired = err.is_unauthorized();
                self.last_error = Some(err);
                expired.then_some(Feedback::SessionExpired)
            }
        }
    }

    pub fn start_polling(&mut self, now: Instant) {
        self.timer.start(now);
    }

    pub fn stop_polling(&mut self) {
        self.timer.cancel();
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.timer.is_running()
    }

    /// Called on every tick; yields a count request when the interval elapsed.
    pub fn poll_due(&mut self, now: Instant) -> Option<Request> {
        if self.timer.take_due(now) {
            self.begin_unread_poll()
        } else {
            None
        }
    }

    // =========================================================================
    // Optimistic mutations
    // =========================================================================

    fn next_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn check_id(&self, id: NotificationId) -> Result<(), MutationRejected> {
        if self.in_flight.contains(&id) {
            return Err(MutationRejected::Busy(id));
        }
        if self.cache.get(id).is_none() {
            return Err(MutationRejected::NotFound(id));
        }
        Ok(())
    }

    fn track(&mut self, op: MutationOp, id: Option<NotificationId>, snapshot: Snapshot) -> Ticket {
        let ticket = self.next_ticket();
        match id {
            Some(id) => {
                self.in_flight.insert(id);
            }
            None => self.bulk_in_flight = true,
        }
        self.pending.insert(
            ticket,
            Pending {
                op,
                id,
                snapshot,
                cache_generation: self.cache_generation,
                bulk_epoch: self.bulk_epoch,
            },
        );
        ticket
    }

    /// Marks one notification read and decrements the unread count.
    pub fn mark_as_read(&mut self, id: NotificationId) -> Result<Step, MutationRejected> {
        self.check_id(id)?;
        let snapshot = mutation::apply(&mut self.cache, &Mutation::MarkRead(id));
        if self.using_fallback {
            return Ok(Step::Done(None));
        }
        let ticket = self.track(MutationOp::MarkRead, Some(id), snapshot);
        Ok(Step::Remote(Request::MarkRead { ticket, id }))
    }

    /// Marks everything read and zeroes the count.
    ///
    /// A failed request is reported but not reverted.
    pub fn mark_all_as_read(&mut self) -> Result<Step, MutationRejected> {
        if self.bulk_in_flight {
            return Err(MutationRejected::BulkBusy);
        }
        self.bulk_epoch += 1;
        let snapshot = mutation::apply(&mut self.cache, &Mutation::MarkAllRead);
        if self.using_fallback {
            return Ok(Step::Done(Some(Feedback::marked_all(
                snapshot.affected() as u64
            ))));
        }
        let ticket = self.track(MutationOp::MarkAllRead, None, snapshot);
        Ok(Step::Remote(Request::MarkAllRead { ticket }))
    }

    /// Removes a notification, adjusting the count if it was unread.
    pub fn delete(&mut self, id: NotificationId) -> Result<Step, MutationRejected> {
        self.check_id(id)?;
        let snapshot = mutation::apply(&mut self.cache, &Mutation::Delete(id));
        if self.using_fallback {
            return Ok(Step::Done(Some(Feedback::deleted())));
        }
        let ticket = self.track(MutationOp::Delete, Some(id), snapshot);
        Ok(Step::Remote(Request::Delete { ticket, id }))
    }

    /// Settles a mutation, rolling back on failure where applicable.
    ///
    /// Rollbacks are skipped once a later fetch replaced the cache: the
    /// newer server snapshot is authoritative.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<Option<u64>, ApiError>,
    ) -> Option<Feedback> {
        let Some(pending) = self.pending.remove(&ticket) else {
            tracing::warn!(?ticket, "reply for unknown mutation");
            return None;
        };
        match pending.id {
            Some(id) => {
                self.in_flight.remove(&id);
            }
            None => self.bulk_in_flight = false,
        }

        let err = match result {
            Ok(updated) => {
                self.diagnostics
                    .log_mutation(pending.op, MutationOutcome::Confirmed);
                return match pending.op {
                    MutationOp::MarkRead => None,
                    MutationOp::MarkAllRead => Some(Feedback::marked_all(
                        updated.unwrap_or(pending.snapshot.affected() as u64),
                    )),
                    MutationOp::Delete => Some(Feedback::deleted()),
                };
            }
            Err(err) => err,
        };

        let superseded = pending.cache_generation != self.cache_generation;
        let bulk_since = pending.bulk_epoch != self.bulk_epoch;
        let outcome = match pending.op {
            MutationOp::MarkAllRead => MutationOutcome::Kept,
            _ if superseded => MutationOutcome::Superseded,
            MutationOp::MarkRead if bulk_since => MutationOutcome::Superseded,
            MutationOp::MarkRead => {
                mutation::rollback(&mut self.cache, pending.snapshot);
                MutationOutcome::RolledBack
            }
            MutationOp::Delete => {
                let mut snapshot = pending.snapshot;
                if bulk_since {
                    // Everything was marked read in the meantime.
                    if let Snapshot::Delete {
                        removed: Some(notification),
                        decremented,
                    } = &mut snapshot
                    {
                        notification.read = true;
                        *decremented = false;
                    }
                }
                mutation::rollback(&mut self.cache, snapshot);
                MutationOutcome::RolledBack
            }
        };
        self.diagnostics.log_mutation(pending.op, outcome);
        self.diagnostics
            .log_error(format!("{} failed: {err}", pending.op));

        let feedback = if err.is_unauthorized() {
            Feedback::SessionExpired
        } else {
            Feedback::Error(
                match pending.op {
                    MutationOp::MarkRead => "Could not mark notification as read",
                    MutationOp::MarkAllRead => "Could not mark all notifications as read",
                    MutationOp::Delete => "Could not delete notification",
                }
                .to_string(),
            )
        };
        self.last_error = Some(err);
        Some(feedback)
    }

    /// Routes any reply to its settle method.
    pub fn apply_reply(&mut self, reply: Reply) -> Option<Feedback> {
        match reply {
            Reply::Fetched { generation, result } => self.finish_fetch(generation, result),
            Reply::UnreadCount { generation, result } => {
                self.finish_unread_poll(generation, result)
            }
            Reply::Mutated { ticket, result } => self.settle(ticket, result),
        }
    }
}
