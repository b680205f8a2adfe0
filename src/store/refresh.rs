// SPDX-License-Identifier: MPL-2.0
//! Cancellable periodic timer for the unread-count poll.
//!
//! The timer holds no thread or task; the app's tick subscription asks it
//! whether a poll is due.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arms the timer; the first poll is due one interval from `now`.
    /// Restarting a running timer resets its phase.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Returns true once per elapsed interval and schedules the next one.
    ///
    /// Missed intervals are not replayed: after a long stall the next poll
    /// is one interval from `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }
}
