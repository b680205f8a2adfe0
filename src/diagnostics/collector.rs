// SPDX-License-Identifier: MPL-2.0
//! Event log collecting diagnostic events from the store and toast queue.
//!
//! Producers hold a cheap [`DiagnosticsHandle`]; the app drains pending
//! events into a bounded [`CircularBuffer`] on each UI tick.

use tokio::sync::mpsc::{channel, Receiver, Sender};

use super::buffer::CircularBuffer;
use super::events::{
    DiagnosticEvent, DiagnosticEventKind, MutationOp, MutationOutcome, PhaseLabel,
};

/// Default channel capacity for event buffering.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Handle for sending diagnostic events to the [`EventLog`].
///
/// Sends never block; events are dropped when the channel is full or the
/// log has been dropped.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<DiagnosticEvent>,
}

impl DiagnosticsHandle {
    /// A handle whose events go nowhere. Useful for tests and headless use.
    #[must_use]
    pub fn disconnected() -> Self {
        let (event_tx, _) = channel(1);
        Self { event_tx }
    }

    fn send(&self, kind: DiagnosticEventKind) {
        let _ = self.event_tx.try_send(DiagnosticEvent::new(kind));
    }

    pub fn log_transition(&self, from: PhaseLabel, to: PhaseLabel) {
        tracing::debug!(%from, %to, "store transition");
        self.send(DiagnosticEventKind::StoreTransition { from, to });
    }

    pub fn log_mutation(&self, op: MutationOp, outcome: MutationOutcome) {
        tracing::debug!(%op, ?outcome, "mutation settled");
        self.send(DiagnosticEventKind::Mutation { op, outcome });
    }

    pub fn log_warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.send(DiagnosticEventKind::Warning { message });
    }

    pub fn log_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.send(DiagnosticEventKind::Error { message });
    }
}

/// Bounded in-memory log of recent diagnostic events.
pub struct EventLog {
    buffer: CircularBuffer<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    event_tx: Sender<DiagnosticEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (event_tx, event_rx) = channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            buffer: CircularBuffer::new(capacity),
            event_rx,
            event_tx,
        }
    }

    /// Creates a handle for sending events to this log.
    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// Moves all pending events from the channel into the buffer.
    ///
    /// Call this periodically (e.g., on each UI tick).
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Events in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DiagnosticEvent> {
        self.buffer.iter()
    }

    /// The `n` most recent events, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.iter().rev().take(n)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Serializes the buffered events as pretty JSON.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let events: Vec<&DiagnosticEvent> = self.buffer.iter().collect();
        serde_json::to_string_pretty(&events)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_LOG_CAPACITY)
    }
}
