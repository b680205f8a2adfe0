// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types recorded by the notification engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Store lifecycle phase as recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseLabel {
    Init,
    Loading,
    Live,
    Fallback,
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseLabel::Init => "init",
            PhaseLabel::Loading => "loading",
            PhaseLabel::Live => "live",
            PhaseLabel::Fallback => "fallback",
        })
    }
}

/// Remote mutation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOp {
    MarkRead,
    MarkAllRead,
    Delete,
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationOp::MarkRead => "mark_read",
            MutationOp::MarkAllRead => "mark_all_read",
            MutationOp::Delete => "delete",
        })
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Confirmed,
    RolledBack,
    /// Failed, but the optimistic state was kept.
    Kept,
    /// Failed after a newer server snapshot replaced the cache.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    StoreTransition {
        from: PhaseLabel,
        to: PhaseLabel,
    },
    Mutation {
        op: MutationOp,
        outcome: MutationOutcome,
    },
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
}

/// A timestamped diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self { at: Utc::now(), kind }
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.at.format("%H:%M:%S");
        match &self.kind {
            DiagnosticEventKind::StoreTransition { from, to } => {
                write!(f, "{at} store {from} -> {to}")
            }
            DiagnosticEventKind::Mutation { op, outcome } => {
                write!(f, "{at} {op}: {outcome:?}")
            }
            DiagnosticEventKind::Warning { message } => write!(f, "{at} warning: {message}"),
            DiagnosticEventKind::Error { message } => write!(f, "{at} error: {message}"),
        }
    }
}
