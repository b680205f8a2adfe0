// SPDX-License-Identifier: MPL-2.0
//! Logging and diagnostics.
//!
//! # Architecture
//!
//! - [`init_tracing`]: installs the `tracing` subscriber used for console output
//! - [`EventLog`]: bounded in-memory history of engine events for the debug panel
//! - [`DiagnosticsHandle`]: cloneable producer side of the event log
//! - [`CircularBuffer`]: generic ring buffer backing the log

mod buffer;
mod collector;
mod events;

pub use buffer::CircularBuffer;
pub use collector::{DiagnosticsHandle, EventLog};
pub use events::{DiagnosticEvent, DiagnosticEventKind, MutationOp, MutationOutcome, PhaseLabel};

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `directives`; the crate default applies when neither
/// parses. Calling this twice is harmless.
pub fn init_tracing(directives: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives.unwrap_or(crate::config::DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
