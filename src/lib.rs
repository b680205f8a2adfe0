// SPDX-License-Identifier: MPL-2.0
//! `schoolbell` is the notification client of a school-operations system,
//! built with the Iced GUI framework.
//!
//! It keeps a cache of server-side notifications in sync under optimistic
//! updates, shows transient toasts, and coordinates the dropdowns that share
//! global pointer and keyboard input.
//!
//! # Modules
//!
//! - [`store`] - persistent notification store and remote service port
//! - [`ui`] - toast queue, overlay registry, bell and inbox surfaces
//! - [`app`] - iced application wiring
//! - [`config`] - `settings.toml` loading and saving
//! - [`diagnostics`] - tracing setup and in-memory event log

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod store;
pub mod ui;

pub use error::{ApiError, Error, Result};
