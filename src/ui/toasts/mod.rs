// SPDX-License-Identifier: MPL-2.0
//! Toast queue for transient user feedback.
//!
//! Toasts appear briefly to report the outcome of an action without
//! blocking interaction. They are deduplicated within a short window,
//! expire individually and may play a short audible cue.
//!
//! # Components
//!
//! - [`toast`] - `Toast` struct, `Severity` levels and actions
//! - [`queue`] - `Queue` for dedup, visibility limits and expiry
//! - [`sound`] - `SoundCue` trait with a `cpal` chime
//! - [`view`] - iced rendering of the toast stack
//!
//! # Usage
//!
//! ```
//! use schoolbell::ui::toasts::{Queue, Toast};
//!
//! let mut queue = Queue::new();
//! let id = queue.push(Toast::success("Notification deleted"));
//! assert!(id.is_some());
//!
//! // A second identical toast right away is dropped.
//! assert!(queue.push(Toast::success("Notification deleted")).is_none());
//! ```

pub mod queue;
pub mod sound;
pub mod toast;
pub mod view;

pub use queue::{Message, Queue};
pub use sound::{Chime, Muted, SoundCue};
pub use toast::{Severity, Toast, ToastAction, ToastCommand, ToastId};
