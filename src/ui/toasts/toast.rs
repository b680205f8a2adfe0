// SPDX-License-Identifier: MPL-2.0
//! Core toast data structures.
//!
//! This module defines the `Toast` struct and `Severity` enum used
//! throughout the toast queue.

use crate::config::{
    DEFAULT_TOAST_DURATION_MS, ERROR_TOAST_DURATION_MS, WARNING_TOAST_DURATION_MS,
};
use crate::store::NotificationKind;
use crate::ui::design_tokens::palette;
use iced::Color;
use std::time::Duration;

/// Unique identifier for a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

impl ToastId {
    /// Creates a new unique toast ID.
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ToastId {
    fn default() -> Self {
        Self::new()
    }
}

/// Severity level determines display duration, styling and audible cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
    /// Plain message without a semantic color.
    #[default]
    Neutral,
}

impl Severity {
    /// Returns the primary color for this severity level.
    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Severity::Success => palette::SUCCESS_500,
            Severity::Info => palette::INFO_500,
            Severity::Warning => palette::WARNING_500,
            Severity::Error => palette::ERROR_500,
            Severity::Neutral => palette::GRAY_400,
        }
    }

    /// Default lifetime; errors stay longest.
    #[must_use]
    pub fn default_duration(&self) -> Duration {
        match self {
            Severity::Success | Severity::Info | Severity::Neutral => {
                Duration::from_millis(DEFAULT_TOAST_DURATION_MS)
            }
            Severity::Warning => Duration::from_millis(WARNING_TOAST_DURATION_MS),
            Severity::Error => Duration::from_millis(ERROR_TOAST_DURATION_MS),
        }
    }

    /// Short glyph shown next to the message.
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✕",
            Severity::Warning => "!",
            Severity::Info => "i",
            Severity::Neutral => "•",
        }
    }
}

impl From<NotificationKind> for Severity {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Info => Severity::Info,
            NotificationKind::Success => Severity::Success,
            NotificationKind::Warning => Severity::Warning,
            NotificationKind::Error => Severity::Error,
            NotificationKind::General => Severity::Neutral,
        }
    }
}

/// Follow-up the user can trigger from a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastCommand {
    /// Reload notifications from the server.
    RetryFetch,
    /// Switch to the full inbox.
    OpenInbox,
}

/// Labelled button on a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastAction {
    pub label: String,
    pub command: ToastCommand,
}

/// A transient message shown to the user.
#[derive(Debug, Clone)]
pub struct Toast {
    id: ToastId,
    severity: Severity,
    title: Option<String>,
    message: String,
    /// `None` or zero means the toast stays until dismissed.
    duration: Option<Duration>,
    action: Option<ToastAction>,
    sound: bool,
}

impl Toast {
    /// Creates a toast with the severity's default duration.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: ToastId::new(),
            severity,
            title: None,
            message: message.into(),
            duration: Some(severity.default_duration()),
            action: None,
            sound: true,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn neutral(message: impl Into<String>) -> Self {
        Self::new(Severity::Neutral, message)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the lifetime. `None` or zero makes the toast sticky.
    #[must_use]
    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn sticky(self) -> Self {
        self.with_duration(None)
    }

    #[must_use]
    pub fn with_action(mut self, label: impl Into<String>, command: ToastCommand) -> Self {
        self.action = Some(ToastAction {
            label: label.into(),
            command,
        });
        self
    }

    /// Suppresses the audible cue.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.sound = false;
        self
    }

    #[must_use]
    pub fn id(&self) -> ToastId {
        self.id
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Effective lifetime, `None` when sticky.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration.filter(|d| !d.is_zero())
    }

    #[must_use]
    pub fn action(&self) -> Option<&ToastAction> {
        self.action.as_ref()
    }

    #[must_use]
    pub fn plays_sound(&self) -> bool {
        self.sound
    }
}
