// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::store::Reply;
use crate::ui::{bell, inbox, toasts};
use iced::keyboard::Key;
use iced::{Point, Size};
use std::time::Instant;

use super::Screen;

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    Bell(bell::Message),
    Inbox(inbox::Message),
    Toast(toasts::Message),
    SwitchScreen(Screen),
    /// A remote call finished.
    Store(Reply),
    /// Periodic tick for toast expiry and the unread poll.
    Tick(Instant),
    /// Next window frame; runs deferred overlay closes.
    Frame(Instant),
    CursorMoved(Point),
    /// Any mouse button went down while overlays are listening.
    PointerPressed,
    /// A key went down while overlays are listening.
    KeyPressed(Key),
    WindowResized(Size),
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `SCHOOLBELL_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
    /// Overrides `[server] base_url` for this run.
    pub base_url: Option<String>,
    /// Overrides the bearer token for this run.
    pub token: Option<String>,
}
