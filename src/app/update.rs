// SPDX-License-Identifier: MPL-2.0
//! Update logic and message handlers for the application.
//!
//! Store operations are split in two: the handler applies the optimistic
//! change and returns a `Task` running the remote call; the call's
//! [`Reply`] comes back as [`Message::Store`] and settles the store. Every
//! [`Feedback`] the store hands out becomes a toast.

use super::{Message, Screen};
use crate::error::ApiError;
use crate::store::{self, Feedback, HttpClient, MutationRejected, NotificationId, Reply, Request, Step, Store};
use crate::ui::bell::{self, Bell, Event as BellEvent};
use crate::ui::filter::Filter;
use crate::ui::inbox::{self, Event as InboxEvent, Inbox};
use crate::ui::overlay::{Propagation, Registry};
use crate::ui::toasts::{self, Queue, Toast, ToastCommand};
use iced::keyboard::Key;
use iced::{Point, Task};
use std::sync::Arc;
use std::time::Instant;

/// Mutable view of the application state used by the handlers.
pub struct UpdateContext<'a> {
    pub screen: &'a mut Screen,
    pub store: &'a mut Store,
    pub toasts: &'a mut Queue,
    pub registry: &'a Registry,
    pub bell: &'a mut Bell,
    pub inbox: &'a mut Option<Inbox>,
    pub api: Option<&'a Arc<HttpClient>>,
    pub default_filter: &'a Filter,
    pub cursor: Point,
}

/// Sends a store request to the service, or fails it immediately when no
/// client could be built.
pub fn run_request(api: Option<&Arc<HttpClient>>, request: Request) -> Task<Message> {
    match api {
        Some(api) => {
            let api = Arc::clone(api);
            Task::perform(
                async move { store::execute(api.as_ref(), request).await },
                Message::Store,
            )
        }
        None => Task::done(Message::Store(Reply::failed(
            request,
            ApiError::Transport("no notification service configured".to_string()),
        ))),
    }
}

/// Maps a store outcome to the toast shown to the user.
#[must_use]
pub fn feedback_toast(feedback: Feedback) -> Toast {
    match feedback {
        Feedback::Success(message) => Toast::success(message),
        Feedback::Error(message) => Toast::error(message),
        Feedback::FallbackActive => Toast::warning(
            "The notification service is unreachable. Showing sample notifications.",
        )
        .with_title("Offline")
        .with_action("Retry", ToastCommand::RetryFetch)
        .silent(),
        Feedback::SessionExpired => Toast::error("Your session has expired. Please sign in again.")
            .with_title("Session expired")
            .sticky(),
    }
}

fn push_feedback(ctx: &mut UpdateContext<'_>, feedback: Option<Feedback>) {
    if let Some(feedback) = feedback {
        ctx.toasts.push(feedback_toast(feedback));
    }
}

/// Starts a full reload of the notification list.
pub fn handle_refresh(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    let request = ctx.store.refresh();
    run_request(ctx.api, request)
}

fn handle_step(ctx: &mut UpdateContext<'_>, step: Result<Step, MutationRejected>) -> Task<Message> {
    match step {
        Ok(Step::Remote(request)) => run_request(ctx.api, request),
        Ok(Step::Done(feedback)) => {
            push_feedback(ctx, feedback);
            Task::none()
        }
        Err(rejected) => {
            tracing::debug!(%rejected, "mutation ignored");
            Task::none()
        }
    }
}

fn handle_mark_read(ctx: &mut UpdateContext<'_>, id: NotificationId) -> Task<Message> {
    let step = ctx.store.mark_as_read(id);
    handle_step(ctx, step)
}

fn handle_delete(ctx: &mut UpdateContext<'_>, id: NotificationId) -> Task<Message> {
    let step = ctx.store.delete(id);
    handle_step(ctx, step)
}

fn handle_mark_all_read(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    let step = ctx.store.mark_all_as_read();
    handle_step(ctx, step)
}

/// Switches screens, mounting or unmounting the inbox.
pub fn handle_screen_switch(ctx: &mut UpdateContext<'_>, target: Screen) -> Task<Message> {
    if *ctx.screen == target {
        return Task::none();
    }
    ctx.bell.close();
    *ctx.inbox = match target {
        Screen::Inbox => Some(Inbox::new(ctx.registry.clone(), ctx.default_filter.clone())),
        Screen::Dashboard => None,
    };
    *ctx.screen = target;
    Task::none()
}

/// Handles bell dropdown messages.
pub fn handle_bell_message(ctx: &mut UpdateContext<'_>, message: bell::Message) -> Task<Message> {
    match ctx.bell.update(message) {
        BellEvent::None => Task::none(),
        BellEvent::MarkRead(id) => handle_mark_read(ctx, id),
        BellEvent::Delete(id) => handle_delete(ctx, id),
        BellEvent::MarkAllRead => handle_mark_all_read(ctx),
        BellEvent::Refresh => handle_refresh(ctx),
        BellEvent::OpenInbox => handle_screen_switch(ctx, Screen::Inbox),
    }
}

/// Handles inbox page messages.
pub fn handle_inbox_message(ctx: &mut UpdateContext<'_>, message: inbox::Message) -> Task<Message> {
    let Some(page) = ctx.inbox.as_mut() else {
        tracing::debug!(?message, "inbox message without a mounted inbox");
        return Task::none();
    };
    match page.update(message) {
        InboxEvent::None => Task::none(),
        InboxEvent::MarkRead(id) => handle_mark_read(ctx, id),
        InboxEvent::Delete(id) => handle_delete(ctx, id),
        InboxEvent::MarkAllRead => handle_mark_all_read(ctx),
        InboxEvent::Refresh => handle_refresh(ctx),
        InboxEvent::Back => handle_screen_switch(ctx, Screen::Dashboard),
    }
}

/// Handles toast dismissals and action buttons.
pub fn handle_toast_message(ctx: &mut UpdateContext<'_>, message: &toasts::Message) -> Task<Message> {
    let command = match message {
        toasts::Message::Action(id) => ctx
            .toasts
            .get(*id)
            .and_then(Toast::action)
            .map(|action| action.command),
        toasts::Message::Dismiss(_) => None,
    };
    ctx.toasts.handle_message(message);

    match command {
        Some(ToastCommand::RetryFetch) => handle_refresh(ctx),
        Some(ToastCommand::OpenInbox) => handle_screen_switch(ctx, Screen::Inbox),
        None => Task::none(),
    }
}

/// Settles a finished remote call.
///
/// A poll that finds more unread notifications than before announces them.
pub fn handle_store_reply(ctx: &mut UpdateContext<'_>, reply: Reply) -> Task<Message> {
    let before = ctx.store.unread_count();
    let is_poll = matches!(reply, Reply::UnreadCount { .. });

    let feedback = ctx.store.apply_reply(reply);
    push_feedback(ctx, feedback);

    let after = ctx.store.unread_count();
    if is_poll && after > before {
        let fresh = after - before;
        let message = if fresh == 1 {
            "You have a new notification".to_string()
        } else {
            format!("You have {fresh} new notifications")
        };
        ctx.toasts.push(
            Toast::info(message)
                .with_title("Notifications")
                .with_action("Open inbox", ToastCommand::OpenInbox),
        );
        // The list is stale now; reload it so the new entries show up.
        return handle_refresh(ctx);
    }
    Task::none()
}

/// Expires toasts and fires the unread poll when due.
pub fn handle_tick(ctx: &mut UpdateContext<'_>, now: Instant) -> Task<Message> {
    ctx.toasts.tick(now);
    match ctx.store.poll_due(now) {
        Some(request) => run_request(ctx.api, request),
        None => Task::none(),
    }
}

/// Global pointer-down routed to the overlay registry.
pub fn handle_pointer_pressed(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    let scheduled = ctx.registry.pointer_down(ctx.cursor);
    if scheduled > 0 {
        tracing::trace!(scheduled, "overlay closes deferred to next frame");
    }
    Task::none()
}

/// Global key-down routed to the overlay registry.
///
/// Presses a widget captured never get here. The registry's
/// [`Propagation`] is only logged: the shell has no further key bindings
/// for it to stop.
pub fn handle_key_pressed(ctx: &mut UpdateContext<'_>, key: &Key) -> Task<Message> {
    if ctx.registry.key_down(key) == Propagation::Stop {
        tracing::trace!("escape closed open overlays");
    }
    Task::none()
}
