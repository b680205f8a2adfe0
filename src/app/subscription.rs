// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! Window geometry and the cursor are always tracked so overlay hit tests
//! have current data. Pointer and key presses are only routed while the
//! overlay registry has open registrations, and window frames only while a
//! close is deferred.

use super::Message;
use iced::{event, keyboard, mouse, time, window, Event, Subscription};
use std::time::Duration;

/// Tracks cursor position and window size.
pub fn create_window_subscription() -> Subscription<Message> {
    event::listen_with(|event, _status, _window_id| match event {
        Event::Mouse(mouse::Event::CursorMoved { position }) => {
            Some(Message::CursorMoved(position))
        }
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        Event::Window(window::Event::Opened { size, .. }) => Some(Message::WindowResized(size)),
        _ => None,
    })
}

/// Global pointer-down and key-down listeners of the overlay registry.
pub fn create_overlay_subscription(listening: bool) -> Subscription<Message> {
    if !listening {
        return Subscription::none();
    }
    event::listen_with(route_overlay_event)
}

/// Pointer presses are routed whether or not a widget captured them: a
/// press on another button is still an outside click for an open overlay.
/// Key presses a widget already consumed are not routed, so Escape inside
/// a focused input does not also close the overlays.
fn route_overlay_event(
    event: Event,
    status: event::Status,
    _window_id: window::Id,
) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::ButtonPressed(_)) => Some(Message::PointerPressed),
        Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => route_key(key, status),
        _ => None,
    }
}

fn route_key(key: keyboard::Key, status: event::Status) -> Option<Message> {
    match status {
        event::Status::Ignored => Some(Message::KeyPressed(key)),
        event::Status::Captured => None,
    }
}

/// Runs deferred overlay closes on the next frame.
pub fn create_frame_subscription(has_deferred: bool) -> Subscription<Message> {
    if has_deferred {
        window::frames().map(Message::Frame)
    } else {
        Subscription::none()
    }
}

/// Creates a periodic tick subscription for toast auto-dismiss and the
/// unread-count poll.
pub fn create_tick_subscription(polling: bool, has_toasts: bool) -> Subscription<Message> {
    if polling || has_toasts {
        time::every(Duration::from_millis(100)).map(Message::Tick)
    } else {
        Subscription::none()
    }
}
