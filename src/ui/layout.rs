// SPDX-License-Identifier: MPL-2.0
//! Fixed window geometry shared by the views and the overlay hit regions.
//!
//! The header, the bell panel and the inbox filter menus are placed at
//! deterministic positions so outside-click detection can work from the
//! window size alone.

use crate::ui::design_tokens::{sizing, spacing};
use iced::{Point, Rectangle, Size};

pub const HEADER_HEIGHT: f32 = 56.0;

pub const BELL_TRIGGER_SIZE: f32 = 40.0;
pub const BELL_PANEL_WIDTH: f32 = 360.0;
pub const BELL_PANEL_MAX_HEIGHT: f32 = 420.0;

pub const FILTER_TRIGGER_WIDTH: f32 = 160.0;
pub const FILTER_TRIGGER_HEIGHT: f32 = sizing::BUTTON_HEIGHT;
pub const MENU_ROW_HEIGHT: f32 = 32.0;
/// Vertical padding inside a filter menu.
pub const MENU_PADDING: f32 = spacing::XXS;

/// Bell button in the header's top-right corner.
#[must_use]
pub fn bell_trigger(window: Size) -> Rectangle {
    let x = (window.width - spacing::MD - BELL_TRIGGER_SIZE).max(0.0);
    let y = (HEADER_HEIGHT - BELL_TRIGGER_SIZE) / 2.0;
    Rectangle::new(
        Point::new(x, y),
        Size::new(BELL_TRIGGER_SIZE, BELL_TRIGGER_SIZE),
    )
}

/// Bell dropdown panel, right-aligned under the header.
#[must_use]
pub fn bell_panel(window: Size) -> Rectangle {
    let width = BELL_PANEL_WIDTH.min(window.width);
    let x = (window.width - spacing::MD - width).max(0.0);
    let height = BELL_PANEL_MAX_HEIGHT.min((window.height - HEADER_HEIGHT).max(0.0));
    Rectangle::new(Point::new(x, HEADER_HEIGHT), Size::new(width, height))
}

/// Inbox toolbar trigger at `slot` (0 = status, 1 = type).
#[must_use]
pub fn filter_trigger(slot: usize) -> Rectangle {
    let x = spacing::MD + slot as f32 * (FILTER_TRIGGER_WIDTH + spacing::XS);
    let y = HEADER_HEIGHT + spacing::MD;
    Rectangle::new(
        Point::new(x, y),
        Size::new(FILTER_TRIGGER_WIDTH, FILTER_TRIGGER_HEIGHT),
    )
}

/// Menu listing `options` entries directly under the trigger at `slot`.
#[must_use]
pub fn filter_menu(slot: usize, options: usize) -> Rectangle {
    let trigger = filter_trigger(slot);
    let height = options as f32 * MENU_ROW_HEIGHT + 2.0 * MENU_PADDING;
    Rectangle::new(
        Point::new(trigger.x, trigger.y + trigger.height),
        Size::new(FILTER_TRIGGER_WIDTH, height),
    )
}
