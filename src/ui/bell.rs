// SPDX-License-Identifier: MPL-2.0
//! Bell button and its notification dropdown.
//!
//! The bell lives in the header for the whole session. Its panel shows the
//! newest notifications with quick actions and a link to the full inbox.
//! While open, the panel is registered with the overlay [`Registry`] so an
//! outside click or Escape closes it.

use crate::config::BELL_PREVIEW_LIMIT;
use crate::store::{Notification, NotificationId, Store};
use crate::ui::design_tokens::{border, palette, radius, shadow, spacing, typography};
use crate::ui::format;
use crate::ui::layout;
use crate::ui::overlay::{Dropdown, Overlay, Registry};
use crate::ui::toasts::Severity;
use chrono::{DateTime, Utc};
use iced::widget::{button, container, scrollable, text, Column, Container, Row, Stack, Text};
use iced::{alignment::Vertical, Border, Element, Length, Padding, Size, Theme};
use std::rc::Rc;

/// Contextual data needed to render the bell.
pub struct ViewContext<'a> {
    pub store: &'a Store,
    pub open: bool,
    pub now: DateTime<Utc>,
}

/// Messages emitted by the bell.
#[derive(Debug, Clone)]
pub enum Message {
    Toggle,
    Close,
    MarkRead(NotificationId),
    Delete(NotificationId),
    MarkAllRead,
    Refresh,
    ViewAll,
}

/// Events propagated to the parent application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    None,
    MarkRead(NotificationId),
    Delete(NotificationId),
    MarkAllRead,
    Refresh,
    OpenInbox,
}

/// Bell dropdown state.
#[derive(Debug)]
pub struct Bell {
    dropdown: Rc<Dropdown>,
    registry: Registry,
}

impl Bell {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            dropdown: Dropdown::new("bell"),
            registry,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.dropdown.is_open()
    }

    /// Recomputes hit regions for the current window size.
    pub fn layout(&self, window: Size) {
        self.dropdown
            .set_regions([layout::bell_trigger(window), layout::bell_panel(window)]);
    }

    pub fn close(&self) {
        if self.is_open() {
            self.dropdown.close();
        }
    }

    /// Process a bell message and return the corresponding event.
    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::Toggle => {
                self.dropdown.toggle(&self.registry);
                Event::None
            }
            Message::Close => {
                self.close();
                Event::None
            }
            Message::MarkRead(id) => Event::MarkRead(id),
            Message::Delete(id) => Event::Delete(id),
            Message::MarkAllRead => Event::MarkAllRead,
            Message::Refresh => Event::Refresh,
            Message::ViewAll => {
                self.close();
                Event::OpenInbox
            }
        }
    }

    #[must_use]
    pub fn view_context<'a>(&self, store: &'a Store, now: DateTime<Utc>) -> ViewContext<'a> {
        ViewContext {
            store,
            open: self.is_open(),
            now,
        }
    }
}

/// Bell button with its unread badge.
pub fn trigger<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let mut content = Stack::new()
        .width(Length::Fixed(layout::BELL_TRIGGER_SIZE))
        .height(Length::Fixed(layout::BELL_TRIGGER_SIZE))
        .push(
            Container::new(Text::new("🔔").size(typography::TITLE_SM))
                .center(Length::Fill),
        );

    if let Some(label) = format::badge_label(unread_usize(ctx.store.unread_count())) {
        let badge = Container::new(Text::new(label).size(typography::CAPTION))
            .padding([0.0, spacing::XXS])
            .style(|_theme: &Theme| container::Style {
                background: Some(palette::ERROR_500.into()),
                text_color: Some(palette::WHITE),
                border: Border {
                    radius: radius::FULL.into(),
                    ..Default::default()
                },
                ..Default::default()
            });
        content = content.push(
            Container::new(badge)
                .width(Length::Fill)
                .align_right(Length::Fill),
        );
    }

    let selected = ctx.open;
    button(content)
        .on_press(Message::Toggle)
        .padding(0.0)
        .style(move |theme: &Theme, status| trigger_style(theme, status, selected))
        .into()
}

/// Dropdown panel, positioned under the header. Empty when closed.
pub fn panel<'a>(ctx: &ViewContext<'a>) -> Option<Element<'a, Message>> {
    if !ctx.open {
        return None;
    }

    let store = ctx.store;
    let refresh_label = if store.is_loading() { "Loading…" } else { "Refresh" };
    let refresh = button(Text::new(refresh_label).size(typography::BODY_SM))
        .padding([spacing::XXS, spacing::XS])
        .style(button::text);
    let refresh = if store.is_loading() {
        refresh
    } else {
        refresh.on_press(Message::Refresh)
    };

    let header = Row::new()
        .align_y(Vertical::Center)
        .spacing(spacing::XS)
        .push(Text::new("Notifications").size(typography::BODY_LG).width(Length::Fill))
        .push(refresh);

    let mut column = Column::new().spacing(spacing::XS).push(header);

    if store.is_fallback() {
        column = column.push(
            Text::new("Offline, showing sample notifications")
                .size(typography::CAPTION)
                .style(|_theme: &Theme| text::Style {
                    color: Some(palette::WARNING_500),
                }),
        );
    }

    let preview = preview(store.notifications());
    if preview.is_empty() {
        let empty = if store.is_loading() {
            "Loading…"
        } else {
            "No notifications"
        };
        column = column.push(
            Container::new(Text::new(empty).size(typography::BODY))
                .padding(spacing::LG)
                .center_x(Length::Fill),
        );
    } else {
        let rows = preview.iter().fold(Column::new().spacing(spacing::XXS), |rows, n| {
            rows.push(row(n, store.is_pending(n.id), ctx.now))
        });
        column = column.push(scrollable(rows).height(Length::Shrink));
    }

    let mut footer = Row::new().spacing(spacing::XS).align_y(Vertical::Center);
    if store.unread_count() > 0 {
        footer = footer.push(
            button(Text::new("Mark all as read").size(typography::BODY_SM))
                .on_press(Message::MarkAllRead)
                .style(button::text),
        );
    }
    footer = footer.push(Container::new(Text::new("")).width(Length::Fill)).push(
        button(Text::new("View all").size(typography::BODY_SM))
            .on_press(Message::ViewAll)
            .style(button::text),
    );
    column = column.push(footer);

    let panel = Container::new(column)
        .width(Length::Fixed(layout::BELL_PANEL_WIDTH))
        .max_height(layout::BELL_PANEL_MAX_HEIGHT)
        .padding(spacing::SM)
        .style(panel_style);

    Some(
        Container::new(panel)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_right(Length::Fill)
            .padding(Padding {
                top: layout::HEADER_HEIGHT,
                right: spacing::MD,
                ..Padding::ZERO
            })
            .into(),
    )
}

/// The notifications shown in the panel, newest first.
#[must_use]
pub fn preview(notifications: &[Notification]) -> &[Notification] {
    &notifications[..notifications.len().min(BELL_PREVIEW_LIMIT)]
}

fn row<'a>(notification: &'a Notification, pending: bool, now: DateTime<Utc>) -> Element<'a, Message> {
    let accent = Severity::from(notification.kind).color();
    let dot = Text::new("●").size(typography::CAPTION).style(move |_theme: &Theme| text::Style {
        color: Some(if notification.read { palette::GRAY_200 } else { accent }),
    });

    let body = Column::new()
        .spacing(2.0)
        .width(Length::Fill)
        .push(Text::new(notification.title.as_str()).size(typography::BODY))
        .push(Text::new(notification.message.as_str()).size(typography::BODY_SM))
        .push(
            Text::new(notification.time_ago(now))
                .size(typography::CAPTION)
                .style(|_theme: &Theme| text::Style {
                    color: Some(palette::GRAY_400),
                }),
        );

    let mut actions = Column::new().spacing(2.0);
    if !notification.read {
        let mark = button(Text::new("✓").size(typography::BODY_SM))
            .padding(spacing::XXS)
            .style(button::text);
        actions = actions.push(if pending {
            mark
        } else {
            mark.on_press(Message::MarkRead(notification.id))
        });
    }
    let delete = button(Text::new("×").size(typography::BODY_SM))
        .padding(spacing::XXS)
        .style(button::text);
    actions = actions.push(if pending {
        delete
    } else {
        delete.on_press(Message::Delete(notification.id))
    });

    Row::new()
        .spacing(spacing::XS)
        .align_y(Vertical::Center)
        .padding(spacing::XXS)
        .push(dot)
        .push(body)
        .push(actions)
        .into()
}

fn unread_usize(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

fn trigger_style(theme: &Theme, status: button::Status, selected: bool) -> button::Style {
    let palette = theme.extended_palette();
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Some(palette.background.strong.color.into()),
        _ if selected => Some(palette.background.weak.color.into()),
        _ => None,
    };
    button::Style {
        background,
        text_color: palette.background.base.text,
        border: Border {
            radius: radius::MD.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn panel_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.base.color.into()),
        border: Border {
            radius: radius::MD.into(),
            width: border::WIDTH_SM,
            color: palette.background.strong.color,
        },
        shadow: shadow::MD,
        text_color: Some(palette.background.base.text),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fallback;
    use iced::keyboard::{key::Named, Key};
    use iced::Point;

    fn window() -> Size {
        Size::new(1200.0, 800.0)
    }

    fn bell(registry: &Registry) -> Bell {
        let bell = Bell::new(registry.clone());
        bell.layout(window());
        bell
    }

    #[test]
    fn toggle_registers_with_the_registry() {
        let registry = Registry::new();
        let mut bell = bell(&registry);

        assert_eq!(bell.update(Message::Toggle), Event::None);
        assert!(bell.is_open());
        assert_eq!(registry.ids(), vec!["bell".to_string()]);

        bell.update(Message::Toggle);
        assert!(!bell.is_open());
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn outside_click_closes_on_next_frame() {
        let registry = Registry::new();
        let mut bell = bell(&registry);
        bell.update(Message::Toggle);

        let inside = layout::bell_panel(window()).center();
        registry.pointer_down(inside);
        registry.run_deferred();
        assert!(bell.is_open());

        registry.pointer_down(Point::new(10.0, 400.0));
        assert!(bell.is_open());
        registry.run_deferred();
        assert!(!bell.is_open());
        assert!(!registry.is_listening());
    }

    #[test]
    fn escape_closes_the_panel() {
        let registry = Registry::new();
        let mut bell = bell(&registry);
        bell.update(Message::Toggle);
        registry.key_down(&Key::Named(Named::Escape));
        assert!(!bell.is_open());
    }

    #[test]
    fn view_all_closes_and_opens_inbox() {
        let registry = Registry::new();
        let mut bell = bell(&registry);
        bell.update(Message::Toggle);
        assert_eq!(bell.update(Message::ViewAll), Event::OpenInbox);
        assert!(!bell.is_open());
        assert!(registry.is_empty());
    }

    #[test]
    fn actions_keep_the_panel_open() {
        let registry = Registry::new();
        let mut bell = bell(&registry);
        bell.update(Message::Toggle);
        let id = NotificationId(1);
        assert_eq!(bell.update(Message::MarkRead(id)), Event::MarkRead(id));
        assert_eq!(bell.update(Message::Delete(id)), Event::Delete(id));
        assert_eq!(bell.update(Message::MarkAllRead), Event::MarkAllRead);
        assert!(bell.is_open());
    }

    #[test]
    fn dropping_the_bell_unregisters_it() {
        let registry = Registry::new();
        let mut bell = bell(&registry);
        bell.update(Message::Toggle);
        drop(bell);
        assert!(registry.is_empty());
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn preview_is_capped() {
        let mut list = fallback::dataset(Utc::now());
        list.extend(fallback::dataset(Utc::now()));
        assert_eq!(preview(&list).len(), BELL_PREVIEW_LIMIT);
        assert_eq!(preview(&list[..2]).len(), 2);
    }

    #[test]
    fn views_render() {
        let store = Store::default();
        let registry = Registry::new();
        let mut bell = bell(&registry);
        let _closed = trigger(&bell.view_context(&store, Utc::now()));
        assert!(panel(&bell.view_context(&store, Utc::now())).is_none());

        bell.update(Message::Toggle);
        let ctx = bell.view_context(&store, Utc::now());
        let _trigger = trigger(&ctx);
        assert!(panel(&ctx).is_some());
    }
}
