// SPDX-License-Identifier: MPL-2.0
//! Full notification list page.
//!
//! Shows every cached notification with status and type filters, a text
//! search and bulk actions. The two filter menus are overlays: each one
//! registers with the [`Registry`] while open, so opening one closes the
//! other on the next frame and leaving the page unregisters both.

use crate::store::{Notification, NotificationId, Store};
use crate::ui::design_tokens::{border, palette, radius, shadow, spacing, typography};
use crate::ui::filter::{Filter, KindFilter, ReadFilter};
use crate::ui::format;
use crate::ui::layout;
use crate::ui::overlay::{Dropdown, Overlay, Registry};
use crate::ui::toasts::Severity;
use chrono::{DateTime, Utc};
use iced::widget::{button, container, scrollable, text, text_input, Column, Container, Row, Text};
use iced::{alignment::Vertical, Border, Element, Length, Padding, Theme};
use std::rc::Rc;

const STATUS_SLOT: usize = 0;
const KIND_SLOT: usize = 1;

/// Contextual data needed to render the inbox.
pub struct ViewContext<'a> {
    pub store: &'a Store,
    pub filter: &'a Filter,
    pub status_menu_open: bool,
    pub kind_menu_open: bool,
    pub now: DateTime<Utc>,
}

/// Messages emitted by the inbox page.
#[derive(Debug, Clone)]
pub enum Message {
    ToggleStatusMenu,
    ToggleKindMenu,
    SelectStatus(ReadFilter),
    SelectKind(KindFilter),
    SearchChanged(String),
    ClearFilters,
    MarkRead(NotificationId),
    Delete(NotificationId),
    MarkAllRead,
    Refresh,
    Back,
}

/// Events propagated to the parent application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    None,
    MarkRead(NotificationId),
    Delete(NotificationId),
    MarkAllRead,
    Refresh,
    Back,
}

/// Inbox page state. Dropping it closes and unregisters its menus.
#[derive(Debug)]
pub struct Inbox {
    filter: Filter,
    status_menu: Rc<Dropdown>,
    kind_menu: Rc<Dropdown>,
    registry: Registry,
}

impl Inbox {
    #[must_use]
    pub fn new(registry: Registry, filter: Filter) -> Self {
        let status_menu = Dropdown::new("inbox-status");
        status_menu.set_regions([
            layout::filter_trigger(STATUS_SLOT),
            layout::filter_menu(STATUS_SLOT, ReadFilter::ALL.len()),
        ]);
        let kind_menu = Dropdown::new("inbox-type");
        kind_menu.set_regions([
            layout::filter_trigger(KIND_SLOT),
            layout::filter_menu(KIND_SLOT, KindFilter::ALL.len()),
        ]);
        Self {
            filter,
            status_menu,
            kind_menu,
            registry,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub fn is_status_menu_open(&self) -> bool {
        self.status_menu.is_open()
    }

    #[must_use]
    pub fn is_kind_menu_open(&self) -> bool {
        self.kind_menu.is_open()
    }

    /// Notifications passing the current filter, newest first.
    #[must_use]
    pub fn visible<'a>(&self, store: &'a Store) -> Vec<&'a Notification> {
        self.filter.apply(store.notifications())
    }

    /// Process an inbox message and return the corresponding event.
    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::ToggleStatusMenu => {
                self.status_menu.toggle(&self.registry);
                Event::None
            }
            Message::ToggleKindMenu => {
                self.kind_menu.toggle(&self.registry);
                Event::None
            }
            Message::SelectStatus(read) => {
                self.filter.read = read;
                close(&self.status_menu);
                Event::None
            }
            Message::SelectKind(kind) => {
                self.filter.kind = kind;
                close(&self.kind_menu);
                Event::None
            }
            Message::SearchChanged(search) => {
                self.filter.search = search;
                Event::None
            }
            Message::ClearFilters => {
                self.filter = Filter::default();
                Event::None
            }
            Message::MarkRead(id) => Event::MarkRead(id),
            Message::Delete(id) => Event::Delete(id),
            Message::MarkAllRead => Event::MarkAllRead,
            Message::Refresh => Event::Refresh,
            Message::Back => {
                close(&self.status_menu);
                close(&self.kind_menu);
                Event::Back
            }
        }
    }

    #[must_use]
    pub fn view_context<'a>(&'a self, store: &'a Store, now: DateTime<Utc>) -> ViewContext<'a> {
        ViewContext {
            store,
            filter: &self.filter,
            status_menu_open: self.is_status_menu_open(),
            kind_menu_open: self.is_kind_menu_open(),
            now,
        }
    }
}

fn close(dropdown: &Dropdown) {
    if dropdown.is_open() {
        dropdown.close();
    }
}

/// Render the page body below the header.
pub fn view<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let store = ctx.store;
    let visible = ctx.filter.apply(store.notifications());

    let mut content = Column::new()
        .spacing(spacing::SM)
        .padding(spacing::MD)
        .push(toolbar(ctx));

    let unread = store.notifications().iter().filter(|n| !n.read).count();
    let mut summary = Row::new().spacing(spacing::XS).align_y(Vertical::Center).push(
        Text::new(format::inbox_summary(store.notifications().len(), unread))
            .size(typography::BODY_SM)
            .width(Length::Fill),
    );
    if ctx.filter.is_active() {
        summary = summary.push(
            Text::new(format!(
                "Showing {} of {}",
                visible.len(),
                store.notifications().len()
            ))
            .size(typography::BODY_SM),
        );
    }
    content = content.push(summary);

    if store.is_fallback() {
        content = content.push(banner(
            "The notification service is unreachable. Showing sample notifications.",
        ));
    }

    if visible.is_empty() {
        content = content.push(
            Container::new(Text::new(empty_message(ctx)).size(typography::BODY))
                .padding(spacing::XL)
                .center_x(Length::Fill),
        );
    } else {
        let list = visible.into_iter().fold(
            Column::new().spacing(spacing::XS),
            |list, notification| list.push(row(notification, store.is_pending(notification.id), ctx.now)),
        );
        content = content.push(scrollable(list).height(Length::Fill));
    }

    content.into()
}

/// Open filter menu, if any, positioned under its trigger.
pub fn menus<'a>(ctx: &ViewContext<'a>) -> Option<Element<'a, Message>> {
    if ctx.status_menu_open {
        let options = ReadFilter::ALL
            .iter()
            .map(|read| (read.to_string(), *read == ctx.filter.read, Message::SelectStatus(*read)));
        return Some(menu(STATUS_SLOT, options));
    }
    if ctx.kind_menu_open {
        let options = KindFilter::ALL
            .iter()
            .map(|kind| (kind.to_string(), *kind == ctx.filter.kind, Message::SelectKind(*kind)));
        return Some(menu(KIND_SLOT, options));
    }
    None
}

fn toolbar<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let store = ctx.store;
    let status = filter_trigger(
        format!("Status: {}", ctx.filter.read),
        ctx.status_menu_open,
        Message::ToggleStatusMenu,
    );
    let kind = filter_trigger(
        ctx.filter.kind.to_string(),
        ctx.kind_menu_open,
        Message::ToggleKindMenu,
    );

    let search = text_input("Search notifications", &ctx.filter.search)
        .on_input(Message::SearchChanged)
        .padding(spacing::XS)
        .width(Length::Fill);

    let mut row = Row::new()
        .spacing(spacing::XS)
        .align_y(Vertical::Center)
        .push(status)
        .push(kind)
        .push(search);

    if ctx.filter.is_active() {
        row = row.push(button(Text::new("Clear")).on_press(Message::ClearFilters).style(button::text));
    }

    let refresh = button(Text::new(if store.is_loading() { "Loading…" } else { "Refresh" }));
    row = row.push(if store.is_loading() {
        refresh.style(button::secondary)
    } else {
        refresh.on_press(Message::Refresh).style(button::secondary)
    });

    if store.unread_count() > 0 {
        row = row.push(button(Text::new("Mark all as read")).on_press(Message::MarkAllRead));
    }

    row.into()
}

fn filter_trigger<'a>(label: String, open: bool, message: Message) -> Element<'a, Message> {
    let content = Row::new()
        .align_y(Vertical::Center)
        .push(Text::new(label).size(typography::BODY_SM).width(Length::Fill))
        .push(Text::new(if open { "▴" } else { "▾" }).size(typography::BODY_SM));

    button(content)
        .on_press(message)
        .width(Length::Fixed(layout::FILTER_TRIGGER_WIDTH))
        .height(Length::Fixed(layout::FILTER_TRIGGER_HEIGHT))
        .padding([spacing::XS, spacing::SM])
        .style(button::secondary)
        .into()
}

fn menu<'a>(
    slot: usize,
    options: impl Iterator<Item = (String, bool, Message)>,
) -> Element<'a, Message> {
    let items = options.fold(Column::new(), |column, (label, selected, message)| {
        column.push(
            button(Text::new(label).size(typography::BODY_SM))
                .on_press(message)
                .width(Length::Fill)
                .height(Length::Fixed(layout::MENU_ROW_HEIGHT))
                .padding([spacing::XXS, spacing::SM])
                .style(move |theme: &Theme, status| menu_item_style(theme, status, selected)),
        )
    });

    let bounds = layout::filter_menu(slot, 0);
    let panel = Container::new(items)
        .width(Length::Fixed(layout::FILTER_TRIGGER_WIDTH))
        .padding([layout::MENU_PADDING, 0.0])
        .style(menu_style);

    Container::new(panel)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(Padding {
            top: bounds.y,
            left: bounds.x,
            ..Padding::ZERO
        })
        .into()
}

fn row<'a>(notification: &'a Notification, pending: bool, now: DateTime<Utc>) -> Element<'a, Message> {
    let accent = Severity::from(notification.kind).color();
    let read = notification.read;

    let title = Row::new()
        .spacing(spacing::XS)
        .align_y(Vertical::Center)
        .push(
            Text::new(notification.title.as_str())
                .size(typography::BODY_LG)
                .width(Length::Fill),
        )
        .push(
            Text::new(notification.time_ago(now))
                .size(typography::CAPTION)
                .style(|_theme: &Theme| text::Style {
                    color: Some(palette::GRAY_400),
                }),
        );

    let body = Column::new()
        .spacing(spacing::XXS)
        .width(Length::Fill)
        .push(title)
        .push(Text::new(notification.message.as_str()).size(typography::BODY))
        .push(
            Text::new(notification.kind.as_str())
                .size(typography::CAPTION)
                .style(move |_theme: &Theme| text::Style { color: Some(accent) }),
        );

    let mut actions = Row::new().spacing(spacing::XXS);
    if !read {
        let mark = button(Text::new("Mark read").size(typography::BODY_SM)).style(button::text);
        actions = actions.push(if pending {
            mark
        } else {
            mark.on_press(Message::MarkRead(notification.id))
        });
    }
    let delete = button(Text::new("Delete").size(typography::BODY_SM)).style(button::danger);
    actions = actions.push(if pending {
        delete
    } else {
        delete.on_press(Message::Delete(notification.id))
    });

    let content = Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .push(body)
        .push(actions);

    Container::new(content)
        .width(Length::Fill)
        .padding(spacing::SM)
        .style(move |theme: &Theme| row_style(theme, accent, read))
        .into()
}

fn banner<'a>(message: &'a str) -> Element<'a, Message> {
    Container::new(Text::new(message).size(typography::BODY_SM))
        .width(Length::Fill)
        .padding(spacing::XS)
        .style(|_theme: &Theme| container::Style {
            background: Some(palette::WARNING_500.scale_alpha(0.15).into()),
            border: Border {
                radius: radius::SM.into(),
                width: border::WIDTH_SM,
                color: palette::WARNING_500,
            },
            ..Default::default()
        })
        .into()
}

fn empty_message(ctx: &ViewContext<'_>) -> &'static str {
    if ctx.store.is_loading() && ctx.store.notifications().is_empty() {
        return "Loading notifications…";
    }
    match ctx.filter.read {
        _ if !ctx.filter.search.trim().is_empty() => "No notifications match your search",
        ReadFilter::Unread => "No unread notifications",
        ReadFilter::Read => "No read notifications",
        ReadFilter::All => "No notifications yet",
    }
}

fn row_style(theme: &Theme, accent: iced::Color, read: bool) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(if read {
            palette.background.base.color.into()
        } else {
            palette.background.weak.color.into()
        }),
        border: Border {
            radius: radius::MD.into(),
            width: if read { border::WIDTH_SM } else { border::WIDTH_MD },
            color: if read { palette.background.strong.color } else { accent },
        },
        ..Default::default()
    }
}

fn menu_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.weak.color.into()),
        border: Border {
            radius: radius::SM.into(),
            width: border::WIDTH_SM,
            color: palette.background.strong.color,
        },
        shadow: shadow::SM,
        ..Default::default()
    }
}

fn menu_item_style(theme: &Theme, status: button::Status, selected: bool) -> button::Style {
    let palette = theme.extended_palette();
    match status {
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(palette.background.strong.color.into()),
            text_color: palette.background.base.text,
            ..Default::default()
        },
        _ if selected => button::Style {
            background: Some(palette.primary.weak.color.into()),
            text_color: palette.primary.weak.text,
            ..Default::default()
        },
        _ => button::Style {
            background: None,
            text_color: palette.background.base.text,
            ..Default::default()
        },
    }
}
