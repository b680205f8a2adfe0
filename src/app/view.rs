// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! The header with the bell is always shown; the body depends on the
//! screen. Dropdowns and toasts are layered on top in a `Stack`.

use super::{Message, Screen};
use crate::diagnostics::EventLog;
use crate::store::{Phase, Store};
use crate::ui::bell::{self, Bell};
use crate::ui::design_tokens::{palette, radius, spacing, typography};
use crate::ui::format;
use crate::ui::inbox::{self, Inbox};
use crate::ui::layout;
use crate::ui::toasts::{self, Queue};
use chrono::{DateTime, Utc};
use iced::widget::{button, container, text, Column, Container, Row, Stack, Text};
use iced::{alignment::Vertical, Border, Element, Length, Theme};

/// Diagnostic events listed on the dashboard.
const RECENT_ACTIVITY: usize = 6;

/// Context required to render the application view.
pub struct ViewContext<'a> {
    pub screen: Screen,
    pub store: &'a Store,
    pub bell: &'a Bell,
    pub inbox: Option<&'a Inbox>,
    pub toasts: &'a Queue,
    pub event_log: &'a EventLog,
    pub now: DateTime<Utc>,
}

/// Renders the current application view based on the active screen.
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let bell_ctx = ctx.bell.view_context(ctx.store, ctx.now);
    let inbox_ctx = ctx.inbox.map(|page| page.view_context(ctx.store, ctx.now));

    let body: Element<'_, Message> = match (ctx.screen, &inbox_ctx) {
        (Screen::Inbox, Some(inbox_ctx)) => inbox::view(inbox_ctx).map(Message::Inbox),
        _ => view_dashboard(ctx.store, ctx.event_log),
    };

    let base = Column::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(view_header(ctx.screen, &bell_ctx))
        .push(Container::new(body).width(Length::Fill).height(Length::Fill));

    let mut stack = Stack::new().width(Length::Fill).height(Length::Fill).push(base);

    if let Some(menus) = inbox_ctx.as_ref().and_then(inbox::menus) {
        stack = stack.push(menus.map(Message::Inbox));
    }
    if let Some(panel) = bell::panel(&bell_ctx) {
        stack = stack.push(panel.map(Message::Bell));
    }
    stack
        .push(toasts::view::overlay(ctx.toasts).map(Message::Toast))
        .into()
}

fn view_header<'a>(screen: Screen, bell_ctx: &bell::ViewContext<'a>) -> Element<'a, Message> {
    let nav = |label: &'static str, target: Screen| {
        let item = button(Text::new(label).size(typography::BODY)).padding([spacing::XS, spacing::SM]);
        if screen == target {
            item.style(button::primary)
        } else {
            item.on_press(Message::SwitchScreen(target)).style(button::text)
        }
    };

    let row = Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .padding([0.0, spacing::MD])
        .height(Length::Fixed(layout::HEADER_HEIGHT))
        .push(Text::new("SchoolBell").size(typography::TITLE_MD))
        .push(nav("Overview", Screen::Dashboard))
        .push(nav("Inbox", Screen::Inbox))
        .push(Container::new(Text::new("")).width(Length::Fill))
        .push(bell::trigger(bell_ctx).map(Message::Bell));

    Container::new(row)
        .width(Length::Fill)
        .style(|theme: &Theme| container::Style {
            background: Some(theme.extended_palette().background.weak.color.into()),
            ..Default::default()
        })
        .into()
}

fn view_dashboard<'a>(store: &'a Store, event_log: &'a EventLog) -> Element<'a, Message> {
    let unread = store.notifications().iter().filter(|n| !n.read).count();
    let status = match store.phase() {
        Phase::Init | Phase::Loading => ("Connecting to the notification service…", palette::GRAY_400),
        Phase::Live => ("Connected", palette::SUCCESS_500),
        Phase::Fallback => ("Offline, showing sample notifications", palette::WARNING_500),
    };

    let card = Column::new()
        .spacing(spacing::SM)
        .push(Text::new("Overview").size(typography::TITLE_LG))
        .push(
            Text::new(format::inbox_summary(store.notifications().len(), unread))
                .size(typography::BODY_LG),
        )
        .push(Text::new(status.0).size(typography::BODY_SM).style(move |_theme: &Theme| {
            text::Style {
                color: Some(status.1),
            }
        }))
        .push(
            button(Text::new("Open inbox"))
                .on_press(Message::SwitchScreen(Screen::Inbox))
                .padding([spacing::XS, spacing::MD]),
        );

    let content = Column::new()
        .spacing(spacing::LG)
        .push(panel(card.into()))
        .push(panel(view_activity(event_log)));

    Container::new(content)
        .padding(spacing::XL)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn view_activity(event_log: &EventLog) -> Element<'_, Message> {
    let mut list = Column::new()
        .spacing(spacing::XXS)
        .push(Text::new("Recent activity").size(typography::TITLE_SM));

    if event_log.is_empty() {
        list = list.push(
            Text::new("Nothing yet")
                .size(typography::BODY_SM)
                .color(palette::GRAY_400),
        );
    }
    for event in event_log.recent(RECENT_ACTIVITY) {
        list = list.push(Text::new(event.to_string()).size(typography::CAPTION));
    }
    list.into()
}

fn panel(content: Element<'_, Message>) -> Element<'_, Message> {
    Container::new(content)
        .padding(spacing::LG)
        .max_width(480.0)
        .width(Length::Fill)
        .style(|theme: &Theme| container::Style {
            background: Some(theme.extended_palette().background.weak.color.into()),
            border: Border {
                radius: radius::LG.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
}
