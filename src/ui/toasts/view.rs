// SPDX-License-Identifier: MPL-2.0
//! Toast rendering.
//!
//! Toasts appear as small cards with a severity-colored border, stacked in
//! the bottom-right corner.

use super::queue::{Message, Queue};
use super::toast::Toast;
use crate::ui::design_tokens::{border, opacity, palette, radius, shadow, sizing, spacing, typography};
use iced::widget::{button, container, text, Column, Container, Row, Text};
use iced::{alignment, Color, Element, Length, Theme};

/// Renders a single toast.
pub fn toast(toast: &Toast) -> Element<'_, Message> {
    let severity = toast.severity();
    let accent_color = severity.color();
    let id = toast.id();

    let glyph = Text::new(severity.glyph())
        .size(typography::TITLE_SM)
        .style(move |_theme: &Theme| text::Style {
            color: Some(accent_color),
        });

    let mut body = Column::new().spacing(spacing::XXS);
    if let Some(title) = toast.title() {
        body = body.push(Text::new(title).size(typography::BODY_LG));
    }
    body = body.push(
        Text::new(toast.message())
            .size(typography::BODY)
            .style(|theme: &Theme| text::Style {
                color: Some(theme.palette().text),
            }),
    );
    if let Some(action) = toast.action() {
        body = body.push(
            button(Text::new(action.label.as_str()).size(typography::BODY_SM))
                .on_press(Message::Action(id))
                .padding([spacing::XXS, spacing::XS])
                .style(move |theme: &Theme, status| action_button_style(theme, status, accent_color)),
        );
    }

    let dismiss_button = button(Text::new("×").size(typography::BODY_LG))
        .on_press(Message::Dismiss(id))
        .padding(spacing::XXS)
        .style(dismiss_button_style);

    // Layout: [glyph] [title + message + action] [dismiss]
    let content = Row::new()
        .spacing(spacing::SM)
        .align_y(alignment::Vertical::Center)
        .push(Container::new(glyph).padding(spacing::XXS))
        .push(
            Container::new(body)
                .width(Length::Fill)
                .align_x(alignment::Horizontal::Left),
        )
        .push(dismiss_button);

    Container::new(content)
        .width(Length::Fixed(sizing::TOAST_WIDTH))
        .padding(spacing::SM)
        .style(move |theme: &Theme| toast_container_style(theme, accent_color))
        .into()
}

/// Renders every visible toast, positioned in the bottom-right corner.
pub fn overlay(queue: &Queue) -> Element<'_, Message> {
    let toasts: Vec<Element<'_, Message>> = queue.visible().map(toast).collect();

    if toasts.is_empty() {
        // Return an empty container that takes no space
        return Container::new(text(""))
            .width(Length::Shrink)
            .height(Length::Shrink)
            .into();
    }

    let column = Column::with_children(toasts)
        .spacing(spacing::XS)
        .align_x(alignment::Horizontal::Right);

    Container::new(column)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .align_y(alignment::Vertical::Bottom)
        .padding(spacing::MD)
        .into()
}

fn toast_container_style(theme: &Theme, accent_color: Color) -> container::Style {
    let bg_color = theme.extended_palette().background.base.color;

    container::Style {
        background: Some(iced::Background::Color(bg_color)),
        border: iced::Border {
            color: accent_color,
            width: border::WIDTH_MD,
            radius: radius::MD.into(),
        },
        shadow: shadow::MD,
        text_color: Some(theme.palette().text),
        ..Default::default()
    }
}

fn action_button_style(theme: &Theme, status: button::Status, accent: Color) -> button::Style {
    let alpha = match status {
        button::Status::Hovered => opacity::OVERLAY_MEDIUM,
        button::Status::Pressed => opacity::OVERLAY_STRONG,
        button::Status::Active | button::Status::Disabled => opacity::OVERLAY_SUBTLE,
    };
    button::Style {
        background: Some(iced::Background::Color(Color { a: alpha, ..accent })),
        text_color: theme.palette().text,
        border: iced::Border {
            radius: radius::SM.into(),
            ..Default::default()
        },
        shadow: shadow::NONE,
        snap: true,
    }
}

fn dismiss_button_style(theme: &Theme, status: button::Status) -> button::Style {
    let base = theme.extended_palette().background.base;
    let hover_alpha = match status {
        button::Status::Hovered => Some(opacity::OVERLAY_SUBTLE),
        button::Status::Pressed => Some(opacity::OVERLAY_MEDIUM),
        button::Status::Active | button::Status::Disabled => None,
    };

    button::Style {
        background: hover_alpha.map(|a| iced::Background::Color(Color { a, ..palette::GRAY_400 })),
        text_color: base.text,
        border: iced::Border {
            radius: radius::SM.into(),
            ..Default::default()
        },
        shadow: shadow::NONE,
        snap: true,
    }
}
