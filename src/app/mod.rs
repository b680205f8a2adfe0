// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration between the notification
//! store, the toast queue and the overlay surfaces.
//!
//! The `App` owns one [`Registry`] created at startup and hands clones of
//! it to every surface. Global pointer and keyboard events only reach the
//! registry while it has open registrations.

mod message;
pub mod paths;
mod screen;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message};
pub use screen::Screen;
pub use update::feedback_toast;

use crate::config::{self, Config};
use crate::diagnostics::EventLog;
use crate::store::{HttpClient, Store};
use crate::ui::bell::Bell;
use crate::ui::filter::Filter;
use crate::ui::inbox::Inbox;
use crate::ui::overlay::Registry;
use crate::ui::toasts::{Chime, Queue, Toast};
use chrono::Utc;
use iced::{window, Element, Point, Size, Subscription, Task, Theme};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Root Iced application state.
pub struct App {
    screen: Screen,
    store: Store,
    toasts: Queue,
    registry: Registry,
    bell: Bell,
    /// Mounted only while the inbox screen is shown.
    inbox: Option<Inbox>,
    api: Option<Arc<HttpClient>>,
    default_filter: Filter,
    event_log: EventLog,
    window_size: Size,
    cursor: Point,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("phase", &self.store.phase())
            .field("overlays", &self.registry.len())
            .finish()
    }
}

pub const WINDOW_DEFAULT_WIDTH: u32 = 1024;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
pub const MIN_WINDOW_WIDTH: u32 = 640;
pub const MIN_WINDOW_HEIGHT: u32 = 480;

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(Size::new(MIN_WINDOW_WIDTH as f32, MIN_WINDOW_HEIGHT as f32)),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced 0.14 requires an Fn boot closure; flags are consumed once.
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl App {
    /// Builds the application from a loaded configuration without touching
    /// the network or the audio device.
    fn with_config(config: &Config, api: Option<Arc<HttpClient>>) -> Self {
        let event_log = EventLog::default();
        let diagnostics = event_log.handle();
        let registry = Registry::new();

        let mut toasts = Queue::new();
        toasts.set_diagnostics(diagnostics.clone());
        toasts.set_sound_enabled(config.sound_enabled());

        Self {
            screen: Screen::default(),
            store: Store::new(config.page_size(), config.poll_interval(), diagnostics),
            toasts,
            bell: Bell::new(registry.clone()),
            registry,
            inbox: None,
            api,
            default_filter: Filter::new(
                config.display.default_filter.unwrap_or_default(),
                config.display.default_kind.unwrap_or_default(),
            ),
            event_log,
            window_size: Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
            cursor: Point::ORIGIN,
        }
    }

    /// Loads settings, connects the client and starts the first fetch.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        paths::init_cli_overrides(flags.config_dir);
        let (mut config, config_warning) = config::load();
        if let Some(base_url) = flags.base_url {
            config.server.base_url = base_url;
        }
        if let Some(token) = flags.token {
            config.server.token = Some(token);
        }

        let api = match HttpClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                tracing::error!(error = %err, "notification client unavailable");
                None
            }
        };

        let mut app = Self::with_config(&config, api);
        app.toasts = std::mem::take(&mut app.toasts).with_sound(Chime);
        app.bell.layout(app.window_size);

        if let Some(warning) = config_warning {
            app.toasts.push(Toast::warning(warning).silent());
        }

        app.store.start_polling(Instant::now());
        let task = update::handle_refresh(&mut app.update_context());
        (app, task)
    }

    fn update_context(&mut self) -> update::UpdateContext<'_> {
        update::UpdateContext {
            screen: &mut self.screen,
            store: &mut self.store,
            toasts: &mut self.toasts,
            registry: &self.registry,
            bell: &mut self.bell,
            inbox: &mut self.inbox,
            api: self.api.as_ref(),
            default_filter: &self.default_filter,
            cursor: self.cursor,
        }
    }

    fn title(&self) -> String {
        match self.store.unread_count() {
            0 => "SchoolBell".to_string(),
            n => format!("({n}) SchoolBell"),
        }
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            subscription::create_window_subscription(),
            subscription::create_overlay_subscription(self.registry.is_listening()),
            subscription::create_frame_subscription(self.registry.has_deferred()),
            subscription::create_tick_subscription(self.store.is_polling(), self.toasts.has_toasts()),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Bell(message) => update::handle_bell_message(&mut self.update_context(), message),
            Message::Inbox(message) => {
                update::handle_inbox_message(&mut self.update_context(), message)
            }
            Message::Toast(message) => {
                update::handle_toast_message(&mut self.update_context(), &message)
            }
            Message::SwitchScreen(target) => {
                update::handle_screen_switch(&mut self.update_context(), target)
            }
            Message::Store(reply) => update::handle_store_reply(&mut self.update_context(), reply),
            Message::Tick(now) => {
                self.event_log.process_pending();
                update::handle_tick(&mut self.update_context(), now)
            }
            Message::Frame(_) => {
                self.registry.run_deferred();
                Task::none()
            }
            Message::CursorMoved(position) => {
                self.cursor = position;
                Task::none()
            }
            Message::PointerPressed => update::handle_pointer_pressed(&mut self.update_context()),
            Message::KeyPressed(key) => update::handle_key_pressed(&mut self.update_context(), &key),
            Message::WindowResized(size) => {
                self.window_size = size;
                self.bell.layout(size);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(view::ViewContext {
            screen: self.screen,
            store: &self.store,
            bell: &self.bell,
            inbox: self.inbox.as_ref(),
            toasts: &self.toasts,
            event_log: &self.event_log,
            now: Utc::now(),
        })
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.store.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::store::{Phase, Reply, Request};
    use crate::ui::{bell, inbox, layout, toasts};
    use iced::keyboard::{key::Named, Key};

    fn app() -> App {
        let mut app = App::with_config(&Config::default(), None);
        app.bell.layout(app.window_size);
        app
    }

    fn go_offline(app: &mut App) {
        let request = app.store.refresh();
        let _ = app.update(Message::Store(Reply::failed(
            request,
            ApiError::Transport("refused".to_string()),
        )));
    }

    fn press_at(app: &mut App, point: Point) {
        let _ = app.update(Message::CursorMoved(point));
        let _ = app.update(Message::PointerPressed);
    }

    #[test]
    fn starts_on_dashboard_without_overlays() {
        let app = app();
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.inbox.is_none());
        assert!(!app.registry.is_listening());
        assert_eq!(app.title(), "SchoolBell");
    }

    #[test]
    fn failed_fetch_falls_back_and_warns() {
        let mut app = app();
        go_offline(&mut app);
        assert_eq!(app.store.phase(), Phase::Fallback);
        assert_eq!(app.store.unread_count(), 2);
        assert_eq!(app.title(), "(2) SchoolBell");

        let toast = app.toasts.visible().next().expect("fallback toast");
        assert_eq!(toast.severity(), toasts::Severity::Warning);
        assert!(!toast.plays_sound());
        assert_eq!(
            toast.action().map(|a| a.command),
            Some(toasts::ToastCommand::RetryFetch)
        );

        // Staying offline does not stack more warnings.
        go_offline(&mut app);
        assert_eq!(app.toasts.visible_count(), 1);
    }

    #[test]
    fn poll_during_pending_mark_read_does_not_announce() {
        let mut app = app();
        let Request::Fetch { generation, .. } = app.store.refresh() else {
            panic!("refresh must fetch");
        };
        let list = crate::store::fallback::dataset(Utc::now());
        let first = list[0].id;
        let _ = app.update(Message::Store(Reply::Fetched {
            generation,
            result: Ok((list, 2)),
        }));
        assert_eq!(app.store.phase(), Phase::Live);

        let Ok(crate::store::Step::Remote(Request::MarkRead { ticket, .. })) =
            app.store.mark_as_read(first)
        else {
            panic!("live mark read goes remote");
        };
        let Some(Request::UnreadCount { generation }) = app.store.begin_unread_poll() else {
            panic!("live store polls the count");
        };
        let _ = app.update(Message::Store(Reply::UnreadCount {
            generation,
            result: Ok(2),
        }));
        let _ = app.update(Message::Store(Reply::Mutated {
            ticket,
            result: Ok(None),
        }));

        assert_eq!(app.store.unread_count(), 1);
        assert_eq!(app.store.phase(), Phase::Live);
        assert_eq!(app.toasts.visible_count(), 0);
    }

    #[test]
    fn unauthorized_fetch_shows_session_expired_only() {
        let mut app = app();
        let request = app.store.refresh();
        let _ = app.update(Message::Store(Reply::failed(request, ApiError::Unauthorized)));
        let titles: Vec<Option<&str>> = app.toasts.visible().map(Toast::title).collect();
        assert_eq!(titles, vec![Some("Session expired")]);
    }

    #[test]
    fn offline_mutations_complete_locally() {
        let mut app = app();
        go_offline(&mut app);
        let first = app.store.notifications()[0].id;

        let _ = app.update(Message::Bell(bell::Message::MarkRead(first)));
        assert_eq!(app.store.unread_count(), 1);

        let _ = app.update(Message::Bell(bell::Message::Delete(first)));
        assert_eq!(app.store.notifications().len(), 3);
        assert!(app
            .toasts
            .visible()
            .any(|t| t.message() == "Notification deleted"));
    }

    #[test]
    fn bell_closes_on_outside_click_after_a_frame() {
        let mut app = app();
        let _ = app.update(Message::Bell(bell::Message::Toggle));
        assert!(app.bell.is_open());
        assert!(app.registry.is_listening());

        press_at(&mut app, Point::new(20.0, 400.0));
        assert!(app.bell.is_open());
        assert!(app.registry.has_deferred());

        let _ = app.update(Message::Frame(Instant::now()));
        assert!(!app.bell.is_open());
        assert!(!app.registry.is_listening());
    }

    #[test]
    fn escape_closes_the_bell() {
        let mut app = app();
        let _ = app.update(Message::Bell(bell::Message::Toggle));
        let _ = app.update(Message::KeyPressed(Key::Named(Named::Escape)));
        assert!(!app.bell.is_open());
    }

    #[test]
    fn view_all_mounts_the_inbox_and_back_unmounts_it() {
        let mut app = app();
        let _ = app.update(Message::Bell(bell::Message::Toggle));
        let _ = app.update(Message::Bell(bell::Message::ViewAll));
        assert_eq!(app.screen, Screen::Inbox);
        assert!(app.inbox.is_some());

        let _ = app.update(Message::Inbox(inbox::Message::ToggleStatusMenu));
        assert_eq!(app.registry.len(), 1);

        let _ = app.update(Message::Inbox(inbox::Message::Back));
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.inbox.is_none());
        assert!(app.registry.is_empty());
    }

    #[test]
    fn opening_the_bell_closes_an_inbox_menu() {
        let mut app = app();
        let _ = app.update(Message::SwitchScreen(Screen::Inbox));
        let _ = app.update(Message::Inbox(inbox::Message::ToggleKindMenu));

        let trigger = layout::bell_trigger(app.window_size).center();
        press_at(&mut app, trigger);
        let _ = app.update(Message::Bell(bell::Message::Toggle));
        let _ = app.update(Message::Frame(Instant::now()));

        let page = app.inbox.as_ref().expect("inbox mounted");
        assert!(!page.is_kind_menu_open());
        assert!(app.bell.is_open());
        assert_eq!(app.registry.ids(), vec!["bell".to_string()]);
    }

    #[test]
    fn toast_action_retries_the_fetch() {
        let mut app = app();
        go_offline(&mut app);
        let id = app.toasts.visible().next().map(Toast::id).expect("toast");

        let _ = app.update(Message::Toast(toasts::Message::Action(id)));
        assert!(!app.toasts.contains(id));
        assert_eq!(app.store.phase(), Phase::Loading);
    }

    #[test]
    fn poll_with_more_unread_announces_and_reloads() {
        let mut app = app();
        let request = app.store.refresh();
        let Request::Fetch { generation, .. } = request else {
            panic!("refresh must fetch");
        };
        let _ = app.update(Message::Store(Reply::Fetched {
            generation,
            result: Ok((Vec::new(), 0)),
        }));
        assert_eq!(app.store.phase(), Phase::Live);

        let Some(Request::UnreadCount { generation }) = app.store.begin_unread_poll() else {
            panic!("live store polls the count");
        };
        let _ = app.update(Message::Store(Reply::UnreadCount {
            generation,
            result: Ok(3),
        }));

        assert!(app
            .toasts
            .visible()
            .any(|t| t.message() == "You have 3 new notifications"));
        assert_eq!(app.store.phase(), Phase::Loading);
    }

    #[test]
    fn view_renders_every_screen() {
        let mut app = app();
        go_offline(&mut app);
        let _ = app.view();
        let _ = app.update(Message::Bell(bell::Message::Toggle));
        let _ = app.view();
        let _ = app.update(Message::SwitchScreen(Screen::Inbox));
        let _ = app.update(Message::Inbox(inbox::Message::ToggleStatusMenu));
        let _ = app.view();
    }
}
