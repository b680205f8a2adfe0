// SPDX-License-Identifier: MPL-2.0
//! Toast lifecycle management.
//!
//! The `Queue` handles deduplication, display timing and dismissal of toasts.
//! It limits the number of visible toasts and gives each one its own deadline.

use super::sound::{Muted, SoundCue};
use super::toast::{Severity, Toast, ToastId};
use crate::config::{MAX_VISIBLE_TOASTS, TOAST_DEDUP_WINDOW_MS};
use crate::diagnostics::DiagnosticsHandle;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Messages for toast state changes.
#[derive(Debug, Clone)]
pub enum Message {
    /// Dismiss a specific toast by ID.
    Dismiss(ToastId),
    /// The toast's action button was pressed.
    Action(ToastId),
}

#[derive(Debug)]
struct Entry {
    toast: Toast,
    /// Set when the toast becomes visible; `None` for sticky toasts.
    deadline: Option<Instant>,
}

impl Entry {
    fn shown_at(toast: Toast, now: Instant) -> Self {
        let deadline = toast.duration().map(|d| now + d);
        Self { toast, deadline }
    }
}

/// Manages waiting and visible toasts.
#[derive(Debug)]
pub struct Queue {
    /// Currently visible toasts (newest first).
    visible: VecDeque<Entry>,
    /// Toasts waiting for a visible slot (oldest first).
    waiting: VecDeque<Toast>,
    /// Last acceptance time per `(severity, message)` key.
    recent: HashMap<(Severity, String), Instant>,
    dedup_window: Duration,
    max_visible: usize,
    sound: Box<dyn SoundCue>,
    sound_enabled: bool,
    diagnostics: Option<DiagnosticsHandle>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    /// Creates a silent queue with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: VecDeque::new(),
            waiting: VecDeque::new(),
            recent: HashMap::new(),
            dedup_window: Duration::from_millis(TOAST_DEDUP_WINDOW_MS),
            max_visible: MAX_VISIBLE_TOASTS,
            sound: Box::new(Muted),
            sound_enabled: true,
            diagnostics: None,
        }
    }

    /// Replaces the audible cue player.
    #[must_use]
    pub fn with_sound(mut self, sound: impl SoundCue + 'static) -> Self {
        self.sound = Box::new(sound);
        self
    }

    /// Sets the diagnostics handle for logging warnings and errors.
    pub fn set_diagnostics(&mut self, handle: DiagnosticsHandle) {
        self.diagnostics = Some(handle);
    }

    /// Globally enables or disables cues, regardless of per-toast settings.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Pushes a toast using the current time.
    pub fn push(&mut self, toast: Toast) -> Option<ToastId> {
        self.push_at(toast, Instant::now())
    }

    /// Pushes a toast, unless an identical one was accepted within the
    /// dedup window.
    ///
    /// Returns the id of the accepted toast, or `None` when it was dropped
    /// as a duplicate. If the visible stack is full the toast waits and
    /// its countdown starts once it is shown.
    pub fn push_at(&mut self, toast: Toast, now: Instant) -> Option<ToastId> {
        let window = self.dedup_window;
        self.recent
            .retain(|_, accepted| now.saturating_duration_since(*accepted) < window);

        let key = (toast.severity(), toast.message().to_string());
        if self.recent.contains_key(&key) {
            tracing::debug!(message = toast.message(), "duplicate toast dropped");
            return None;
        }
        self.recent.insert(key, now);

        if let Some(handle) = &self.diagnostics {
            match toast.severity() {
                Severity::Warning => handle.log_warning(toast.message()),
                Severity::Error => handle.log_error(toast.message()),
                Severity::Success | Severity::Info | Severity::Neutral => {}
            }
        }

        if self.sound_enabled && toast.plays_sound() {
            if let Err(err) = self.sound.play(toast.severity()) {
                tracing::debug!(error = %err, "toast sound failed");
            }
        }

        let id = toast.id();
        if self.visible.len() < self.max_visible {
            self.visible.push_front(Entry::shown_at(toast, now));
        } else {
            self.waiting.push_back(toast);
        }
        Some(id)
    }

    /// Dismisses a toast by its ID.
    ///
    /// Returns `true` if the toast was found and removed; unknown or
    /// already removed ids are a no-op.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        self.dismiss_at(id, Instant::now())
    }

    pub fn dismiss_at(&mut self, id: ToastId, now: Instant) -> bool {
        if let Some(pos) = self.visible.iter().position(|e| e.toast.id() == id) {
            self.visible.remove(pos);
            self.promote_waiting(now);
            return true;
        }

        if let Some(pos) = self.waiting.iter().position(|t| t.id() == id) {
            self.waiting.remove(pos);
            return true;
        }

        false
    }

    /// Removes every visible toast whose deadline has passed.
    ///
    /// Should be called periodically (the app ticks every 100 ms). Returns
    /// the number of toasts removed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let before = self.visible.len();
        self.visible
            .retain(|e| e.deadline.is_none_or(|deadline| now < deadline));
        let expired = before - self.visible.len();
        if expired > 0 {
            self.promote_waiting(now);
        }
        expired
    }

    /// Handles a toast message. Actions are routed by the app.
    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Dismiss(id) | Message::Action(id) => {
                self.dismiss(*id);
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.visible
            .iter()
            .map(|e| &e.toast)
            .chain(self.waiting.iter())
            .find(|t| t.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ToastId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the currently visible toasts, newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.visible.iter().map(|e| &e.toast)
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    #[must_use]
    pub fn has_toasts(&self) -> bool {
        !self.visible.is_empty() || !self.waiting.is_empty()
    }

    /// Clears all toasts (visible and waiting).
    pub fn clear(&mut self) {
        self.visible.clear();
        self.waiting.clear();
    }

    fn promote_waiting(&mut self, now: Instant) {
        while self.visible.len() < self.max_visible {
            let Some(toast) = self.waiting.pop_front() else {
                break;
            };
            self.visible.push_front(Entry::shown_at(toast, now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticEventKind, EventLog};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<Severity>>>);

    impl SoundCue for Recorder {
        fn play(&self, severity: Severity) -> crate::error::Result<()> {
            self.0.borrow_mut().push(severity);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl SoundCue for Broken {
        fn play(&self, _severity: Severity) -> crate::error::Result<()> {
            Err(crate::error::Error::Io("no device".to_string()))
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = Queue::new();
        assert_eq!(queue.visible_count(), 0);
        assert_eq!(queue.waiting_count(), 0);
        assert!(!queue.has_toasts());
    }

    #[test]
    fn duplicate_within_window_is_dropped() {
        let mut queue = Queue::new();
        let t0 = Instant::now();

        assert!(queue.push_at(Toast::error("Saved failed"), t0).is_some());
        assert!(queue.push_at(Toast::error("Saved failed"), t0 + ms(100)).is_none());
        assert_eq!(queue.visible_count(), 1);
    }

    #[test]
    fn duplicate_after_window_is_accepted() {
        let mut queue = Queue::new();
        let t0 = Instant::now();

        queue.push_at(Toast::info("Synced"), t0);
        assert!(queue.push_at(Toast::info("Synced"), t0 + ms(250)).is_some());
        assert_eq!(queue.visible_count(), 2);
    }

    #[test]
    fn same_message_different_severity_is_not_a_duplicate() {
        let mut queue = Queue::new();
        let t0 = Instant::now();
        queue.push_at(Toast::info("Done"), t0);
        assert!(queue.push_at(Toast::success("Done"), t0).is_some());
    }

    #[test]
    fn toast_expires_after_its_duration() {
        let mut queue = Queue::new();
        let t0 = Instant::now();
        let id = queue
            .push_at(Toast::info("Short").with_duration(Some(ms(500))), t0)
            .unwrap();

        assert_eq!(queue.tick(t0 + ms(400)), 0);
        assert!(queue.contains(id));

        assert_eq!(queue.tick(t0 + ms(600)), 1);
        assert!(!queue.contains(id));
    }

    #[test]
    fn sticky_toasts_never_expire() {
        let mut queue = Queue::new();
        let t0 = Instant::now();
        let id = queue.push_at(Toast::error("Stay").sticky(), t0).unwrap();
        queue.tick(t0 + Duration::from_secs(3600));
        assert!(queue.contains(id));
    }

    #[test]
    fn dismissing_one_keeps_sibling_deadlines() {
        let mut queue = Queue::new();
        let t0 = Instant::now();
        let a = queue
            .push_at(Toast::info("a").with_duration(Some(ms(500))), t0)
            .unwrap();
        let b = queue
            .push_at(Toast::info("b").with_duration(Some(ms(1_000))), t0)
            .unwrap();

        assert!(queue.dismiss_at(a, t0 + ms(100)));
        queue.tick(t0 + ms(900));
        assert!(queue.contains(b));
        queue.tick(t0 + ms(1_000));
        assert!(!queue.contains(b));
    }

    #[test]
    fn dismiss_is_idempotent() {
        let mut queue = Queue::new();
        let id = queue.push(Toast::success("once")).unwrap();

        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert!(!queue.has_toasts());
    }

    #[test]
    fn overflow_waits_and_is_promoted_with_fresh_deadline() {
        let mut queue = Queue::new();
        let t0 = Instant::now();
        let mut first = None;
        for i in 0..MAX_VISIBLE_TOASTS {
            let id = queue.push_at(Toast::info(format!("visible-{i}")), t0);
            first.get_or_insert(id.unwrap());
        }
        let waiting = queue
            .push_at(Toast::info("waiting").with_duration(Some(ms(500))), t0)
            .unwrap();
        assert_eq!(queue.waiting_count(), 1);

        queue.dismiss_at(first.unwrap(), t0 + ms(2_000));
        assert_eq!(queue.visible_count(), MAX_VISIBLE_TOASTS);
        assert_eq!(queue.waiting_count(), 0);
        assert_eq!(queue.visible().next().map(Toast::id), Some(waiting));

        // Countdown started at promotion, not at push.
        queue.tick(t0 + ms(2_400));
        assert!(queue.contains(waiting));
        queue.tick(t0 + ms(2_600));
        assert!(!queue.contains(waiting));
    }

    #[test]
    fn waiting_toast_can_be_dismissed() {
        let mut queue = Queue::new();
        for i in 0..MAX_VISIBLE_TOASTS {
            queue.push(Toast::info(format!("v{i}")));
        }
        let id = queue.push(Toast::info("w")).unwrap();
        assert!(queue.dismiss(id));
        assert_eq!(queue.waiting_count(), 0);
    }

    #[test]
    fn clear_removes_all() {
        let mut queue = Queue::new();
        for i in 0..5 {
            queue.push(Toast::success(format!("test-{i}")));
        }
        queue.clear();
        assert!(!queue.has_toasts());
    }

    #[test]
    fn sound_plays_per_accepted_toast() {
        let recorder = Recorder::default();
        let played = recorder.0.clone();
        let mut queue = Queue::new().with_sound(recorder);
        let t0 = Instant::now();

        queue.push_at(Toast::success("a"), t0);
        queue.push_at(Toast::success("a"), t0 + ms(10));
        queue.push_at(Toast::warning("b").silent(), t0);
        queue.push_at(Toast::error("c"), t0);

        assert_eq!(*played.borrow(), vec![Severity::Success, Severity::Error]);

        queue.set_sound_enabled(false);
        queue.push_at(Toast::info("d"), t0);
        assert_eq!(played.borrow().len(), 2);
    }

    #[test]
    fn sound_failure_does_not_block_the_toast() {
        let mut queue = Queue::new().with_sound(Broken);
        assert!(queue.push(Toast::error("still shown")).is_some());
        assert_eq!(queue.visible_count(), 1);
    }

    #[test]
    fn warnings_and_errors_reach_diagnostics() {
        let mut log = EventLog::new(10);
        let mut queue = Queue::new();
        queue.set_diagnostics(log.handle());

        queue.push(Toast::success("ok"));
        queue.push(Toast::warning("careful"));
        queue.push(Toast::error("broken"));
        log.process_pending();

        let kinds: Vec<_> = log.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticEventKind::Warning {
                    message: "careful".to_string()
                },
                DiagnosticEventKind::Error {
                    message: "broken".to_string()
                },
            ]
        );
    }

    #[test]
    fn handle_message_dismiss() {
        let mut queue = Queue::new();
        let id = queue.push(Toast::success("test")).unwrap();
        queue.handle_message(&Message::Dismiss(id));
        assert_eq!(queue.visible_count(), 0);
    }
}
