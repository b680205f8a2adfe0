// SPDX-License-Identifier: MPL-2.0
//! Arbiter for popovers and dropdowns that share global input.
//!
//! Every open overlay registers here. The registry owns the only global
//! pointer-down and key-down listeners: they are attached when the first
//! overlay registers and detached when the last one leaves, so closed
//! overlays cost nothing and cannot leak listeners.
//!
//! Outside clicks close an overlay on the next frame ([`Registry::run_deferred`]),
//! which lets the click that opened a sibling finish first. Escape closes
//! every open overlay immediately.

use iced::keyboard::{key, Key};
use iced::Point;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Number of global listeners held while any overlay is registered.
const LISTENERS_PER_ATTACHMENT: usize = 2;

/// Hit-testing failure reported by an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayError(String);

impl OverlayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for OverlayError {}

/// Something that can be closed by outside clicks or Escape.
pub trait Overlay {
    fn is_open(&self) -> bool;

    /// Whether outside clicks and Escape close this overlay.
    fn closes_on_outside_click(&self) -> bool {
        true
    }

    /// Hit test in window coordinates.
    ///
    /// An error is treated as "outside", so a broken overlay closes
    /// instead of staying stuck open.
    fn contains(&self, point: Point) -> Result<bool, OverlayError>;

    /// Closes the overlay. Called with no registry borrow held, so the
    /// implementation may unregister itself.
    fn close(&self);
}

/// Whether a key event was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Stop,
    Continue,
}

struct Slot {
    key: u64,
    id: String,
    overlay: Weak<dyn Overlay>,
    close_scheduled: bool,
}

#[derive(Default)]
struct Inner {
    slots: Vec<Slot>,
    next_key: u64,
    deferred: Vec<u64>,
    attached: bool,
    attach_count: u64,
}

impl Inner {
    fn insert(&mut self, id: String, overlay: Weak<dyn Overlay>) -> u64 {
        self.next_key += 1;
        let key = self.next_key;
        tracing::trace!(%id, key, "overlay registered");
        self.slots.push(Slot {
            key,
            id,
            overlay,
            close_scheduled: false,
        });
        if !self.attached {
            self.attached = true;
            self.attach_count += 1;
            tracing::debug!("global overlay listeners attached");
        }
        key
    }

    fn remove(&mut self, key: u64) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.key != key);
        self.deferred.retain(|k| *k != key);
        let removed = self.slots.len() != before;
        self.detach_if_idle();
        removed
    }

    /// Drops slots whose overlay no longer exists.
    fn prune(&mut self) {
        let dead: Vec<u64> = self
            .slots
            .iter()
            .filter(|slot| slot.overlay.strong_count() == 0)
            .map(|slot| slot.key)
            .collect();
        for key in dead {
            self.remove(key);
        }
    }

    fn detach_if_idle(&mut self) {
        if self.attached && self.slots.is_empty() {
            self.attached = false;
            tracing::debug!("global overlay listeners detached");
        }
    }

    /// Live overlays eligible for outside-close handling.
    fn closable(&self) -> Vec<(u64, Rc<dyn Overlay>)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.overlay.upgrade().map(|o| (slot.key, o)))
            .filter(|(_, o)| o.is_open() && o.closes_on_outside_click())
            .collect()
    }
}

/// Registry state plus unregistrations that arrived while it was borrowed.
#[derive(Default)]
struct Shared {
    inner: RefCell<Inner>,
    orphaned: RefCell<Vec<u64>>,
}

impl Shared {
    /// Borrows the registry, first applying any queued unregistrations.
    fn lock(&self) -> RefMut<'_, Inner> {
        let mut inner = self.inner.borrow_mut();
        let orphaned = std::mem::take(&mut *self.orphaned.borrow_mut());
        for key in orphaned {
            inner.remove(key);
        }
        inner
    }
}

/// Shared handle to the overlay arbiter.
///
/// Cloning is cheap; all clones address the same registry. Lives on the
/// UI thread.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Rc<Shared>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.ids())
            .field("listening", &self.is_listening())
            .finish()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an open overlay.
    ///
    /// The registry only holds a weak reference; the returned guard
    /// unregisters on drop. `id` is a label for logs and introspection.
    #[must_use = "dropping the registration unregisters the overlay"]
    pub fn register<O>(&self, id: impl Into<String>, overlay: &Rc<O>) -> Registration
    where
        O: Overlay + 'static,
    {
        let weak: Weak<dyn Overlay> = Rc::downgrade(overlay) as Weak<dyn Overlay>;
        let id = id.into();
        let key = self.inner.lock().insert(id.clone(), weak);
        Registration {
            key,
            id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Handles a global pointer-down at `point`.
    ///
    /// Schedules a deferred close for every open overlay that does not
    /// contain the point. Scheduling is idempotent. Returns the number of
    /// newly scheduled closes.
    pub fn pointer_down(&self, point: Point) -> usize {
        let candidates = {
            let mut inner = self.inner.lock();
            inner.prune();
            inner.closable()
        };

        let outside: Vec<u64> = candidates
            .into_iter()
            .filter(|(_, overlay)| !hit_test(overlay.as_ref(), point))
            .map(|(key, _)| key)
            .collect();

        let mut inner = self.inner.lock();
        let mut scheduled = 0;
        for key in outside {
            let Some(slot) = inner.slots.iter_mut().find(|s| s.key == key) else {
                continue;
            };
            if !slot.close_scheduled {
                slot.close_scheduled = true;
                inner.deferred.push(key);
                scheduled += 1;
            }
        }
        scheduled
    }

    /// Handles a global key-down. Escape closes every open overlay at once.
    pub fn key_down(&self, key: &Key) -> Propagation {
        if !matches!(key, Key::Named(key::Named::Escape)) {
            return Propagation::Continue;
        }

        let candidates = {
            let mut inner = self.inner.lock();
            inner.prune();
            inner.closable()
        };
        if candidates.is_empty() {
            return Propagation::Continue;
        }

        for (_, overlay) in &candidates {
            overlay.close();
        }
        Propagation::Stop
    }

    /// Runs closes scheduled by [`Registry::pointer_down`].
    ///
    /// Overlays that unregistered or closed in the meantime are skipped.
    /// Returns the number of overlays closed.
    pub fn run_deferred(&self) -> usize {
        let due: Vec<Rc<dyn Overlay>> = {
            let mut inner = self.inner.lock();
            let keys = std::mem::take(&mut inner.deferred);
            inner
                .slots
                .iter_mut()
                .filter(|slot| keys.contains(&slot.key))
                .filter_map(|slot| {
                    slot.close_scheduled = false;
                    slot.overlay.upgrade()
                })
                .collect()
        };

        let mut closed = 0;
        for overlay in due {
            if overlay.is_open() {
                overlay.close();
                closed += 1;
            }
        }
        closed
    }

    /// True while any close is waiting for the next frame.
    #[must_use]
    pub fn has_deferred(&self) -> bool {
        !self.inner.lock().deferred.is_empty()
    }

    /// True while the global listeners are attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.inner.lock().attached
    }

    /// Number of global listeners currently attached.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        if self.is_listening() {
            LISTENERS_PER_ATTACHMENT
        } else {
            0
        }
    }

    /// How many times the listeners were attached since creation.
    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.inner.lock().attach_count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels of registered overlays, in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .slots
            .iter()
            .map(|slot| slot.id.clone())
            .collect()
    }
}

fn hit_test(overlay: &dyn Overlay, point: Point) -> bool {
    match catch_unwind(AssertUnwindSafe(|| overlay.contains(point))) {
        Ok(Ok(inside)) => inside,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "overlay hit test failed, closing it");
            false
        }
        Err(_) => {
            tracing::warn!("overlay hit test panicked, closing it");
            false
        }
    }
}

/// Guard keeping an overlay registered.
///
/// Dropping it (or calling [`Registration::unregister`]) removes the
/// overlay; removing the last one detaches the global listeners.
pub struct Registration {
    key: u64,
    id: String,
    inner: Weak<Shared>,
}

impl Registration {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the registry still tracks this overlay.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.inner.upgrade().is_some_and(|shared| {
            let orphaned = shared
                .orphaned
                .try_borrow()
                .is_ok_and(|keys| keys.contains(&self.key));
            !orphaned
                && shared
                    .inner
                    .try_borrow()
                    .is_ok_and(|inner| inner.slots.iter().any(|s| s.key == self.key))
        })
    }

    pub fn unregister(self) {}
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(shared) = self.inner.upgrade() else {
            return;
        };
        let removed = match shared.inner.try_borrow_mut() {
            Ok(mut inner) => {
                inner.remove(self.key);
                true
            }
            Err(_) => false,
        };
        if removed {
            tracing::trace!(id = %self.id, "overlay unregistered");
        } else {
            // Applied by the next `Shared::lock`.
            shared.orphaned.borrow_mut().push(self.key);
            tracing::debug!(id = %self.id, "overlay registry busy, unregister queued");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::keyboard::key::Named;
    use std::cell::{Cell, RefCell};

    /// Test overlay occupying a fixed square.
    struct Square {
        open: Cell<bool>,
        origin: Point,
        size: f32,
        closes: Cell<u32>,
        outside_close: bool,
        registration: RefCell<Option<Registration>>,
    }

    impl Square {
        fn at(x: f32, y: f32) -> Rc<Self> {
            Self::build(x, y, true)
        }

        fn build(x: f32, y: f32, outside_close: bool) -> Rc<Self> {
            Rc::new(Self {
                open: Cell::new(true),
                origin: Point::new(x, y),
                size: 10.0,
                closes: Cell::new(0),
                outside_close,
                registration: RefCell::new(None),
            })
        }

        fn register(self: &Rc<Self>, registry: &Registry, id: &str) {
            *self.registration.borrow_mut() = Some(registry.register(id, self));
        }
    }

    impl Overlay for Square {
        fn is_open(&self) -> bool {
            self.open.get()
        }

        fn closes_on_outside_click(&self) -> bool {
            self.outside_close
        }

        fn contains(&self, p: Point) -> Result<bool, OverlayError> {
            Ok(p.x >= self.origin.x
                && p.y >= self.origin.y
                && p.x < self.origin.x + self.size
                && p.y < self.origin.y + self.size)
        }

        fn close(&self) {
            self.open.set(false);
            self.closes.set(self.closes.get() + 1);
            let registration = self.registration.borrow_mut().take();
            drop(registration);
        }
    }

    struct Broken {
        panic: bool,
        closed: Cell<bool>,
    }

    impl Overlay for Broken {
        fn is_open(&self) -> bool {
            !self.closed.get()
        }

        fn contains(&self, _point: Point) -> Result<bool, OverlayError> {
            if self.panic {
                panic!("layout missing");
            }
            Err(OverlayError::new("no bounds"))
        }

        fn close(&self) {
            self.closed.set(true);
        }
    }

    #[test]
    fn listeners_follow_registration_count() {
        let registry = Registry::new();
        assert!(!registry.is_listening());
        assert_eq!(registry.listener_count(), 0);

        let a = Square::at(0.0, 0.0);
        let b = Square::at(50.0, 0.0);
        let ra = registry.register("a", &a);
        let rb = registry.register("b", &b);
        assert_eq!(registry.listener_count(), 2);
        assert_eq!(registry.attach_count(), 1);
        assert_eq!(registry.ids(), vec!["a".to_string(), "b".to_string()]);

        drop(ra);
        assert!(registry.is_listening());
        rb.unregister();
        assert!(!registry.is_listening());
        assert_eq!(registry.listener_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn outside_click_closes_once_on_next_frame() {
        let registry = Registry::new();
        let square = Square::at(0.0, 0.0);
        square.register(&registry, "menu");

        assert_eq!(registry.pointer_down(Point::new(100.0, 100.0)), 1);
        assert_eq!(registry.pointer_down(Point::new(200.0, 100.0)), 0);
        assert!(square.is_open(), "close must wait for the next frame");
        assert!(registry.has_deferred());

        assert_eq!(registry.run_deferred(), 1);
        assert_eq!(registry.run_deferred(), 0);
        assert_eq!(square.closes.get(), 1);
        assert!(!square.is_open());
        assert!(!registry.is_listening());
    }

    #[test]
    fn inside_click_keeps_overlay_open() {
        let registry = Registry::new();
        let square = Square::at(0.0, 0.0);
        square.register(&registry, "menu");

        assert_eq!(registry.pointer_down(Point::new(5.0, 5.0)), 0);
        registry.run_deferred();
        assert!(square.is_open());
    }

    #[test]
    fn escape_closes_all_open_overlays_immediately() {
        let registry = Registry::new();
        let squares = [
            Square::at(0.0, 0.0),
            Square::at(50.0, 0.0),
            Square::at(100.0, 0.0),
        ];
        for (i, square) in squares.iter().enumerate() {
            square.register(&registry, &format!("menu-{i}"));
        }

        let enter = Key::Named(Named::Enter);
        assert_eq!(registry.key_down(&enter), Propagation::Continue);

        let escape = Key::Named(Named::Escape);
        assert_eq!(registry.key_down(&escape), Propagation::Stop);
        for square in &squares {
            assert!(!square.is_open());
            assert_eq!(square.closes.get(), 1);
        }
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.listener_count(), 0);

        assert_eq!(registry.key_down(&escape), Propagation::Continue);
        assert!(squares.iter().all(|square| square.closes.get() == 1));
    }

    #[test]
    fn click_inside_newer_overlay_closes_older_one_once() {
        let registry = Registry::new();
        let a = Square::at(0.0, 0.0);
        let b = Square::at(50.0, 0.0);
        a.register(&registry, "a");
        b.register(&registry, "b");

        assert_eq!(registry.pointer_down(Point::new(55.0, 5.0)), 1);
        assert_eq!(registry.run_deferred(), 1);
        assert_eq!(registry.run_deferred(), 0);

        assert_eq!(a.closes.get(), 1);
        assert!(!a.is_open());
        assert_eq!(b.closes.get(), 0);
        assert!(b.is_open());
        assert_eq!(registry.ids(), vec!["b".to_string()]);
    }

    #[test]
    fn unregister_while_registry_is_borrowed_is_applied_later() {
        let registry = Registry::new();
        let a = Square::at(0.0, 0.0);
        let b = Square::at(50.0, 0.0);
        let ra = registry.register("a", &a);
        let rb = registry.register("b", &b);

        {
            let _busy = registry.inner.inner.borrow();
            drop(ra);
        }
        assert!(rb.is_registered());
        assert_eq!(registry.ids(), vec!["b".to_string()]);

        {
            let _busy = registry.inner.inner.borrow();
            drop(rb);
        }
        assert!(!registry.is_listening());
        assert_eq!(registry.listener_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn overlays_that_ignore_outside_clicks_stay_open() {
        let registry = Registry::new();
        let pinned = Square::build(0.0, 0.0, false);
        let _registration = registry.register("pinned", &pinned);

        registry.pointer_down(Point::new(500.0, 500.0));
        registry.run_deferred();
        registry.key_down(&Key::Named(Named::Escape));
        assert!(pinned.is_open());
    }

    #[test]
    fn deferred_close_skips_overlays_closed_meanwhile() {
        let registry = Registry::new();
        let square = Square::at(0.0, 0.0);
        square.register(&registry, "menu");

        registry.pointer_down(Point::new(100.0, 100.0));
        square.close();
        assert_eq!(registry.run_deferred(), 0);
        assert_eq!(square.closes.get(), 1);
    }

    #[test]
    fn failing_hit_test_closes_the_overlay() {
        let registry = Registry::new();
        let erroring = Rc::new(Broken {
            panic: false,
            closed: Cell::new(false),
        });
        let panicking = Rc::new(Broken {
            panic: true,
            closed: Cell::new(false),
        });
        let _r1 = registry.register("erroring", &erroring);
        let _r2 = registry.register("panicking", &panicking);

        assert_eq!(registry.pointer_down(Point::ORIGIN), 2);
        registry.run_deferred();
        assert!(erroring.closed.get());
        assert!(panicking.closed.get());
    }

    #[test]
    fn dropped_overlay_is_pruned() {
        let registry = Registry::new();
        let square = Square::at(0.0, 0.0);
        let registration = registry.register("gone", &square);
        drop(square);

        registry.pointer_down(Point::ORIGIN);
        assert!(!registry.is_listening());
        assert!(!registration.is_registered());
    }

    #[test]
    fn registration_outliving_registry_is_harmless() {
        let registry = Registry::new();
        let square = Square::at(0.0, 0.0);
        let registration = registry.register("orphan", &square);
        drop(registry);
        assert!(!registration.is_registered());
        drop(registration);
    }
}
