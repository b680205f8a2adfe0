// SPDX-License-Identifier: MPL-2.0
//! Open/closed state shared by the bell panel and the inbox filter menus.

use super::registry::{Overlay, OverlayError, Registration, Registry};
use iced::{Point, Rectangle};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A dropdown that registers with the [`Registry`] while open.
///
/// Hit regions are the trigger plus the panel, in window coordinates.
/// The owner refreshes them whenever the layout changes.
pub struct Dropdown {
    id: String,
    open: Cell<bool>,
    regions: RefCell<Vec<Rectangle>>,
    closes_on_outside: bool,
    registration: RefCell<Option<Registration>>,
}

impl Dropdown {
    fn build(id: String, closes_on_outside: bool) -> Rc<Self> {
        Rc::new(Self {
            id,
            open: Cell::new(false),
            regions: RefCell::new(Vec::new()),
            closes_on_outside,
            registration: RefCell::new(None),
        })
    }

    #[must_use]
    pub fn new(id: impl Into<String>) -> Rc<Self> {
        Self::build(id.into(), true)
    }

    /// A dropdown only closed explicitly by its owner.
    #[must_use]
    pub fn pinned(id: impl Into<String>) -> Rc<Self> {
        Self::build(id.into(), false)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn open(self: &Rc<Self>, registry: &Registry) {
        if self.open.replace(true) {
            return;
        }
        let registration = registry.register(self.id.clone(), self);
        *self.registration.borrow_mut() = Some(registration);
    }

    /// Returns the new open state.
    pub fn toggle(self: &Rc<Self>, registry: &Registry) -> bool {
        if self.is_open() {
            self.close();
        } else {
            self.open(registry);
        }
        self.is_open()
    }

    pub fn set_regions(&self, regions: impl IntoIterator<Item = Rectangle>) {
        *self.regions.borrow_mut() = regions.into_iter().collect();
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registration
            .borrow()
            .as_ref()
            .is_some_and(Registration::is_registered)
    }
}

impl Overlay for Dropdown {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn closes_on_outside_click(&self) -> bool {
        self.closes_on_outside
    }

    fn contains(&self, point: Point) -> Result<bool, OverlayError> {
        let regions = self.regions.borrow();
        if regions.is_empty() {
            return Err(OverlayError::new(format!("{} has no layout yet", self.id)));
        }
        Ok(regions.iter().any(|region| region.contains(point)))
    }

    fn close(&self) {
        self.open.set(false);
        // Release the RefCell before the guard runs its Drop.
        let registration = self.registration.borrow_mut().take();
        drop(registration);
    }
}

impl fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropdown")
            .field("id", &self.id)
            .field("open", &self.open.get())
            .finish_non_exhaustive()
    }
}

impl Drop for Dropdown {
    fn drop(&mut self) {
        self.registration.get_mut().take();
    }
}
