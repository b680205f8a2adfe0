// SPDX-License-Identifier: MPL-2.0
//! Coordination of many dropdowns sharing one registry.

use iced::keyboard::{key, Key};
use iced::{Point, Rectangle, Size};
use schoolbell::ui::overlay::{Dropdown, Overlay, OverlayError, Propagation, Registry};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn escape() -> Key {
    Key::Named(key::Named::Escape)
}

/// A dropdown whose region is a 100x100 square at column `index`.
fn dropdown_at(index: usize) -> Rc<Dropdown> {
    let dropdown = Dropdown::new(format!("menu-{index}"));
    dropdown.set_regions([square(index)]);
    dropdown
}

fn square(index: usize) -> Rectangle {
    Rectangle::new(
        Point::new(index as f32 * 200.0, 0.0),
        Size::new(100.0, 100.0),
    )
}

fn inside(index: usize) -> Point {
    Point::new(index as f32 * 200.0 + 50.0, 50.0)
}

const NOWHERE: Point = Point { x: 10_000.0, y: 10_000.0 };

#[test]
fn one_outside_click_closes_every_open_dropdown_once() {
    let registry = Registry::new();
    let menus: Vec<_> = (0..6).map(dropdown_at).collect();
    for menu in &menus {
        menu.open(&registry);
    }
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.listener_count(), 2);

    assert_eq!(registry.pointer_down(NOWHERE), 6);
    // A second event before the frame does not schedule duplicates.
    assert_eq!(registry.pointer_down(NOWHERE), 0);
    assert!(menus.iter().all(|m| m.is_open()));

    assert_eq!(registry.run_deferred(), 6);
    assert!(menus.iter().all(|m| !m.is_open()));
    assert!(registry.is_empty());
    assert_eq!(registry.listener_count(), 0);
    assert_eq!(registry.run_deferred(), 0);
}

#[test]
fn clicking_one_menu_closes_only_its_siblings() {
    let registry = Registry::new();
    let menus: Vec<_> = (0..4).map(dropdown_at).collect();
    for menu in &menus {
        menu.open(&registry);
    }

    assert_eq!(registry.pointer_down(inside(2)), 3);
    registry.run_deferred();

    let open: Vec<&str> = menus.iter().filter(|m| m.is_open()).map(|m| m.id()).collect();
    assert_eq!(open, vec!["menu-2"]);
    assert_eq!(registry.ids(), vec!["menu-2".to_string()]);
}

#[test]
fn opening_a_sibling_in_the_same_click_survives_the_deferred_close() {
    let registry = Registry::new();
    let first = dropdown_at(0);
    let second = dropdown_at(1);
    first.open(&registry);

    // The click lands on the second trigger: the registry sees it first,
    // then the trigger's handler opens the second menu.
    registry.pointer_down(inside(1));
    second.open(&registry);
    registry.run_deferred();

    assert!(!first.is_open());
    assert!(second.is_open());
}

#[test]
fn escape_closes_everything_synchronously() {
    let registry = Registry::new();
    let menus: Vec<_> = (0..3).map(dropdown_at).collect();
    for menu in &menus {
        menu.open(&registry);
    }

    assert_eq!(registry.key_down(&escape()), Propagation::Stop);
    assert!(menus.iter().all(|m| !m.is_open()));
    assert!(registry.is_empty());

    assert_eq!(registry.key_down(&escape()), Propagation::Continue);
    assert_eq!(
        registry.key_down(&Key::Character("a".into())),
        Propagation::Continue
    );
}

#[test]
fn pinned_dropdowns_stay_open_until_closed_explicitly() {
    let registry = Registry::new();
    let pinned = Dropdown::pinned("pinned");
    pinned.set_regions([square(0)]);
    pinned.open(&registry);

    assert_eq!(registry.pointer_down(NOWHERE), 0);
    registry.run_deferred();
    assert!(pinned.is_open());

    assert_eq!(registry.key_down(&escape()), Propagation::Continue);
    assert!(pinned.is_open());
    assert_eq!(registry.len(), 1);

    pinned.close();
    assert!(!pinned.is_open());
    assert!(registry.is_empty());
    assert_eq!(registry.listener_count(), 0);
}

#[test]
fn repeated_cycles_do_not_leak_listeners_or_slots() {
    let registry = Registry::new();
    let menu = dropdown_at(0);

    for round in 0..500 {
        menu.open(&registry);
        assert_eq!(registry.len(), 1);
        match round % 3 {
            0 => {
                registry.pointer_down(NOWHERE);
                registry.run_deferred();
            }
            1 => {
                registry.key_down(&escape());
            }
            _ => {
                assert!(!menu.toggle(&registry));
            }
        }
        assert!(!menu.is_open());
        assert_eq!(registry.listener_count(), 0);
    }

    assert!(registry.is_empty());
    assert_eq!(registry.attach_count(), 500);
}

#[test]
fn dropping_an_open_dropdown_unregisters_it() {
    let registry = Registry::new();
    let kept = dropdown_at(0);
    kept.open(&registry);
    {
        let transient = dropdown_at(1);
        transient.open(&registry);
        assert_eq!(registry.len(), 2);
    }
    assert_eq!(registry.ids(), vec!["menu-0".to_string()]);
    assert!(registry.is_listening());
}

/// Opens a follow-up dropdown from inside its own close callback.
struct Chained {
    open: Cell<bool>,
    registry: Registry,
    follow_up: Rc<Dropdown>,
    registration: RefCell<Option<schoolbell::ui::overlay::Registration>>,
}

impl Overlay for Chained {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn contains(&self, point: Point) -> Result<bool, OverlayError> {
        Ok(square(0).contains(point))
    }

    fn close(&self) {
        self.open.set(false);
        let registration = self.registration.borrow_mut().take();
        drop(registration);
        self.follow_up.open(&self.registry);
    }
}

#[test]
fn close_callbacks_may_touch_the_registry() {
    let registry = Registry::new();
    let follow_up = dropdown_at(3);
    let chained = Rc::new(Chained {
        open: Cell::new(true),
        registry: registry.clone(),
        follow_up: Rc::clone(&follow_up),
        registration: RefCell::new(None),
    });
    let registration = registry.register("chained", &chained);
    *chained.registration.borrow_mut() = Some(registration);

    registry.pointer_down(NOWHERE);
    assert_eq!(registry.run_deferred(), 1);

    assert!(!chained.is_open());
    assert!(follow_up.is_open());
    assert_eq!(registry.ids(), vec!["menu-3".to_string()]);
}

#[test]
fn a_dropdown_without_layout_is_closed_by_any_click() {
    let registry = Registry::new();
    let unplaced = Dropdown::new("unplaced");
    unplaced.open(&registry);

    assert_eq!(registry.pointer_down(Point::ORIGIN), 1);
    registry.run_deferred();
    assert!(!unplaced.is_open());
}
