// SPDX-License-Identifier: MPL-2.0
//! Coordination of popovers and dropdowns.
//!
//! At most one set of global listeners exists, owned by the
//! [`Registry`]. Components hold a [`Registration`] only while open.

mod dropdown;
mod registry;

pub use dropdown::Dropdown;
pub use registry::{Overlay, OverlayError, Propagation, Registration, Registry};
