// SPDX-License-Identifier: MPL-2.0
//! User interface components and state management.
//!
//! This module organizes all UI-related code following a component-based architecture
//! with the Elm-style "state down, messages up" pattern.
//!
//! # Surfaces
//!
//! - [`bell`] - Header bell with unread badge and dropdown preview
//! - [`inbox`] - Full notification list with filters and search
//! - [`toasts`] - Transient toast queue
//!
//! # Shared Infrastructure
//!
//! - [`overlay`] - Registry arbitrating outside clicks and Escape for dropdowns
//! - [`layout`] - Fixed window geometry used by views and hit regions
//! - [`filter`] - Inbox filter criteria
//! - [`format`] - Relative times, summaries and badge labels
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)

pub mod bell;
pub mod design_tokens;
pub mod filter;
pub mod format;
pub mod inbox;
pub mod layout;
pub mod overlay;
pub mod toasts;
