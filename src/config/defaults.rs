// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.

// ==========================================================================
// Server Defaults
// ==========================================================================

/// Default base URL of the notification service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default request timeout (in seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum request timeout (in seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum request timeout (in seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

// ==========================================================================
// Inbox Defaults
// ==========================================================================

/// Default interval between unread-count polls (in seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Minimum poll interval (in seconds).
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Maximum poll interval (in seconds).
pub const MAX_POLL_INTERVAL_SECS: u64 = 600;

/// Default number of notifications fetched per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Minimum page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Maximum page size.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Number of entries shown in the bell dropdown.
pub const BELL_PREVIEW_LIMIT: usize = 5;

// ==========================================================================
// Toast Defaults
// ==========================================================================

/// Window during which a toast with the same severity and message is dropped.
pub const TOAST_DEDUP_WINDOW_MS: u64 = 200;

/// Maximum number of toasts visible at once.
pub const MAX_VISIBLE_TOASTS: usize = 3;

/// Default lifetime of success, info and neutral toasts.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;

/// Default lifetime of warning toasts.
pub const WARNING_TOAST_DURATION_MS: u64 = 6_000;

/// Default lifetime of error toasts (longest lived).
pub const ERROR_TOAST_DURATION_MS: u64 = 8_000;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Number of diagnostic events retained in memory.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 256;

/// Default tracing filter when neither `--log` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "schoolbell=info";
