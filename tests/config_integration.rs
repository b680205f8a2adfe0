// SPDX-License-Identifier: MPL-2.0
//! Settings persistence through a temporary config directory.

use schoolbell::config::{self, Config};
use schoolbell::ui::filter::{KindFilter, ReadFilter};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn settings_survive_a_save_and_load() {
    let dir = tempdir().unwrap();
    let mut settings = Config::default();
    settings.server.base_url = "https://school.example/api".to_string();
    settings.notifications.poll_interval_secs = Some(45);
    settings.notifications.sound_enabled = Some(false);
    settings.display.default_filter = Some(ReadFilter::Unread);
    settings.display.default_kind = Some(KindFilter::Warning);

    config::save_with_override(&settings, Some(dir.path().to_path_buf())).unwrap();
    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));

    assert!(warning.is_none());
    assert_eq!(loaded, settings);
    assert_eq!(loaded.poll_interval(), Duration::from_secs(45));
    assert!(!loaded.sound_enabled());
}

#[test]
fn missing_file_yields_defaults_silently() {
    let dir = tempdir().unwrap();
    let (loaded, warning) = config::load_with_override(Some(dir.path().join("absent")));
    assert!(warning.is_none());
    assert_eq!(loaded, Config::default());
}

#[test]
fn corrupt_file_yields_defaults_with_a_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("settings.toml"), "[server\nbase_url = ").unwrap();

    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert_eq!(loaded, Config::default());
    assert!(warning.is_some());
}

#[test]
fn partial_files_fill_in_defaults() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("settings.toml"),
        "[server]\nbase_url = \"http://localhost:9000/api\"\n",
    )
    .unwrap();

    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert!(warning.is_none());
    assert_eq!(loaded.server.base_url, "http://localhost:9000/api");
    assert_eq!(loaded.page_size(), config::DEFAULT_PAGE_SIZE);
    assert_eq!(
        loaded.poll_interval(),
        Duration::from_secs(config::DEFAULT_POLL_INTERVAL_SECS)
    );
}
