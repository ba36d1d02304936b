use std::fs;

use serde_json::json;
use tempfile::TempDir;
use ucs_language_server::config::{Args, Config};
use ucs_language_server::settings::{ClientSettings, SettingsManager, WORKSPACE_SETTINGS_FILE};
use ucs_language_server::Settings;

use clap::Parser;

#[test]
fn test_missing_files_give_defaults() {
    let dir = TempDir::new().unwrap();
    let mut manager = SettingsManager::with_files(
        Some(dir.path().join("user.toml")),
        Some(dir.path().join(WORKSPACE_SETTINGS_FILE)),
    );

    assert_eq!(*manager.reload().unwrap(), Settings::default());
}

#[test]
fn test_workspace_file_overrides_user_file() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("user.toml");
    let workspace = dir.path().join(WORKSPACE_SETTINGS_FILE);

    fs::write(
        &user,
        "[formatting]\ntab_size = 2\n\n[diagnostics]\nempty_line_warning = false\n",
    )
    .unwrap();
    fs::write(&workspace, "[formatting]\ntab_size = 8\n").unwrap();

    let mut manager = SettingsManager::with_files(Some(user), Some(workspace));
    let settings = *manager.reload().unwrap();

    assert_eq!(settings.formatting.tab_size, 8);
    assert!(!settings.validation.empty_line_warning);
    assert!(settings.validation.empty_message_warning);
}

#[test]
fn test_client_settings_override_files() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join(WORKSPACE_SETTINGS_FILE);
    fs::write(&workspace, "[diagnostics]\nduplicate_message_warning = false\n").unwrap();

    let mut manager = SettingsManager::with_files(None, Some(workspace));
    let client = ClientSettings::from_value(&json!({
        "ucs": {
            "diagnostics": { "warnings": { "duplicateMessage": true } },
            "ignoreEmptyMessages": true
        }
    }))
    .unwrap();
    manager.set_client_settings(client);

    let settings = *manager.reload().unwrap();
    assert!(settings.validation.duplicate_message_warning);
    assert!(!settings.validation.empty_message_warning);
}

#[test]
fn test_command_line_flags_win() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("custom.toml");
    fs::write(&workspace, "[scheduler]\ndebounce_ms = 500\nlarge_file_threshold = 10\n").unwrap();

    let args = Args::parse_from([
        "ucs-ls",
        "--config",
        workspace.to_str().unwrap(),
        "--debounce-ms",
        "0",
    ]);
    let config = Config {
        user_settings_file: None,
        ..Config::from_args(args).unwrap()
    };

    let mut manager = SettingsManager::new(&config);
    manager.set_client_settings(ClientSettings::from_value(&json!({ "debounceMs": 250 })).unwrap());
    let settings = *manager.reload().unwrap();

    assert_eq!(settings.scheduler.debounce_ms, 0);
    assert_eq!(settings.scheduler.large_file_threshold, 10);
}

#[test]
fn test_explicit_config_ignores_workspace_root() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("explicit.toml");
    fs::write(&explicit, "[formatting]\ntab_size = 3\n").unwrap();
    fs::write(
        dir.path().join(WORKSPACE_SETTINGS_FILE),
        "[formatting]\ntab_size = 6\n",
    )
    .unwrap();

    let mut manager = SettingsManager::with_files(None, Some(explicit.clone()));
    manager.set_workspace_root(dir.path());

    assert_eq!(manager.watched_files(), vec![explicit]);
    assert_eq!(manager.reload().unwrap().formatting.tab_size, 3);
}

#[test]
fn test_workspace_root_locates_settings_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(WORKSPACE_SETTINGS_FILE),
        "[formatting]\nshow_spaces_converted_notification = false\n",
    )
    .unwrap();

    let mut manager = SettingsManager::with_files(None, None);
    manager.set_workspace_root(dir.path());

    let settings = *manager.reload().unwrap();
    assert!(!settings.formatting.show_spaces_converted_notification);
}

#[test]
fn test_broken_file_keeps_previous_settings() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join(WORKSPACE_SETTINGS_FILE);
    fs::write(&workspace, "[formatting]\ntab_size = 2\n").unwrap();

    let mut manager = SettingsManager::with_files(None, Some(workspace.clone()));
    manager.reload().unwrap();

    fs::write(&workspace, "[formatting\ntab_size = ").unwrap();
    assert!(manager.reload().is_err());
    assert_eq!(manager.current().formatting.tab_size, 2);

    fs::write(&workspace, "[formatting]\nunknown_key = 1\n").unwrap();
    assert!(manager.reload().is_err());
    assert_eq!(manager.current().formatting.tab_size, 2);
}
