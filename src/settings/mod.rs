//! Settings for the validator, formatter and scan scheduler.
//!
//! Loading priority (lowest to highest):
//! built-in defaults < user-global file < workspace file < client settings
//! < command-line flags.

pub mod client;
pub mod file;
pub mod watcher;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;

pub use client::ClientSettings;
pub use file::{load_settings_file, SettingsFile};
pub use watcher::{watch_settings_files, SettingsEvent, SettingsWatcher};

/// Name of the workspace settings file
pub const WORKSPACE_SETTINGS_FILE: &str = ".ucs.toml";

/// Diagnostic toggles. Duplicate-ID detection is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    pub empty_line_warning: bool,
    pub empty_message_warning: bool,
    pub duplicate_message_warning: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            empty_line_warning: true,
            empty_message_warning: true,
            duplicate_message_warning: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingSettings {
    /// Indentation width; a run of exactly this many spaces becomes a tab
    pub tab_size: usize,
    pub show_spaces_converted_notification: bool,
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self {
            tab_size: 4,
            show_spaces_converted_notification: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Quiet period before a scheduled scan starts
    pub debounce_ms: u64,
    /// Documents with more lines than this show a progress indicator
    pub large_file_threshold: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            large_file_threshold: 1000,
        }
    }
}

/// Effective settings after layering every source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub validation: ValidationSettings,
    pub formatting: FormattingSettings,
    pub scheduler: SchedulerSettings,
}

/// Values given on the command line; these win over every other source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub tab_size: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub large_file_threshold: Option<usize>,
}

impl SettingsOverrides {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(tab_size) = self.tab_size {
            settings.formatting.tab_size = tab_size;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            settings.scheduler.debounce_ms = debounce_ms;
        }
        if let Some(threshold) = self.large_file_threshold {
            settings.scheduler.large_file_threshold = threshold;
        }
    }
}

/// Resolves and caches the layered settings
#[derive(Debug, Clone)]
pub struct SettingsManager {
    user_file: Option<PathBuf>,
    workspace_file: Option<PathBuf>,
    /// Set when the workspace file came from `--config`
    explicit_workspace_file: bool,
    client: ClientSettings,
    overrides: SettingsOverrides,
    current: Settings,
}

impl SettingsManager {
    /// Create a manager from the server configuration
    pub fn new(config: &Config) -> Self {
        let mut current = Settings::default();
        config.overrides.apply_to(&mut current);

        Self {
            user_file: config.user_settings_file.clone(),
            workspace_file: config.config_path.clone(),
            explicit_workspace_file: config.config_path.is_some(),
            client: ClientSettings::default(),
            overrides: config.overrides,
            current,
        }
    }

    /// Create a manager that only knows about the given files (useful for testing)
    pub fn with_files(user_file: Option<PathBuf>, workspace_file: Option<PathBuf>) -> Self {
        Self {
            user_file,
            explicit_workspace_file: workspace_file.is_some(),
            workspace_file,
            client: ClientSettings::default(),
            overrides: SettingsOverrides::default(),
            current: Settings::default(),
        }
    }

    /// Use `<root>/.ucs.toml` unless a file was given explicitly
    pub fn set_workspace_root(&mut self, root: &Path) {
        if !self.explicit_workspace_file {
            self.workspace_file = Some(root.join(WORKSPACE_SETTINGS_FILE));
        }
    }

    pub fn set_client_settings(&mut self, client: ClientSettings) {
        self.client = client;
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Settings files that exist or may be created later
    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.user_file
            .iter()
            .chain(self.workspace_file.iter())
            .cloned()
            .collect()
    }

    /// Re-read the settings files and recompute the effective settings.
    ///
    /// On error the previously resolved settings stay in effect.
    pub fn reload(&mut self) -> Result<&Settings> {
        let mut settings = Settings::default();

        for path in self.user_file.iter().chain(self.workspace_file.iter()) {
            if let Some(file) = load_settings_file(path)? {
                log::debug!("applying settings from {}", path.display());
                file.apply_to(&mut settings);
            }
        }

        self.client.apply_to(&mut settings);
        self.overrides.apply_to(&mut settings);

        if settings != self.current {
            log::info!("settings changed: {:?}", settings);
        }
        self.current = settings;
        Ok(&self.current)
    }
}
