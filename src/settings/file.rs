//! TOML settings files (`.ucs.toml`, `~/.config/ucs-ls/config.toml`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Settings;

/// Contents of a settings file. Every key is optional; missing keys leave
/// the lower layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub diagnostics: DiagnosticsSection,
    pub formatting: FormattingSection,
    pub scheduler: SchedulerSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsSection {
    pub empty_line_warning: Option<bool>,
    pub empty_message_warning: Option<bool>,
    pub duplicate_message_warning: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormattingSection {
    pub tab_size: Option<usize>,
    pub show_spaces_converted_notification: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSection {
    pub debounce_ms: Option<u64>,
    pub large_file_threshold: Option<usize>,
}

impl SettingsFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse settings TOML")
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        let validation = &mut settings.validation;
        apply(&mut validation.empty_line_warning, self.diagnostics.empty_line_warning);
        apply(&mut validation.empty_message_warning, self.diagnostics.empty_message_warning);
        apply(
            &mut validation.duplicate_message_warning,
            self.diagnostics.duplicate_message_warning,
        );

        let formatting = &mut settings.formatting;
        apply(&mut formatting.tab_size, self.formatting.tab_size);
        apply(
            &mut formatting.show_spaces_converted_notification,
            self.formatting.show_spaces_converted_notification,
        );

        let scheduler = &mut settings.scheduler;
        apply(&mut scheduler.debounce_ms, self.scheduler.debounce_ms);
        apply(&mut scheduler.large_file_threshold, self.scheduler.large_file_threshold);
    }
}

fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Load a settings file. A missing file is not an error.
pub fn load_settings_file(path: &Path) -> Result<Option<SettingsFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let file = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings TOML: {}", path.display()))?;

    Ok(Some(file))
}
