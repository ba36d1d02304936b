//! Settings sent by the editor (`initializationOptions`,
//! `workspace/didChangeConfiguration`, `workspace/configuration`).
//!
//! Two key revisions are in the wild and both are accepted:
//! `diagnostics.warnings.{emptyLine,emptyMessage,duplicateMessage}` enable a
//! warning, the older `ignore{EmptyLines,EmptyMessages,DuplicateMessages}`
//! disable it. When both name the same toggle the newer key wins.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::Settings;

/// Configuration section owned by this server
pub const SECTION: &str = "ucs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientSettings {
    pub diagnostics: Option<ClientDiagnostics>,
    pub ignore_empty_lines: Option<bool>,
    pub ignore_empty_messages: Option<bool>,
    pub ignore_duplicate_messages: Option<bool>,
    pub tab_size: Option<usize>,
    pub show_spaces_converted_notification: Option<bool>,
    pub debounce_ms: Option<u64>,
    pub large_file_threshold: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientDiagnostics {
    pub warnings: Option<ClientWarnings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientWarnings {
    pub empty_line: Option<bool>,
    pub empty_message: Option<bool>,
    pub duplicate_message: Option<bool>,
}

impl ClientSettings {
    /// Parse client settings.
    ///
    /// Accepts either the whole settings object (`{"ucs": {...}}`) or the
    /// `ucs` section itself. `null` means "no settings".
    pub fn from_value(value: &Value) -> Result<Self> {
        let section = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map.get(SECTION).unwrap_or(value),
            _ => value,
        };

        if section.is_null() {
            return Ok(Self::default());
        }

        Self::deserialize(section).context("Invalid ucs client settings")
    }

    /// Whether `value` carries a `ucs` section or looks like one
    pub fn is_present_in(value: &Value) -> bool {
        match value {
            Value::Object(map) => !map.is_empty(),
            _ => false,
        }
    }

    fn warnings(&self) -> Option<&ClientWarnings> {
        self.diagnostics.as_ref()?.warnings.as_ref()
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        let warnings = self.warnings();
        let resolve = |enabled: Option<bool>, ignored: Option<bool>| {
            enabled.or(ignored.map(|ignore| !ignore))
        };

        let validation = &mut settings.validation;
        if let Some(enabled) = resolve(
            warnings.and_then(|w| w.empty_line),
            self.ignore_empty_lines,
        ) {
            validation.empty_line_warning = enabled;
        }
        if let Some(enabled) = resolve(
            warnings.and_then(|w| w.empty_message),
            self.ignore_empty_messages,
        ) {
            validation.empty_message_warning = enabled;
        }
        if let Some(enabled) = resolve(
            warnings.and_then(|w| w.duplicate_message),
            self.ignore_duplicate_messages,
        ) {
            validation.duplicate_message_warning = enabled;
        }

        if let Some(tab_size) = self.tab_size {
            settings.formatting.tab_size = tab_size;
        }
        if let Some(show) = self.show_spaces_converted_notification {
            settings.formatting.show_spaces_converted_notification = show;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            settings.scheduler.debounce_ms = debounce_ms;
        }
        if let Some(threshold) = self.large_file_threshold {
            settings.scheduler.large_file_threshold = threshold;
        }
    }
}
