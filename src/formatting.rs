//! Space-to-tab auto-formatting.
//!
//! Editors that indent with spaces turn the tab key into a run of spaces.
//! Directly after an ID number that run is almost certainly meant to be the
//! delimiter, so it gets replaced with a single tab character.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::parser::{is_integer, utf16_to_byte_offset};

/// Replacement text for a converted space run
pub const TAB: &str = "\t";

/// A single text insertion reported by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceInsertion<'a> {
    /// Zero-based line of the insertion point
    pub line: u32,
    /// UTF-16 column of the insertion point
    pub character: u32,
    /// The inserted text
    pub inserted: &'a str,
    /// Text of the line containing the insertion point
    pub line_text: &'a str,
    /// Configured indentation width
    pub tab_size: usize,
}

/// Replace `[start, end)` on `line` with a single tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabReplacement {
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

/// Decide whether an insertion should become a tab.
pub fn space_to_tab(insertion: &SpaceInsertion<'_>) -> Option<TabReplacement> {
    let text = insertion.inserted;

    // Tab size 0 would turn every empty edit into a tab
    if insertion.tab_size == 0 || text.len() != insertion.tab_size {
        return None;
    }
    if !text.bytes().all(|b| b == b' ') {
        return None;
    }

    let prefix_end = utf16_to_byte_offset(insertion.line_text, insertion.character)?;
    if !is_integer(&insertion.line_text[..prefix_end]) {
        return None;
    }

    Some(TabReplacement {
        line: insertion.line,
        start: insertion.character,
        end: insertion.character + text.len() as u32,
    })
}

/// Like [`space_to_tab`], for all content changes of one edit event.
///
/// Multi-range edits (multiple cursors, programmatic batches) are never
/// corrected.
pub fn space_to_tab_for_changes(changes: &[SpaceInsertion<'_>]) -> Option<TabReplacement> {
    match changes {
        [single] => space_to_tab(single),
        _ => None,
    }
}

/// Advisory "spaces converted" notification state, shared by all documents.
///
/// The `show_spaces_converted_notification` setting can turn the notice on
/// and off at any time; "Don't show again" silences it for the session.
#[derive(Debug)]
pub struct SpacesConvertedNotice {
    enabled: AtomicBool,
    dismissed: AtomicBool,
}

impl SpacesConvertedNotice {
    pub const DONT_SHOW_AGAIN: &'static str = "Don't show again";
    pub const DISMISS: &'static str = "Dismiss";

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            dismissed: AtomicBool::new(false),
        }
    }

    pub fn should_notify(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) && !self.dismissed.load(Ordering::Relaxed)
    }

    /// Follow the configured setting
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn message(tab_size: usize) -> String {
        format!("Automatically converted {} spaces into a tab.", tab_size)
    }

    /// Record the user's answer to the notification
    pub fn handle_choice(&self, title: Option<&str>) {
        if title == Some(Self::DONT_SHOW_AGAIN) {
            self.dismissed.store(true, Ordering::Relaxed);
        }
    }
}

impl Default for SpacesConvertedNotice {
    fn default() -> Self {
        Self::new(true)
    }
}
