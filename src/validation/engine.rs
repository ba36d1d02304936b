//! Validation Engine
//!
//! Core validation logic separated from parsing and LSP concerns.
//! A document is scanned once, front to back; every line is classified on
//! its own and well-formed lines feed the duplicate indexes.

use crate::parser::{self, is_integer, utf16_len, Line, ParsedLine};
use crate::settings::ValidationSettings;

use super::aggregate::{Occurrence, OccurrenceIndex};
use super::diagnostic::{Diagnostic, Severity, Span};

pub const EMPTY_LINE: &str = "Empty line";
pub const MISSING_TAB: &str = "missing tab character between ID and message";
pub const MISSING_ID: &str = "missing ID number";
pub const INVALID_ID: &str =
    "invalid ID number, must be a non-negative integer without leading zeros";
pub const EMPTY_MESSAGE: &str = "empty message";

/// Classification of a single line. Checks run in declaration order and the
/// first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Empty,
    MissingDelimiter,
    MissingId,
    InvalidId,
    EmptyMessage,
    WellFormed,
}

/// Result of validating a document or line
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add_error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(span, message));
    }

    pub fn add_warning(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(span, message));
    }

    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Normalized duplicate-message key: trimmed and lowercased
pub fn message_key(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Classify a line. The empty-message check only applies when
/// `empty_message_warning` is enabled; otherwise such lines are well-formed.
pub fn classify_line(parsed: &ParsedLine<'_>, settings: &ValidationSettings) -> LineClass {
    match parsed {
        ParsedLine::Empty => LineClass::Empty,
        ParsedLine::Untabbed(_) => LineClass::MissingDelimiter,
        ParsedLine::Entry(entry) if entry.id.is_empty() => LineClass::MissingId,
        ParsedLine::Entry(entry) if !is_integer(entry.id) => LineClass::InvalidId,
        ParsedLine::Entry(entry)
            if settings.empty_message_warning && entry.message.trim().is_empty() =>
        {
            LineClass::EmptyMessage
        }
        ParsedLine::Entry(_) => LineClass::WellFormed,
    }
}

/// Validate a single line on its own, without duplicate detection.
///
/// `is_last` exempts a trailing empty line (the file terminator).
pub fn validate_line(
    line: &Line<'_>,
    is_last: bool,
    settings: &ValidationSettings,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    let class = classify_line(&line.parsed, settings);
    result
        .diagnostics
        .extend(line_diagnostic(line, class, is_last, settings));
    result
}

fn line_diagnostic(
    line: &Line<'_>,
    class: LineClass,
    is_last: bool,
    settings: &ValidationSettings,
) -> Option<Diagnostic> {
    let whole_line = Span::new(line.number(), 0, line.width());

    match class {
        LineClass::Empty if settings.empty_line_warning && !is_last => {
            Some(Diagnostic::warning(whole_line, EMPTY_LINE))
        }
        LineClass::Empty | LineClass::WellFormed => None,
        LineClass::MissingDelimiter => Some(Diagnostic::error(whole_line, MISSING_TAB)),
        LineClass::MissingId => Some(Diagnostic::error(id_span(line), MISSING_ID)),
        LineClass::InvalidId => Some(Diagnostic::error(id_span(line), INVALID_ID)),
        LineClass::EmptyMessage => Some(Diagnostic::warning(whole_line, EMPTY_MESSAGE)),
    }
}

/// Validate an entire document
pub fn validate_document(content: &str, settings: &ValidationSettings) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut ids = OccurrenceIndex::new();
    let mut messages = OccurrenceIndex::new();

    let lines = parser::split_lines(content);
    let last_index = lines.len().saturating_sub(1);

    for (index, text) in lines.into_iter().enumerate() {
        let line = parser::parse_line(index, text);
        let class = classify_line(&line.parsed, settings);

        if class == LineClass::WellFormed {
            record_occurrences(&line, settings, &mut ids, &mut messages);
        } else {
            result
                .diagnostics
                .extend(line_diagnostic(&line, class, index == last_index, settings));
        }
    }

    log::debug!(
        "scanned {} lines: {} distinct ids, {} distinct messages",
        last_index + 1,
        ids.len(),
        messages.len()
    );

    result.diagnostics.extend(ids.duplicates(Severity::Error));
    result.diagnostics.extend(messages.duplicates(Severity::Warning));

    result
}

fn record_occurrences(
    line: &Line<'_>,
    settings: &ValidationSettings,
    ids: &mut OccurrenceIndex,
    messages: &mut OccurrenceIndex,
) {
    let ParsedLine::Entry(entry) = line.parsed else {
        return;
    };
    let number = line.number();
    let tab_column = entry.tab_column();

    ids.record(
        entry.id,
        Occurrence::new(
            Span::new(number, 0, tab_column),
            format!("Duplicate ID: \"{}\"", entry.id),
        ),
    );

    if !settings.duplicate_message_warning {
        return;
    }

    let key = message_key(entry.message);
    if key.is_empty() {
        return;
    }

    messages.record(
        key,
        Occurrence::new(
            Span::new(number, tab_column + 1, line.width()),
            format!("Duplicate message: \"{}\"", entry.message.trim()),
        ),
    );
}

fn id_span(line: &Line<'_>) -> Span {
    let end = line.parsed.id().map(utf16_len).unwrap_or(0);
    Span::new(line.number(), 0, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ValidationSettings {
        ValidationSettings::default()
    }

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());

        result.add_warning(Span::new(0, 0, 0), "Test warning");
        assert!(result.is_valid()); // Warnings don't make it invalid

        result.add_error(Span::new(1, 0, 0), "Test error");
        assert!(!result.is_valid()); // Errors make it invalid
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_classification_order() {
        let settings = defaults();
        let classify = |text: &str| classify_line(&parser::parse_line(0, text).parsed, &settings);

        assert_eq!(classify(""), LineClass::Empty);
        assert_eq!(classify("12 hello"), LineClass::MissingDelimiter);
        assert_eq!(classify("\thello"), LineClass::MissingId);
        assert_eq!(classify("\t"), LineClass::MissingId);
        assert_eq!(classify("x1\thello"), LineClass::InvalidId);
        assert_eq!(classify("x1\t"), LineClass::InvalidId);
        assert_eq!(classify("1\t  "), LineClass::EmptyMessage);
        assert_eq!(classify("1\thello"), LineClass::WellFormed);
    }

    #[test]
    fn test_empty_message_toggle_changes_classification() {
        let settings = ValidationSettings {
            empty_message_warning: false,
            ..defaults()
        };
        let line = parser::parse_line(0, "1\t");
        assert_eq!(classify_line(&line.parsed, &settings), LineClass::WellFormed);
        assert!(validate_line(&line, false, &settings).diagnostics.is_empty());
    }

    #[test]
    fn test_validate_empty_line() {
        let line = parser::parse_line(2, "");
        let result = validate_line(&line, false, &defaults());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].message, EMPTY_LINE);
        assert_eq!(result.diagnostics[0].span, Span::new(2, 0, 0));

        assert!(validate_line(&line, true, &defaults()).is_valid());
        assert!(validate_line(&line, true, &defaults()).diagnostics.is_empty());
    }

    #[test]
    fn test_missing_tab_spans_whole_line() {
        let result = validate_line(&parser::parse_line(0, "12 hello"), false, &defaults());
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
        assert_eq!(result.diagnostics[0].message, MISSING_TAB);
        assert_eq!(result.diagnostics[0].span, Span::new(0, 0, 8));
    }

    #[test]
    fn test_duplicate_id_ignores_malformed_lines() {
        let result = validate_document("1\ta\n1\n01\tb\n1\tc\n", &defaults());
        let duplicates: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| !d.related.is_empty())
            .collect();

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].span.line, 3);
        assert_eq!(duplicates[0].related.len(), 1);
        assert_eq!(duplicates[0].related[0].span.line, 0);
    }

    #[test]
    fn test_message_keys_fold_case() {
        assert_eq!(message_key("  Hello World "), "hello world");
        assert_eq!(message_key("ÄBC"), "äbc");
    }

    #[test]
    fn test_duplicate_messages_respect_toggle() {
        let settings = ValidationSettings {
            duplicate_message_warning: false,
            ..defaults()
        };
        let result = validate_document("1\tHello\n2\tHello\n", &settings);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_whitespace_message_not_counted_as_duplicate() {
        let settings = ValidationSettings {
            empty_message_warning: false,
            ..defaults()
        };
        let result = validate_document("1\t \n2\t \n", &settings);
        assert!(result.diagnostics.is_empty());
    }
}
