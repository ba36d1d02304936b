//! Duplicate aggregation
//!
//! Occurrences of the same key are collected during the forward scan and
//! merged into one diagnostic per key once the scan is done. The last
//! occurrence becomes the visible diagnostic, all earlier ones are attached
//! as related information.

use indexmap::IndexMap;

use super::diagnostic::{Diagnostic, RelatedInformation, Severity, Span};

/// One recorded occurrence of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub span: Span,
    pub message: String,
}

impl Occurrence {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Merge the occurrences of one key into a single diagnostic.
///
/// Returns `None` unless there are at least two occurrences.
pub fn combine_occurrences(occurrences: &[Occurrence], severity: Severity) -> Option<Diagnostic> {
    let (primary, earlier) = occurrences.split_last()?;
    if earlier.is_empty() {
        return None;
    }

    Some(Diagnostic {
        span: primary.span,
        message: primary.message.clone(),
        severity,
        related: earlier
            .iter()
            .map(|occurrence| RelatedInformation {
                span: occurrence.span,
                message: occurrence.message.clone(),
            })
            .collect(),
    })
}

/// Occurrences grouped by normalized key, in first-seen key order
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    entries: IndexMap<String, Vec<Occurrence>>,
}

impl OccurrenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: impl Into<String>, occurrence: Occurrence) {
        self.entries.entry(key.into()).or_default().push(occurrence);
    }

    pub fn get(&self, key: &str) -> Option<&[Occurrence]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One combined diagnostic per key seen more than once
    pub fn duplicates(&self, severity: Severity) -> impl Iterator<Item = Diagnostic> + '_ {
        self.entries
            .values()
            .filter_map(move |occurrences| combine_occurrences(occurrences, severity))
    }
}
