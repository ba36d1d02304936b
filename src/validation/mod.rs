//! Validation Engine
//!
//! Clean separation of validation logic from parsing and LSP concerns.

pub mod aggregate;
pub mod diagnostic;
pub mod engine;

pub use aggregate::{combine_occurrences, Occurrence, OccurrenceIndex};
pub use diagnostic::{Diagnostic, RelatedInformation, Severity, Span};
pub use engine::{classify_line, validate_document, validate_line, LineClass};

// Re-export common types
pub use engine::ValidationResult;
