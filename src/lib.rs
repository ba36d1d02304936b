//! UCS Language Server
//!
//! Validation and auto-formatting for `.ucs` LOCString localization files.
//!
//! This library provides:
//! - Line parsing and validation with duplicate detection
//! - The space-to-tab formatter
//! - LSP protocol implementation
//! - Layered settings management

pub mod config;
pub mod core;
pub mod formatting;
pub mod lsp;
pub mod parser;
pub mod settings;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use formatting::{space_to_tab, SpaceInsertion, TabReplacement};
pub use parser::{is_integer, parse_line, ParsedLine};
pub use settings::{Settings, ValidationSettings};
pub use validation::{validate_document, Diagnostic, Severity};
