//! LSP Protocol Implementation
//!
//! The host runtime: wires editor events to the validator and formatter.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod progress;
pub mod server;

pub use backend::Backend;
