//! Core Scheduling
//!
//! Host-independent coordination of document scans.

pub mod scheduler;

pub use scheduler::{ProgressClaim, ScanScheduler, ScanSlot};
