//! Localization pipeline: discovery, matching, key synthesis, the translation
//! store, source rewriting and the repair pass.
//!
//! Stages share state only through [`context::RunContext`].

pub mod classify;
pub mod code;
pub mod context;
pub mod file_scanner;
pub mod keys;
pub mod matcher;
pub mod pipeline;
pub mod repair;
pub mod rewrite;
pub mod source;
pub mod store;
pub mod summary;

pub use context::RunContext;
pub use file_scanner::{DiscoveredFile, ScanResult, scan_files};
