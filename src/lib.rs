//! Relingo - extract hardcoded UI text into translation keys
//!
//! Relingo scans widget-style UI sources for hardcoded display strings, gives
//! each a structured key in the reference language file, rewrites the source
//! to look the key up at runtime and repairs the constant expressions that the
//! rewrite invalidates. Target languages are kept in sync with stand-ins, and
//! provided translations are merged only when their placeholders match.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, commands, reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: The localization pipeline
//! - `issues`: Issue type definitions and reporting
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
