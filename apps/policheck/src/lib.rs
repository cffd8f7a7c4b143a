//! Policheck core library.
//!
//! Validates organization policy files (YAML) under `<workspace>/policies`
//! and reports problems as file annotations.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Effective settings from flags, environment, and config file.
//! - `validate`: Discovery, parsing, rule passes, and count summary.
//! - `report`: Pass/fail narrative and per-issue annotations.
//! - `output`: GitHub workflow-command, human, and JSON sinks.
//! - `models`: Entries, issues, summaries, and fixed rule constants.
//! - `error`: Fatal run errors.
//! - `utils`: Console helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod report;
pub mod utils;
pub mod validate;
