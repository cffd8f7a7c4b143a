//! Fatal errors that abort a validation run before any report is produced.
//!
//! Per-file problems are never errors here; they are recorded as issues.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("Invalid validation mode: {0}")]
    InvalidMode(String),
    #[error("Policy directory not found: {}", .0.display())]
    MissingRoot(PathBuf),
}

impl ValidateError {
    /// Process exit code used by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
