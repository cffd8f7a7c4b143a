//! Fixed rule configuration for organization policy files.
//!
//! - `REQUIRED_KEYS`: top-level keys every policy must carry, checked in order.
//! - `CANDIDATE_EXTENSIONS`: file extensions picked up by discovery
//!   (case-sensitive).
//! - `POLICIES_DIR`: discovery root relative to the workspace.
//!
//! `Mode` selects the validation flavour; only `org` exists.

use crate::error::ValidateError;
use std::str::FromStr;

pub const REQUIRED_KEYS: [&str; 3] = ["for", "id", "name"];
pub const CANDIDATE_EXTENSIONS: [&str; 2] = ["yml", "yaml"];
pub const POLICIES_DIR: &str = "policies";
pub const ID_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported validation modes.
pub enum Mode {
    /// Organization policies under `<workspace>/policies`.
    Org,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Org => "org",
        }
    }

    /// Directory searched for candidates, relative to the workspace root.
    pub fn policies_dir(&self) -> &'static str {
        match self {
            Mode::Org => POLICIES_DIR,
        }
    }
}

impl FromStr for Mode {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org" => Ok(Mode::Org),
            other => Err(ValidateError::InvalidMode(other.to_string())),
        }
    }
}
