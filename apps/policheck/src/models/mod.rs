//! Shared data models for validation entries, issues, and count summaries.

pub mod policy;

use serde::Serialize;
use serde_yaml::Value as Yaml;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity attached to an issue. Rules only emit `Error`; `Warning` is reserved.
pub enum Status {
    Error,
    Warning,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Error => "error",
            Status::Warning => "warning",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which rule produced an issue.
pub enum IssueKind {
    Parse,
    MissingKey,
    DuplicateId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A single detected problem on a policy entry.
pub struct Issue {
    pub status: Status,
    #[serde(skip)]
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn parse_error(cause: &str) -> Self {
        Issue {
            status: Status::Error,
            kind: IssueKind::Parse,
            message: format!("YAML parse error: {}", cause),
        }
    }

    pub fn missing_key(key: &str) -> Self {
        Issue {
            status: Status::Error,
            kind: IssueKind::MissingKey,
            message: format!("Policy missing '{}' clause", key),
        }
    }

    pub fn duplicate_id(id: &str) -> Self {
        Issue {
            status: Status::Error,
            kind: IssueKind::DuplicateId,
            message: format!("Policy has duplicate id: {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Parse outcome for one candidate file.
pub enum ParsedEntry {
    Valid(Yaml),
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
/// Validation record for one candidate file.
pub struct PolicyEntry {
    pub file: String,
    pub document: ParsedEntry,
    pub issues: Vec<Issue>,
}

impl PolicyEntry {
    /// Parsed document, if the file parsed.
    pub fn document(&self) -> Option<&Yaml> {
        match &self.document {
            ParsedEntry::Valid(doc) => Some(doc),
            ParsedEntry::Invalid(_) => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.document, ParsedEntry::Invalid(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Location handed to annotation sinks.
pub struct FileRef {
    pub file: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Aggregated counts derived from the entry collection.
pub struct CountSummary {
    pub total: usize,
    pub invalid: usize,
    pub problem_policy: usize,
    pub error: usize,
    pub warning: usize,
}

impl CountSummary {
    /// Number of entries carrying any issue.
    pub fn failing_files(&self) -> usize {
        self.problem_policy + self.invalid
    }

    /// Number of problems reported in the failure message.
    pub fn problems(&self) -> usize {
        self.error + self.warning + self.invalid
    }
}
