//! Pass/fail narrative and per-issue annotations for a validation run.
//!
//! `report` writes narrative lines through a `Narrator`, forwards every issue
//! to an `Annotator`, and returns the outcome. It never exits the process;
//! the binary maps `ReportOutcome::Failed` to a non-zero exit code.

use crate::models::{CountSummary, FileRef, PolicyEntry, Status};

/// Receives human-readable summary lines.
pub trait Narrator {
    fn narrate(&mut self, line: &str);
}

impl<F: FnMut(&str)> Narrator for F {
    fn narrate(&mut self, line: &str) {
        self(line)
    }
}

/// Receives one annotation per issue.
pub trait Annotator {
    fn annotate(&mut self, status: Status, location: &FileRef, message: &str);
}

impl<F: FnMut(Status, &FileRef, &str)> Annotator for F {
    fn annotate(&mut self, status: Status, location: &FileRef, message: &str) {
        self(status, location, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Passed,
    Failed(String),
}

impl ReportOutcome {
    pub fn failure(&self) -> Option<&str> {
        match self {
            ReportOutcome::Passed => None,
            ReportOutcome::Failed(m) => Some(m.as_str()),
        }
    }
}

/// Emit the narrative and annotations for `entries`.
pub fn report(
    entries: &[PolicyEntry],
    summary: &CountSummary,
    narrate: &mut dyn Narrator,
    annotate: &mut dyn Annotator,
) -> ReportOutcome {
    narrate.narrate(&format!(
        "Checked {}.",
        plural_string(summary.total, "potential policy file")
    ));
    let outcome = if summary.failing_files() == 0 {
        narrate.narrate("Everything looks good.");
        ReportOutcome::Passed
    } else {
        let clause = if summary.problem_policy > 0 {
            format!(
                "{} with {} and {}.",
                plural_string(summary.problem_policy, "file"),
                plural_string(summary.error, "error"),
                plural_string(summary.warning, "warning")
            )
        } else {
            "0 files with errors or warnings.".to_string()
        };
        narrate.narrate(&format!(
            "Found {} and {}",
            plural_string(summary.invalid, "invalid YAML file"),
            clause
        ));
        ReportOutcome::Failed(format!(
            "Found {} in {}.",
            plural_string(summary.problems(), "problem"),
            plural_string(summary.total, "potential policy file")
        ))
    };

    for entry in entries {
        let location = FileRef {
            file: entry.file.clone(),
        };
        for issue in &entry.issues {
            annotate.annotate(issue.status, &location, &issue.message);
        }
    }
    outcome
}

/// `"<count> <noun>"`, pluralized unless `count == 1`.
pub fn plural_string(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
