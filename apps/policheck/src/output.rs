//! Output sinks for validation reports.
//!
//! Three modes:
//! - `github`: workflow commands (`::error file=...::message`) that GitHub
//!   Actions turns into file annotations; narrative as plain lines.
//! - `human` (default): colored console lines.
//! - `json`: a single document with policies, summary, narrative and failure.

use crate::models::{CountSummary, FileRef, PolicyEntry, Status};
use crate::report::{Annotator, Narrator, ReportOutcome};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Github,
    Human,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Some(OutputMode::Github),
            "human" => Some(OutputMode::Human),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

/// Console sink used by the binary. JSON mode buffers until `finish`.
///
/// Everything except the human-mode failure line goes to `out`; colors are
/// only used when writing to stdout.
pub struct Printer<W: Write = io::Stdout> {
    mode: OutputMode,
    color: bool,
    narrative: Vec<String>,
    out: W,
}

impl Printer {
    pub fn new(mode: OutputMode) -> Self {
        Printer {
            mode,
            color: mode == OutputMode::Human && utils::colors_enabled(),
            narrative: Vec::new(),
            out: io::stdout(),
        }
    }
}

impl<W: Write> Printer<W> {
    pub fn with_writer(mode: OutputMode, out: W) -> Self {
        Printer {
            mode,
            color: false,
            narrative: Vec::new(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    /// Print the failure signal, or the buffered JSON document.
    pub fn finish(&mut self, entries: &[PolicyEntry], summary: &CountSummary, outcome: &ReportOutcome) {
        match self.mode {
            OutputMode::Json => {
                let out = compose_report_json(entries, summary, &self.narrative, outcome);
                self.line(&serde_json::to_string_pretty(&out).unwrap());
            }
            _ => {
                if let Some(msg) = outcome.failure() {
                    self.fail(msg);
                }
            }
        }
    }

    /// Failure signal for a run that was aborted or found problems.
    pub fn fail(&mut self, message: &str) {
        match self.mode {
            OutputMode::Github => self.line(&workflow_command("error", &[], message)),
            OutputMode::Human => eprintln!("{} {}", utils::error_prefix(), message),
            OutputMode::Json => {
                self.line(&serde_json::to_string_pretty(&json!({ "error": message })).unwrap())
            }
        }
    }
}

impl<W: Write> Narrator for Printer<W> {
    fn narrate(&mut self, line: &str) {
        match self.mode {
            OutputMode::Json => self.narrative.push(line.to_string()),
            OutputMode::Human if self.color => self.line(&line.bold().to_string()),
            _ => self.line(line),
        }
    }
}

impl<W: Write> Annotator for Printer<W> {
    fn annotate(&mut self, status: Status, location: &FileRef, message: &str) {
        match self.mode {
            // Issues are already part of the JSON document.
            OutputMode::Json => {}
            OutputMode::Github => {
                let cmd =
                    workflow_command(status.as_str(), &[("file", location.file.as_str())], message);
                self.line(&cmd)
            }
            OutputMode::Human => {
                let text = human_line(status, location, message, self.color);
                self.line(&text)
            }
        }
    }
}

fn human_line(status: Status, location: &FileRef, message: &str, color: bool) -> String {
    if !color {
        let (icon, sev) = match status {
            Status::Error => ("✖", "⟦error⟧"),
            Status::Warning => ("▲", "⟦warn⟧"),
        };
        return format!("{} {} {} — {}", icon, sev, location.file, message);
    }
    let (icon, sev) = match status {
        Status::Error => ("✖".red().to_string(), "⟦error⟧".red().bold().to_string()),
        Status::Warning => ("▲".yellow().to_string(), "⟦warn⟧".yellow().bold().to_string()),
    };
    format!("{} {} {} — {}", icon, sev, location.file.bold(), message)
}

/// Render a GitHub Actions workflow command.
pub fn workflow_command(command: &str, properties: &[(&str, &str)], message: &str) -> String {
    let mut out = format!("::{}", command);
    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape_property(v)))
            .collect();
        out.push(' ');
        out.push_str(&props.join(","));
    }
    out.push_str("::");
    out.push_str(&escape_data(message));
    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Compose the JSON report object (pure) for testing/snapshot purposes.
pub fn compose_report_json(
    entries: &[PolicyEntry],
    summary: &CountSummary,
    narrative: &[String],
    outcome: &ReportOutcome,
) -> JsonVal {
    let policies: Vec<_> = entries
        .iter()
        .map(|e| {
            json!({
                "file": e.file,
                "valid": !e.is_invalid(),
                "issues": e.issues,
            })
        })
        .collect();
    json!({
        "policies": policies,
        "summary": summary,
        "narrative": narrative,
        "failure": outcome.failure(),
    })
}
