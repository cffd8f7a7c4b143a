//! Configuration discovery and effective settings resolution.
//!
//! Policheck reads an optional `policheck.toml|yaml|yml` from the workspace
//! root and merges it with CLI flags and the GitHub Actions environment.
//! Defaults:
//! - `mode`: `org` (env `INPUT_MODE` when running as an action)
//! - `workspace`: env `GITHUB_WORKSPACE`, else the current directory
//! - `output`: `github` when `GITHUB_ACTIONS=true`, else `human`
//!
//! Precedence for mode: CLI > environment > config file > default.
//! Precedence for output: CLI > config file > environment > default.

use crate::output::OutputMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODE: &str = "org";

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `policheck.toml|yaml`.
pub struct PolicheckConfig {
    pub mode: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Whether a config file was used for this run.
pub enum ConfigStatus {
    Missing,
    Loaded(PathBuf),
    /// The file exists but could not be read or parsed; defaults apply.
    Unreadable(PathBuf),
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the binary after applying precedence.
pub struct Effective {
    pub workspace: PathBuf,
    pub mode: String,
    pub output: OutputMode,
    pub config: ConfigStatus,
}

/// First of `policheck.toml`, `policheck.yaml`, `policheck.yml` present in `root`.
pub fn config_path(root: &Path) -> Option<PathBuf> {
    ["policheck.toml", "policheck.yaml", "policheck.yml"]
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

/// Load `PolicheckConfig` from `policheck.toml` or `policheck.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<PolicheckConfig> {
    let path = config_path(root)?;
    let s = fs::read_to_string(&path).ok()?;
    if path.extension().and_then(|e| e.to_str()) == Some("toml") {
        toml::from_str(&s).ok()
    } else {
        serde_yaml::from_str(&s).ok()
    }
}

/// Resolve `Effective` from CLI flags and the process environment.
pub fn resolve_effective(
    cli_mode: Option<&str>,
    cli_workspace: Option<&str>,
    cli_output: Option<&str>,
) -> Effective {
    resolve_effective_with(cli_mode, cli_workspace, cli_output, |k| {
        std::env::var(k).ok()
    })
}

/// Same as `resolve_effective`, with an explicit environment lookup.
pub fn resolve_effective_with<E>(
    cli_mode: Option<&str>,
    cli_workspace: Option<&str>,
    cli_output: Option<&str>,
    env: E,
) -> Effective
where
    E: Fn(&str) -> Option<String>,
{
    // Empty workspace means the current directory
    let workspace = PathBuf::from(
        cli_workspace
            .map(|s| s.to_string())
            .or_else(|| env("GITHUB_WORKSPACE"))
            .unwrap_or_default(),
    );
    let loaded = load_config(&workspace);
    let config = match (config_path(&workspace), loaded.is_some()) {
        (None, _) => ConfigStatus::Missing,
        (Some(p), true) => ConfigStatus::Loaded(p),
        (Some(p), false) => ConfigStatus::Unreadable(p),
    };
    let cfg = loaded.unwrap_or_default();

    let mode = cli_mode
        .map(|s| s.to_string())
        .or_else(|| env("INPUT_MODE").filter(|m| !m.trim().is_empty()))
        .or(cfg.mode)
        .unwrap_or_else(|| DEFAULT_MODE.to_string());

    let in_actions = env("GITHUB_ACTIONS").as_deref() == Some("true");
    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .and_then(|s| OutputMode::parse(&s))
        .unwrap_or(if in_actions {
            OutputMode::Github
        } else {
            OutputMode::Human
        });

    Effective {
        workspace,
        mode,
        output,
        config,
    }
}
