//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "policheck",
    version,
    about = "Validate organization policy YAML files",
    long_about = "Policheck — checks the YAML policy files under <workspace>/policies for syntax, required clauses (for, id, name), and duplicate ids.\n\nSettings precedence: CLI > environment (GitHub Actions) > policheck.toml > defaults.",
    after_help = "Examples:\n  policheck validate\n  policheck validate --workspace ../org-config --output json\n  INPUT_MODE=org GITHUB_WORKSPACE=$PWD policheck validate --output github",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current policheck version.")]
    Version,
    /// Validate policy files
    #[command(
        about = "Validate policy files",
        long_about = "Parse every .yml/.yaml file under <workspace>/policies, check required clauses and duplicate ids, and report annotations. Exits 1 when problems are found and 2 on invalid mode or missing policies directory.",
        after_help = "Examples:\n  policheck validate --mode org\n  policheck validate --output github"
    )]
    Validate {
        #[arg(long, help = "Validation mode (default: org; env INPUT_MODE)")]
        mode: Option<String>,
        #[arg(long, help = "Workspace root (default: $GITHUB_WORKSPACE or current dir)")]
        workspace: Option<String>,
        #[arg(long, help = "Output mode: github|human|json (default: github in Actions, else human)")]
        output: Option<String>,
    },
}
