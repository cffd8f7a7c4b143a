//! Policheck CLI binary entry point.
//! Resolves settings, runs validation, and prints the report.

use clap::Parser;
use policheck::cli::{Cli, Commands};
use policheck::output::{OutputMode, Printer};
use policheck::report::{report, ReportOutcome};
use policheck::{config, utils, validate};

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            mode,
            workspace,
            output,
        } => {
            let eff = config::resolve_effective(
                mode.as_deref(),
                workspace.as_deref(),
                output.as_deref(),
            );
            if eff.output == OutputMode::Human {
                match &eff.config {
                    config::ConfigStatus::Missing => eprintln!(
                        "{} {}",
                        utils::note_prefix(),
                        "No policheck.toml found; using defaults."
                    ),
                    config::ConfigStatus::Unreadable(p) => eprintln!(
                        "{} {}",
                        utils::note_prefix(),
                        format!("Could not parse {}; using defaults.", p.to_string_lossy())
                    ),
                    config::ConfigStatus::Loaded(_) => {}
                }
            }
            let mut printer = Printer::new(eff.output);
            let run = match validate::validate(&eff.mode, &eff.workspace) {
                Ok(run) => run,
                Err(e) => {
                    printer.fail(&e.to_string());
                    std::process::exit(e.exit_code());
                }
            };
            if eff.output != OutputMode::Json {
                eprintln!(
                    "{} {}",
                    utils::info_prefix(),
                    format!(
                        "Validating {} policies in: {}",
                        run.mode.as_str(),
                        run.root.to_string_lossy()
                    )
                );
            }
            let summary = run.summary();
            let mut annotator = Printer::new(eff.output);
            let outcome = report(&run.entries, &summary, &mut printer, &mut annotator);
            printer.finish(&run.entries, &summary, &outcome);
            if let ReportOutcome::Failed(_) = outcome {
                std::process::exit(1);
            }
        }
    }
}
