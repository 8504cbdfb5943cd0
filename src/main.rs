use clap::{Parser, Subcommand};
use colored::Colorize;
use log::warn;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nexus_regress::model::Snapshot;
use nexus_regress::{regression, report, snapshot, utils::Config};

/// Config file picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "nexus-regress.yaml";

#[derive(Parser)]
#[command(name = "nexus-regress")]
#[command(author = "NL Team")]
#[command(version = "0.1.0")]
#[command(about = "Detect regressions between API test runs", long_about = None)]
struct Cli {
    /// YAML config file (defaults to ./nexus-regress.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the latest run against the saved baseline
    Compare {
        /// Results of the current run (JSON array of test results)
        #[arg(long)]
        current: PathBuf,

        /// Baseline snapshot (overrides the config file)
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Also save the summary as JSON to this path
        #[arg(short, long)]
        summary: Option<PathBuf>,

        /// Output format (text, json, junit)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when a previously passing test is missing from the current run
        #[arg(long, default_value = "false")]
        fail_on_removed: bool,
    },

    /// Manage the baseline snapshot
    Baseline {
        #[command(subcommand)]
        command: BaselineCommands,
    },

    /// Generate report from a saved regression summary
    Report {
        /// Path to summary JSON
        summary: PathBuf,

        /// Output format (text, json, junit)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum BaselineCommands {
    /// Save a run's results as the new baseline
    Save {
        /// Results to promote to baseline
        #[arg(long)]
        from: PathBuf,

        /// Baseline snapshot path (overrides the config file)
        #[arg(short, long)]
        baseline: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compare {
            current,
            baseline,
            summary,
            format,
            output,
            fail_on_removed,
        } => {
            let baseline_path = baseline.unwrap_or_else(|| config.baseline_path.clone());
            let summary_path = summary.or_else(|| config.summary_path.clone());

            // Stdout is reserved for the report itself.
            eprintln!(
                "{} Comparing {} against baseline {}",
                "▶".green().bold(),
                current.display().to_string().cyan(),
                baseline_path.display().to_string().cyan()
            );

            let Some(current_snapshot) = snapshot::load(&current, "current") else {
                anyhow::bail!("No test results found at {}", current.display());
            };

            let Some(baseline_snapshot) = snapshot::load(&baseline_path, "baseline") else {
                warn!("No usable baseline at {}", baseline_path.display());
                eprintln!(
                    "{} No baseline found; skipping regression check. Run `nexus-regress baseline save --from {}` to create one.",
                    "ℹ".blue(),
                    current.display()
                );
                return Ok(ExitCode::SUCCESS);
            };

            let summary = regression::compare_snapshots(
                &baseline_snapshot,
                &current_snapshot,
                &config.compare_options(),
            );

            if let Some(path) = &summary_path {
                snapshot::write_json(&summary, path)?;
                eprintln!("  Summary: {}", path.display().to_string().cyan());
            }

            report::write_summary(&summary, &format, output.as_deref()).await?;

            if summary.should_fail(fail_on_removed || config.fail_on_removed) {
                eprintln!(
                    "{} {} regression(s) detected",
                    "✗".red().bold(),
                    summary.regressed_tests + summary.removed_regressions
                );
                return Ok(ExitCode::FAILURE);
            }

            eprintln!("{} No regressions detected", "✓".green().bold());
        }

        Commands::Baseline { command } => match command {
            BaselineCommands::Save { from, baseline } => {
                let baseline_path = baseline.unwrap_or_else(|| config.baseline_path.clone());

                let Some(results) = snapshot::load(&from, "current") else {
                    anyhow::bail!("Cannot save baseline: no test results at {}", from.display());
                };
                let baseline_snapshot = Snapshot::new("baseline", results.results);
                snapshot::save(&baseline_snapshot, &baseline_path)?;

                eprintln!(
                    "{} Baseline saved: {} tests → {}",
                    "✅".green(),
                    baseline_snapshot.len(),
                    baseline_path.display().to_string().cyan()
                );
            }
        },

        Commands::Report {
            summary,
            format,
            output,
        } => {
            eprintln!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                summary.display()
            );
            report::generate_report(&summary, &format, output.as_deref()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Ok(Config::load(default)?)
            } else {
                Ok(Config::default())
            }
        }
    }
}
