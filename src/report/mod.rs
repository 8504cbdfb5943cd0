pub mod json;
pub mod junit;
pub mod text;

use crate::regression::RegressionSummary;
use anyhow::{Context, Result};
use std::path::Path;

/// Report body in the requested format
pub fn render(summary: &RegressionSummary, format: &str) -> Result<String> {
    match format {
        "text" => Ok(text::render(summary)),
        "json" => json::render(summary),
        "junit" => junit::render(summary),
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Print the report to stdout or save it to `output`.
///
/// Stdout only ever carries the report body, so `--format json` can be piped
/// straight into other tools. Status lines go to stderr.
pub async fn write_summary(
    summary: &RegressionSummary,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let report = render(summary, format)?;

    match output {
        Some(path) => {
            let content = if format == "text" {
                text::strip_ansi(&report)
            } else {
                report
            };
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Report saved to: {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(())
}

/// Generate report from a persisted regression summary
pub async fn generate_report(summary_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let content = tokio::fs::read_to_string(summary_path)
        .await
        .with_context(|| format!("reading {}", summary_path.display()))?;
    let summary: RegressionSummary = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a regression summary", summary_path.display()))?;

    write_summary(&summary, format, output).await
}
