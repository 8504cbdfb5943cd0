use crate::regression::{DiffKind, RegressionResult, RegressionSummary, Verdict};
use colored::Colorize;
use std::fmt::Write;

/// Render the summary as grouped console sections.
pub fn render(summary: &RegressionSummary) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, summary);
    out
}

fn write_report(out: &mut String, summary: &RegressionSummary) -> std::fmt::Result {
    writeln!(out, "{}", "Regression Summary".bold())?;
    writeln!(out, "  Total tests:  {}", summary.total_tests)?;
    writeln!(out, "  Matching:     {}", summary.matching_tests)?;
    let regressed = summary.regressed_tests.to_string();
    if summary.regressed_tests > 0 {
        writeln!(out, "  Regressed:    {}", regressed.red().bold())?;
    } else {
        writeln!(out, "  Regressed:    {}", regressed.green())?;
    }
    writeln!(out, "  Improved:     {}", summary.improved_tests)?;
    writeln!(out, "  Unchanged:    {}", summary.unchanged_tests)?;
    writeln!(out, "  New:          {}", summary.new_tests)?;
    if summary.removed_regressions > 0 {
        writeln!(
            out,
            "  Removed:      {} ({} previously passing)",
            summary.removed_tests, summary.removed_regressions
        )?;
    } else {
        writeln!(out, "  Removed:      {}", summary.removed_tests)?;
    }

    let regressions: Vec<&RegressionResult> = summary.with_verdict(Verdict::Regressed).collect();
    if !regressions.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Regression Details".red().bold())?;
        for result in regressions {
            write_regression(out, result)?;
        }
    }

    let improvements: Vec<&RegressionResult> = summary.with_verdict(Verdict::Improved).collect();
    if !improvements.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Improvements".green().bold())?;
        for result in improvements {
            writeln!(
                out,
                "  {} {}{}",
                "✓".green(),
                result.display_name(),
                status_transition(result)
                    .map(|t| format!(" ({})", t))
                    .unwrap_or_default()
            )?;
        }
    }

    let new_tests: Vec<&RegressionResult> = summary.with_verdict(Verdict::New).collect();
    if !new_tests.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "New Tests".cyan().bold())?;
        for result in new_tests {
            let outcome = if result.current_success == Some(true) {
                "passing"
            } else {
                "failing"
            };
            writeln!(out, "  {} {} ({})", "+".cyan(), result.display_name(), outcome)?;
        }
    }

    let removed: Vec<&RegressionResult> = summary.with_verdict(Verdict::Removed).collect();
    if !removed.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Removed Tests".yellow().bold())?;
        for result in removed {
            if result.is_regression {
                writeln!(
                    out,
                    "  {} {} (was passing, coverage lost)",
                    "-".red(),
                    result.display_name()
                )?;
            } else {
                writeln!(out, "  {} {} (was failing)", "-".yellow(), result.display_name())?;
            }
        }
    }

    Ok(())
}

fn write_regression(out: &mut String, result: &RegressionResult) -> std::fmt::Result {
    writeln!(out, "  {} {}", "✗".red(), result.display_name().bold())?;

    if result.baseline_success == Some(true) && result.current_success == Some(false) {
        writeln!(out, "      Outcome: passed → failed")?;
    }
    if let Some(transition) = status_transition(result) {
        writeln!(out, "      Status: {}", transition)?;
    }
    if result.schema_validation_regression {
        writeln!(out, "      Schema validation: passed → failed")?;
    }
    if !result.response_changes.is_empty() {
        writeln!(out, "      Response structure changed:")?;
        for change in &result.response_changes {
            writeln!(out, "        - {}", change.describe())?;
            if change.kind == DiffKind::Nested {
                for detail in &change.details {
                    writeln!(out, "            • {}", detail)?;
                }
            }
        }
    }

    let failed: Vec<&str> = result.failed_assertions().map(|a| a.name.as_str()).collect();
    if !failed.is_empty() {
        writeln!(out, "      Failed assertions:")?;
        for name in failed {
            writeln!(out, "        - {}", name)?;
        }
    }

    Ok(())
}

fn status_transition(result: &RegressionResult) -> Option<String> {
    match (result.baseline_status, result.current_status) {
        (Some(b), Some(c)) if result.status_code_changed => Some(format!("{} → {}", b, c)),
        _ => None,
    }
}

/// Drop terminal color codes so saved reports stay plain text.
pub(crate) fn strip_ansi(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for end in chars.by_ref() {
                if end.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}
