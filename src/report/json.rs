use crate::regression::RegressionSummary;
use anyhow::Result;

/// Pretty JSON summary, the same shape `compare --summary` saves
pub fn render(summary: &RegressionSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
