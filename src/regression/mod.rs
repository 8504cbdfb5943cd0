pub mod aggregator;
pub mod assertions;
pub mod classifier;
pub mod matcher;
pub mod path;
pub mod structural;
pub mod types;

use crate::model::Snapshot;
use log::{info, warn};

pub use path::{JsonPath, Segment};
pub use types::*;

/// Assertion name whose pass-to-fail flip always counts as a regression.
pub const SCHEMA_VALIDATION_ASSERTION: &str = "Schema validation";

/// Knobs for a single comparison
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    pub schema_assertion_name: String,
    /// Deepest body nesting the structural differ descends into
    pub max_diff_depth: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            schema_assertion_name: SCHEMA_VALIDATION_ASSERTION.to_string(),
            max_diff_depth: 64,
        }
    }
}

/// Compare the current run against the baseline.
///
/// `details` lists every current test in run order (matched or new),
/// followed by removed tests in baseline order.
pub fn compare_snapshots(
    baseline: &Snapshot,
    current: &Snapshot,
    options: &CompareOptions,
) -> RegressionSummary {
    let matched = matcher::match_snapshots(baseline, current);
    for collision in &matched.collisions {
        warn!(
            "{} results ({} baseline, {} current) share the key {}; pairing by scenario, then by position",
            collision.baseline_count + collision.current_count,
            collision.baseline_count,
            collision.current_count,
            collision.key
        );
    }

    let details = matched
        .current_order
        .iter()
        .map(|(baseline_result, current_result)| match baseline_result {
            Some(b) => classifier::classify_pair(b, current_result, options),
            None => classifier::classify_new(current_result),
        })
        .chain(
            matched
                .only_in_baseline
                .iter()
                .map(|removed| classifier::classify_removed(removed)),
        )
        .collect();

    let summary = aggregator::summarize(details);
    info!(
        "Compared {} current tests against {} baseline tests: {} regressed, {} improved, {} new, {} removed",
        current.len(),
        baseline.len(),
        summary.regressed_tests,
        summary.improved_tests,
        summary.new_tests,
        summary.removed_tests
    );
    summary
}
