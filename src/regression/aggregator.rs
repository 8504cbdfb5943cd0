use super::types::{RegressionResult, RegressionSummary, Verdict};

/// Tally classified results into a summary, keeping `details` in the given order.
pub fn summarize(details: Vec<RegressionResult>) -> RegressionSummary {
    let counted = details
        .iter()
        .fold(RegressionSummary::default(), |mut summary, result| {
            match result.verdict {
                Verdict::Regressed => summary.regressed_tests += 1,
                Verdict::Improved => summary.improved_tests += 1,
                Verdict::Unchanged => summary.unchanged_tests += 1,
                Verdict::New => summary.new_tests += 1,
                Verdict::Removed => {
                    summary.removed_tests += 1;
                    if result.is_regression {
                        summary.removed_regressions += 1;
                    }
                }
            }
            summary
        });

    let matching_tests = counted.regressed_tests + counted.improved_tests + counted.unchanged_tests;

    RegressionSummary {
        total_tests: matching_tests + counted.new_tests,
        matching_tests,
        details,
        ..counted
    }
}
