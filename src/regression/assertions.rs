use super::types::AssertionDiff;
use crate::model::AssertionOutcome;
use std::collections::{HashMap, HashSet};

/// Compare named assertion outcomes between baseline and current.
///
/// An assertion missing on one side counts as failed on that side. Output
/// order: flips of assertions present on both sides (baseline order), then
/// current-only assertions, then baseline-only ones.
pub fn diff_assertions(
    baseline: &[AssertionOutcome],
    current: &[AssertionOutcome],
) -> Vec<AssertionDiff> {
    let baseline_map = outcomes(baseline);
    let current_map = outcomes(current);
    let mut diffs = Vec::new();

    for name in unique_names(baseline) {
        if let (Some(&was), Some(&now)) = (baseline_map.get(name), current_map.get(name)) {
            if was != now {
                diffs.push(assertion_diff(name, was, now));
            }
        }
    }

    for name in unique_names(current) {
        if !baseline_map.contains_key(name) {
            diffs.push(assertion_diff(name, false, current_map[name]));
        }
    }

    for name in unique_names(baseline) {
        if !current_map.contains_key(name) {
            diffs.push(assertion_diff(name, baseline_map[name], false));
        }
    }

    diffs
}

/// Name to outcome. A repeated name keeps its last outcome.
fn outcomes(assertions: &[AssertionOutcome]) -> HashMap<&str, bool> {
    assertions
        .iter()
        .map(|a| (a.name.as_str(), a.success))
        .collect()
}

fn unique_names(assertions: &[AssertionOutcome]) -> Vec<&str> {
    let mut seen = HashSet::new();
    assertions
        .iter()
        .map(|a| a.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

fn assertion_diff(name: &str, baseline_success: bool, current_success: bool) -> AssertionDiff {
    AssertionDiff {
        name: name.to_string(),
        baseline_success,
        current_success,
    }
}
