use crate::model::{Snapshot, TestKey, TestResult};
use std::collections::{HashMap, HashSet};

/// Baseline and current results partitioned by logical test identity.
#[derive(Debug, Default)]
pub struct MatchedSnapshots<'a> {
    /// Tests in current-run order, each with its baseline partner if any
    pub current_order: Vec<(Option<&'a TestResult>, &'a TestResult)>,
    /// Tests that only exist in the baseline, in baseline order
    pub only_in_baseline: Vec<&'a TestResult>,
    /// Keys shared by more than one result on either side, in snapshot order
    pub collisions: Vec<KeyCollision>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: TestKey,
    pub baseline_count: usize,
    pub current_count: usize,
}

/// Pair baseline and current results by `method:endpoint`.
///
/// Several results may share one key (distinct scenarios against the same
/// endpoint). Those are grouped: entries with the same scenario name pair up
/// first, then leftovers pair by position as long as one of the two has no
/// scenario name. Anything left after that is new or removed.
pub fn match_snapshots<'a>(baseline: &'a Snapshot, current: &'a Snapshot) -> MatchedSnapshots<'a> {
    let baseline_groups = group_by_key(baseline);
    let current_groups = group_by_key(current);

    // partner[i] is the baseline partner of current.results[i]
    let mut partner: Vec<Option<&TestResult>> = vec![None; current.len()];
    let mut baseline_used = vec![false; baseline.len()];

    for (key, current_group) in &current_groups {
        let Some(baseline_group) = baseline_groups.get(key) else {
            continue;
        };
        let pairs = pair_group(baseline, current, baseline_group, current_group);
        for (current_idx, baseline_idx) in pairs {
            partner[current_idx] = Some(&baseline.results[baseline_idx]);
            baseline_used[baseline_idx] = true;
        }
    }

    let only_in_baseline = baseline
        .results
        .iter()
        .zip(baseline_used)
        .filter(|(_, used)| !used)
        .map(|(r, _)| r)
        .collect();

    MatchedSnapshots {
        current_order: partner.into_iter().zip(current.results.iter()).collect(),
        only_in_baseline,
        collisions: collisions(baseline, current, &baseline_groups, &current_groups),
    }
}

/// Indices of results per test key, in snapshot order
fn group_by_key(snapshot: &Snapshot) -> HashMap<TestKey, Vec<usize>> {
    let mut groups: HashMap<TestKey, Vec<usize>> = HashMap::new();
    for (idx, result) in snapshot.iter().enumerate() {
        groups.entry(result.test_key()).or_default().push(idx);
    }
    groups
}

/// Keys with several results on either side. Current-run keys come first,
/// then baseline-only keys, each in the order they first appear.
fn collisions(
    baseline: &Snapshot,
    current: &Snapshot,
    baseline_groups: &HashMap<TestKey, Vec<usize>>,
    current_groups: &HashMap<TestKey, Vec<usize>>,
) -> Vec<KeyCollision> {
    let mut seen = HashSet::new();
    current
        .iter()
        .chain(baseline.iter())
        .map(TestResult::test_key)
        .filter(|key| seen.insert(key.clone()))
        .filter_map(|key| {
            let baseline_count = baseline_groups.get(&key).map_or(0, Vec::len);
            let current_count = current_groups.get(&key).map_or(0, Vec::len);
            (baseline_count > 1 || current_count > 1).then_some(KeyCollision {
                key,
                baseline_count,
                current_count,
            })
        })
        .collect()
}

/// Pair one key's baseline and current entries. Returns `(current_idx, baseline_idx)`.
fn pair_group(
    baseline: &Snapshot,
    current: &Snapshot,
    baseline_group: &[usize],
    current_group: &[usize],
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut baseline_free: Vec<usize> = baseline_group.to_vec();
    let mut current_free = Vec::new();

    for &current_idx in current_group {
        let scenario = current.results[current_idx].scenario.as_deref();
        let same_scenario = scenario.and_then(|name| {
            baseline_free
                .iter()
                .position(|&b| baseline.results[b].scenario.as_deref() == Some(name))
        });
        match same_scenario {
            Some(pos) => pairs.push((current_idx, baseline_free.remove(pos))),
            None => current_free.push(current_idx),
        }
    }

    // Two different scenario names are two different tests.
    for current_idx in current_free {
        let named = current.results[current_idx].scenario.is_some();
        let partner = baseline_free
            .iter()
            .position(|&b| !named || baseline.results[b].scenario.is_none());
        if let Some(pos) = partner {
            pairs.push((current_idx, baseline_free.remove(pos)));
        }
    }

    pairs
}
