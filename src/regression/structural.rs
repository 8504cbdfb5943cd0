//! Shape comparison of response bodies.
//!
//! Only structure is compared: object keys, value kinds, and the shape of
//! the first array element. Values of the same kind are never compared, so
//! churn in timestamps or generated ids does not show up as a change.

use super::path::{JsonPath, Segment};
use super::types::{DiffKind, ResponseDiff};
use crate::model::JsonValue;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Compare two response bodies and list every structural difference.
///
/// Identical bodies short-circuit to no differences. Recursion stops at
/// `max_depth`; anything deeper is reported as unchanged.
pub fn diff_bodies(baseline: &JsonValue, current: &JsonValue, max_depth: usize) -> Vec<ResponseDiff> {
    if baseline == current {
        return Vec::new();
    }

    let mut differ = StructuralDiffer {
        path: Vec::new(),
        max_depth,
        changes: Vec::new(),
    };
    differ.diff(baseline, current);
    differ.changes
}

struct StructuralDiffer {
    path: Vec<Segment>,
    max_depth: usize,
    changes: Vec<ResponseDiff>,
}

impl StructuralDiffer {
    fn diff(&mut self, baseline: &JsonValue, current: &JsonValue) {
        if self.path.len() > self.max_depth {
            warn!(
                "Structural diff stopped at {}: deeper than {} levels",
                JsonPath::from(self.path.as_slice()),
                self.max_depth
            );
            return;
        }

        match (baseline, current) {
            (JsonValue::Null, JsonValue::Null) => {}
            (JsonValue::Null, _) | (_, JsonValue::Null) => {
                let kind = DiffKind::NullChanged {
                    from: baseline.kind(),
                    to: current.kind(),
                };
                self.record(kind, Some(baseline), Some(current));
            }
            (JsonValue::Array(b), JsonValue::Array(c)) => {
                // Arrays are assumed homogeneous: the first element stands for all of them.
                if let (Some(b_first), Some(c_first)) = (b.first(), c.first()) {
                    self.path.push(Segment::Index(0));
                    self.diff(b_first, c_first);
                    self.path.pop();
                }
            }
            (JsonValue::Object(b), JsonValue::Object(c)) => self.diff_objects(b, c),
            _ if baseline.kind() != current.kind() => {
                let kind = DiffKind::TypeChanged {
                    from: baseline.kind(),
                    to: current.kind(),
                };
                self.record(kind, Some(baseline), Some(current));
            }
            _ => {}
        }
    }

    fn diff_objects(&mut self, baseline: &[(String, JsonValue)], current: &[(String, JsonValue)]) {
        let current_map: HashMap<&str, &JsonValue> =
            current.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let baseline_keys: HashSet<&str> = baseline.iter().map(|(k, _)| k.as_str()).collect();

        for (key, value) in baseline {
            if !current_map.contains_key(key.as_str()) {
                self.path.push(Segment::Key(key.clone()));
                self.record(DiffKind::Removed, Some(value), None);
                self.path.pop();
            }
        }

        for (key, value) in current {
            if !baseline_keys.contains(key.as_str()) {
                self.path.push(Segment::Key(key.clone()));
                self.record(DiffKind::Added, None, Some(value));
                self.path.pop();
            }
        }

        for (key, b_value) in baseline {
            if let Some(c_value) = current_map.get(key.as_str()) {
                self.path.push(Segment::Key(key.clone()));
                self.diff(b_value, c_value);
                self.path.pop();
            }
        }
    }

    fn record(&mut self, kind: DiffKind, baseline: Option<&JsonValue>, current: Option<&JsonValue>) {
        let path = JsonPath::from(self.path.as_slice());
        self.changes.push(ResponseDiff::new(path, kind, baseline, current));
    }
}

/// Group flat differences under their top-level field for reporting.
///
/// A change that sits directly on a top-level field (or the body root) is
/// kept as is. Changes deeper inside one field are folded into a single
/// `Nested` entry whose `details` list each sub-difference relative to it.
pub fn group_by_field(
    changes: Vec<ResponseDiff>,
    baseline: &JsonValue,
    current: &JsonValue,
) -> Vec<ResponseDiff> {
    let mut grouped: Vec<ResponseDiff> = Vec::new();

    for change in changes {
        if change.path.len() <= 1 {
            grouped.push(change);
            continue;
        }

        let head = change.path.head();
        let relative = ResponseDiff {
            path: change.path.tail(),
            ..change
        };
        let detail = relative.describe();

        match grouped
            .iter_mut()
            .find(|g| g.kind == DiffKind::Nested && g.path == head)
        {
            Some(group) => group.details.push(detail),
            None => {
                let mut group = ResponseDiff::new(
                    head.clone(),
                    DiffKind::Nested,
                    lookup(baseline, &head),
                    lookup(current, &head),
                );
                group.details.push(detail);
                grouped.push(group);
            }
        }
    }

    grouped
}

fn lookup<'a>(value: &'a JsonValue, path: &JsonPath) -> Option<&'a JsonValue> {
    path.segments()
        .iter()
        .try_fold(value, |node, segment| match (segment, node) {
            (Segment::Key(key), _) => node.get(key),
            (Segment::Index(i), JsonValue::Array(items)) => items.get(*i),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JsonKind;
    use serde_json::json;

    fn body(value: serde_json::Value) -> JsonValue {
        JsonValue::from(value)
    }

    fn diff(b: serde_json::Value, c: serde_json::Value) -> Vec<ResponseDiff> {
        diff_bodies(&body(b), &body(c), 64)
    }

    fn rendered(changes: &[ResponseDiff]) -> Vec<String> {
        changes.iter().map(ResponseDiff::describe).collect()
    }

    #[test]
    fn test_identical_bodies_have_no_diff() {
        assert!(diff(json!({"a": [1, 2]}), json!({"a": [1, 2]})).is_empty());
    }

    #[test]
    fn test_value_changes_are_ignored() {
        let changes = diff(
            json!({"id": 1, "createdAt": "2024-01-01", "active": true}),
            json!({"id": 2, "createdAt": "2025-06-30", "active": false}),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_removed_key() {
        let changes = diff(json!({"id": 1, "name": "Alice"}), json!({"id": 1}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path.to_string(), "name");
        assert_eq!(changes[0].kind, DiffKind::Removed);
        assert_eq!(
            changes[0].describe(),
            "name: removed (was present in baseline)"
        );
        assert_eq!(changes[0].baseline_value, Some(body(json!("Alice"))));
        assert_eq!(changes[0].current_value, None);
    }

    #[test]
    fn test_added_key_in_first_array_element() {
        let changes = diff(json!([{"a": 1}]), json!([{"a": 1, "b": 2}]));
        assert_eq!(rendered(&changes), vec!["[0].b: added (not present in baseline)"]);
    }

    #[test]
    fn test_only_first_array_element_is_inspected() {
        let changes = diff(json!([{"a": 1}, {"a": 1}]), json!([{"a": 1}, {"z": true}]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_empty_arrays_yield_nothing() {
        assert!(diff(json!({"items": []}), json!({"items": [{"id": 1}]})).is_empty());
        assert!(diff(json!([{"id": 1}]), json!([])).is_empty());
    }

    #[test]
    fn test_type_change_does_not_recurse() {
        let changes = diff(json!({"owner": {"id": 1}}), json!({"owner": [{"id": "1"}]}));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].kind,
            DiffKind::TypeChanged {
                from: JsonKind::Object,
                to: JsonKind::Array
            }
        );
        assert_eq!(changes[0].describe(), "owner: type changed from object to array");
    }

    #[test]
    fn test_null_transitions() {
        let changes = diff(json!({"deletedAt": null}), json!({"deletedAt": "2024-01-01"}));
        assert_eq!(rendered(&changes), vec!["deletedAt: changed from null to string"]);

        let changes = diff(json!({"owner": {"id": 1}}), json!({"owner": null}));
        assert_eq!(rendered(&changes), vec!["owner: changed from object to null"]);

        let changes = diff(json!(null), json!({"id": 1}));
        assert_eq!(rendered(&changes), vec!["changed from null to object"]);
    }

    #[test]
    fn test_null_on_both_sides_is_unchanged() {
        let changes = diff(json!({"a": null, "b": 1}), json!({"a": null, "c": 1}));
        assert_eq!(
            rendered(&changes),
            vec![
                "b: removed (was present in baseline)",
                "c: added (not present in baseline)",
            ]
        );
        assert!(diff(json!([{"parent": null}]), json!([{"parent": null}])).is_empty());
    }

    #[test]
    fn test_nested_paths_and_order() {
        let changes = diff(
            json!({"user": {"id": 1, "address": {"city": "Hanoi"}}, "legacy": 1}),
            json!({"user": {"id": "1", "address": {"city": "Hanoi", "zip": "100000"}}, "next": 2}),
        );
        assert_eq!(
            rendered(&changes),
            vec![
                "legacy: removed (was present in baseline)",
                "next: added (not present in baseline)",
                "user.id: type changed from number to string",
                "user.address.zip: added (not present in baseline)",
            ]
        );
    }

    #[test]
    fn test_depth_limit_stops_recursion() {
        let b = body(json!({"a": {"b": {"c": 1}}}));
        let c = body(json!({"a": {"b": {"c": "1"}}}));
        assert!(diff_bodies(&b, &c, 1).is_empty());
        assert_eq!(diff_bodies(&b, &c, 3).len(), 1);
    }

    #[test]
    fn test_group_by_field() {
        let b = body(json!({"user": {"id": 1, "tags": ["x"]}, "legacy": 1}));
        let c = body(json!({"user": {"id": "1", "tags": [1], "role": "admin"}}));
        let grouped = group_by_field(diff_bodies(&b, &c, 64), &b, &c);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].path.to_string(), "legacy");
        assert_eq!(grouped[0].kind, DiffKind::Removed);

        assert_eq!(grouped[1].path.to_string(), "user");
        assert_eq!(grouped[1].kind, DiffKind::Nested);
        assert_eq!(
            grouped[1].details,
            vec![
                "role: added (not present in baseline)",
                "id: type changed from number to string",
                "tags[0]: type changed from string to number",
            ]
        );
        assert_eq!(grouped[1].baseline_value, b.get("user").cloned());
    }
}
