use super::assertions::diff_assertions;
use super::structural::{diff_bodies, group_by_field};
use super::types::{RegressionResult, Verdict};
use super::CompareOptions;
use crate::model::TestResult;
use log::debug;

/// Losing a 2xx, or a new 5xx where there was none.
pub fn is_status_regression(baseline: u16, current: u16) -> bool {
    let was_success = (200..300).contains(&baseline);
    let is_success = (200..300).contains(&current);
    (was_success && !is_success) || (baseline < 500 && current >= 500)
}

/// Compare a baseline result with its current-run counterpart.
pub fn classify_pair(
    baseline: &TestResult,
    current: &TestResult,
    options: &CompareOptions,
) -> RegressionResult {
    let baseline_status = baseline.status_code();
    let current_status = current.status_code();

    let (status_code_changed, status_regression) = match (baseline_status, current_status) {
        (Some(b), Some(c)) if b != c => (true, is_status_regression(b, c)),
        _ => (false, false),
    };

    let response_changes = match (baseline.body(), current.body()) {
        (Some(b), Some(c)) => group_by_field(diff_bodies(b, c, options.max_diff_depth), b, c),
        _ => Vec::new(),
    };

    let assertion_changes = diff_assertions(&baseline.assertions, &current.assertions);

    let schema_validation_regression = baseline
        .assertion(&options.schema_assertion_name)
        .is_some_and(|a| a.success)
        && current
            .assertion(&options.schema_assertion_name)
            .is_some_and(|a| !a.success);

    let lost_success = baseline.success && !current.success;
    let structural_regression = !response_changes.is_empty();

    let is_regression =
        lost_success || status_regression || schema_validation_regression || structural_regression;

    let verdict = if is_regression {
        Verdict::Regressed
    } else if !baseline.success && current.success {
        Verdict::Improved
    } else {
        Verdict::Unchanged
    };

    debug!(
        "{} -> {:?} (lost_success={}, status={}, schema={}, structural={})",
        current.test_key(),
        verdict,
        lost_success,
        status_regression,
        schema_validation_regression,
        structural_regression
    );

    RegressionResult {
        id: current.id.clone(),
        method: current.method.clone(),
        endpoint: current.endpoint.clone(),
        scenario: current.scenario.clone(),
        verdict,
        baseline_success: Some(baseline.success),
        current_success: Some(current.success),
        status_code_changed,
        baseline_status,
        current_status,
        response_changed: !response_changes.is_empty(),
        response_changes,
        assertions_changed: !assertion_changes.is_empty(),
        assertion_changes,
        schema_validation_regression,
        is_regression,
    }
}

/// A test with no baseline counterpart. Never a regression.
pub fn classify_new(current: &TestResult) -> RegressionResult {
    RegressionResult {
        current_success: Some(current.success),
        current_status: current.status_code(),
        ..unmatched(current, Verdict::New, false)
    }
}

/// A baseline test missing from the current run. Losing a passing test is a regression.
pub fn classify_removed(baseline: &TestResult) -> RegressionResult {
    RegressionResult {
        baseline_success: Some(baseline.success),
        baseline_status: baseline.status_code(),
        ..unmatched(baseline, Verdict::Removed, baseline.success)
    }
}

fn unmatched(result: &TestResult, verdict: Verdict, is_regression: bool) -> RegressionResult {
    RegressionResult {
        id: result.id.clone(),
        method: result.method.clone(),
        endpoint: result.endpoint.clone(),
        scenario: result.scenario.clone(),
        verdict,
        baseline_success: None,
        current_success: None,
        status_code_changed: false,
        baseline_status: None,
        current_status: None,
        response_changed: false,
        response_changes: Vec::new(),
        assertions_changed: false,
        assertion_changes: Vec::new(),
        schema_validation_regression: false,
        is_regression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiResponse, AssertionOutcome, JsonValue};
    use crate::regression::types::DiffKind;
    use serde_json::json;

    fn result(success: bool, status: Option<u16>, body: serde_json::Value) -> TestResult {
        TestResult {
            id: "t".to_string(),
            method: "GET".to_string(),
            endpoint: "/users".to_string(),
            scenario: None,
            success,
            response: Some(ApiResponse {
                status_code: status,
                body: JsonValue::from(body),
            }),
            assertions: vec![],
            duration_ms: 5,
        }
    }

    fn with_assertion(mut r: TestResult, name: &str, success: bool) -> TestResult {
        r.assertions.push(AssertionOutcome {
            name: name.to_string(),
            success,
            error: None,
        });
        r
    }

    #[test]
    fn test_status_regression_rules() {
        assert!(is_status_regression(200, 404));
        assert!(is_status_regression(201, 500));
        assert!(is_status_regression(404, 503));
        assert!(!is_status_regression(404, 400));
        assert!(!is_status_regression(500, 200));
        assert!(!is_status_regression(500, 502));
        assert!(!is_status_regression(200, 204));
    }

    #[test]
    fn test_server_error_is_regression() {
        let options = CompareOptions::default();
        let r = classify_pair(
            &result(true, Some(200), json!({})),
            &result(false, Some(503), json!({})),
            &options,
        );
        assert!(r.is_regression);
        assert!(r.status_code_changed);
        assert_eq!(r.baseline_status, Some(200));
        assert_eq!(r.current_status, Some(503));
        assert_eq!(r.verdict, Verdict::Regressed);
    }

    #[test]
    fn test_recovery_is_improvement() {
        let options = CompareOptions::default();
        let r = classify_pair(
            &result(false, Some(500), json!({"id": 1})),
            &result(true, Some(200), json!({"id": 1})),
            &options,
        );
        assert!(!r.is_regression);
        assert!(r.status_code_changed);
        assert_eq!(r.verdict, Verdict::Improved);
    }

    #[test]
    fn test_removed_field_is_structural_regression() {
        let options = CompareOptions::default();
        let r = classify_pair(
            &result(true, Some(200), json!({"id": 1, "name": "Alice"})),
            &result(true, Some(200), json!({"id": 1})),
            &options,
        );
        assert!(r.is_regression);
        assert!(r.response_changed);
        assert_eq!(r.response_changes.len(), 1);
        assert_eq!(r.response_changes[0].path.to_string(), "name");
        assert_eq!(r.response_changes[0].kind, DiffKind::Removed);
    }

    #[test]
    fn test_schema_validation_regression() {
        let options = CompareOptions::default();
        let baseline = with_assertion(result(true, Some(200), json!({})), "Schema validation", true);
        let current = with_assertion(result(true, Some(200), json!({})), "Schema validation", false);

        let r = classify_pair(&baseline, &current, &options);
        assert!(r.schema_validation_regression);
        assert!(r.is_regression);
        assert!(r.assertions_changed);
        assert_eq!(r.failed_assertions().count(), 1);
    }

    #[test]
    fn test_other_assertion_flip_alone_is_not_regression() {
        let options = CompareOptions::default();
        let baseline = with_assertion(result(true, Some(200), json!({})), "Latency under 200ms", true);
        let current = with_assertion(result(true, Some(200), json!({})), "Latency under 200ms", false);

        let r = classify_pair(&baseline, &current, &options);
        assert!(r.assertions_changed);
        assert!(!r.is_regression);
        assert_eq!(r.verdict, Verdict::Unchanged);
    }

    #[test]
    fn test_missing_response_skips_status_and_body_checks() {
        let options = CompareOptions::default();
        let mut current = result(true, None, json!({}));
        current.response = None;

        let r = classify_pair(&result(true, Some(200), json!({"id": 1})), &current, &options);
        assert!(!r.status_code_changed);
        assert!(!r.response_changed);
        assert!(!r.is_regression);
        assert_eq!(r.current_status, None);
    }

    #[test]
    fn test_removed_passing_vs_failing() {
        assert!(classify_removed(&result(true, Some(200), json!({}))).is_regression);
        assert!(!classify_removed(&result(false, Some(500), json!({}))).is_regression);
        assert!(!classify_new(&result(false, Some(500), json!({}))).is_regression);
    }
}
