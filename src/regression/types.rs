use super::path::JsonPath;
use crate::model::{JsonKind, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What changed at one location of a response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiffKind {
    Removed,
    Added,
    TypeChanged { from: JsonKind, to: JsonKind },
    NullChanged { from: JsonKind, to: JsonKind },
    /// Several changes below one top-level field, listed in `details`
    Nested,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Removed => write!(f, "removed (was present in baseline)"),
            DiffKind::Added => write!(f, "added (not present in baseline)"),
            DiffKind::TypeChanged { from, to } => write!(f, "type changed from {} to {}", from, to),
            DiffKind::NullChanged { from, to } => write!(f, "changed from {} to {}", from, to),
            DiffKind::Nested => write!(f, "nested structure changed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDiff {
    pub path: JsonPath,
    pub kind: DiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ResponseDiff {
    pub fn new(
        path: JsonPath,
        kind: DiffKind,
        baseline_value: Option<&JsonValue>,
        current_value: Option<&JsonValue>,
    ) -> Self {
        Self {
            path,
            kind,
            baseline_value: baseline_value.cloned(),
            current_value: current_value.cloned(),
            details: Vec::new(),
        }
    }

    /// `path: description`, or just the description at the body root
    pub fn describe(&self) -> String {
        if self.path.is_root() {
            self.kind.to_string()
        } else {
            format!("{}: {}", self.path, self.kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionDiff {
    pub name: String,
    pub baseline_success: bool,
    pub current_success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Regressed,
    Improved,
    Unchanged,
    New,
    Removed,
}

/// Comparison record for one test key, matched or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    pub id: String,
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub verdict: Verdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_success: Option<bool>,

    #[serde(default)]
    pub status_code_changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<u16>,

    #[serde(default)]
    pub response_changed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_changes: Vec<ResponseDiff>,

    #[serde(default)]
    pub assertions_changed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_changes: Vec<AssertionDiff>,

    #[serde(default)]
    pub schema_validation_regression: bool,

    pub is_regression: bool,
}

impl RegressionResult {
    pub fn display_name(&self) -> String {
        match &self.scenario {
            Some(scenario) => format!(
                "{} {} ({})",
                self.method.to_uppercase(),
                self.endpoint,
                scenario
            ),
            None => format!("{} {}", self.method.to_uppercase(), self.endpoint),
        }
    }

    /// Assertions that pass in the baseline but not in the current run
    pub fn failed_assertions(&self) -> impl Iterator<Item = &AssertionDiff> {
        self.assertion_changes
            .iter()
            .filter(|a| a.baseline_success && !a.current_success)
    }
}

/// Aggregate outcome of comparing a current run against the baseline.
///
/// `regressed_tests + improved_tests + unchanged_tests == matching_tests`.
/// Removed tests that used to pass are flagged `is_regression` in `details`
/// and counted separately in `removed_regressions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionSummary {
    pub total_tests: usize,
    pub new_tests: usize,
    pub removed_tests: usize,
    pub matching_tests: usize,
    pub regressed_tests: usize,
    pub improved_tests: usize,
    pub unchanged_tests: usize,
    #[serde(default)]
    pub removed_regressions: usize,
    pub details: Vec<RegressionResult>,
}

impl RegressionSummary {
    pub fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &RegressionResult> {
        self.details.iter().filter(move |d| d.verdict == verdict)
    }

    /// Whether a CI gate should fail on this comparison.
    pub fn should_fail(&self, fail_on_removed: bool) -> bool {
        self.regressed_tests > 0 || (fail_on_removed && self.removed_regressions > 0)
    }
}
