use super::json::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one executed API test, as written by the test runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Per-run identifier. Regenerated on every run, so never used for matching.
    pub id: String,

    pub method: String,

    pub endpoint: String,

    /// Scenario name, used to tell apart several tests against one endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiResponse>,

    #[serde(default)]
    pub assertions: Vec<AssertionOutcome>,

    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default)]
    pub body: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    pub name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Logical identity of a test across runs: lowercase method plus endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestKey(String);

impl TestKey {
    pub fn new(method: &str, endpoint: &str) -> Self {
        Self(format!("{}:{}", method.to_lowercase(), endpoint))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TestResult {
    pub fn test_key(&self) -> TestKey {
        TestKey::new(&self.method, &self.endpoint)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().and_then(|r| r.status_code)
    }

    pub fn body(&self) -> Option<&JsonValue> {
        self.response.as_ref().map(|r| &r.body)
    }

    pub fn assertion(&self, name: &str) -> Option<&AssertionOutcome> {
        self.assertions.iter().find(|a| a.name == name)
    }

    /// Human-readable identity, e.g. `GET /users (list users)`
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
}

/// A named collection of test results from one run.
///
/// Result order is the order the runner wrote them in; reports follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub results: Vec<TestResult>,
}

impl Snapshot {
    pub fn new(name: &str, results: Vec<TestResult>) -> Self {
        Self {
            name: name.to_string(),
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter()
    }
}
