use crate::regression::{RegressionResult, RegressionSummary, Verdict};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Generate JUnit XML from a regression summary. Each compared test is a
/// testcase; regressions are failures and removed tests are skipped.
pub fn generate_junit_xml(summary: &RegressionSummary, timestamp: &str) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = summary.details.len();
    let failures = summary.details.iter().filter(|d| d.is_regression).count();
    let skipped = summary
        .details
        .iter()
        .filter(|d| d.verdict == Verdict::Removed && !d.is_regression)
        .count();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "nexus-regress"));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "regression"));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("timestamp", timestamp));
    writer.write_event(Event::Start(suite_start))?;

    for result in &summary.details {
        write_test_case(&mut writer, result)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    result: &RegressionResult,
) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    let classname = result.endpoint.trim_start_matches('/').replace('/', ".");
    case_start.push_attribute(("name", result.display_name().as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    writer.write_event(Event::Start(case_start))?;

    if result.is_regression {
        let message = failure_message(result);
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", message.as_str()));
        fail_start.push_attribute(("type", "Regression"));
        writer.write_event(Event::Start(fail_start))?;

        let body: Vec<String> = result
            .response_changes
            .iter()
            .map(|c| c.describe())
            .chain(
                result
                    .failed_assertions()
                    .map(|a| format!("assertion failed: {}", a.name)),
            )
            .collect();
        if !body.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&body.join("\n"))))?;
        }

        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    } else if result.verdict == Verdict::Removed {
        writer.write_event(Event::Empty(BytesStart::new("skipped")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn failure_message(result: &RegressionResult) -> String {
    if result.verdict == Verdict::Removed {
        return "previously passing test is missing from the current run".to_string();
    }

    let mut reasons = Vec::new();
    if result.baseline_success == Some(true) && result.current_success == Some(false) {
        reasons.push("test now fails".to_string());
    }
    if let (true, Some(b), Some(c)) = (
        result.status_code_changed,
        result.baseline_status,
        result.current_status,
    ) {
        reasons.push(format!("status {} -> {}", b, c));
    }
    if result.schema_validation_regression {
        reasons.push("schema validation failed".to_string());
    }
    if result.response_changed {
        reasons.push(format!(
            "{} response structure change(s)",
            result.response_changes.len()
        ));
    }
    reasons.join("; ")
}

/// Write report to file
/// JUnit XML stamped with the local time
pub fn render(summary: &RegressionSummary) -> Result<String> {
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    generate_junit_xml(summary, &timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::aggregator::summarize;

    fn detail(endpoint: &str, verdict: Verdict, is_regression: bool) -> RegressionResult {
        RegressionResult {
            id: endpoint.to_string(),
            method: "get".to_string(),
            endpoint: endpoint.to_string(),
            scenario: None,
            verdict,
            baseline_success: Some(true),
            current_success: Some(!is_regression),
            status_code_changed: is_regression,
            baseline_status: Some(200),
            current_status: Some(if is_regression { 500 } else { 200 }),
            response_changed: false,
            response_changes: vec![],
            assertions_changed: false,
            assertion_changes: vec![],
            schema_validation_regression: false,
            is_regression,
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let summary = summarize(vec![
            detail("/users", Verdict::Regressed, true),
            detail("/health", Verdict::Unchanged, false),
            RegressionResult {
                baseline_success: Some(false),
                ..detail("/legacy", Verdict::Removed, false)
            },
        ]);

        let xml = generate_junit_xml(&summary, "2024-01-01T12:00:00").expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="nexus-regress""#));
        assert!(xml.contains(r#"tests="3""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"skipped="1""#));
        assert!(xml.contains(r#"<testcase name="GET /users" classname="users">"#));
        assert!(xml.contains(r#"message="test now fails; status 200 -&gt; 500""#));
        assert!(xml.contains("<skipped/>"));
    }
}
