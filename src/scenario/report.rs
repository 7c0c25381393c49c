// src/scenario/report.rs
// Scenario results, run summary and output reporters

use crate::equivalence::FieldDiff;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

impl ScenarioStatus {
    pub fn label(self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "PASS",
            ScenarioStatus::Failed => "FAIL",
            ScenarioStatus::Skipped => "SKIP",
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub operation: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    /// Short description of what the call produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level differences when the round trip did not hold
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<FieldDiff>,
    /// The failure points at the fixtures rather than the service
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub harness_bug: bool,
}

impl ScenarioResult {
    pub fn new(scenario_name: &str, operation: &str) -> Self {
        Self {
            scenario_name: scenario_name.to_string(),
            operation: operation.to_string(),
            status: ScenarioStatus::Passed,
            duration_ms: 0,
            outcome: None,
            error: None,
            diffs: Vec::new(),
            harness_bug: false,
        }
    }

    pub fn skipped(scenario_name: &str, operation: &str, reason: &str) -> Self {
        let mut result = Self::new(scenario_name, operation);
        result.status = ScenarioStatus::Skipped;
        result.error = Some(reason.to_string());
        result
    }

    pub fn fail_with_error(&mut self, error: impl Into<String>) {
        self.status = ScenarioStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    pub fn failed(&self) -> bool {
        self.status == ScenarioStatus::Failed
    }
}

/// Summary of multiple scenario results
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn from_results(results: &[ScenarioResult]) -> Self {
        let mut summary = Self {
            run_id: Uuid::new_v4(),
            total: results.len(),
            passed: 0,
            failed: 0,
            skipped: 0,
            total_duration_ms: 0,
        };

        for result in results {
            summary.total_duration_ms += result.duration_ms;
            match result.status {
                ScenarioStatus::Passed => summary.passed += 1,
                ScenarioStatus::Failed => summary.failed += 1,
                ScenarioStatus::Skipped => summary.skipped += 1,
            }
        }

        summary
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn print(&self) {
        let run = self.total - self.skipped;
        println!();
        println!("========================================");
        println!("INTEROP SUMMARY  run {}", self.run_id);
        println!("========================================");
        println!("Total:    {}", self.total);
        println!("Passed:   {} ({}%)", self.passed, if run > 0 { self.passed * 100 / run } else { 0 });
        println!("Failed:   {}", self.failed);
        println!("Skipped:  {}", self.skipped);
        println!("Duration: {}ms", self.total_duration_ms);
        println!("========================================");

        if self.success() {
            println!("RESULT: PASSED");
        } else {
            println!("RESULT: FAILED");
        }
    }
}

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(OutputFormat::Console),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Renders a set of results for humans or machines
pub trait Reporter {
    fn report(&self, results: &[ScenarioResult], verbose: bool) -> String;
}

pub fn get_reporter(format: OutputFormat) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleReporter),
        OutputFormat::Json => Box::new(JsonReporter),
    }
}

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, results: &[ScenarioResult], verbose: bool) -> String {
        let mut out = String::new();
        for result in results {
            out.push_str(&format!(
                "[{}] {} ({}ms)\n",
                result.status.label(),
                result.scenario_name,
                result.duration_ms
            ));
            match result.status {
                ScenarioStatus::Skipped => {
                    if let Some(reason) = &result.error {
                        out.push_str(&format!("       skipped: {}\n", reason));
                    }
                }
                ScenarioStatus::Failed => {
                    if let Some(error) = &result.error {
                        let tag = if result.harness_bug { "harness" } else { "error" };
                        out.push_str(&format!("       {}: {}\n", tag, error.lines().next().unwrap_or("")));
                    }
                    for diff in &result.diffs {
                        out.push_str(&format!(
                            "       {}: expected {}, got {} ({})\n",
                            diff.path, diff.expected, diff.actual, diff.reason
                        ));
                    }
                }
                ScenarioStatus::Passed => {}
            }
            if verbose {
                if let Some(outcome) = &result.outcome {
                    out.push_str(&format!("       outcome: {}\n", outcome));
                }
            }
        }
        out
    }
}

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, results: &[ScenarioResult], _verbose: bool) -> String {
        let document = serde_json::json!({
            "summary": RunSummary::from_results(results),
            "results": results,
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ScenarioResult> {
        let mut failed = ScenarioResult::new("echo_string", "echo_string");
        failed.fail_with_error("round-trip mismatch");
        failed.diffs.push(FieldDiff {
            path: "<root>".to_string(),
            expected: "\"OK\"".to_string(),
            actual: "\"KO\"".to_string(),
            reason: "value differs".to_string(),
        });
        vec![
            ScenarioResult::new("echo_boolean_true", "echo_boolean"),
            failed,
            ScenarioResult::skipped("echo_in_header", "echo_in_header", "not settled"),
        ]
    }

    // ========================================================================
    // Summary
    // ========================================================================

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_results(&sample());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.success());
    }

    #[test]
    fn test_skipped_does_not_fail_run() {
        let results = vec![ScenarioResult::skipped("a", "a", "reason")];
        assert!(RunSummary::from_results(&results).success());
    }

    // ========================================================================
    // Reporters
    // ========================================================================

    #[test]
    fn test_console_report() {
        let text = ConsoleReporter.report(&sample(), false);
        assert!(text.contains("[PASS] echo_boolean_true"));
        assert!(text.contains("[FAIL] echo_string"));
        assert!(text.contains("<root>: expected \"OK\", got \"KO\""));
        assert!(text.contains("[SKIP] echo_in_header"));
        assert!(text.contains("skipped: not settled"));
    }

    #[test]
    fn test_json_report() {
        let text = JsonReporter.report(&sample(), false);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["summary"]["failed"], 1);
        assert_eq!(parsed["results"][1]["status"], "failed");
        assert_eq!(parsed["results"][1]["diffs"][0]["path"], "<root>");
        assert!(parsed["results"][0].get("diffs").is_none());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Console));
        assert_eq!(OutputFormat::from_str("junit"), None);
    }
}
