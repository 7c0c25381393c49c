// src/scenario/runner.rs
// Scenario execution engine

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::report::ScenarioResult;
use super::{Expectation, Scenario};
use crate::builder::{DEFAULT_MAX_DEPTH, ValueBuilder};
use crate::client::{OperationCall, SoapClient};
use crate::equivalence::{ComparisonRules, EquivalenceChecker};
use crate::error::{HarnessError, Result};
use crate::invoker::{OperationInvoker, Outcome};
use crate::schema::{OperationDescriptor, TypeLocator};
use crate::utils::{millis, truncate};
use crate::value::Value;

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Bound on record nesting while building fixtures
    pub max_depth: usize,

    /// Compare temporal values exactly instead of at whole-second precision
    pub strict_temporal: bool,

    /// Stop on first failure
    pub fail_fast: bool,

    /// Verbose output
    pub verbose: bool,

    /// Run scenarios in parallel
    pub parallel: bool,

    /// Maximum concurrent scenarios (0 = unlimited)
    pub max_parallel: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_temporal: false,
            fail_fast: false,
            verbose: false,
            parallel: false,
            max_parallel: 4,
        }
    }
}

/// Executes round-trip scenarios against one client
pub struct ScenarioRunner {
    config: RunnerConfig,
    client: Arc<dyn SoapClient>,
    locator: TypeLocator,
    invoker: OperationInvoker,
}

impl ScenarioRunner {
    pub fn new(client: Arc<dyn SoapClient>, config: RunnerConfig) -> Self {
        Self {
            config,
            locator: TypeLocator::new(client.clone()),
            invoker: OperationInvoker::new(client.clone()),
            client,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn rules(&self) -> ComparisonRules {
        if self.config.strict_temporal {
            ComparisonRules::strict()
        } else {
            ComparisonRules::tolerant()
        }
    }

    /// Run a single scenario
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        if let Some(reason) = &scenario.skip_reason {
            info!("Skipping scenario '{}': {}", scenario.name, reason);
            return ScenarioResult::skipped(&scenario.name, &scenario.operation, reason);
        }

        info!("Running scenario: {}", scenario.name);
        let start = Instant::now();
        let mut result = ScenarioResult::new(&scenario.name, &scenario.operation);

        if let Err(e) = self.execute(scenario, &mut result).await {
            result.harness_bug = e.is_harness_bug();
            if let HarnessError::Equivalence(mismatch) = &e {
                result.diffs = mismatch.diffs.clone();
            }
            if result.harness_bug {
                warn!("Scenario '{}' fixture error: {}", scenario.name, e);
            }
            result.fail_with_error(e.to_string());
        }

        result.duration_ms = millis(start.elapsed());
        info!(
            "Scenario '{}' completed: {} ({}ms)",
            scenario.name,
            if result.passed() { "PASSED" } else { "FAILED" },
            result.duration_ms
        );
        result
    }

    async fn execute(&self, scenario: &Scenario, result: &mut ScenarioResult) -> Result<()> {
        let op = self
            .client
            .schema()
            .operation(&scenario.operation)
            .ok_or_else(|| HarnessError::UnknownOperation(scenario.operation.clone()))?;
        let builder = ValueBuilder::new(&self.locator).with_max_depth(self.config.max_depth);

        let argument = match (&scenario.argument, &op.input) {
            (Some(fixture), Some(input)) => Some(builder.build_ref(&input.type_ref, input.repeated, fixture)?),
            (Some(_), None) => return Err(HarnessError::fixture(&op.name, "operation takes no argument")),
            (None, _) => None,
        };

        let mut call = OperationCall::new(&op.name);
        if let Some(argument) = &argument {
            call = call.with_argument(argument.clone());
        }
        for (type_name, fixture) in &scenario.headers {
            let descriptor = self.locator.resolve_qname(type_name)?;
            call = call.with_header(builder.build(&descriptor, fixture)?);
        }

        let outcome = self.invoker.invoke(&call).await?;
        result.outcome = Some(describe(&outcome));
        debug!(scenario = %scenario.name, outcome = ?result.outcome, "Invocation finished");

        self.verify(&scenario.expectation, op, argument.as_ref(), &outcome, &builder)
    }

    fn verify(
        &self,
        expectation: &Expectation,
        op: &OperationDescriptor,
        argument: Option<&Value>,
        outcome: &Outcome,
        builder: &ValueBuilder<'_>,
    ) -> Result<()> {
        match (expectation, outcome) {
            (Expectation::Fails(expected), Outcome::Fault { kind, .. }) if expected == kind => Ok(()),
            (Expectation::Fails(expected), Outcome::Fault { kind, message, .. }) => Err(HarnessError::Expectation(
                format!("expected a {} fault, got a {} fault: {}", expected, kind, truncate(message, 200)),
            )),
            (Expectation::Fails(expected), Outcome::Success { .. }) => Err(HarnessError::Expectation(format!(
                "expected a {} fault but the call succeeded",
                expected
            ))),
            (_, Outcome::Fault { kind, message, .. }) => Err(HarnessError::Expectation(format!(
                "unexpected {} fault: {}",
                kind,
                truncate(message, 200)
            ))),
            (Expectation::Completes, Outcome::Success { .. }) => Ok(()),
            (Expectation::EchoesArgument, Outcome::Success { result, .. }) => {
                let sent = argument.ok_or_else(|| HarnessError::fixture(&op.name, "echo scenario has no argument"))?;
                self.compare_result(op, sent, result.as_ref())
            }
            (Expectation::Returns(fixture), Outcome::Success { result, .. }) => {
                let output = op
                    .output
                    .as_ref()
                    .ok_or_else(|| HarnessError::fixture(&op.name, "operation has no output"))?;
                let expected = builder.build_ref(&output.type_ref, output.repeated, fixture)?;
                self.compare_result(op, &expected, result.as_ref())
            }
            (Expectation::ReturnsHeaders(expected), Outcome::Success { headers, .. }) => {
                let checker = EquivalenceChecker::new(&self.locator).with_rules(self.rules());
                for (type_name, fixture) in expected {
                    let descriptor = self.locator.resolve_qname(type_name)?;
                    let expected_value = builder.build(&descriptor, fixture)?;
                    let actual = headers
                        .iter()
                        .find(|h| h.as_record().is_some_and(|r| &r.type_name == type_name))
                        .ok_or_else(|| HarnessError::Expectation(format!("response carries no {} header", type_name)))?;
                    checker.check_type(&expected_value, actual, &descriptor)?;
                }
                Ok(())
            }
        }
    }

    fn compare_result(&self, op: &OperationDescriptor, expected: &Value, actual: Option<&Value>) -> Result<()> {
        let output = op
            .output
            .as_ref()
            .ok_or_else(|| HarnessError::fixture(&op.name, "operation has no output to compare"))?;
        let null = Value::Null;
        let actual = actual.unwrap_or(&null);
        EquivalenceChecker::new(&self.locator)
            .with_rules(self.rules())
            .check(expected, actual, &output.type_ref, output.repeated)?;
        Ok(())
    }

    /// Run scenarios, either sequentially or in parallel
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        if self.config.parallel && !self.config.fail_fast {
            self.run_scenarios_parallel(scenarios).await
        } else {
            self.run_scenarios_sequential(scenarios).await
        }
    }

    async fn run_scenarios_sequential(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            let failed = result.failed();
            results.push(result);

            if failed && self.config.fail_fast {
                warn!("Stopping due to fail_fast");
                break;
            }
        }

        results
    }

    /// Results come back in catalog order regardless of completion order
    async fn run_scenarios_parallel(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        let concurrency = if self.config.max_parallel == 0 {
            scenarios.len().max(1)
        } else {
            self.config.max_parallel
        };

        info!("Running {} scenarios in parallel (max concurrency: {})", scenarios.len(), concurrency);

        let mut indexed: Vec<(usize, ScenarioResult)> = stream::iter(scenarios.iter().enumerate())
            .map(|(index, scenario)| async move { (index, self.run_scenario(scenario).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success { result: Some(value), headers } if !headers.is_empty() => {
            format!("{} with {} header(s)", value.summary(), headers.len())
        }
        Outcome::Success { result: Some(value), .. } => value.summary(),
        Outcome::Success { result: None, headers } => format!("no result, {} header(s)", headers.len()),
        Outcome::Fault { kind, code, message } => match code {
            Some(code) => format!("{} fault {}: {}", kind, code, truncate(message, 80)),
            None => format!("{} fault: {}", kind, truncate(message, 80)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Fixture;
    use crate::client::LoopbackClient;
    use crate::fault::FaultKind;
    use crate::scenario::ScenarioStatus;
    use chrono::NaiveDate;

    fn runner(config: RunnerConfig) -> ScenarioRunner {
        ScenarioRunner::new(Arc::new(LoopbackClient::new()), config)
    }

    fn subsecond_scenario() -> Scenario {
        let sent = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_micro_opt(8, 30, 15, 250_000)
            .unwrap();
        Scenario::new("dt", "echo_datetime", Expectation::EchoesArgument).argument(sent)
    }

    // ========================================================================
    // Expectations
    // ========================================================================

    #[tokio::test]
    async fn test_echo_passes() {
        let scenario = Scenario::new("s", "echo_string", Expectation::EchoesArgument).argument("OK");
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.passed(), "{:?}", result.error);
        assert_eq!(result.outcome.as_deref(), Some("\"OK\""));
    }

    #[tokio::test]
    async fn test_expected_fault_passes() {
        let scenario = Scenario::new("f", "soap_exception", Expectation::Fails(FaultKind::Application));
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.passed());
    }

    #[tokio::test]
    async fn test_wrong_fault_kind_fails() {
        let scenario = Scenario::new("f", "soap_exception", Expectation::Fails(FaultKind::Validation));
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.failed());
        assert!(result.error.unwrap().contains("got a application fault"));
    }

    #[tokio::test]
    async fn test_success_when_fault_expected_fails() {
        let scenario = Scenario::new("f", "test_empty", Expectation::Fails(FaultKind::Application));
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.error.unwrap().contains("call succeeded"));
    }

    #[tokio::test]
    async fn test_returns_mismatch_reports_diffs() {
        let scenario = Scenario::new("c", "complex_return", Expectation::Returns(Fixture::record([
            ("resultCode", 2.into()),
        ])));
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.failed());
        assert_eq!(result.diffs.len(), 1);
        assert_eq!(result.diffs[0].path, "resultCode");
        assert!(!result.harness_bug);
    }

    #[tokio::test]
    async fn test_bad_fixture_is_harness_bug() {
        let scenario = Scenario::new("b", "echo_simple_class", Expectation::EchoesArgument)
            .argument(Fixture::record([("no_such_field", 1.into())]));
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert!(result.failed());
        assert!(result.harness_bug);
    }

    #[tokio::test]
    async fn test_skipped_scenario_is_not_run() {
        let scenario = Scenario::new("x", "no_such_operation", Expectation::Completes).skip("later");
        let result = runner(RunnerConfig::default()).run_scenario(&scenario).await;
        assert_eq!(result.status, ScenarioStatus::Skipped);
        assert_eq!(result.error.as_deref(), Some("later"));
    }

    // ========================================================================
    // Temporal tolerance
    // ========================================================================

    #[tokio::test]
    async fn test_subsecond_loss_tolerated_by_default() {
        let result = runner(RunnerConfig::default()).run_scenario(&subsecond_scenario()).await;
        assert!(result.passed(), "{:?}", result.error);
    }

    #[tokio::test]
    async fn test_subsecond_loss_flagged_when_strict() {
        let config = RunnerConfig {
            strict_temporal: true,
            ..Default::default()
        };
        let result = runner(config).run_scenario(&subsecond_scenario()).await;
        assert!(result.failed());
        assert_eq!(result.diffs[0].path, "<root>");
    }

    // ========================================================================
    // Batch execution
    // ========================================================================

    #[tokio::test]
    async fn test_fail_fast_stops_sequential_run() {
        let scenarios = vec![
            Scenario::new("bad", "test_empty", Expectation::Fails(FaultKind::Application)),
            Scenario::new("good", "test_empty", Expectation::Completes),
        ];
        let config = RunnerConfig {
            fail_fast: true,
            ..Default::default()
        };
        let results = runner(config).run_scenarios(&scenarios).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_parallel_keeps_order() {
        let scenarios: Vec<Scenario> = (0..10)
            .map(|i| {
                Scenario::new(&format!("echo_{}", i), "echo_string", Expectation::EchoesArgument)
                    .argument(format!("value {}", i))
            })
            .collect();
        let config = RunnerConfig {
            parallel: true,
            max_parallel: 3,
            ..Default::default()
        };
        let results = runner(config).run_scenarios(&scenarios).await;
        let names: Vec<&str> = results.iter().map(|r| r.scenario_name.as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("echo_{}", i)).collect();
        assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(results.iter().all(ScenarioResult::passed));
    }
}
