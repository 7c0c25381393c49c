// src/scenario/mod.rs
// Round-trip scenarios: one self-contained check per operation

pub mod catalog;
pub mod report;
pub mod runner;

pub use catalog::{filter_by_name, filter_by_tags, interop_catalog};
pub use report::{RunSummary, ScenarioResult, ScenarioStatus};
pub use runner::{RunnerConfig, ScenarioRunner};

use crate::builder::Fixture;
use crate::fault::FaultKind;
use crate::schema::QName;

/// What a scenario asserts about the call's outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// The result is equivalent to the argument that was sent
    EchoesArgument,
    /// The result is equivalent to this fixture, built against the output type
    Returns(Fixture),
    /// The response carries headers equivalent to these
    ReturnsHeaders(Vec<(QName, Fixture)>),
    /// The call completes without a fault; the result is not inspected
    Completes,
    /// The call fails with this fault kind
    Fails(FaultKind),
}

/// One check against one operation
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub operation: String,
    pub tags: Vec<String>,
    /// Argument fixture, built against the operation's input part
    pub argument: Option<Fixture>,
    /// Header fixtures sent with the call
    pub headers: Vec<(QName, Fixture)>,
    pub expectation: Expectation,
    /// Set for scenarios that are kept in the catalog but not run
    pub skip_reason: Option<String>,
}

impl Scenario {
    pub fn new(name: &str, operation: &str, expectation: Expectation) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            operation: operation.to_string(),
            tags: Vec::new(),
            argument: None,
            headers: Vec::new(),
            expectation,
            skip_reason: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn argument(mut self, fixture: impl Into<Fixture>) -> Self {
        self.argument = Some(fixture.into());
        self
    }

    pub fn header(mut self, type_name: QName, fixture: Fixture) -> Self {
        self.headers.push((type_name, fixture));
        self
    }

    pub fn skip(mut self, reason: &str) -> Self {
        self.skip_reason = Some(reason.to_string());
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}
