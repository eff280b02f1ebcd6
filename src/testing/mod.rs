//! # Testing & Assertions
//!
//! Checks a captured response against a contract: exact status code, status
//! line substring, and field-level expectations on the parsed body. Also holds
//! the per-run report types.

use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

use crate::domain::MessageField;
use crate::error::HarnessError;
use crate::http::ResponseOutcome;

/// Target of an assertion within the HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionTarget {
    StatusCode,
    StatusLine,
    /// A scalar field extracted from every message in the body array.
    BodyField(MessageField),
}

impl Display for AssertionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionTarget::StatusCode => write!(f, "status_code"),
            AssertionTarget::StatusLine => write!(f, "status_line"),
            AssertionTarget::BodyField(field) => write!(f, "body[].{field}"),
        }
    }
}

/// Comparison operator for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionOperator {
    Equals,
    Contains,
    /// Every extracted value equals the expected one, and there is at least one.
    AllEqual,
}

impl Display for AssertionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssertionOperator::Equals => "equals",
            AssertionOperator::Contains => "contains",
            AssertionOperator::AllEqual => "all equal",
        };
        write!(f, "{label}")
    }
}

/// A single assertion that can be evaluated against a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub target: AssertionTarget,
    pub operator: AssertionOperator,
    pub expected: String,
}

impl Assertion {
    pub fn status_code(code: u16) -> Self {
        Self {
            target: AssertionTarget::StatusCode,
            operator: AssertionOperator::Equals,
            expected: code.to_string(),
        }
    }

    pub fn status_line_contains(fragment: impl Into<String>) -> Self {
        Self {
            target: AssertionTarget::StatusLine,
            operator: AssertionOperator::Contains,
            expected: fragment.into(),
        }
    }

    pub fn every_body_field(field: MessageField, expected: impl ToString) -> Self {
        Self {
            target: AssertionTarget::BodyField(field),
            operator: AssertionOperator::AllEqual,
            expected: expected.to_string(),
        }
    }

    /// Evaluate against a response. Body targets parse the body, so a
    /// malformed body is an error rather than a failed assertion.
    pub fn evaluate(&self, outcome: &ResponseOutcome) -> Result<AssertionResult, HarnessError> {
        let (passed, actual) = match self.target {
            AssertionTarget::StatusCode => {
                let actual = outcome.status_code.to_string();
                (self.matches_scalar(&actual), actual)
            }
            AssertionTarget::StatusLine => {
                (self.matches_scalar(&outcome.status_line), outcome.status_line.clone())
            }
            AssertionTarget::BodyField(field) => {
                let values: Vec<String> = outcome
                    .messages()?
                    .iter()
                    .map(|message| render(message.field(field)))
                    .collect();
                (self.matches_all(&values), format!("[{}]", values.join(", ")))
            }
        };

        let message = if passed {
            format!("{} {} `{}`", self.target, self.operator, self.expected)
        } else {
            format!(
                "expected {} {} `{}`, got `{}`",
                self.target, self.operator, self.expected, actual
            )
        };

        Ok(AssertionResult {
            assertion: self.clone(),
            passed,
            actual,
            message,
        })
    }

    fn matches_scalar(&self, actual: &str) -> bool {
        match self.operator {
            AssertionOperator::Equals | AssertionOperator::AllEqual => actual == self.expected,
            AssertionOperator::Contains => actual.contains(&self.expected),
        }
    }

    fn matches_all(&self, values: &[String]) -> bool {
        match self.operator {
            AssertionOperator::Equals => values.len() == 1 && values[0] == self.expected,
            AssertionOperator::Contains => values.iter().any(|v| *v == self.expected),
            AssertionOperator::AllEqual => {
                !values.is_empty() && values.iter().all(|v| *v == self.expected)
            }
        }
    }
}

fn render(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}

/// Result of evaluating an assertion.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    pub assertion: Assertion,
    pub passed: bool,
    pub actual: String,
    pub message: String,
}

impl AssertionResult {
    pub fn failure(&self) -> Option<AssertionFailure> {
        (!self.passed).then(|| AssertionFailure {
            field: self.assertion.target.to_string(),
            expected: self.assertion.expected.clone(),
            actual: self.actual.clone(),
        })
    }
}

/// Expected vs actual mismatch on one field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: expected {expected}, got {actual}")]
pub struct AssertionFailure {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// What one scenario expects back from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub status_code: u16,
    pub status_line: String,
    /// When set, every message in the body must carry this id.
    pub body_id: Option<i64>,
}

impl Expectation {
    pub fn status(code: u16, line_fragment: impl Into<String>) -> Self {
        Self {
            status_code: code,
            status_line: line_fragment.into(),
            body_id: None,
        }
    }

    pub fn with_body_id(mut self, id: i64) -> Self {
        self.body_id = Some(id);
        self
    }

    /// Assertions in evaluation order: status code, status line, body.
    pub fn assertions(&self) -> Vec<Assertion> {
        let mut assertions = vec![
            Assertion::status_code(self.status_code),
            Assertion::status_line_contains(self.status_line.clone()),
        ];
        if let Some(id) = self.body_id {
            assertions.push(Assertion::every_body_field(MessageField::Id, id));
        }
        assertions
    }

    /// Fail on the first mismatch. Later assertions are not evaluated, so a
    /// wrong status never leads to parsing an error page as JSON.
    pub fn verify(&self, outcome: &ResponseOutcome) -> Result<(), HarnessError> {
        for assertion in self.assertions() {
            if let Some(failure) = assertion.evaluate(outcome)?.failure() {
                return Err(failure.into());
            }
        }
        Ok(())
    }

    /// Evaluate every assertion regardless of earlier failures.
    pub fn evaluate_all(&self, outcome: &ResponseOutcome) -> Result<Vec<AssertionResult>, HarnessError> {
        self.assertions()
            .iter()
            .map(|assertion| assertion.evaluate(outcome))
            .collect()
    }
}

/// Execution mode for the suite runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Serial,
    Parallel,
}

/// Outcome of one executed case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub scenario: String,
    pub case: String,
    pub passed: bool,
    pub duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u128,
    pub results: Vec<CaseReport>,
}

impl RunReport {
    pub fn push(&mut self, result: CaseReport) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.results.iter().filter(|result| !result.passed)
    }
}
