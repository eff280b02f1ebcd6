//! Errors raised while building, sending, or checking a contract case.

use std::time::Duration;

use thiserror::Error;

use crate::testing::AssertionFailure;

/// Every way a single case can fail.
///
/// None of these are retried: the case that produced the error is reported
/// as failed and the run moves on to the next case.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The HTTP call could not complete (DNS, refused connection, reset).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The per-call deadline elapsed before a response arrived.
    #[error("no response within {}ms", .after.as_millis())]
    Timeout { after: Duration },
    /// The response did not match what the contract expects.
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),
    /// A request body could not be encoded or a response body decoded.
    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The base URI and endpoint path do not compose into a valid URL.
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// A scenario was handed a case of the wrong shape.
    #[error("scenario `{scenario}` cannot run case {case}")]
    CaseMismatch { scenario: &'static str, case: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarnessError {
    /// Short machine-readable kind used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Transport(_) => "transport",
            HarnessError::Timeout { .. } => "timeout",
            HarnessError::Assertion(_) => "assertion",
            HarnessError::Serialization(_) => "serialization",
            HarnessError::InvalidUrl { .. } => "invalid_url",
            HarnessError::CaseMismatch { .. } => "case_mismatch",
            HarnessError::Config(_) => "config",
        }
    }
}
