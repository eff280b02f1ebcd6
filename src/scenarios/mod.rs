//! # Scenarios
//!
//! The message service contract, one scenario per endpoint behavior. Each
//! case is single-shot: build the request, send it once, check the response.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::cases::{self, Case, IdSource};
use crate::config::{EndpointMap, HarnessConfig};
use crate::domain::{Message, ReadRequest};
use crate::error::HarnessError;
use crate::http::{BaseConfig, HttpExecutor, HttpMethod, RequestInput, ResponseOutcome};
use crate::testing::{CaseReport, Expectation, RunMode, RunReport};

/// Added to a sampled id to get one the service is not tracking.
pub const UNTRACKED_ID_OFFSET: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    SendMessageSuccess,
    SendMessageMissingField,
    CancelMessageInvalidId,
    CancelMessageValidId,
    ReadMessage,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::SendMessageSuccess,
        Scenario::SendMessageMissingField,
        Scenario::CancelMessageInvalidId,
        Scenario::CancelMessageValidId,
        Scenario::ReadMessage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::SendMessageSuccess => "send-message-success",
            Scenario::SendMessageMissingField => "send-message-missing-field",
            Scenario::CancelMessageInvalidId => "cancel-message-invalid-id",
            Scenario::CancelMessageValidId => "cancel-message-valid-id",
            Scenario::ReadMessage => "read-message",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::SendMessageSuccess => {
                "Positive /sendMessage test. Request body is JSON, contains required id"
            }
            Scenario::SendMessageMissingField => {
                "Negative /sendMessage test. Request body is JSON, but it doesn't contain required id field"
            }
            Scenario::CancelMessageInvalidId => {
                "Negative /cancelMessage test. Query parameter contains non-existent id value"
            }
            Scenario::CancelMessageValidId => {
                "Positive /cancelMessage test. Query parameter has an id that is being processed"
            }
            Scenario::ReadMessage => {
                "Positive /readMessage test. Message with the requested id has already been processed"
            }
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Scenario::CancelMessageInvalidId | Scenario::CancelMessageValidId => HttpMethod::Get,
            Scenario::SendMessageSuccess
            | Scenario::SendMessageMissingField
            | Scenario::ReadMessage => HttpMethod::Post,
        }
    }

    pub fn cases(self, ids: &IdSource) -> Vec<Case> {
        match self {
            Scenario::SendMessageSuccess => cases::send_success_cases(),
            Scenario::SendMessageMissingField => cases::send_missing_field_cases(),
            Scenario::CancelMessageInvalidId
            | Scenario::CancelMessageValidId
            | Scenario::ReadMessage => ids.cases(),
        }
    }

    pub fn request(
        self,
        base: &BaseConfig,
        endpoints: &EndpointMap,
        case: &Case,
    ) -> Result<RequestInput, HarnessError> {
        let config = base.endpoint(endpoints.path(self));
        match (self, case) {
            (Scenario::SendMessageSuccess | Scenario::SendMessageMissingField, Case::Send(send)) => {
                RequestInput::post_json(config, &send.message())
            }
            (Scenario::CancelMessageInvalidId, Case::Id(id)) => {
                let untracked = id.checked_add(UNTRACKED_ID_OFFSET).ok_or_else(|| {
                    HarnessError::Config(format!(
                        "message id {id} cannot be shifted by {UNTRACKED_ID_OFFSET}"
                    ))
                })?;
                Ok(RequestInput::get(config.with_query(untracked.to_string())))
            }
            (Scenario::CancelMessageValidId, Case::Id(id)) => {
                Ok(RequestInput::get(config.with_query(id.to_string())))
            }
            (Scenario::ReadMessage, Case::Id(id)) => {
                RequestInput::post_json(config, &ReadRequest::find(Message::with_id(*id)))
            }
            _ => Err(HarnessError::CaseMismatch {
                scenario: self.name(),
                case: case.to_string(),
            }),
        }
    }

    pub fn expectation(self, case: &Case) -> Expectation {
        match self {
            Scenario::SendMessageSuccess | Scenario::CancelMessageValidId => {
                Expectation::status(200, "OK")
            }
            Scenario::SendMessageMissingField => Expectation::status(400, "Bad Request"),
            Scenario::CancelMessageInvalidId => Expectation::status(204, "No Content"),
            Scenario::ReadMessage => {
                let expectation = Expectation::status(200, "OK");
                match case {
                    Case::Id(id) => expectation.with_body_id(*id),
                    Case::Send(_) => expectation,
                }
            }
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s.trim())
            .ok_or_else(|| HarnessError::Config(format!("unknown scenario `{s}`")))
    }
}

/// A failed case, tagged with where it happened.
#[derive(Debug, Error)]
#[error("{scenario} {case}: {source}")]
pub struct ScenarioFailure {
    pub scenario: &'static str,
    pub case: String,
    #[source]
    pub source: HarnessError,
}

/// Runs scenario cases against one service. Clones share the HTTP client and
/// the read-only configuration.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    executor: HttpExecutor,
    endpoints: Arc<EndpointMap>,
}

impl ScenarioRunner {
    pub fn new(base: Arc<BaseConfig>, endpoints: Arc<EndpointMap>) -> Result<Self, HarnessError> {
        Ok(Self {
            executor: HttpExecutor::new(base)?,
            endpoints,
        })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Self::new(
            Arc::new(config.base.clone()),
            Arc::new(config.endpoints.clone()),
        )
    }

    /// Execute one case and check it. Returns the outcome on success so
    /// callers can make further checks.
    pub async fn run_case(
        &self,
        scenario: Scenario,
        case: &Case,
    ) -> Result<ResponseOutcome, ScenarioFailure> {
        let fail = |source: HarnessError| ScenarioFailure {
            scenario: scenario.name(),
            case: case.to_string(),
            source,
        };

        let request = scenario
            .request(self.executor.base(), &self.endpoints, case)
            .map_err(fail)?;
        let outcome = self.executor.execute(&request).await.map_err(fail)?;
        scenario.expectation(case).verify(&outcome).map_err(fail)?;

        info!(
            scenario = scenario.name(),
            case = %case,
            status = outcome.status_code,
            "case passed"
        );
        Ok(outcome)
    }

    /// Run every case of the given scenarios and collect a report. Results
    /// keep the order scenarios and cases were listed in, whatever the mode.
    pub async fn run_suite(&self, scenarios: &[Scenario], ids: &IdSource, mode: RunMode) -> RunReport {
        let plan: Vec<(Scenario, Case)> = scenarios
            .iter()
            .flat_map(|scenario| {
                scenario
                    .cases(ids)
                    .into_iter()
                    .map(move |case| (*scenario, case))
            })
            .collect();

        let started = Instant::now();
        let mut report = RunReport::default();
        match mode {
            RunMode::Serial => {
                for (scenario, case) in plan {
                    report.push(self.run_reported(scenario, case).await);
                }
            }
            RunMode::Parallel => {
                let handles: Vec<_> = plan
                    .iter()
                    .cloned()
                    .map(|(scenario, case)| {
                        let runner = self.clone();
                        tokio::spawn(async move { runner.run_reported(scenario, case).await })
                    })
                    .collect();

                for (handle, (scenario, case)) in handles.into_iter().zip(plan) {
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(err) => CaseReport {
                            scenario: scenario.name().to_string(),
                            case: case.to_string(),
                            passed: false,
                            duration_ms: 0,
                            error_kind: Some("task".to_string()),
                            error: Some(format!("case task failed: {err}")),
                        },
                    };
                    report.push(result);
                }
            }
        }
        report.duration_ms = started.elapsed().as_millis();
        report
    }

    async fn run_reported(&self, scenario: Scenario, case: Case) -> CaseReport {
        let started = Instant::now();
        let result = self.run_case(scenario, &case).await;
        let duration_ms = started.elapsed().as_millis();

        let (error_kind, error) = match result {
            Ok(_) => (None, None),
            Err(failure) => {
                warn!(
                    scenario = failure.scenario,
                    case = %failure.case,
                    kind = failure.source.kind(),
                    error = %failure.source,
                    "case failed"
                );
                (
                    Some(failure.source.kind().to_string()),
                    Some(failure.source.to_string()),
                )
            }
        };

        CaseReport {
            scenario: scenario.name().to_string(),
            case: case.to_string(),
            passed: error.is_none(),
            duration_ms,
            error_kind,
            error,
        }
    }
}
