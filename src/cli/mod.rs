//! # CLI Support
//!
//! Runs the contract suite from the command line, e.g. in a CI pipeline:
//! `message-contract --base-uri https://staging.example/v3 --seed 7 --format json`.
//! Every flag that describes the target can also come from the environment.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::cases::IdSource;
use crate::config::{EndpointMap, HarnessConfig};
use crate::error::HarnessError;
use crate::http::{BaseConfig, DEFAULT_BASE_URI};
use crate::scenarios::{Scenario, ScenarioRunner};
use crate::testing::{RunMode, RunReport};

/// CLI configuration parsed from command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "message-contract",
    version,
    about = "Verify a message-processing service against its HTTP contract"
)]
pub struct CliConfig {
    /// Host every endpoint path is resolved against.
    #[arg(long, env = "MESSAGE_CONTRACT_BASE_URI", default_value = DEFAULT_BASE_URI)]
    pub base_uri: String,

    /// JSON file overriding endpoint paths, keyed by scenario name.
    #[arg(long, env = "MESSAGE_CONTRACT_ENDPOINTS")]
    pub endpoints: Option<PathBuf>,

    /// Deadline for each HTTP round trip.
    #[arg(long, env = "MESSAGE_CONTRACT_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Seed for sampled message ids. A fresh seed is drawn and logged when omitted.
    #[arg(long, env = "MESSAGE_CONTRACT_SEED")]
    pub seed: Option<u64>,

    /// Explicit message ids, comma separated.
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["seed", "boundary_ids"])]
    pub ids: Vec<i64>,

    /// Use the boundary ids 0, 1 and 9.
    #[arg(long, conflicts_with = "seed")]
    pub boundary_ids: bool,

    /// How many ids to sample per id-driven scenario.
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Only run the named scenario. Repeatable.
    #[arg(long = "scenario")]
    pub scenarios: Vec<Scenario>,

    /// Run cases concurrently.
    #[arg(long)]
    pub parallel: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Output format for CLI reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliConfig {
    pub fn harness_config(&self) -> Result<HarnessConfig, HarnessError> {
        let endpoints = match &self.endpoints {
            Some(path) => EndpointMap::from_json_file(path)?,
            None => EndpointMap::default(),
        };

        let ids = if self.boundary_ids {
            IdSource::Boundary
        } else if !self.ids.is_empty() {
            IdSource::Fixed(self.ids.clone())
        } else if let Some(seed) = self.seed {
            IdSource::Seeded {
                seed,
                count: self.count,
            }
        } else {
            IdSource::random(self.count)
        };

        let scenarios = if self.scenarios.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            self.scenarios.clone()
        };

        let config = HarnessConfig {
            base: BaseConfig::new(self.base_uri.clone())
                .with_deadline(Duration::from_millis(self.timeout_ms)),
            endpoints,
            ids,
            run_mode: if self.parallel {
                RunMode::Parallel
            } else {
                RunMode::Serial
            },
            scenarios,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Build the runner from the parsed flags and execute the selected scenarios.
pub async fn run(cli: &CliConfig) -> Result<RunReport, HarnessError> {
    let config = cli.harness_config()?;
    let runner = ScenarioRunner::from_config(&config)?;
    Ok(runner
        .run_suite(&config.scenarios, &config.ids, config.run_mode)
        .await)
}

pub fn render(report: &RunReport, format: OutputFormat) -> Result<String, HarnessError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        let verdict = if result.passed { "PASS" } else { "FAIL" };
        let _ = writeln!(
            out,
            "{verdict} {} {} ({}ms)",
            result.scenario, result.case, result.duration_ms
        );
        if let Some(error) = &result.error {
            let _ = writeln!(out, "     {error}");
        }
    }
    let _ = write!(
        out,
        "{} cases: {} passed, {} failed in {}ms",
        report.total, report.passed, report.failed, report.duration_ms
    );
    out
}

pub fn write_report(path: &Path, rendered: &str) -> Result<(), HarnessError> {
    fs::write(path, rendered).map_err(|e| {
        HarnessError::Config(format!("failed to write report `{}`: {e}", path.display()))
    })
}
