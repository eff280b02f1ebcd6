use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use message_contract::cli::{self, CliConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = CliConfig::parse();
    let report = match cli::run(&cli).await {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "could not start the contract run");
            return ExitCode::from(2);
        }
    };

    let rendered = match cli::render(&report, cli.format) {
        Ok(rendered) => rendered,
        Err(err) => {
            error!(%err, "could not render the report");
            return ExitCode::from(2);
        }
    };
    println!("{rendered}");

    if let Some(path) = &cli.report {
        if let Err(err) = cli::write_report(path, &rendered) {
            error!(%err, "could not write the report file");
            return ExitCode::from(2);
        }
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
