//! # Open Responses Transport
//!
//! Operator tooling for the Open Responses transport layer.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a transport configuration document
//! openresponses-transport validate --file transport.yaml
//!
//! # Show which transport a request would get
//! openresponses-transport resolve --file transport.yaml --model openclaw --request-key req-1
//!
//! # List request fields the target model cannot honor
//! openresponses-transport check --request body.json
//!
//! # Environment overrides apply to validate and resolve
//! OPENRESPONSES_TRANSPORT_MODE=auto openresponses-transport resolve --file transport.yaml --model openclaw
//! ```

use anyhow::Result;
use clap::Parser;
use openresponses_telemetry::{init_logging, LoggingConfig};
use std::process::ExitCode;

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logging = LoggingConfig::new()
        .with_level(cli.log_level.clone())
        .with_json(cli.json_logs);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let passed = cli.execute().await?;
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
