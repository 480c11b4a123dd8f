//! Validate command - strict validation of a transport config file.

use anyhow::Result;
use clap::Args;
use openresponses_config::{validate_open_responses_transport_config, ConfigLoader, ValidationReport};
use std::path::PathBuf;
use tracing::info;

use super::print_json;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Transport configuration file (JSON, YAML or TOML)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Ignore `OPENRESPONSES_*` environment overrides
    #[arg(long)]
    pub no_env: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Read the file and validate the raw document. Read and parse failures
/// are reported as validation errors.
pub async fn validate_file(args: &ValidateArgs) -> ValidationReport {
    let loader = ConfigLoader::new()
        .with_file(&args.file)
        .with_env_overrides(!args.no_env);

    match loader.load_raw().await {
        Ok(raw) => validate_open_responses_transport_config(raw.as_ref()),
        Err(e) => ValidationReport {
            ok: false,
            errors: vec![e.to_string()],
        },
    }
}

/// Execute the validate command.
pub async fn execute(args: ValidateArgs) -> Result<bool> {
    let report = validate_file(&args).await;
    info!(
        file = %args.file.display(),
        ok = report.ok,
        errors = report.errors.len(),
        "Transport config validated"
    );

    if args.json {
        print_json(&report)?;
    } else if report.ok {
        println!("Configuration file is valid: {}", args.file.display());
    } else {
        eprintln!("Configuration file is invalid: {}", args.file.display());
        for error in &report.errors {
            eprintln!("  - {error}");
        }
    }

    Ok(report.ok)
}
