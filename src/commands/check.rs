//! Check command - list request fields the target model cannot honor.

use anyhow::{Context, Result};
use clap::Args;
use openresponses_core::{get_unsupported_context_semantics, RequestEnvelope, UnsupportedFieldEntry};
use serde::Serialize;
use std::path::PathBuf;

use super::print_json;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Request body as a JSON file
    #[arg(short, long)]
    pub request: PathBuf,

    /// Resolved model, defaults to the body's `model`
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Check result.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Model the request was checked against
    pub model: String,
    /// True when nothing needs rejecting
    pub supported: bool,
    /// Offending fields in evaluation order
    pub unsupported: Vec<UnsupportedFieldEntry>,
}

/// Read the body and evaluate it against the resolved model.
pub async fn check_file(args: &CheckArgs) -> Result<CheckReport> {
    let body = tokio::fs::read_to_string(&args.request)
        .await
        .with_context(|| format!("failed to read {}", args.request.display()))?;
    let request = RequestEnvelope::from_json_str(&body)
        .with_context(|| format!("failed to parse {}", args.request.display()))?;

    let model = args.model.clone().unwrap_or_else(|| request.model.clone());
    let unsupported = get_unsupported_context_semantics(&request, &model);

    Ok(CheckReport {
        model,
        supported: unsupported.is_empty(),
        unsupported,
    })
}

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> Result<bool> {
    let report = check_file(&args).await?;
    print_json(&report)?;
    Ok(report.supported)
}
