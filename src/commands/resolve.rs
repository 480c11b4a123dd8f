//! Resolve command - show the transport a request would be given.

use anyhow::{Context, Result};
use clap::Args;
use openresponses_config::ConfigLoader;
use openresponses_routing::{
    resolve_open_responses_transport_selection, TransportSelection, TransportSelectionInput,
};
use std::path::PathBuf;

use super::print_json;

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Transport configuration file (JSON, YAML or TOML)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Target model
    #[arg(short, long)]
    pub model: String,

    /// Stable request key used for canary bucketing
    #[arg(long)]
    pub request_key: Option<String>,

    /// Provider, defaults to the native provider
    #[arg(long)]
    pub provider: Option<String>,

    /// Ignore `OPENRESPONSES_*` environment overrides
    #[arg(long)]
    pub no_env: bool,
}

/// Load and normalize the config, then resolve.
pub async fn resolve_file(args: &ResolveArgs) -> Result<TransportSelection> {
    let config = ConfigLoader::new()
        .with_file(&args.file)
        .with_env_overrides(!args.no_env)
        .load()
        .await
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let mut input = TransportSelectionInput::new(&config, &args.model);
    if let Some(key) = &args.request_key {
        input = input.with_request_key(key);
    }
    if let Some(provider) = &args.provider {
        input = input.with_provider(provider);
    }

    Ok(resolve_open_responses_transport_selection(&input))
}

/// Execute the resolve command.
pub async fn execute(args: ResolveArgs) -> Result<bool> {
    let selection = resolve_file(&args).await?;
    print_json(&selection)?;
    Ok(true)
}
