//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Open Responses transport tooling
#[derive(Parser, Debug)]
#[command(name = "openresponses-transport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter directive, overridden by `RUST_LOG`
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a transport configuration file
    Validate(commands::validate::ValidateArgs),

    /// Resolve the transport for one request
    Resolve(commands::resolve::ResolveArgs),

    /// Check a request body for unsupported context semantics
    Check(commands::check::CheckArgs),
}

impl Cli {
    /// Execute the command. `Ok(false)` means the command ran and the
    /// input did not pass.
    pub async fn execute(self) -> Result<bool> {
        match self.command {
            Commands::Validate(args) => commands::validate::execute(args).await,
            Commands::Resolve(args) => commands::resolve::execute(args).await,
            Commands::Check(args) => commands::check::execute(args).await,
        }
    }
}
