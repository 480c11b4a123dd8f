//! CLI command implementations.

pub mod check;
pub mod resolve;
pub mod validate;

use anyhow::Result;
use serde::Serialize;

/// Print pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}
