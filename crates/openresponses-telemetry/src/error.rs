//! Ledger error types.

use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger integrity errors. Each one indicates a bug in the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// `start` for a run id that already exists
    #[error("duplicate_run: transport run {run_id} already exists")]
    DuplicateRun {
        /// Offending run id
        run_id: String,
    },

    /// `fallback` or `complete` for a run that was never started or is closed
    #[error("unknown_run: transport run {run_id} is not open")]
    UnknownRun {
        /// Offending run id
        run_id: String,
    },
}

impl LedgerError {
    /// Stable machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateRun { .. } => "duplicate_run",
            Self::UnknownRun { .. } => "unknown_run",
        }
    }

    /// Run id the error refers to
    #[must_use]
    pub fn run_id(&self) -> &str {
        match self {
            Self::DuplicateRun { run_id } | Self::UnknownRun { run_id } => run_id,
        }
    }
}
