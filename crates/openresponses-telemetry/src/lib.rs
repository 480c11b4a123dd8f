//! # Open Responses Telemetry
//!
//! Observability for the Open Responses transport layer.
//!
//! This crate provides:
//! - The transport run ledger with per-(provider, model) aggregates
//! - Prometheus metrics for transport runs and fallbacks
//! - Structured logging setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod metrics;

// Re-export main types
pub use aggregate::{nearest_rank_percentile, TransportAggregate};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{
    now_ms, CompleteRun, CompletionStatus, LedgerConfig, RecordFallback, Retention, RunStatus,
    StartRun, TransportLedger, TransportRun, TransportRunSummary, TransportSummarySnapshot,
};
pub use logging::{init_logging, LoggingConfig, LoggingError};
pub use metrics::{TransportMetrics, FALLBACK_REASON_LABELS, OTHER_REASON_LABEL};
