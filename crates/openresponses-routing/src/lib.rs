//! # Open Responses Routing
//!
//! Per-request transport selection for the Open Responses transport layer.
//!
//! This crate provides:
//! - Deterministic canary bucketing from a stable request key
//! - Resolution of the wire transport under the configured rollout policy
//! - A resolver bound to a hot-swappable config store

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bucket;
pub mod resolver;
pub mod selection;

// Re-export main types
pub use bucket::{canary_bucket, stable_hash, BUCKET_COUNT};
pub use resolver::TransportResolver;
pub use selection::{
    resolve_open_responses_transport_selection, FallbackReason, TransportSelection,
    TransportSelectionInput, DEFAULT_PROVIDER,
};
