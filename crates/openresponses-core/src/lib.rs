//! # Open Responses Core
//!
//! Core types and error handling for the Open Responses transport layer.
//!
//! This crate provides the foundational types used throughout the workspace:
//! - The inbound request envelope
//! - Transport and rollout mode enums
//! - Context semantics policy (which request controls a model honors)
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod semantics;
pub mod transport;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult};
pub use request::RequestEnvelope;
pub use semantics::{
    ensure_supported_context_semantics, get_unsupported_context_semantics,
    model_supports_previous_response_id, UnsupportedFieldEntry, MODEL_FAMILY,
};
pub use transport::{TransportKind, TransportMode};
