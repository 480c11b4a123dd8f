//! Error types for the transport layer.

use crate::semantics::UnsupportedFieldEntry;
use thiserror::Error;

/// Result alias used across the core crate.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised before any transport work begins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request uses controls the target model does not honor.
    #[error("request uses unsupported context semantics for model {}: {}", .model, fields_list(.fields))]
    UnsupportedSemantics {
        /// Resolved model the request was checked against.
        model: String,
        /// Every offending field, in evaluation order.
        fields: Vec<UnsupportedFieldEntry>,
    },

    /// The request body could not be parsed.
    #[error("invalid request body: {message}")]
    InvalidRequest {
        /// Parser diagnostic.
        message: String,
    },

    /// A transport or mode name was not recognised.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// What was being parsed (e.g. "transport").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

fn fields_list(fields: &[UnsupportedFieldEntry]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl GatewayError {
    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Stable machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedSemantics { .. } => "unsupported_semantics",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnknownVariant { .. } => "unknown_variant",
        }
    }

    /// HTTP status the connection layer should answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        400
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_request(err.to_string())
    }
}
