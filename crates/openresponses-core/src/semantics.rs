//! Context semantics policy.
//!
//! Decides which request-level controls cannot be honored for a resolved
//! model. Fields are evaluated in a fixed order and every violation is
//! reported together, so the caller can reject a request in one response.

use crate::error::{GatewayError, GatewayResult};
use crate::request::RequestEnvelope;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model family that supports response continuation
pub const MODEL_FAMILY: &str = "openclaw";

const FIELD_PREVIOUS_RESPONSE_ID: &str = "previous_response_id";
const FIELD_REASONING: &str = "reasoning";
const FIELD_COMPACTION: &str = "context_management.compaction";
const FIELD_TRUNCATION: &str = "truncation";

/// A request field that must be rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedFieldEntry {
    /// Dotted path of the field
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl UnsupportedFieldEntry {
    /// Create a new entry
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Whether `model` accepts `previous_response_id`.
///
/// True for the bare family name and for `family:<variant>`.
#[must_use]
pub fn model_supports_previous_response_id(model: &str) -> bool {
    match model.strip_prefix(MODEL_FAMILY) {
        Some(rest) => rest.is_empty() || rest.starts_with(':'),
        None => false,
    }
}

/// Collect every unsupported field in `request` for `resolved_model`.
///
/// Returns an empty list for a compliant request.
#[must_use]
pub fn get_unsupported_context_semantics(
    request: &RequestEnvelope,
    resolved_model: &str,
) -> Vec<UnsupportedFieldEntry> {
    let mut unsupported = Vec::new();

    if request.previous_response_id.is_some() && !model_supports_previous_response_id(resolved_model)
    {
        unsupported.push(UnsupportedFieldEntry::new(
            FIELD_PREVIOUS_RESPONSE_ID,
            format!(
                "previous_response_id is only supported for {MODEL_FAMILY} models, not {resolved_model}"
            ),
        ));
    }

    if request.reasoning.is_some() {
        unsupported.push(UnsupportedFieldEntry::new(
            FIELD_REASONING,
            "reasoning controls are not honored by this gateway",
        ));
    }

    if request.has_compaction() {
        unsupported.push(UnsupportedFieldEntry::new(
            FIELD_COMPACTION,
            "context compaction is not honored by this gateway",
        ));
    }

    if request.truncation.is_some() {
        unsupported.push(UnsupportedFieldEntry::new(
            FIELD_TRUNCATION,
            "truncation controls are not honored by this gateway",
        ));
    }

    if !unsupported.is_empty() {
        debug!(
            model = %resolved_model,
            count = unsupported.len(),
            "Request carries unsupported context semantics"
        );
    }

    unsupported
}

/// Reject `request` if it carries any unsupported field.
///
/// # Errors
/// Returns `UnsupportedSemantics` listing every offending field
pub fn ensure_supported_context_semantics(
    request: &RequestEnvelope,
    resolved_model: &str,
) -> GatewayResult<()> {
    let fields = get_unsupported_context_semantics(request, resolved_model);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::UnsupportedSemantics {
            model: resolved_model.to_string(),
            fields,
        })
    }
}
