//! Transport selection.
//!
//! Resolution is a pure function of the config snapshot, the model, the
//! provider and the request key. Falling back to SSE is a recorded
//! degradation, never an error.

use crate::bucket::canary_bucket;
use openresponses_config::TransportConfig;
use openresponses_core::{TransportKind, TransportMode};
use serde::Serialize;
use std::fmt;

/// Provider used for matrix lookups when the caller does not name one
pub const DEFAULT_PROVIDER: &str = "openclaw";

/// Why the socket transport was not selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// `websocket` mode, but the model has no socket capability
    ModelNotCapable,
    /// `auto` mode with a zero canary
    AutoCanaryDisabled,
    /// `auto` mode, but the model has no socket capability
    AutoModelNotCapable,
    /// `auto` mode, request bucket outside the canary
    AutoCanaryMiss,
    /// Socket transport would have been selected, but `enabled` is false
    TransportDisabled,
}

impl FallbackReason {
    /// Reason code as recorded in telemetry
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelNotCapable => "model_not_capable",
            Self::AutoCanaryDisabled => "auto_canary_disabled",
            Self::AutoModelNotCapable => "auto_model_not_capable",
            Self::AutoCanaryMiss => "auto_canary_miss",
            Self::TransportDisabled => "transport_disabled",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to resolution
#[derive(Debug, Clone, Copy)]
pub struct TransportSelectionInput<'a> {
    /// Config snapshot
    pub config: &'a TransportConfig,
    /// Resolved model
    pub model: &'a str,
    /// Stable per-request key for canary bucketing; the model is used when absent
    pub request_key: Option<&'a str>,
    /// Provider for the matrix lookup; `DEFAULT_PROVIDER` when absent
    pub provider: Option<&'a str>,
}

impl<'a> TransportSelectionInput<'a> {
    /// Create an input without request key or provider
    #[must_use]
    pub fn new(config: &'a TransportConfig, model: &'a str) -> Self {
        Self {
            config,
            model,
            request_key: None,
            provider: None,
        }
    }

    /// Set the request key
    #[must_use]
    pub fn with_request_key(mut self, key: &'a str) -> Self {
        self.request_key = Some(key);
        self
    }

    /// Set the provider
    #[must_use]
    pub fn with_provider(mut self, provider: &'a str) -> Self {
        self.provider = Some(provider);
        self
    }

    fn provider(&self) -> &'a str {
        self.provider.unwrap_or(DEFAULT_PROVIDER)
    }
}

/// Outcome of resolution. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSelection {
    requested_mode: TransportMode,
    selected_transport: TransportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket: Option<u8>,
    retry_budget: u32,
}

impl TransportSelection {
    fn sse(requested_mode: TransportMode, reason: Option<FallbackReason>) -> Self {
        Self {
            requested_mode,
            selected_transport: TransportKind::Sse,
            fallback_reason: reason,
            bucket: None,
            retry_budget: 0,
        }
    }

    fn websocket(requested_mode: TransportMode, retry_budget: u32) -> Self {
        Self {
            requested_mode,
            selected_transport: TransportKind::Websocket,
            fallback_reason: None,
            bucket: None,
            retry_budget,
        }
    }

    fn disabled(self) -> Self {
        Self {
            selected_transport: TransportKind::Sse,
            fallback_reason: Some(FallbackReason::TransportDisabled),
            retry_budget: 0,
            ..self
        }
    }

    fn with_bucket(mut self, bucket: u8) -> Self {
        self.bucket = Some(bucket);
        self
    }

    /// Mode from the policy
    #[must_use]
    pub fn requested_mode(&self) -> TransportMode {
        self.requested_mode
    }

    /// Transport to use
    #[must_use]
    pub fn selected_transport(&self) -> TransportKind {
        self.selected_transport
    }

    /// Why websocket was not selected, if it was not
    #[must_use]
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        self.fallback_reason
    }

    /// Canary bucket, for `auto` mode
    #[must_use]
    pub fn bucket(&self) -> Option<u8> {
        self.bucket
    }

    /// Socket reconnects to attempt before a runtime fallback; zero for SSE
    #[must_use]
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }
}

/// Resolve the transport for one request.
#[must_use]
pub fn resolve_open_responses_transport_selection(
    input: &TransportSelectionInput<'_>,
) -> TransportSelection {
    let config = input.config;
    let mode = config.policy.mode;

    if mode == TransportMode::Sse {
        return TransportSelection::sse(mode, None);
    }

    let capable = config
        .matrix
        .find(input.provider(), input.model)
        .is_some_and(|entry| entry.websocket_mode);
    let retries = config.policy.max_ws_retries;

    let selection = match mode {
        TransportMode::Sse => TransportSelection::sse(mode, None),
        TransportMode::Websocket => {
            if capable {
                TransportSelection::websocket(mode, retries)
            } else {
                TransportSelection::sse(mode, Some(FallbackReason::ModelNotCapable))
            }
        }
        TransportMode::Auto => {
            let bucket = canary_bucket(input.request_key.unwrap_or(input.model));
            let canary = config.policy.canary_percent;

            let selection = if canary == 0 {
                TransportSelection::sse(mode, Some(FallbackReason::AutoCanaryDisabled))
            } else if !capable {
                TransportSelection::sse(mode, Some(FallbackReason::AutoModelNotCapable))
            } else if bucket < canary {
                TransportSelection::websocket(mode, retries)
            } else {
                TransportSelection::sse(mode, Some(FallbackReason::AutoCanaryMiss))
            };
            selection.with_bucket(bucket)
        }
    };

    // An explicit `enabled = false` only vetoes a socket selection
    if !config.enabled && selection.selected_transport == TransportKind::Websocket {
        return selection.disabled();
    }
    selection
}
