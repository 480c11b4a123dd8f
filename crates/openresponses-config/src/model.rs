//! Typed transport configuration.
//!
//! Field names follow the configuration document (`camelCase`), so a
//! normalized config serializes back into a document the loader accepts.

use openresponses_core::TransportMode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Which transport features a `(provider, model)` pair supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransportCapabilityEntry {
    /// Provider identifier
    #[validate(custom(function = "not_blank"))]
    pub provider: String,

    /// Model identifier
    #[validate(custom(function = "not_blank"))]
    pub model: String,

    /// Socket transport supported
    #[serde(default)]
    pub websocket_mode: bool,

    /// SSE streaming supported
    #[serde(default)]
    pub streaming: bool,

    /// Response continuation supported
    #[serde(default)]
    pub continuation_semantics: bool,
}

/// Normalization trims identifiers, so whitespace alone counts as empty
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("must be a non-empty string")));
    }
    Ok(())
}

impl TransportCapabilityEntry {
    /// Create an entry with every capability disabled
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            websocket_mode: false,
            streaming: false,
            continuation_semantics: false,
        }
    }

    /// Set websocket support
    #[must_use]
    pub fn with_websocket(mut self, enabled: bool) -> Self {
        self.websocket_mode = enabled;
        self
    }

    /// Set streaming support
    #[must_use]
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    /// Set continuation support
    #[must_use]
    pub fn with_continuation(mut self, enabled: bool) -> Self {
        self.continuation_semantics = enabled;
        self
    }

    /// Matrix key
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.provider, &self.model)
    }
}

/// Capability matrix with unique `(provider, model)` keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityMatrix {
    entries: Vec<TransportCapabilityEntry>,
}

impl CapabilityMatrix {
    /// Create an empty matrix
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; returns false and leaves the matrix unchanged if the key exists
    pub fn insert(&mut self, entry: TransportCapabilityEntry) -> bool {
        if self.find(&entry.provider, &entry.model).is_some() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Look up the entry for `(provider, model)`
    #[must_use]
    pub fn find(&self, provider: &str, model: &str) -> Option<&TransportCapabilityEntry> {
        self.entries
            .iter()
            .find(|e| e.provider == provider && e.model == model)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TransportCapabilityEntry> {
        self.entries.iter()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the matrix is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rollout policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPolicy {
    /// Requested mode
    pub mode: TransportMode,
    /// Share of `auto` traffic moved to the socket transport (0-100)
    pub canary_percent: u8,
    /// Socket reconnect attempts before falling back
    pub max_ws_retries: u32,
}

impl TransportPolicy {
    /// Create a policy for `mode` with no canary and no retries
    #[must_use]
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the canary percentage, clamped to 100
    #[must_use]
    pub fn with_canary_percent(mut self, percent: u8) -> Self {
        self.canary_percent = percent.min(crate::normalize::MAX_CANARY_PERCENT);
        self
    }

    /// Set the socket retry budget
    #[must_use]
    pub fn with_max_ws_retries(mut self, retries: u32) -> Self {
        self.max_ws_retries = retries;
        self
    }
}

/// Complete transport configuration, loaded and replaced as a whole.
///
/// Built only through normalization or the `with_*` builders, which keep
/// the matrix keys unique and the policy in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportConfig {
    /// Veto over socket selections. Defaults to true; only an explicit
    /// `false` turns a would-be websocket selection into SSE.
    pub enabled: bool,

    /// Capability matrix
    #[serde(rename = "transportCapabilityMatrix")]
    pub matrix: CapabilityMatrix,

    /// Rollout policy
    #[serde(rename = "transportPolicy")]
    pub policy: TransportPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            matrix: CapabilityMatrix::default(),
            policy: TransportPolicy::default(),
        }
    }
}

impl TransportConfig {
    /// Create a config with defaults: SSE mode, empty matrix
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the policy
    #[must_use]
    pub fn with_policy(mut self, policy: TransportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a matrix entry; duplicates are ignored
    #[must_use]
    pub fn with_entry(mut self, entry: TransportCapabilityEntry) -> Self {
        self.matrix.insert(entry);
        self
    }
}
