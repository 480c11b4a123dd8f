//! Request types for the gateway.
//!
//! The envelope mirrors the subset of an OpenAI Responses-style body that the
//! transport layer inspects. Every other field is kept verbatim in `extra` so
//! the body can be forwarded untouched.

use crate::error::GatewayResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const COMPACTION_KEY: &str = "compaction";

/// Inbound Responses-style request body.
///
/// The controls the semantics policy inspects are held as raw values: only
/// their presence matters, so a malformed value must still reach the policy
/// instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Target model (e.g., "openclaw", "openclaw:beta", "gpt-4o")
    pub model: String,

    /// Conversation input, passed through opaque
    #[serde(default)]
    pub input: Value,

    /// Id of a prior response to continue from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<Value>,

    /// Reasoning controls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,

    /// Context management controls; `compaction` is the key of interest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_management: Option<Value>,

    /// Truncation strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Value>,

    /// Fields the transport layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestEnvelope {
    /// Create an envelope with only model and input set
    #[must_use]
    pub fn new(model: impl Into<String>, input: impl Into<Value>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            ..Default::default()
        }
    }

    /// Parse an envelope from a JSON string
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the body is not a valid envelope
    pub fn from_json_str(body: &str) -> GatewayResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Parse an envelope from an already decoded JSON value
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the value is not a valid envelope
    pub fn from_value(value: Value) -> GatewayResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Set `previous_response_id`
    #[must_use]
    pub fn with_previous_response_id(mut self, id: impl Into<Value>) -> Self {
        self.previous_response_id = Some(id.into());
        self
    }

    /// Set `reasoning`
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: Value) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    /// Set `context_management.compaction`, replacing a non-object block
    #[must_use]
    pub fn with_compaction(mut self, compaction: impl Into<Value>) -> Self {
        let management = self
            .context_management
            .get_or_insert_with(|| Value::Object(Map::new()));
        if !management.is_object() {
            *management = Value::Object(Map::new());
        }
        if let Value::Object(map) = management {
            map.insert(COMPACTION_KEY.to_string(), compaction.into());
        }
        self
    }

    /// Set `truncation`
    #[must_use]
    pub fn with_truncation(mut self, truncation: impl Into<Value>) -> Self {
        self.truncation = Some(truncation.into());
        self
    }

    /// Whether `context_management.compaction` is present and not null
    #[must_use]
    pub fn has_compaction(&self) -> bool {
        self.context_management
            .as_ref()
            .and_then(|cm| cm.get(COMPACTION_KEY))
            .is_some_and(|c| !c.is_null())
    }
}
