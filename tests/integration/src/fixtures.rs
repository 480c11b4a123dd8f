//! Test fixtures and sample data for integration tests

use openresponses_config::{TransportCapabilityEntry, TransportConfig, TransportPolicy};
use openresponses_core::{RequestEnvelope, TransportMode};
use serde_json::{json, Value};

/// Raw config document with websocket-capable native and partner models
pub fn rollout_document(mode: &str, canary_percent: u64) -> Value {
    json!({
        "enabled": true,
        "transportCapabilityMatrix": {
            "entries": [
                {"provider": "openclaw", "model": "openclaw", "websocketMode": true, "streaming": true, "continuationSemantics": true},
                {"provider": "openclaw", "model": "openclaw:beta", "websocketMode": true},
                {"provider": "openclaw", "model": "openclaw:sse-only", "streaming": true},
                {"provider": "partner", "model": "gpt-4o", "websocketMode": true}
            ]
        },
        "transportPolicy": {
            "mode": mode,
            "canaryPercent": canary_percent,
            "maxWsRetries": 2
        }
    })
}

/// Typed config equivalent to `rollout_document`
pub fn rollout_config(mode: TransportMode, canary_percent: u8) -> TransportConfig {
    TransportConfig::new()
        .with_enabled(true)
        .with_policy(
            TransportPolicy::new(mode)
                .with_canary_percent(canary_percent)
                .with_max_ws_retries(2),
        )
        .with_entry(
            TransportCapabilityEntry::new("openclaw", "openclaw")
                .with_websocket(true)
                .with_streaming(true)
                .with_continuation(true),
        )
        .with_entry(TransportCapabilityEntry::new("openclaw", "openclaw:beta").with_websocket(true))
        .with_entry(TransportCapabilityEntry::new("openclaw", "openclaw:sse-only").with_streaming(true))
        .with_entry(TransportCapabilityEntry::new("partner", "gpt-4o").with_websocket(true))
}

/// Plain request with no context controls
pub fn plain_request(model: &str) -> RequestEnvelope {
    RequestEnvelope::new(model, "Hello, how are you?")
}

/// Continuation request
pub fn continuation_request(model: &str) -> RequestEnvelope {
    plain_request(model).with_previous_response_id("resp_prev_1")
}

/// Request carrying every context control
pub fn fully_loaded_request(model: &str) -> RequestEnvelope {
    continuation_request(model)
        .with_reasoning(json!({"effort": "high"}))
        .with_compaction(json!({"mode": "auto"}))
        .with_truncation("auto")
}
