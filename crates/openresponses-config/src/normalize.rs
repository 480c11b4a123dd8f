//! Total normalization of a raw transport configuration document.
//!
//! Never fails: anything missing or malformed falls back to its default and
//! out-of-range numbers are clamped. Use `validate` for hard failures.

use crate::model::{CapabilityMatrix, TransportCapabilityEntry, TransportConfig, TransportPolicy};
use openresponses_core::TransportMode;
use serde_json::{Map, Value};
use tracing::debug;

/// Upper bound of `canaryPercent`
pub const MAX_CANARY_PERCENT: u8 = 100;

/// Normalize a raw document (`None` when no document was supplied).
#[must_use]
pub fn normalize_open_responses_transport_config(raw: Option<&Value>) -> TransportConfig {
    let Some(doc) = raw.and_then(Value::as_object) else {
        return TransportConfig::default();
    };

    let enabled = doc.get("enabled").and_then(Value::as_bool).unwrap_or(true);

    let policy = doc
        .get("transportPolicy")
        .and_then(Value::as_object)
        .map(normalize_policy)
        .unwrap_or_default();

    let matrix = doc
        .get("transportCapabilityMatrix")
        .and_then(|m| m.get("entries"))
        .and_then(Value::as_array)
        .map(|entries| normalize_matrix(entries))
        .unwrap_or_default();

    TransportConfig {
        enabled,
        matrix,
        policy,
    }
}

fn normalize_policy(policy: &Map<String, Value>) -> TransportPolicy {
    let mode = policy
        .get("mode")
        .and_then(Value::as_str)
        .and_then(TransportMode::parse_lenient)
        .unwrap_or_default();

    let canary_percent = policy
        .get("canaryPercent")
        .and_then(coerce_integer)
        .map_or(0, |v| {
            // Clamped into 0..=100 so the narrowing is lossless.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let clamped = v.clamp(0, i64::from(MAX_CANARY_PERCENT)) as u8;
            clamped
        });

    let max_ws_retries = policy
        .get("maxWsRetries")
        .and_then(coerce_integer)
        .map_or(0, |v| u32::try_from(v.max(0)).unwrap_or(u32::MAX));

    TransportPolicy {
        mode,
        canary_percent,
        max_ws_retries,
    }
}

fn normalize_matrix(entries: &[Value]) -> CapabilityMatrix {
    let mut matrix = CapabilityMatrix::new();

    for (index, raw) in entries.iter().enumerate() {
        let Some(entry) = raw.as_object().and_then(normalize_entry) else {
            debug!(index, "Dropping malformed transport capability entry");
            continue;
        };

        if !matrix.insert(entry) {
            debug!(index, "Dropping duplicate transport capability entry");
        }
    }

    matrix
}

fn normalize_entry(entry: &Map<String, Value>) -> Option<TransportCapabilityEntry> {
    let provider = non_empty_str(entry.get("provider"))?;
    let model = non_empty_str(entry.get("model"))?;
    let flag = |key: &str| entry.get(key).and_then(Value::as_bool).unwrap_or(false);

    Some(TransportCapabilityEntry {
        provider: provider.to_string(),
        model: model.to_string(),
        websocket_mode: flag("websocketMode"),
        streaming: flag("streaming"),
        continuation_semantics: flag("continuationSemantics"),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read a number (or numeric string), truncating fractions toward zero.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().and_then(float_to_i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(float_to_i64),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_i64(value: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    value.is_finite().then(|| value.trunc() as i64)
}
