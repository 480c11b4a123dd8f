//! Strict validation of a raw transport configuration document.
//!
//! Unlike normalization this pass coerces nothing. It walks the whole
//! document and reports every violation it finds.

use crate::model::TransportCapabilityEntry;
use crate::normalize::MAX_CANARY_PERCENT;
use openresponses_core::TransportMode;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use validator::Validate;

const MATRIX: &str = "transportCapabilityMatrix";
const POLICY: &str = "transportPolicy";

/// Outcome of strict validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True when `errors` is empty
    pub ok: bool,
    /// Every violation found, in document order
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a raw document (`None` when no document was supplied).
///
/// An absent document, like any absent optional field, is valid: it
/// normalizes to the defaults.
#[must_use]
pub fn validate_open_responses_transport_config(raw: Option<&Value>) -> ValidationReport {
    let mut errors = Vec::new();

    match raw {
        None => {}
        Some(Value::Object(doc)) => validate_document(doc, &mut errors),
        Some(other) => errors.push(format!(
            "transport config must be an object, got {}",
            type_name(other)
        )),
    }

    ValidationReport::from_errors(errors)
}

fn validate_document(doc: &Map<String, Value>, errors: &mut Vec<String>) {
    if let Some(enabled) = doc.get("enabled") {
        if !enabled.is_boolean() {
            errors.push(format!("enabled must be a boolean, got {}", type_name(enabled)));
        }
    }

    match doc.get(MATRIX) {
        None => {}
        Some(Value::Object(matrix)) => validate_matrix(matrix, errors),
        Some(other) => errors.push(format!("{MATRIX} must be an object, got {}", type_name(other))),
    }

    match doc.get(POLICY) {
        None => {}
        Some(Value::Object(policy)) => validate_policy(policy, errors),
        Some(other) => errors.push(format!("{POLICY} must be an object, got {}", type_name(other))),
    }
}

fn validate_matrix(matrix: &Map<String, Value>, errors: &mut Vec<String>) {
    let entries = match matrix.get("entries") {
        None => return,
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            errors.push(format!(
                "{MATRIX}.entries must be an array, got {}",
                type_name(other)
            ));
            return;
        }
    };

    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();

    for (index, raw) in entries.iter().enumerate() {
        let path = format!("{MATRIX}.entries[{index}]");

        let Some(object) = raw.as_object() else {
            errors.push(format!("{path} must be an object, got {}", type_name(raw)));
            continue;
        };

        match serde_json::from_value::<TransportCapabilityEntry>(raw.clone()) {
            Ok(entry) => {
                if let Err(field_errors) = entry.validate() {
                    let mut fields: Vec<_> = field_errors.field_errors().into_iter().collect();
                    fields.sort_by(|a, b| a.0.cmp(&b.0));
                    for (field, failures) in fields {
                        for failure in failures {
                            errors.push(format!(
                                "{path}.{field} {}",
                                failure.message.as_deref().unwrap_or("is invalid")
                            ));
                        }
                    }
                }
            }
            Err(err) => errors.push(format!("{path}: {err}")),
        }

        // Same key normalization uses
        let provider = object.get("provider").and_then(Value::as_str).map(str::trim);
        let model = object.get("model").and_then(Value::as_str).map(str::trim);
        if let (Some(provider), Some(model)) = (provider, model) {
            if provider.is_empty() || model.is_empty() {
                continue;
            }
            if let Some(first) = seen.get(&(provider, model)) {
                errors.push(format!(
                    "duplicate transport capability entry for provider '{provider}' and model '{model}' \
                     ({MATRIX}.entries[{first}] and {path})"
                ));
            } else {
                seen.insert((provider, model), index);
            }
        }
    }
}

fn validate_policy(policy: &Map<String, Value>, errors: &mut Vec<String>) {
    let allowed = TransportMode::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    match policy.get("mode") {
        None => {}
        Some(Value::String(mode)) if mode.parse::<TransportMode>().is_ok() => {}
        Some(other) => errors.push(format!(
            "{POLICY}.mode must be one of {allowed}, got {other}"
        )),
    }

    if let Some(value) = policy.get("canaryPercent") {
        match exact_integer(value) {
            Some(v) if (0..=i128::from(MAX_CANARY_PERCENT)).contains(&v) => {}
            Some(v) => errors.push(format!(
                "{POLICY}.canaryPercent must be between 0 and {MAX_CANARY_PERCENT}, got {v}"
            )),
            None => errors.push(format!(
                "{POLICY}.canaryPercent must be an integer, got {value}"
            )),
        }
    }

    if let Some(value) = policy.get("maxWsRetries") {
        match exact_integer(value) {
            Some(v) if v >= 0 => {}
            Some(v) => errors.push(format!(
                "{POLICY}.maxWsRetries must be a non-negative integer, got {v}"
            )),
            None => errors.push(format!(
                "{POLICY}.maxWsRetries must be an integer, got {value}"
            )),
        }
    }
}

/// Integral JSON number, accepting floats without a fractional part.
#[allow(clippy::cast_possible_truncation)]
fn exact_integer(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(v) = number.as_i64() {
        return Some(i128::from(v));
    }
    if let Some(v) = number.as_u64() {
        return Some(i128::from(v));
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
