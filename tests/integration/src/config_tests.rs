//! Config files on disk, validation, and hot reload under a live resolver

use crate::fixtures::*;
use crate::helpers::*;
use openresponses_config::{
    apply_env_overrides, normalize_open_responses_transport_config,
    validate_open_responses_transport_config, ConfigLoader, TransportConfigStore,
};
use openresponses_core::{TransportKind, TransportMode};
use openresponses_routing::{FallbackReason, TransportResolver};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const YAML_AUTO: &str = r"
enabled: true
transportCapabilityMatrix:
  entries:
    - provider: openclaw
      model: openclaw
      websocketMode: true
transportPolicy:
  mode: auto
  canaryPercent: 60
  maxWsRetries: 4
";

const TOML_DISABLED: &str = r#"
enabled = false

[transportPolicy]
mode = "websocket"

[[transportCapabilityMatrix.entries]]
provider = "openclaw"
model = "openclaw"
websocketMode = true
"#;

#[tokio::test]
async fn test_reload_switches_live_resolver() {
    init_tracing();
    let auto = write_config(".yaml", YAML_AUTO);
    let disabled = write_config(".toml", TOML_DISABLED);

    let store = Arc::new(TransportConfigStore::default());
    let resolver = TransportResolver::new(Arc::clone(&store));

    let generation = store
        .reload_from(&ConfigLoader::new().with_file(auto.path()))
        .await
        .unwrap();
    assert_eq!(generation, 1);
    let selection = resolver.resolve("openclaw", Some("req-1"), None);
    assert_eq!(selection.selected_transport(), TransportKind::Websocket);
    assert_eq!(selection.retry_budget(), 4);

    store
        .reload_from(&ConfigLoader::new().with_file(disabled.path()))
        .await
        .unwrap();
    let selection = resolver.resolve("openclaw", Some("req-1"), None);
    assert_eq!(selection.requested_mode(), TransportMode::Websocket);
    assert_eq!(selection.fallback_reason(), Some(FallbackReason::TransportDisabled));
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_config() {
    let auto = write_config(".yaml", YAML_AUTO);
    let broken = write_config(".json", "{\"enabled\": tru");

    let store = Arc::new(TransportConfigStore::default());
    store
        .reload_from(&ConfigLoader::new().with_file(auto.path()))
        .await
        .unwrap();

    let err = store
        .reload_from(&ConfigLoader::new().with_file(broken.path()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "config_parse");
    assert_eq!(store.generation(), 1);
    assert_eq!(store.snapshot().policy.mode, TransportMode::Auto);
}

#[tokio::test]
async fn test_load_validated_rejects_what_load_repairs() {
    let file = write_config(
        ".json",
        r#"{"enabled": true, "transportPolicy": {"mode": "turbo", "canaryPercent": 250}}"#,
    );
    let loader = ConfigLoader::new().with_file(file.path());

    let repaired = loader.load().await.unwrap();
    assert_eq!(repaired.policy.mode, TransportMode::Sse);
    assert_eq!(repaired.policy.canary_percent, 100);

    let err = loader.load_validated().await.unwrap_err();
    assert_eq!(err.code(), "config_invalid");
}

#[test]
fn test_valid_documents_normalize_without_loss() {
    let raw = rollout_document("websocket", 35);

    let report = validate_open_responses_transport_config(Some(&raw));
    assert!(report.ok, "{:?}", report.errors);

    let config = normalize_open_responses_transport_config(Some(&raw));
    assert_eq!(config, rollout_config(TransportMode::Websocket, 35));
}

#[test]
fn test_env_overrides_layer_over_file_values() {
    let mut raw = Some(rollout_document("sse", 0));
    apply_env_overrides(&mut raw, |key| match key {
        "OPENRESPONSES_TRANSPORT_MODE" => Some("auto".to_string()),
        "OPENRESPONSES_CANARY_PERCENT" => Some("100".to_string()),
        _ => None,
    });

    assert!(validate_open_responses_transport_config(raw.as_ref()).ok);
    let config = normalize_open_responses_transport_config(raw.as_ref());
    assert_eq!(config.policy.mode, TransportMode::Auto);
    assert_eq!(config.policy.canary_percent, 100);
    assert_eq!(config.policy.max_ws_retries, 2);
    assert_eq!(config.matrix.len(), 4);
}

#[test]
fn test_validation_sees_what_normalization_drops() {
    let raw = serde_json::json!({"transportCapabilityMatrix": {"entries": [
        {"provider": "openclaw", "model": "openclaw", "websocketMode": false},
        {"provider": "openclaw", "model": " openclaw", "websocketMode": true},
        {"provider": "   ", "model": "gpt-4o", "websocketMode": true}
    ]}});

    let report = validate_open_responses_transport_config(Some(&raw));
    assert_eq!(report.errors.len(), 2, "{:?}", report.errors);

    let config = normalize_open_responses_transport_config(Some(&raw));
    assert_eq!(config.matrix.len(), 1);
    assert!(!config.matrix.find("openclaw", "openclaw").unwrap().websocket_mode);
}
