//! End-to-end request flow: admission, transport selection, run recording

use crate::fixtures::*;
use crate::helpers::*;
use openresponses_config::{normalize_open_responses_transport_config, TransportConfigStore};
use openresponses_core::{ensure_supported_context_semantics, TransportKind, TransportMode};
use openresponses_routing::{FallbackReason, TransportResolver};
use openresponses_telemetry::{
    CompletionStatus, RunStatus, TransportLedger, FALLBACK_REASON_LABELS,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn resolver(mode: TransportMode, canary: u8) -> TransportResolver {
    TransportResolver::new(Arc::new(TransportConfigStore::new(rollout_config(mode, canary))))
}

#[test]
fn test_canary_hit_runs_over_websocket() {
    init_tracing();
    let resolver = resolver(TransportMode::Auto, 60);
    let ledger = TransportLedger::with_defaults();

    let request = continuation_request("openclaw");
    ensure_supported_context_semantics(&request, &request.model).unwrap();

    // "req-1" lands in bucket 53
    let selection = resolver.resolve(&request.model, Some("req-1"), None);
    assert_eq!(selection.selected_transport(), TransportKind::Websocket);
    assert_eq!(selection.bucket(), Some(53));
    assert_eq!(selection.retry_budget(), 2);

    ledger
        .start_transport_run(start_event("run-1", &request.model, selection.selected_transport(), 1_000))
        .unwrap();
    ledger
        .complete_transport_run(complete_event("run-1", &request.model, CompletionStatus::Completed, 1_250))
        .unwrap();

    let summary = ledger.get_transport_run_summary("run-1").unwrap();
    assert_eq!(summary.run.status, RunStatus::Completed);
    assert_eq!(summary.run.selected_transport, Some(TransportKind::Websocket));
    assert_eq!(summary.run.latency_ms, Some(250));
    assert_eq!(summary.aggregate.run_count, 1);
    assert_eq!(summary.aggregate.fallback_runs, 0);
}

#[test]
fn test_runtime_fallback_is_recorded() {
    init_tracing();
    let resolver = resolver(TransportMode::Websocket, 0);
    let ledger = TransportLedger::with_defaults();

    let selection = resolver.resolve("openclaw:beta", Some("req-9"), None);
    assert_eq!(selection.selected_transport(), TransportKind::Websocket);

    ledger
        .start_transport_run(start_event("run-1", "openclaw:beta", selection.selected_transport(), 0))
        .unwrap();
    ledger
        .record_transport_fallback(fallback_event("run-1", "openclaw:beta", "ws_retries_exhausted"))
        .unwrap();
    ledger
        .complete_transport_run(complete_event("run-1", "openclaw:beta", CompletionStatus::Completed, 900))
        .unwrap();

    let summary = ledger.get_transport_run_summary("run-1").unwrap();
    assert_eq!(summary.run.selected_transport, Some(TransportKind::Sse));
    assert_eq!(summary.run.fallback_reasons, vec!["ws_retries_exhausted"]);
    assert_eq!(summary.aggregate.model, "openclaw:beta");
    assert_eq!(summary.aggregate.fallback_events, 1);
    assert!((summary.aggregate.fallback_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_canary_miss_stays_on_sse() {
    let resolver = resolver(TransportMode::Auto, 60);

    // "req-2" lands in bucket 96
    let selection = resolver.resolve("openclaw", Some("req-2"), None);
    assert_eq!(selection.selected_transport(), TransportKind::Sse);
    assert_eq!(selection.fallback_reason(), Some(FallbackReason::AutoCanaryMiss));
    assert_eq!(selection.bucket(), Some(96));
    assert_eq!(selection.retry_budget(), 0);
}

#[test]
fn test_full_canary_sends_every_capable_key_to_websocket() {
    let resolver = resolver(TransportMode::Auto, 100);

    for i in 0..200 {
        let key = format!("request-{i}");
        let selection = resolver.resolve("openclaw", Some(&key), None);
        assert_eq!(selection.selected_transport(), TransportKind::Websocket, "{key}");
    }

    let selection = resolver.resolve("openclaw:sse-only", Some("request-0"), None);
    assert_eq!(selection.fallback_reason(), Some(FallbackReason::AutoModelNotCapable));
}

#[test]
fn test_selection_is_stable_per_key() {
    let resolver = resolver(TransportMode::Auto, 50);

    for i in 0..50 {
        let key = format!("request-{i}");
        let first = resolver.resolve("openclaw", Some(&key), None);
        for _ in 0..5 {
            assert_eq!(resolver.resolve("openclaw", Some(&key), None), first);
        }
    }
}

#[test]
fn test_unsupported_semantics_rejected_before_selection() {
    let request = fully_loaded_request("gpt-4o");

    let err = ensure_supported_context_semantics(&request, &request.model).unwrap_err();
    assert_eq!(err.code(), "unsupported_semantics");
    assert_eq!(err.status_code(), 400);

    let message = err.to_string();
    for field in ["previous_response_id", "reasoning", "context_management.compaction", "truncation"] {
        assert!(message.contains(field), "{message}");
    }
}

#[test]
fn test_partner_model_needs_explicit_provider() {
    let resolver = resolver(TransportMode::Websocket, 0);

    let native = resolver.resolve("gpt-4o", None, None);
    assert_eq!(native.fallback_reason(), Some(FallbackReason::ModelNotCapable));

    let partner = resolver.resolve("gpt-4o", None, Some("partner"));
    assert_eq!(partner.selected_transport(), TransportKind::Websocket);
}

#[test]
fn test_raw_document_drives_selection() {
    let config = normalize_open_responses_transport_config(Some(&rollout_document("AUTO", 60)));
    let resolver = TransportResolver::new(Arc::new(TransportConfigStore::new(config)));

    let selection = resolver.resolve("openclaw", Some("req-1"), None);
    assert_eq!(selection.requested_mode(), TransportMode::Auto);
    assert_eq!(selection.selected_transport(), TransportKind::Websocket);
}

#[test]
fn test_selection_reasons_have_metric_labels() {
    for reason in [
        FallbackReason::ModelNotCapable,
        FallbackReason::AutoCanaryDisabled,
        FallbackReason::AutoModelNotCapable,
        FallbackReason::AutoCanaryMiss,
        FallbackReason::TransportDisabled,
    ] {
        assert!(FALLBACK_REASON_LABELS.contains(&reason.as_str()), "{reason}");
    }
}
