//! Ledger consistency under concurrent writers

use crate::helpers::*;
use openresponses_core::TransportKind;
use openresponses_telemetry::{
    CompletionStatus, LedgerConfig, Retention, TransportLedger, TransportMetrics,
};
use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;
use std::sync::Arc;

const MODELS: [&str; 3] = ["openclaw", "openclaw:beta", "openclaw:mini"];

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_runs_across_groups() {
    init_tracing();
    let metrics = Arc::new(TransportMetrics::new().unwrap());
    let ledger = Arc::new(TransportLedger::with_defaults().with_metrics(Arc::clone(&metrics)));

    let mut handles = Vec::new();
    for i in 0..300_u64 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let model = MODELS[usize::try_from(i % 3).unwrap()];
            let run_id = format!("run-{i}");
            ledger
                .start_transport_run(start_event(&run_id, model, TransportKind::Websocket, 0))
                .unwrap();
            tokio::task::yield_now().await;
            if i % 10 == 0 {
                ledger
                    .record_transport_fallback(fallback_event(&run_id, model, "ws_reset"))
                    .unwrap();
            }
            ledger
                .complete_transport_run(complete_event(&run_id, model, CompletionStatus::Completed, i))
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = ledger.get_transport_summary_snapshot();
    assert_eq!(snapshot.runs.len(), 300);
    assert_eq!(snapshot.aggregates.len(), 3);
    assert_eq!(ledger.open_run_count(), 0);
    assert_eq!(metrics.open_runs(), 0);

    let total: u64 = snapshot.aggregates.iter().map(|a| a.run_count).sum();
    let fallbacks: u64 = snapshot.aggregates.iter().map(|a| a.fallback_runs).sum();
    assert_eq!(total, 300);
    assert_eq!(fallbacks, 30);

    for run in &snapshot.runs {
        assert_eq!(run.fallback_count as usize, run.fallback_reasons.len());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_starts_admit_one() {
    let ledger = Arc::new(TransportLedger::with_defaults());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .start_transport_run(start_event("shared", "openclaw", TransportKind::Sse, 0))
                .is_ok()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(ledger.open_run_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_completions_close_once() {
    let ledger = Arc::new(TransportLedger::with_defaults());
    ledger
        .start_transport_run(start_event("shared", "openclaw", TransportKind::Sse, 0))
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16_u64 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .complete_transport_run(complete_event("shared", "openclaw", CompletionStatus::Completed, 100 + i))
                .is_ok()
        }));
    }

    let mut closed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            closed += 1;
        }
    }
    assert_eq!(closed, 1);

    let aggregate = ledger.get_transport_run_summary("shared").unwrap().aggregate;
    assert_eq!(aggregate.run_count, 1);
}

#[test]
fn test_windowed_ledger_stays_bounded() {
    let window = NonZeroUsize::new(10).unwrap();
    let ledger = TransportLedger::new(LedgerConfig::new().with_retention(Retention::Window(window)));

    for i in 0..100_u64 {
        let run_id = format!("run-{i}");
        ledger
            .start_transport_run(start_event(&run_id, "openclaw", TransportKind::Sse, 0))
            .unwrap();
        ledger
            .complete_transport_run(complete_event(&run_id, "openclaw", CompletionStatus::Completed, i))
            .unwrap();
    }

    assert_eq!(ledger.run_count(), 10);
    let summary = ledger.get_transport_run_summary("run-99").unwrap();
    assert_eq!(summary.aggregate.run_count, 10);
    // Latencies 90..=99 remain
    assert_eq!(summary.aggregate.latency_p50_ms, 94);
    assert_eq!(summary.aggregate.latency_p95_ms, 99);
    assert!(ledger.get_transport_run_summary("run-0").is_none());
}
