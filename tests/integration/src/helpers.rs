//! Test helper utilities for integration tests

use openresponses_core::TransportKind;
use openresponses_telemetry::{CompleteRun, CompletionStatus, RecordFallback, StartRun};
use once_cell::sync::Lazy;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests when `TEST_LOG` is set
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Write `contents` to a temp file with the given suffix
pub fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Start event for the native provider
pub fn start_event(run_id: &str, model: &str, transport: TransportKind, at_ms: u64) -> StartRun {
    StartRun::new(run_id, format!("req-{run_id}"), "openclaw", model, transport, at_ms)
}

/// Websocket-to-SSE fallback event matching `start_event`
pub fn fallback_event(run_id: &str, model: &str, reason: &str) -> RecordFallback {
    RecordFallback {
        run_id: run_id.to_string(),
        request_id: format!("req-{run_id}"),
        provider: "openclaw".to_string(),
        model: model.to_string(),
        from: TransportKind::Websocket,
        to: TransportKind::Sse,
        reason: reason.to_string(),
    }
}

/// Completion event matching `start_event`
pub fn complete_event(run_id: &str, model: &str, status: CompletionStatus, at_ms: u64) -> CompleteRun {
    CompleteRun {
        run_id: run_id.to_string(),
        request_id: format!("req-{run_id}"),
        provider: "openclaw".to_string(),
        model: model.to_string(),
        status,
        ended_at_ms: at_ms,
    }
}
