//! Prometheus metrics for transport runs.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `openresponses_transport_runs_started_total` | Counter | `provider`, `model`, `transport` |
//! | `openresponses_transport_fallbacks_total` | Counter | `provider`, `model`, `reason` |
//! | `openresponses_transport_runs_completed_total` | Counter | `provider`, `model`, `status`, `transport` |
//! | `openresponses_transport_run_latency_ms` | Histogram | `provider`, `model`, `transport` |
//! | `openresponses_transport_runs_open` | Gauge | |
//!
//! `reason` takes a value from [`FALLBACK_REASON_LABELS`]; any other reason
//! is exported as `other`. The ledger still stores the reason verbatim.

use crate::ledger::RunStatus;
use openresponses_core::TransportKind;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Latency buckets in milliseconds
pub const LATENCY_BUCKETS_MS: &[f64] = &[
    10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0,
];

/// Fallback reasons exported as their own `reason` label value
pub const FALLBACK_REASON_LABELS: &[&str] = &[
    // selection
    "model_not_capable",
    "auto_canary_disabled",
    "auto_model_not_capable",
    "auto_canary_miss",
    "transport_disabled",
    // runtime
    "ws_connect_failed",
    "ws_reset",
    "ws_timeout",
    "ws_protocol_error",
    "ws_retries_exhausted",
];

/// Label value for reasons outside [`FALLBACK_REASON_LABELS`]
pub const OTHER_REASON_LABEL: &str = "other";

fn reason_label(reason: &str) -> &str {
    if FALLBACK_REASON_LABELS.contains(&reason) {
        reason
    } else {
        OTHER_REASON_LABEL
    }
}

/// Transport run metrics registered on their own registry
#[derive(Clone)]
pub struct TransportMetrics {
    registry: Registry,
    runs_started: IntCounterVec,
    fallbacks: IntCounterVec,
    runs_completed: IntCounterVec,
    latency_ms: HistogramVec,
    runs_open: IntGauge,
}

impl std::fmt::Debug for TransportMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportMetrics")
            .field("runs_open", &self.runs_open.get())
            .finish_non_exhaustive()
    }
}

impl TransportMetrics {
    /// Create and register every metric.
    ///
    /// # Errors
    /// Returns an error if a metric fails to register
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let runs_started = IntCounterVec::new(
            Opts::new(
                "openresponses_transport_runs_started_total",
                "Transport runs started",
            ),
            &["provider", "model", "transport"],
        )?;
        registry.register(Box::new(runs_started.clone()))?;

        let fallbacks = IntCounterVec::new(
            Opts::new(
                "openresponses_transport_fallbacks_total",
                "In-flight transport fallbacks",
            ),
            &["provider", "model", "reason"],
        )?;
        registry.register(Box::new(fallbacks.clone()))?;

        let runs_completed = IntCounterVec::new(
            Opts::new(
                "openresponses_transport_runs_completed_total",
                "Transport runs completed",
            ),
            &["provider", "model", "status", "transport"],
        )?;
        registry.register(Box::new(runs_completed.clone()))?;

        let latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "openresponses_transport_run_latency_ms",
                "Transport run latency in milliseconds",
            )
            .buckets(LATENCY_BUCKETS_MS.to_vec()),
            &["provider", "model", "transport"],
        )?;
        registry.register(Box::new(latency_ms.clone()))?;

        let runs_open = IntGauge::new(
            "openresponses_transport_runs_open",
            "Transport runs started and not yet completed",
        )?;
        registry.register(Box::new(runs_open.clone()))?;

        Ok(Self {
            registry,
            runs_started,
            fallbacks,
            runs_completed,
            latency_ms,
            runs_open,
        })
    }

    /// Registry holding the metrics
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a run start
    pub fn record_start(&self, provider: &str, model: &str, transport: TransportKind) {
        self.runs_started
            .with_label_values(&[provider, model, transport.as_str()])
            .inc();
        self.runs_open.inc();
    }

    /// Record a fallback; unknown reasons count under `other`
    pub fn record_fallback(&self, provider: &str, model: &str, reason: &str) {
        self.fallbacks
            .with_label_values(&[provider, model, reason_label(reason)])
            .inc();
    }

    /// Record a completion
    pub fn record_completion(
        &self,
        provider: &str,
        model: &str,
        status: RunStatus,
        transport: TransportKind,
        latency_ms: u64,
    ) {
        self.runs_completed
            .with_label_values(&[provider, model, status.as_str(), transport.as_str()])
            .inc();
        #[allow(clippy::cast_precision_loss)]
        let observed = latency_ms as f64;
        self.latency_ms
            .with_label_values(&[provider, model, transport.as_str()])
            .observe(observed);
        self.runs_open.dec();
    }

    /// Set the open-run gauge
    pub fn set_open_runs(&self, open: usize) {
        self.runs_open
            .set(i64::try_from(open).unwrap_or(i64::MAX));
    }

    /// Open runs as currently reported
    #[must_use]
    pub fn open_runs(&self) -> i64 {
        self.runs_open.get()
    }

    /// Encode every metric in the Prometheus text format.
    ///
    /// # Errors
    /// Returns an error if encoding fails
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
