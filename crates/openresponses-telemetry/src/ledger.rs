//! Transport run ledger.
//!
//! Tracks every transport attempt from selection to completion, including
//! in-flight fallbacks, and keeps per-(provider, model) aggregates over the
//! completed runs.
//!
//! Each run moves `open -> (fallback)* -> closed`. Every mutation runs under
//! one write lock, so lifecycle calls for the same run are serialized and a
//! completion and its aggregate recomputation are observed together.
//!
//! The ledger is an ordinary value. The gateway owns one instance and
//! injects it where runs are recorded; tests build a fresh one.

use crate::aggregate::TransportAggregate;
use crate::error::{LedgerError, LedgerResult};
use crate::metrics::TransportMetrics;
use openresponses_core::TransportKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Current wall-clock time in epoch milliseconds
#[must_use]
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Started, not yet completed
    Open,
    /// Finished normally
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled by the client or the gateway
    Aborted,
}

impl RunStatus {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

/// Terminal status passed to `complete_transport_run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Finished normally
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled
    Aborted,
}

impl From<CompletionStatus> for RunStatus {
    fn from(status: CompletionStatus) -> Self {
        match status {
            CompletionStatus::Completed => Self::Completed,
            CompletionStatus::Failed => Self::Failed,
            CompletionStatus::Aborted => Self::Aborted,
        }
    }
}

/// One tracked transport attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportRun {
    /// Run id, unique within the ledger
    pub run_id: String,
    /// Gateway request id
    pub request_id: String,
    /// Provider
    pub provider: String,
    /// Model
    pub model: String,
    /// Current transport; changes on fallback
    pub transport: TransportKind,
    /// Start time, epoch ms
    pub started_at_ms: u64,
    /// End time, epoch ms
    pub ended_at_ms: Option<u64>,
    /// Lifecycle status
    pub status: RunStatus,
    /// Number of fallbacks, always `fallback_reasons.len()`
    pub fallback_count: u32,
    /// Fallback reasons in the order they happened
    pub fallback_reasons: Vec<String>,
    /// Transport in use at completion
    pub selected_transport: Option<TransportKind>,
    /// `ended_at_ms - started_at_ms`, set at completion
    pub latency_ms: Option<u64>,
}

impl TransportRun {
    /// Whether the run still accepts fallback and completion events
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RunStatus::Open
    }

    fn group_key(&self) -> GroupKey {
        (self.provider.clone(), self.model.clone())
    }

    fn check_identity(&self, request_id: &str, provider: &str, model: &str, event: &'static str) {
        if self.request_id != request_id || self.provider != provider || self.model != model {
            warn!(
                run_id = %self.run_id,
                event,
                expected_request_id = %self.request_id,
                expected_provider = %self.provider,
                expected_model = %self.model,
                request_id = %request_id,
                provider = %provider,
                model = %model,
                "Transport run event identity mismatch, keeping recorded identity"
            );
        }
    }
}

/// `start_transport_run` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRun {
    /// Run id
    pub run_id: String,
    /// Gateway request id
    pub request_id: String,
    /// Provider
    pub provider: String,
    /// Model
    pub model: String,
    /// Transport the run starts on
    pub transport: TransportKind,
    /// Start time, epoch ms
    pub started_at_ms: u64,
}

impl StartRun {
    /// Create a start event
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        request_id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        transport: TransportKind,
        started_at_ms: u64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            request_id: request_id.into(),
            provider: provider.into(),
            model: model.into(),
            transport,
            started_at_ms,
        }
    }
}

/// `record_transport_fallback` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFallback {
    /// Run id
    pub run_id: String,
    /// Gateway request id
    pub request_id: String,
    /// Provider
    pub provider: String,
    /// Model
    pub model: String,
    /// Transport being abandoned
    pub from: TransportKind,
    /// Transport taking over
    pub to: TransportKind,
    /// Reason code
    pub reason: String,
}

/// `complete_transport_run` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRun {
    /// Run id
    pub run_id: String,
    /// Gateway request id
    pub request_id: String,
    /// Provider
    pub provider: String,
    /// Model
    pub model: String,
    /// Terminal status
    pub status: CompletionStatus,
    /// End time, epoch ms
    pub ended_at_ms: u64,
}

/// Point lookup result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportRunSummary {
    /// The run
    pub run: TransportRun,
    /// Its group's aggregate at query time
    pub aggregate: TransportAggregate,
}

/// Full dump for observability export
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransportSummarySnapshot {
    /// Runs ordered by start time, then run id
    pub runs: Vec<TransportRun>,
    /// Aggregates ordered by provider, then model
    pub aggregates: Vec<TransportAggregate>,
}

/// How many completed runs a group keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    /// Keep every run until `reset`
    #[default]
    Unbounded,
    /// Keep the newest `n` completed runs per group; older ones are dropped
    /// from the run table and the aggregate. Open runs are never dropped.
    Window(NonZeroUsize),
}

/// Ledger configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerConfig {
    /// Retention policy
    pub retention: Retention,
}

impl LedgerConfig {
    /// Create the default configuration (unbounded retention)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention policy
    #[must_use]
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}

type GroupKey = (String, String);

#[derive(Debug, Default)]
struct GroupState {
    /// Completed run ids, oldest first
    closed: VecDeque<String>,
    aggregate: TransportAggregate,
}

#[derive(Debug, Default)]
struct LedgerState {
    runs: HashMap<String, TransportRun>,
    groups: HashMap<GroupKey, GroupState>,
}

/// Concurrent store of transport runs and their aggregates
#[derive(Debug, Default)]
pub struct TransportLedger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
    metrics: Option<Arc<TransportMetrics>>,
}

impl TransportLedger {
    /// Create a ledger
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LedgerState::default()),
            metrics: None,
        }
    }

    /// Create a ledger with unbounded retention
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LedgerConfig::default())
    }

    /// Report run events to `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<TransportMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Open a run.
    ///
    /// # Errors
    /// `DuplicateRun` if `run_id` is already in the ledger
    pub fn start_transport_run(&self, event: StartRun) -> LedgerResult<()> {
        let mut state = self.state.write();

        if state.runs.contains_key(&event.run_id) {
            warn!(run_id = %event.run_id, "Duplicate transport run start");
            return Err(LedgerError::DuplicateRun {
                run_id: event.run_id,
            });
        }

        debug!(
            run_id = %event.run_id,
            request_id = %event.request_id,
            provider = %event.provider,
            model = %event.model,
            transport = %event.transport,
            "Transport run started"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_start(&event.provider, &event.model, event.transport);
        }

        let run = TransportRun {
            run_id: event.run_id.clone(),
            request_id: event.request_id,
            provider: event.provider,
            model: event.model,
            transport: event.transport,
            started_at_ms: event.started_at_ms,
            ended_at_ms: None,
            status: RunStatus::Open,
            fallback_count: 0,
            fallback_reasons: Vec::new(),
            selected_transport: None,
            latency_ms: None,
        };
        state.runs.insert(event.run_id, run);

        Ok(())
    }

    /// Record an in-flight transport downgrade on an open run.
    ///
    /// # Errors
    /// `UnknownRun` if the run was never started or is closed
    pub fn record_transport_fallback(&self, event: RecordFallback) -> LedgerResult<()> {
        let mut state = self.state.write();

        let Some(run) = state.runs.get_mut(&event.run_id).filter(|r| r.is_open()) else {
            warn!(run_id = %event.run_id, "Fallback for unknown or closed transport run");
            return Err(LedgerError::UnknownRun {
                run_id: event.run_id,
            });
        };

        run.check_identity(&event.request_id, &event.provider, &event.model, "fallback");
        if run.transport != event.from {
            warn!(
                run_id = %run.run_id,
                current = %run.transport,
                from = %event.from,
                "Fallback source differs from the run's current transport"
            );
        }

        info!(
            run_id = %run.run_id,
            provider = %run.provider,
            model = %run.model,
            from = %event.from,
            to = %event.to,
            reason = %event.reason,
            "Transport fallback"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_fallback(&run.provider, &run.model, &event.reason);
        }

        run.fallback_reasons.push(event.reason);
        run.fallback_count += 1;
        run.transport = event.to;

        Ok(())
    }

    /// Close an open run and refresh its group's aggregate.
    ///
    /// # Errors
    /// `UnknownRun` if the run was never started or is already closed
    pub fn complete_transport_run(&self, event: CompleteRun) -> LedgerResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let Some(run) = state.runs.get_mut(&event.run_id).filter(|r| r.is_open()) else {
            warn!(run_id = %event.run_id, "Completion for unknown or closed transport run");
            return Err(LedgerError::UnknownRun {
                run_id: event.run_id,
            });
        };

        run.check_identity(&event.request_id, &event.provider, &event.model, "complete");

        if event.ended_at_ms < run.started_at_ms {
            warn!(
                run_id = %run.run_id,
                started_at_ms = run.started_at_ms,
                ended_at_ms = event.ended_at_ms,
                "Transport run ended before it started, clamping latency to 0"
            );
        }
        let latency = event.ended_at_ms.saturating_sub(run.started_at_ms);

        run.ended_at_ms = Some(event.ended_at_ms);
        run.status = event.status.into();
        run.selected_transport = Some(run.transport);
        run.latency_ms = Some(latency);

        debug!(
            run_id = %run.run_id,
            status = run.status.as_str(),
            transport = %run.transport,
            latency_ms = latency,
            fallback_count = run.fallback_count,
            "Transport run completed"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_completion(&run.provider, &run.model, run.status, run.transport, latency);
        }

        let key = run.group_key();
        let group = state.groups.entry(key.clone()).or_default();
        group.closed.push_back(event.run_id);

        if let Retention::Window(limit) = self.config.retention {
            while group.closed.len() > limit.get() {
                if let Some(evicted) = group.closed.pop_front() {
                    state.runs.remove(&evicted);
                }
            }
        }

        let runs = &state.runs;
        group.aggregate = TransportAggregate::from_runs(
            key.0,
            key.1,
            group.closed.iter().filter_map(|id| runs.get(id)),
        );

        Ok(())
    }

    /// Look up a run and its group's aggregate
    #[must_use]
    pub fn get_transport_run_summary(&self, run_id: &str) -> Option<TransportRunSummary> {
        let state = self.state.read();
        let run = state.runs.get(run_id)?;
        let aggregate = state
            .groups
            .get(&run.group_key())
            .map_or_else(
                || TransportAggregate::empty(&run.provider, &run.model),
                |g| g.aggregate.clone(),
            );

        Some(TransportRunSummary {
            run: run.clone(),
            aggregate,
        })
    }

    /// Aggregate for one group, if it has completed runs
    #[must_use]
    pub fn get_transport_aggregate(&self, provider: &str, model: &str) -> Option<TransportAggregate> {
        let state = self.state.read();
        state
            .groups
            .get(&(provider.to_string(), model.to_string()))
            .map(|g| g.aggregate.clone())
    }

    /// Dump every run and aggregate
    #[must_use]
    pub fn get_transport_summary_snapshot(&self) -> TransportSummarySnapshot {
        let state = self.state.read();

        let mut runs: Vec<_> = state.runs.values().cloned().collect();
        runs.sort_by(|a, b| {
            a.started_at_ms
                .cmp(&b.started_at_ms)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });

        let mut aggregates: Vec<_> = state.groups.values().map(|g| g.aggregate.clone()).collect();
        aggregates.sort_by(|a, b| {
            a.provider
                .cmp(&b.provider)
                .then_with(|| a.model.cmp(&b.model))
        });

        TransportSummarySnapshot { runs, aggregates }
    }

    /// Runs started but not yet completed
    #[must_use]
    pub fn open_run_count(&self) -> usize {
        self.state.read().runs.values().filter(|r| r.is_open()).count()
    }

    /// Number of runs held, open or closed
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.state.read().runs.len()
    }

    /// Remove every run and aggregate
    pub fn reset(&self) {
        let mut state = self.state.write();
        let open = state.runs.values().filter(|r| r.is_open()).count();
        state.runs.clear();
        state.groups.clear();
        if let Some(metrics) = &self.metrics {
            metrics.set_open_runs(0);
        }
        info!(discarded_open_runs = open, "Transport ledger reset");
    }
}
