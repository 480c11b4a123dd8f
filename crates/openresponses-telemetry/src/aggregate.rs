//! Per-(provider, model) aggregates over completed runs.

use crate::ledger::TransportRun;
use serde::Serialize;

const P50: u64 = 50;
const P95: u64 = 95;

/// Aggregate statistics for one `(provider, model)` group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransportAggregate {
    /// Provider
    pub provider: String,
    /// Model
    pub model: String,
    /// Completed runs
    pub run_count: u64,
    /// Median latency (nearest rank)
    pub latency_p50_ms: u64,
    /// 95th percentile latency (nearest rank)
    pub latency_p95_ms: u64,
    /// Completed runs with at least one fallback
    pub fallback_runs: u64,
    /// Total fallback events over completed runs
    pub fallback_events: u64,
    /// `fallback_runs / run_count`, 0 for an empty group
    pub fallback_ratio: f64,
}

impl TransportAggregate {
    /// Empty aggregate for a group
    #[must_use]
    pub fn empty(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Compute the aggregate from the group's completed runs.
    ///
    /// Open runs are ignored.
    pub fn from_runs<'a>(
        provider: impl Into<String>,
        model: impl Into<String>,
        runs: impl IntoIterator<Item = &'a TransportRun>,
    ) -> Self {
        let mut aggregate = Self::empty(provider, model);
        let mut latencies = Vec::new();

        for run in runs {
            let Some(latency) = run.latency_ms else {
                continue;
            };
            latencies.push(latency);
            aggregate.fallback_events += u64::from(run.fallback_count);
            if run.fallback_count > 0 {
                aggregate.fallback_runs += 1;
            }
        }

        latencies.sort_unstable();
        aggregate.run_count = latencies.len() as u64;
        aggregate.latency_p50_ms = nearest_rank_percentile(&latencies, P50);
        aggregate.latency_p95_ms = nearest_rank_percentile(&latencies, P95);
        aggregate.fallback_ratio = if aggregate.run_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = aggregate.fallback_runs as f64 / aggregate.run_count as f64;
            ratio
        };

        aggregate
    }
}

/// Nearest-rank percentile over ascending `sorted` values.
///
/// Returns `sorted[ceil(percent / 100 * n) - 1]`, or 0 for an empty slice.
/// Integer arithmetic keeps ranks exact.
#[must_use]
pub fn nearest_rank_percentile(sorted: &[u64], percent: u64) -> u64 {
    let n = sorted.len() as u64;
    if n == 0 {
        return 0;
    }
    let rank = (percent.min(100) * n).div_ceil(100).max(1);
    // rank is within 1..=n, so the index is in bounds.
    #[allow(clippy::cast_possible_truncation)]
    let index = (rank - 1) as usize;
    sorted[index]
}
