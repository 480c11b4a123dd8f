//! Hot-swappable transport configuration.
//!
//! Readers take an `Arc` snapshot that stays fixed for the whole request
//! while a reload swaps the next config in atomically.

use crate::error::ConfigResult;
use crate::loader::ConfigLoader;
use crate::model::TransportConfig;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Holder of the current transport configuration
#[derive(Debug)]
pub struct TransportConfigStore {
    current: ArcSwap<TransportConfig>,
    generation: AtomicU64,
}

impl Default for TransportConfigStore {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl TransportConfigStore {
    /// Create a store holding `config`
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            generation: AtomicU64::new(0),
        }
    }

    /// Immutable snapshot of the current config
    #[must_use]
    pub fn snapshot(&self) -> Arc<TransportConfig> {
        self.current.load_full()
    }

    /// Number of successful replacements since creation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the whole config, returning the previous one
    pub fn replace(&self, config: TransportConfig) -> Arc<TransportConfig> {
        let previous = self.current.swap(Arc::new(config));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(generation, "Transport configuration replaced");
        previous
    }

    /// Load through `loader` and swap in the result.
    ///
    /// On error the current config stays in place.
    pub async fn reload_from(&self, loader: &ConfigLoader) -> ConfigResult<u64> {
        match loader.load().await {
            Ok(config) => {
                self.replace(config);
                Ok(self.generation())
            }
            Err(err) => {
                warn!(error = %err, "Transport configuration reload failed, keeping previous");
                Err(err)
            }
        }
    }
}
