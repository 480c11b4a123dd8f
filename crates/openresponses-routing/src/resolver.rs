//! Resolver bound to a live config store.

use crate::selection::{
    resolve_open_responses_transport_selection, TransportSelection, TransportSelectionInput,
};
use openresponses_config::TransportConfigStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves transports against the store's current snapshot
#[derive(Debug, Clone)]
pub struct TransportResolver {
    store: Arc<TransportConfigStore>,
}

impl TransportResolver {
    /// Create a resolver reading from `store`
    #[must_use]
    pub fn new(store: Arc<TransportConfigStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<TransportConfigStore> {
        &self.store
    }

    /// Resolve the transport for one request.
    ///
    /// The whole resolution reads a single snapshot, so a concurrent reload
    /// cannot mix two configs.
    pub fn resolve(
        &self,
        model: &str,
        request_key: Option<&str>,
        provider: Option<&str>,
    ) -> TransportSelection {
        let config = self.store.snapshot();
        let input = TransportSelectionInput {
            config: &config,
            model,
            request_key,
            provider,
        };
        let selection = resolve_open_responses_transport_selection(&input);

        match selection.fallback_reason() {
            Some(reason) => info!(
                model = %model,
                requested_mode = %selection.requested_mode(),
                transport = %selection.selected_transport(),
                reason = %reason,
                "Transport selection fell back to baseline"
            ),
            None => debug!(
                model = %model,
                requested_mode = %selection.requested_mode(),
                transport = %selection.selected_transport(),
                "Transport selected"
            ),
        }

        selection
    }
}
