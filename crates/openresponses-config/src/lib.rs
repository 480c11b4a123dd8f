//! # Open Responses Config
//!
//! Transport configuration for the Open Responses transport layer.
//!
//! This crate provides:
//! - The typed transport configuration (capability matrix + rollout policy)
//! - A total normalization pass that always yields a usable config
//! - A strict validation pass that accumulates every violation
//! - File and environment loading
//! - An atomically swappable config store for hot reload

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod store;
pub mod validate;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env_overrides, ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use model::{CapabilityMatrix, TransportCapabilityEntry, TransportConfig, TransportPolicy};
pub use normalize::{normalize_open_responses_transport_config, MAX_CANARY_PERCENT};
pub use store::TransportConfigStore;
pub use validate::{validate_open_responses_transport_config, ValidationReport};
