//! Integration tests for the Open Responses transport layer
//!
//! This crate covers flows that cross crate boundaries:
//! - Request admission, transport selection, and run recording end to end
//! - Config files loaded from disk and hot-swapped under live resolvers
//! - Ledger consistency under concurrent writers

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
pub use fixtures::*;
pub use helpers::*;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod flow_tests;
#[cfg(test)]
mod ledger_tests;
