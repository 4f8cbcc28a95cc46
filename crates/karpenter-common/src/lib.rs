//! Common types for Karpenter e2e fixtures: CRDs, errors, and utilities

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod fixtures;
pub mod labels;
pub mod quantity;
pub mod scheme;
pub mod yaml;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Startup taint Cilium places on nodes until its agent is running
pub const CILIUM_AGENT_NOT_READY_TAINT: &str = "node.cilium.io/agent-not-ready";
