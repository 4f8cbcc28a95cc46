//! Karpenter e2e - NodePool and AKSNodeClass fixtures for AKS end-to-end tests
//!
//! Builds the default provisioning policy a test starts from and derives
//! variants from it (arm64 nodes, a different image family) by overwriting a
//! single field of the default.
//!
//! # Modules
//!
//! - [`environment`] - Azure environment and fixture builders
//! - [`config`] - Environment variables read at startup
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Error types for the environment

#![deny(missing_docs)]

pub mod config;
pub mod environment;
pub mod error;
pub mod telemetry;

pub use config::EnvironmentConfig;
pub use environment::{arm_variant, with_image_family, Environment};
pub use error::Error;

/// Re-exported fixture types
pub use karpenter_common as common;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
