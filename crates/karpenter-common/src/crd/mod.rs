//! Custom Resource Definitions for Karpenter on AKS
//!
//! Typed NodePool and AKSNodeClass resources plus the requirement, taint
//! and duration types they are built from.

pub mod duration;
mod node_class;
mod node_pool;
mod requirements;
mod taint;

pub use duration::NillableDuration;
pub use node_class::{AKSNodeClass, AKSNodeClassSpec, ImageFamily, DEFAULT_OS_DISK_SIZE_GB};
pub use node_pool::{
    Budget, ConsolidationPolicy, Disruption, Limits, NodeClaimSpec, NodeClaimTemplate,
    NodeClassReference, NodePool, NodePoolSpec, NodePoolStatus, TemplateMetadata,
    DEFAULT_BUDGET_NODES, DEFAULT_EXPIRE_AFTER,
};
pub use requirements::{NodeSelectorRequirementWithMinValues, RequirementOperator, Requirements};
pub use taint::{Taint, TaintEffect};
