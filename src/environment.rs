//! Azure test environment: default NodePool and AKSNodeClass fixtures
//!
//! Every variant follows the same shape: start from the canonical default,
//! overwrite exactly one field, return the derived value.

use kube::ResourceExt;
use tracing::{debug, info};

use karpenter_common::crd::{
    AKSNodeClass, ImageFamily, NillableDuration, NodeClassReference, NodePool,
    NodeSelectorRequirementWithMinValues, Taint, TaintEffect,
};
use karpenter_common::fixtures;
use karpenter_common::labels::{
    ARCHITECTURE_AMD64, ARCHITECTURE_ARM64, CAPACITY_TYPE_LABEL_KEY, CAPACITY_TYPE_ON_DEMAND,
    LABEL_ARCH_STABLE, LABEL_EBPF_DATAPLANE, LABEL_OS_STABLE, LABEL_SKU_FAMILY,
    NETWORK_DATAPLANE_CILIUM, OS_LINUX, RESOURCE_CPU, RESOURCE_MEMORY,
};
use karpenter_common::scheme::{self, Scheme};
use karpenter_common::CILIUM_AGENT_NOT_READY_TAINT;

use crate::config::EnvironmentConfig;
use crate::telemetry::{init_telemetry, TelemetryConfig};
use crate::Result;

/// SKU family of default nodes
pub const DEFAULT_SKU_FAMILY: &str = "D";

/// CPU ceiling of the default NodePool
pub const DEFAULT_CPU_LIMIT: &str = "100";

/// Memory ceiling of the default NodePool
pub const DEFAULT_MEMORY_LIMIT: &str = "1000Gi";

/// Fixture factory for an AKS cluster
#[derive(Debug, Clone)]
pub struct Environment {
    config: EnvironmentConfig,
    scheme: &'static Scheme,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(EnvironmentConfig::default())
    }
}

impl Environment {
    /// Create an environment, installing the fixture scheme first
    pub fn new(config: EnvironmentConfig) -> Self {
        let scheme = scheme::install();
        info!(region = %config.region, "azure test environment ready");
        Self { config, scheme }
    }

    /// Install the global tracing subscriber, then create an environment
    ///
    /// Fails if a subscriber is already installed.
    pub fn with_telemetry(config: EnvironmentConfig, telemetry: TelemetryConfig) -> Result<Self> {
        init_telemetry(telemetry)?;
        Ok(Self::new(config))
    }

    /// Create an environment configured from process environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(EnvironmentConfig::from_env()?))
    }

    /// Azure region of the cluster
    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Configuration the environment was built with
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// The installed fixture scheme
    pub fn scheme(&self) -> &'static Scheme {
        self.scheme
    }

    /// The default NodePool, referencing `node_class`
    pub fn default_node_pool(&self, node_class: &AKSNodeClass) -> NodePool {
        let mut node_pool = fixtures::node_pool();
        self.apply_defaults(&mut node_pool, node_class);
        node_pool
    }

    /// Apply the Azure defaults to an existing NodePool
    ///
    /// Requirements and limits are overwritten. The Cilium startup taint is
    /// appended and the dataplane label merged, so existing taints and labels
    /// survive.
    pub fn apply_defaults(&self, node_pool: &mut NodePool, node_class: &AKSNodeClass) {
        let spec = &mut node_pool.spec;

        spec.template.spec.node_class_ref = Some(NodeClassReference::named(node_class.name_any()));
        spec.template.spec.requirements = [
            NodeSelectorRequirementWithMinValues::in_values(LABEL_OS_STABLE, [OS_LINUX]),
            NodeSelectorRequirementWithMinValues::in_values(
                CAPACITY_TYPE_LABEL_KEY,
                [CAPACITY_TYPE_ON_DEMAND],
            ),
            NodeSelectorRequirementWithMinValues::in_values(LABEL_ARCH_STABLE, [ARCHITECTURE_AMD64]),
            NodeSelectorRequirementWithMinValues::in_values(LABEL_SKU_FAMILY, [DEFAULT_SKU_FAMILY]),
        ]
        .into_iter()
        .collect();

        spec.disruption.consolidate_after = Some(NillableDuration::NEVER);
        spec.disruption.expire_after = NillableDuration::NEVER;

        spec.limits = [
            (RESOURCE_CPU, DEFAULT_CPU_LIMIT),
            (RESOURCE_MEMORY, DEFAULT_MEMORY_LIMIT),
        ]
        .into_iter()
        .collect();

        spec.template.spec.startup_taints.push(Taint::new(
            CILIUM_AGENT_NOT_READY_TAINT,
            "true",
            TaintEffect::NoExecute,
        ));
        fixtures::merge_labels(
            &mut spec.template.metadata.labels,
            [(LABEL_EBPF_DATAPLANE, NETWORK_DATAPLANE_CILIUM)],
        );

        debug!(
            node_pool = %node_pool.name_any(),
            node_class = %node_class.name_any(),
            "applied default node pool settings"
        );
    }

    /// The default NodePool restricted to arm64 nodes
    pub fn arm_node_pool(&self, node_class: &AKSNodeClass) -> Result<NodePool> {
        arm_variant(self.default_node_pool(node_class))
    }

    /// An AKSNodeClass with no image family override
    pub fn default_aks_node_class(&self) -> AKSNodeClass {
        fixtures::aks_node_class()
    }

    /// The default AKSNodeClass booting `family`
    pub fn node_class_with_image_family(&self, family: ImageFamily) -> AKSNodeClass {
        with_image_family(self.default_aks_node_class(), family)
    }

    /// The default AKSNodeClass booting Azure Linux
    pub fn az_linux_node_class(&self) -> AKSNodeClass {
        self.node_class_with_image_family(ImageFamily::AzureLinux)
    }
}

/// Restrict a NodePool to arm64 nodes
///
/// Replaces the architecture requirement in place. Fails without touching
/// the pool if it carries no architecture requirement.
pub fn arm_variant(mut node_pool: NodePool) -> Result<NodePool> {
    fixtures::replace_requirements(
        &mut node_pool,
        [NodeSelectorRequirementWithMinValues::in_values(
            LABEL_ARCH_STABLE,
            [ARCHITECTURE_ARM64],
        )],
    )?;
    Ok(node_pool)
}

/// Select the image family of a node class, leaving every other field as is
pub fn with_image_family(mut node_class: AKSNodeClass, family: ImageFamily) -> AKSNodeClass {
    node_class.spec.image_family = Some(family);
    node_class
}
