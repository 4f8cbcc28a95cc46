//! Process-wide registry of the resource kinds fixtures produce
//!
//! Installed once, before any fixture is built. Holds the API identity of
//! each registered kind and the table that folds deprecated or
//! driver-specific label keys onto their stable names.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use kube::core::ApiResource;
use kube::Resource;
use tracing::{debug, info};

use crate::crd::{AKSNodeClass, NodePool};
use crate::labels::{
    LABEL_ARCH_STABLE, LABEL_AZURE_DISK_CSI_ZONE, LABEL_INSTANCE_TYPE_STABLE, LABEL_OS_STABLE,
    LABEL_TOPOLOGY_REGION, LABEL_TOPOLOGY_ZONE,
};

static SCHEME: OnceLock<Scheme> = OnceLock::new();

/// Resource kinds registered by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// NodePool (karpenter.sh)
    NodePool,
    /// AKSNodeClass (karpenter.azure.com)
    AKSNodeClass,
}

/// All ResourceKind variants for iteration.
const ALL_RESOURCE_KINDS: &[ResourceKind] = &[ResourceKind::NodePool, ResourceKind::AKSNodeClass];

impl ResourceKind {
    /// Kubernetes Kind string
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::NodePool => "NodePool",
            Self::AKSNodeClass => "AKSNodeClass",
        }
    }

    fn api_resource(&self) -> ApiResource {
        match self {
            Self::NodePool => ApiResource::erase::<NodePool>(&()),
            Self::AKSNodeClass => ApiResource::erase::<AKSNodeClass>(&()),
        }
    }
}

/// Deprecated label keys and the stable keys they normalize to
fn upstream_normalized_labels() -> [(&'static str, &'static str); 5] {
    [
        ("failure-domain.beta.kubernetes.io/zone", LABEL_TOPOLOGY_ZONE),
        ("beta.kubernetes.io/arch", LABEL_ARCH_STABLE),
        ("beta.kubernetes.io/os", LABEL_OS_STABLE),
        ("beta.kubernetes.io/instance-type", LABEL_INSTANCE_TYPE_STABLE),
        ("failure-domain.beta.kubernetes.io/region", LABEL_TOPOLOGY_REGION),
    ]
}

/// Registered kinds and label normalization table
#[derive(Debug)]
pub struct Scheme {
    resources: BTreeMap<ResourceKind, ApiResource>,
    normalized_labels: BTreeMap<String, String>,
}

impl Scheme {
    fn build() -> Self {
        let resources = ALL_RESOURCE_KINDS
            .iter()
            .map(|kind| (*kind, kind.api_resource()))
            .collect();

        let normalized_labels = upstream_normalized_labels()
            .into_iter()
            .chain([(LABEL_AZURE_DISK_CSI_ZONE, LABEL_TOPOLOGY_ZONE)])
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            resources,
            normalized_labels,
        }
    }

    /// API identity of a registered kind
    pub fn api_resource(&self, kind: ResourceKind) -> Option<&ApiResource> {
        self.resources.get(&kind)
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.resources.keys().copied()
    }

    /// Returns true if `K` is one of the registered kinds
    pub fn recognizes<K>(&self) -> bool
    where
        K: Resource<DynamicType = ()>,
    {
        self.resources.values().any(|ar| {
            ar.group == K::group(&()) && ar.version == K::version(&()) && ar.kind == K::kind(&())
        })
    }

    /// Stable key for a label, or the key itself when it needs no folding
    pub fn normalize_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.normalized_labels
            .get(key)
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// The full normalization table
    pub fn normalized_labels(&self) -> &BTreeMap<String, String> {
        &self.normalized_labels
    }
}

/// Install the scheme, returning the process-wide instance.
///
/// The first call builds the registry; later calls return it unchanged.
pub fn install() -> &'static Scheme {
    if let Some(scheme) = SCHEME.get() {
        debug!("scheme already installed");
        return scheme;
    }
    SCHEME.get_or_init(|| {
        let scheme = Scheme::build();
        info!(
            kinds = ?scheme.kinds().map(|k| k.kind_str()).collect::<Vec<_>>(),
            normalized_labels = scheme.normalized_labels.len(),
            "installed fixture scheme"
        );
        scheme
    })
}

/// The installed scheme, if `install` has run
pub fn installed() -> Option<&'static Scheme> {
    SCHEME.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;

    #[test]
    fn install_is_idempotent() {
        let first = install();
        let second = install();
        assert!(std::ptr::eq(first, second));
        assert!(installed().is_some_and(|s| std::ptr::eq(s, first)));
    }

    #[test]
    fn registers_both_kinds() {
        let scheme = install();
        assert_eq!(
            scheme.kinds().collect::<Vec<_>>(),
            vec![ResourceKind::NodePool, ResourceKind::AKSNodeClass]
        );

        let np = scheme.api_resource(ResourceKind::NodePool).unwrap();
        assert_eq!(np.api_version, "karpenter.sh/v1beta1");
        assert_eq!(np.plural, "nodepools");

        let nc = scheme.api_resource(ResourceKind::AKSNodeClass).unwrap();
        assert_eq!(nc.group, "karpenter.azure.com");
        assert_eq!(nc.kind, ResourceKind::AKSNodeClass.kind_str());
    }

    #[test]
    fn recognizes_only_registered_kinds() {
        let scheme = install();
        assert!(scheme.recognizes::<NodePool>());
        assert!(scheme.recognizes::<AKSNodeClass>());
        assert!(!scheme.recognizes::<Pod>());
    }

    #[test]
    fn folds_disk_csi_zone_onto_topology_zone() {
        let scheme = install();
        assert_eq!(
            scheme.normalize_label("topology.disk.csi.azure.com/zone"),
            "topology.kubernetes.io/zone"
        );
        assert_eq!(
            scheme.normalize_label("failure-domain.beta.kubernetes.io/zone"),
            "topology.kubernetes.io/zone"
        );
        assert_eq!(scheme.normalize_label("beta.kubernetes.io/arch"), "kubernetes.io/arch");
        assert_eq!(scheme.normalize_label("kubernetes.io/os"), "kubernetes.io/os");
        assert_eq!(scheme.normalized_labels().len(), 6);
    }
}
