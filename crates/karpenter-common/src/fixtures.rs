//! Core fixture factories
//!
//! Bare NodePool and AKSNodeClass objects with upstream defaults, plus the
//! small mutation helpers provider-specific environments build on.

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

use crate::crd::{
    AKSNodeClass, AKSNodeClassSpec, NodePool, NodePoolSpec, NodeSelectorRequirementWithMinValues,
    DEFAULT_OS_DISK_SIZE_GB,
};
use crate::Result;

const RANDOM_SUFFIX_LEN: usize = 10;

/// `prefix-` followed by a random lowercase alphanumeric suffix
pub fn random_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{prefix}-{suffix}")
}

/// A NodePool with a unique name and upstream defaults
///
/// The template is empty; disruption uses the v1beta1 defaults.
pub fn node_pool() -> NodePool {
    NodePool::new(&random_name("nodepool"), NodePoolSpec::default())
}

/// An AKSNodeClass with a unique name and no image family override
pub fn aks_node_class() -> AKSNodeClass {
    AKSNodeClass::new(
        &random_name("nodeclass"),
        AKSNodeClassSpec {
            os_disk_size_gb: Some(DEFAULT_OS_DISK_SIZE_GB),
            ..Default::default()
        },
    )
}

/// Replace node pool requirements by key, keeping their positions.
///
/// Fails, leaving the pool untouched, if any key is not already present.
pub fn replace_requirements<I>(node_pool: &mut NodePool, requirements: I) -> Result<()>
where
    I: IntoIterator<Item = NodeSelectorRequirementWithMinValues>,
{
    let requirements: Vec<_> = requirements.into_iter().collect();
    debug!(
        keys = ?requirements.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
        "replacing node pool requirements"
    );
    node_pool
        .spec
        .template
        .spec
        .requirements
        .replace_all(requirements)
}

/// Merge entries into a label map
///
/// Keys only in `labels` are kept, keys in both take the new value.
pub fn merge_labels<I, K, V>(labels: &mut BTreeMap<String, String>, entries: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    labels.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
}
