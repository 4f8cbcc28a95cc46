//! Integration tests for the AKS fixture environment
//!
//! These tests walk through how an e2e suite uses the environment: build a
//! node class, point a default NodePool at it, then derive the arm64 and
//! Azure Linux variants a test matrix needs.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{NodeSelectorRequirement, Taint as CoreTaint};
use kube::ResourceExt;

use karpenter_e2e::common::crd::{ImageFamily, NodePool, RequirementOperator, TaintEffect};
use karpenter_e2e::common::{scheme, yaml};
use karpenter_e2e::{arm_variant, Environment, EnvironmentConfig};

// =============================================================================
// Helpers
// =============================================================================

fn requirement_pairs(pool: &NodePool) -> Vec<(String, Vec<String>)> {
    pool.requirements()
        .iter()
        .map(|r| (r.key.clone(), r.values.clone()))
        .collect()
}

// =============================================================================
// Default fixtures through variants
// =============================================================================

#[test]
fn default_node_class_to_arm_and_azure_linux_variants() {
    let env = Environment::default();

    let node_class = env.default_aks_node_class();
    assert!(node_class.spec.image_family.is_none());

    let base = env.default_node_pool(&node_class);
    assert_eq!(base.node_class_name(), Some(node_class.name_any().as_str()));
    assert_eq!(
        requirement_pairs(&base),
        vec![
            ("kubernetes.io/os".to_string(), vec!["linux".to_string()]),
            ("karpenter.sh/capacity-type".to_string(), vec!["on-demand".to_string()]),
            ("kubernetes.io/arch".to_string(), vec!["amd64".to_string()]),
            ("karpenter.azure.com/sku-family".to_string(), vec!["D".to_string()]),
        ]
    );

    let arm = arm_variant(base.clone()).unwrap();
    let base_reqs = requirement_pairs(&base);
    let arm_reqs = requirement_pairs(&arm);
    assert_eq!(arm_reqs.len(), base_reqs.len());
    for (index, (before, after)) in base_reqs.iter().zip(&arm_reqs).enumerate() {
        assert_eq!(before.0, after.0);
        if index == 2 {
            assert_eq!(after.1, vec!["arm64".to_string()]);
        } else {
            assert_eq!(before.1, after.1);
        }
    }
    assert_eq!(arm.spec.limits, base.spec.limits);
    assert_eq!(arm.spec.disruption, base.spec.disruption);
    assert_eq!(arm.startup_taints(), base.startup_taints());
    assert_eq!(arm.template_labels(), base.template_labels());
    assert_eq!(arm.metadata, base.metadata);

    let az_linux = env.az_linux_node_class();
    assert_eq!(az_linux.spec.image_family, Some(ImageFamily::AzureLinux));
    assert_eq!(az_linux.spec.os_disk_size_gb, node_class.spec.os_disk_size_gb);
    assert_ne!(az_linux.name_any(), node_class.name_any());
}

#[test]
fn limits_survive_the_wire() {
    let env = Environment::default();
    let pool = env.default_node_pool(&env.default_aks_node_class());

    let json = serde_json::to_string(&pool).unwrap();
    let decoded: NodePool = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, pool);

    let cpu = decoded.spec.limits.parsed("cpu").unwrap().unwrap();
    let memory = decoded.spec.limits.parsed("memory").unwrap().unwrap();
    assert_eq!(cpu.as_whole_units(), Some(100));
    assert_eq!(memory.as_whole_units(), Some(1000 * 1024 * 1024 * 1024));
    assert!(decoded.spec.disruption.expire_after.is_never());
}

#[test]
fn defaults_applied_to_a_manifest_keep_its_taints_and_labels() {
    let env = Environment::default();
    let node_class = env.default_aks_node_class();
    let mut pool: NodePool = yaml::from_yaml(
        r#"
apiVersion: karpenter.sh/v1beta1
kind: NodePool
metadata:
  name: gpu
spec:
  template:
    metadata:
      labels:
        workload: gpu
        kubernetes.azure.com/ebpf-dataplane: none
    spec:
      startupTaints:
        - key: nvidia.com/gpu
          value: "present"
          effect: NoSchedule
"#,
    )
    .unwrap();

    env.apply_defaults(&mut pool, &node_class);

    assert_eq!(pool.name_any(), "gpu");
    let keys: Vec<_> = pool.startup_taints().iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["nvidia.com/gpu", "node.cilium.io/agent-not-ready"]);
    assert_eq!(
        pool.template_labels(),
        &BTreeMap::from([
            ("kubernetes.azure.com/ebpf-dataplane".to_string(), "cilium".to_string()),
            ("workload".to_string(), "gpu".to_string()),
        ])
    );
    assert!(pool.validate().is_ok());
}

#[test]
fn region_from_variables_leaves_defaults_alone() {
    let vars = BTreeMap::from([("AZURE_LOCATION", "northeurope")]);
    let config = EnvironmentConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    let env = Environment::new(config);
    assert_eq!(env.region(), "northeurope");
    let pool = env.default_node_pool(&env.default_aks_node_class());
    assert_eq!(pool.startup_taints().len(), 1);
    assert_eq!(
        pool.template_labels().get("kubernetes.azure.com/ebpf-dataplane"),
        Some(&"cilium".to_string())
    );
}

// =============================================================================
// Kubernetes interop
// =============================================================================

#[test]
fn fixture_constraints_convert_to_core_types() {
    let env = Environment::default();
    let pool = env.arm_node_pool(&env.default_aks_node_class()).unwrap();

    let arch = pool.requirements().get("kubernetes.io/arch").unwrap();
    assert_eq!(arch.operator, RequirementOperator::In);
    let core: NodeSelectorRequirement = arch.into();
    assert_eq!(core.key, "kubernetes.io/arch");
    assert_eq!(core.operator, "In");
    assert_eq!(core.values, Some(vec!["arm64".to_string()]));

    let taint = &pool.startup_taints()[0];
    assert_eq!(taint.effect, TaintEffect::NoExecute);
    let core: CoreTaint = taint.into();
    assert_eq!(core.key, "node.cilium.io/agent-not-ready");
    assert_eq!(core.value.as_deref(), Some("true"));
    assert_eq!(core.effect, "NoExecute");
}

#[test]
fn every_environment_shares_one_scheme() {
    let first = Environment::default();
    let second = Environment::new(EnvironmentConfig::default());
    assert!(std::ptr::eq(first.scheme(), second.scheme()));
    assert!(scheme::installed().is_some());
    assert_eq!(
        first.scheme().normalize_label("topology.disk.csi.azure.com/zone"),
        "topology.kubernetes.io/zone"
    );
}
