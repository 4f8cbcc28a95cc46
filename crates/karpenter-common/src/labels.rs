//! Well-known label keys and values used in node pool requirements

/// Operating system of the node
pub const LABEL_OS_STABLE: &str = "kubernetes.io/os";
/// CPU architecture of the node
pub const LABEL_ARCH_STABLE: &str = "kubernetes.io/arch";
/// Instance type of the node
pub const LABEL_INSTANCE_TYPE_STABLE: &str = "node.kubernetes.io/instance-type";
/// Availability zone of the node
pub const LABEL_TOPOLOGY_ZONE: &str = "topology.kubernetes.io/zone";
/// Region of the node
pub const LABEL_TOPOLOGY_REGION: &str = "topology.kubernetes.io/region";

/// Karpenter capacity type (spot / on-demand)
pub const CAPACITY_TYPE_LABEL_KEY: &str = "karpenter.sh/capacity-type";
/// Azure VM SKU family (D, E, F, ...)
pub const LABEL_SKU_FAMILY: &str = "karpenter.azure.com/sku-family";
/// eBPF dataplane the AKS cluster runs
pub const LABEL_EBPF_DATAPLANE: &str = "kubernetes.azure.com/ebpf-dataplane";
/// Zone label set by the Azure disk CSI driver
pub const LABEL_AZURE_DISK_CSI_ZONE: &str = "topology.disk.csi.azure.com/zone";

/// Linux operating system
pub const OS_LINUX: &str = "linux";
/// On-demand capacity
pub const CAPACITY_TYPE_ON_DEMAND: &str = "on-demand";
/// Spot capacity
pub const CAPACITY_TYPE_SPOT: &str = "spot";
/// x86-64 architecture
pub const ARCHITECTURE_AMD64: &str = "amd64";
/// 64-bit ARM architecture
pub const ARCHITECTURE_ARM64: &str = "arm64";
/// Cilium network dataplane
pub const NETWORK_DATAPLANE_CILIUM: &str = "cilium";

/// CPU resource name
pub const RESOURCE_CPU: &str = "cpu";
/// Memory resource name
pub const RESOURCE_MEMORY: &str = "memory";
