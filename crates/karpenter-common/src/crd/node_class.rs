//! AKSNodeClass Custom Resource Definition (karpenter.azure.com/v1alpha2)
//!
//! The node class carries the Azure-specific settings a NodePool refers to
//! by name: which image family to boot, how large the OS disk is, and the
//! tags put on the VM.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default OS disk size in GB
pub const DEFAULT_OS_DISK_SIZE_GB: i32 = 128;

/// Node image families supported on AKS
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ImageFamily {
    /// Ubuntu 22.04 (used when no family is selected)
    #[default]
    Ubuntu2204,
    /// Azure Linux
    AzureLinux,
}

impl ImageFamily {
    /// Wire name of the image family
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ubuntu2204 => "Ubuntu2204",
            Self::AzureLinux => "AzureLinux",
        }
    }
}

impl std::fmt::Display for ImageFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ubuntu2204" => Ok(Self::Ubuntu2204),
            "AzureLinux" => Ok(Self::AzureLinux),
            _ => Err(crate::Error::validation(format!(
                "invalid image family: {s}, expected one of: Ubuntu2204, AzureLinux"
            ))),
        }
    }
}

/// Specification for an AKSNodeClass
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "karpenter.azure.com",
    version = "v1alpha2",
    kind = "AKSNodeClass",
    plural = "aksnodeclasses",
    shortname = "aksnc",
    namespaced = false,
    derive = "PartialEq",
    printcolumn = r#"{"name":"ImageFamily","type":"string","jsonPath":".spec.imageFamily"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AKSNodeClassSpec {
    /// Image family; unset means the provider default (Ubuntu2204)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_family: Option<ImageFamily>,

    /// OS disk size in GB
    #[serde(
        default,
        rename = "osDiskSizeGB",
        skip_serializing_if = "Option::is_none"
    )]
    pub os_disk_size_gb: Option<i32>,

    /// Pinned node image version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_version: Option<String>,

    /// Tags applied to the VMs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl AKSNodeClassSpec {
    /// Image family nodes will actually boot
    pub fn effective_image_family(&self) -> ImageFamily {
        self.image_family.unwrap_or_default()
    }
}
