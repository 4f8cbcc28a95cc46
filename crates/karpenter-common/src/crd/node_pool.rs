//! NodePool Custom Resource Definition (karpenter.sh/v1beta1)
//!
//! A NodePool constrains the nodes Karpenter may launch: the requirements
//! new nodes must satisfy, the taints and labels they start with, how they
//! are disrupted, and the total resources the pool may hold.

use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::duration::NillableDuration;
use super::requirements::Requirements;
use super::taint::Taint;
use crate::quantity::ParsedQuantity;
use crate::Error;

/// Default node lifetime before Karpenter expires it
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(720 * 3600);

/// Default disruption budget
pub const DEFAULT_BUDGET_NODES: &str = "10%";

/// Specification for a NodePool
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "karpenter.sh",
    version = "v1beta1",
    kind = "NodePool",
    plural = "nodepools",
    status = "NodePoolStatus",
    namespaced = false,
    derive = "PartialEq",
    printcolumn = r#"{"name":"NodeClass","type":"string","jsonPath":".spec.template.spec.nodeClassRef.name"}"#,
    printcolumn = r#"{"name":"Weight","type":"integer","jsonPath":".spec.weight"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSpec {
    /// Template for nodes launched by this pool
    #[serde(default)]
    pub template: NodeClaimTemplate,

    /// How nodes in this pool are disrupted
    #[serde(default)]
    pub disruption: Disruption,

    /// Upper bound on resources provisioned by this pool
    #[serde(default, skip_serializing_if = "Limits::is_empty")]
    pub limits: Limits,

    /// Priority among NodePools (1-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// Template for the NodeClaims a NodePool creates
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeClaimTemplate {
    /// Labels and annotations copied onto launched nodes
    #[serde(default)]
    pub metadata: TemplateMetadata,

    /// Node constraints
    #[serde(default)]
    pub spec: NodeClaimSpec,
}

/// Metadata applied to launched nodes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    /// Node labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Node annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Scheduling constraints for launched nodes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeClaimSpec {
    /// Requirements a launched node must satisfy
    #[serde(default)]
    pub requirements: Requirements,

    /// Taints present for the lifetime of the node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,

    /// Taints expected to be removed by a daemon once the node is initialized
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub startup_taints: Vec<Taint>,

    /// The provider-specific node class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_class_ref: Option<NodeClassReference>,
}

/// Reference to the node class that configures launched nodes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeClassReference {
    /// Name of the node class
    pub name: String,

    /// Kind of the node class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// API version of the node class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl NodeClassReference {
    /// Reference a node class by name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            api_version: None,
        }
    }
}

/// When nodes are considered for consolidation
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConsolidationPolicy {
    /// Only consolidate nodes without workload pods
    WhenEmpty,
    /// Consolidate nodes whose pods fit elsewhere
    #[default]
    WhenUnderutilized,
}

/// Limit on how many nodes may be disrupted at once
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Node count or percentage ("10%", "5")
    pub nodes: String,

    /// Cron schedule during which the budget applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    /// How long the budget applies after each schedule hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<NillableDuration>,
}

impl Budget {
    /// An always-active budget
    pub fn nodes(nodes: impl Into<String>) -> Self {
        Self {
            nodes: nodes.into(),
            schedule: None,
            duration: None,
        }
    }
}

/// Disruption settings
///
/// `consolidate_after` distinguishes "absent" (`None`) from "present but
/// empty" (`Some(NillableDuration::NEVER)`); the two serialize differently.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Disruption {
    /// Which nodes are candidates for consolidation
    #[serde(default)]
    pub consolidation_policy: ConsolidationPolicy,

    /// How long a node must be a candidate before it is consolidated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidate_after: Option<NillableDuration>,

    /// Node lifetime; "Never" disables expiry
    #[serde(default = "default_expire_after")]
    pub expire_after: NillableDuration,

    /// Disruption budgets
    #[serde(default = "default_budgets")]
    pub budgets: Vec<Budget>,
}

fn default_expire_after() -> NillableDuration {
    NillableDuration::from_duration(DEFAULT_EXPIRE_AFTER)
}

fn default_budgets() -> Vec<Budget> {
    vec![Budget::nodes(DEFAULT_BUDGET_NODES)]
}

impl Default for Disruption {
    fn default() -> Self {
        Self {
            consolidation_policy: ConsolidationPolicy::default(),
            consolidate_after: None,
            expire_after: default_expire_after(),
            budgets: default_budgets(),
        }
    }
}

/// Resource ceilings keyed by resource name
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct Limits(BTreeMap<String, Quantity>);

impl Limits {
    /// Create empty limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a limit, replacing any previous value for the resource
    pub fn set(&mut self, resource: impl Into<String>, quantity: impl Into<String>) {
        self.0.insert(resource.into(), Quantity(quantity.into()));
    }

    /// Raw quantity for a resource
    pub fn get(&self, resource: &str) -> Option<&Quantity> {
        self.0.get(resource)
    }

    /// Parsed quantity for a resource
    pub fn parsed(&self, resource: &str) -> Result<Option<ParsedQuantity>, Error> {
        self.0.get(resource).map(ParsedQuantity::try_from).transpose()
    }

    /// Iterate limits in resource-name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Quantity)> {
        self.0.iter()
    }

    /// Number of limited resources
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is limited
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate that every limit parses and is non-negative
    pub fn validate(&self, node_pool: &str) -> Result<(), Error> {
        for (resource, quantity) in &self.0 {
            let field = format!("spec.limits.{resource}");
            if resource.is_empty() {
                return Err(Error::validation_for_field(
                    node_pool,
                    field,
                    "resource name cannot be empty",
                ));
            }
            let parsed = ParsedQuantity::try_from(quantity).map_err(|e| {
                Error::validation_for_field(node_pool, &field, e.to_string())
            })?;
            if parsed.is_negative() {
                return Err(Error::validation_for_field(
                    node_pool,
                    field,
                    format!("limit {} is negative", quantity.0),
                ));
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Limits
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Quantity(v.into())))
                .collect(),
        )
    }
}

/// Status for a NodePool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolStatus {
    /// Resources currently provisioned by the pool
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Quantity>,
}

impl NodePool {
    /// Name of the referenced node class, if any
    pub fn node_class_name(&self) -> Option<&str> {
        self.spec
            .template
            .spec
            .node_class_ref
            .as_ref()
            .map(|r| r.name.as_str())
    }

    /// Requirements of the node template
    pub fn requirements(&self) -> &Requirements {
        &self.spec.template.spec.requirements
    }

    /// Labels of the node template
    pub fn template_labels(&self) -> &BTreeMap<String, String> {
        &self.spec.template.metadata.labels
    }

    /// Startup taints of the node template
    pub fn startup_taints(&self) -> &[Taint] {
        &self.spec.template.spec.startup_taints
    }

    /// Validate the node pool
    pub fn validate(&self) -> Result<(), Error> {
        let name = self.name_any();
        let template = &self.spec.template.spec;

        template.requirements.validate()?;
        template
            .taints
            .iter()
            .chain(&template.startup_taints)
            .try_for_each(Taint::validate)?;
        self.spec.limits.validate(&name)?;

        if let Some(weight) = self.spec.weight {
            if !(1..=100).contains(&weight) {
                return Err(Error::validation_for_field(
                    name,
                    "spec.weight",
                    format!("weight {weight} must be between 1 and 100"),
                ));
            }
        }
        Ok(())
    }
}
