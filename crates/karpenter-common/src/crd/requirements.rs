//! Node selector requirements carried by a NodePool template
//!
//! `Requirements` keeps insertion order. Keys are not unique by construction,
//! but replacement treats the key as the identity of a requirement.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Relationship between a label key and its values
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum RequirementOperator {
    /// Label value must be in the specified set
    In,
    /// Label value must not be in the specified set
    NotIn,
    /// Label must exist (values ignored)
    Exists,
    /// Label must not exist (values ignored)
    DoesNotExist,
    /// Label value, read as an integer, must be greater than the single value
    Gt,
    /// Label value, read as an integer, must be less than the single value
    Lt,
}

impl RequirementOperator {
    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
            Self::Gt => "Gt",
            Self::Lt => "Lt",
        }
    }

    /// Returns true for the set-membership operators (In, NotIn)
    pub fn is_set_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl std::fmt::Display for RequirementOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node selector requirement with an optional minimum number of values
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelectorRequirementWithMinValues {
    /// The label key that the selector applies to
    pub key: String,

    /// Operator relating the key to the values
    pub operator: RequirementOperator,

    /// Ordered values
    ///
    /// - For `In` and `NotIn`: must be non-empty
    /// - For `Exists` and `DoesNotExist`: must be empty
    /// - For `Gt` and `Lt`: a single integer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Minimum number of distinct values the scheduler must keep available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<i32>,
}

impl NodeSelectorRequirementWithMinValues {
    /// Create a requirement with no min-values constraint
    pub fn new<I, S>(key: impl Into<String>, operator: RequirementOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
            min_values: None,
        }
    }

    /// Shorthand for a `key In [values]` requirement
    pub fn in_values<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(key, RequirementOperator::In, values)
    }

    /// Set the min-values constraint
    pub fn with_min_values(mut self, min_values: i32) -> Self {
        self.min_values = Some(min_values);
        self
    }

    /// Validate the requirement against its operator
    pub fn validate(&self) -> Result<(), Error> {
        if self.key.is_empty() {
            return Err(Error::validation("requirement key cannot be empty"));
        }

        let field = format!("requirements[{}]", self.key);
        match self.operator {
            RequirementOperator::In | RequirementOperator::NotIn => {
                if self.values.is_empty() {
                    return Err(Error::validation_for_field(
                        &self.key,
                        field,
                        format!("operator {} requires at least one value", self.operator),
                    ));
                }
            }
            RequirementOperator::Exists | RequirementOperator::DoesNotExist => {
                if !self.values.is_empty() {
                    return Err(Error::validation_for_field(
                        &self.key,
                        field,
                        format!("operator {} must not carry values", self.operator),
                    ));
                }
            }
            RequirementOperator::Gt | RequirementOperator::Lt => {
                let single_integer = matches!(self.values.as_slice(), [v] if v.parse::<i64>().is_ok());
                if !single_integer {
                    return Err(Error::validation_for_field(
                        &self.key,
                        field,
                        format!("operator {} requires exactly one integer value", self.operator),
                    ));
                }
            }
        }

        if let Some(min) = self.min_values {
            if min < 1 {
                return Err(Error::validation_for_field(
                    &self.key,
                    "minValues",
                    "minValues must be at least 1",
                ));
            }
            let available = i32::try_from(self.values.len()).unwrap_or(i32::MAX);
            if self.operator == RequirementOperator::In && min > available {
                return Err(Error::validation_for_field(
                    &self.key,
                    "minValues",
                    format!("minValues {min} exceeds the {available} values listed"),
                ));
            }
        }

        Ok(())
    }
}

impl From<&NodeSelectorRequirementWithMinValues>
    for k8s_openapi::api::core::v1::NodeSelectorRequirement
{
    fn from(req: &NodeSelectorRequirementWithMinValues) -> Self {
        Self {
            key: req.key.clone(),
            operator: req.operator.as_str().to_string(),
            values: (!req.values.is_empty()).then(|| req.values.clone()),
        }
    }
}

/// Ordered list of node selector requirements
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct Requirements(Vec<NodeSelectorRequirementWithMinValues>);

impl Requirements {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a requirement, keeping any existing entry with the same key
    pub fn push(&mut self, requirement: NodeSelectorRequirementWithMinValues) {
        self.0.push(requirement);
    }

    /// First requirement with the given key
    pub fn get(&self, key: &str) -> Option<&NodeSelectorRequirementWithMinValues> {
        self.0.iter().find(|r| r.key == key)
    }

    /// Returns true if any requirement uses the given key
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in list order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|r| r.key.as_str())
    }

    /// Iterate requirements in list order
    pub fn iter(&self) -> std::slice::Iter<'_, NodeSelectorRequirementWithMinValues> {
        self.0.iter()
    }

    /// Number of requirements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the requirement carrying the same key, keeping its position.
    ///
    /// Every entry with a matching key is overwritten. Fails without touching
    /// the list when no entry carries the key.
    pub fn replace(&mut self, requirement: NodeSelectorRequirementWithMinValues) -> Result<(), Error> {
        self.replace_all([requirement])
    }

    /// Replace several requirements by key in one step.
    ///
    /// All keys are checked before anything is written, so on error the list
    /// is left exactly as it was.
    pub fn replace_all<I>(&mut self, requirements: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = NodeSelectorRequirementWithMinValues>,
    {
        let requirements: Vec<_> = requirements.into_iter().collect();
        if let Some(missing) = requirements.iter().find(|r| !self.contains_key(&r.key)) {
            return Err(Error::requirement_not_found(&missing.key));
        }

        for requirement in requirements {
            for slot in self.0.iter_mut().filter(|r| r.key == requirement.key) {
                *slot = requirement.clone();
            }
        }
        Ok(())
    }

    /// Validate every requirement
    pub fn validate(&self) -> Result<(), Error> {
        self.0.iter().try_for_each(NodeSelectorRequirementWithMinValues::validate)
    }
}

impl From<Vec<NodeSelectorRequirementWithMinValues>> for Requirements {
    fn from(requirements: Vec<NodeSelectorRequirementWithMinValues>) -> Self {
        Self(requirements)
    }
}

impl FromIterator<NodeSelectorRequirementWithMinValues> for Requirements {
    fn from_iter<I: IntoIterator<Item = NodeSelectorRequirementWithMinValues>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Requirements {
    type Item = &'a NodeSelectorRequirementWithMinValues;
    type IntoIter = std::slice::Iter<'a, NodeSelectorRequirementWithMinValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Requirements {
        Requirements::from(vec![
            NodeSelectorRequirementWithMinValues::in_values("kubernetes.io/os", ["linux"]),
            NodeSelectorRequirementWithMinValues::in_values("kubernetes.io/arch", ["amd64"]),
            NodeSelectorRequirementWithMinValues::in_values("karpenter.azure.com/sku-family", ["D"]),
        ])
    }

    #[test]
    fn replace_keeps_position() {
        let mut reqs = sample();
        reqs.replace(NodeSelectorRequirementWithMinValues::in_values(
            "kubernetes.io/arch",
            ["arm64"],
        ))
        .unwrap();

        let keys: Vec<_> = reqs.keys().collect();
        assert_eq!(
            keys,
            ["kubernetes.io/os", "kubernetes.io/arch", "karpenter.azure.com/sku-family"]
        );
        assert_eq!(reqs.get("kubernetes.io/arch").unwrap().values, ["arm64"]);
        assert_eq!(reqs.len(), 3);
    }

    #[test]
    fn replace_overwrites_every_duplicate() {
        let mut reqs = sample();
        reqs.push(NodeSelectorRequirementWithMinValues::new(
            "kubernetes.io/arch",
            RequirementOperator::NotIn,
            ["s390x"],
        ));
        reqs.replace(NodeSelectorRequirementWithMinValues::in_values(
            "kubernetes.io/arch",
            ["arm64"],
        ))
        .unwrap();

        assert_eq!(reqs.len(), 4);
        assert!(reqs
            .iter()
            .filter(|r| r.key == "kubernetes.io/arch")
            .all(|r| r.operator == RequirementOperator::In && r.values == ["arm64"]));
    }

    #[test]
    fn replace_missing_key_fails_without_mutation() {
        let mut reqs = sample();
        let before = reqs.clone();

        let err = reqs
            .replace_all([
                NodeSelectorRequirementWithMinValues::in_values("kubernetes.io/arch", ["arm64"]),
                NodeSelectorRequirementWithMinValues::in_values("karpenter.sh/capacity-type", ["spot"]),
            ])
            .unwrap_err();

        assert!(matches!(err, Error::RequirementNotFound { ref key } if key == "karpenter.sh/capacity-type"));
        assert_eq!(reqs, before);
    }

    #[test]
    fn validation_by_operator() {
        assert!(NodeSelectorRequirementWithMinValues::in_values("k", ["v"]).validate().is_ok());
        assert!(NodeSelectorRequirementWithMinValues::in_values("", ["v"]).validate().is_err());
        assert!(
            NodeSelectorRequirementWithMinValues::in_values("k", Vec::<String>::new())
                .validate()
                .is_err()
        );
        assert!(
            NodeSelectorRequirementWithMinValues::new("k", RequirementOperator::Exists, Vec::<String>::new())
                .validate()
                .is_ok()
        );
        assert!(
            NodeSelectorRequirementWithMinValues::new("k", RequirementOperator::DoesNotExist, ["x"])
                .validate()
                .is_err()
        );
        assert!(
            NodeSelectorRequirementWithMinValues::new("k", RequirementOperator::Gt, ["4"])
                .validate()
                .is_ok()
        );
        assert!(
            NodeSelectorRequirementWithMinValues::new("k", RequirementOperator::Lt, ["four"])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn min_values_bounded_by_listed_values() {
        let req = NodeSelectorRequirementWithMinValues::in_values("k", ["a", "b"]);
        assert!(req.clone().with_min_values(2).validate().is_ok());
        assert!(req.clone().with_min_values(3).validate().is_err());
        assert!(req.with_min_values(0).validate().is_err());
    }

    #[test]
    fn wire_format_uses_camel_case_and_operator_names() {
        let req = NodeSelectorRequirementWithMinValues::in_values("k", ["a"]).with_min_values(1);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "k", "operator": "In", "values": ["a"], "minValues": 1})
        );

        let exists = NodeSelectorRequirementWithMinValues::new(
            "k",
            RequirementOperator::Exists,
            Vec::<String>::new(),
        );
        assert_eq!(
            serde_json::to_value(&exists).unwrap(),
            serde_json::json!({"key": "k", "operator": "Exists"})
        );
    }

    #[test]
    fn converts_to_core_node_selector_requirement() {
        let req = NodeSelectorRequirementWithMinValues::in_values("kubernetes.io/arch", ["arm64"])
            .with_min_values(1);
        let core = k8s_openapi::api::core::v1::NodeSelectorRequirement::from(&req);
        assert_eq!(core.key, "kubernetes.io/arch");
        assert_eq!(core.operator, "In");
        assert_eq!(core.values, Some(vec!["arm64".to_string()]));
    }
}
