//! Node taints applied through a NodePool template

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Effect of a taint on pods that do not tolerate it
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum TaintEffect {
    /// Do not schedule new pods
    NoSchedule,
    /// Avoid scheduling new pods when possible
    PreferNoSchedule,
    /// Evict running pods and do not schedule new ones
    NoExecute,
}

impl TaintEffect {
    /// Wire name of the effect
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSchedule => "NoSchedule",
            Self::PreferNoSchedule => "PreferNoSchedule",
            Self::NoExecute => "NoExecute",
        }
    }
}

impl std::fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taint placed on nodes launched from a NodePool
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Taint {
    /// Taint key
    pub key: String,

    /// Taint value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Taint effect
    pub effect: TaintEffect,
}

impl Taint {
    /// Create a taint with a value
    pub fn new(key: impl Into<String>, value: impl Into<String>, effect: TaintEffect) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            effect,
        }
    }

    /// Validate the taint
    pub fn validate(&self) -> Result<(), Error> {
        if self.key.is_empty() {
            return Err(Error::validation("taint key cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Display for Taint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}:{}", self.key, value, self.effect),
            None => write!(f, "{}:{}", self.key, self.effect),
        }
    }
}

impl From<&Taint> for k8s_openapi::api::core::v1::Taint {
    fn from(taint: &Taint) -> Self {
        Self {
            key: taint.key.clone(),
            value: taint.value.clone(),
            effect: taint.effect.as_str().to_string(),
            time_added: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_kubectl_notation() {
        let taint = Taint::new("node.cilium.io/agent-not-ready", "true", TaintEffect::NoExecute);
        assert_eq!(taint.to_string(), "node.cilium.io/agent-not-ready=true:NoExecute");

        let bare = Taint {
            key: "dedicated".to_string(),
            value: None,
            effect: TaintEffect::NoSchedule,
        };
        assert_eq!(bare.to_string(), "dedicated:NoSchedule");
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let res: Result<Taint, _> =
            serde_json::from_str(r#"{"key":"k","value":"v","effect":"Evict"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_key_fails_validation() {
        assert!(Taint::new("", "v", TaintEffect::NoSchedule).validate().is_err());
        assert!(Taint::new("k", "v", TaintEffect::NoSchedule).validate().is_ok());
    }

    #[test]
    fn converts_to_core_taint() {
        let taint = Taint::new("k", "v", TaintEffect::PreferNoSchedule);
        let core = k8s_openapi::api::core::v1::Taint::from(&taint);
        assert_eq!(core.effect, "PreferNoSchedule");
        assert_eq!(core.value.as_deref(), Some("v"));
        assert!(core.time_added.is_none());
    }
}
