//! Environment configuration read from process environment variables
//!
//! Only describes the cluster under test. Fixture contents never depend on it.

use crate::Error;

/// Region used when `AZURE_LOCATION` is unset
pub const DEFAULT_REGION: &str = "westus2";

/// Variable naming the Azure region
pub const REGION_ENV: &str = "AZURE_LOCATION";

/// Settings of the cluster the fixtures are built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Azure region
    pub region: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`
    ///
    /// Unset and empty variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = match lookup(REGION_ENV).map(|v| v.trim().to_string()) {
            Some(region) if !region.is_empty() => validate_region(region)?,
            _ => DEFAULT_REGION.to_string(),
        };
        Ok(Self { region })
    }

    /// Set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Azure region names are lowercase letters and digits ("westus2", "eastus")
fn validate_region(region: String) -> Result<String, Error> {
    if region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        Ok(region)
    } else {
        Err(Error::config(
            REGION_ENV,
            format!("invalid region '{region}', expected lowercase letters and digits"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EnvironmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EnvironmentConfig::default());
        assert_eq!(config.region, "westus2");
    }

    #[test]
    fn reads_region() {
        let config = EnvironmentConfig::from_lookup(lookup(&[("AZURE_LOCATION", " eastus ")])).unwrap();
        assert_eq!(config.region, "eastus");
    }

    #[test]
    fn empty_region_falls_back() {
        let config = EnvironmentConfig::from_lookup(lookup(&[("AZURE_LOCATION", "  ")])).unwrap();
        assert_eq!(config, EnvironmentConfig::default());
    }

    #[test]
    fn malformed_region_is_rejected() {
        let err = EnvironmentConfig::from_lookup(lookup(&[("AZURE_LOCATION", "West US 2")]))
            .unwrap_err();
        match err {
            Error::Config { key, message } => {
                assert_eq!(key, REGION_ENV);
                assert!(message.contains("West US 2"));
            }
            other => panic!("expected Config, got {other:?}"),
        }
    }
}
