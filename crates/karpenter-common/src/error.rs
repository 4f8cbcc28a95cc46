//! Error types for fixture construction
//!
//! Errors carry the resource and field they refer to so a failing test
//! points straight at the offending part of the fixture.

use thiserror::Error;

/// Default context value when no specific resource is known
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for fixture operations
#[derive(Debug, Error)]
pub enum Error {
    /// A fixture violates an invariant of its schema
    #[error("validation error for {resource}: {message}")]
    Validation {
        /// Name of the resource with invalid content
        resource: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.limits.cpu")
        field: Option<String>,
    },

    /// Replace-by-key targeted a requirement key the list does not carry
    #[error("no requirement with key {key} to replace")]
    RequirementNotFound {
        /// The requirement key that was looked up
        key: String,
    },

    /// A resource quantity string could not be parsed
    #[error("invalid quantity '{value}': {message}")]
    Quantity {
        /// The offending input
        value: String,
        /// Description of what failed
        message: String,
    },

    /// A duration string could not be parsed
    #[error("invalid duration '{value}': {message}")]
    Duration {
        /// The offending input
        value: String,
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with resource context and field path
    pub fn validation_for_field(
        resource: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a requirement-not-found error
    pub fn requirement_not_found(key: impl Into<String>) -> Self {
        Self::RequirementNotFound { key: key.into() }
    }

    /// Create a quantity parse error
    pub fn quantity(value: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Quantity {
            value: value.into(),
            message: msg.into(),
        }
    }

    /// Create a duration parse error
    pub fn duration(value: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Duration {
            value: value.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Returns the field path for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
