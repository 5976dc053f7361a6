//! Error types for the provider.

use thiserror::Error;

/// Provider configuration problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was neither configured nor found in the environment.
    #[error("Missing required provider setting `{field}` (set it in the provider block or via {env})")]
    Missing {
        field: &'static str,
        env: &'static str,
    },
}

/// Errors writing attributes into resource state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The attribute is not declared in the resource schema.
    #[error("Invalid address to set: {0:?}")]
    UnknownAttribute(String),

    /// The value does not match the declared attribute type.
    #[error("{attribute}: expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors configuring the provider.
#[derive(Debug, Error)]
pub enum ConfigureError {
    /// The provider block is not a valid settings object.
    #[error("Invalid provider configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Building an API client failed.
    #[error("Failed to create API client: {0}")]
    Client(#[from] jira::JiraError),
}
