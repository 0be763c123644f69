use thiserror::Error;

use crate::auth::AuthKind;

/// Errors raised while reading objects from the cluster
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    #[error("Cluster API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Cluster request error: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("unsupported auth object {kind}")]
    UnsupportedAuthObject { kind: String },

    #[error("unsupported authentication method {method:?} for {kind}")]
    UnsupportedMethod { kind: AuthKind, method: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid auth configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid auth spec: {0}")]
    InvalidSpec(#[from] serde_json::Error),

    #[error("Key {key:?} not found in secret {namespace}/{name}")]
    MissingSecretKey {
        namespace: String,
        name: String,
        key: String,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl CredentialError {
    pub(crate) fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the two resolution failures that never reach a provider
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedAuthObject { .. } | Self::UnsupportedMethod { .. }
        )
    }
}
