use thiserror::Error;

use crate::auth::AuthScheme;

use super::provider::ProviderKind;

/// Errors surfaced by every adapter operation.
///
/// The first five variants are the capability and lookup failures callers
/// are expected to branch on. The remaining variants carry provider and
/// transport faults through unchanged.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The configured authentication scheme is not accepted by the provider.
    #[error(
        "Authentication type {configured} is not supported by {provider} (expected {})",
        scheme_list(.accepted)
    )]
    UnsupportedAuthScheme {
        provider: ProviderKind,
        configured: AuthScheme,
        accepted: &'static [AuthScheme],
    },

    /// The provider has no equivalent of the requested operation.
    #[error("{operation} is not supported by {provider}")]
    NotSupported {
        provider: ProviderKind,
        operation: &'static str,
    },

    /// Resource not found (user, issue, pull request, ...).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The configured repository does not exist on the provider.
    #[error("Could not find project {owner}/{repository}")]
    ProjectNotFound { owner: String, repository: String },

    /// The provider refused to merge the pull request.
    #[error("Pull request {id} is not mergeable: {message}")]
    NotMergeable { id: u64, message: String },

    /// Authentication required or failed.
    #[error("Authentication required")]
    AuthRequired,

    /// API error from the provider.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Invalid adapter configuration.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn scheme_list(schemes: &[AuthScheme]) -> String {
    schemes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

impl AdapterError {
    /// Create a capability-gap error.
    #[inline]
    pub fn not_supported(provider: ProviderKind, operation: &'static str) -> Self {
        Self::NotSupported {
            provider,
            operation,
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is a declared capability gap.
    #[inline]
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    /// Check if this error is a failed lookup (entity, user or project).
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ProjectNotFound { .. })
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for errors
/// that include multi-line provider responses.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
