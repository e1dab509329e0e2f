//! GitLab API error types.

use thiserror::Error;

use crate::platform::AdapterError;

/// Errors that can occur when interacting with the GitLab API.
#[derive(Debug, Error)]
pub enum GitLabError {
    #[error("HTTP request error: {0}")]
    Http(String),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GitLabError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: u16, resource: &str, body: &[u8]) -> Self {
        let message = error_message(body);
        match status {
            401 | 403 => Self::Auth(format!("{}: {}", status, message)),
            404 => Self::NotFound(resource.to_string()),
            _ => Self::Api { status, message },
        }
    }
}

/// GitLab reports errors as `{"message": ...}` (a string, or a map of field
/// errors for validation failures) or `{"error": "..."}`.
fn error_message(body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
    let field = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")));
    match field {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// Convert GitLabError to the provider-agnostic AdapterError.
impl From<GitLabError> for AdapterError {
    fn from(err: GitLabError) -> Self {
        match err {
            GitLabError::Http(message) => AdapterError::Network { message },
            GitLabError::Json(e) => AdapterError::internal(format!("JSON parse error: {}", e)),
            GitLabError::Api { status, message } => AdapterError::Api { status, message },
            GitLabError::Auth(_) => AdapterError::AuthRequired,
            GitLabError::NotFound(resource) => AdapterError::NotFound { resource },
            GitLabError::Config(message) => AdapterError::Config { message },
        }
    }
}
