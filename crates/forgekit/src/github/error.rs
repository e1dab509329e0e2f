//! GitHub API error types.

use thiserror::Error;

use crate::platform::AdapterError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport failure; no response was received.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Credentials missing, invalid or lacking permission.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: u16, resource: &str, body: &[u8]) -> Self {
        let message = error_message(body);
        match status {
            401 | 403 => Self::Auth(format!("{}: {}", status, message)),
            404 => Self::NotFound(resource.to_string()),
            _ => Self::Api { status, message },
        }
    }

    /// The HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// GitHub error bodies carry a `message` field; fall back to the raw body.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

impl From<GitHubError> for AdapterError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(message) => AdapterError::Network { message },
            GitHubError::Json(e) => AdapterError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            GitHubError::Api { status, message } => AdapterError::Api { status, message },
            GitHubError::Auth(_) => AdapterError::AuthRequired,
            GitHubError::NotFound(resource) => AdapterError::NotFound { resource },
            GitHubError::Config(message) => AdapterError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let err = GitHubError::from_status(401, "/user", br#"{"message":"Bad credentials"}"#);
        assert!(matches!(err, GitHubError::Auth(ref m) if m.contains("Bad credentials")));

        let err = GitHubError::from_status(404, "/repos/a/b/issues/9", b"");
        assert!(matches!(err, GitHubError::NotFound(ref r) if r == "/repos/a/b/issues/9"));
        assert_eq!(err.status(), Some(404));

        let err = GitHubError::from_status(
            405,
            "/repos/a/b/pulls/1/merge",
            br#"{"message":"Pull Request is not mergeable"}"#,
        );
        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 405);
                assert_eq!(message, "Pull Request is not mergeable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_plain_body() {
        let err = GitHubError::from_status(500, "/x", b"  upstream exploded \n");
        assert!(matches!(err, GitHubError::Api { ref message, .. } if message == "upstream exploded"));
    }

    #[test]
    fn test_adapter_error_conversion() {
        let err: AdapterError = GitHubError::Auth("bad".to_string()).into();
        assert!(matches!(err, AdapterError::AuthRequired));

        let err: AdapterError = GitHubError::NotFound("user ghost".to_string()).into();
        assert!(err.is_not_found());

        let err: AdapterError = GitHubError::Http("reset".to_string()).into();
        assert!(matches!(err, AdapterError::Network { .. }));

        let err: AdapterError = GitHubError::Api {
            status: 422,
            message: "Validation Failed".to_string(),
        }
        .into();
        assert!(matches!(err, AdapterError::Api { status: 422, .. }));
    }
}
