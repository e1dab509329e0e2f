//! Authentication schemes and the per-adapter authentication state.
//!
//! Each provider declares the schemes it accepts. [`ensure_supported`] is the
//! single validation point; adapters call it before touching credentials or
//! the network.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::platform::{AdapterError, ProviderKind, Result};

/// How credentials are presented to a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// A personal access token.
    HttpToken,
    /// A username and password sent as HTTP Basic credentials.
    HttpPassword,
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthScheme::HttpToken => write!(f, "http_token"),
            AuthScheme::HttpPassword => write!(f, "http_password"),
        }
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http_token" | "token" => Ok(AuthScheme::HttpToken),
            "http_password" | "password" => Ok(AuthScheme::HttpPassword),
            _ => Err(format!("Unknown authentication scheme: {}", s)),
        }
    }
}

/// Resolved credentials handed to a provider client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub scheme: AuthScheme,
    pub username: Option<String>,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Authentication state of one adapter instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(AuthScheme),
}

impl AuthState {
    #[inline]
    pub fn is_authenticated(self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Check a configured scheme against the schemes a provider accepts.
pub fn ensure_supported(
    provider: ProviderKind,
    accepted: &'static [AuthScheme],
    configured: AuthScheme,
) -> Result<()> {
    if accepted.contains(&configured) {
        Ok(())
    } else {
        Err(AdapterError::UnsupportedAuthScheme {
            provider,
            configured,
            accepted,
        })
    }
}

/// Build an HTTP Basic `Authorization` header value.
pub fn basic_authorization(username: &str, password: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}
