//! Adapter configuration consumed from the caller.
//!
//! The library does not load or prompt for configuration; it only receives
//! the resulting values. All types deserialize with serde so the CLI can feed
//! them from any layered source.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::auth::{AuthScheme, Credentials};
use crate::platform::{AdapterError, ProviderKind, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Credentials section of the adapter configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub scheme: AuthScheme,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(alias = "password_or_token")]
    pub secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Configuration of one adapter instance.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    pub provider: ProviderKind,
    /// REST API base URL. Defaults to the provider's public instance.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Web domain used for user-facing URLs.
    #[serde(default)]
    pub repo_domain_url: Option<String>,
    pub authentication: AuthConfig,
    /// Passed through to the transport; not used by the adapters themselves.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AdapterConfig {
    /// Build a configuration for the provider's public instance.
    pub fn new(provider: ProviderKind, authentication: AuthConfig) -> Self {
        Self {
            provider,
            base_url: None,
            repo_domain_url: None,
            authentication,
            cache_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// API base URL without trailing slashes.
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Web domain URL without trailing slashes.
    pub fn repo_domain_url(&self) -> String {
        self.repo_domain_url
            .as_deref()
            .unwrap_or(self.provider.default_repo_domain_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Adapter name, `"{provider}:{host}"`.
    pub fn adapter_name(&self) -> Result<String> {
        let base = self.base_url();
        let parsed = url::Url::parse(&base)
            .map_err(|e| AdapterError::config(format!("invalid base_url {}: {}", base, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AdapterError::config(format!("base_url {} has no host", base)))?;
        Ok(format!("{}:{}", self.provider, host))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            scheme: self.authentication.scheme,
            username: self.authentication.username.clone(),
            secret: self.authentication.secret.clone(),
        }
    }
}

/// The repository an adapter instance works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`, matching a project's `path_with_namespace`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = AdapterError;

    /// Parse `owner/name`. Nested GitLab groups keep everything before the
    /// last slash as the owner.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_end_matches(".git");
        match s.rsplit_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(AdapterError::config(format!(
                "repository must be owner/name, got {:?}",
                s
            ))),
        }
    }
}
