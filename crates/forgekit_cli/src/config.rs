//! Configuration file support for the forgekit CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `FORGEKIT_`, e.g., `FORGEKIT_GITLAB_TOKEN`)
//! 3. Config file (./forgekit.toml, then ~/.config/forgekit/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! provider = "gitlab"
//! repo = "acme/widgets"
//! timeout = 30
//!
//! [github]
//! scheme = "http_token"   # or "http_password" together with `username`
//! token = "ghp_..."       # or use FORGEKIT_GITHUB_TOKEN env var
//!
//! [gitlab]
//! api = "https://gitlab.example.com/api/v4"   # optional, defaults to gitlab.com
//! web = "https://gitlab.example.com"
//! token = "glpat-..."     # or use FORGEKIT_GITLAB_TOKEN env var
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use forgekit::config::DEFAULT_TIMEOUT_SECS;
use forgekit::{AdapterConfig, AuthConfig, AuthScheme, ProviderKind};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider used when `--provider` is not given.
    pub provider: Option<String>,
    /// Repository used when `--repo` is not given.
    pub repo: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub github: ProviderSection,
    pub gitlab: ProviderSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            repo: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            github: ProviderSection::default(),
            gitlab: ProviderSection::default(),
        }
    }
}

/// Per-provider settings. Keys are single words so they map onto
/// `FORGEKIT_<PROVIDER>_<KEY>` environment variables.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// REST API base URL.
    pub api: Option<String>,
    /// Web domain for user-facing URLs.
    pub web: Option<String>,
    /// `http_token` (default) or `http_password`.
    pub scheme: Option<String>,
    pub username: Option<String>,
    /// Token, or password for `http_password`.
    pub token: Option<String>,
}

impl std::fmt::Debug for ProviderSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSection")
            .field("api", &self.api)
            .field("web", &self.web)
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/forgekit/config.toml)
    /// 3. Local config file (./forgekit.toml)
    /// 4. Environment variables with FORGEKIT_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from("forgekit.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./forgekit.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., FORGEKIT_GITLAB_TOKEN -> gitlab.token
        builder = builder.add_source(
            Environment::with_prefix("FORGEKIT")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "forgekit").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn section(&self, provider: ProviderKind) -> &ProviderSection {
        match provider {
            ProviderKind::GitHub => &self.github,
            ProviderKind::GitLab => &self.gitlab,
        }
    }

    /// Build the adapter configuration for `provider`.
    pub fn to_adapter_config(&self, provider: ProviderKind) -> Result<AdapterConfig, String> {
        let section = self.section(provider);
        let scheme = match section.scheme.as_deref() {
            Some(s) => s.parse::<AuthScheme>()?,
            None => AuthScheme::HttpToken,
        };
        let secret = section.token.clone().ok_or_else(|| {
            format!(
                "No credentials configured for {} (set FORGEKIT_{}_TOKEN)",
                provider,
                provider.to_string().to_uppercase()
            )
        })?;

        let mut config = AdapterConfig::new(
            provider,
            AuthConfig {
                scheme,
                username: section.username.clone(),
                secret,
            },
        );
        config.base_url = section.api.clone();
        config.repo_domain_url = section.web.clone();
        config.timeout_secs = self.timeout;
        Ok(config)
    }
}
