//! Provider kind enum for type-safe hosting provider dispatch.

use serde::{Deserialize, Serialize};

/// Supported hosting provider types.
///
/// This is the type of provider software, not a specific deployment: both
/// `github.com` and a GitHub Enterprise instance are `ProviderKind::GitHub`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// GitHub (github.com or GitHub Enterprise)
    GitHub,
    /// GitLab (gitlab.com or self-hosted GitLab)
    GitLab,
}

impl ProviderKind {
    /// Default REST API base URL for the public instance.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::GitHub => "https://api.github.com",
            ProviderKind::GitLab => "https://gitlab.com/api/v4",
        }
    }

    /// Default web domain for the public instance.
    #[must_use]
    pub fn default_repo_domain_url(self) -> &'static str {
        match self {
            ProviderKind::GitHub => "https://github.com",
            ProviderKind::GitLab => "https://gitlab.com",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::GitHub => write!(f, "github"),
            ProviderKind::GitLab => write!(f, "gitlab"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" | "github-enterprise" => Ok(ProviderKind::GitHub),
            "gitlab" => Ok(ProviderKind::GitLab),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}
