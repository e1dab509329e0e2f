//! Forgekit - provider-agnostic adapters for Git hosting services.
//!
//! This library lets a workflow tool drive issues, merge requests, projects
//! and releases on GitHub and GitLab through one [`ForgeAdapter`] contract.
//! Provider records are normalized into canonical entities with identical
//! field names whatever their source.
//!
//! # Features
//!
//! - `github` - GitHub and GitHub Enterprise adapter (default).
//! - `gitlab` - GitLab adapter (default).
//!
//! # Example
//!
//! ```ignore
//! use forgekit::{AdapterConfig, AuthConfig, AuthScheme, IssueFilter, IssueState, ProviderKind};
//!
//! let config = AdapterConfig::new(
//!     ProviderKind::GitLab,
//!     AuthConfig { scheme: AuthScheme::HttpToken, username: None, secret: token },
//! );
//! let mut adapter = forgekit::build_adapter(&config, "acme/widgets".parse()?)?;
//! adapter.authenticate().await?;
//!
//! match adapter.get_labels().await {
//!     Ok(labels) => println!("{} labels", labels.len()),
//!     Err(e) if e.is_not_supported() => println!("{e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod adapter;
pub mod auth;
pub mod config;
pub mod http;
pub mod model;
pub mod platform;
pub mod resolver;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "gitlab")]
pub mod gitlab;

pub use adapter::{ForgeAdapter, build_adapter, build_adapter_with_transport};
pub use auth::{AuthScheme, AuthState};
pub use config::{AdapterConfig, AuthConfig, RepositoryRef};
#[cfg(test)]
pub use http::MockTransport;
pub use http::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use model::{
    BranchRef, Canonical, Comment, CommitRef, ForkOrigin, Issue, IssueFilter, IssueOptions,
    IssueState, IssueUpdate, Label, Milestone, MilestoneFilter, Project, PullRequest,
    PullRequestOptions, PullRequestState, Release, ReleaseAsset, ReleaseOptions, User,
    Visibility,
};
pub use platform::{AdapterError, ProviderKind, Result, short_error_message};
