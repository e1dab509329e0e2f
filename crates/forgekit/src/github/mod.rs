//! GitHub provider.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Wire records returned by the REST API
//! - [`client`] - REST client over the transport seam
//! - [`convert`] - Normalization into canonical entities
//! - [`adapter`] - The [`ForgeAdapter`](crate::ForgeAdapter) implementation
//!
//! ```ignore
//! use forgekit::github::GitHubAdapter;
//!
//! let mut adapter = GitHubAdapter::new(&config, "acme/widgets".parse()?, transport)?;
//! adapter.authenticate().await?;
//! let open = adapter.get_issues(&IssueFilter::state(IssueState::Open)).await?;
//! ```

mod adapter;
mod client;
mod convert;
mod error;
mod types;

pub use adapter::{ACCEPTED_SCHEMES, GitHubAdapter};
pub use client::GitHubClient;
pub use error::GitHubError;
