//! GitLab provider.
//!
//! - [`error`] - Error types for GitLab API operations
//! - [`types`] - Wire records returned by the v4 REST API
//! - [`client`] - REST client; also the paged project listing the resolver walks
//! - [`convert`] - Normalization into canonical entities
//! - [`adapter`] - The [`ForgeAdapter`](crate::ForgeAdapter) implementation
//!
//! Labels, releases and forking are capability gaps on this provider and
//! fail with [`AdapterError::NotSupported`](crate::AdapterError::NotSupported).

mod adapter;
mod client;
mod convert;
mod error;
mod types;

pub use adapter::{ACCEPTED_SCHEMES, GitLabAdapter};
pub use client::GitLabClient;
pub use error::GitLabError;
