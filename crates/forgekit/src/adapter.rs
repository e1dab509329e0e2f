//! The provider-independent adapter contract.
//!
//! Every hosting provider implements [`ForgeAdapter`]. Callers pick an
//! implementation once through [`build_adapter`] and never branch on the
//! provider again: operations a provider cannot perform fail with
//! [`AdapterError::NotSupported`], which callers detect with
//! [`AdapterError::is_not_supported`].

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;

use crate::config::{AdapterConfig, RepositoryRef};
use crate::http::HttpTransport;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::model::{
    Comment, CommitRef, Issue, IssueFilter, IssueOptions, IssueUpdate, Label, Milestone,
    MilestoneFilter, Project, PullRequest, PullRequestOptions, PullRequestState, Release,
    ReleaseAsset, ReleaseOptions,
};
use crate::platform::{AdapterError, ProviderKind, Result};

/// Operations every hosting provider adapter supports.
///
/// Identifiers passed to issue and pull request operations are display
/// numbers (`Issue::number`, `PullRequest::number`). Releases are addressed by
/// their provider id.
#[async_trait]
pub trait ForgeAdapter: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// `"{provider}:{host}"`.
    fn name(&self) -> &str;

    /// Validate the configured scheme and apply credentials.
    ///
    /// Fails with [`AdapterError::UnsupportedAuthScheme`] before any network
    /// call when the provider does not accept the configured scheme.
    async fn authenticate(&mut self) -> Result<()>;

    /// Probe the provider with the current credentials.
    ///
    /// Returns `false` when the provider rejects them; transport faults are
    /// returned as errors.
    async fn is_authenticated(&self) -> Result<bool>;

    /// Where a user can create an access token, if the provider has such a page.
    fn token_generation_url(&self) -> Option<String>;

    /// The configured repository as a canonical project.
    async fn current_project(&self) -> Result<Project>;

    /// Fork the configured repository into `organization`, or into the
    /// authenticated user's namespace when `None`.
    async fn create_fork(&self, organization: Option<&str>) -> Result<Project>;

    async fn open_issue(&self, subject: &str, body: &str, options: &IssueOptions)
    -> Result<Issue>;

    async fn get_issue(&self, id: u64) -> Result<Issue>;

    async fn get_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Web URL of an issue.
    fn issue_url(&self, id: u64) -> String;

    /// Fails with [`AdapterError::NotFound`] naming the assignee when it does
    /// not resolve to a user, without issuing the update.
    async fn update_issue(&self, id: u64, update: &IssueUpdate) -> Result<Issue>;

    async fn close_issue(&self, id: u64) -> Result<Issue>;

    async fn create_comment(&self, id: u64, body: &str) -> Result<Comment>;

    async fn get_comments(&self, id: u64) -> Result<Vec<Comment>>;

    async fn get_labels(&self) -> Result<Vec<Label>>;

    async fn get_milestones(&self, filter: &MilestoneFilter) -> Result<Vec<Milestone>>;

    /// Open a pull request from `head` (`branch` or `owner:branch`) into `base`.
    async fn open_pull_request(
        &self,
        base: &str,
        head: &str,
        subject: &str,
        body: &str,
        options: &PullRequestOptions,
    ) -> Result<PullRequest>;

    async fn get_pull_request(&self, id: u64) -> Result<PullRequest>;

    /// List pull requests, keeping only those whose canonical state equals
    /// `state`. `None` lists every state.
    async fn get_pull_requests(&self, state: Option<PullRequestState>) -> Result<Vec<PullRequest>>;

    async fn get_pull_request_commits(&self, id: u64) -> Result<Vec<CommitRef>>;

    /// Fails with [`AdapterError::NotMergeable`] when the provider refuses.
    async fn merge_pull_request(&self, id: u64, message: &str) -> Result<PullRequest>;

    async fn close_pull_request(&self, id: u64) -> Result<PullRequest>;

    async fn create_release(&self, name: &str, options: &ReleaseOptions) -> Result<Release>;

    async fn get_releases(&self) -> Result<Vec<Release>>;

    async fn remove_release(&self, id: u64) -> Result<()>;

    async fn create_release_asset(
        &self,
        release_id: u64,
        name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<ReleaseAsset>;
}

/// Build the adapter for `config.provider` backed by the reqwest transport.
pub fn build_adapter(
    config: &AdapterConfig,
    repository: RepositoryRef,
) -> Result<Box<dyn ForgeAdapter>> {
    let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(config.timeout_secs))
        .map_err(|e| AdapterError::config(e.to_string()))?;
    build_adapter_with_transport(config, repository, Arc::new(transport))
}

/// Build the adapter for `config.provider` over an explicit transport.
#[allow(unused_variables)]
pub fn build_adapter_with_transport(
    config: &AdapterConfig,
    repository: RepositoryRef,
    transport: Arc<dyn HttpTransport>,
) -> Result<Box<dyn ForgeAdapter>> {
    match config.provider {
        #[cfg(feature = "github")]
        ProviderKind::GitHub => Ok(Box::new(crate::github::GitHubAdapter::new(
            config, repository, transport,
        )?)),
        #[cfg(feature = "gitlab")]
        ProviderKind::GitLab => Ok(Box::new(crate::gitlab::GitLabAdapter::new(
            config, repository, transport,
        )?)),
        #[allow(unreachable_patterns)]
        other => Err(AdapterError::config(format!(
            "{} support is not compiled in",
            other
        ))),
    }
}
