//! [`ForgeAdapter`] implementation for GitHub and GitHub Enterprise.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::client::{GitHubClient, PAGE_SIZE};
use super::convert;
use super::error::GitHubError;
use super::types::{
    GitHubComment, GitHubCommit, GitHubIssue, GitHubLabel, GitHubMergeResult, GitHubMilestone,
    GitHubPullRequest, GitHubRelease, GitHubReleaseAsset, GitHubRepository, GitHubUser,
};
use crate::adapter::ForgeAdapter;
use crate::auth::{AuthScheme, AuthState, Credentials, ensure_supported};
use crate::config::{AdapterConfig, RepositoryRef};
use crate::http::HttpTransport;
use crate::model::{
    Comment, CommitRef, Issue, IssueFilter, IssueOptions, IssueState, IssueUpdate, Label,
    Milestone, MilestoneFilter, Project, PullRequest, PullRequestOptions, PullRequestState,
    Release, ReleaseAsset, ReleaseOptions,
};
use crate::platform::{AdapterError, ProviderKind, Result};

/// GitHub accepts both password and token authentication.
pub const ACCEPTED_SCHEMES: &[AuthScheme] = &[AuthScheme::HttpPassword, AuthScheme::HttpToken];

/// Adapter over the GitHub REST API.
pub struct GitHubAdapter {
    client: GitHubClient,
    name: String,
    repo_domain_url: String,
    repository: RepositoryRef,
    credentials: Credentials,
    state: AuthState,
    /// The configured repository, fetched once per adapter.
    project: OnceCell<GitHubRepository>,
}

impl GitHubAdapter {
    pub fn new(
        config: &AdapterConfig,
        repository: RepositoryRef,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let name = config.adapter_name()?;
        Ok(Self {
            client: GitHubClient::new_with_transport(&config.base_url(), transport),
            name,
            repo_domain_url: config.repo_domain_url(),
            repository,
            credentials: config.credentials(),
            state: AuthState::Unauthenticated,
            project: OnceCell::new(),
        })
    }

    pub fn auth_state(&self) -> AuthState {
        self.state
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.repository.owner, self.repository.name)
    }

    fn list_path(&self, resource: &str, params: &[(&str, &str)]) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            query.append_pair(key, value);
        }
        query.append_pair("per_page", &PAGE_SIZE.to_string());
        format!("{}/{}?{}", self.repo_path(), resource, query.finish())
    }

    async fn repository(&self) -> Result<&GitHubRepository> {
        self.project
            .get_or_try_init(|| async {
                let repo: GitHubRepository = self.client.get(&self.repo_path()).await?;
                info!("Resolved project {}", repo.full_name);
                Ok(repo)
            })
            .await
    }

    /// Fail with `NotFound` naming `login` unless the user exists.
    async fn ensure_user_exists(&self, login: &str) -> Result<()> {
        let segment: String = url::form_urlencoded::byte_serialize(login.as_bytes()).collect();
        let path = format!("/users/{}", segment);
        match self.client.get::<GitHubUser>(&path).await {
            Ok(user) => {
                debug!("Assignee {} resolved", convert::to_user(&user)?.login);
                Ok(())
            }
            Err(GitHubError::NotFound(_)) => Err(AdapterError::not_found(login)),
            Err(e) => Err(e.into()),
        }
    }
}

fn issue_state_param(state: Option<IssueState>) -> &'static str {
    match state {
        Some(IssueState::Open) => "open",
        Some(IssueState::Closed) => "closed",
        None => "all",
    }
}

#[async_trait]
impl ForgeAdapter for GitHubAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&mut self) -> Result<()> {
        ensure_supported(ProviderKind::GitHub, ACCEPTED_SCHEMES, self.credentials.scheme)?;
        self.client.authenticate(&self.credentials)?;
        self.state = AuthState::Authenticated(self.credentials.scheme);
        info!(
            "Authenticated {} with {}",
            self.name, self.credentials.scheme
        );
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool> {
        let path = match self.state {
            AuthState::Authenticated(AuthScheme::HttpPassword) => "/authorizations",
            _ => "/user",
        };
        Ok(self.client.probe(path).await?)
    }

    fn token_generation_url(&self) -> Option<String> {
        Some(format!("{}/settings/tokens", self.repo_domain_url))
    }

    async fn current_project(&self) -> Result<Project> {
        convert::to_project(self.repository().await?)
    }

    async fn create_fork(&self, organization: Option<&str>) -> Result<Project> {
        let body = match organization {
            Some(org) => json!({ "organization": org }),
            None => json!({}),
        };
        let path = format!("{}/forks", self.repo_path());
        let repo: GitHubRepository = self.client.post(&path, &body).await?;
        info!("Forked {} into {}", self.repository, repo.full_name);
        convert::to_project(&repo)
    }

    async fn open_issue(
        &self,
        subject: &str,
        body: &str,
        options: &IssueOptions,
    ) -> Result<Issue> {
        let path = format!("{}/issues", self.repo_path());
        let payload = convert::new_issue_payload(subject, body, options);
        let issue: GitHubIssue = self.client.post(&path, &payload).await?;
        convert::to_issue(&issue)
    }

    async fn get_issue(&self, id: u64) -> Result<Issue> {
        let path = format!("{}/issues/{}", self.repo_path(), id);
        let issue: GitHubIssue = self.client.get(&path).await?;
        convert::to_issue(&issue)
    }

    async fn get_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut params = vec![("state", issue_state_param(filter.state))];
        if let Some(creator) = &filter.creator {
            params.push(("creator", creator.as_str()));
        }
        if let Some(assignee) = &filter.assignee {
            params.push(("assignee", assignee.as_str()));
        }
        let issues: Vec<GitHubIssue> = self
            .client
            .get_all(&self.list_path("issues", &params))
            .await?;
        // The issues endpoint also returns pull requests.
        issues
            .iter()
            .filter(|i| !i.is_pull_request())
            .map(convert::to_issue)
            .collect()
    }

    fn issue_url(&self, id: u64) -> String {
        format!(
            "{}/{}/{}/issues/{}",
            self.repo_domain_url, self.repository.owner, self.repository.name, id
        )
    }

    async fn update_issue(&self, id: u64, update: &IssueUpdate) -> Result<Issue> {
        if let Some(assignee) = &update.assignee {
            self.ensure_user_exists(assignee).await?;
        }
        let path = format!("{}/issues/{}", self.repo_path(), id);
        let payload = convert::issue_update_payload(update);
        let issue: GitHubIssue = self.client.patch(&path, &payload).await?;
        convert::to_issue(&issue)
    }

    async fn close_issue(&self, id: u64) -> Result<Issue> {
        let update = IssueUpdate {
            state: Some(IssueState::Closed),
            ..IssueUpdate::default()
        };
        self.update_issue(id, &update).await
    }

    async fn create_comment(&self, id: u64, body: &str) -> Result<Comment> {
        let path = format!("{}/issues/{}/comments", self.repo_path(), id);
        let comment: GitHubComment = self.client.post(&path, &json!({ "body": body })).await?;
        convert::to_comment(&comment, &self.issue_url(id))
    }

    async fn get_comments(&self, id: u64) -> Result<Vec<Comment>> {
        let path = self.list_path(&format!("issues/{}/comments", id), &[]);
        let comments: Vec<GitHubComment> = self.client.get_all(&path).await?;
        let issue_url = self.issue_url(id);
        comments
            .iter()
            .map(|c| convert::to_comment(c, &issue_url))
            .collect()
    }

    async fn get_labels(&self) -> Result<Vec<Label>> {
        let labels: Vec<GitHubLabel> = self.client.get_all(&self.list_path("labels", &[])).await?;
        labels.iter().map(convert::to_label).collect()
    }

    async fn get_milestones(&self, filter: &MilestoneFilter) -> Result<Vec<Milestone>> {
        let params = [("state", issue_state_param(filter.state))];
        let milestones: Vec<GitHubMilestone> = self
            .client
            .get_all(&self.list_path("milestones", &params))
            .await?;
        milestones.iter().map(convert::to_milestone).collect()
    }

    async fn open_pull_request(
        &self,
        base: &str,
        head: &str,
        subject: &str,
        body: &str,
        options: &PullRequestOptions,
    ) -> Result<PullRequest> {
        let path = format!("{}/pulls", self.repo_path());
        let payload = convert::new_pull_request_payload(base, head, subject, body, options);
        let pr: GitHubPullRequest = self.client.post(&path, &payload).await?;
        info!("Opened pull request #{} on {}", pr.number, self.repository);
        convert::to_pull_request(&pr)
    }

    async fn get_pull_request(&self, id: u64) -> Result<PullRequest> {
        let path = format!("{}/pulls/{}", self.repo_path(), id);
        let pr: GitHubPullRequest = self.client.get(&path).await?;
        convert::to_pull_request(&pr)
    }

    async fn get_pull_requests(&self, state: Option<PullRequestState>) -> Result<Vec<PullRequest>> {
        // GitHub folds merged into closed; narrow down on the canonical state.
        let server_state = match state {
            Some(PullRequestState::Open) => "open",
            Some(PullRequestState::Closed | PullRequestState::Merged) => "closed",
            None => "all",
        };
        let pulls: Vec<GitHubPullRequest> = self
            .client
            .get_all(&self.list_path("pulls", &[("state", server_state)]))
            .await?;
        let mut result = Vec::with_capacity(pulls.len());
        for pr in &pulls {
            let pr = convert::to_pull_request(pr)?;
            if state.is_none_or(|wanted| pr.state == wanted) {
                result.push(pr);
            }
        }
        Ok(result)
    }

    async fn get_pull_request_commits(&self, id: u64) -> Result<Vec<CommitRef>> {
        let path = self.list_path(&format!("pulls/{}/commits", id), &[]);
        let commits: Vec<GitHubCommit> = self.client.get_all(&path).await?;
        commits.iter().map(convert::to_commit).collect()
    }

    async fn merge_pull_request(&self, id: u64, message: &str) -> Result<PullRequest> {
        let path = format!("{}/pulls/{}/merge", self.repo_path(), id);
        let result: GitHubMergeResult = match self
            .client
            .put(&path, &json!({ "commit_message": message }))
            .await
        {
            Ok(result) => result,
            Err(GitHubError::Api {
                status: 405 | 409,
                message,
            }) => return Err(AdapterError::NotMergeable { id, message }),
            Err(e) => return Err(e.into()),
        };
        if !result.merged {
            return Err(AdapterError::NotMergeable {
                id,
                message: result.message,
            });
        }
        info!(
            "Merged pull request #{} ({})",
            id,
            result.sha.as_deref().unwrap_or("unknown sha")
        );

        let mut pr = self.get_pull_request(id).await?;
        pr.merge_message = result.message;
        Ok(pr)
    }

    async fn close_pull_request(&self, id: u64) -> Result<PullRequest> {
        let path = format!("{}/pulls/{}", self.repo_path(), id);
        let pr: GitHubPullRequest = self
            .client
            .patch(&path, &json!({ "state": "closed" }))
            .await?;
        convert::to_pull_request(&pr)
    }

    async fn create_release(&self, name: &str, options: &ReleaseOptions) -> Result<Release> {
        let path = format!("{}/releases", self.repo_path());
        let payload = convert::new_release_payload(name, options);
        let release: GitHubRelease = self.client.post(&path, &payload).await?;
        convert::to_release(&release)
    }

    async fn get_releases(&self) -> Result<Vec<Release>> {
        let releases: Vec<GitHubRelease> =
            self.client.get_all(&self.list_path("releases", &[])).await?;
        releases.iter().map(convert::to_release).collect()
    }

    async fn remove_release(&self, id: u64) -> Result<()> {
        let path = format!("{}/releases/{}", self.repo_path(), id);
        self.client.delete(&path).await?;
        Ok(())
    }

    async fn create_release_asset(
        &self,
        release_id: u64,
        name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<ReleaseAsset> {
        let path = format!("{}/releases/{}", self.repo_path(), release_id);
        let release: GitHubRelease = self.client.get(&path).await?;

        // Drop the `{?name,label}` template suffix.
        let upload_base = release
            .upload_url
            .split('{')
            .next()
            .unwrap_or(&release.upload_url);
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", name)
            .finish();
        let upload_url = format!("{}?{}", upload_base, query);

        let asset: GitHubReleaseAsset = self
            .client
            .upload(&upload_url, content_type, content)
            .await?;
        convert::to_release_asset(&asset)
    }
}
