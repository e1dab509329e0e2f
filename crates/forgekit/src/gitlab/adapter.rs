//! [`ForgeAdapter`] implementation for GitLab (gitlab.com and self-hosted).
//!
//! GitLab addresses projects by numeric id, so most operations first resolve
//! the configured `owner/name` through the accessible-projects listing. The
//! resolved project is kept for the lifetime of the adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use super::client::{GitLabClient, PAGE_SIZE};
use super::convert;
use super::error::GitLabError;
use super::types::{
    GitLabCommit, GitLabIssue, GitLabMergeRequest, GitLabMilestone, GitLabNote, GitLabProject,
    GitLabUser,
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
use crate::resolver::{ProjectResolver, find_project};

/// GitLab only accepts personal access tokens.
pub const ACCEPTED_SCHEMES: &[AuthScheme] = &[AuthScheme::HttpToken];

/// Adapter over the GitLab REST API (v4).
pub struct GitLabAdapter {
    client: GitLabClient,
    name: String,
    repo_domain_url: String,
    repository: RepositoryRef,
    credentials: Credentials,
    state: AuthState,
    resolver: ProjectResolver<GitLabProject>,
}

impl GitLabAdapter {
    pub fn new(
        config: &AdapterConfig,
        repository: RepositoryRef,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let name = config.adapter_name()?;
        Ok(Self {
            client: GitLabClient::new_with_transport(&config.base_url(), transport),
            name,
            repo_domain_url: config.repo_domain_url(),
            resolver: ProjectResolver::new(repository.clone()),
            repository,
            credentials: config.credentials(),
            state: AuthState::Unauthenticated,
        })
    }

    pub fn auth_state(&self) -> AuthState {
        self.state
    }

    async fn project(&self) -> Result<&GitLabProject> {
        self.resolver.resolve(&self.client).await
    }

    fn unsupported(operation: &'static str) -> AdapterError {
        AdapterError::not_supported(ProviderKind::GitLab, operation)
    }

    /// Look up a user by exact login.
    async fn find_user(&self, login: &str) -> Result<GitLabUser> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", login)
            .finish();
        let users: Vec<GitLabUser> = self.client.get(&format!("/users?{}", query)).await?;
        users
            .into_iter()
            .find(|u| u.username == login)
            .ok_or_else(|| AdapterError::not_found(login))
    }

    async fn assignee_id(&self, assignee: Option<&str>) -> Result<Option<u64>> {
        match assignee {
            Some(login) => Ok(Some(self.find_user(login).await?.id)),
            None => Ok(None),
        }
    }
}

fn milestone_state_param(state: Option<IssueState>) -> Option<&'static str> {
    state.map(|s| match s {
        IssueState::Open => "active",
        IssueState::Closed => "closed",
    })
}

/// `locked` requests count as open but are not listed under `opened`, so open
/// is narrowed client-side from the full listing.
fn merge_request_state_param(state: Option<PullRequestState>) -> &'static str {
    match state {
        Some(PullRequestState::Open) | None => "all",
        Some(PullRequestState::Closed) => "closed",
        Some(PullRequestState::Merged) => "merged",
    }
}

fn matches_filter(issue: &Issue, filter: &IssueFilter) -> bool {
    filter.state.is_none_or(|s| issue.state == s)
        && filter
            .creator
            .as_ref()
            .is_none_or(|c| &issue.user.login == c)
        && filter
            .assignee
            .as_ref()
            .is_none_or(|a| issue.assignee.as_ref().is_some_and(|u| &u.login == a))
}

#[async_trait]
impl ForgeAdapter for GitLabAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&mut self) -> Result<()> {
        ensure_supported(ProviderKind::GitLab, ACCEPTED_SCHEMES, self.credentials.scheme)?;
        self.client.authenticate(&self.credentials.secret);
        self.state = AuthState::Authenticated(self.credentials.scheme);
        info!("Authenticated {} with {}", self.name, self.credentials.scheme);
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool> {
        let path = "/projects?owned=true&per_page=1";
        Ok(self.client.probe(path).await?)
    }

    fn token_generation_url(&self) -> Option<String> {
        Some(format!("{}/profile/account", self.repo_domain_url))
    }

    async fn current_project(&self) -> Result<Project> {
        convert::to_project(self.project().await?)
    }

    async fn create_fork(&self, _organization: Option<&str>) -> Result<Project> {
        Err(Self::unsupported("create_fork"))
    }

    async fn open_issue(
        &self,
        subject: &str,
        body: &str,
        options: &IssueOptions,
    ) -> Result<Issue> {
        let assignee_id = self.assignee_id(options.assignee.as_deref()).await?;
        let project = self.project().await?;
        let path = format!("/projects/{}/issues", project.id);
        let payload = convert::new_issue_payload(subject, body, options, assignee_id);
        let issue: GitLabIssue = self.client.post(&path, &payload).await?;
        convert::to_issue(&issue)
    }

    async fn get_issue(&self, id: u64) -> Result<Issue> {
        let project = self.project().await?;
        let path = format!("/projects/{}/issues/{}", project.id, id);
        let issue: GitLabIssue = self.client.get(&path).await?;
        convert::to_issue(&issue)
    }

    async fn get_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let project = self.project().await?;
        let path = format!("/projects/{}/issues?per_page={}", project.id, PAGE_SIZE);
        let issues: Vec<GitLabIssue> = self.client.get_all(&path).await?;
        debug!("Filtering {} issues", issues.len());

        let mut result = Vec::new();
        for issue in &issues {
            let issue = convert::to_issue(issue)?;
            if matches_filter(&issue, filter) {
                result.push(issue);
            }
        }
        Ok(result)
    }

    fn issue_url(&self, id: u64) -> String {
        format!(
            "{}/{}/{}/issues/{}",
            self.repo_domain_url, self.repository.owner, self.repository.name, id
        )
    }

    async fn update_issue(&self, id: u64, update: &IssueUpdate) -> Result<Issue> {
        let assignee_id = self.assignee_id(update.assignee.as_deref()).await?;
        let project = self.project().await?;
        let path = format!("/projects/{}/issues/{}", project.id, id);
        let payload = convert::issue_update_payload(update, assignee_id);
        let issue: GitLabIssue = self.client.put(&path, &payload).await?;
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
        let project = self.project().await?;
        let path = format!("/projects/{}/issues/{}/notes", project.id, id);
        let note: GitLabNote = self.client.post(&path, &json!({ "body": body })).await?;
        convert::to_comment(&note, &self.issue_url(id))
    }

    async fn get_comments(&self, id: u64) -> Result<Vec<Comment>> {
        let project = self.project().await?;
        let path = format!(
            "/projects/{}/issues/{}/notes?sort=asc&per_page={}",
            project.id, id, PAGE_SIZE
        );
        let notes: Vec<GitLabNote> = self.client.get_all(&path).await?;
        let issue_url = self.issue_url(id);
        notes
            .iter()
            .filter(|n| !n.system)
            .map(|n| convert::to_comment(n, &issue_url))
            .collect()
    }

    async fn get_labels(&self) -> Result<Vec<Label>> {
        Err(Self::unsupported("get_labels"))
    }

    async fn get_milestones(&self, filter: &MilestoneFilter) -> Result<Vec<Milestone>> {
        let project = self.project().await?;
        let path = match milestone_state_param(filter.state) {
            Some(state) => format!(
                "/projects/{}/milestones?state={}&per_page={}",
                project.id, state, PAGE_SIZE
            ),
            None => format!("/projects/{}/milestones?per_page={}", project.id, PAGE_SIZE),
        };
        let milestones: Vec<GitLabMilestone> = self.client.get_all(&path).await?;
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
        let target = self.project().await?;
        let (head_owner, head_branch) = match head.split_once(':') {
            Some((owner, branch)) => (owner, branch),
            None => (self.repository.owner.as_str(), head),
        };

        // A head in another namespace lives in a fork of the target.
        let (source_id, target_project_id) = if head_owner != self.repository.owner {
            let fork = RepositoryRef::new(head_owner, self.repository.name.clone());
            let source = find_project(&self.client, &fork).await?;
            debug!("Merge request source is {} ({})", fork, source.id);
            (source.id, Some(target.id))
        } else {
            (target.id, None)
        };

        let path = format!("/projects/{}/merge_requests", source_id);
        let payload = convert::new_merge_request_payload(
            base,
            head_branch,
            subject,
            body,
            options,
            target_project_id,
        );
        let mr: GitLabMergeRequest = self.client.post(&path, &payload).await?;
        info!("Opened merge request !{} on {}", mr.iid, self.repository);
        convert::to_pull_request(&mr, target)
    }

    async fn get_pull_request(&self, id: u64) -> Result<PullRequest> {
        let project = self.project().await?;
        let path = format!("/projects/{}/merge_requests/{}", project.id, id);
        let mr: GitLabMergeRequest = self.client.get(&path).await?;
        convert::to_pull_request(&mr, project)
    }

    async fn get_pull_requests(&self, state: Option<PullRequestState>) -> Result<Vec<PullRequest>> {
        let project = self.project().await?;
        let path = format!(
            "/projects/{}/merge_requests?state={}&per_page={}",
            project.id,
            merge_request_state_param(state),
            PAGE_SIZE
        );
        let requests: Vec<GitLabMergeRequest> = self.client.get_all(&path).await?;
        let mut result = Vec::with_capacity(requests.len());
        for mr in &requests {
            let pr = convert::to_pull_request(mr, project)?;
            if state.is_none_or(|wanted| pr.state == wanted) {
                result.push(pr);
            }
        }
        Ok(result)
    }

    async fn get_pull_request_commits(&self, id: u64) -> Result<Vec<CommitRef>> {
        let project = self.project().await?;
        let path = format!(
            "/projects/{}/merge_requests/{}/commits?per_page={}",
            project.id, id, PAGE_SIZE
        );
        let commits: Vec<GitLabCommit> = self.client.get_all(&path).await?;
        commits.iter().map(convert::to_commit).collect()
    }

    async fn merge_pull_request(&self, id: u64, message: &str) -> Result<PullRequest> {
        let project = self.project().await?;
        let path = format!("/projects/{}/merge_requests/{}/merge", project.id, id);
        let mr: GitLabMergeRequest = match self
            .client
            .put(&path, &json!({ "merge_commit_message": message }))
            .await
        {
            Ok(mr) => mr,
            Err(GitLabError::Api {
                status: 405 | 406 | 409 | 422,
                message,
            }) => return Err(AdapterError::NotMergeable { id, message }),
            Err(e) => return Err(e.into()),
        };
        info!("Merged merge request !{} on {}", id, self.repository);

        let mut pr = convert::to_pull_request(&mr, project)?;
        pr.merge_message = message.to_string();
        Ok(pr)
    }

    async fn close_pull_request(&self, id: u64) -> Result<PullRequest> {
        let project = self.project().await?;
        let path = format!("/projects/{}/merge_requests/{}", project.id, id);
        let mr: GitLabMergeRequest = self
            .client
            .put(&path, &json!({ "state_event": "close" }))
            .await?;
        convert::to_pull_request(&mr, project)
    }

    async fn create_release(&self, _name: &str, _options: &ReleaseOptions) -> Result<Release> {
        Err(Self::unsupported("create_release"))
    }

    async fn get_releases(&self) -> Result<Vec<Release>> {
        Err(Self::unsupported("get_releases"))
    }

    async fn remove_release(&self, _id: u64) -> Result<()> {
        Err(Self::unsupported("remove_release"))
    }

    async fn create_release_asset(
        &self,
        _release_id: u64,
        _name: &str,
        _content_type: &str,
        _content: Vec<u8>,
    ) -> Result<ReleaseAsset> {
        Err(Self::unsupported("create_release_asset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::http::{HttpMethod, MockTransport};
    use serde_json::Value;

    const API: &str = "https://gitlab.com/api/v4";
    const LISTING: &str = "https://gitlab.com/api/v4/projects?membership=true&per_page=100";

    fn config(scheme: AuthScheme) -> AdapterConfig {
        AdapterConfig::new(
            ProviderKind::GitLab,
            AuthConfig {
                scheme,
                username: Some("alice".to_string()),
                secret: "glpat-123".to_string(),
            },
        )
    }

    fn adapter_with(transport: &MockTransport, scheme: AuthScheme) -> GitLabAdapter {
        GitLabAdapter::new(
            &config(scheme),
            RepositoryRef::new("acme", "widgets"),
            Arc::new(transport.clone()),
        )
        .unwrap()
    }

    fn adapter(transport: &MockTransport) -> GitLabAdapter {
        adapter_with(transport, AuthScheme::HttpToken)
    }

    fn project(id: u64, path: &str) -> Value {
        json!({
            "id": id,
            "name": path.rsplit('/').next().unwrap(),
            "path_with_namespace": path,
            "web_url": format!("https://gitlab.com/{path}"),
            "ssh_url_to_repo": format!("git@gitlab.com:{path}.git"),
            "visibility": "private"
        })
    }

    fn push_listing(transport: &MockTransport) {
        transport.push_json(
            HttpMethod::Get,
            LISTING,
            200,
            json!([project(7, "acme/gadgets"), project(42, "acme/widgets")]),
        );
    }

    fn user(id: u64, username: &str) -> Value {
        json!({ "id": id, "username": username })
    }

    fn issue(iid: u64, state: &str, author: &str, assignee: Option<&str>) -> Value {
        json!({
            "id": 5000 + iid,
            "iid": iid,
            "title": format!("Issue {iid}"),
            "description": "text",
            "author": user(1, author),
            "assignee": assignee.map(|a| user(2, a)),
            "state": state,
            "labels": ["bug"],
            "web_url": format!("https://gitlab.com/acme/widgets/-/issues/{iid}")
        })
    }

    fn merge_request(iid: u64, state: &str) -> Value {
        json!({
            "id": 9000 + iid,
            "iid": iid,
            "title": format!("MR {iid}"),
            "author": user(3, "alice"),
            "state": state,
            "source_branch": "feature",
            "target_branch": "main",
            "source_project_id": 42,
            "target_project_id": 42,
            "web_url": format!("https://gitlab.com/acme/widgets/-/merge_requests/{iid}")
        })
    }

    #[tokio::test]
    async fn test_password_scheme_is_rejected_without_network() {
        let transport = MockTransport::new();
        let mut adapter = adapter_with(&transport, AuthScheme::HttpPassword);
        let err = adapter.authenticate().await.unwrap_err();
        match err {
            AdapterError::UnsupportedAuthScheme {
                provider,
                configured,
                accepted,
            } => {
                assert_eq!(provider, ProviderKind::GitLab);
                assert_eq!(configured, AuthScheme::HttpPassword);
                assert_eq!(accepted, ACCEPTED_SCHEMES);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(adapter.auth_state(), AuthState::Unauthenticated);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_token_authentication_probes_owned_projects() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects?owned=true&per_page=1"),
            200,
            json!([]),
        );
        let mut adapter = adapter(&transport);
        adapter.authenticate().await.unwrap();
        assert!(adapter.auth_state().is_authenticated());
        assert!(adapter.is_authenticated().await.unwrap());
        assert_eq!(
            transport.requests()[0].header("private-token"),
            Some("glpat-123")
        );
    }

    #[test]
    fn test_urls() {
        let adapter = adapter(&MockTransport::new());
        assert_eq!(
            adapter.token_generation_url().as_deref(),
            Some("https://gitlab.com/profile/account")
        );
        assert_eq!(
            adapter.issue_url(3),
            "https://gitlab.com/acme/widgets/issues/3"
        );
    }

    #[tokio::test]
    async fn test_current_project_is_memoized() {
        let transport = MockTransport::new();
        push_listing(&transport);
        let adapter = adapter(&transport);

        let first = adapter.current_project().await.unwrap();
        let second = adapter.current_project().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, 42);
        assert_eq!(first.fetch_url, "git@gitlab.com:acme/widgets.git");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            LISTING,
            200,
            json!([project(7, "acme/gadgets"), project(8, "Acme/Widgets")]),
        );
        let err = adapter(&transport).current_project().await.unwrap_err();
        match err {
            AdapterError::ProjectNotFound { owner, repository } => {
                assert_eq!(owner, "acme");
                assert_eq!(repository, "widgets");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_issues_filters_client_side() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects/42/issues?per_page=100"),
            200,
            json!([
                issue(1, "opened", "alice", Some("bob")),
                issue(2, "closed", "alice", Some("bob")),
                issue(3, "opened", "carol", Some("bob")),
                issue(4, "opened", "alice", None)
            ]),
        );

        let issues = adapter(&transport)
            .get_issues(&IssueFilter {
                state: Some(IssueState::Open),
                creator: Some("alice".to_string()),
                assignee: Some("bob".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
        assert_eq!(issues[0].reference, "1 (5001)");
        assert_eq!(issues[0].labels[0].name, "bug");
    }

    #[tokio::test]
    async fn test_update_issue_unknown_assignee_is_not_found() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/users?username=nobody"),
            200,
            json!([]),
        );
        let err = adapter(&transport)
            .update_issue(
                3,
                &IssueUpdate {
                    assignee: Some("nobody".to_string()),
                    ..IssueUpdate::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AdapterError::NotFound { resource } => assert_eq!(resource, "nobody"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(transport.requests_with(HttpMethod::Put).is_empty());
    }

    fn assign(login: &str) -> IssueUpdate {
        IssueUpdate {
            assignee: Some(login.to_string()),
            ..IssueUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_update_issue_resolves_exact_username() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/users?username=bob"),
            200,
            json!([user(11, "bob")]),
        );
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Put,
            format!("{API}/projects/42/issues/3"),
            200,
            issue(3, "opened", "alice", Some("bob")),
        );

        let issue = adapter(&transport)
            .update_issue(3, &assign("bob"))
            .await
            .unwrap();
        assert_eq!(issue.assignee.unwrap().login, "bob");
        let body: Value =
            serde_json::from_slice(&transport.requests_with(HttpMethod::Put)[0].body).unwrap();
        assert_eq!(body, json!({ "assignee_ids": [11] }));
    }

    #[tokio::test]
    async fn test_update_issue_loose_match_is_not_found() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/users?username=bob"),
            200,
            json!([user(10, "bobby")]),
        );
        let err = adapter(&transport)
            .update_issue(3, &assign("bob"))
            .await
            .unwrap_err();
        match err {
            AdapterError::NotFound { resource } => assert_eq!(resource, "bob"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(transport.requests_with(HttpMethod::Put).is_empty());
    }

    #[tokio::test]
    async fn test_close_issue_sends_state_event() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Put,
            format!("{API}/projects/42/issues/3"),
            200,
            issue(3, "closed", "alice", None),
        );
        let issue = adapter(&transport).close_issue(3).await.unwrap();
        assert_eq!(issue.state, IssueState::Closed);
        let body: Value =
            serde_json::from_slice(&transport.requests_with(HttpMethod::Put)[0].body).unwrap();
        assert_eq!(body, json!({ "state_event": "close" }));
    }

    #[tokio::test]
    async fn test_get_comments_skips_system_notes() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects/42/issues/3/notes?sort=asc&per_page=100"),
            200,
            json!([
                { "id": 1, "body": "added ~bug label", "author": user(1, "alice"), "system": true },
                { "id": 2, "body": "Confirmed", "author": user(2, "bob"), "system": false }
            ]),
        );
        let comments = adapter(&transport).get_comments(3).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user.login, "bob");
        assert_eq!(
            comments[0].url,
            "https://gitlab.com/acme/widgets/issues/3#note_2"
        );
    }

    #[tokio::test]
    async fn test_get_milestones_maps_open_to_active() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects/42/milestones?state=active&per_page=100"),
            200,
            json!([{ "id": 12, "iid": 1, "title": "v1", "state": "active" }]),
        );
        let milestones = adapter(&transport)
            .get_milestones(&MilestoneFilter {
                state: Some(IssueState::Open),
            })
            .await
            .unwrap();
        assert_eq!(milestones[0].title, "v1");
        assert_eq!(milestones[0].state, IssueState::Open);
    }

    #[tokio::test]
    async fn test_get_pull_requests_closed_excludes_merged() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects/42/merge_requests?state=closed&per_page=100"),
            200,
            json!([merge_request(1, "closed"), merge_request(2, "merged")]),
        );
        let pulls = adapter(&transport)
            .get_pull_requests(Some(PullRequestState::Closed))
            .await
            .unwrap();
        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].number, 1);
        assert!(!pulls[0].merged);
    }

    #[tokio::test]
    async fn test_get_pull_requests_open_includes_locked() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects/42/merge_requests?state=all&per_page=100"),
            200,
            json!([
                merge_request(1, "opened"),
                merge_request(2, "locked"),
                merge_request(3, "merged"),
                merge_request(4, "closed")
            ]),
        );
        let pulls = adapter(&transport)
            .get_pull_requests(Some(PullRequestState::Open))
            .await
            .unwrap();
        let numbers: Vec<u64> = pulls.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_open_pull_request_from_fork() {
        let transport = MockTransport::new();
        // Target resolution, then the un-memoized lookup of the fork.
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Get,
            LISTING,
            200,
            json!([project(42, "acme/widgets"), project(99, "alice/widgets")]),
        );
        let mut created = merge_request(5, "opened");
        created["source_project_id"] = json!(99);
        transport.push_json(
            HttpMethod::Post,
            format!("{API}/projects/99/merge_requests"),
            201,
            created,
        );

        let pr = adapter(&transport)
            .open_pull_request(
                "main",
                "alice:feature",
                "Add feature",
                "Body",
                &PullRequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(pr.number, 5);
        assert_eq!(pr.head.user, "alice");
        assert_eq!(pr.head.repo, None);
        assert_eq!(pr.base.repo.as_deref(), Some("widgets"));

        let post = &transport.requests_with(HttpMethod::Post)[0];
        let body: Value = serde_json::from_slice(&post.body).unwrap();
        assert_eq!(body["source_branch"], "feature");
        assert_eq!(body["target_project_id"], 42);
    }

    #[tokio::test]
    async fn test_merge_rejected_is_not_mergeable() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Put,
            format!("{API}/projects/42/merge_requests/4/merge"),
            406,
            json!({ "message": "Branch cannot be merged" }),
        );
        let err = adapter(&transport)
            .merge_pull_request(4, "Merge it")
            .await
            .unwrap_err();
        match err {
            AdapterError::NotMergeable { id, message } => {
                assert_eq!(id, 4);
                assert_eq!(message, "Branch cannot be merged");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_merge_success() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Put,
            format!("{API}/projects/42/merge_requests/4/merge"),
            200,
            merge_request(4, "merged"),
        );
        let pr = adapter(&transport)
            .merge_pull_request(4, "Merge it")
            .await
            .unwrap();
        assert_eq!(pr.state, PullRequestState::Merged);
        assert_eq!(pr.merge_message, "Merge it");
        let body: Value =
            serde_json::from_slice(&transport.requests_with(HttpMethod::Put)[0].body).unwrap();
        assert_eq!(body, json!({ "merge_commit_message": "Merge it" }));
    }

    #[tokio::test]
    async fn test_close_pull_request() {
        let transport = MockTransport::new();
        push_listing(&transport);
        transport.push_json(
            HttpMethod::Put,
            format!("{API}/projects/42/merge_requests/4"),
            200,
            merge_request(4, "closed"),
        );
        let pr = adapter(&transport).close_pull_request(4).await.unwrap();
        assert_eq!(pr.state, PullRequestState::Closed);
    }

    #[tokio::test]
    async fn test_release_operations_are_not_supported() {
        let transport = MockTransport::new();
        let adapter = adapter(&transport);
        let err = adapter
            .create_release("v1.0.0", &ReleaseOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_supported());
        assert_eq!(err.to_string(), "create_release is not supported by gitlab");
        assert!(adapter.remove_release(1).await.unwrap_err().is_not_supported());
        assert!(
            adapter
                .create_release_asset(1, "a.tar.gz", "application/gzip", Vec::new())
                .await
                .unwrap_err()
                .is_not_supported()
        );
        assert!(transport.requests().is_empty());
    }
}
