//! Model conversion from GitLab API types to canonical entities.
//!
//! GitLab addresses issues and merge requests by their project-local `iid`;
//! it becomes the canonical `number` and the instance-wide id stays `id`.

use serde_json::{Value, json};

use super::types::{
    GitLabCommit, GitLabIssue, GitLabMergeRequest, GitLabMilestone, GitLabNote, GitLabProject,
    GitLabUser,
};
use crate::model::{
    Canonical, Comment, CommitRef, Issue, IssueOptions, IssueState, IssueUpdate, Milestone,
    Project, PullRequest, PullRequestOptions, PullRequestState, Visibility, reference,
};
use crate::platform::Result;

fn user_record(user: &GitLabUser) -> Value {
    json!({ "login": user.username, "html_url": user.web_url })
}

fn issue_state(state: &str) -> IssueState {
    match state {
        "closed" => IssueState::Closed,
        _ => IssueState::Open,
    }
}

/// Map the GitLab merge request vocabulary onto the canonical states.
pub fn merge_request_state(state: &str) -> PullRequestState {
    match state {
        "merged" => PullRequestState::Merged,
        "closed" => PullRequestState::Closed,
        // opened, reopened, locked
        _ => PullRequestState::Open,
    }
}

/// Determine visibility from a GitLab project.
fn gitlab_visibility(project: &GitLabProject) -> Visibility {
    match (project.visibility.as_deref(), project.public) {
        (Some("public"), _) => Visibility::Public,
        (Some("internal"), _) => Visibility::Internal,
        (Some(_), _) => Visibility::Private,
        (None, Some(true)) => Visibility::Public,
        (None, _) => Visibility::Private,
    }
}

/// Owner login: the owning user when present, else the namespace path.
fn project_owner(project: &GitLabProject) -> String {
    project
        .owner
        .as_ref()
        .map(|o| o.username.clone())
        .unwrap_or_else(|| project.namespace_path().to_string())
}

pub fn to_issue(issue: &GitLabIssue) -> Result<Issue> {
    let assignee = issue.assignee.as_ref().or(issue.assignees.first());
    let labels: Vec<Value> = issue
        .labels
        .iter()
        .map(|name| json!({ "name": name, "color": null }))
        .collect();
    Issue::from_record(json!({
        "id": issue.id,
        "number": issue.iid,
        "reference": reference(issue.id, Some(issue.iid)),
        "title": issue.title,
        "body": issue.description,
        "user": user_record(&issue.author),
        "assignee": assignee.map(user_record),
        "state": issue_state(&issue.state),
        "labels": labels,
        "url": issue.web_url,
        "created_at": issue.created_at,
        "updated_at": issue.updated_at,
    }))
}

/// `project` is the target project of the merge request.
pub fn to_pull_request(mr: &GitLabMergeRequest, project: &GitLabProject) -> Result<PullRequest> {
    let state = merge_request_state(&mr.state);
    let target_id = mr.target_project_id.unwrap_or(project.id);
    let same_project = mr.source_project_id.is_none_or(|id| id == target_id);
    PullRequest::from_record(json!({
        "id": mr.id,
        "number": mr.iid,
        "reference": reference(mr.id, Some(mr.iid)),
        "title": mr.title,
        "body": mr.description,
        "user": user_record(&mr.author),
        "state": state,
        "head": {
            "ref": mr.source_branch,
            "user": mr.author.username,
            "repo": same_project.then(|| project.name.clone()),
        },
        "base": {
            "ref": mr.target_branch,
            "user": project_owner(project),
            "repo": project.name,
        },
        "merged": state == PullRequestState::Merged,
        "url": mr.web_url,
        "created_at": mr.created_at,
        "updated_at": mr.updated_at,
    }))
}

pub fn to_project(project: &GitLabProject) -> Result<Project> {
    let fork_origin = project.forked_from_project.as_ref().map(|origin| {
        let (owner, repo) = origin
            .path_with_namespace
            .rsplit_once('/')
            .unwrap_or(("", origin.path_with_namespace.as_str()));
        json!({ "owner": owner, "repo": repo })
    });
    Project::from_record(json!({
        "id": project.id,
        "name": project.name,
        "owner": project_owner(project),
        "html_url": project.web_url,
        "fetch_url": project.ssh_url_to_repo,
        "push_url": project.ssh_url_to_repo,
        "visibility": gitlab_visibility(project),
        "is_fork": project.forked_from_project.is_some(),
        "fork_origin": fork_origin,
    }))
}

/// `issue_url` is the web URL of the parent issue.
pub fn to_comment(note: &GitLabNote, issue_url: &str) -> Result<Comment> {
    Comment::from_record(json!({
        "id": note.id,
        "body": note.body,
        "user": user_record(&note.author),
        "url": format!("{}#note_{}", issue_url, note.id),
        "created_at": note.created_at,
    }))
}

pub fn to_milestone(milestone: &GitLabMilestone) -> Result<Milestone> {
    Milestone::from_record(json!({
        "id": milestone.id,
        "number": milestone.iid,
        "title": milestone.title,
        "description": milestone.description,
        // "active" is GitLab's open
        "state": issue_state(&milestone.state),
        "due_on": milestone.due_date,
    }))
}

pub fn to_commit(commit: &GitLabCommit) -> Result<CommitRef> {
    CommitRef::from_record(json!({
        "sha": commit.id,
        "message": commit.message,
        "author": commit.author_name,
    }))
}

/// Payload for `POST /projects/:id/issues`.
pub fn new_issue_payload(
    subject: &str,
    body: &str,
    options: &IssueOptions,
    assignee_id: Option<u64>,
) -> Value {
    let mut payload = json!({ "title": subject, "description": body });
    if !options.labels.is_empty() {
        payload["labels"] = json!(options.labels.join(","));
    }
    if let Some(id) = assignee_id {
        payload["assignee_ids"] = json!([id]);
    }
    if let Some(milestone) = options.milestone {
        payload["milestone_id"] = json!(milestone);
    }
    payload
}

/// Payload for `PUT /projects/:id/issues/:iid`.
///
/// The assignee must already be resolved to a user id.
pub fn issue_update_payload(update: &IssueUpdate, assignee_id: Option<u64>) -> Value {
    let mut payload = json!({});
    if let Some(title) = &update.title {
        payload["title"] = json!(title);
    }
    if let Some(body) = &update.body {
        payload["description"] = json!(body);
    }
    if let Some(state) = update.state {
        payload["state_event"] = json!(match state {
            IssueState::Open => "reopen",
            IssueState::Closed => "close",
        });
    }
    if let Some(id) = assignee_id {
        payload["assignee_ids"] = json!([id]);
    }
    if let Some(labels) = &update.labels {
        payload["labels"] = json!(labels.join(","));
    }
    payload
}

/// Payload for `POST /projects/:source/merge_requests`.
///
/// `target_project_id` is set when the merge request crosses a fork.
pub fn new_merge_request_payload(
    base: &str,
    head_branch: &str,
    subject: &str,
    body: &str,
    options: &PullRequestOptions,
    target_project_id: Option<u64>,
) -> Value {
    let title = if options.draft {
        format!("Draft: {}", subject)
    } else {
        subject.to_string()
    };
    let mut payload = json!({
        "source_branch": head_branch,
        "target_branch": base,
        "title": title,
        "description": body,
    });
    if let Some(id) = target_project_id {
        payload["target_project_id"] = json!(id);
    }
    payload
}
