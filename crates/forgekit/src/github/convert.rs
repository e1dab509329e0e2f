//! Normalize GitHub records into canonical entities, and recast canonical
//! requests into GitHub payloads.

use serde_json::{Value, json};

use super::types::{
    GitHubBranch, GitHubComment, GitHubCommit, GitHubIssue, GitHubLabel, GitHubMilestone,
    GitHubPullRequest, GitHubRelease, GitHubReleaseAsset, GitHubRepository, GitHubUser,
};
use crate::model::{
    Canonical, Comment, CommitRef, Issue, IssueOptions, IssueState, IssueUpdate, Label, Milestone,
    Project, PullRequest, PullRequestOptions, PullRequestState, Release, ReleaseAsset,
    ReleaseOptions, User, Visibility, reference,
};
use crate::platform::Result;

fn user_record(user: &GitHubUser) -> Value {
    json!({ "login": user.login, "html_url": user.html_url })
}

fn label_record(label: &GitHubLabel) -> Value {
    json!({ "name": label.name, "color": label.color })
}

fn branch_record(branch: &GitHubBranch) -> Value {
    let owner = branch
        .repo
        .as_ref()
        .and_then(|r| r.owner.as_ref())
        .or(branch.user.as_ref())
        .map(|u| u.login.clone());
    json!({
        "ref": branch.ref_name,
        "user": owner,
        "repo": branch.repo.as_ref().map(|r| r.name.clone()),
    })
}

fn issue_state(state: &str) -> IssueState {
    match state {
        "closed" => IssueState::Closed,
        _ => IssueState::Open,
    }
}

fn pull_request_state(pr: &GitHubPullRequest) -> PullRequestState {
    if pr.is_merged() {
        PullRequestState::Merged
    } else if pr.state == "closed" {
        PullRequestState::Closed
    } else {
        PullRequestState::Open
    }
}

pub fn to_user(user: &GitHubUser) -> Result<User> {
    User::from_record(user_record(user))
}

pub fn to_label(label: &GitHubLabel) -> Result<Label> {
    Label::from_record(label_record(label))
}

pub fn to_issue(issue: &GitHubIssue) -> Result<Issue> {
    Issue::from_record(json!({
        "id": issue.id,
        "number": issue.number,
        "reference": reference(issue.id, Some(issue.number)),
        "title": issue.title,
        "body": issue.body,
        "user": user_record(&issue.user),
        "assignee": issue.assignee.as_ref().map(user_record),
        "state": issue_state(&issue.state),
        "labels": issue.labels.iter().map(label_record).collect::<Vec<_>>(),
        "url": issue.html_url,
        "created_at": issue.created_at,
        "updated_at": issue.updated_at,
    }))
}

pub fn to_pull_request(pr: &GitHubPullRequest) -> Result<PullRequest> {
    PullRequest::from_record(json!({
        "id": pr.id,
        "number": pr.number,
        "reference": reference(pr.id, Some(pr.number)),
        "title": pr.title,
        "body": pr.body,
        "user": user_record(&pr.user),
        "state": pull_request_state(pr),
        "head": branch_record(&pr.head),
        "base": branch_record(&pr.base),
        "merged": pr.is_merged(),
        "url": pr.html_url,
        "created_at": pr.created_at,
        "updated_at": pr.updated_at,
    }))
}

fn visibility(repo: &GitHubRepository) -> Visibility {
    match repo.visibility.as_deref() {
        Some("public") => Visibility::Public,
        Some("internal") => Visibility::Internal,
        Some(_) => Visibility::Private,
        None if repo.private => Visibility::Private,
        None => Visibility::Public,
    }
}

pub fn to_project(repo: &GitHubRepository) -> Result<Project> {
    let fork_origin = repo.parent.as_ref().map(|parent| {
        json!({
            "owner": parent.owner.as_ref().map(|o| o.login.clone()),
            "repo": parent.name,
        })
    });
    Project::from_record(json!({
        "id": repo.id,
        "name": repo.name,
        "owner": repo.owner.as_ref().map(|o| o.login.clone()),
        "html_url": repo.html_url,
        "fetch_url": repo.clone_url,
        "push_url": repo.ssh_url,
        "visibility": visibility(repo),
        "is_fork": repo.fork,
        "fork_origin": fork_origin,
    }))
}

/// `issue_url` is the web URL of the parent issue or pull request.
pub fn to_comment(comment: &GitHubComment, issue_url: &str) -> Result<Comment> {
    Comment::from_record(json!({
        "id": comment.id,
        "body": comment.body,
        "user": user_record(&comment.user),
        "url": format!("{}#issuecomment-{}", issue_url, comment.id),
        "created_at": comment.created_at,
    }))
}

pub fn to_milestone(milestone: &GitHubMilestone) -> Result<Milestone> {
    Milestone::from_record(json!({
        "id": milestone.id,
        "number": milestone.number,
        "title": milestone.title,
        "description": milestone.description,
        "state": issue_state(&milestone.state),
        "due_on": milestone.due_on,
    }))
}

pub fn to_commit(commit: &GitHubCommit) -> Result<CommitRef> {
    let author = commit
        .author
        .as_ref()
        .map(|a| a.login.clone())
        .or_else(|| commit.commit.author.as_ref().map(|a| a.name.clone()));
    CommitRef::from_record(json!({
        "sha": commit.sha,
        "message": commit.commit.message,
        "author": author,
    }))
}

pub fn to_release(release: &GitHubRelease) -> Result<Release> {
    Release::from_record(json!({
        "id": release.id,
        "tag_name": release.tag_name,
        "name": release.name,
        "body": release.body,
        "draft": release.draft,
        "prerelease": release.prerelease,
        "url": release.html_url,
        "created_at": release.created_at,
    }))
}

pub fn to_release_asset(asset: &GitHubReleaseAsset) -> Result<ReleaseAsset> {
    ReleaseAsset::from_record(json!({
        "id": asset.id,
        "name": asset.name,
        "content_type": asset.content_type,
        "size": asset.size,
        "download_url": asset.browser_download_url,
    }))
}

/// Payload for `POST /repos/{owner}/{repo}/issues`.
pub fn new_issue_payload(subject: &str, body: &str, options: &IssueOptions) -> Value {
    let mut payload = json!({ "title": subject, "body": body });
    if !options.labels.is_empty() {
        payload["labels"] = json!(options.labels);
    }
    if let Some(assignee) = &options.assignee {
        payload["assignees"] = json!([assignee]);
    }
    if let Some(milestone) = options.milestone {
        payload["milestone"] = json!(milestone);
    }
    payload
}

/// Payload for `PATCH /repos/{owner}/{repo}/issues/{number}`.
pub fn issue_update_payload(update: &IssueUpdate) -> Value {
    let mut payload = json!({});
    if let Some(title) = &update.title {
        payload["title"] = json!(title);
    }
    if let Some(body) = &update.body {
        payload["body"] = json!(body);
    }
    if let Some(state) = update.state {
        payload["state"] = json!(state);
    }
    if let Some(assignee) = &update.assignee {
        payload["assignees"] = json!([assignee]);
    }
    if let Some(labels) = &update.labels {
        payload["labels"] = json!(labels);
    }
    payload
}

/// Payload for `POST /repos/{owner}/{repo}/pulls`.
pub fn new_pull_request_payload(
    base: &str,
    head: &str,
    subject: &str,
    body: &str,
    options: &PullRequestOptions,
) -> Value {
    json!({
        "base": base,
        "head": head,
        "title": subject,
        "body": body,
        "draft": options.draft,
    })
}

/// Payload for `POST /repos/{owner}/{repo}/releases`.
pub fn new_release_payload(tag_name: &str, options: &ReleaseOptions) -> Value {
    let mut payload = json!({
        "tag_name": tag_name,
        "name": options.name.as_deref().unwrap_or(tag_name),
        "draft": options.draft,
        "prerelease": options.prerelease,
    });
    if let Some(body) = &options.body {
        payload["body"] = json!(body);
    }
    if let Some(target) = &options.target_commitish {
        payload["target_commitish"] = json!(target);
    }
    payload
}
