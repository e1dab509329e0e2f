//! GitHub API data types.
//!
//! Only the fields the adapter reads are declared; everything else in the
//! response is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
    #[serde(default)]
    pub assignee: Option<GitHubUser>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Present when the issue is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl GitHubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Head or base of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranch {
    #[serde(rename = "ref")]
    pub ref_name: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    /// `None` when the source repository was deleted.
    #[serde(default)]
    pub repo: Option<GitHubRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
    pub state: String,
    pub head: GitHubBranch,
    pub base: GitHubBranch,
    /// Only returned by the single pull request endpoint.
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GitHubPullRequest {
    /// GitHub reports merged pull requests as `closed`; the merge timestamp
    /// or flag disambiguates.
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some() || self.merged == Some(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub owner: Option<GitHubUser>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
    #[serde(default)]
    pub private: bool,
    /// `public`, `private` or `internal` (Enterprise).
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub fork: bool,
    /// Only returned by the single repository endpoint.
    #[serde(default)]
    pub parent: Option<Box<GitHubRepository>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMilestone {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    #[serde(default)]
    pub due_on: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<GitHubCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitHubCommitDetail,
    /// The linked account; `None` when the author email matches no user.
    #[serde(default)]
    pub author: Option<GitHubUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub html_url: String,
    /// RFC 6570 template, e.g. `.../assets{?name,label}`.
    pub upload_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubReleaseAsset {
    pub id: u64,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub browser_download_url: String,
}

/// Response of `PUT /pulls/{number}/merge`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMergeResult {
    #[serde(default)]
    pub sha: Option<String>,
    pub merged: bool,
    #[serde(default)]
    pub message: String,
}
