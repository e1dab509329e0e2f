//! Canonical entities returned by every adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user reference (author, assignee, commenter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub html_url: Option<String>,
}

/// An issue label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
}

/// Issue state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

/// Pull (merge) request state.
///
/// `Merged` is distinct from `Closed`: a merged request is never reported as
/// closed, and filtering by `Closed` excludes merged requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    Merged,
}

impl std::fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestState::Open => write!(f, "open"),
            PullRequestState::Closed => write!(f, "closed"),
            PullRequestState::Merged => write!(f, "merged"),
        }
    }
}

impl std::str::FromStr for PullRequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PullRequestState::Open),
            "closed" => Ok(PullRequestState::Closed),
            "merged" => Ok(PullRequestState::Merged),
            _ => Err(format!("Unknown pull request state: {}", s)),
        }
    }
}

/// Project visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    /// Visible to any signed-in user of the instance (GitLab only).
    Internal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    /// Provider primary id.
    pub id: u64,
    /// Display number used to address the issue in URLs and API paths.
    pub number: u64,
    /// Human readable identifier, `"{number} ({id})"` when the two differ.
    pub reference: String,
    pub title: String,
    pub body: String,
    pub user: User,
    pub assignee: Option<User>,
    pub state: IssueState,
    pub labels: Vec<Label>,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One side of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Owner of the repository holding the branch.
    pub user: String,
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub reference: String,
    pub title: String,
    pub body: String,
    pub user: User,
    pub state: PullRequestState,
    pub head: BranchRef,
    pub base: BranchRef,
    pub merged: bool,
    /// Set only when the request was merged through the adapter.
    pub merge_message: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Origin of a forked project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkOrigin {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub owner: Option<String>,
    pub html_url: String,
    pub fetch_url: String,
    pub push_url: String,
    pub visibility: Visibility,
    pub is_fork: bool,
    pub fork_origin: Option<ForkOrigin>,
}

impl Project {
    /// `owner/name`, or just `name` for ownerless projects.
    pub fn full_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}/{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub user: User,
    /// Parent issue URL with the comment anchor appended.
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub description: String,
    pub state: IssueState,
    pub due_on: Option<String>,
}

/// A commit belonging to a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRef {
    pub sha: String,
    pub message: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub download_url: String,
}
