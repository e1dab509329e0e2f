//! GitLab API data types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GitLab user information.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    /// User ID.
    pub id: u64,
    /// Username.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub web_url: Option<String>,
}

/// GitLab namespace (group or user).
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNamespace {
    /// Namespace path (slug).
    pub path: String,
    /// Full path (e.g., "group/subgroup").
    pub full_path: String,
    /// Kind: "group" or "user".
    #[serde(default)]
    pub kind: Option<String>,
}

/// Minimal fork source information.
#[derive(Debug, Clone, Deserialize)]
pub struct ForkedFrom {
    /// Source project ID.
    pub id: u64,
    /// Full path of the source project.
    pub path_with_namespace: String,
}

/// GitLab project - fields we need from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    /// Project ID.
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Project path (slug).
    #[serde(default)]
    pub path: Option<String>,
    /// Full path including namespace (e.g., "group/subgroup/project").
    pub path_with_namespace: String,
    /// Namespace information.
    #[serde(default)]
    pub namespace: Option<GitLabNamespace>,
    /// Owner; only set for projects in a user namespace.
    #[serde(default)]
    pub owner: Option<GitLabUser>,
    /// Web URL to the project.
    pub web_url: String,
    /// SSH clone URL.
    #[serde(default)]
    pub ssh_url_to_repo: Option<String>,
    /// HTTP clone URL.
    #[serde(default)]
    pub http_url_to_repo: Option<String>,
    /// Visibility level: "public", "private", or "internal".
    #[serde(default)]
    pub visibility: Option<String>,
    /// Older instances report a `public` flag instead of `visibility`.
    #[serde(default)]
    pub public: Option<bool>,
    /// If this is a fork, info about the source project.
    #[serde(default)]
    pub forked_from_project: Option<Box<ForkedFrom>>,
}

impl GitLabProject {
    /// Namespace part of `path_with_namespace`.
    pub fn namespace_path(&self) -> &str {
        self.path_with_namespace
            .rsplit_once('/')
            .map(|(ns, _)| ns)
            .unwrap_or(&self.path_with_namespace)
    }
}

/// GitLab issue.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabIssue {
    /// Instance-wide ID.
    pub id: u64,
    /// Project-local ID used in URLs and API paths.
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: GitLabUser,
    #[serde(default)]
    pub assignee: Option<GitLabUser>,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    /// "opened" or "closed".
    pub state: String,
    /// Label names.
    #[serde(default)]
    pub labels: Vec<String>,
    pub web_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// GitLab merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMergeRequest {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: GitLabUser,
    /// "opened", "reopened", "closed", "merged" or "locked".
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub source_project_id: Option<u64>,
    #[serde(default)]
    pub target_project_id: Option<u64>,
    pub web_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Issue or merge request note (comment).
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNote {
    pub id: u64,
    pub body: String,
    pub author: GitLabUser,
    /// System notes record events such as label changes.
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMilestone {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// "active" or "closed".
    pub state: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommit {
    /// Full SHA.
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub author_name: Option<String>,
}
