//! Caller-side inputs for adapter operations.

use serde::{Deserialize, Serialize};

use super::entities::IssueState;

/// Filter for [`get_issues`](crate::ForgeAdapter::get_issues).
///
/// `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueFilter {
    pub state: Option<IssueState>,
    /// Login of the issue author.
    pub creator: Option<String>,
    /// Login of the assignee.
    pub assignee: Option<String>,
}

impl IssueFilter {
    pub fn state(state: IssueState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueOptions {
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    /// Milestone number (GitHub) or id (GitLab).
    pub milestone: Option<u64>,
}

/// Fields to change on an existing issue. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<IssueState>,
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneFilter {
    pub state: Option<IssueState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestOptions {
    pub draft: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseOptions {
    /// Release title; the tag name is used when absent.
    pub name: Option<String>,
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    /// Branch or commit the tag is created from when it does not exist yet.
    pub target_commitish: Option<String>,
}
