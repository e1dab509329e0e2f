//! Canonical domain model shared by all providers.
//!
//! Provider normalizers never build these structs field by field. They emit a
//! partial JSON record with canonical field names, and [`Canonical::from_record`]
//! merges it over the entity's default template before deserializing. Fields a
//! provider never populates therefore always come back with their documented
//! default, and provider-only keys are dropped.

pub mod defaults;
mod entities;
mod requests;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::platform::Result;

pub use entities::{
    BranchRef, Comment, CommitRef, ForkOrigin, Issue, IssueState, Label, Milestone, Project,
    PullRequest, PullRequestState, Release, ReleaseAsset, User, Visibility,
};
pub use requests::{
    IssueFilter, IssueOptions, IssueUpdate, MilestoneFilter, PullRequestOptions, ReleaseOptions,
};

/// An entity with a canonical default template.
pub trait Canonical: Serialize + DeserializeOwned + Default {
    /// The default record: every field present with its default value.
    fn template() -> Value {
        serde_json::to_value(Self::default()).unwrap_or(Value::Null)
    }

    /// Templates for optional nested records, keyed by field name.
    ///
    /// The entity template holds `null` for these slots, so a populated
    /// record there is merged over its own template instead.
    fn optional_templates() -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    /// Build the entity from a partial canonical record.
    fn from_record(record: Value) -> Result<Self> {
        let mut filled = defaults::fill(&Self::template(), record);
        for (key, template) in Self::optional_templates() {
            if let Some(slot) = filled.get_mut(key) {
                *slot = defaults::fill_optional(&template, slot.take());
            }
        }
        Ok(serde_json::from_value(filled)?)
    }

    /// Serialize the entity back into a complete record.
    fn to_record(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Canonical for User {}
impl Canonical for Label {}
impl Canonical for ForkOrigin {}

impl Canonical for Issue {
    fn optional_templates() -> Vec<(&'static str, Value)> {
        vec![("assignee", User::template())]
    }
}

impl Canonical for PullRequest {}

impl Canonical for Project {
    fn optional_templates() -> Vec<(&'static str, Value)> {
        vec![("fork_origin", ForkOrigin::template())]
    }
}

impl Canonical for Comment {}
impl Canonical for Milestone {}
impl Canonical for CommitRef {}
impl Canonical for Release {}
impl Canonical for ReleaseAsset {}

/// Compose the display reference for an entity.
///
/// Both identifiers are shown only when the provider has a display number
/// distinct from its primary id.
pub fn reference(id: u64, number: Option<u64>) -> String {
    match number {
        Some(number) if number != id => format!("{} ({})", number, id),
        Some(number) => number.to_string(),
        None => id.to_string(),
    }
}
