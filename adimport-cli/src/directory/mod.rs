//! Directory service boundary
//!
//! The planner only ever reads directory state, and it does so through
//! the [`DirectoryService`] trait. Applying the resulting plan is the
//! job of an external applier, not this tool.

pub mod snapshot;

pub use snapshot::{DirectorySnapshot, SnapshotContainer, SnapshotDirectory, SnapshotGroup};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::import::path::DirectoryPath;

/// Reference to a group object in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub name: String,
    pub dn: String,
}

impl GroupRef {
    pub fn new(name: impl Into<String>, dn: impl Into<String>) -> Self {
        GroupRef {
            name: name.into(),
            dn: dn.into(),
        }
    }
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dn)
    }
}

/// Read-only queries the reconciliation planner needs.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Does a container exist at this path?
    async fn container_exists(&self, path: &DirectoryPath) -> Result<bool>;

    /// True when the container holds no user objects.
    async fn container_empty_of_users(&self, path: &DirectoryPath) -> Result<bool>;

    /// True when the container holds nothing at all.
    async fn container_completely_empty(&self, path: &DirectoryPath) -> Result<bool>;

    /// Groups directly inside the container.
    async fn groups_in(&self, path: &DirectoryPath) -> Result<Vec<GroupRef>>;

    /// True when the group has no members.
    async fn group_empty(&self, group: &GroupRef) -> Result<bool>;
}
