//! Offline directory snapshots
//!
//! A snapshot is a JSON capture of the containers, groups and object
//! counts relevant to planning. [`SnapshotDirectory`] serves the
//! [`DirectoryService`] queries from it, which makes planning runnable
//! offline and gives the planner a deterministic test double.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DirectoryService, GroupRef};
use crate::import::path::DirectoryPath;

/// One group inside a snapshot container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotGroup {
    pub name: String,
    #[serde(default)]
    pub members: usize,
}

/// One container (OU) in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContainer {
    pub path: DirectoryPath,
    /// User objects directly in the container
    #[serde(default)]
    pub users: usize,
    #[serde(default)]
    pub groups: Vec<SnapshotGroup>,
    /// Objects that are neither users nor groups (computers, contacts, ...)
    #[serde(default)]
    pub other_objects: usize,
}

impl SnapshotContainer {
    pub fn new(path: impl Into<String>) -> Self {
        SnapshotContainer {
            path: DirectoryPath::new(path.into()),
            users: 0,
            groups: Vec::new(),
            other_objects: 0,
        }
    }
}

/// Directory state captured to a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub containers: Vec<SnapshotContainer>,
}

impl DirectorySnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))
    }

    /// Paths of every container in the snapshot, in file order. This is
    /// the "previously scanned" set the cleanup pass works from.
    pub fn container_paths(&self) -> Vec<DirectoryPath> {
        self.containers.iter().map(|c| c.path.clone()).collect()
    }
}

/// In-memory [`DirectoryService`] over a snapshot.
pub struct SnapshotDirectory {
    /// Containers keyed by lower-cased path
    containers: HashMap<String, SnapshotContainer>,
    /// Group member counts keyed by lower-cased DN
    group_members: HashMap<String, usize>,
}

impl SnapshotDirectory {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        let mut containers = HashMap::new();
        let mut group_members = HashMap::new();
        for container in snapshot.containers {
            for group in &container.groups {
                let dn = group_dn(&group.name, &container.path);
                group_members.insert(dn.to_lowercase(), group.members);
            }
            containers.insert(container.path.as_str().to_lowercase(), container);
        }
        SnapshotDirectory {
            containers,
            group_members,
        }
    }

    fn container(&self, path: &DirectoryPath) -> Option<&SnapshotContainer> {
        self.containers.get(&path.as_str().to_lowercase())
    }
}

fn group_dn(name: &str, container: &DirectoryPath) -> String {
    format!("CN={},{}", name, container.as_str())
}

#[async_trait]
impl DirectoryService for SnapshotDirectory {
    async fn container_exists(&self, path: &DirectoryPath) -> Result<bool> {
        Ok(self.container(path).is_some())
    }

    async fn container_empty_of_users(&self, path: &DirectoryPath) -> Result<bool> {
        Ok(self.container(path).map(|c| c.users == 0).unwrap_or(true))
    }

    async fn container_completely_empty(&self, path: &DirectoryPath) -> Result<bool> {
        Ok(self
            .container(path)
            .map(|c| c.users == 0 && c.groups.is_empty() && c.other_objects == 0)
            .unwrap_or(true))
    }

    async fn groups_in(&self, path: &DirectoryPath) -> Result<Vec<GroupRef>> {
        Ok(self
            .container(path)
            .map(|c| {
                c.groups
                    .iter()
                    .map(|g| GroupRef::new(g.name.clone(), group_dn(&g.name, &c.path)))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn group_empty(&self, group: &GroupRef) -> Result<bool> {
        Ok(self
            .group_members
            .get(&group.dn.to_lowercase())
            .map(|members| *members == 0)
            .unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> SnapshotDirectory {
        let mut math = SnapshotContainer::new("OU=Math,OU=Base,DC=example,DC=com");
        math.users = 2;
        math.groups.push(SnapshotGroup {
            name: "GRP_Math".to_string(),
            members: 0,
        });

        SnapshotDirectory::new(DirectorySnapshot {
            containers: vec![math, SnapshotContainer::new("OU=Base,DC=example,DC=com")],
        })
    }

    #[tokio::test]
    async fn test_container_exists_case_insensitive() {
        let dir = directory();
        let path = DirectoryPath::new("ou=math,ou=base,dc=EXAMPLE,dc=com");
        assert!(dir.container_exists(&path).await.unwrap());

        let missing = DirectoryPath::new("OU=History,OU=Base,DC=example,DC=com");
        assert!(!dir.container_exists(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_emptiness_queries() {
        let dir = directory();
        let math = DirectoryPath::new("OU=Math,OU=Base,DC=example,DC=com");
        let base = DirectoryPath::new("OU=Base,DC=example,DC=com");

        assert!(!dir.container_empty_of_users(&math).await.unwrap());
        assert!(dir.container_empty_of_users(&base).await.unwrap());
        assert!(!dir.container_completely_empty(&math).await.unwrap());
        assert!(dir.container_completely_empty(&base).await.unwrap());
    }

    #[tokio::test]
    async fn test_groups_and_membership() {
        let dir = directory();
        let math = DirectoryPath::new("OU=Math,OU=Base,DC=example,DC=com");

        let groups = dir.groups_in(&math).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "GRP_Math");

        assert!(dir.group_empty(&groups[0]).await.unwrap());
    }
}
