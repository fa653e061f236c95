//! Reconciliation planning
//!
//! Two independent passes over read-only directory state: structural
//! creation (missing OUs and their group pairs) and empty-object
//! cleanup. The planner never mutates the directory; it only appends
//! [`PendingAction`]s to an [`ImportAnalysis`] for the external
//! applier.

use std::collections::HashSet;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use super::path::{DirectoryPath, build_ou_path};
use super::types::{
    ActionKind, DeleteOuReason, GroupKind, ImportAnalysis, ImportMappingConfig, ImportRow,
    PendingAction,
};
use crate::directory::DirectoryService;

/// Tuning options for a planning run.
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    /// Cap on concurrently outstanding directory queries during the
    /// creation pass fan-out.
    pub max_concurrent_queries: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        PlannerOptions {
            max_concurrent_queries: 8,
        }
    }
}

/// Computes the ordered action plan for one import run.
pub struct ImportPlanner<'a, D: DirectoryService> {
    directory: &'a D,
    config: &'a ImportMappingConfig,
    options: PlannerOptions,
}

impl<'a, D: DirectoryService> ImportPlanner<'a, D> {
    pub fn new(directory: &'a D, config: &'a ImportMappingConfig) -> Self {
        ImportPlanner {
            directory,
            config,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(
        directory: &'a D,
        config: &'a ImportMappingConfig,
        options: PlannerOptions,
    ) -> Self {
        ImportPlanner {
            directory,
            config,
            options,
        }
    }

    /// Run both passes. `scanned` is the set of previously-scanned
    /// container paths the cleanup pass considers; pass an empty slice
    /// to skip cleanup.
    pub async fn plan(
        &self,
        rows: &[ImportRow],
        scanned: &[DirectoryPath],
    ) -> Result<ImportAnalysis> {
        let mut analysis = ImportAnalysis::new();
        self.plan_creations(rows, &mut analysis).await?;
        self.plan_cleanup(scanned, &mut analysis).await?;
        Ok(analysis)
    }

    /// Creation pass: ensure the default container, then one missing-OU
    /// check per distinct grouping value (fanned out, capped), then
    /// ordered emission of CreateOu + group-pair actions.
    pub async fn plan_creations(
        &self,
        rows: &[ImportRow],
        analysis: &mut ImportAnalysis,
    ) -> Result<()> {
        if !self.config.create_missing_ous {
            debug!("OU auto-creation disabled; skipping creation pass");
            return Ok(());
        }

        let default_ou = self.config.default_ou.trim();
        if !default_ou.is_empty() {
            let base = DirectoryPath::new(default_ou);
            match self.directory.container_exists(&base).await {
                Ok(true) => {}
                Ok(false) => {
                    self.push_create_ou(analysis, base, "default container");
                }
                Err(err) => {
                    warn!("existence check failed for {}: {:#}", base, err);
                }
            }
        }

        let values = distinct_grouping_values(rows, &self.config.grouping_column);
        if values.is_empty() {
            debug!("no grouping values in input; creation pass is a no-op");
            return Ok(());
        }

        let targets: Vec<(String, DirectoryPath)> = values
            .into_iter()
            .map(|value| {
                let path = build_ou_path(&value, default_ou);
                (value, path)
            })
            .collect();

        // fan out the existence checks, fan in before emitting so the
        // plan order stays deterministic
        let directory = self.directory;
        let checks: Vec<(usize, Result<bool>)> = stream::iter(targets.iter().enumerate().map(
            |(index, (_, path))| async move { (index, directory.container_exists(path).await) },
        ))
        .buffer_unordered(self.options.max_concurrent_queries.max(1))
        .collect()
        .await;

        let mut exists: Vec<Option<bool>> = vec![None; targets.len()];
        for (index, result) in checks {
            match result {
                Ok(value) => exists[index] = Some(value),
                Err(err) => {
                    warn!(
                        "existence check failed for {}: {:#}; skipping",
                        targets[index].1, err
                    );
                }
            }
        }

        for ((value, path), state) in targets.iter().zip(exists) {
            match state {
                None => continue, // query failed, do not create on uncertain state
                Some(true) => debug!("{} already exists", path),
                Some(false) => {
                    // distinct grouping values can still build the same
                    // path; the duplicate guard covers the group pair too
                    if self.push_create_ou(analysis, path.clone(), value) {
                        self.push_group_pair(analysis, path);
                    }
                }
            }
        }

        Ok(())
    }

    /// Cleanup pass over previously-scanned containers: protected
    /// containers are skipped outright (groups included); unprotected
    /// ones are deleted when they hold no users and either only groups
    /// or nothing at all. Empty groups are deleted independently.
    pub async fn plan_cleanup(
        &self,
        scanned: &[DirectoryPath],
        analysis: &mut ImportAnalysis,
    ) -> Result<()> {
        for path in scanned {
            if self.is_protected(path) {
                debug!("{} is protected; skipping", path);
                continue;
            }

            let no_users = match self.directory.container_empty_of_users(path).await {
                Ok(value) => value,
                Err(err) => {
                    warn!("user query failed for {}: {:#}; skipping", path, err);
                    continue;
                }
            };
            let groups = match self.directory.groups_in(path).await {
                Ok(groups) => groups,
                Err(err) => {
                    warn!("group query failed for {}: {:#}; skipping", path, err);
                    continue;
                }
            };

            if !no_users {
                debug!("{} still holds users; not deleting", path);
            } else if !groups.is_empty() {
                let leaf = path.leaf_name().unwrap_or(path.as_str()).to_string();
                analysis.push(PendingAction::new(
                    ActionKind::DeleteOu {
                        reason: DeleteOuReason::OnlyGroups {
                            group_count: groups.len(),
                        },
                    },
                    leaf,
                    path.clone(),
                    format!(
                        "Delete {}: no users, contains only {} group(s)",
                        path,
                        groups.len()
                    ),
                ));
            } else {
                match self.directory.container_completely_empty(path).await {
                    Ok(true) => {
                        let leaf = path.leaf_name().unwrap_or(path.as_str()).to_string();
                        analysis.push(PendingAction::new(
                            ActionKind::DeleteOu {
                                reason: DeleteOuReason::CompletelyEmpty,
                            },
                            leaf,
                            path.clone(),
                            format!("Delete {}: completely empty", path),
                        ));
                    }
                    Ok(false) => {
                        info!(
                            "{} has no users or groups but holds other objects; leaving in place",
                            path
                        );
                    }
                    Err(err) => {
                        warn!("emptiness query failed for {}: {:#}; skipping", path, err);
                    }
                }
            }

            for group in &groups {
                match self.directory.group_empty(group).await {
                    Ok(true) => {
                        analysis.push(PendingAction::new(
                            ActionKind::DeleteGroup {
                                dn: group.dn.clone(),
                            },
                            group.name.clone(),
                            path.clone(),
                            format!("Delete empty group '{}' in {}", group.name, path),
                        ));
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!("membership query failed for {}: {:#}; skipping", group, err);
                    }
                }
            }
        }

        Ok(())
    }

    /// A container is protected when it is the configured default base,
    /// a first-level container directly under the domain root, or a
    /// second-level container whose leaf is on the protected-name list.
    fn is_protected(&self, path: &DirectoryPath) -> bool {
        let default_ou = self.config.default_ou.trim();
        if !default_ou.is_empty() && path.eq_ignore_case(default_ou) {
            return true;
        }
        let depth = path.ou_depth();
        if depth <= 1 {
            return true;
        }
        if depth <= 2 {
            if let Some(leaf) = path.leaf_name() {
                if self.config.is_protected_name(leaf) {
                    return true;
                }
            }
        }
        false
    }

    /// Queue a CreateOu unless an identical one is already queued.
    /// Returns whether the action was appended.
    fn push_create_ou(
        &self,
        analysis: &mut ImportAnalysis,
        path: DirectoryPath,
        origin: &str,
    ) -> bool {
        if analysis.has_create_ou(&path) {
            debug!("create already queued for {}", path);
            return false;
        }
        let leaf = path.leaf_name().unwrap_or(path.as_str()).to_string();
        let message = format!("Create OU {} (from '{}')", path, origin);
        analysis.push(PendingAction::new(ActionKind::CreateOu, leaf, path, message));
        true
    }

    /// Every new OU gets a security/distribution group pair named after
    /// its leaf, with the configured prefix.
    fn push_group_pair(&self, analysis: &mut ImportAnalysis, path: &DirectoryPath) {
        let leaf = match path.leaf_name() {
            Some(leaf) => leaf.to_string(),
            None => return,
        };
        let group_name = self.config.group_name_for(&leaf);
        for kind in [GroupKind::Security, GroupKind::Distribution] {
            analysis.push(PendingAction::new(
                ActionKind::CreateGroup { kind },
                group_name.clone(),
                path.clone(),
                format!("Create {} group '{}' in {}", kind.label(), group_name, path),
            ));
        }
    }
}

/// Distinct grouping values across all rows, case-insensitively
/// deduplicated. The first spelling seen wins; input order is kept.
fn distinct_grouping_values(rows: &[ImportRow], grouping_column: &str) -> Vec<String> {
    if grouping_column.trim().is_empty() {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        if let Some(value) = row.get_non_blank(grouping_column) {
            if seen.insert(value.to_lowercase()) {
                values.push(value.to_string());
            }
        }
    }
    values
}
