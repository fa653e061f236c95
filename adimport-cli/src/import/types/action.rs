//! Planned actions — the engine's output contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::import::path::DirectoryPath;

/// Which kind of group is created alongside a new OU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Security,
    Distribution,
}

impl GroupKind {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Security => "security",
            GroupKind::Distribution => "distribution",
        }
    }
}

/// Why the cleanup pass wants an OU removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeleteOuReason {
    /// No users, no groups, nothing else either.
    CompletelyEmpty,
    /// No users; only groups remain (the groups themselves are not
    /// deleted by this action).
    OnlyGroups { group_count: usize },
}

/// Type of planned change.
///
/// User-level actions (create/update/disable user objects) are owned by
/// the external applier and do not appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    CreateOu,
    CreateGroup { kind: GroupKind },
    DeleteOu { reason: DeleteOuReason },
    DeleteGroup { dn: String },
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::CreateOu => "Create OU",
            ActionKind::CreateGroup { .. } => "Create group",
            ActionKind::DeleteOu { .. } => "Delete OU",
            ActionKind::DeleteGroup { .. } => "Delete group",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ActionKind::CreateOu | ActionKind::CreateGroup { .. } => "+",
            ActionKind::DeleteOu { .. } | ActionKind::DeleteGroup { .. } => "×",
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            ActionKind::DeleteOu { .. } | ActionKind::DeleteGroup { .. }
        )
    }
}

/// One planned change. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Action ID for tracking
    pub id: Uuid,
    pub kind: ActionKind,
    /// Display name of the object the action targets
    pub display_name: String,
    /// Target container path
    pub path: DirectoryPath,
    /// Human-readable description for the plan listing
    pub message: String,
}

impl PendingAction {
    pub fn new(
        kind: ActionKind,
        display_name: impl Into<String>,
        path: DirectoryPath,
        message: impl Into<String>,
    ) -> Self {
        PendingAction {
            id: Uuid::new_v4(),
            kind,
            display_name: display_name.into(),
            path,
            message: message.into(),
        }
    }
}

/// A row-level problem surfaced during mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    /// Zero-based input row index
    pub row_index: usize,
    pub message: String,
}

/// Ordered result of one reconciliation run.
///
/// The action list is append-only; the external applier consumes it in
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAnalysis {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    actions: Vec<PendingAction>,
    #[serde(default)]
    pub diagnostics: Vec<RowDiagnostic>,
}

impl ImportAnalysis {
    pub fn new() -> Self {
        ImportAnalysis {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            actions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Append an action to the plan.
    pub fn push(&mut self, action: PendingAction) {
        self.actions.push(action);
    }

    pub fn push_diagnostic(&mut self, row_index: usize, message: impl Into<String>) {
        self.diagnostics.push(RowDiagnostic {
            row_index,
            message: message.into(),
        });
    }

    /// Actions in the order they were planned.
    pub fn actions(&self) -> &[PendingAction] {
        &self.actions
    }

    /// True when a CreateOu for this path (case-insensitive) is already
    /// queued.
    pub fn has_create_ou(&self, path: &DirectoryPath) -> bool {
        self.actions.iter().any(|a| {
            matches!(a.kind, ActionKind::CreateOu) && a.path.eq_ignore_case(path.as_str())
        })
    }

    pub fn create_count(&self) -> usize {
        self.actions.iter().filter(|a| !a.kind.is_delete()).count()
    }

    pub fn delete_count(&self) -> usize {
        self.actions.iter().filter(|a| a.kind.is_delete()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl Default for ImportAnalysis {
    fn default() -> Self {
        ImportAnalysis::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_create_ou_is_case_insensitive() {
        let mut analysis = ImportAnalysis::new();
        analysis.push(PendingAction::new(
            ActionKind::CreateOu,
            "Math",
            DirectoryPath::new("OU=Math,DC=x"),
            "Create OU=Math,DC=x",
        ));

        assert!(analysis.has_create_ou(&DirectoryPath::new("ou=math,dc=X")));
        assert!(!analysis.has_create_ou(&DirectoryPath::new("OU=Other,DC=x")));
    }

    #[test]
    fn test_counts_split_creates_and_deletes() {
        let mut analysis = ImportAnalysis::new();
        analysis.push(PendingAction::new(
            ActionKind::CreateOu,
            "Math",
            DirectoryPath::new("OU=Math,DC=x"),
            "",
        ));
        analysis.push(PendingAction::new(
            ActionKind::DeleteOu {
                reason: DeleteOuReason::CompletelyEmpty,
            },
            "Old",
            DirectoryPath::new("OU=Old,DC=x"),
            "",
        ));

        assert_eq!(analysis.create_count(), 1);
        assert_eq!(analysis.delete_count(), 1);
        assert_eq!(analysis.len(), 2);
    }
}
