//! Core data types for import planning

pub mod action;
pub mod attributes;
pub mod config;
pub mod row;

pub use action::{
    ActionKind, DeleteOuReason, GroupKind, ImportAnalysis, PendingAction, RowDiagnostic,
};
pub use attributes::{REQUIRED_ATTRIBUTES, ResolvedAttributes, names};
pub use config::{AttributeMapping, ImportMappingConfig};
pub use row::ImportRow;
