//! Import mapping configuration types

use serde::{Deserialize, Serialize};

/// Mapping for a single target attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMapping {
    /// Target attribute logical name (e.g. "givenName", "sAMAccountName")
    pub target_attribute: String,
    /// Template rendered against the row (e.g. "%First% %Last:capitalize%")
    pub template: String,
}

impl AttributeMapping {
    pub fn new(target_attribute: impl Into<String>, template: impl Into<String>) -> Self {
        AttributeMapping {
            target_attribute: target_attribute.into(),
            template: template.into(),
        }
    }
}

/// Top-level import mapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMappingConfig {
    /// Database ID (None if not yet persisted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Human-readable name for this config
    pub name: String,
    /// Attribute mappings applied to every row
    #[serde(default)]
    pub attribute_mappings: Vec<AttributeMapping>,
    /// Column whose raw value decides which OU a row belongs to
    #[serde(default)]
    pub grouping_column: String,
    /// Default base OU path (e.g. "OU=Imported,DC=example,DC=com")
    #[serde(default)]
    pub default_ou: String,
    /// Whether the planner may create missing OUs (and their group pair)
    #[serde(default)]
    pub create_missing_ous: bool,
    /// Optional prefix for generated group names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_prefix: Option<String>,
    /// Domain appended to mail addresses without one, and used as the
    /// principal-name fallback
    #[serde(default)]
    pub mail_domain: String,
    /// OU leaf names the cleanup pass never deletes
    #[serde(default = "default_protected_ou_names")]
    pub protected_ou_names: Vec<String>,
}

/// Conventional AD builtins; overridable per deployment.
fn default_protected_ou_names() -> Vec<String> {
    ["Users", "Computers", "Domain Controllers", "Builtin"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl ImportMappingConfig {
    /// Create an empty config with defaults
    pub fn new(name: impl Into<String>) -> Self {
        ImportMappingConfig {
            id: None,
            name: name.into(),
            attribute_mappings: Vec::new(),
            grouping_column: String::new(),
            default_ou: String::new(),
            create_missing_ous: false,
            group_prefix: None,
            mail_domain: String::new(),
            protected_ou_names: default_protected_ou_names(),
        }
    }

    /// Add an attribute mapping
    pub fn add_attribute_mapping(&mut self, mapping: AttributeMapping) {
        self.attribute_mappings.push(mapping);
    }

    /// Find an attribute mapping by target attribute name
    pub fn find_attribute_mapping(&self, target_attribute: &str) -> Option<&AttributeMapping> {
        self.attribute_mappings
            .iter()
            .find(|m| m.target_attribute.eq_ignore_ascii_case(target_attribute))
    }

    /// Prefixed group name for a new OU's group pair
    pub fn group_name_for(&self, ou_leaf: &str) -> String {
        match &self.group_prefix {
            Some(prefix) => format!("{}{}", prefix, ou_leaf),
            None => ou_leaf.to_string(),
        }
    }

    /// True when `leaf` is on the protected-OU list
    pub fn is_protected_name(&self, leaf: &str) -> bool {
        self.protected_ou_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(leaf))
    }
}

impl Default for ImportMappingConfig {
    fn default() -> Self {
        ImportMappingConfig::new("")
    }
}
