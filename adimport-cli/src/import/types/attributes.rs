//! Canonical attribute set produced for one row

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical attribute keys (stored lower-cased).
pub mod names {
    pub const GIVEN_NAME: &str = "givenname";
    pub const SURNAME: &str = "sn";
    pub const ACCOUNT_NAME: &str = "samaccountname";
    pub const DISPLAY_NAME: &str = "displayname";
    pub const MAIL: &str = "mail";
    pub const PRINCIPAL_NAME: &str = "userprincipalname";
}

/// Required attributes a user object cannot be created without.
pub const REQUIRED_ATTRIBUTES: &[&str] = &[
    names::GIVEN_NAME,
    names::SURNAME,
    names::ACCOUNT_NAME,
];

/// Normalized attribute values for one row.
///
/// Keys are lower-cased attribute names. A required attribute that
/// could not be filled, even by auto-completion, is simply absent and
/// listed in `missing` — absence means "needs manual correction", not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttributes {
    values: HashMap<String, String>,
    /// Raw grouping-column value, copied through without normalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_value: Option<String>,
    /// Required attributes still absent after auto-completion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ResolvedAttributes {
    pub fn new() -> Self {
        ResolvedAttributes::default()
    }

    /// Store a value under a lower-cased key. Blank values are ignored:
    /// an attribute is either present and non-blank, or absent.
    pub fn set(&mut self, attribute: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.values.insert(attribute.trim().to_lowercase(), value);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.values
            .get(&attribute.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Lookup that treats blank values as absent.
    pub fn get_non_blank(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).map(str::trim).filter(|v| !v.is_empty())
    }

    /// True when the attribute is absent or blank.
    pub fn is_blank(&self, attribute: &str) -> bool {
        self.get_non_blank(attribute).is_none()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.grouping_value.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
