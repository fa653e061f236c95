//! Input row representation

use serde::{Deserialize, Serialize};

/// A single input record: ordered column name/value pairs.
///
/// Column lookup is case-insensitive. Order is preserved so diagnostics
/// can point back at the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    columns: Vec<(String, String)>,
}

impl ImportRow {
    pub fn new() -> Self {
        ImportRow {
            columns: Vec::new(),
        }
    }

    /// Build a row from parallel header/value slices.
    ///
    /// Values without a header are dropped; missing trailing values
    /// become empty strings.
    pub fn from_headers(headers: &[String], values: &[String]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = values.get(i).cloned().unwrap_or_default();
                (header.trim().to_string(), value)
            })
            .collect();
        ImportRow { columns }
    }

    /// Append a column (keeps insertion order).
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Case-insensitive column lookup. First match wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name.trim()))
            .map(|(_, value)| value.as_str())
    }

    /// Like [`get`](Self::get), but treats blank values as absent.
    pub fn get_non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Iterate columns in source order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
