//! Mapping template rendering
//!
//! Templates reference row columns as `%Column%` or `%Column:modifier%`.
//! Parsing happens once per distinct template string through a shared
//! cache; substitution works off token spans fixed at parse time, so
//! replacement values can never be re-scanned for further tokens.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{normalize_account_name, title_case_words};
use super::types::ImportRow;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([^%:]+?)(?::([^%:]+?))?%").expect("valid token pattern"));

/// String transformation applied to a resolved column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Lowercase,
    Uppercase,
    Capitalize,
    Trim,
    Username,
    CamelCase,
    PascalCase,
    First,
    FirstLower,
    FirstUpper,
}

impl Modifier {
    /// Case-insensitive modifier lookup. Unknown names yield `None`,
    /// which leaves the value unchanged.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "lowercase" => Some(Modifier::Lowercase),
            "uppercase" => Some(Modifier::Uppercase),
            "capitalize" => Some(Modifier::Capitalize),
            "trim" => Some(Modifier::Trim),
            "username" => Some(Modifier::Username),
            "camelcase" => Some(Modifier::CamelCase),
            "pascalcase" => Some(Modifier::PascalCase),
            "first" | "firstchar" => Some(Modifier::First),
            "firstcharlower" => Some(Modifier::FirstLower),
            "firstcharupper" => Some(Modifier::FirstUpper),
            _ => None,
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Modifier::Lowercase => value.to_lowercase(),
            Modifier::Uppercase => value.to_uppercase(),
            Modifier::Capitalize => title_case_words(value),
            Modifier::Trim => value.trim().to_string(),
            Modifier::Username => normalize_account_name(value),
            Modifier::CamelCase => join_words(value, false),
            Modifier::PascalCase => join_words(value, true),
            Modifier::First => value.chars().next().map(String::from).unwrap_or_default(),
            Modifier::FirstLower => value
                .chars()
                .next()
                .map(|c| c.to_lowercase().to_string())
                .unwrap_or_default(),
            Modifier::FirstUpper => value
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Join whitespace-separated words; every word is capitalized except,
/// in camel case, the first.
fn join_words(value: &str, capitalize_first_word: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, word) in value.split_whitespace().enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        if i == 0 && !capitalize_first_word {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.extend(chars.flat_map(char::to_lowercase));
    }
    out
}

/// One parsed `%Column%` / `%Column:modifier%` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    /// Byte range of the token in the template, fixed at parse time
    start: usize,
    end: usize,
    /// Original matched text (including delimiters)
    pub text: String,
    /// Referenced column name
    pub column: String,
    /// Recognized modifier, if any
    pub modifier: Option<Modifier>,
}

fn parse_tokens(template: &str) -> Vec<TemplateToken> {
    TOKEN_PATTERN
        .captures_iter(template)
        .filter_map(|caps| {
            let matched = caps.get(0)?;
            let column = caps.get(1)?.as_str().trim().to_string();
            let modifier = caps.get(2).and_then(|m| Modifier::parse(m.as_str()));
            Some(TemplateToken {
                start: matched.start(),
                end: matched.end(),
                text: matched.as_str().to_string(),
                column,
                modifier,
            })
        })
        .collect()
}

/// Thread-safe parse cache keyed by raw template text.
///
/// Parsing is pure, so a first-insert race just computes the same token
/// list twice; last writer wins with an identical value.
#[derive(Debug, Default)]
pub struct TemplateCache {
    inner: RwLock<HashMap<String, Arc<Vec<TemplateToken>>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        TemplateCache::default()
    }

    /// Tokens for a template, parsing and caching on first sight.
    pub fn tokens_for(&self, template: &str) -> Arc<Vec<TemplateToken>> {
        {
            let cache = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if let Some(tokens) = cache.get(template) {
                return Arc::clone(tokens);
            }
        }
        let parsed = Arc::new(parse_tokens(template));
        let mut cache = self.inner.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(cache.entry(template.to_string()).or_insert(parsed))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of rendering a template against a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub value: String,
    /// Columns referenced by the template but absent from the row;
    /// each resolved to an empty string. The caller decides whether to
    /// surface these as diagnostics.
    pub missing_columns: Vec<String>,
}

/// Renders mapping templates against input rows.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    cache: Arc<TemplateCache>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        TemplateEngine::default()
    }

    /// Use a shared (injected) parse cache.
    pub fn with_cache(cache: Arc<TemplateCache>) -> Self {
        TemplateEngine { cache }
    }

    /// Substitute row values into a template.
    ///
    /// Blank templates render to nothing; templates without a `%` are
    /// returned verbatim with no lookup. Column lookup is
    /// case-insensitive; an absent column resolves to an empty string
    /// and is reported in `missing_columns`, never an error.
    pub fn render(&self, template: &str, row: &ImportRow) -> Rendered {
        if template.trim().is_empty() {
            return Rendered::default();
        }
        if !template.contains('%') {
            return Rendered {
                value: template.to_string(),
                missing_columns: Vec::new(),
            };
        }

        let tokens = self.cache.tokens_for(template);
        if tokens.is_empty() {
            // malformed delimiters parse to zero tokens; nothing to substitute
            return Rendered {
                value: template.to_string(),
                missing_columns: Vec::new(),
            };
        }

        let mut value = String::with_capacity(template.len());
        let mut missing_columns = Vec::new();
        let mut cursor = 0;
        for token in tokens.iter() {
            value.push_str(&template[cursor..token.start]);
            let resolved = match row.get(&token.column) {
                Some(cell) => cell.to_string(),
                None => {
                    missing_columns.push(token.column.clone());
                    String::new()
                }
            };
            match token.modifier {
                Some(modifier) => value.push_str(&modifier.apply(&resolved)),
                None => value.push_str(&resolved),
            }
            cursor = token.end;
        }
        value.push_str(&template[cursor..]);

        Rendered {
            value,
            missing_columns,
        }
    }
}
