//! Row mapping - turns one input row into a canonical attribute set

use std::sync::Arc;

use log::warn;

use super::normalize::AttributeNormalizer;
use super::template::{TemplateCache, TemplateEngine};
use super::types::{ImportMappingConfig, ImportRow, ResolvedAttributes};

/// Maps input rows onto directory attributes using a mapping config.
pub struct RowMapper<'a> {
    config: &'a ImportMappingConfig,
    engine: TemplateEngine,
    normalizer: AttributeNormalizer,
}

impl<'a> RowMapper<'a> {
    pub fn new(config: &'a ImportMappingConfig) -> Self {
        RowMapper {
            config,
            engine: TemplateEngine::new(),
            normalizer: AttributeNormalizer::new(config.mail_domain.clone()),
        }
    }

    /// Share a template parse cache across mappers.
    pub fn with_cache(config: &'a ImportMappingConfig, cache: Arc<TemplateCache>) -> Self {
        RowMapper {
            config,
            engine: TemplateEngine::with_cache(cache),
            normalizer: AttributeNormalizer::new(config.mail_domain.clone()),
        }
    }

    /// Render and normalize every configured attribute for one row,
    /// copy the grouping value through raw, then run required-attribute
    /// completion. An empty row yields an empty result with no
    /// completion attempted.
    pub fn map_row(&self, row: &ImportRow) -> ResolvedAttributes {
        let mut attrs = ResolvedAttributes::new();
        if row.is_empty() {
            return attrs;
        }

        for mapping in &self.config.attribute_mappings {
            if mapping.template.trim().is_empty() {
                continue;
            }
            let rendered = self.engine.render(&mapping.template, row);
            for column in &rendered.missing_columns {
                warn!(
                    "template for '{}' references column '{}' not present in the row",
                    mapping.target_attribute, column
                );
            }
            if rendered.value.trim().is_empty() {
                continue;
            }
            let normalized = self
                .normalizer
                .normalize(&mapping.target_attribute, &rendered.value);
            attrs.set(&mapping.target_attribute, normalized);
        }

        // the grouping value drives path building and must never be
        // attribute-normalized
        if !self.config.grouping_column.trim().is_empty() {
            if let Some(value) = row.get_non_blank(&self.config.grouping_column) {
                attrs.grouping_value = Some(value.to_string());
            }
        }

        self.normalizer.complete_required(&mut attrs);
        attrs
    }
}
