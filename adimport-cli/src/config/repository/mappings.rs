//! Repository for import mapping configurations
//!
//! Configs are key-unique by name; saving an existing name overwrites
//! it (last write wins). The config body is stored as JSON.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::import::types::ImportMappingConfig;

/// Summary of a stored mapping config (for listing)
#[derive(Debug, Clone)]
pub struct MappingConfigSummary {
    pub id: i64,
    pub name: String,
    pub attribute_count: usize,
    pub updated_at: String,
}

/// List all stored mapping configs (summary only)
pub async fn list_mapping_configs(pool: &SqlitePool) -> Result<Vec<MappingConfigSummary>> {
    let rows = sqlx::query(
        "SELECT id, name, config_json, updated_at FROM import_mapping_configs ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list mapping configs")?;

    let mut configs = Vec::new();
    for row in rows {
        let config_json: String = row.try_get("config_json")?;
        let config: ImportMappingConfig = serde_json::from_str(&config_json)
            .context("Failed to deserialize mapping config")?;
        configs.push(MappingConfigSummary {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            attribute_count: config.attribute_mappings.len(),
            updated_at: row.try_get("updated_at")?,
        });
    }

    Ok(configs)
}

/// Get a mapping config by name
pub async fn get_mapping_config(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<ImportMappingConfig>> {
    let row = sqlx::query("SELECT id, config_json FROM import_mapping_configs WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to get mapping config")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let config_json: String = row.try_get("config_json")?;
    let mut config: ImportMappingConfig =
        serde_json::from_str(&config_json).context("Failed to deserialize mapping config")?;
    config.id = Some(row.try_get("id")?);

    Ok(Some(config))
}

/// Save a mapping config, overwriting any existing config of the same
/// name. Returns the row id.
pub async fn save_mapping_config(pool: &SqlitePool, config: &ImportMappingConfig) -> Result<i64> {
    let config_json =
        serde_json::to_string(config).context("Failed to serialize mapping config")?;

    sqlx::query(
        r#"
        INSERT INTO import_mapping_configs (name, config_json, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(name)
        DO UPDATE SET config_json = excluded.config_json, updated_at = excluded.updated_at
        "#,
    )
    .bind(&config.name)
    .bind(&config_json)
    .execute(pool)
    .await
    .context("Failed to save mapping config")?;

    let row = sqlx::query("SELECT id FROM import_mapping_configs WHERE name = ?")
        .bind(&config.name)
        .fetch_one(pool)
        .await
        .context("Failed to read back saved mapping config")?;

    Ok(row.try_get("id")?)
}

/// Delete a mapping config by name. Returns whether a row was removed.
pub async fn delete_mapping_config(pool: &SqlitePool, name: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM import_mapping_configs WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await
        .context("Failed to delete mapping config")?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::migrations;
    use crate::import::types::AttributeMapping;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::apply(&pool).await.unwrap();
        pool
    }

    fn sample_config(name: &str) -> ImportMappingConfig {
        let mut config = ImportMappingConfig::new(name);
        config.grouping_column = "Class".to_string();
        config.add_attribute_mapping(AttributeMapping::new("givenName", "%First%"));
        config
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let pool = test_pool().await;
        let config = sample_config("students");

        let id = save_mapping_config(&pool, &config).await.unwrap();
        let loaded = get_mapping_config(&pool, "students").await.unwrap().unwrap();

        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.name, "students");
        assert_eq!(loaded.attribute_mappings.len(), 1);
        assert_eq!(loaded.grouping_column, "Class");
    }

    #[tokio::test]
    async fn test_save_same_name_overwrites() {
        let pool = test_pool().await;
        save_mapping_config(&pool, &sample_config("students"))
            .await
            .unwrap();

        let mut updated = sample_config("students");
        updated.grouping_column = "Cohort".to_string();
        save_mapping_config(&pool, &updated).await.unwrap();

        let configs = list_mapping_configs(&pool).await.unwrap();
        assert_eq!(configs.len(), 1);

        let loaded = get_mapping_config(&pool, "students").await.unwrap().unwrap();
        assert_eq!(loaded.grouping_column, "Cohort");
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let pool = test_pool().await;
        assert!(get_mapping_config(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        save_mapping_config(&pool, &sample_config("students"))
            .await
            .unwrap();

        assert!(delete_mapping_config(&pool, "students").await.unwrap());
        assert!(!delete_mapping_config(&pool, "students").await.unwrap());
        assert!(get_mapping_config(&pool, "students").await.unwrap().is_none());
    }
}
