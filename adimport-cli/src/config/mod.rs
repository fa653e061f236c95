//! Local configuration storage

pub mod repository;

use std::path::PathBuf;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Directory where adimport keeps its local state.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(base.join("adimport"))
}

/// Open (creating if needed) the local configuration database.
pub async fn open_config_db() -> Result<SqlitePool> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    let options = SqliteConnectOptions::new()
        .filename(dir.join("adimport.db"))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open configuration database")?;

    repository::migrations::apply(&pool).await?;

    Ok(pool)
}
