//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::repository::mappings;
use crate::import::types::ImportMappingConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// List stored mapping configurations
    List,
    /// Print a stored configuration as TOML
    Show { name: String },
    /// Import a TOML mapping configuration under a name
    Save {
        name: String,
        /// TOML file to import
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a stored configuration
    Delete { name: String },
}

pub async fn run(action: ConfigAction) -> Result<()> {
    let pool = crate::config::open_config_db().await?;

    match action {
        ConfigAction::List => {
            let configs = mappings::list_mapping_configs(&pool).await?;
            if configs.is_empty() {
                println!("No stored mapping configs.");
            }
            for config in configs {
                println!(
                    "{}  ({} attribute mappings, updated {})",
                    config.name, config.attribute_count, config.updated_at
                );
            }
        }
        ConfigAction::Show { name } => {
            let config = mappings::get_mapping_config(&pool, &name)
                .await?
                .with_context(|| format!("No stored mapping config named '{}'", name))?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Save { name, file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config file: {}", file.display()))?;
            let mut config: ImportMappingConfig = toml::from_str(&text)
                .with_context(|| format!("Failed to parse config file: {}", file.display()))?;
            config.name = name.clone();
            config.id = None;
            mappings::save_mapping_config(&pool, &config).await?;
            println!("Saved mapping config '{}'.", name);
        }
        ConfigAction::Delete { name } => {
            if mappings::delete_mapping_config(&pool, &name).await? {
                println!("Deleted mapping config '{}'.", name);
            } else {
                println!("No stored mapping config named '{}'.", name);
            }
        }
    }

    Ok(())
}
