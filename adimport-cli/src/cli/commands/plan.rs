//! Plan command handler

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use is_terminal::IsTerminal;
use log::info;

use crate::config::repository::mappings;
use crate::directory::{DirectorySnapshot, SnapshotDirectory};
use crate::import::types::ImportMappingConfig;
use crate::import::{ImportAnalysis, ImportPlanner, RowMapper, read_rows, write_plan_excel};

#[derive(Args)]
pub struct PlanArgs {
    /// Stored config name, or path to a TOML config file
    #[arg(long)]
    pub config: String,

    /// Input rows (.csv, .xlsx or .xlsm)
    #[arg(long)]
    pub rows: PathBuf,

    /// Directory snapshot JSON to plan against
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Also plan deletion of empty OUs and groups found in the snapshot
    #[arg(long)]
    pub cleanup: bool,

    /// Write the plan to an Excel report
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

pub async fn run(args: PlanArgs) -> Result<()> {
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = load_config(&args.config).await?;
    info!("using mapping config '{}'", config.name);

    let rows = read_rows(&args.rows)?;
    info!("loaded {} rows from {}", rows.len(), args.rows.display());

    let snapshot = DirectorySnapshot::load(&args.snapshot)?;
    let scanned = if args.cleanup {
        snapshot.container_paths()
    } else {
        Vec::new()
    };
    let directory = SnapshotDirectory::new(snapshot);

    let planner = ImportPlanner::new(&directory, &config);
    let mut analysis = planner.plan(&rows, &scanned).await?;

    // surface rows that still need manual correction after mapping
    let mapper = RowMapper::new(&config);
    for (index, row) in rows.iter().enumerate() {
        let attrs = mapper.map_row(row);
        if !attrs.missing.is_empty() {
            analysis.push_diagnostic(
                index,
                format!("missing required attribute(s): {}", attrs.missing.join(", ")),
            );
        }
    }

    print_analysis(&analysis);

    if let Some(path) = args.export {
        write_plan_excel(&analysis, &path)?;
        println!("\nPlan written to {}", path.display());
    }

    Ok(())
}

/// Resolve `--config`: a readable TOML file wins, otherwise the name is
/// looked up in the local config database.
async fn load_config(spec: &str) -> Result<ImportMappingConfig> {
    let path = Path::new(spec);
    if path.extension().and_then(|e| e.to_str()) == Some("toml") {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        return toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()));
    }

    let pool = crate::config::open_config_db().await?;
    mappings::get_mapping_config(&pool, spec)
        .await?
        .with_context(|| format!("No stored mapping config named '{}'", spec))
}

fn print_analysis(analysis: &ImportAnalysis) {
    if analysis.is_empty() {
        println!("{}", "Nothing to do: directory matches the input.".green());
    } else {
        println!(
            "{} ({} create, {} delete)",
            "Planned actions:".bold(),
            analysis.create_count(),
            analysis.delete_count()
        );
        for action in analysis.actions() {
            let symbol = if action.kind.is_delete() {
                action.kind.symbol().red()
            } else {
                action.kind.symbol().green()
            };
            println!(
                "  {} {} {}  {}",
                symbol,
                action.kind.label().bold(),
                action.display_name,
                action.message.dimmed()
            );
        }
    }

    if !analysis.diagnostics.is_empty() {
        println!("\n{}", "Rows needing manual correction:".yellow().bold());
        for diagnostic in &analysis.diagnostics {
            println!("  row {}: {}", diagnostic.row_index + 1, diagnostic.message);
        }
    }
}
