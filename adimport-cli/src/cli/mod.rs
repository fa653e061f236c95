//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "adimport-cli",
    about = "Plan Active Directory imports from spreadsheet data",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a reconciliation plan from input rows and a directory snapshot
    Plan(commands::plan::PlanArgs),
    /// Manage stored mapping configurations
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Plan(args) => commands::plan::run(args).await,
        Command::Config { action } => commands::config::run(action).await,
    }
}
