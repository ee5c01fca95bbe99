//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, import::ImportArgs, template::TemplateArgs,
};

#[derive(Parser)]
#[command(name = "stocktake")]
#[command(author, version, about = "Bulk spreadsheet import for inventory assets")]
#[command(
    long_about = "Imports inventory assets from CSV/Excel exports: reconciles arbitrary \
column headers against a canonical schema, consolidates rows that describe one physical \
asset, validates the result, and submits it to the inventory backend."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full import pipeline on a spreadsheet
    Import(ImportArgs),

    /// Validate a spreadsheet without importing anything
    Check(CheckArgs),

    /// Print a CSV template with the canonical headers
    Template(TemplateArgs),

    /// List the canonical field vocabulary
    Fields,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
