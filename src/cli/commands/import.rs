//! `stocktake import` command - the full pipeline with interactive reviews

use clap::ValueEnum;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use miette::Result;
use std::path::PathBuf;

use crate::api::HttpInventoryApi;
use crate::cli::args::GlobalOpts;
use crate::cli::table::{conflicts_table, errors_table, mapping_table};
use crate::core::Config;
use crate::import::grouper::{Conflict, GroupingSummary};
use crate::import::mapper::{HeaderMapping, MappingValidation};
use crate::import::parser::parse_file;
use crate::import::pipeline::{
    ImportPipeline, ImportPreview, ImportReport, ImportStrategy, PipelineOutcome, ReviewDecision,
    ReviewPrompt,
};
use crate::import::{export, validator::ValidationSummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyOpt {
    /// Submit only rows that passed validation
    ValidOnly,
    /// Submit everything and let the server skip invalid records
    AttemptAll,
    /// Submit everything (requires a fully valid file)
    All,
}

impl From<StrategyOpt> for ImportStrategy {
    fn from(opt: StrategyOpt) -> Self {
        match opt {
            StrategyOpt::ValidOnly => ImportStrategy::ValidOnly,
            StrategyOpt::AttemptAll => ImportStrategy::AttemptAll,
            StrategyOpt::All => ImportStrategy::All,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Spreadsheet to import (.csv, .xls, .xlsx, .ods)
    pub file: PathBuf,

    /// Run the pipeline but stop before submitting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Accept review steps without prompting; cancels instead when required
    /// headers cannot be resolved
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Import strategy (prompted interactively when omitted)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyOpt>,

    /// Write failing rows with their errors to this CSV
    #[arg(long)]
    pub export_failed: Option<PathBuf>,

    /// Process only the first N data rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Backend API base URL
    #[arg(long, env = "STOCKTAKE_API_URL")]
    pub api_url: Option<String>,

    /// Backend API token
    #[arg(long, env = "STOCKTAKE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Duplicate-rate threshold for the grouping review (default 0.05)
    #[arg(long)]
    pub grouping_threshold: Option<f64>,
}

/// Interactive review prompt backed by dialoguer. With `--yes` it accepts
/// every review it legally can and cancels otherwise.
struct CliPrompt {
    theme: ColorfulTheme,
    yes: bool,
    quiet: bool,
    strategy: Option<ImportStrategy>,
}

impl CliPrompt {
    fn confirm(&self, prompt: &str, default: bool) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .unwrap_or(false)
    }
}

impl ReviewPrompt for CliPrompt {
    fn review_headers(
        &mut self,
        mapping: &mut HeaderMapping,
        validation: &MappingValidation,
    ) -> ReviewDecision {
        if !self.quiet {
            println!();
            println!(
                "{} Header mapping needs review",
                style("!").yellow().bold()
            );
            println!("{}", mapping_table(mapping));
            if !mapping.duplicates.is_empty() {
                let duplicates: Vec<&str> =
                    mapping.duplicates.iter().map(|f| f.as_str()).collect();
                println!(
                    "{} Multiple columns map to: {} (first column wins)",
                    style("!").yellow(),
                    style(duplicates.join(", ")).yellow()
                );
            }
            for field in &validation.missing_required {
                println!(
                    "{} Required field {} has no matching column",
                    style("✗").red(),
                    style(field.as_str()).red()
                );
            }
        }

        if self.yes {
            // Unmapped/duplicate headers can be waved through; missing
            // required fields cannot be fixed without a human
            return if validation.is_valid {
                ReviewDecision::Accept
            } else {
                eprintln!(
                    "{} Cannot continue with --yes: required columns are missing",
                    style("✗").red()
                );
                ReviewDecision::Cancel
            };
        }

        // Let the user bind missing required fields to leftover columns
        for field in validation.missing_required.clone() {
            let mut options: Vec<String> = mapping.unmapped.clone();
            options.push("(cancel import)".to_string());
            let prompt = format!("Which column holds '{}'?", field);
            let choice = Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(&options)
                .default(0)
                .interact();
            match choice {
                Ok(i) if i < mapping.unmapped.len() => {
                    let raw = options[i].clone();
                    mapping.assign(&raw, field);
                }
                _ => return ReviewDecision::Cancel,
            }
        }

        if self.confirm("Proceed with this mapping?", true) {
            ReviewDecision::Accept
        } else {
            ReviewDecision::Cancel
        }
    }

    fn review_grouping(
        &mut self,
        summary: &GroupingSummary,
        conflicts: &[Conflict],
    ) -> ReviewDecision {
        if !self.quiet {
            println!();
            println!(
                "{} {} rows describe {} unique assets ({} merged, {} peripherals)",
                style("!").yellow().bold(),
                summary.total_rows,
                style(summary.unique_assets).cyan(),
                summary.rows_merged,
                summary.peripheral_count,
            );
            if !conflicts.is_empty() {
                println!(
                    "{} {} duplicate value(s) detected across merged rows:",
                    style("!").yellow(),
                    conflicts.len()
                );
                println!("{}", conflicts_table(conflicts, 10));
            }
        }

        if self.yes || self.confirm("Consolidate these rows before importing?", true) {
            ReviewDecision::Accept
        } else {
            ReviewDecision::Cancel
        }
    }

    fn confirm_import(&mut self, preview: &ImportPreview) -> Option<ImportStrategy> {
        if !self.quiet {
            print_validation(&preview.summary, preview.grouped, preview.asset_count);
            if let Some(report) = &preview.new_options {
                for (label, values) in report.sections() {
                    println!(
                        "{} New {} will be created: {}",
                        style("→").blue(),
                        label.to_lowercase(),
                        style(values.join(", ")).cyan()
                    );
                }
            }
        }

        let available = preview.available_strategies();
        let strategy = match self.strategy {
            Some(strategy) => {
                if !available.contains(&strategy) {
                    eprintln!(
                        "{} Strategy not available for this dataset ({} invalid row(s))",
                        style("✗").red(),
                        preview.summary.invalid_rows
                    );
                    return None;
                }
                strategy
            }
            None if self.yes => ImportStrategy::ValidOnly,
            None => {
                let labels: Vec<&str> = available.iter().map(|s| s.label()).collect();
                let choice = Select::with_theme(&self.theme)
                    .with_prompt("Import strategy")
                    .items(&labels)
                    .default(0)
                    .interact();
                match choice {
                    Ok(i) => available[i],
                    Err(_) => return None,
                }
            }
        };

        if self.yes
            || self.confirm(
                &format!("Import {} asset(s) now?", preview.asset_count),
                true,
            )
        {
            Some(strategy)
        } else {
            None
        }
    }
}

fn print_validation(summary: &ValidationSummary, grouped: bool, asset_count: usize) {
    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Validation").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Records:      {}", style(summary.total_rows).cyan());
    println!("  Valid:        {}", style(summary.valid_rows).green());
    if summary.invalid_rows > 0 {
        println!("  Invalid:      {}", style(summary.invalid_rows).red());
        println!("{}", errors_table(summary));
    }
    if grouped {
        println!(
            "  {} rows were consolidated into {} asset(s)",
            style("→").blue(),
            asset_count
        );
    }
}

fn print_report(report: &ImportReport, quiet: bool) {
    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Result").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Submitted:  {}", style(report.submitted).cyan());
    println!("  Imported:   {}", style(report.imported).green());
    println!("  Duplicates: {}", style(report.duplicates).yellow());
    println!("  Skipped:    {}", style(report.skipped).dim());
    println!("  Failed:     {}", style(report.failed).red());
    if report.soft_duplicate {
        println!(
            "{} These assets already exist in inventory; nothing was re-imported",
            style("→").blue()
        );
    }
    if !quiet {
        for warning in &report.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
    }
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let api_url = args.api_url.clone().unwrap_or_else(|| config.api_url());
    let api_token = args.api_token.clone().or_else(|| config.api_token.clone());
    let threshold = args
        .grouping_threshold
        .unwrap_or_else(|| config.grouping_threshold());

    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let mut parsed = parse_file(&args.file).map_err(|e| miette::miette!("{}", e))?;
    if let Some(limit) = args.limit {
        parsed.rows.truncate(limit);
    }
    if !global.quiet {
        println!(
            "{} Read {} data row(s) from {}{}",
            style("→").blue(),
            style(parsed.rows.len()).cyan(),
            style(args.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let api = HttpInventoryApi::new(api_url, api_token).map_err(|e| miette::miette!("{}", e))?;
    let mut prompt = CliPrompt {
        theme: ColorfulTheme::default(),
        yes: args.yes,
        quiet: global.quiet,
        strategy: args.strategy.map(ImportStrategy::from),
    };
    let mut pipeline = ImportPipeline::new(threshold);

    let outcome = pipeline
        .run(parsed, &mut prompt, &api, args.dry_run)
        .map_err(|e| miette::miette!("{}", e))?;

    // Failed-record export works for any outcome that got as far as
    // validation
    if let Some(path) = &args.export_failed {
        if let (Some(file), Some(summary)) = (pipeline.parsed_file(), pipeline.validation()) {
            if summary.invalid_rows > 0 {
                let written = export::write_failed_records(file, summary, path)
                    .map_err(|e| miette::miette!("{}", e))?;
                println!(
                    "{} Wrote {} failing row(s) to {}",
                    style("→").blue(),
                    written,
                    style(path.display()).yellow()
                );
            }
        }
    }

    match outcome {
        PipelineOutcome::Cancelled(stage) => {
            println!(
                "{} Import cancelled at {}; nothing was submitted",
                style("✗").red(),
                stage
            );
            Err(miette::miette!("Import cancelled"))
        }
        PipelineOutcome::DryRun { .. } => {
            println!();
            println!(
                "{}",
                style("Dry run complete. Nothing was submitted.").yellow()
            );
            Ok(())
        }
        PipelineOutcome::Completed(report) => {
            print_report(&report, global.quiet);
            Ok(())
        }
    }
}
