//! `stocktake check` command - validate a spreadsheet without importing
//!
//! Non-interactive: mapping problems that would pause the import pipeline
//! are printed instead, and a nonzero exit reports invalid rows. Useful in
//! scripts and as a pre-flight before `stocktake import`.

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::table::{conflicts_table, errors_table, mapping_table};
use crate::core::Config;
use crate::import::grouper::{group_assets, needs_grouping, AssetGroup};
use crate::import::mapper::{map_headers, transform_data, validate_mapping};
use crate::import::parser::parse_file;
use crate::import::validator::{summarize, validate_data};
use crate::import::export;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Spreadsheet to check (.csv, .xls, .xlsx, .ods)
    pub file: PathBuf,

    /// Write failing rows with their errors to this CSV
    #[arg(long)]
    pub export_failed: Option<PathBuf>,

    /// Duplicate-rate threshold for grouping (default 0.05)
    #[arg(long)]
    pub grouping_threshold: Option<f64>,

    /// Show the resolved header mapping
    #[arg(long)]
    pub show_mapping: bool,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let threshold = args
        .grouping_threshold
        .unwrap_or_else(|| config.grouping_threshold());

    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }
    let parsed = parse_file(&args.file).map_err(|e| miette::miette!("{}", e))?;
    if parsed.is_empty() {
        return Err(miette::miette!(
            "Nothing to check: {} has no data rows",
            args.file.display()
        ));
    }

    let mapping = map_headers(&parsed.headers);
    let validation = validate_mapping(&mapping);

    if args.show_mapping || !global.quiet {
        if !mapping.unmapped.is_empty() {
            println!(
                "{} {} column(s) not recognized (kept as-is): {}",
                style("!").yellow(),
                mapping.unmapped.len(),
                mapping.unmapped.join(", ")
            );
        }
        if !mapping.duplicates.is_empty() {
            let duplicates: Vec<&str> = mapping.duplicates.iter().map(|f| f.as_str()).collect();
            println!(
                "{} Multiple columns map to: {} (first column wins)",
                style("!").yellow(),
                duplicates.join(", ")
            );
        }
    }
    if args.show_mapping {
        println!("{}", mapping_table(&mapping));
    }

    if !validation.is_valid {
        let missing: Vec<&str> = validation
            .missing_required
            .iter()
            .map(|f| f.as_str())
            .collect();
        return Err(miette::miette!(
            "No column maps to required field(s): {}",
            missing.join(", ")
        ));
    }

    let rows = transform_data(&parsed, &mapping);
    let grouped = needs_grouping(&rows, threshold);
    let mut groups: Vec<AssetGroup> = if grouped {
        let result = group_assets(&rows);
        if !global.quiet {
            let summary = result.summary();
            println!(
                "{} {} rows describe {} unique asset(s) ({} merged)",
                style("→").blue(),
                summary.total_rows,
                summary.unique_assets,
                summary.rows_merged
            );
            if !result.conflicts.is_empty() {
                println!(
                    "{} {} duplicate value(s) across merged rows:",
                    style("!").yellow(),
                    result.conflicts.len()
                );
                println!("{}", conflicts_table(&result.conflicts, 10));
            }
        }
        result.groups
    } else {
        rows.iter().map(AssetGroup::from_row).collect()
    };

    let errors = validate_data(&mut groups, grouped);
    let summary = summarize(&groups, &errors);

    println!();
    println!(
        "  {} record(s): {} valid, {} invalid",
        summary.total_rows,
        style(summary.valid_rows).green(),
        if summary.invalid_rows > 0 {
            style(summary.invalid_rows).red()
        } else {
            style(summary.invalid_rows).dim()
        }
    );
    if summary.invalid_rows > 0 && !global.quiet {
        println!("{}", errors_table(&summary));
    }

    if let Some(path) = &args.export_failed {
        if summary.invalid_rows > 0 {
            let written = export::write_failed_records(&parsed, &summary, path)
                .map_err(|e| miette::miette!("{}", e))?;
            println!(
                "{} Wrote {} failing row(s) to {}",
                style("→").blue(),
                written,
                style(path.display()).yellow()
            );
        }
    }

    if summary.invalid_rows > 0 {
        Err(miette::miette!(
            "{} invalid record(s) found",
            summary.invalid_rows
        ))
    } else {
        if !global.quiet {
            println!("{} All records valid", style("✓").green());
        }
        Ok(())
    }
}
