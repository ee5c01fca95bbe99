//! `stocktake template` command - CSV template generation

use console::style;
use miette::Result;

use crate::core::fields::CanonicalField;

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Omit the example data row
    #[arg(long)]
    pub headers_only: bool,
}

fn example_value(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::SerialNumber => "SN-0001",
        CanonicalField::TagId => "TAG-0001",
        CanonicalField::ProjectReferenceNum => "PRJ-2024-001",
        CanonicalField::Category => "Laptop",
        CanonicalField::Model => "ThinkPad X1",
        CanonicalField::Status => "Active",
        CanonicalField::RecipientName => "Jane Smith",
        CanonicalField::DepartmentName => "Finance",
        CanonicalField::CustomerName => "Acme Corp",
        CanonicalField::CustomerReferenceNumber => "ACME-42",
        CanonicalField::Branch => "HQ",
        CanonicalField::ItemName => "Laptop 14in",
        CanonicalField::Remarks => "Issued with docking station",
        CanonicalField::PeripheralName => "\"Mouse,Keyboard\"",
        CanonicalField::SerialCode => "\"M-001,K-001\"",
    }
}

pub fn run(args: TemplateArgs) -> Result<()> {
    let headers: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.as_str()).collect();

    // Output to stdout (can be redirected to file)
    println!("{}", headers.join(","));
    if !args.headers_only {
        let example: Vec<&str> = CanonicalField::ALL
            .iter()
            .map(|f| example_value(*f))
            .collect();
        println!("{}", example.join(","));
    }

    // Print usage hint to stderr so it doesn't interfere with redirected output
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: stocktake template > assets.csv",
        style("→").blue()
    );

    Ok(())
}
