//! `stocktake fields` command - list the canonical vocabulary

use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::core::fields::CanonicalField;

pub fn run() -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Required", "Recognized headers (sample)", "Keywords"]);

    for field in CanonicalField::ALL {
        let variants: Vec<&str> = field.variants().iter().take(4).copied().collect();
        builder.push_record([
            field.as_str().to_string(),
            if field.is_required() { "yes" } else { "" }.to_string(),
            variants.join(", "),
            field.keywords().join(", "),
        ]);
    }

    println!("{}", builder.build().with(Style::markdown()));
    Ok(())
}
