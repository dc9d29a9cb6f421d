//! # Families Subcommand
//!
//! Prints the numbering family catalogue.

use anyhow::Result;
use clap::Args;
use cpsrn_core::{families, CategoryTag, NumberingFamily};

/// Arguments for the `cpsrn families` subcommand.
#[derive(Args, Debug)]
pub struct FamiliesArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute the families subcommand.
pub fn run_families(args: &FamiliesArgs) -> Result<u8> {
    let all = families();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        print!("{}", render_table(&all));
    }
    Ok(0)
}

fn render_table(all: &[NumberingFamily]) -> String {
    let mut out = format!(
        "{:<22} {:<8} {:>15} {:>8} {:>9}  {}\n",
        "FAMILY", "TAG", "CLASSIFICATIONS", "BUCKETS", "CAPACITY", "ELEVATED"
    );
    for family in all {
        let range = format!("{}..={}", family.base_classification, family.last_classification());
        out.push_str(&format!(
            "{:<22} {:<8} {:>15} {:>8} {:>9}  {}\n",
            family.kind.to_string(),
            CategoryTag::for_family(family).as_str(),
            range,
            family.bucket_count,
            family.capacity(),
            if family.requires_elevated_role { "yes" } else { "no" },
        ));
    }
    out
}
