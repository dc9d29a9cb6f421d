//! # Parse Subcommand
//!
//! Validates a registry number and reports where it sits in its family.

use anyhow::{Context, Result};
use clap::Args;
use cpsrn_core::{families, CategoryTag, NumberingFamily, RegistryNumber};
use serde::Serialize;

/// Arguments for the `cpsrn parse` subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Registry number, e.g. 788346-26649-5-0001.
    pub number: String,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Decomposed registry number.
#[derive(Debug, Serialize)]
pub struct NumberReport {
    pub registry_number: RegistryNumber,
    pub provider_prefix: String,
    pub org_prefix: String,
    pub classification: u32,
    pub sequence: u16,
    pub family: Option<NumberingFamily>,
    pub category_tag: Option<CategoryTag>,
    /// Prior-issuance count that produced this number.
    pub ordinal: Option<u64>,
}

impl NumberReport {
    /// Locate `number` in the family catalogue.
    pub fn new(number: RegistryNumber) -> Self {
        let family = families()
            .into_iter()
            .find(|f| f.ordinal_of(&number).is_some());
        Self {
            provider_prefix: number.prefix().provider().to_string(),
            org_prefix: number.prefix().org().to_string(),
            classification: number.classification(),
            sequence: number.sequence(),
            category_tag: family.as_ref().map(CategoryTag::for_family),
            ordinal: family.as_ref().and_then(|f| f.ordinal_of(&number)),
            family,
            registry_number: number,
        }
    }
}

impl std::fmt::Display for NumberReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "registry number: {}", self.registry_number)?;
        writeln!(f, "provider prefix: {}", self.provider_prefix)?;
        writeln!(f, "org prefix:      {}", self.org_prefix)?;
        writeln!(f, "classification:  {}", self.classification)?;
        writeln!(f, "sequence:        {:04}", self.sequence)?;
        match (&self.family, &self.category_tag, self.ordinal) {
            (Some(family), Some(tag), Some(ordinal)) => {
                writeln!(f, "family:          {}", family.kind)?;
                writeln!(f, "category tag:    {tag}")?;
                write!(f, "ordinal:         {ordinal}")
            }
            _ => write!(f, "family:          none"),
        }
    }
}

/// Execute the parse subcommand.
pub fn run_parse(args: &ParseArgs) -> Result<u8> {
    let number: RegistryNumber = args
        .number
        .parse()
        .with_context(|| format!("not a registry number: {}", args.number))?;
    let report = NumberReport::new(number);
    if report.family.is_none() {
        tracing::warn!(classification = report.classification, "classification outside every family");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(s: &str) -> NumberReport {
        NumberReport::new(s.parse().unwrap())
    }

    #[test]
    fn locates_grading_rollover() {
        let r = report("788346-26649-6-0001");
        assert_eq!(r.family.unwrap().base_classification, 5);
        assert_eq!(r.category_tag.unwrap().as_str(), "5-0001");
        assert_eq!(r.ordinal, Some(9999));
    }

    #[test]
    fn locates_special_collection() {
        let r = report("788346-26649-2-0042");
        assert_eq!(
            r.family.unwrap().kind,
            cpsrn_core::FamilyKind::SpecialCollection { code: 3 }
        );
        assert_eq!(r.ordinal, Some(41));
    }

    #[test]
    fn classification_outside_catalogue_has_no_family() {
        let r = report("788346-26649-15-0001");
        assert!(r.family.is_none());
        assert!(r.to_string().ends_with("family:          none"));
    }
}
