//! # Generate Subcommand
//!
//! Computes a registry number from an explicit prior-issuance count without
//! touching any store. Useful for reconciling historical records.

use anyhow::Result;
use clap::Args;
use cpsrn_core::{generate_with_prefix, RegistryPrefix};

use crate::args::RequestArgs;

/// Arguments for the `cpsrn generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Number of registry numbers already issued under the request's category tag.
    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs, prefix: &RegistryPrefix) -> Result<u8> {
    let request = args.request.to_request()?;
    let number = generate_with_prefix(&request, args.count, prefix)?;
    println!("{number}");
    Ok(0)
}
