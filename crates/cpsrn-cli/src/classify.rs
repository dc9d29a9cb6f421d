//! # Classify Subcommand
//!
//! Prints the category tag a request would be filed under. Permission is not
//! checked, matching the library.

use anyhow::Result;
use clap::Args;

use crate::args::RequestArgs;

/// Arguments for the `cpsrn classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

/// Execute the classify subcommand.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    let request = args.request.to_request()?;
    let tag = cpsrn_core::classify(&request)?;
    println!("{tag}");
    Ok(0)
}
