//! # cpsrn-cli: Registry Number Command-Line Interface
//!
//! ## Subcommands
//!
//! - `families`: List every numbering family and its capacity.
//! - `classify`: Print the category tag for a request.
//! - `generate`: Compute a registry number from an explicit prior count.
//! - `issue`: Issue and persist registry numbers through the coordinator.
//! - `parse`: Validate a registry number and locate it in its family.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; numbering rules live in `cpsrn-core`.
//! - Handlers return an exit code; errors propagate as `anyhow::Error`.

pub mod args;
pub mod classify;
pub mod families;
pub mod generate;
pub mod issue;
pub mod parse;
