//! # cpsrn CLI entry point
//!
//! Parses command-line arguments, resolves issuance settings, and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cpsrn_issuance::{IssuanceConfig, LockScope};
use tracing_subscriber::EnvFilter;

use cpsrn_cli::classify::{run_classify, ClassifyArgs};
use cpsrn_cli::families::{run_families, FamiliesArgs};
use cpsrn_cli::generate::{run_generate, GenerateArgs};
use cpsrn_cli::issue::{run_issue, IssueArgs};
use cpsrn_cli::parse::{run_parse, ParseArgs};

/// Registry number issuance.
///
/// Classifies submissions into numbering families and issues sequential
/// registry numbers of the form PROVIDER-ORG-CLASSIFICATION-SEQUENCE.
#[derive(Parser, Debug)]
#[command(name = "cpsrn", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Provider prefix (overrides config and environment).
    #[arg(long, global = true)]
    provider_prefix: Option<String>,

    /// Organisation prefix (overrides config and environment).
    #[arg(long, global = true)]
    org_prefix: Option<String>,

    /// Issuance lock granularity: global or per_category.
    #[arg(long, global = true)]
    lock_scope: Option<LockScope>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every numbering family.
    Families(FamiliesArgs),

    /// Print the category tag for a request.
    Classify(ClassifyArgs),

    /// Compute a registry number from an explicit prior-issuance count.
    Generate(GenerateArgs),

    /// Issue registry numbers and persist the submissions.
    Issue(IssueArgs),

    /// Validate and decompose a registry number.
    Parse(ParseArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("cpsrn CLI v{} starting", env!("CARGO_PKG_VERSION"));

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(cli: Cli) -> Result<u8> {
    match &cli.command {
        Commands::Families(args) => run_families(args),
        Commands::Classify(args) => run_classify(args),
        Commands::Parse(args) => run_parse(args),
        Commands::Generate(args) => run_generate(args, &resolve_config(&cli)?.prefix()?),
        Commands::Issue(args) => run_issue(args, &resolve_config(&cli)?),
    }
}

/// Flags over YAML file over environment over defaults.
fn resolve_config(cli: &Cli) -> Result<IssuanceConfig> {
    let mut config = IssuanceConfig::load(cli.config.as_deref())?;
    if let Some(provider) = &cli.provider_prefix {
        config.provider_prefix = provider.clone();
    }
    if let Some(org) = &cli.org_prefix {
        config.org_prefix = org.clone();
    }
    if let Some(scope) = cli.lock_scope {
        config.lock_scope = scope;
    }
    // Flag values have not been validated yet.
    config.prefix()?;
    tracing::debug!(
        provider_prefix = %config.provider_prefix,
        org_prefix = %config.org_prefix,
        lock_scope = %config.lock_scope,
        "resolved issuance config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpsrn_core::{ServiceTier, SubmitterRole};

    #[test]
    fn cli_parse_families() {
        let cli = Cli::try_parse_from(["cpsrn", "families", "--json"]).unwrap();
        if let Commands::Families(args) = cli.command {
            assert!(args.json);
        } else {
            panic!("expected families");
        }
    }

    #[test]
    fn cli_parse_classify_defaults() {
        let cli = Cli::try_parse_from(["cpsrn", "classify", "--selector", "3"]).unwrap();
        if let Commands::Classify(args) = cli.command {
            assert_eq!(args.request.selector, 3);
            assert_eq!(args.request.tier, ServiceTier::Unspecified);
            assert_eq!(args.request.role, SubmitterRole::Customer);
        } else {
            panic!("expected classify");
        }
    }

    #[test]
    fn cli_parse_tier_by_name_or_code() {
        let by_name =
            Cli::try_parse_from(["cpsrn", "classify", "--tier", "pedigree"]).unwrap();
        let by_code = Cli::try_parse_from(["cpsrn", "classify", "--tier", "4"]).unwrap();
        match (by_name.command, by_code.command) {
            (Commands::Classify(a), Commands::Classify(b)) => {
                assert_eq!(a.request.tier, ServiceTier::Pedigree);
                assert_eq!(b.request.tier, ServiceTier::Pedigree);
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn cli_parse_unknown_tier_rejected() {
        assert!(Cli::try_parse_from(["cpsrn", "classify", "--tier", "platinum"]).is_err());
    }

    #[test]
    fn cli_parse_generate_negative_count() {
        let cli = Cli::try_parse_from([
            "cpsrn", "generate", "--tier", "you_grade", "--count", "-1",
        ])
        .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.count, -1);
        } else {
            panic!("expected generate");
        }
    }

    #[test]
    fn cli_parse_generate_requires_count() {
        assert!(Cli::try_parse_from(["cpsrn", "generate", "--tier", "pedigree"]).is_err());
    }

    #[test]
    fn cli_parse_issue_options() {
        let cli = Cli::try_parse_from([
            "cpsrn",
            "issue",
            "--tier",
            "indie_mint_gem",
            "--role",
            "root",
            "--times",
            "5",
            "--concurrent",
            "--json",
        ])
        .unwrap();
        if let Commands::Issue(args) = cli.command {
            assert_eq!(args.request.tier, ServiceTier::IndieMintGem);
            assert_eq!(args.request.role, SubmitterRole::Root);
            assert_eq!(args.times, 5);
            assert!(args.concurrent);
            assert!(args.json);
            assert!(!args.preview);
        } else {
            panic!("expected issue");
        }
    }

    #[test]
    fn cli_parse_preview_conflicts_with_times() {
        assert!(Cli::try_parse_from([
            "cpsrn", "issue", "--tier", "pedigree", "--preview", "--times", "2",
        ])
        .is_err());
    }

    #[test]
    fn cli_parse_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cpsrn",
            "issue",
            "--tier",
            "pedigree",
            "--lock-scope",
            "global",
            "--provider-prefix",
            "123",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.lock_scope, Some(LockScope::Global));
        assert_eq!(cli.provider_prefix.as_deref(), Some("123"));
    }

    #[test]
    fn cli_parse_unknown_lock_scope_rejected() {
        assert!(Cli::try_parse_from(["cpsrn", "families", "--lock-scope", "row"]).is_err());
    }

    #[test]
    fn cli_parse_parse_number() {
        let cli = Cli::try_parse_from(["cpsrn", "parse", "788346-26649-5-0001"]).unwrap();
        if let Commands::Parse(args) = cli.command {
            assert_eq!(args.number, "788346-26649-5-0001");
        } else {
            panic!("expected parse");
        }
    }

    #[test]
    fn flag_prefix_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpsrn.yaml");
        std::fs::write(&path, "provider_prefix: \"111\"\norg_prefix: \"222\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "cpsrn",
            "--config",
            path.to_str().unwrap(),
            "--org-prefix",
            "999",
            "families",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.provider_prefix, "111");
        assert_eq!(config.org_prefix, "999");
    }

    #[test]
    fn invalid_flag_prefix_rejected() {
        let cli =
            Cli::try_parse_from(["cpsrn", "--provider-prefix", "ab-1", "families"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}
