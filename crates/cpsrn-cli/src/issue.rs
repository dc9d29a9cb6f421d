//! # Issue Subcommand
//!
//! Issues registry numbers through an [`IssuanceCoordinator`].
//!
//! With the `postgres` feature and `DATABASE_URL` set, records are persisted
//! to PostgreSQL. Otherwise an in-memory store is used and nothing outlives
//! the process.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use cpsrn_core::IssuanceRequest;
use cpsrn_issuance::{
    InMemorySubmissionStore, IssuanceConfig, IssuanceCoordinator, SubmissionRecord,
    SubmissionStore,
};
use tokio::task::JoinSet;

use crate::args::RequestArgs;

/// Arguments for the `cpsrn issue` subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Number of submissions to issue.
    #[arg(long, default_value_t = 1)]
    pub times: u32,

    /// Issue all submissions concurrently instead of one after another.
    #[arg(long)]
    pub concurrent: bool,

    /// Show the next number without issuing anything.
    #[arg(long, conflicts_with_all = ["times", "concurrent"])]
    pub preview: bool,

    /// Emit each record as a JSON line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the issue subcommand.
pub fn run_issue(args: &IssueArgs, config: &IssuanceConfig) -> Result<u8> {
    let request = args.request.to_request()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        #[cfg(feature = "postgres")]
        if let Ok(url) = std::env::var("DATABASE_URL") {
            let store = cpsrn_issuance::PgSubmissionStore::connect(&url)
                .await
                .context("failed to connect to PostgreSQL")?;
            return execute(Arc::new(store), request, args, config).await;
        }

        tracing::warn!("issuing against an in-memory store; records are not persisted");
        execute(Arc::new(InMemorySubmissionStore::new()), request, args, config).await
    })
}

async fn execute<S: SubmissionStore + 'static>(
    store: Arc<S>,
    request: IssuanceRequest,
    args: &IssueArgs,
    config: &IssuanceConfig,
) -> Result<u8> {
    let coordinator = Arc::new(IssuanceCoordinator::from_config(store, config)?);

    if args.preview {
        let number = coordinator.preview(&request).await?;
        println!("{number}");
        return Ok(0);
    }

    let records = if args.concurrent {
        issue_concurrently(&coordinator, request, args.times).await?
    } else {
        issue_sequentially(&coordinator, request, args.times).await?
    };
    for record in &records {
        println!("{}", render_record(record, args.json)?);
    }
    Ok(0)
}

/// Issue `times` numbers one after another, stopping at the first failure.
pub async fn issue_sequentially<S: SubmissionStore>(
    coordinator: &IssuanceCoordinator<S>,
    request: IssuanceRequest,
    times: u32,
) -> Result<Vec<SubmissionRecord>> {
    let mut records = Vec::with_capacity(times as usize);
    for n in 0..times {
        let record = coordinator
            .issue(&request)
            .await
            .with_context(|| format!("issuance {} of {times} failed", n + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Issue `times` numbers from concurrent tasks. Returns records in number
/// order, or the first failure once every task has finished.
pub async fn issue_concurrently<S: SubmissionStore + 'static>(
    coordinator: &Arc<IssuanceCoordinator<S>>,
    request: IssuanceRequest,
    times: u32,
) -> Result<Vec<SubmissionRecord>> {
    let mut tasks = JoinSet::new();
    for _ in 0..times {
        let coordinator = Arc::clone(coordinator);
        tasks.spawn(async move { coordinator.issue(&request).await });
    }

    let mut records = Vec::with_capacity(times as usize);
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("issuance task panicked")? {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::error!(error = %e, "concurrent issuance failed");
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e).context(format!(
            "{} of {times} concurrent issuances failed",
            times as usize - records.len()
        ));
    }
    records.sort_by(|a, b| a.registry_number.cmp(&b.registry_number));
    Ok(records)
}

fn render_record(record: &SubmissionRecord, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(record)?);
    }
    Ok(format!(
        "{}\t{}\t{}",
        record.registry_number, record.category_tag, record.id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpsrn_core::{CollectionSelector, ServiceTier, SubmitterRole};

    fn pedigree() -> IssuanceRequest {
        IssuanceRequest::new(
            CollectionSelector::NONE,
            ServiceTier::Pedigree,
            SubmitterRole::Customer,
        )
    }

    #[tokio::test]
    async fn sequential_issuance_counts_up() {
        let coordinator = IssuanceCoordinator::new(Arc::new(InMemorySubmissionStore::new()));
        let records = issue_sequentially(&coordinator, pedigree(), 3).await.unwrap();
        let numbers: Vec<String> = records
            .iter()
            .map(|r| r.registry_number.to_string())
            .collect();
        assert_eq!(
            numbers,
            ["788346-26649-11-0001", "788346-26649-11-0002", "788346-26649-11-0003"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_issuance_returns_sorted_distinct_numbers() {
        let coordinator =
            Arc::new(IssuanceCoordinator::new(Arc::new(InMemorySubmissionStore::new())));
        let records = issue_concurrently(&coordinator, pedigree(), 25).await.unwrap();
        let sequences: Vec<u16> = records.iter().map(|r| r.registry_number.sequence()).collect();
        assert_eq!(sequences, (1..=25).collect::<Vec<u16>>());
    }

    #[tokio::test]
    async fn sequential_issuance_reports_which_call_failed() {
        let coordinator = IssuanceCoordinator::new(Arc::new(InMemorySubmissionStore::new()));
        let denied = IssuanceRequest::new(
            CollectionSelector::NONE,
            ServiceTier::IndieMintGem,
            SubmitterRole::Customer,
        );
        let err = issue_sequentially(&coordinator, denied, 2).await.unwrap_err();
        assert!(format!("{err:#}").contains("issuance 1 of 2 failed"));
        assert!(coordinator.store().is_empty());
    }

    #[test]
    fn text_record_is_tab_separated() {
        let request = pedigree();
        let record = SubmissionRecord::new(
            request,
            cpsrn_core::classify(&request).unwrap(),
            cpsrn_core::generate(&request, 0).unwrap(),
        );
        let line = render_record(&record, false).unwrap();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[0], "788346-26649-11-0001");
        assert_eq!(fields[1], "11-0001");
        assert!(fields[2].starts_with("submission:"));

        let json: serde_json::Value =
            serde_json::from_str(&render_record(&record, true).unwrap()).unwrap();
        assert_eq!(json["registry_number"], "788346-26649-11-0001");
    }
}
