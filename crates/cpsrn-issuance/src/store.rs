//! # Submission Store Contract
//!
//! The two operations issuance needs from durable storage.
//!
//! # Invariants
//! - `count_by_category_tag` observes every `persist` that completed before
//!   the caller acquired its issuance lock.
//! - `persist` is durable on return and visible to later counts.
//! - Records are only added, never removed, so counts never decrease.

use std::future::Future;

use cpsrn_core::CategoryTag;

use crate::error::StoreError;
use crate::record::SubmissionRecord;

/// Storage collaborator of [`crate::IssuanceCoordinator`].
pub trait SubmissionStore: Send + Sync {
    /// Number of persisted submissions whose category tag equals `tag`.
    fn count_by_category_tag(
        &self,
        tag: &CategoryTag,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Durably store `record`.
    ///
    /// Must fail with [`StoreError::Conflict`] rather than overwrite if the
    /// registry number is already taken.
    fn persist(
        &self,
        record: &SubmissionRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
