//! # Error Types
//!
//! The four ways an issuance can be refused. None of them is retryable:
//! each is either a permanent defect of the request or a permanent
//! exhaustion of a numbering family.

use thiserror::Error;

use crate::request::SubmitterRole;

/// Rejection reasons produced by family resolution and sequence generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// The request matches no known numbering family.
    #[error("unsupported numbering family: {0}")]
    UnsupportedFamily(String),

    /// The resolved family is restricted to the privileged role.
    #[error("permission denied: {family} numbering requires the {required} role, submitter is {role}")]
    PermissionDenied {
        /// Category tag of the restricted family.
        family: String,
        /// Role of the submitter.
        role: SubmitterRole,
        /// Role the family requires.
        required: SubmitterRole,
    },

    /// Every bucket of the family has been consumed.
    #[error("capacity exceeded: family {family} holds {capacity} registry numbers, {count} already issued")]
    CapacityExceeded {
        /// Category tag of the exhausted family.
        family: String,
        /// Total slots across all buckets.
        capacity: u64,
        /// Prior-issuance count that overflowed.
        count: i64,
    },

    /// Broken caller or store contract, e.g. a negative count.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
