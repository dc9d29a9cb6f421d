//! # Error Types
//!
//! Store failures, coordinator failures, and configuration failures.
//! Generator rejections come from `cpsrn-core` as [`IssuanceError`] and are
//! wrapped unchanged.

use std::path::PathBuf;

use cpsrn_core::IssuanceError;
use thiserror::Error;

/// Failure reported by a [`crate::SubmissionStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or returned an error.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A record with the same registry number or id already exists.
    #[error("store conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back to a record.
    #[error("store serialization error: {0}")]
    Serialization(String),
}

/// Failure of [`crate::IssuanceCoordinator::issue`].
///
/// Whatever the variant, no record was persisted.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The generator refused the request.
    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    /// The store failed while counting or persisting.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoordinatorError {
    /// Whether repeating the same request could succeed.
    ///
    /// Only transient backend failures qualify. Generator rejections and
    /// conflicts are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Backend(_)))
    }

    /// The generator rejection, if that is what this is.
    pub fn as_issuance(&self) -> Option<&IssuanceError> {
        match self {
            Self::Issuance(e) => Some(e),
            Self::Store(_) => None,
        }
    }
}

/// Failure while loading [`crate::IssuanceConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value was present but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_backend_errors_are_retryable() {
        assert!(CoordinatorError::from(StoreError::Backend("timeout".into())).is_retryable());
        assert!(!CoordinatorError::from(StoreError::Conflict("dup".into())).is_retryable());
        assert!(
            !CoordinatorError::from(IssuanceError::InvalidInput("negative".into())).is_retryable()
        );
    }

    #[test]
    fn issuance_errors_display_transparently() {
        let err = CoordinatorError::from(IssuanceError::UnsupportedFamily("tier 0".into()));
        assert_eq!(err.to_string(), "unsupported numbering family: tier 0");
        assert!(err.as_issuance().is_some());
    }
}
