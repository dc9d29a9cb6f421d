//! # cpsrn-issuance: Registry Number Issuance
//!
//! Wraps the pure generator from `cpsrn-core` in the protocol that makes
//! count-derived numbering safe under concurrent callers:
//!
//! ```text
//! Idle ──lock──▶ Issuing: classify → count(tag) → generate → persist ──unlock──▶ Idle
//! ```
//!
//! The next sequence is derived from a *count* of persisted records, not an
//! atomic counter, so the read-count / write-record pair must be serialized.
//! [`IssuanceCoordinator`] holds an async mutex across that pair; by default
//! there is one mutex per category tag, so unrelated families never contend.
//!
//! ## Stores
//!
//! - [`InMemorySubmissionStore`]: `parking_lot`-guarded, for tests and
//!   single-process deployments.
//! - `PgSubmissionStore` (feature `postgres`): SQLx over a `PgPool`.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod record;
pub mod store;

pub use config::IssuanceConfig;
pub use coordinator::{IssuanceCoordinator, LockScope};
pub use error::{ConfigError, CoordinatorError, StoreError};
pub use memory::InMemorySubmissionStore;
#[cfg(feature = "postgres")]
pub use postgres::PgSubmissionStore;
pub use record::{SubmissionId, SubmissionRecord};
pub use store::SubmissionStore;
