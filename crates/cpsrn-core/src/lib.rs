//! # cpsrn-core: Registry Number Primitives
//!
//! Pure building blocks of registry number (CPSRN) issuance. Every accepted
//! submission is assigned a permanent identifier of the form
//! `788346-26649-{classification}-{sequence:04}`, allocated from a fixed set
//! of numbering families that each own one or more 9999-slot buckets.
//!
//! ## Pipeline
//!
//! ```text
//! IssuanceRequest ──▶ resolve_family ──▶ NumberingFamily
//!        │                                    │
//!        ▼                                    ▼
//!     classify ──▶ CategoryTag        generate(count) ──▶ RegistryNumber
//! ```
//!
//! Nothing in this crate holds state between calls. The prior-issuance count
//! that drives [`generate`] is supplied by the caller; `cpsrn-issuance` is
//! responsible for obtaining it inside a critical section.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cpsrn-*` crates (this is the leaf of the DAG).
//! - No I/O, no async, no `unsafe`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod classify;
pub mod error;
pub mod family;
pub mod request;
pub mod sequence;

pub use classify::{classify, CategoryTag};
pub use error::IssuanceError;
pub use family::{families, resolve_family, FamilyKind, NumberingFamily, BUCKET_CAPACITY};
pub use request::{CollectionSelector, IssuanceRequest, ServiceTier, SubmitterRole};
pub use sequence::{generate, generate_with_prefix, RegistryNumber, RegistryPrefix};
