//! # Numbering Families
//!
//! A numbering family is a contiguous run of classification indices, each a
//! bucket of [`BUCKET_CAPACITY`] sequence slots. Families are fixed at
//! compile time; resolution is a `match` over the request triple.
//!
//! | Family | Selected by | Classifications | Capacity |
//! |--------|-------------|-----------------|----------|
//! | Special collection `n` | selector `n` (1..=5) | `n - 1` | 9 999 |
//! | Grading | `YouGrade`, `SignatureCollection`, `IndieMintGem` | 5..=10 | 59 994 |
//! | Pedigree | `Pedigree` | 11..=13 | 29 997 |
//! | Pre-screening | `PreScreening` | 14 | 9 999 |
//!
//! The three grading tiers share one family and therefore one counter.
//! `IndieMintGem` differs only in requiring the privileged role.

use serde::{Deserialize, Serialize};

use crate::error::IssuanceError;
use crate::request::{CollectionSelector, IssuanceRequest, ServiceTier, SubmitterRole};
use crate::sequence::RegistryNumber;

/// Sequence slots per classification bucket (sequences `1..=9999`).
pub const BUCKET_CAPACITY: u32 = 9999;

/// Which numbering scheme a family belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    /// Private bucket of a special collection.
    SpecialCollection {
        /// Selector code, 1..=5.
        code: u8,
    },
    /// Shared grading family.
    Grading,
    /// Pedigree family.
    Pedigree,
    /// Pre-screening family.
    PreScreening,
}

impl std::fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpecialCollection { code } => write!(f, "special_collection_{code}"),
            Self::Grading => f.write_str("grading"),
            Self::Pedigree => f.write_str("pedigree"),
            Self::PreScreening => f.write_str("pre_screening"),
        }
    }
}

/// A resolved numbering scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberingFamily {
    /// Which scheme this is.
    pub kind: FamilyKind,
    /// First classification index.
    pub base_classification: u32,
    /// Consecutive classifications the family may grow into.
    pub bucket_count: u32,
    /// Whether only the privileged role may allocate.
    pub requires_elevated_role: bool,
}

impl NumberingFamily {
    const fn new(kind: FamilyKind, base_classification: u32, bucket_count: u32) -> Self {
        Self {
            kind,
            base_classification,
            bucket_count,
            requires_elevated_role: false,
        }
    }

    /// Slots per bucket. Identical for every family.
    pub const fn bucket_capacity(&self) -> u32 {
        BUCKET_CAPACITY
    }

    /// Total registry numbers the family can ever issue.
    pub fn capacity(&self) -> u64 {
        u64::from(self.bucket_count) * u64::from(BUCKET_CAPACITY)
    }

    /// Highest classification index the family may reach.
    pub fn last_classification(&self) -> u32 {
        self.base_classification + self.bucket_count - 1
    }

    /// Position of `number` within this family, i.e. the prior-issuance
    /// count that produced it. `None` if the number lies outside the family.
    pub fn ordinal_of(&self, number: &RegistryNumber) -> Option<u64> {
        let classification = number.classification();
        if classification < self.base_classification
            || classification > self.last_classification()
        {
            return None;
        }
        let bucket = u64::from(classification - self.base_classification);
        Some(bucket * u64::from(BUCKET_CAPACITY) + u64::from(number.sequence()) - 1)
    }
}

/// Map a request to its numbering family.
///
/// Does not check role permission; the family records whether elevation is
/// required and [`crate::generate`] enforces it.
pub fn resolve_family(request: &IssuanceRequest) -> Result<NumberingFamily, IssuanceError> {
    let selector = request.collection_selector;
    if !selector.is_none() {
        let code = selector.code();
        return Ok(NumberingFamily::new(
            FamilyKind::SpecialCollection { code },
            u32::from(code) - 1,
            1,
        ));
    }

    match request.service_tier {
        ServiceTier::YouGrade | ServiceTier::SignatureCollection | ServiceTier::IndieMintGem => {
            Ok(NumberingFamily {
                requires_elevated_role: request.service_tier == ServiceTier::IndieMintGem,
                ..NumberingFamily::new(FamilyKind::Grading, 5, 6)
            })
        }
        ServiceTier::Pedigree => Ok(NumberingFamily::new(FamilyKind::Pedigree, 11, 3)),
        ServiceTier::PreScreening => Ok(NumberingFamily::new(FamilyKind::PreScreening, 14, 1)),
        ServiceTier::Unspecified => Err(IssuanceError::UnsupportedFamily(format!(
            "no numbering family for service tier {} without a special collection",
            request.service_tier
        ))),
    }
}

/// Every distinct family reachable from a valid request, ordered by base
/// classification. Grading appears twice: open and privileged.
pub fn families() -> Vec<NumberingFamily> {
    let mut out: Vec<NumberingFamily> = Vec::new();
    let requests = (1..=CollectionSelector::MAX_CODE)
        .filter_map(|code| CollectionSelector::new(code).ok())
        .map(|selector| {
            IssuanceRequest::new(selector, ServiceTier::Unspecified, SubmitterRole::Customer)
        })
        .chain(ServiceTier::all().iter().map(|tier| {
            IssuanceRequest::new(CollectionSelector::NONE, *tier, SubmitterRole::Customer)
        }));

    for request in requests {
        if let Ok(family) = resolve_family(&request) {
            if !out.contains(&family) {
                out.push(family);
            }
        }
    }
    out.sort_by_key(|f| (f.base_classification, f.requires_elevated_role));
    out
}
