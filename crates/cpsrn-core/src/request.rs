//! # Issuance Request Vocabulary
//!
//! The triple the submission workflow hands to the issuance engine:
//! a special-collection selector, a service tier, and the submitter's role.
//!
//! Service tiers and roles carry stable numeric codes because that is how
//! they arrive from the intake layer and how they are persisted. Unknown
//! tier codes are an [`IssuanceError::UnsupportedFamily`]; unknown role codes
//! are an [`IssuanceError::InvalidInput`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IssuanceError;

// ─── Collection Selector ─────────────────────────────────────────────

/// Special-collection code: `0` for none, `1..=5` for a collection that
/// owns a private numbering bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct CollectionSelector(u8);

impl CollectionSelector {
    /// No special collection; numbering follows the service tier.
    pub const NONE: Self = Self(0);

    /// Highest special-collection code.
    pub const MAX_CODE: u8 = 5;

    /// Validate a raw selector code.
    pub fn new(code: u8) -> Result<Self, IssuanceError> {
        if code > Self::MAX_CODE {
            return Err(IssuanceError::UnsupportedFamily(format!(
                "collection selector {code} is outside 0..={}",
                Self::MAX_CODE
            )));
        }
        Ok(Self(code))
    }

    /// The raw selector code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// Whether no special collection was selected.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for CollectionSelector {
    type Error = IssuanceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<CollectionSelector> for u8 {
    fn from(selector: CollectionSelector) -> Self {
        selector.0
    }
}

impl std::fmt::Display for CollectionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Service Tier ────────────────────────────────────────────────────

/// Service type requested by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ServiceTier {
    /// No tier chosen. Only valid together with a special collection.
    Unspecified = 0,
    /// Standard grading.
    YouGrade = 1,
    /// Signature collection grading.
    SignatureCollection = 2,
    /// Indie mint gem grading; restricted to the privileged role.
    IndieMintGem = 3,
    /// Pedigree registration.
    Pedigree = 4,
    /// Pre-screening.
    PreScreening = 5,
}

impl ServiceTier {
    /// All tiers in code order.
    pub fn all() -> &'static [ServiceTier] {
        &[
            Self::Unspecified,
            Self::YouGrade,
            Self::SignatureCollection,
            Self::IndieMintGem,
            Self::Pedigree,
            Self::PreScreening,
        ]
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Result<Self, IssuanceError> {
        Self::all()
            .iter()
            .copied()
            .find(|tier| tier.code() == code)
            .ok_or_else(|| IssuanceError::UnsupportedFamily(format!("unknown service tier code {code}")))
    }

    /// The wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The snake_case identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::YouGrade => "you_grade",
            Self::SignatureCollection => "signature_collection",
            Self::IndieMintGem => "indie_mint_gem",
            Self::Pedigree => "pedigree",
            Self::PreScreening => "pre_screening",
        }
    }
}

impl std::fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceTier {
    type Err = IssuanceError;

    /// Accepts either the snake_case identifier or the numeric wire code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        Self::all()
            .iter()
            .copied()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| IssuanceError::UnsupportedFamily(format!("unknown service tier: {s:?}")))
    }
}

// ─── Submitter Role ──────────────────────────────────────────────────

/// Role of the account creating the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SubmitterRole {
    /// Regular customer account.
    Customer = 0,
    /// Privileged operator account.
    Root = 1,
}

impl SubmitterRole {
    /// All roles in code order.
    pub fn all() -> &'static [SubmitterRole] {
        &[Self::Customer, Self::Root]
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Result<Self, IssuanceError> {
        match code {
            0 => Ok(Self::Customer),
            1 => Ok(Self::Root),
            other => Err(IssuanceError::InvalidInput(format!(
                "unknown submitter role code {other}"
            ))),
        }
    }

    /// The wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this role may allocate from restricted families.
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Root)
    }

    /// The snake_case identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Root => "root",
        }
    }
}

impl std::fmt::Display for SubmitterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmitterRole {
    type Err = IssuanceError;

    /// Accepts either the snake_case identifier or the numeric wire code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        match s {
            "customer" => Ok(Self::Customer),
            "root" => Ok(Self::Root),
            other => Err(IssuanceError::InvalidInput(format!(
                "unknown submitter role: {other:?}"
            ))),
        }
    }
}

// ─── Request ─────────────────────────────────────────────────────────

/// A classified submission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuanceRequest {
    /// Special collection, if any.
    pub collection_selector: CollectionSelector,
    /// Requested service tier.
    pub service_tier: ServiceTier,
    /// Role of the submitter.
    pub submitter_role: SubmitterRole,
}

impl IssuanceRequest {
    /// Build a request from typed parts.
    pub fn new(
        collection_selector: CollectionSelector,
        service_tier: ServiceTier,
        submitter_role: SubmitterRole,
    ) -> Self {
        Self {
            collection_selector,
            service_tier,
            submitter_role,
        }
    }

    /// Build a request from raw wire codes.
    pub fn from_codes(selector: u8, tier: u8, role: u8) -> Result<Self, IssuanceError> {
        Ok(Self::new(
            CollectionSelector::new(selector)?,
            ServiceTier::from_code(tier)?,
            SubmitterRole::from_code(role)?,
        ))
    }
}

impl std::fmt::Display for IssuanceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "selector={} tier={} role={}",
            self.collection_selector, self.service_tier, self.submitter_role
        )
    }
}
