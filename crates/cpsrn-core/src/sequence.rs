//! # Sequence Generation
//!
//! Turns a prior-issuance count into a registry number.
//!
//! ```text
//! bucket_offset  = count / 9999          (must be < bucket_count)
//! classification = base + bucket_offset
//! sequence       = count % 9999 + 1      (1..=9999)
//! ```
//!
//! The textual form is `{provider}-{org}-{classification}-{sequence:04}`:
//! the classification carries no leading zeros and the sequence is always
//! exactly four digits. Both directions are implemented so persisted numbers
//! can be read back and verified.
//!
//! The count is an `i64` because that is what a store's `COUNT(*)` yields.
//! A negative count is a broken store contract and is rejected rather than
//! wrapped.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::classify::CategoryTag;
use crate::error::IssuanceError;
use crate::family::{resolve_family, BUCKET_CAPACITY};
use crate::request::{IssuanceRequest, SubmitterRole};

// ─── Prefix ──────────────────────────────────────────────────────────

/// Issuer prefix: the provider and organisation fields of every number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryPrefix {
    provider: String,
    org: String,
}

impl RegistryPrefix {
    /// Provider field of the production prefix.
    pub const DEFAULT_PROVIDER: &'static str = "788346";
    /// Organisation field of the production prefix.
    pub const DEFAULT_ORG: &'static str = "26649";

    /// Build a prefix. Both fields must be non-empty ASCII digit strings.
    pub fn new(provider: impl Into<String>, org: impl Into<String>) -> Result<Self, IssuanceError> {
        let provider = provider.into();
        let org = org.into();
        for (name, value) in [("provider", &provider), ("org", &org)] {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(IssuanceError::InvalidInput(format!(
                    "{name} prefix must be a non-empty digit string, got {value:?}"
                )));
            }
        }
        Ok(Self { provider, org })
    }

    /// Provider field.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Organisation field.
    pub fn org(&self) -> &str {
        &self.org
    }
}

impl Default for RegistryPrefix {
    fn default() -> Self {
        Self {
            provider: Self::DEFAULT_PROVIDER.to_string(),
            org: Self::DEFAULT_ORG.to_string(),
        }
    }
}

impl std::fmt::Display for RegistryPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.provider, self.org)
    }
}

// ─── Registry Number ─────────────────────────────────────────────────

/// An issued registry number.
///
/// Ordering is by prefix, then classification, then sequence, which is
/// issuance order within a family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryNumber {
    prefix: RegistryPrefix,
    classification: u32,
    sequence: u16,
}

impl RegistryNumber {
    /// Issuer prefix.
    pub fn prefix(&self) -> &RegistryPrefix {
        &self.prefix
    }

    /// Effective classification after bucket rollover.
    pub fn classification(&self) -> u32 {
        self.classification
    }

    /// Sequence within the bucket, `1..=9999`.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }
}

impl std::fmt::Display for RegistryNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:04}",
            self.prefix, self.classification, self.sequence
        )
    }
}

impl FromStr for RegistryNumber {
    type Err = IssuanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| IssuanceError::InvalidInput(format!("{why}: {s:?}"));

        let parts: Vec<&str> = s.split('-').collect();
        let [provider, org, classification, sequence] = parts.as_slice() else {
            return Err(invalid("registry number must have four hyphen-separated fields"));
        };

        let prefix = RegistryPrefix::new(*provider, *org)?;

        let canonical = !classification.is_empty()
            && classification.bytes().all(|b| b.is_ascii_digit())
            && (*classification == "0" || !classification.starts_with('0'));
        if !canonical {
            return Err(invalid("classification must be an integer without leading zeros"));
        }
        let classification: u32 = classification
            .parse()
            .map_err(|_| invalid("classification out of range"))?;

        if sequence.len() != 4 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be exactly four digits"));
        }
        let sequence: u16 = sequence
            .parse()
            .map_err(|_| invalid("sequence out of range"))?;
        if sequence == 0 || u32::from(sequence) > BUCKET_CAPACITY {
            return Err(invalid("sequence must be within 0001..=9999"));
        }

        Ok(Self {
            prefix,
            classification,
            sequence,
        })
    }
}

impl TryFrom<String> for RegistryNumber {
    type Error = IssuanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegistryNumber> for String {
    fn from(number: RegistryNumber) -> Self {
        number.to_string()
    }
}

// ─── Generation ──────────────────────────────────────────────────────

/// Registry number for `request` under the default prefix.
pub fn generate(request: &IssuanceRequest, prior_count: i64) -> Result<RegistryNumber, IssuanceError> {
    generate_with_prefix(request, prior_count, &RegistryPrefix::default())
}

/// Registry number for `request` given `prior_count` earlier issuances
/// sharing its category tag.
///
/// Checks run in a fixed order so that a permission failure is never masked
/// by a count or capacity failure: family resolution, role, count sign,
/// capacity.
pub fn generate_with_prefix(
    request: &IssuanceRequest,
    prior_count: i64,
    prefix: &RegistryPrefix,
) -> Result<RegistryNumber, IssuanceError> {
    let family = resolve_family(request)?;

    if family.requires_elevated_role && !request.submitter_role.is_privileged() {
        return Err(IssuanceError::PermissionDenied {
            family: CategoryTag::for_family(&family).to_string(),
            role: request.submitter_role,
            required: SubmitterRole::Root,
        });
    }

    let count = u64::try_from(prior_count).map_err(|_| {
        IssuanceError::InvalidInput(format!(
            "prior issuance count must be non-negative, got {prior_count}"
        ))
    })?;

    let bucket_offset = count / u64::from(BUCKET_CAPACITY);
    if bucket_offset >= u64::from(family.bucket_count) {
        return Err(IssuanceError::CapacityExceeded {
            family: CategoryTag::for_family(&family).to_string(),
            capacity: family.capacity(),
            count: prior_count,
        });
    }

    // bucket_offset < bucket_count and the remainder < 9999, so both narrow.
    let classification = family.base_classification + bucket_offset as u32;
    let sequence = (count % u64::from(BUCKET_CAPACITY) + 1) as u16;

    Ok(RegistryNumber {
        prefix: prefix.clone(),
        classification,
        sequence,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::family::NumberingFamily;
    use crate::request::{CollectionSelector, ServiceTier};
    use proptest::prelude::*;

    fn any_request() -> impl Strategy<Value = IssuanceRequest> {
        (0u8..=5, 0u8..=5, 0u8..=1)
            .prop_map(|(s, t, r)| IssuanceRequest::from_codes(s, t, r).unwrap())
    }

    fn family_of(req: &IssuanceRequest) -> Option<NumberingFamily> {
        resolve_family(req).ok()
    }

    proptest! {
        /// Capacity fails exactly when the bucket offset reaches the bucket count.
        #[test]
        fn capacity_boundary(req in any_request(), count in 0i64..200_000) {
            prop_assume!(family_of(&req).is_some());
            let family = family_of(&req).unwrap();
            prop_assume!(!family.requires_elevated_role || req.submitter_role.is_privileged());

            let exhausted = (count as u64) / u64::from(BUCKET_CAPACITY) >= u64::from(family.bucket_count);
            match generate(&req, count) {
                Ok(_) => prop_assert!(!exhausted),
                Err(IssuanceError::CapacityExceeded { .. }) => prop_assert!(exhausted),
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        /// Consecutive counts yield consecutive numbers.
        #[test]
        fn successor_is_next_slot(count in 0i64..59_993) {
            let req = IssuanceRequest::new(
                CollectionSelector::NONE,
                ServiceTier::SignatureCollection,
                SubmitterRole::Customer,
            );
            let a = generate(&req, count).unwrap();
            let b = generate(&req, count + 1).unwrap();
            prop_assert!(a < b);
            if b.sequence() == 1 {
                prop_assert_eq!(a.sequence(), 9999);
                prop_assert_eq!(b.classification(), a.classification() + 1);
            } else {
                prop_assert_eq!(b.sequence(), a.sequence() + 1);
                prop_assert_eq!(b.classification(), a.classification());
            }
        }

        /// Every in-bounds number has one canonical classification field and a 4-digit sequence.
        #[test]
        fn textual_form_is_canonical(req in any_request(), count in 0i64..59_994) {
            if let Ok(n) = generate(&req, count) {
                let text = n.to_string();
                let fields: Vec<&str> = text.split('-').collect();
                prop_assert_eq!(fields.len(), 4);
                prop_assert!(fields[2] == "0" || !fields[2].starts_with('0'));
                prop_assert_eq!(fields[3].len(), 4);
                prop_assert!(fields[3].bytes().all(|b| b.is_ascii_digit()));
                let reparsed: RegistryNumber = text.parse().unwrap();
                prop_assert_eq!(reparsed, n);
            }
        }

        /// Non-privileged submitters never allocate from restricted families.
        #[test]
        fn permission_gate_holds_at_any_count(count in any::<i64>()) {
            let req = IssuanceRequest::new(
                CollectionSelector::NONE,
                ServiceTier::IndieMintGem,
                SubmitterRole::Customer,
            );
            let is_denied = matches!(generate(&req, count), Err(IssuanceError::PermissionDenied { .. }));
            prop_assert!(is_denied);
        }
    }
}
