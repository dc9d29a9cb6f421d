//! # Submission Records
//!
//! The unit persisted by an issuance: the classified request together with
//! its category tag and registry number. Both are fixed at creation and
//! never recomputed.

use chrono::{DateTime, Utc};
use cpsrn_core::{CategoryTag, IssuanceRequest, RegistryNumber};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    /// Generate a new random submission identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "submission:{}", self.0)
    }
}

/// A persisted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub request: IssuanceRequest,
    pub category_tag: CategoryTag,
    pub registry_number: RegistryNumber,
    pub issued_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Assemble a fresh record stamped with the current time.
    pub fn new(
        request: IssuanceRequest,
        category_tag: CategoryTag,
        registry_number: RegistryNumber,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            request,
            category_tag,
            registry_number,
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpsrn_core::{classify, generate};

    #[test]
    fn record_serializes_numbers_as_text() {
        let request = IssuanceRequest::from_codes(0, 4, 1).unwrap();
        let record = SubmissionRecord::new(
            request,
            classify(&request).unwrap(),
            generate(&request, 0).unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category_tag"], "11-0001");
        assert_eq!(json["registry_number"], "788346-26649-11-0001");
        assert_eq!(json["request"]["service_tier"], "pedigree");

        let back: SubmissionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
        assert!(SubmissionId::new().to_string().starts_with("submission:"));
    }
}
