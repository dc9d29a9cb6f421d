//! # Category Classification
//!
//! A category tag groups every submission issued from the same numbering
//! family. It is written once onto the submission record and is what the
//! store counts to find the next sequence.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IssuanceError;
use crate::family::{resolve_family, NumberingFamily};
use crate::request::IssuanceRequest;

/// Stable family identifier of the form `"<base>-0001"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryTag(String);

impl CategoryTag {
    const SUFFIX: &'static str = "-0001";

    /// The tag shared by every submission of `family`.
    pub fn for_family(family: &NumberingFamily) -> Self {
        Self(format!("{}{}", family.base_classification, Self::SUFFIX))
    }

    /// Borrow the tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base classification encoded in the tag.
    pub fn base_classification(&self) -> u32 {
        // Validated at construction.
        self.0
            .strip_suffix(Self::SUFFIX)
            .and_then(|base| base.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CategoryTag {
    type Err = IssuanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.strip_suffix(Self::SUFFIX).ok_or_else(|| {
            IssuanceError::InvalidInput(format!("category tag must end in -0001: {s:?}"))
        })?;
        let canonical = !base.is_empty()
            && base.bytes().all(|b| b.is_ascii_digit())
            && (base == "0" || !base.starts_with('0'));
        if !canonical || base.parse::<u32>().is_err() {
            return Err(IssuanceError::InvalidInput(format!(
                "category tag base must be a canonical integer: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for CategoryTag {
    type Error = IssuanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryTag> for String {
    fn from(tag: CategoryTag) -> Self {
        tag.0
    }
}

/// Category tag for `request`.
///
/// Role permission is not checked here: historical records are grouped by
/// tag even when a later `generate` call would reject the submitter.
pub fn classify(request: &IssuanceRequest) -> Result<CategoryTag, IssuanceError> {
    let family = resolve_family(request)?;
    Ok(CategoryTag::for_family(&family))
}
