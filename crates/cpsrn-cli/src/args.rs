//! Request arguments shared by the `classify`, `generate`, and `issue`
//! subcommands.

use anyhow::{Context, Result};
use clap::Args;
use cpsrn_core::{CollectionSelector, IssuanceRequest, ServiceTier, SubmitterRole};

/// The (selector, tier, role) triple.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Special-collection code: 0 for none, 1-5 for a collection.
    #[arg(long, default_value_t = 0)]
    pub selector: u8,

    /// Service tier, by name (e.g. you_grade) or code (e.g. 1).
    #[arg(long, default_value = "unspecified")]
    pub tier: ServiceTier,

    /// Submitter role, by name (customer, root) or code.
    #[arg(long, default_value = "customer")]
    pub role: SubmitterRole,
}

impl RequestArgs {
    /// Validate into an [`IssuanceRequest`].
    pub fn to_request(&self) -> Result<IssuanceRequest> {
        let selector = CollectionSelector::new(self.selector)
            .with_context(|| format!("invalid --selector {}", self.selector))?;
        Ok(IssuanceRequest::new(selector, self.tier, self.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_selector() {
        let args = RequestArgs {
            selector: 8,
            tier: ServiceTier::Unspecified,
            role: SubmitterRole::Customer,
        };
        let err = args.to_request().unwrap_err();
        assert!(format!("{err:#}").contains("--selector 8"));
    }
}
