//! Region eligibility policy.

use serde::{Deserialize, Serialize};

use crate::types::country::CountryCode;

/// The set of countries checkout is allowed to ship to.
///
/// The storefront currently serves a single region. The gate runs before
/// any remote call; the commerce backend itself would accept other
/// countries, so this is the only place the restriction exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionPolicy {
    supported: CountryCode,
}

impl RegionPolicy {
    /// Build a policy allowing a single country.
    #[must_use]
    pub const fn new(supported: CountryCode) -> Self {
        Self { supported }
    }

    /// Whether the given country may check out.
    #[must_use]
    pub fn allows(&self, country: &CountryCode) -> bool {
        self.supported == *country
    }

    /// The single supported country.
    #[must_use]
    pub const fn supported(&self) -> &CountryCode {
        &self.supported
    }
}
