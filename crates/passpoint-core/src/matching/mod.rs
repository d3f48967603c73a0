// ── Provider matching ──
//
// Match levels produced when a provider's credential is compared with an
// AP's ANQP data, and the ordering used to rank the results.

pub mod auth_match;
pub mod domain;
pub mod score;

use serde::{Deserialize, Serialize};
use strum::Display;

pub use auth_match::AuthMatch;
pub use domain::is_subdomain_of;
pub use score::PasspointMatchInfo;

/// Relationship between the AP's operator and the provider.
///
/// Variant order is rank order: `HomeProvider` is best.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PasspointMatch {
    #[default]
    None,
    RoamingProvider,
    HomeProvider,
}

/// Outcome of matching one provider against one AP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderMatch {
    pub passpoint: PasspointMatch,
    pub auth: AuthMatch,
}

impl ProviderMatch {
    pub fn new(passpoint: PasspointMatch, auth: AuthMatch) -> Self {
        Self { passpoint, auth }
    }

    /// True when the provider can be used on this AP at all.
    pub fn is_match(self) -> bool {
        self.passpoint != PasspointMatch::None && !self.auth.is_none()
    }
}
