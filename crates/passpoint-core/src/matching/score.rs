// ── Match scoring ──
//
// Ranks (AP, provider) candidates. Keys, most significant first:
//
//   1. authentication match level (exact > realm > ... > indeterminate)
//   2. home provider over roaming provider
//   3. signal strength of the scan result
//
// Two records that compare equal are interchangeable; callers that need a
// stable winner keep the first one seen.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{AuthMatch, PasspointMatch, ProviderMatch};
use crate::model::ScanDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PasspointMatchInfo {
    pub provider_match: ProviderMatch,
    /// Signal level of the scan result in dBm.
    pub rssi: i32,
}

impl PasspointMatchInfo {
    pub fn new(provider_match: ProviderMatch, scan: &ScanDetail) -> Self {
        Self {
            provider_match,
            rssi: scan.rssi,
        }
    }

    pub fn auth(&self) -> AuthMatch {
        self.provider_match.auth
    }

    pub fn passpoint(&self) -> PasspointMatch {
        self.provider_match.passpoint
    }
}

impl Ord for PasspointMatchInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.auth()
            .cmp(&other.auth())
            .then_with(|| self.passpoint().cmp(&other.passpoint()))
            .then_with(|| self.rssi.cmp(&other.rssi))
    }
}

impl PartialOrd for PasspointMatchInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
