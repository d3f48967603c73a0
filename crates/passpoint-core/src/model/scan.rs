// ── Scan observations ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::mac::MacAddress;
use crate::anqp::AnqpNetworkKey;

/// Hotspot 2.0 release advertised in the AP's HS2.0 Indication element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum HsRelease {
    R1,
    R2,
}

/// One AP as seen in a scan, reduced to what Passpoint selection reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDetail {
    pub ssid: String,
    pub bssid: MacAddress,
    #[serde(default)]
    pub hessid: MacAddress,
    #[serde(default)]
    pub anqp_domain_id: u16,
    /// Signal level in dBm.
    pub rssi: i32,

    // Interworking / HS2.0 indication
    #[serde(default)]
    pub interworking: bool,
    #[serde(default)]
    pub hs_release: Option<HsRelease>,
    /// Number of OIs the AP holds beyond those in the beacon.
    #[serde(default)]
    pub anqp_oi_count: u8,
}

impl ScanDetail {
    pub fn new(ssid: impl Into<String>, bssid: MacAddress, rssi: i32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid,
            hessid: MacAddress::ZERO,
            anqp_domain_id: 0,
            rssi,
            interworking: false,
            hs_release: None,
            anqp_oi_count: 0,
        }
    }

    /// Mark the AP as Passpoint-capable with the given release.
    #[must_use]
    pub fn with_passpoint(mut self, release: HsRelease) -> Self {
        self.interworking = true;
        self.hs_release = Some(release);
        self
    }

    #[must_use]
    pub fn with_anqp_domain(mut self, hessid: MacAddress, anqp_domain_id: u16) -> Self {
        self.hessid = hessid;
        self.anqp_domain_id = anqp_domain_id;
        self
    }

    pub fn network_key(&self) -> AnqpNetworkKey {
        AnqpNetworkKey::build(
            self.ssid.clone(),
            self.bssid,
            self.hessid,
            self.anqp_domain_id,
        )
    }

    pub fn supports_release2(&self) -> bool {
        self.hs_release == Some(HsRelease::R2)
    }
}
