// ── ANQP network key ──
//
// Identifies the ESS whose ANQP answers can be shared. The advertised
// ANQP Domain ID and HESSID decide how coarse the key is:
//
//   HESSID    Domain ID   Key          Reason
//   --------  ----------  -----------  --------------------------------
//   n/a       zero        SSID+BSSID   answers are unique to this AP
//   not set   non-zero    SSID         standard definition of an ESS
//   set       non-zero    HESSID       the HESSID defines the ESS

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::MacAddress;

/// Cache / correlation key for ANQP data.
///
/// Exactly one branch is populated, so keys built under different rules
/// never compare equal even if they carry overlapping values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnqpNetworkKey {
    Hessid { hessid: MacAddress },
    Bss { ssid: String, bssid: MacAddress },
    Ess { ssid: String },
}

impl AnqpNetworkKey {
    pub fn build(
        ssid: impl Into<String>,
        bssid: MacAddress,
        hessid: MacAddress,
        anqp_domain_id: u16,
    ) -> Self {
        if anqp_domain_id == 0 {
            Self::Bss {
                ssid: ssid.into(),
                bssid,
            }
        } else if !hessid.is_zero() {
            Self::Hessid { hessid }
        } else {
            Self::Ess { ssid: ssid.into() }
        }
    }

    pub fn ssid(&self) -> Option<&str> {
        match self {
            Self::Bss { ssid, .. } | Self::Ess { ssid } => Some(ssid),
            Self::Hessid { .. } => None,
        }
    }
}

impl fmt::Display for AnqpNetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hessid { hessid } => write!(f, "HESSID:{hessid}"),
            Self::Bss { ssid, bssid } => write!(f, "{bssid}:<{}>", ssid.escape_default()),
            Self::Ess { ssid } => write!(f, "<{}>", ssid.escape_default()),
        }
    }
}
