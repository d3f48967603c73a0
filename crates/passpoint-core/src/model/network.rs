// ── Connectable network configuration ──

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::anqp::{EapType, NonEapInnerAuth};

/// Identifier assigned by the network configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 802.1X settings carried by a Passpoint network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnterpriseConfig {
    pub realm: String,
    pub eap_method: Option<EapType>,
    pub phase2: Option<NonEapInnerAuth>,
    pub identity: Option<String>,
    #[serde(skip)]
    pub password: Option<SecretString>,
}

/// A network the device may connect to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiConfiguration {
    pub network_id: Option<NetworkId>,
    pub ssid: String,
    /// FQDN of the Passpoint provider this network was built from.
    pub fqdn: String,
    pub provider_friendly_name: String,
    pub roaming_consortium_ois: Vec<u64>,
    /// Ephemeral networks are never persisted as saved networks.
    pub ephemeral: bool,
    pub enterprise: EnterpriseConfig,
}

impl WifiConfiguration {
    pub fn is_passpoint(&self) -> bool {
        !self.fqdn.is_empty()
    }
}
