// ── Passpoint provider profile ──
//
// What a subscriber installs: the home service provider description and
// the credential used to authenticate against it.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::anqp::{AuthParam, EapMethod, EapType, NonEapInnerAuth};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSp {
    pub fqdn: String,
    pub friendly_name: String,
    #[serde(default)]
    pub roaming_consortium_ois: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    pub realm: String,
    pub eap_type: Option<EapType>,
    /// Inner method for TTLS credentials.
    #[serde(default)]
    pub non_eap_inner_method: Option<NonEapInnerAuth>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<SecretString>,
}

impl Credential {
    /// The EAP method this credential authenticates with, as compared
    /// against the AP's NAI Realm records.
    pub fn eap_method(&self) -> Option<EapMethod> {
        let eap_type = self.eap_type?;
        let method = EapMethod::new(eap_type);
        Some(match self.non_eap_inner_method {
            Some(inner) if eap_type == EapType::TTLS => {
                method.with_param(AuthParam::NonEapInnerAuth { method: inner })
            }
            _ => method,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasspointConfiguration {
    pub home_sp: HomeSp,
    pub credential: Credential,
}
