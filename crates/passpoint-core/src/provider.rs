// ── Passpoint provider ──
//
// An installed subscription, matched against the ANQP data of an AP.

use tracing::trace;

use crate::anqp::{AnqpElement, AnqpElementType, AnqpElements, EapMethod};
use crate::matching::{AuthMatch, PasspointMatch, ProviderMatch, is_subdomain_of};
use crate::model::{EnterpriseConfig, PasspointConfiguration, WifiConfiguration};

#[derive(Debug, Clone)]
pub struct PasspointProvider {
    config: PasspointConfiguration,
    eap_method: Option<EapMethod>,
}

impl PasspointProvider {
    pub fn new(config: PasspointConfiguration) -> Self {
        let eap_method = config.credential.eap_method();
        Self { config, eap_method }
    }

    pub fn fqdn(&self) -> &str {
        &self.config.home_sp.fqdn
    }

    pub fn friendly_name(&self) -> &str {
        &self.config.home_sp.friendly_name
    }

    pub fn config(&self) -> &PasspointConfiguration {
        &self.config
    }

    /// Match this provider against an AP's ANQP elements.
    ///
    /// The AP is operated by the home provider when one of its Domain
    /// Name entries falls under the provider's FQDN, and by a roaming
    /// partner when it advertises one of the provider's roaming
    /// consortium OIs. NAI realm data then refines the result: a
    /// disqualifying realm or method voids the match, and a realm match
    /// alone is enough to treat the AP as a roaming partner.
    pub fn match_anqp(&self, elements: &AnqpElements) -> ProviderMatch {
        let mut passpoint = if self.matches_domain(elements) {
            PasspointMatch::HomeProvider
        } else if self.matches_roaming_consortium(elements) {
            PasspointMatch::RoamingProvider
        } else {
            PasspointMatch::None
        };

        let auth = self.match_nai_realm(elements);
        if auth.is_none() {
            return ProviderMatch::new(PasspointMatch::None, AuthMatch::NONE);
        }
        if passpoint == PasspointMatch::None && auth.has_realm() {
            passpoint = PasspointMatch::RoamingProvider;
        }

        trace!(fqdn = self.fqdn(), %passpoint, %auth, "matched provider against ANQP data");
        ProviderMatch::new(passpoint, auth)
    }

    /// Template for a network configured from this provider. The SSID is
    /// left empty and stamped by the evaluator.
    pub fn wifi_config(&self) -> WifiConfiguration {
        let home_sp = &self.config.home_sp;
        let credential = &self.config.credential;
        WifiConfiguration {
            network_id: None,
            ssid: String::new(),
            fqdn: home_sp.fqdn.clone(),
            provider_friendly_name: home_sp.friendly_name.clone(),
            roaming_consortium_ois: home_sp.roaming_consortium_ois.clone(),
            ephemeral: false,
            enterprise: EnterpriseConfig {
                realm: credential.realm.clone(),
                eap_method: credential.eap_type,
                phase2: credential.non_eap_inner_method,
                identity: credential.username.clone(),
                password: credential.password.clone(),
            },
        }
    }

    fn matches_domain(&self, elements: &AnqpElements) -> bool {
        let Some(AnqpElement::DomainName(element)) = elements.get(&AnqpElementType::DomainName)
        else {
            return false;
        };
        element
            .domains
            .iter()
            .any(|domain| is_subdomain_of(domain, self.fqdn()))
    }

    fn matches_roaming_consortium(&self, elements: &AnqpElements) -> bool {
        let Some(AnqpElement::RoamingConsortium(element)) =
            elements.get(&AnqpElementType::RoamingConsortium)
        else {
            return false;
        };
        let ours = &self.config.home_sp.roaming_consortium_ois;
        element.ois.iter().any(|oi| ours.contains(oi))
    }

    fn match_nai_realm(&self, elements: &AnqpElements) -> AuthMatch {
        match (elements.get(&AnqpElementType::NaiRealm), &self.eap_method) {
            (Some(AnqpElement::NaiRealm(element)), Some(eap)) => {
                element.match_credential(&self.config.credential.realm, eap)
            }
            _ => AuthMatch::INDETERMINATE,
        }
    }
}
