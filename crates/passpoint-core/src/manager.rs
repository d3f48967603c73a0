// ── Passpoint manager ──
//
// Owns the installed providers, the ANQP cache and the request manager.
// Scan results are matched against cached ANQP data; a cache miss kicks
// off an ANQP query and yields no match until the answer arrives.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::anqp::{AnqpCache, AnqpElementType, AnqpElements, AnqpNetworkKey, parse_elements};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::evaluator::ProviderMatcher;
use crate::matching::{PasspointMatch, ProviderMatch};
use crate::model::{MacAddress, PasspointConfiguration, ScanDetail};
use crate::provider::PasspointProvider;
use crate::request_manager::{AnqpRequestManager, AnqpTransport, HoldOffPolicy};

pub struct PasspointManager<T, C> {
    providers: IndexMap<String, Arc<PasspointProvider>>,
    cache: AnqpCache<C>,
    requests: AnqpRequestManager<T, C>,
}

impl<T: AnqpTransport, C: Clock + Clone> PasspointManager<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            providers: IndexMap::new(),
            cache: AnqpCache::new(clock.clone()),
            requests: AnqpRequestManager::new(transport, clock),
        }
    }

    pub fn with_settings(
        transport: T,
        clock: C,
        policy: HoldOffPolicy,
        cache_lifetime_millis: u64,
    ) -> Self {
        Self {
            providers: IndexMap::new(),
            cache: AnqpCache::with_lifetime(clock.clone(), cache_lifetime_millis),
            requests: AnqpRequestManager::with_policy(transport, clock, policy),
        }
    }

    // ── Providers ────────────────────────────────────────────────────

    /// Install a provider, replacing any existing one with the same FQDN.
    /// Returns `true` when an existing provider was replaced.
    pub fn add_or_update_provider(&mut self, config: PasspointConfiguration) -> bool {
        let fqdn = config.home_sp.fqdn.clone();
        let replaced = self
            .providers
            .insert(fqdn.clone(), Arc::new(PasspointProvider::new(config)))
            .is_some();
        info!(%fqdn, replaced, "installed Passpoint provider");
        replaced
    }

    pub fn remove_provider(&mut self, fqdn: &str) -> bool {
        let removed = self.providers.shift_remove(fqdn).is_some();
        if removed {
            info!(%fqdn, "removed Passpoint provider");
        }
        removed
    }

    /// Installed providers in installation order.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<PasspointProvider>> {
        self.providers.values()
    }

    // ── Matching ─────────────────────────────────────────────────────

    /// Providers usable on the AP behind `scan`, with their match levels.
    ///
    /// Without cached ANQP data for the AP's network an ANQP query is
    /// requested (subject to hold-off) and nothing is returned.
    pub fn match_provider(&mut self, scan: &ScanDetail) -> Vec<(Arc<PasspointProvider>, ProviderMatch)> {
        if self.providers.is_empty() {
            return Vec::new();
        }

        let key = scan.network_key();
        let Some(data) = self.cache.get_entry(&key) else {
            let sent = self.requests.request_elements(
                scan.bssid,
                key,
                scan.anqp_oi_count > 0,
                scan.supports_release2(),
            );
            debug!(bssid = %scan.bssid, sent, "no cached ANQP data");
            return Vec::new();
        };

        self.providers
            .values()
            .filter_map(|provider| {
                let result = provider.match_anqp(data.elements());
                (result.passpoint != PasspointMatch::None).then(|| (Arc::clone(provider), result))
            })
            .collect()
    }

    // ── ANQP completions ─────────────────────────────────────────────

    /// Handle the outcome of an ANQP query. `None` means the query failed.
    ///
    /// Returns the network key the answer was cached under, or `None` when
    /// the query failed or nothing was waiting on `bssid`.
    pub fn on_anqp_response(
        &mut self,
        bssid: MacAddress,
        elements: Option<AnqpElements>,
    ) -> Option<AnqpNetworkKey> {
        let key = self.requests.on_request_completed(bssid, elements.is_some());
        let elements = elements?;
        let Some(key) = key else {
            warn!(%bssid, "ANQP response with no matching request");
            return None;
        };
        self.cache.add_entry(key.clone(), elements);
        Some(key)
    }

    /// Decode and handle a raw ANQP response.
    ///
    /// A malformed element discards the whole response: the query is
    /// completed as failed and the decode error is returned.
    pub fn on_anqp_payload<'a>(
        &mut self,
        bssid: MacAddress,
        payloads: impl IntoIterator<Item = (AnqpElementType, &'a [u8])>,
    ) -> Result<Option<AnqpNetworkKey>, CoreError> {
        match parse_elements(payloads) {
            Ok(elements) => Ok(self.on_anqp_response(bssid, Some(elements))),
            Err(e) => {
                warn!(%bssid, error = %e, "discarding malformed ANQP response");
                self.on_anqp_response(bssid, None);
                Err(e.into())
            }
        }
    }

    /// Drop expired ANQP data.
    pub fn sweep_cache(&mut self) -> usize {
        self.cache.sweep()
    }

    pub fn cache(&self) -> &AnqpCache<C> {
        &self.cache
    }

    pub fn request_manager(&self) -> &AnqpRequestManager<T, C> {
        &self.requests
    }
}

impl<T: AnqpTransport, C: Clock + Clone> ProviderMatcher for PasspointManager<T, C> {
    fn match_provider(&mut self, scan: &ScanDetail) -> Vec<(Arc<PasspointProvider>, ProviderMatch)> {
        PasspointManager::match_provider(self, scan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::anqp::{AnqpElement, DomainNameElement, EapType};
    use crate::clock::ManualClock;
    use crate::model::{Credential, HomeSp, HsRelease};
    use crate::request_manager::BASE_HOLDOFF_TIME_MILLIS;

    #[derive(Default)]
    struct CountingTransport {
        sent: usize,
    }

    impl AnqpTransport for CountingTransport {
        fn send_request(&mut self, _bssid: MacAddress, _elements: &[AnqpElementType]) -> bool {
            self.sent += 1;
            true
        }
    }

    const BSSID: MacAddress = MacAddress::new(0x0200_0000_0001);

    fn config(fqdn: &str) -> PasspointConfiguration {
        PasspointConfiguration {
            home_sp: HomeSp {
                fqdn: fqdn.into(),
                friendly_name: fqdn.to_uppercase(),
                roaming_consortium_ois: Vec::new(),
            },
            credential: Credential {
                realm: fqdn.into(),
                eap_type: Some(EapType::TLS),
                ..Credential::default()
            },
        }
    }

    fn scan() -> ScanDetail {
        ScanDetail::new("hs20", BSSID, -55).with_passpoint(HsRelease::R1)
    }

    fn domain_elements(domain: &str) -> AnqpElements {
        AnqpElements::from([(
            AnqpElementType::DomainName,
            AnqpElement::DomainName(DomainNameElement {
                domains: vec![domain.into()],
            }),
        )])
    }

    fn manager() -> (PasspointManager<CountingTransport, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        (
            PasspointManager::new(CountingTransport::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn no_providers_means_no_query() {
        let (mut m, _clock) = manager();
        assert!(m.match_provider(&scan()).is_empty());
        assert_eq!(m.request_manager().transport().sent, 0);
    }

    #[test]
    fn cache_miss_requests_anqp() {
        let (mut m, _clock) = manager();
        m.add_or_update_provider(config("example.com"));
        assert!(m.match_provider(&scan()).is_empty());
        assert_eq!(m.request_manager().transport().sent, 1);
        assert_eq!(m.request_manager().pending_count(), 1);
    }

    #[test]
    fn response_populates_cache_and_matches() {
        let (mut m, _clock) = manager();
        m.add_or_update_provider(config("example.com"));
        m.add_or_update_provider(config("other.org"));
        m.match_provider(&scan());

        let key = m.on_anqp_response(BSSID, Some(domain_elements("example.com")));
        assert_eq!(key, Some(scan().network_key()));

        let matches = m.match_provider(&scan());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.fqdn(), "example.com");
        assert_eq!(matches[0].1.passpoint, PasspointMatch::HomeProvider);
    }

    #[test]
    fn stale_response_is_ignored() {
        let (mut m, _clock) = manager();
        assert_eq!(m.on_anqp_response(BSSID, Some(domain_elements("example.com"))), None);
        assert!(m.cache().is_empty());
    }

    #[test]
    fn failed_response_keeps_holdoff() {
        let (mut m, _clock) = manager();
        m.add_or_update_provider(config("example.com"));
        m.match_provider(&scan());
        assert_eq!(m.on_anqp_response(BSSID, None), None);
        assert!(m.request_manager().holdoff_remaining(BSSID).is_some());

        m.match_provider(&scan());
        assert_eq!(m.request_manager().transport().sent, 1);
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_miss() {
        let (mut m, clock) = manager();
        m.add_or_update_provider(config("example.com"));
        m.match_provider(&scan());

        let bad: &[u8] = &[0x0b, b'e', b'x'];
        let err = m
            .on_anqp_payload(BSSID, [(AnqpElementType::DomainName, bad)])
            .unwrap_err();
        assert!(err.is_protocol());
        assert!(m.cache().is_empty());
        assert_eq!(m.request_manager().pending_count(), 0);

        // Failed completion: the AP stays in hold-off.
        clock.advance(BASE_HOLDOFF_TIME_MILLIS - 1);
        m.match_provider(&scan());
        assert_eq!(m.request_manager().transport().sent, 1);
    }

    #[test]
    fn provider_updates_keep_installation_order() {
        let (mut m, _clock) = manager();
        assert!(!m.add_or_update_provider(config("a.com")));
        assert!(!m.add_or_update_provider(config("b.com")));
        assert!(m.add_or_update_provider(config("a.com")));
        let order: Vec<&str> = m.providers().map(|p| p.fqdn()).collect();
        assert_eq!(order, vec!["a.com", "b.com"]);

        assert!(m.remove_provider("a.com"));
        assert!(!m.remove_provider("a.com"));
        assert_eq!(m.providers().count(), 1);
    }

    #[test]
    fn sweep_drops_expired_data() {
        let (mut m, clock) = manager();
        m.add_or_update_provider(config("example.com"));
        m.match_provider(&scan());
        m.on_anqp_response(BSSID, Some(domain_elements("example.com")));
        assert_eq!(m.sweep_cache(), 0);

        clock.advance(crate::anqp::DATA_LIFETIME_MILLIS);
        assert_eq!(m.sweep_cache(), 1);
        assert!(m.match_provider(&scan()).is_empty());
    }
}
