// ── Passpoint network evaluator ──
//
// Network-selector stage for Passpoint APs. For every Passpoint-capable
// scan result the best matching provider is kept; the best of those
// becomes an ephemeral network registered with the config store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::matching::{PasspointMatchInfo, ProviderMatch};
use crate::model::{ScanDetail, WifiConfiguration};
use crate::provider::PasspointProvider;
use crate::store::NetworkConfigStore;

// ── Selector seams ──────────────────────────────────────────────────

/// One stage of network selection.
pub trait NetworkEvaluator {
    fn name(&self) -> &'static str;

    /// Notified of every scan before evaluation.
    fn update(&mut self, _scans: &[ScanDetail]) {}

    /// Pick a network to connect to, if any. The chosen scan result and
    /// configuration are also appended to `connectable`.
    fn evaluate_networks(
        &mut self,
        scans: &[ScanDetail],
        connectable: &mut Vec<(ScanDetail, WifiConfiguration)>,
    ) -> Option<WifiConfiguration>;
}

/// Source of provider matches for a scan result.
pub trait ProviderMatcher {
    fn match_provider(&mut self, scan: &ScanDetail) -> Vec<(Arc<PasspointProvider>, ProviderMatch)>;
}

// ── Evaluator ───────────────────────────────────────────────────────

/// A winning candidate: the scan result, the provider and its score.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub scan: ScanDetail,
    pub provider: Arc<PasspointProvider>,
    pub score: PasspointMatchInfo,
}

pub struct PasspointNetworkEvaluator<M, S> {
    matcher: M,
    store: S,
}

impl<M: ProviderMatcher, S: NetworkConfigStore> PasspointNetworkEvaluator<M, S> {
    pub const NAME: &'static str = "PasspointNetworkEvaluator";

    pub fn new(matcher: M, store: S) -> Self {
        Self { matcher, store }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn matcher_mut(&mut self) -> &mut M {
        &mut self.matcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Best (scan, provider) pair across `scans`, without touching the
    /// store. Equal scores keep the candidate seen first.
    pub fn best_candidate(&mut self, scans: &[ScanDetail]) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for scan in scans.iter().filter(|scan| scan.interworking) {
            let Some(candidate) = self.best_for_scan(scan) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| b.score < candidate.score) {
                best = Some(candidate);
            }
        }
        best
    }

    fn best_for_scan(&mut self, scan: &ScanDetail) -> Option<Candidate> {
        let mut best: Option<(Arc<PasspointProvider>, PasspointMatchInfo)> = None;
        for (provider, provider_match) in self.matcher.match_provider(scan) {
            let score = PasspointMatchInfo::new(provider_match, scan);
            if best.as_ref().is_none_or(|(_, b)| *b < score) {
                best = Some((provider, score));
            }
        }
        best.map(|(provider, score)| Candidate {
            scan: scan.clone(),
            provider,
            score,
        })
    }

    /// Register the network for the winning candidate and return the
    /// configuration as stored.
    fn create_wifi_config(&mut self, candidate: &Candidate) -> Result<WifiConfiguration, CoreError> {
        let mut config = candidate.provider.wifi_config();
        config.ephemeral = true;
        config.ssid.clone_from(&candidate.scan.ssid);

        let network_id = self.store.add_or_update_network(config)?;
        if let Err(e) = self
            .store
            .set_network_candidate_scan_result(network_id, &candidate.scan, 0)
        {
            warn!(error = %e, %network_id, "failed to record candidate scan result");
        }
        self.store
            .configured_network(network_id)
            .ok_or(CoreError::NetworkNotFound { network_id })
    }
}

impl<M: ProviderMatcher, S: NetworkConfigStore> NetworkEvaluator for PasspointNetworkEvaluator<M, S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate_networks(
        &mut self,
        scans: &[ScanDetail],
        connectable: &mut Vec<(ScanDetail, WifiConfiguration)>,
    ) -> Option<WifiConfiguration> {
        let candidate = self.best_candidate(scans)?;
        debug!(
            bssid = %candidate.scan.bssid,
            fqdn = candidate.provider.fqdn(),
            auth = %candidate.score.auth(),
            passpoint = %candidate.score.passpoint(),
            rssi = candidate.score.rssi,
            "selected Passpoint candidate"
        );

        match self.create_wifi_config(&candidate) {
            Ok(config) => {
                connectable.push((candidate.scan, config.clone()));
                Some(config)
            }
            Err(e) => {
                warn!(error = %e, fqdn = candidate.provider.fqdn(), "failed to add Passpoint network");
                None
            }
        }
    }
}
