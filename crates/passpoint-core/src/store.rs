// ── Network configuration store ──

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::CoreError;
use crate::model::{NetworkId, ScanDetail, WifiConfiguration};

/// Where selected networks are registered so the connection layer can
/// use them.
pub trait NetworkConfigStore {
    /// Add `config`, or update the network with the same SSID and FQDN.
    fn add_or_update_network(&mut self, config: WifiConfiguration) -> Result<NetworkId, CoreError>;

    /// Record `scan` as the latest candidate sighting of a network.
    fn set_network_candidate_scan_result(
        &mut self,
        network_id: NetworkId,
        scan: &ScanDetail,
        score: i32,
    ) -> Result<(), CoreError>;

    fn configured_network(&self, network_id: NetworkId) -> Option<WifiConfiguration>;
}

/// Candidate sighting recorded for a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScan {
    pub scan: ScanDetail,
    pub score: i32,
}

#[derive(Debug, Clone)]
struct StoredNetwork {
    config: WifiConfiguration,
    candidate: Option<CandidateScan>,
}

/// Process-local store. Nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    networks: BTreeMap<NetworkId, StoredNetwork>,
    next_id: u32,
    read_only: bool,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn candidate(&self, network_id: NetworkId) -> Option<&CandidateScan> {
        self.networks.get(&network_id)?.candidate.as_ref()
    }

    pub fn networks(&self) -> impl Iterator<Item = &WifiConfiguration> {
        self.networks.values().map(|stored| &stored.config)
    }

    fn find(&self, config: &WifiConfiguration) -> Option<NetworkId> {
        self.networks
            .iter()
            .find(|(_, stored)| stored.config.ssid == config.ssid && stored.config.fqdn == config.fqdn)
            .map(|(id, _)| *id)
    }
}

impl NetworkConfigStore for InMemoryConfigStore {
    fn add_or_update_network(&mut self, mut config: WifiConfiguration) -> Result<NetworkId, CoreError> {
        if self.read_only {
            return Err(CoreError::StoreRejected {
                reason: "store is read-only".into(),
            });
        }
        if config.ssid.is_empty() {
            return Err(CoreError::StoreRejected {
                reason: "network has no SSID".into(),
            });
        }

        let network_id = match self.find(&config) {
            Some(id) => id,
            None => {
                let id = NetworkId(self.next_id);
                self.next_id = self
                    .next_id
                    .checked_add(1)
                    .ok_or_else(|| CoreError::StoreRejected {
                        reason: "network ids exhausted".into(),
                    })?;
                id
            }
        };
        config.network_id = Some(network_id);
        debug!(%network_id, ssid = %config.ssid, "stored network");

        let candidate = self
            .networks
            .remove(&network_id)
            .and_then(|stored| stored.candidate);
        self.networks.insert(network_id, StoredNetwork { config, candidate });
        Ok(network_id)
    }

    fn set_network_candidate_scan_result(
        &mut self,
        network_id: NetworkId,
        scan: &ScanDetail,
        score: i32,
    ) -> Result<(), CoreError> {
        let stored = self
            .networks
            .get_mut(&network_id)
            .ok_or(CoreError::NetworkNotFound { network_id })?;
        stored.candidate = Some(CandidateScan {
            scan: scan.clone(),
            score,
        });
        Ok(())
    }

    fn configured_network(&self, network_id: NetworkId) -> Option<WifiConfiguration> {
        self.networks.get(&network_id).map(|stored| stored.config.clone())
    }
}
