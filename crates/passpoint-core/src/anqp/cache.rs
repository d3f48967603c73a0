// ── ANQP data cache ──
//
// Decoded ANQP answers keyed by `AnqpNetworkKey`, so every AP of an ESS
// shares one entry. Entries expire after a fixed lifetime; `sweep` drops
// them, `get_entry` already hides them.

use std::collections::HashMap;

use tracing::debug;

use super::elements::AnqpElements;
use super::network_key::AnqpNetworkKey;
use crate::clock::Clock;

/// How long ANQP data stays valid: one hour.
pub const DATA_LIFETIME_MILLIS: u64 = 3_600_000;

/// One cache entry.
#[derive(Debug, Clone)]
pub struct AnqpData {
    elements: AnqpElements,
    expires_at_millis: u64,
}

impl AnqpData {
    pub fn elements(&self) -> &AnqpElements {
        &self.elements
    }

    pub fn expires_at_millis(&self) -> u64 {
        self.expires_at_millis
    }

    fn expired(&self, now: u64) -> bool {
        now >= self.expires_at_millis
    }
}

pub struct AnqpCache<C> {
    clock: C,
    lifetime_millis: u64,
    entries: HashMap<AnqpNetworkKey, AnqpData>,
}

impl<C: Clock> AnqpCache<C> {
    pub fn new(clock: C) -> Self {
        Self::with_lifetime(clock, DATA_LIFETIME_MILLIS)
    }

    pub fn with_lifetime(clock: C, lifetime_millis: u64) -> Self {
        Self {
            clock,
            lifetime_millis,
            entries: HashMap::new(),
        }
    }

    /// Insert or replace the data for `key`, restarting its lifetime.
    pub fn add_entry(&mut self, key: AnqpNetworkKey, elements: AnqpElements) {
        let expires_at_millis = self
            .clock
            .elapsed_millis()
            .saturating_add(self.lifetime_millis);
        debug!(%key, elements = elements.len(), "caching ANQP data");
        self.entries.insert(
            key,
            AnqpData {
                elements,
                expires_at_millis,
            },
        );
    }

    /// Live entry for `key`; expired data is treated as absent.
    pub fn get_entry(&self, key: &AnqpNetworkKey) -> Option<&AnqpData> {
        let now = self.clock.elapsed_millis();
        self.entries.get(key).filter(|data| !data.expired(now))
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.elapsed_millis();
        let before = self.entries.len();
        self.entries.retain(|_, data| !data.expired(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "swept ANQP cache");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anqp::elements::{AnqpElement, AnqpElementType, DomainNameElement};
    use crate::clock::ManualClock;
    use crate::model::MacAddress;

    fn key() -> AnqpNetworkKey {
        AnqpNetworkKey::build("ssid", MacAddress::new(1), MacAddress::ZERO, 0)
    }

    fn elements() -> AnqpElements {
        AnqpElements::from([(
            AnqpElementType::DomainName,
            AnqpElement::DomainName(DomainNameElement {
                domains: vec!["example.com".into()],
            }),
        )])
    }

    #[test]
    fn entry_visible_until_lifetime_elapses() {
        let clock = ManualClock::new(1_000);
        let mut cache = AnqpCache::new(clock.clone());
        cache.add_entry(key(), elements());

        clock.advance(DATA_LIFETIME_MILLIS - 1);
        assert!(cache.get_entry(&key()).is_some());

        clock.advance(1);
        assert!(cache.get_entry(&key()).is_none());
        // Still stored until swept.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let clock = ManualClock::new(0);
        let mut cache = AnqpCache::with_lifetime(clock.clone(), 100);
        cache.add_entry(key(), elements());

        clock.advance(60);
        let fresh = AnqpNetworkKey::build("other", MacAddress::ZERO, MacAddress::ZERO, 1);
        cache.add_entry(fresh.clone(), elements());

        clock.advance(50);
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_entry(&fresh).is_some());
    }

    #[test]
    fn re_adding_restarts_lifetime() {
        let clock = ManualClock::new(0);
        let mut cache = AnqpCache::with_lifetime(clock.clone(), 100);
        cache.add_entry(key(), elements());
        clock.advance(90);
        cache.add_entry(key(), elements());
        clock.advance(90);
        assert_eq!(
            cache.get_entry(&key()).map(AnqpData::expires_at_millis),
            Some(190)
        );
    }
}
