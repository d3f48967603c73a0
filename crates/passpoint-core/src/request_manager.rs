// ── ANQP request manager ──
//
// Decides whether an ANQP query may go out to an AP now and which
// elements it asks for. Every attempt, successful send or not, pushes the
// AP's hold-off out exponentially; only a successful completion resets it.
//
// Not thread-safe: the check and the update of the hold-off entry are two
// steps. Callers confine the manager to one task (see `service`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anqp::{AnqpElementType, AnqpNetworkKey};
use crate::clock::Clock;
use crate::model::MacAddress;

pub const BASE_HOLDOFF_TIME_MILLIS: u64 = 10_000;
pub const MAX_HOLDOFF_COUNT: u32 = 6;

const R1_ELEMENTS: [AnqpElementType; 5] = [
    AnqpElementType::VenueName,
    AnqpElementType::IpAddrAvailability,
    AnqpElementType::NaiRealm,
    AnqpElementType::ThreeGppNetwork,
    AnqpElementType::DomainName,
];

const R2_ELEMENTS: [AnqpElementType; 3] = [
    AnqpElementType::HsFriendlyName,
    AnqpElementType::HsWanMetrics,
    AnqpElementType::HsConnCapability,
];

// ── Collaborators ───────────────────────────────────────────────────

/// Sends ANQP queries over the air.
///
/// `send_request` only reports whether the query was accepted for
/// transmission; the answer arrives later through
/// [`AnqpRequestManager::on_request_completed`].
pub trait AnqpTransport {
    fn send_request(&mut self, bssid: MacAddress, elements: &[AnqpElementType]) -> bool;
}

impl<T: AnqpTransport + ?Sized> AnqpTransport for Box<T> {
    fn send_request(&mut self, bssid: MacAddress, elements: &[AnqpElementType]) -> bool {
        (**self).send_request(bssid, elements)
    }
}

// ── Hold-off state ──────────────────────────────────────────────────

/// Backoff parameters. Hold-off after the n-th consecutive attempt is
/// `base_millis * 2^min(n, max_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldOffPolicy {
    pub base_millis: u64,
    pub max_count: u32,
}

impl Default for HoldOffPolicy {
    fn default() -> Self {
        Self {
            base_millis: BASE_HOLDOFF_TIME_MILLIS,
            max_count: MAX_HOLDOFF_COUNT,
        }
    }
}

impl HoldOffPolicy {
    /// Hold-off interval applied for an entry at `count`.
    pub fn interval_millis(&self, count: u32) -> u64 {
        let count = count.min(self.max_count);
        self.base_millis
            .saturating_mul(2_u64.checked_pow(count).unwrap_or(u64::MAX))
    }
}

/// Per-AP backoff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldOffInfo {
    pub count: u32,
    pub expires_at_millis: u64,
}

// ── Manager ─────────────────────────────────────────────────────────

pub struct AnqpRequestManager<T, C> {
    transport: T,
    clock: C,
    policy: HoldOffPolicy,
    holdoff: HashMap<MacAddress, HoldOffInfo>,
    pending: HashMap<MacAddress, AnqpNetworkKey>,
}

impl<T: AnqpTransport, C: Clock> AnqpRequestManager<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self::with_policy(transport, clock, HoldOffPolicy::default())
    }

    pub fn with_policy(transport: T, clock: C, policy: HoldOffPolicy) -> Self {
        Self {
            transport,
            clock,
            policy,
            holdoff: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Element IDs to query for an AP, in request order.
    pub fn request_element_ids(include_rc: bool, supports_r2: bool) -> Vec<AnqpElementType> {
        let mut ids = R1_ELEMENTS.to_vec();
        if include_rc {
            ids.push(AnqpElementType::RoamingConsortium);
        }
        if supports_r2 {
            ids.extend(R2_ELEMENTS);
        }
        ids
    }

    /// Query ANQP elements from `bssid` unless it is held off.
    ///
    /// Returns `false` when the AP is still in hold-off or the transport
    /// refused the query. A refused query still consumes a backoff slot.
    pub fn request_elements(
        &mut self,
        bssid: MacAddress,
        key: AnqpNetworkKey,
        include_rc: bool,
        supports_r2: bool,
    ) -> bool {
        let now = self.clock.elapsed_millis();
        if let Some(info) = self
            .holdoff
            .get(&bssid)
            .filter(|info| now < info.expires_at_millis)
        {
            debug!(
                %bssid,
                remaining_secs = (info.expires_at_millis - now) / 1000,
                "ANQP request held off"
            );
            return false;
        }

        self.update_holdoff(bssid, now);

        let ids = Self::request_element_ids(include_rc, supports_r2);
        if !self.transport.send_request(bssid, &ids) {
            debug!(%bssid, "ANQP request rejected by transport");
            return false;
        }

        debug!(%bssid, %key, elements = ids.len(), "ANQP request sent");
        self.pending.insert(bssid, key);
        true
    }

    /// Record the answer (or failure) for the query sent to `bssid`.
    ///
    /// Returns the key the query was issued for, or `None` for a
    /// completion nothing was waiting on. A success clears the AP's
    /// hold-off even when the completion is stale.
    pub fn on_request_completed(&mut self, bssid: MacAddress, success: bool) -> Option<AnqpNetworkKey> {
        if success {
            self.holdoff.remove(&bssid);
        }
        self.pending.remove(&bssid)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_key(&self, bssid: MacAddress) -> Option<&AnqpNetworkKey> {
        self.pending.get(&bssid)
    }

    pub fn holdoff_info(&self, bssid: MacAddress) -> Option<HoldOffInfo> {
        self.holdoff.get(&bssid).copied()
    }

    /// Milliseconds until `bssid` may be queried again; `None` when it
    /// may be queried now.
    pub fn holdoff_remaining(&self, bssid: MacAddress) -> Option<u64> {
        let now = self.clock.elapsed_millis();
        self.holdoff
            .get(&bssid)
            .filter(|info| now < info.expires_at_millis)
            .map(|info| info.expires_at_millis - now)
    }

    pub fn policy(&self) -> HoldOffPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn update_holdoff(&mut self, bssid: MacAddress, now: u64) {
        let policy = self.policy;
        let info = self.holdoff.entry(bssid).or_insert(HoldOffInfo {
            count: 0,
            expires_at_millis: now,
        });
        info.expires_at_millis = now.saturating_add(policy.interval_millis(info.count));
        if info.count < policy.max_count {
            info.count += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingTransport {
        accept: bool,
        sent: Vec<(MacAddress, Vec<AnqpElementType>)>,
    }

    impl RecordingTransport {
        fn accepting() -> Self {
            Self {
                accept: true,
                sent: Vec::new(),
            }
        }
    }

    impl AnqpTransport for RecordingTransport {
        fn send_request(&mut self, bssid: MacAddress, elements: &[AnqpElementType]) -> bool {
            self.sent.push((bssid, elements.to_vec()));
            self.accept
        }
    }

    const BSSID: MacAddress = MacAddress::new(0x1234_5678_abcd);

    fn key() -> AnqpNetworkKey {
        AnqpNetworkKey::build("hs20", BSSID, MacAddress::ZERO, 0)
    }

    fn manager(
        transport: RecordingTransport,
    ) -> (AnqpRequestManager<RecordingTransport, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        (AnqpRequestManager::new(transport, clock.clone()), clock)
    }

    #[test]
    fn element_sets() {
        type M = AnqpRequestManager<RecordingTransport, ManualClock>;
        assert_eq!(M::request_element_ids(false, false), R1_ELEMENTS.to_vec());

        let with_rc = M::request_element_ids(true, false);
        assert_eq!(with_rc.last(), Some(&AnqpElementType::RoamingConsortium));
        assert_eq!(with_rc.len(), 6);

        let all = M::request_element_ids(true, true);
        assert_eq!(all.len(), 9);
        assert_eq!(&all[6..], &R2_ELEMENTS);
    }

    #[test]
    fn sends_and_tracks_pending() {
        let (mut m, _clock) = manager(RecordingTransport::accepting());
        assert!(m.request_elements(BSSID, key(), false, true));
        assert_eq!(m.pending_count(), 1);
        assert_eq!(m.transport().sent.len(), 1);
        assert_eq!(m.transport().sent[0].0, BSSID);
        assert_eq!(m.transport().sent[0].1.len(), 8);
    }

    #[test]
    fn holdoff_delta_sequence_doubles_then_flattens() {
        let (mut m, clock) = manager(RecordingTransport::accepting());
        let mut deltas = Vec::new();
        for _ in 0..9 {
            let now = clock.elapsed_millis();
            assert!(m.request_elements(BSSID, key(), false, false));
            let info = m.holdoff_info(BSSID).unwrap();
            deltas.push(info.expires_at_millis - now);
            assert!(info.count <= MAX_HOLDOFF_COUNT);
            clock.set(info.expires_at_millis);
        }
        assert_eq!(
            deltas,
            vec![
                10_000, 20_000, 40_000, 80_000, 160_000, 320_000, 640_000, 640_000, 640_000
            ]
        );
    }

    #[test]
    fn request_within_holdoff_is_rejected_without_side_effects() {
        let (mut m, clock) = manager(RecordingTransport::accepting());
        assert!(m.request_elements(BSSID, key(), false, false));
        let before = m.holdoff_info(BSSID);

        clock.advance(BASE_HOLDOFF_TIME_MILLIS - 1);
        let other_key = AnqpNetworkKey::build("other", BSSID, MacAddress::ZERO, 0);
        assert!(!m.request_elements(BSSID, other_key, false, false));

        assert_eq!(m.holdoff_info(BSSID), before);
        assert_eq!(m.pending_count(), 1);
        assert_eq!(m.pending_key(BSSID), Some(&key()));
        assert_eq!(m.transport().sent.len(), 1);
        assert_eq!(m.holdoff_remaining(BSSID), Some(1));
    }

    #[test]
    fn success_resets_backoff_at_same_timestamp() {
        let (mut m, _clock) = manager(RecordingTransport::accepting());
        assert!(m.request_elements(BSSID, key(), false, false));
        assert_eq!(m.on_request_completed(BSSID, true), Some(key()));
        assert!(m.holdoff_info(BSSID).is_none());
        assert!(m.request_elements(BSSID, key(), false, false));
    }

    #[test]
    fn failure_keeps_backoff() {
        let (mut m, _clock) = manager(RecordingTransport::accepting());
        assert!(m.request_elements(BSSID, key(), false, false));
        assert_eq!(m.on_request_completed(BSSID, false), Some(key()));
        assert_eq!(m.pending_count(), 0);
        assert!(!m.request_elements(BSSID, key(), false, false));
    }

    #[test]
    fn transport_rejection_still_consumes_backoff_slot() {
        let (mut m, clock) = manager(RecordingTransport::default());
        assert!(!m.request_elements(BSSID, key(), false, false));
        assert_eq!(m.pending_count(), 0);
        assert_eq!(
            m.holdoff_info(BSSID),
            Some(HoldOffInfo {
                count: 1,
                expires_at_millis: BASE_HOLDOFF_TIME_MILLIS
            })
        );

        // Throttled now, even though nothing is pending.
        clock.advance(1);
        assert!(!m.request_elements(BSSID, key(), false, false));
        assert_eq!(m.transport().sent.len(), 1);
    }

    #[test]
    fn stale_completion_returns_none() {
        let (mut m, _clock) = manager(RecordingTransport::accepting());
        assert_eq!(m.on_request_completed(BSSID, false), None);
        assert_eq!(m.on_request_completed(BSSID, true), None);
    }

    #[test]
    fn stale_failure_leaves_holdoff_in_place() {
        let (mut m, _clock) = manager(RecordingTransport::default());
        assert!(!m.request_elements(BSSID, key(), false, false));
        assert_eq!(m.on_request_completed(BSSID, false), None);
        assert!(m.holdoff_info(BSSID).is_some());
    }

    #[test]
    fn completion_returns_stored_key_exactly_once() {
        let (mut m, _clock) = manager(RecordingTransport::accepting());
        let hessid_key = AnqpNetworkKey::build("hs20", BSSID, MacAddress::new(0x77), 3);
        assert!(m.request_elements(BSSID, hessid_key.clone(), true, false));
        assert_eq!(m.on_request_completed(BSSID, false), Some(hessid_key));
        assert_eq!(m.on_request_completed(BSSID, false), None);
    }

    #[test]
    fn unanswered_pending_entry_is_replaced_after_holdoff() {
        // Pending entries are never reaped on their own; a later send to
        // the same AP simply overwrites the bookkeeping.
        let (mut m, clock) = manager(RecordingTransport::accepting());
        assert!(m.request_elements(BSSID, key(), false, false));
        clock.advance(BASE_HOLDOFF_TIME_MILLIS * 100);
        assert_eq!(m.pending_count(), 1);

        let newer = AnqpNetworkKey::build("hs20", BSSID, MacAddress::ZERO, 5);
        assert!(m.request_elements(BSSID, newer.clone(), false, false));
        assert_eq!(m.pending_count(), 1);
        assert_eq!(m.on_request_completed(BSSID, true), Some(newer));
    }

    #[test]
    fn custom_policy() {
        let clock = ManualClock::new(0);
        let policy = HoldOffPolicy {
            base_millis: 100,
            max_count: 2,
        };
        let mut m =
            AnqpRequestManager::with_policy(RecordingTransport::accepting(), clock.clone(), policy);
        let mut deltas = Vec::new();
        for _ in 0..4 {
            assert!(m.request_elements(BSSID, key(), false, false));
            let expires = m.holdoff_info(BSSID).unwrap().expires_at_millis;
            deltas.push(expires - clock.elapsed_millis());
            clock.set(expires);
        }
        assert_eq!(deltas, vec![100, 200, 400, 400]);
        assert_eq!(policy.interval_millis(40), 400);
    }
}
