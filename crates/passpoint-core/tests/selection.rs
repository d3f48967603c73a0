//! End-to-end Passpoint selection: scans, ANQP queries, raw ANQP
//! responses and network registration, driven through the public API.
#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use passpoint_core::anqp::{EapType, NonEapInnerAuth};
use passpoint_core::{
    AnqpElementType, AnqpTransport, Credential, HomeSp, HsRelease, InMemoryConfigStore,
    MacAddress, ManualClock, NetworkEvaluator, NetworkId, PasspointConfiguration,
    PasspointManager, PasspointNetworkEvaluator, ScanDetail,
};
use pretty_assertions::assert_eq;

// ── Fixtures ────────────────────────────────────────────────────────

type Sent = Rc<RefCell<Vec<(MacAddress, Vec<AnqpElementType>)>>>;

struct SharedTransport(Sent);

impl AnqpTransport for SharedTransport {
    fn send_request(&mut self, bssid: MacAddress, elements: &[AnqpElementType]) -> bool {
        self.0.borrow_mut().push((bssid, elements.to_vec()));
        true
    }
}

const HESSID: MacAddress = MacAddress::new(0x0a00_0000_0001);
const NEAR: MacAddress = MacAddress::new(0x0200_0000_0060);
const FAR: MacAddress = MacAddress::new(0x0200_0000_0070);

fn provider() -> PasspointConfiguration {
    PasspointConfiguration {
        home_sp: HomeSp {
            fqdn: "example.com".into(),
            friendly_name: "Example Wireless".into(),
            roaming_consortium_ois: vec![0x506f9a],
        },
        credential: Credential {
            realm: "example.com".into(),
            eap_type: Some(EapType::TTLS),
            non_eap_inner_method: Some(NonEapInnerAuth::MsChapV2),
            username: Some("alice".into()),
            password: None,
        },
    }
}

fn scan(bssid: MacAddress, rssi: i32) -> ScanDetail {
    ScanDetail::new("Example Hotspot", bssid, rssi)
        .with_passpoint(HsRelease::R2)
        .with_anqp_domain(HESSID, 1)
}

/// NAI Realm element: one record for `example.com`, TTLS with
/// MS-CHAP-V2 inner auth.
fn nai_realm_payload() -> Vec<u8> {
    let mut payload = vec![1, 0, 20, 0, 0, 11];
    payload.extend_from_slice(b"example.com");
    payload.extend_from_slice(&[1, 5, 21, 1, 2, 1, 4]);
    payload
}

fn domain_payload() -> Vec<u8> {
    let mut payload = vec![11];
    payload.extend_from_slice(b"example.com");
    payload
}

// ── Scenarios ───────────────────────────────────────────────────────

#[test]
fn strongest_ap_of_matching_ess_is_selected() {
    let sent = Sent::default();
    let clock = ManualClock::new(0);
    let mut manager = PasspointManager::new(SharedTransport(Rc::clone(&sent)), clock);
    manager.add_or_update_provider(provider());
    let mut evaluator = PasspointNetworkEvaluator::new(manager, InMemoryConfigStore::new());

    let scans = vec![scan(FAR, -70), scan(NEAR, -60)];

    // Nothing cached yet: one query per AP, no selection.
    let mut connectable = Vec::new();
    assert!(evaluator.evaluate_networks(&scans, &mut connectable).is_none());
    assert_eq!(sent.borrow().len(), 2);
    assert_eq!(sent.borrow()[0].1.len(), 8);

    // Both APs share the HESSID key, so one answer serves the ESS.
    let realm = nai_realm_payload();
    let domain = domain_payload();
    let key = evaluator
        .matcher_mut()
        .on_anqp_payload(
            FAR,
            [
                (AnqpElementType::NaiRealm, realm.as_slice()),
                (AnqpElementType::DomainName, domain.as_slice()),
            ],
        )
        .unwrap();
    assert_eq!(key, Some(scans[0].network_key()));

    let config = evaluator.evaluate_networks(&scans, &mut connectable).unwrap();
    assert_eq!(config.ssid, "Example Hotspot");
    assert_eq!(config.fqdn, "example.com");
    assert_eq!(config.network_id, Some(NetworkId(0)));
    assert!(config.ephemeral);
    assert_eq!(connectable.len(), 1);
    assert_eq!(connectable[0].0.bssid, NEAR);
    assert_eq!(
        evaluator.store().candidate(NetworkId(0)).map(|c| c.scan.bssid),
        Some(NEAR)
    );
}

#[test]
fn identical_input_selects_identical_network() {
    let run = || {
        let sent = Sent::default();
        let mut manager = PasspointManager::new(SharedTransport(sent), ManualClock::new(0));
        manager.add_or_update_provider(provider());
        let mut evaluator = PasspointNetworkEvaluator::new(manager, InMemoryConfigStore::new());
        let scans = vec![scan(NEAR, -65), scan(FAR, -65)];
        evaluator.evaluate_networks(&scans, &mut Vec::new());

        let realm = nai_realm_payload();
        evaluator
            .matcher_mut()
            .on_anqp_payload(NEAR, [(AnqpElementType::NaiRealm, realm.as_slice())])
            .unwrap();
        let mut connectable = Vec::new();
        evaluator.evaluate_networks(&scans, &mut connectable).unwrap();
        connectable.pop().map(|(scan, config)| (scan.bssid, config.fqdn))
    };
    let first = run();
    assert_eq!(first, Some((NEAR, "example.com".to_owned())));
    for _ in 0..5 {
        assert_eq!(run(), first);
    }
}

#[test]
fn realm_mismatch_selects_nothing() {
    let sent = Sent::default();
    let mut manager = PasspointManager::new(SharedTransport(sent), ManualClock::new(0));
    let mut other = provider();
    other.home_sp.fqdn = "other.org".into();
    other.credential.realm = "other.org".into();
    manager.add_or_update_provider(other);
    let mut evaluator = PasspointNetworkEvaluator::new(manager, InMemoryConfigStore::new());

    let scans = vec![scan(NEAR, -50)];
    evaluator.evaluate_networks(&scans, &mut Vec::new());
    let realm = nai_realm_payload();
    evaluator
        .matcher_mut()
        .on_anqp_payload(NEAR, [(AnqpElementType::NaiRealm, realm.as_slice())])
        .unwrap();

    assert!(evaluator.evaluate_networks(&scans, &mut Vec::new()).is_none());
    assert!(evaluator.store().is_empty());
}
