// ── ANQP ──
//
// Everything learned from an AP before association: the key its answers
// are cached under, the decoded elements, and the cache itself.

pub mod cache;
pub mod eap;
pub mod elements;
pub mod nai_realm;
pub mod network_key;

pub(crate) mod reader;

pub use cache::{AnqpCache, AnqpData, DATA_LIFETIME_MILLIS};
pub use eap::{AuthParam, AuthParamKind, CredentialType, EapMethod, EapType, NonEapInnerAuth};
pub use elements::{
    AnqpElement, AnqpElementType, AnqpElements, DomainNameElement, RoamingConsortiumElement,
    parse_elements,
};
pub use nai_realm::{NaiRealmData, NaiRealmElement};
pub use network_key::AnqpNetworkKey;
