// ── Domain model ──
//
// Plain data carried between the scan dispatcher, the provider store and
// the network configuration store.

pub mod mac;
pub mod network;
pub mod provider;
pub mod scan;

// ── Re-exports ──────────────────────────────────────────────────────

pub use mac::{MacAddress, ParseMacError};
pub use network::{EnterpriseConfig, NetworkId, WifiConfiguration};
pub use provider::{Credential, HomeSp, PasspointConfiguration};
pub use scan::{HsRelease, ScanDetail};
