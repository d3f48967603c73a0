// passpoint-core: ANQP request scheduling and Passpoint provider matching.
//
// The engine is synchronous; `service` wraps it in a tokio task for
// callers that deliver scans and ANQP completions from several threads.

pub mod anqp;
pub mod clock;
pub mod command;
pub mod error;
pub mod evaluator;
pub mod manager;
pub mod matching;
pub mod model;
pub mod provider;
pub mod request_manager;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use anqp::{AnqpCache, AnqpElementType, AnqpElements, AnqpNetworkKey, NaiRealmElement};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use command::{Command, CommandResult};
pub use error::{CoreError, ProtocolError};
pub use evaluator::{Candidate, NetworkEvaluator, PasspointNetworkEvaluator, ProviderMatcher};
pub use manager::PasspointManager;
pub use matching::{AuthMatch, PasspointMatch, PasspointMatchInfo, ProviderMatch};
pub use provider::PasspointProvider;
pub use request_manager::{AnqpRequestManager, AnqpTransport, HoldOffInfo, HoldOffPolicy};
pub use service::{PasspointHandle, PasspointService};
pub use store::{InMemoryConfigStore, NetworkConfigStore};

// Model types at the crate root for ergonomics.
pub use model::{
    Credential, EnterpriseConfig, HomeSp, HsRelease, MacAddress, NetworkId,
    PasspointConfiguration, ScanDetail, WifiConfiguration,
};
