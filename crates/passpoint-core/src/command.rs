// ── Service commands ──
//
// Every interaction with a running `PasspointService` is a `Command`
// sent through the handle's channel and answered with a `CommandResult`.

use crate::anqp::{AnqpElementType, AnqpElements, AnqpNetworkKey};
use crate::error::CoreError;
use crate::model::{MacAddress, PasspointConfiguration, ScanDetail, WifiConfiguration};

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

#[derive(Debug, Clone)]
pub enum Command {
    // ── Provider operations ──────────────────────────────────────────
    AddOrUpdateProvider(Box<PasspointConfiguration>),
    RemoveProvider {
        fqdn: String,
    },
    ListProviders,

    // ── Scan / selection ─────────────────────────────────────────────
    EvaluateScans {
        scans: Vec<ScanDetail>,
    },

    // ── ANQP completions ─────────────────────────────────────────────
    /// Decoded response; `None` reports a failed query.
    AnqpResponse {
        bssid: MacAddress,
        elements: Option<AnqpElements>,
    },
    /// Raw response, decoded inside the service.
    AnqpPayload {
        bssid: MacAddress,
        payloads: Vec<(AnqpElementType, Vec<u8>)>,
    },
    SweepCache,
}

#[derive(Debug, Clone)]
pub enum CommandResult {
    ProviderUpdated { replaced: bool },
    ProviderRemoved { removed: bool },
    Providers(Vec<String>),
    Selection(Option<WifiConfiguration>),
    AnqpCompleted(Option<AnqpNetworkKey>),
    CacheSwept { removed: usize },
}
