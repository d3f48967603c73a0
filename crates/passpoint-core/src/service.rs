// ── Passpoint service ──
//
// Confines the manager, evaluator and config store to a single tokio
// task. Scan dispatchers and ANQP completion callbacks on any thread talk
// to it through a cloneable `PasspointHandle`; commands are processed one
// at a time, so hold-off bookkeeping never races.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::anqp::{AnqpElementType, AnqpElements, AnqpNetworkKey};
use crate::clock::Clock;
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::error::CoreError;
use crate::evaluator::{NetworkEvaluator, PasspointNetworkEvaluator};
use crate::manager::PasspointManager;
use crate::model::{MacAddress, PasspointConfiguration, ScanDetail, WifiConfiguration};
use crate::request_manager::AnqpTransport;
use crate::store::NetworkConfigStore;

const COMMAND_CHANNEL_SIZE: usize = 64;

type Evaluator<T, C, S> = PasspointNetworkEvaluator<PasspointManager<T, C>, S>;

// ── PasspointService ─────────────────────────────────────────────

pub struct PasspointService<T, C, S> {
    evaluator: Evaluator<T, C, S>,
    sweep_interval: Option<Duration>,
}

impl<T, C, S> PasspointService<T, C, S>
where
    T: AnqpTransport + Send + 'static,
    C: Clock + Clone + 'static,
    S: NetworkConfigStore + Send + 'static,
{
    pub fn new(manager: PasspointManager<T, C>, store: S) -> Self {
        Self {
            evaluator: PasspointNetworkEvaluator::new(manager, store),
            sweep_interval: None,
        }
    }

    /// Sweep expired ANQP data on this period while running.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Start the service task on the current runtime.
    pub fn spawn(self) -> PasspointHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let sweep = self.sweep_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.reset();
            interval
        });

        let task = tokio::spawn(command_processor_task(
            self.evaluator,
            command_rx,
            sweep,
            cancel.clone(),
        ));
        info!("Passpoint service started");

        PasspointHandle {
            inner: Arc::new(HandleInner {
                command_tx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }
}

// ── PasspointHandle ──────────────────────────────────────────────

/// Cheaply cloneable handle to a running service.
#[derive(Clone)]
pub struct PasspointHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    command_tx: mpsc::Sender<CommandEnvelope>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PasspointHandle {
    /// Send a command to the service and await its result.
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ServiceStopped)?;

        rx.await.map_err(|_| CoreError::ServiceStopped)?
    }

    // ── Convenience wrappers ─────────────────────────────────────

    pub async fn add_or_update_provider(&self, config: PasspointConfiguration) -> Result<bool, CoreError> {
        match self
            .execute(Command::AddOrUpdateProvider(Box::new(config)))
            .await?
        {
            CommandResult::ProviderUpdated { replaced } => Ok(replaced),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn remove_provider(&self, fqdn: impl Into<String>) -> Result<bool, CoreError> {
        match self
            .execute(Command::RemoveProvider { fqdn: fqdn.into() })
            .await?
        {
            CommandResult::ProviderRemoved { removed } => Ok(removed),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn providers(&self) -> Result<Vec<String>, CoreError> {
        match self.execute(Command::ListProviders).await? {
            CommandResult::Providers(fqdns) => Ok(fqdns),
            other => Err(unexpected(&other)),
        }
    }

    /// Run one Passpoint selection pass over a scan.
    pub async fn evaluate(&self, scans: Vec<ScanDetail>) -> Result<Option<WifiConfiguration>, CoreError> {
        match self.execute(Command::EvaluateScans { scans }).await? {
            CommandResult::Selection(config) => Ok(config),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn anqp_response(
        &self,
        bssid: MacAddress,
        elements: Option<AnqpElements>,
    ) -> Result<Option<AnqpNetworkKey>, CoreError> {
        match self.execute(Command::AnqpResponse { bssid, elements }).await? {
            CommandResult::AnqpCompleted(key) => Ok(key),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn anqp_payload(
        &self,
        bssid: MacAddress,
        payloads: Vec<(AnqpElementType, Vec<u8>)>,
    ) -> Result<Option<AnqpNetworkKey>, CoreError> {
        match self.execute(Command::AnqpPayload { bssid, payloads }).await? {
            CommandResult::AnqpCompleted(key) => Ok(key),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn sweep_cache(&self) -> Result<usize, CoreError> {
        match self.execute(Command::SweepCache).await? {
            CommandResult::CacheSwept { removed } => Ok(removed),
            other => Err(unexpected(&other)),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop the service and wait for its task to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let task = self.inner.task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
        debug!("Passpoint service stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled() && !self.inner.command_tx.is_closed()
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Config {
        message: format!("unexpected command result: {result:?}"),
    }
}

// ── Background task ──────────────────────────────────────────────

async fn next_sweep(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Process commands one at a time until cancelled or every handle is
/// dropped.
async fn command_processor_task<T, C, S>(
    mut evaluator: Evaluator<T, C, S>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    mut sweep: Option<Interval>,
    cancel: CancellationToken,
) where
    T: AnqpTransport,
    C: Clock + Clone,
    S: NetworkConfigStore,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&mut evaluator, envelope.command);
                let _ = envelope.response_tx.send(result);
            }
            () = next_sweep(&mut sweep) => {
                let removed = evaluator.matcher_mut().sweep_cache();
                debug!(removed, "periodic ANQP cache sweep");
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

fn route_command<T, C, S>(
    evaluator: &mut Evaluator<T, C, S>,
    command: Command,
) -> Result<CommandResult, CoreError>
where
    T: AnqpTransport,
    C: Clock + Clone,
    S: NetworkConfigStore,
{
    match command {
        Command::AddOrUpdateProvider(config) => {
            let replaced = evaluator.matcher_mut().add_or_update_provider(*config);
            Ok(CommandResult::ProviderUpdated { replaced })
        }
        Command::RemoveProvider { fqdn } => {
            let removed = evaluator.matcher_mut().remove_provider(&fqdn);
            Ok(CommandResult::ProviderRemoved { removed })
        }
        Command::ListProviders => Ok(CommandResult::Providers(
            evaluator
                .matcher()
                .providers()
                .map(|p| p.fqdn().to_owned())
                .collect(),
        )),
        Command::EvaluateScans { scans } => {
            evaluator.update(&scans);
            let mut connectable = Vec::new();
            let selected = evaluator.evaluate_networks(&scans, &mut connectable);
            Ok(CommandResult::Selection(selected))
        }
        Command::AnqpResponse { bssid, elements } => Ok(CommandResult::AnqpCompleted(
            evaluator.matcher_mut().on_anqp_response(bssid, elements),
        )),
        Command::AnqpPayload { bssid, payloads } => {
            let key = evaluator.matcher_mut().on_anqp_payload(
                bssid,
                payloads
                    .iter()
                    .map(|(element_type, payload)| (*element_type, payload.as_slice())),
            )?;
            Ok(CommandResult::AnqpCompleted(key))
        }
        Command::SweepCache => Ok(CommandResult::CacheSwept {
            removed: evaluator.matcher_mut().sweep_cache(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::anqp::{AnqpElement, DomainNameElement, EapType};
    use crate::clock::ManualClock;
    use crate::model::{Credential, HomeSp, HsRelease};
    use crate::store::InMemoryConfigStore;
    use tokio_test::{assert_err, assert_ok};

    struct AcceptAll;

    impl AnqpTransport for AcceptAll {
        fn send_request(&mut self, _bssid: MacAddress, _elements: &[AnqpElementType]) -> bool {
            true
        }
    }

    const BSSID: MacAddress = MacAddress::new(0x0200_0000_00aa);

    fn provider() -> PasspointConfiguration {
        PasspointConfiguration {
            home_sp: HomeSp {
                fqdn: "example.com".into(),
                friendly_name: "Example".into(),
                roaming_consortium_ois: Vec::new(),
            },
            credential: Credential {
                realm: "example.com".into(),
                eap_type: Some(EapType::TLS),
                ..Credential::default()
            },
        }
    }

    fn spawn(clock: ManualClock) -> PasspointHandle {
        PasspointService::new(PasspointManager::new(AcceptAll, clock), InMemoryConfigStore::new())
            .spawn()
    }

    fn scan() -> ScanDetail {
        ScanDetail::new("hs20", BSSID, -48).with_passpoint(HsRelease::R1)
    }

    #[tokio::test]
    async fn selection_round_trip() {
        let handle = spawn(ManualClock::new(0));
        assert!(!handle.add_or_update_provider(provider()).await.unwrap());
        assert_eq!(handle.providers().await.unwrap(), vec!["example.com"]);

        // First pass: cache miss, query goes out.
        assert!(handle.evaluate(vec![scan()]).await.unwrap().is_none());

        let elements = AnqpElements::from([(
            AnqpElementType::DomainName,
            AnqpElement::DomainName(DomainNameElement {
                domains: vec!["example.com".into()],
            }),
        )]);
        let key = handle.anqp_response(BSSID, Some(elements)).await.unwrap();
        assert_eq!(key, Some(scan().network_key()));

        let selected = handle.evaluate(vec![scan()]).await.unwrap().unwrap();
        assert_eq!(selected.ssid, "hs20");
        assert_eq!(selected.fqdn, "example.com");
        assert!(selected.ephemeral);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_payload_surfaces_protocol_error() {
        let handle = spawn(ManualClock::new(0));
        assert_ok!(handle.add_or_update_provider(provider()).await);
        assert_ok!(handle.evaluate(vec![scan()]).await);

        let err = assert_err!(
            handle
                .anqp_payload(BSSID, vec![(AnqpElementType::NaiRealm, vec![1, 0, 9])])
                .await
        );
        assert!(err.is_protocol());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn commands_fail_after_shutdown() {
        let handle = spawn(ManualClock::new(0));
        handle.shutdown().await;
        assert!(!handle.is_running());
        assert!(matches!(
            handle.providers().await,
            Err(CoreError::ServiceStopped)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_sweep_expires_cache() {
        let clock = ManualClock::new(0);
        let handle = PasspointService::new(
            PasspointManager::with_settings(AcceptAll, clock.clone(), Default::default(), 1_000),
            InMemoryConfigStore::new(),
        )
        .with_sweep_interval(Duration::from_secs(60))
        .spawn();

        handle.add_or_update_provider(provider()).await.unwrap();
        handle.evaluate(vec![scan()]).await.unwrap();
        handle
            .anqp_response(
                BSSID,
                Some(AnqpElements::from([(
                    AnqpElementType::DomainName,
                    AnqpElement::DomainName(DomainNameElement::default()),
                )])),
            )
            .await
            .unwrap();

        clock.advance(1_000);
        tokio::time::sleep(Duration::from_secs(61)).await;

        // Already swept by the background tick.
        assert_eq!(handle.sweep_cache().await.unwrap(), 0);
        handle.shutdown().await;
    }
}
