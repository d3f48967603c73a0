//! `passpoint select`: replay a recorded scenario through the selection
//! service.
//!
//! The first pass over the scan queries ANQP from every Passpoint AP with
//! nothing cached. The scenario's recorded answers are then delivered and
//! a second pass picks the network.

use serde::Serialize;
use tabled::Tabled;
use tokio::sync::mpsc;
use tracing::{debug, info};

use passpoint_config::{Config, ProviderProfile, profile_to_configuration};
use passpoint_core::{
    AnqpElementType, AnqpTransport, CoreError, InMemoryConfigStore, MacAddress, MonotonicClock,
    PasspointHandle, PasspointManager, PasspointService, WifiConfiguration,
};

use crate::cli::{GlobalOpts, SelectArgs};
use crate::error::CliError;
use crate::output;
use crate::scenario::{self, AnqpReply};

// ── Transport ────────────────────────────────────────────────────────

/// Accepts every query and reports it back to the command.
struct RecordingTransport {
    sent: mpsc::UnboundedSender<QueryRecord>,
}

impl AnqpTransport for RecordingTransport {
    fn send_request(&mut self, bssid: MacAddress, elements: &[AnqpElementType]) -> bool {
        info!(%bssid, elements = elements.len(), "ANQP query");
        self.sent
            .send(QueryRecord {
                bssid,
                elements: elements.to_vec(),
            })
            .is_ok()
    }
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
struct QueryRecord {
    #[tabled(rename = "BSSID")]
    bssid: MacAddress,
    #[tabled(rename = "Elements", display_with = "display_elements")]
    elements: Vec<AnqpElementType>,
}

fn display_elements(elements: &[AnqpElementType]) -> String {
    elements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Serialize, Tabled)]
struct AnqpOutcome {
    #[tabled(rename = "BSSID")]
    bssid: MacAddress,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

#[derive(Debug, Serialize)]
struct SelectReport {
    providers: Vec<String>,
    queries: Vec<QueryRecord>,
    anqp: Vec<AnqpOutcome>,
    selected: Option<WifiConfiguration>,
}

fn describe_selection(report: &SelectReport, color: bool) -> String {
    let mut sections = Vec::new();
    if !report.queries.is_empty() {
        sections.push(format!(
            "ANQP queries\n{}",
            output::render_table(&report.queries)
        ));
    }
    if !report.anqp.is_empty() {
        sections.push(format!(
            "ANQP responses\n{}",
            output::render_table(&report.anqp)
        ));
    }
    sections.push(match report.selected {
        Some(ref config) => {
            let id = config
                .network_id
                .map(|id| format!(" {id}"))
                .unwrap_or_default();
            format!(
                "Selected: {} via {} ({}){id}",
                output::good(&config.ssid, color),
                config.fqdn,
                config.provider_friendly_name
            )
        }
        None => output::muted("No Passpoint network selected", color),
    });
    sections.join("\n\n")
}

// ── Scenario replay ──────────────────────────────────────────────────

fn collect_profiles<'a>(
    config: &'a Config,
    extra: &'a [ProviderProfile],
    scenario_only: bool,
) -> impl Iterator<Item = &'a ProviderProfile> {
    let configured: &[ProviderProfile] = if scenario_only {
        &[]
    } else {
        &config.providers
    };
    configured.iter().chain(extra)
}

async fn deliver(handle: &PasspointHandle, reply: &AnqpReply) -> Result<String, CliError> {
    if reply.failed {
        handle.anqp_response(reply.bssid, None).await?;
        return Ok("failed".into());
    }

    let payloads = reply.payloads()?;
    match handle.anqp_payload(reply.bssid, payloads).await {
        Ok(Some(key)) => Ok(format!("cached as {key}")),
        Ok(None) => Ok("ignored (no query pending)".into()),
        Err(CoreError::Protocol(source)) => {
            debug!(bssid = %reply.bssid, error = %source, "scenario ANQP reply rejected");
            Ok(format!("malformed: {source}"))
        }
        Err(e) => Err(e.into()),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: &SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let scenario = scenario::load(&args.scenario)?;

    let (sent_tx, mut sent_rx) = mpsc::unbounded_channel();
    let manager = PasspointManager::with_settings(
        RecordingTransport { sent: sent_tx },
        MonotonicClock::new(),
        config.anqp.holdoff_policy(),
        config.anqp.cache_lifetime_ms,
    );
    let mut service = PasspointService::new(manager, InMemoryConfigStore::new());
    if let Some(interval) = config.anqp.sweep_interval() {
        service = service.with_sweep_interval(interval);
    }
    let handle = service.spawn();

    let result = replay(&handle, &config, &scenario, args.scenario_providers_only).await;
    handle.shutdown().await;
    let (providers, anqp, selected) = result?;

    let mut queries = Vec::new();
    while let Ok(query) = sent_rx.try_recv() {
        queries.push(query);
    }

    let report = SelectReport {
        providers,
        queries,
        anqp,
        selected,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| describe_selection(r, color),
        |r| {
            r.selected
                .as_ref()
                .map(|config| config.ssid.clone())
                .unwrap_or_default()
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

type Replay = (Vec<String>, Vec<AnqpOutcome>, Option<WifiConfiguration>);

async fn replay(
    handle: &PasspointHandle,
    config: &Config,
    scenario: &scenario::Scenario,
    scenario_only: bool,
) -> Result<Replay, CliError> {
    for profile in collect_profiles(config, &scenario.providers, scenario_only) {
        let replaced = handle
            .add_or_update_provider(profile_to_configuration(profile)?)
            .await?;
        debug!(fqdn = %profile.fqdn, replaced, "provider installed");
    }
    let providers = handle.providers().await?;

    let mut selected = handle.evaluate(scenario.scans.clone()).await?;
    if scenario.anqp.is_empty() {
        return Ok((providers, Vec::new(), selected));
    }

    let mut outcomes = Vec::with_capacity(scenario.anqp.len());
    for reply in &scenario.anqp {
        let outcome = deliver(handle, reply).await?;
        outcomes.push(AnqpOutcome {
            bssid: reply.bssid,
            outcome,
        });
    }

    selected = handle.evaluate(scenario.scans.clone()).await?;
    Ok((providers, outcomes, selected))
}
