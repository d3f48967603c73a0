//! `passpoint backoff`: the hold-off schedule an unresponsive AP sees.
//!
//! Drives a real request manager against a manual clock, retrying the
//! moment each hold-off expires and never answering.

use serde::Serialize;
use tabled::Tabled;

use passpoint_core::{
    AnqpElementType, AnqpNetworkKey, AnqpRequestManager, AnqpTransport, HoldOffPolicy, MacAddress,
    ManualClock,
};

use crate::cli::{BackoffArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Accepts every query and never answers.
struct Silent;

impl AnqpTransport for Silent {
    fn send_request(&mut self, _bssid: MacAddress, _elements: &[AnqpElementType]) -> bool {
        true
    }
}

type Simulator = AnqpRequestManager<Silent, ManualClock>;

const PROBE_BSSID: MacAddress = MacAddress::new(0x0200_0000_0001);

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct BackoffReport {
    policy: HoldOffPolicy,
    elements: Vec<AnqpElementType>,
    schedule: Vec<BackoffStep>,
}

#[derive(Debug, Serialize, Tabled)]
struct BackoffStep {
    #[tabled(rename = "Attempt")]
    attempt: u32,
    #[tabled(rename = "Sent at (s)", display_with = "secs")]
    sent_at_ms: u64,
    #[tabled(rename = "Hold-off (s)", display_with = "secs")]
    holdoff_ms: u64,
    #[tabled(rename = "Next at (s)", display_with = "secs")]
    retry_at_ms: u64,
    #[tabled(rename = "Count")]
    holdoff_count: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn secs(millis: &u64) -> String {
    let whole = millis / 1000;
    match millis % 1000 {
        0 => whole.to_string(),
        frac => format!("{whole}.{frac:03}"),
    }
}

fn simulate(policy: HoldOffPolicy, attempts: u32) -> Vec<BackoffStep> {
    let clock = ManualClock::new(0);
    let mut manager = Simulator::with_policy(Silent, clock.clone(), policy);
    let key = AnqpNetworkKey::build("probe", PROBE_BSSID, MacAddress::ZERO, 0);

    let mut schedule = Vec::new();
    let mut now = 0;
    for attempt in 1..=attempts {
        clock.set(now);
        if !manager.request_elements(PROBE_BSSID, key.clone(), false, false) {
            break;
        }
        let Some(info) = manager.holdoff_info(PROBE_BSSID) else {
            break;
        };
        schedule.push(BackoffStep {
            attempt,
            sent_at_ms: now,
            holdoff_ms: info.expires_at_millis - now,
            retry_at_ms: info.expires_at_millis,
            holdoff_count: info.count,
        });
        now = info.expires_at_millis;
    }
    schedule
}

// ── Handler ──────────────────────────────────────────────────────────

pub fn handle(args: &BackoffArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let policy = config.anqp.holdoff_policy();

    let report = BackoffReport {
        policy,
        elements: Simulator::request_element_ids(args.rc, args.r2),
        schedule: simulate(policy, args.attempts),
    };

    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let names: Vec<String> = r.elements.iter().map(ToString::to_string).collect();
            format!(
                "{}\nElements: {}",
                output::render_table(&r.schedule),
                names.join(", ")
            )
        },
        |r| {
            r.schedule
                .iter()
                .map(|step| step.holdoff_ms.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schedule_doubles_then_caps() {
        let steps = simulate(HoldOffPolicy::default(), 9);
        let holdoffs: Vec<u64> = steps.iter().map(|s| s.holdoff_ms / 1000).collect();
        assert_eq!(holdoffs, vec![10, 20, 40, 80, 160, 320, 640, 640, 640]);
        assert_eq!(steps[1].sent_at_ms, 10_000);
        assert_eq!(steps.last().map(|s| s.holdoff_count), Some(6));
    }

    #[test]
    fn zero_attempts_is_empty() {
        assert!(simulate(HoldOffPolicy::default(), 0).is_empty());
    }

    #[test]
    fn seconds_formatting() {
        assert_eq!(secs(&10_000), "10");
        assert_eq!(secs(&1_500), "1.500");
    }
}
