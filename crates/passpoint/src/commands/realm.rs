//! `passpoint realm`: decode NAI Realm payloads and match credentials
//! against them.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;

use passpoint_core::anqp::{EapMethod, EapType, NaiRealmData, NonEapInnerAuth};
use passpoint_core::{AuthMatch, Credential, NaiRealmElement};

use crate::cli::{GlobalOpts, RealmArgs, RealmCommand};
use crate::error::CliError;
use crate::output;
use crate::scenario::decode_hex;

fn parse_element(payload: &str) -> Result<NaiRealmElement, CliError> {
    let bytes = decode_hex(payload)?;
    let mut buf = bytes.as_slice();
    NaiRealmElement::parse(&mut buf).map_err(CliError::MalformedRealm)
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Decode ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Realms")]
    realms: String,
    #[tabled(rename = "EAP Methods")]
    methods: String,
}

// ── Match ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MatchReport {
    realm: String,
    method: EapMethod,
    result: AuthMatch,
    label: String,
    records: Vec<RecordMatch>,
}

#[derive(Debug, Serialize, Tabled)]
struct RecordMatch {
    #[tabled(rename = "Realms", display_with = "display_realms")]
    realms: Vec<String>,
    #[tabled(rename = "Result")]
    result: AuthMatch,
}

fn display_realms(realms: &[String]) -> String {
    realms.join(", ")
}

fn credential_method(eap: &str, inner: Option<&str>) -> Result<EapMethod, CliError> {
    let eap_type = EapType::from_name(eap).ok_or_else(|| CliError::Validation {
        field: "eap".into(),
        reason: format!("unknown EAP method '{eap}'"),
    })?;
    let non_eap_inner_method = inner
        .map(|name| {
            NonEapInnerAuth::from_str(name).map_err(|_| CliError::Validation {
                field: "inner".into(),
                reason: format!("unknown inner method '{name}'"),
            })
        })
        .transpose()?;

    let credential = Credential {
        eap_type: Some(eap_type),
        non_eap_inner_method,
        ..Credential::default()
    };
    credential.eap_method().ok_or_else(|| CliError::Validation {
        field: "eap".into(),
        reason: "credential has no EAP method".into(),
    })
}

fn match_report(element: &NaiRealmElement, realm: &str, method: EapMethod) -> MatchReport {
    let records = element
        .records()
        .iter()
        .map(|record: &NaiRealmData| RecordMatch {
            realms: record.realms().to_vec(),
            result: record.match_credential(realm, &method),
        })
        .collect();
    let result = element.match_credential(realm, &method);
    MatchReport {
        realm: realm.to_owned(),
        method,
        result,
        label: result.to_string(),
        records,
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub fn handle(args: RealmArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        RealmCommand::Decode { payload } => {
            let element = parse_element(&payload)?;
            output::render_list(
                &global.output,
                element.records(),
                |record| RecordRow {
                    realms: record.realms().join(", "),
                    methods: join(record.eap_methods()),
                },
                |record| record.to_string(),
            )?
        }
        RealmCommand::Match {
            payload,
            realm,
            eap,
            inner,
        } => {
            let element = parse_element(&payload)?;
            let method = credential_method(&eap, inner.as_deref())?;
            let report = match_report(&element, &realm, method);
            let color = output::should_color(&global.color);
            output::render_single(
                &global.output,
                &report,
                |r| {
                    let verdict = if r.result.is_none() {
                        output::muted(&r.label, color)
                    } else {
                        output::good(&r.label, color)
                    };
                    format!(
                        "{}\nCredential: {} via {}\nResult: {verdict}",
                        output::render_table(&r.records),
                        r.realm,
                        r.method
                    )
                },
                |r| r.label.clone(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
