//! `passpoint providers`: the subscriptions in the config file.

use serde::Serialize;
use tabled::Tabled;

use passpoint_config::ProviderProfile;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// What gets shown for a profile. Never carries the password itself.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProviderSummary {
    #[tabled(rename = "FQDN")]
    pub fqdn: String,
    #[tabled(rename = "Name")]
    pub friendly_name: String,
    #[tabled(rename = "Realm")]
    pub realm: String,
    #[tabled(rename = "EAP")]
    pub eap_method: String,
    #[tabled(rename = "OIs", display_with = "display_ois")]
    pub roaming_consortium_ois: Vec<String>,
    #[tabled(rename = "Password")]
    pub password_source: String,
}

fn display_ois(ois: &[String]) -> String {
    if ois.is_empty() {
        "-".into()
    } else {
        ois.join(", ")
    }
}

/// Where the password would be resolved from, in resolution order.
fn password_source(profile: &ProviderProfile) -> String {
    let mut sources = Vec::new();
    if let Some(ref env) = profile.password_env {
        sources.push(format!("env:{env}"));
    }
    if profile.keyring {
        sources.push("keyring".into());
    }
    if profile.password.is_some() {
        sources.push("config".into());
    }
    if sources.is_empty() {
        "-".into()
    } else {
        sources.join(" > ")
    }
}

impl From<&ProviderProfile> for ProviderSummary {
    fn from(profile: &ProviderProfile) -> Self {
        Self {
            fqdn: profile.fqdn.clone(),
            friendly_name: profile.friendly_name.clone(),
            realm: profile.realm.clone(),
            eap_method: match profile.inner_method {
                Some(ref inner) => format!("{}/{inner}", profile.eap_method),
                None => profile.eap_method.clone(),
            },
            roaming_consortium_ois: profile.roaming_consortium_ois.clone(),
            password_source: password_source(profile),
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let summaries: Vec<ProviderSummary> = config.providers.iter().map(Into::into).collect();

    let out = output::render_list(
        &global.output,
        &summaries,
        ProviderSummary::clone,
        |s| s.fqdn.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_hides_password_and_lists_sources() {
        let profile = ProviderProfile {
            fqdn: "example.com".into(),
            realm: "example.com".into(),
            eap_method: "TTLS".into(),
            inner_method: Some("MS-CHAP-V2".into()),
            password: Some("hunter2".into()),
            password_env: Some("EXAMPLE_PW".into()),
            keyring: true,
            ..ProviderProfile::default()
        };
        let summary = ProviderSummary::from(&profile);
        assert_eq!(summary.eap_method, "TTLS/MS-CHAP-V2");
        assert_eq!(summary.password_source, "env:EXAMPLE_PW > keyring > config");
    }

    #[test]
    fn profile_without_password_shows_dash() {
        let profile = ProviderProfile {
            fqdn: "carrier.net".into(),
            keyring: false,
            ..ProviderProfile::default()
        };
        assert_eq!(password_source(&profile), "-");
        assert_eq!(display_ois(&[]), "-");
    }
}
