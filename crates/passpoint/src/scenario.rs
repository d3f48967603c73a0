//! Recorded selection scenarios.
//!
//! A scenario is a scan plus the ANQP answers the APs gave, replayed
//! through the selection engine by `passpoint select`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use passpoint_config::ProviderProfile;
use passpoint_core::{AnqpElementType, MacAddress, ScanDetail};

use crate::error::CliError;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Scenario {
    /// Providers installed on top of the configured ones.
    #[serde(default)]
    pub providers: Vec<ProviderProfile>,

    #[serde(default)]
    pub scans: Vec<ScanDetail>,

    /// ANQP answers, delivered in order after the first pass.
    #[serde(default)]
    pub anqp: Vec<AnqpReply>,
}

/// One AP's ANQP answer. Element bodies are hex strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnqpReply {
    pub bssid: MacAddress,

    #[serde(default)]
    pub elements: BTreeMap<AnqpElementType, String>,

    /// The query timed out or was refused.
    #[serde(default)]
    pub failed: bool,
}

impl AnqpReply {
    /// Decode the hex element bodies.
    pub fn payloads(&self) -> Result<Vec<(AnqpElementType, Vec<u8>)>, CliError> {
        self.elements
            .iter()
            .map(|(element_type, body)| Ok((*element_type, decode_hex(body)?)))
            .collect()
    }
}

/// Load a scenario; `.yaml`/`.yml` files are YAML, everything else JSON.
pub fn load(path: &Path) -> Result<Scenario, CliError> {
    let wrap = |source: Box<dyn std::error::Error + Send + Sync>| CliError::Scenario {
        path: path.display().to_string(),
        source,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| wrap(Box::new(e)))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&raw).map_err(|e| wrap(Box::new(e)))
    } else {
        serde_json::from_str(&raw).map_err(|e| wrap(Box::new(e)))
    }
}

/// Hex decode, ignoring whitespace and `:` separators.
pub fn decode_hex(raw: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    Ok(hex::decode(digits)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn hex_separators_are_ignored() {
        assert_eq!(decode_hex("01:0b 0c").unwrap(), vec![0x01, 0x0b, 0x0c]);
        assert!(decode_hex("0g").is_err());
    }

    #[test]
    fn loads_yaml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            b"scans:\n  - ssid: Hotspot\n    bssid: \"02:00:00:00:00:01\"\n    rssi: -60\n    interworking: true\n\
anqp:\n  - bssid: \"02:00:00:00:00:01\"\n    elements:\n      domain-name: \"0b6578616d706c652e636f6d\"\n",
        )
        .unwrap();

        let scenario = load(file.path()).unwrap();
        assert_eq!(scenario.scans.len(), 1);
        assert_eq!(scenario.scans[0].rssi, -60);
        let payloads = scenario.anqp[0].payloads().unwrap();
        assert_eq!(payloads[0].0, AnqpElementType::DomainName);
        assert_eq!(payloads[0].1[0], 11);
    }

    #[test]
    fn unreadable_scenario_is_a_scenario_error() {
        let err = load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(matches!(err, CliError::Scenario { .. }));
    }
}
