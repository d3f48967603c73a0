// ── ANQP element catalogue ──
//
// Element identifiers the request manager asks for, plus the decoded
// forms of the elements provider matching actually reads. Everything
// else is kept as opaque bytes.

use std::collections::BTreeMap;

use bytes::Buf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::nai_realm::NaiRealmElement;
use super::reader::{be_uint, decode_string, read_u8_prefixed};
use crate::error::ProtocolError;

/// ANQP elements (IEEE 802.11u info IDs and Hotspot 2.0 subtypes).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum AnqpElementType {
    VenueName,
    RoamingConsortium,
    IpAddrAvailability,
    NaiRealm,
    #[strum(serialize = "3gpp-network")]
    #[serde(rename = "3gpp-network")]
    ThreeGppNetwork,
    DomainName,
    HsFriendlyName,
    HsWanMetrics,
    HsConnCapability,
}

impl AnqpElementType {
    /// On-air identifier: an ANQP info ID, or the HS2.0 vendor subtype.
    pub fn wire_id(self) -> u16 {
        match self {
            Self::VenueName => 258,
            Self::RoamingConsortium => 261,
            Self::IpAddrAvailability => 262,
            Self::NaiRealm => 263,
            Self::ThreeGppNetwork => 264,
            Self::DomainName => 268,
            Self::HsFriendlyName => 3,
            Self::HsWanMetrics => 4,
            Self::HsConnCapability => 5,
        }
    }

    /// True for elements carried in the WFA vendor-specific HS2.0 container.
    pub fn is_hotspot2(self) -> bool {
        matches!(
            self,
            Self::HsFriendlyName | Self::HsWanMetrics | Self::HsConnCapability
        )
    }
}

/// Domain Name element: the FQDNs of the operators behind the AP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainNameElement {
    pub domains: Vec<String>,
}

impl DomainNameElement {
    pub fn parse(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        let mut domains = Vec::new();
        while buf.has_remaining() {
            let raw = read_u8_prefixed(buf, "domain name length")?;
            domains.push(decode_string(&raw, false, "domain name")?);
        }
        Ok(Self { domains })
    }
}

/// Roaming Consortium element: organization identifiers the AP serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoamingConsortiumElement {
    pub ois: Vec<u64>,
}

impl RoamingConsortiumElement {
    pub fn parse(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        let mut ois = Vec::new();
        while buf.has_remaining() {
            let raw = read_u8_prefixed(buf, "OI length")?;
            if raw.is_empty() || raw.len() > 8 {
                return Err(ProtocolError::InvalidOiLength { length: raw.len() });
            }
            ois.push(be_uint(&raw));
        }
        Ok(Self { ois })
    }
}

/// A decoded ANQP element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum AnqpElement {
    NaiRealm(NaiRealmElement),
    DomainName(DomainNameElement),
    RoamingConsortium(RoamingConsortiumElement),
    Opaque { payload: Vec<u8> },
}

impl AnqpElement {
    /// Decode a raw element payload of the given type.
    pub fn parse(element_type: AnqpElementType, payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        Ok(match element_type {
            AnqpElementType::NaiRealm => Self::NaiRealm(NaiRealmElement::parse(&mut buf)?),
            AnqpElementType::DomainName => Self::DomainName(DomainNameElement::parse(&mut buf)?),
            AnqpElementType::RoamingConsortium => {
                Self::RoamingConsortium(RoamingConsortiumElement::parse(&mut buf)?)
            }
            _ => Self::Opaque {
                payload: payload.to_vec(),
            },
        })
    }
}

/// All elements received for one ESS.
pub type AnqpElements = BTreeMap<AnqpElementType, AnqpElement>;

/// Decode a full ANQP response. The first malformed element fails the
/// whole response.
pub fn parse_elements<'a>(
    raw: impl IntoIterator<Item = (AnqpElementType, &'a [u8])>,
) -> Result<AnqpElements, ProtocolError> {
    raw.into_iter()
        .map(|(element_type, payload)| {
            AnqpElement::parse(element_type, payload).map(|element| (element_type, element))
        })
        .collect()
}
