// ── EAP method descriptors ──
//
// An NAI Realm record lists the EAP methods an AP accepts for a realm,
// each with an optional set of authentication parameters. The same type
// describes the method a stored credential will use, so the two sides
// can be compared directly.

use std::collections::BTreeSet;
use std::fmt;

use bytes::Buf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumString};

use super::reader::{be_uint, read_bytes, read_u8};
use crate::error::ProtocolError;
use crate::matching::AuthMatch;

/// IANA EAP method type number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EapType(pub u8);

impl EapType {
    pub const TLS: Self = Self(13);
    pub const SIM: Self = Self(18);
    pub const TTLS: Self = Self(21);
    pub const AKA: Self = Self(23);
    pub const PEAP: Self = Self(25);
    pub const MSCHAP_V2: Self = Self(26);
    pub const AKA_PRIME: Self = Self(50);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::TLS => "TLS",
            Self::SIM => "SIM",
            Self::TTLS => "TTLS",
            Self::AKA => "AKA",
            Self::PEAP => "PEAP",
            Self::MSCHAP_V2 => "MSCHAPv2",
            Self::AKA_PRIME => "AKA'",
            _ => return None,
        })
    }

    /// Parse a method by name (`"TTLS"`) or number (`"21"`).
    pub fn from_name(name: &str) -> Option<Self> {
        if let Ok(n) = name.parse::<u8>() {
            return Some(Self(n));
        }
        [
            Self::TLS,
            Self::SIM,
            Self::TTLS,
            Self::AKA,
            Self::PEAP,
            Self::MSCHAP_V2,
            Self::AKA_PRIME,
        ]
        .into_iter()
        .find(|t| t.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

impl fmt::Display for EapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "EAP({})", self.0),
        }
    }
}

/// Non-EAP inner authentication used inside a TTLS tunnel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
pub enum NonEapInnerAuth {
    #[strum(serialize = "reserved")]
    Reserved,
    #[strum(serialize = "PAP")]
    Pap,
    #[strum(serialize = "CHAP")]
    Chap,
    #[strum(serialize = "MS-CHAP")]
    MsChap,
    #[strum(serialize = "MS-CHAP-V2")]
    MsChapV2,
}

impl NonEapInnerAuth {
    fn from_wire(value: u8) -> Self {
        match value {
            1 => Self::Pap,
            2 => Self::Chap,
            3 => Self::MsChap,
            4 => Self::MsChapV2,
            _ => Self::Reserved,
        }
    }
}

/// Kind of credential the AP expects (or the device holds).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CredentialType {
    Sim,
    Usim,
    Nfc,
    HardwareToken,
    SoftToken,
    Certificate,
    UsernamePassword,
    Anonymous,
    Reserved,
    VendorSpecific,
}

impl CredentialType {
    fn from_wire(value: u8) -> Self {
        match value {
            1 => Self::Sim,
            2 => Self::Usim,
            3 => Self::Nfc,
            4 => Self::HardwareToken,
            5 => Self::SoftToken,
            6 => Self::Certificate,
            7 => Self::UsernamePassword,
            8 => Self::Anonymous,
            10 => Self::VendorSpecific,
            _ => Self::Reserved,
        }
    }
}

/// One authentication parameter attached to an EAP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(AuthParamKind), derive(Hash, PartialOrd, Ord, Display))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthParam {
    ExpandedEapMethod { vendor_id: u32, vendor_type: u32 },
    NonEapInnerAuth { method: NonEapInnerAuth },
    InnerEapMethod { eap_type: EapType },
    ExpandedInnerEapMethod { vendor_id: u32, vendor_type: u32 },
    Credential { credential: CredentialType },
    TunneledEapCredential { credential: CredentialType },
    VendorSpecific { data: Vec<u8> },
}

impl AuthParam {
    const EXPANDED_EAP_METHOD: u8 = 1;
    const NON_EAP_INNER_AUTH: u8 = 2;
    const INNER_EAP_METHOD: u8 = 3;
    const EXPANDED_INNER_EAP_METHOD: u8 = 4;
    const CREDENTIAL: u8 = 5;
    const TUNNELED_EAP_CREDENTIAL: u8 = 6;
    const VENDOR_SPECIFIC: u8 = 221;

    pub fn kind(&self) -> AuthParamKind {
        AuthParamKind::from(self)
    }

    fn decode(id: u8, value: &[u8]) -> Result<Self, ProtocolError> {
        let fixed = |expected: usize| {
            if value.len() == expected {
                Ok(())
            } else {
                Err(ProtocolError::InvalidAuthParamLength {
                    id,
                    length: value.len(),
                })
            }
        };
        let expanded = || -> Result<(u32, u32), ProtocolError> {
            fixed(7)?;
            let vendor_id = u32::try_from(be_uint(&value[..3])).unwrap_or_default();
            let vendor_type = u32::try_from(be_uint(&value[3..])).unwrap_or_default();
            Ok((vendor_id, vendor_type))
        };

        match id {
            Self::EXPANDED_EAP_METHOD => {
                let (vendor_id, vendor_type) = expanded()?;
                Ok(Self::ExpandedEapMethod {
                    vendor_id,
                    vendor_type,
                })
            }
            Self::NON_EAP_INNER_AUTH => {
                fixed(1)?;
                Ok(Self::NonEapInnerAuth {
                    method: NonEapInnerAuth::from_wire(value[0]),
                })
            }
            Self::INNER_EAP_METHOD => {
                fixed(1)?;
                Ok(Self::InnerEapMethod {
                    eap_type: EapType(value[0]),
                })
            }
            Self::EXPANDED_INNER_EAP_METHOD => {
                let (vendor_id, vendor_type) = expanded()?;
                Ok(Self::ExpandedInnerEapMethod {
                    vendor_id,
                    vendor_type,
                })
            }
            Self::CREDENTIAL => {
                fixed(1)?;
                Ok(Self::Credential {
                    credential: CredentialType::from_wire(value[0]),
                })
            }
            Self::TUNNELED_EAP_CREDENTIAL => {
                fixed(1)?;
                Ok(Self::TunneledEapCredential {
                    credential: CredentialType::from_wire(value[0]),
                })
            }
            Self::VENDOR_SPECIFIC => Ok(Self::VendorSpecific {
                data: value.to_vec(),
            }),
            other => Err(ProtocolError::UnknownAuthParam { id: other }),
        }
    }
}

impl fmt::Display for AuthParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpandedEapMethod {
                vendor_id,
                vendor_type,
            }
            | Self::ExpandedInnerEapMethod {
                vendor_id,
                vendor_type,
            } => write!(f, "{}({vendor_id:06x}:{vendor_type:08x})", self.kind()),
            Self::NonEapInnerAuth { method } => write!(f, "NonEapInnerAuth({method})"),
            Self::InnerEapMethod { eap_type } => write!(f, "InnerEapMethod({eap_type})"),
            Self::Credential { credential } => write!(f, "Credential({credential})"),
            Self::TunneledEapCredential { credential } => {
                write!(f, "TunneledEapCredential({credential})")
            }
            Self::VendorSpecific { data } => write!(f, "VendorSpecific({} bytes)", data.len()),
        }
    }
}

/// An EAP method with its authentication parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EapMethod {
    pub eap_type: EapType,
    #[serde(default)]
    pub auth_params: Vec<AuthParam>,
}

impl EapMethod {
    pub fn new(eap_type: EapType) -> Self {
        Self {
            eap_type,
            auth_params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: AuthParam) -> Self {
        self.auth_params.push(param);
        self
    }

    /// Decode one length-prefixed EAP method record.
    pub fn parse(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        let length = usize::from(read_u8(buf, "EAP method length")?);
        let mut record = read_bytes(buf, length)?;

        let eap_type = EapType(read_u8(&mut record, "EAP method type")?);
        let count = read_u8(&mut record, "auth param count")?;
        let mut auth_params = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let id = read_u8(&mut record, "auth param id")?;
            let len = usize::from(read_u8(&mut record, "auth param length")?);
            let value = read_bytes(&mut record, len)?;
            auth_params.push(AuthParam::decode(id, &value)?);
        }

        Ok(Self {
            eap_type,
            auth_params,
        })
    }

    fn params_of(&self, kind: AuthParamKind) -> impl Iterator<Item = &AuthParam> {
        self.auth_params.iter().filter(move |p| p.kind() == kind)
    }

    /// Match a credential's method against this advertised method.
    ///
    /// A different EAP type is disqualifying. When the AP lists parameters,
    /// every parameter kind the credential also carries must overlap.
    pub fn match_credential(&self, credential: &EapMethod) -> AuthMatch {
        if self.eap_type != credential.eap_type {
            return AuthMatch::NONE;
        }
        if self.auth_params.is_empty() {
            return AuthMatch::METHOD;
        }

        let kinds: BTreeSet<AuthParamKind> =
            credential.auth_params.iter().map(AuthParam::kind).collect();
        let mut matched_kinds = 0usize;
        for kind in kinds {
            let advertised: Vec<&AuthParam> = self.params_of(kind).collect();
            if advertised.is_empty() {
                continue;
            }
            if !credential.params_of(kind).any(|p| advertised.contains(&p)) {
                return AuthMatch::NONE;
            }
            matched_kinds += 1;
        }

        if matched_kinds > 0 {
            AuthMatch::METHOD_PARAM
        } else {
            AuthMatch::METHOD
        }
    }
}

impl fmt::Display for EapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EAP Method {}", self.eap_type)?;
        for param in &self.auth_params {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}
