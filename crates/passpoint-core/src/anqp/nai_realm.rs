// ── NAI Realm ANQP element ──
//
// IEEE 802.11-2012 8.4.4.10. The element is a little-endian record count
// followed by NAI Realm Data records:
//
//   u16 length | u8 encoding | u8 realm-len | realm | u8 method-count | methods
//
// Decoding is all-or-nothing: a record whose declared length overruns the
// buffer fails the whole element.

use std::fmt;

use bytes::Buf;
use serde::{Deserialize, Serialize};

use super::eap::EapMethod;
use super::reader::{decode_string, read_bytes, read_u8, read_u8_prefixed, read_u16_le};
use crate::error::ProtocolError;
use crate::matching::{AuthMatch, is_subdomain_of};

/// Smallest possible record: length, encoding, realm length, method count.
const MIN_RECORD_LEN: usize = 5;
const UTF8_INDICATOR: u8 = 0x01;

/// One NAI Realm Data record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaiRealmData {
    realms: Vec<String>,
    eap_methods: Vec<EapMethod>,
}

impl NaiRealmData {
    pub fn new(realms: Vec<String>, eap_methods: Vec<EapMethod>) -> Self {
        Self {
            realms,
            eap_methods,
        }
    }

    pub fn parse(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        if buf.remaining() < MIN_RECORD_LEN {
            return Err(ProtocolError::Runt {
                remaining: buf.remaining(),
                required: MIN_RECORD_LEN,
            });
        }

        let length = usize::from(read_u16_le(buf, "NAI realm data length")?);
        let mut record = read_bytes(buf, length)?;

        let utf8 = read_u8(&mut record, "realm encoding")? & 0x01 == UTF8_INDICATOR;
        let raw_realm = read_u8_prefixed(&mut record, "realm length")?;
        let realm = decode_string(&raw_realm, utf8, "realm")?;
        let realms = realm
            .split(';')
            .filter(|r| !r.is_empty())
            .map(str::to_owned)
            .collect();

        let method_count = read_u8(&mut record, "EAP method count")?;
        let mut eap_methods = Vec::with_capacity(usize::from(method_count));
        for _ in 0..method_count {
            eap_methods.push(EapMethod::parse(&mut record)?);
        }

        Ok(Self {
            realms,
            eap_methods,
        })
    }

    pub fn realms(&self) -> &[String] {
        &self.realms
    }

    pub fn eap_methods(&self) -> &[EapMethod] {
        &self.eap_methods
    }

    /// Score a credential (realm + EAP method) against this record.
    ///
    /// Listed realms are disqualifying when none of them covers
    /// `target_realm`. A record with neither realms nor methods is
    /// `INDETERMINATE`; one with methods but no realms never matches.
    pub fn match_credential(&self, target_realm: &str, credential: &EapMethod) -> AuthMatch {
        if self.realms.is_empty() {
            return if self.eap_methods.is_empty() {
                AuthMatch::INDETERMINATE
            } else {
                AuthMatch::NONE
            };
        }
        if !self
            .realms
            .iter()
            .any(|realm| is_subdomain_of(target_realm, realm))
        {
            return AuthMatch::NONE;
        }
        if self.eap_methods.is_empty() {
            return AuthMatch::REALM;
        }

        let mut best = AuthMatch::NONE;
        for method in &self.eap_methods {
            let level = method.match_credential(credential) | AuthMatch::REALM;
            if level > best {
                best = level;
                if best == AuthMatch::EXACT {
                    break;
                }
            }
        }
        best
    }
}

impl fmt::Display for NaiRealmData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NAI Realm(s)")?;
        for realm in &self.realms {
            write!(f, " {realm}")?;
        }
        for method in &self.eap_methods {
            write!(f, "\n  {method}")?;
        }
        Ok(())
    }
}

/// The full NAI Realm ANQP element: a list of realm data records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaiRealmElement {
    records: Vec<NaiRealmData>,
}

impl NaiRealmElement {
    pub fn new(records: Vec<NaiRealmData>) -> Self {
        Self { records }
    }

    pub fn parse(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        let count = read_u16_le(buf, "NAI realm count")?;
        let records = (0..count)
            .map(|_| NaiRealmData::parse(buf))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[NaiRealmData] {
        &self.records
    }

    /// Best match across all records. An empty element cannot disqualify.
    pub fn match_credential(&self, target_realm: &str, credential: &EapMethod) -> AuthMatch {
        if self.records.is_empty() {
            return AuthMatch::INDETERMINATE;
        }
        let mut best = AuthMatch::NONE;
        for record in &self.records {
            let level = record.match_credential(target_realm, credential);
            if level > best {
                best = level;
                if best == AuthMatch::EXACT {
                    break;
                }
            }
        }
        best
    }
}
