// ── Authentication match levels ──
//
// A credential matches an NAI Realm record on up to three axes: realm,
// EAP method, and auth parameters. Each axis is a flag; the combined
// value is totally ordered so the best of several records can be kept.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// How well a credential matches the advertised NAI realm data.
///
/// `NONE` absorbs: OR-ing anything with `NONE` yields `NONE`, because a
/// disqualifying axis (wrong realm, wrong EAP type) cannot be rescued by
/// the other axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthMatch(i8);

impl AuthMatch {
    pub const NONE: Self = Self(-1);
    pub const INDETERMINATE: Self = Self(0);
    pub const PARAM: Self = Self(0x01);
    pub const METHOD: Self = Self(0x02);
    pub const METHOD_PARAM: Self = Self(0x03);
    pub const REALM: Self = Self(0x04);
    pub const EXACT: Self = Self(0x07);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// True when the realm axis contributed to this level.
    pub fn has_realm(self) -> bool {
        !self.is_none() && self.0 & Self::REALM.0 != 0
    }

    pub fn has_method(self) -> bool {
        !self.is_none() && self.0 & Self::METHOD.0 != 0
    }
}

impl Default for AuthMatch {
    fn default() -> Self {
        Self::NONE
    }
}

impl BitOr for AuthMatch {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        if self.is_none() || rhs.is_none() {
            Self::NONE
        } else {
            Self(self.0 | rhs.0)
        }
    }
}

impl fmt::Display for AuthMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("none"),
            Self::INDETERMINATE => f.write_str("indeterminate"),
            Self::EXACT => f.write_str("exact"),
            other => {
                let parts: Vec<&str> = [
                    (Self::REALM, "realm"),
                    (Self::METHOD, "method"),
                    (Self::PARAM, "param"),
                ]
                .into_iter()
                .filter(|(flag, _)| other.0 & flag.0 != 0)
                .map(|(_, name)| name)
                .collect();
                f.write_str(&parts.join("+"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AuthMatch::NONE < AuthMatch::INDETERMINATE);
        assert!(AuthMatch::INDETERMINATE < AuthMatch::METHOD);
        assert!(AuthMatch::METHOD_PARAM < AuthMatch::REALM);
        assert!(AuthMatch::REALM < AuthMatch::REALM | AuthMatch::METHOD);
        assert!(AuthMatch::REALM | AuthMatch::METHOD < AuthMatch::EXACT);
    }

    #[test]
    fn none_absorbs() {
        assert_eq!(AuthMatch::NONE | AuthMatch::REALM, AuthMatch::NONE);
        assert_eq!(AuthMatch::METHOD | AuthMatch::NONE, AuthMatch::NONE);
    }

    #[test]
    fn realm_and_method_param_make_exact() {
        assert_eq!(AuthMatch::METHOD_PARAM | AuthMatch::REALM, AuthMatch::EXACT);
        assert_eq!(
            AuthMatch::INDETERMINATE | AuthMatch::METHOD,
            AuthMatch::METHOD
        );
    }

    #[test]
    fn display_names_flags() {
        assert_eq!(AuthMatch::EXACT.to_string(), "exact");
        assert_eq!((AuthMatch::REALM | AuthMatch::METHOD).to_string(), "realm+method");
        assert_eq!(AuthMatch::METHOD_PARAM.to_string(), "method+param");
        assert_eq!(AuthMatch::NONE.to_string(), "none");
    }

    #[test]
    fn realm_flag_detection() {
        assert!(AuthMatch::REALM.has_realm());
        assert!(AuthMatch::EXACT.has_realm());
        assert!(!AuthMatch::METHOD.has_realm());
        assert!(!AuthMatch::NONE.has_realm());
    }
}
