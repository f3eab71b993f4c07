//! GPO and extension GUID handling.
//!
//! Group policy plumbing identifies everything — GPOs, client-side
//! extensions, sysvol directories — by the braced, dashed hexadecimal
//! form, e.g. `{31B2F340-016D-11D2-945F-00C04FB984F9}`. Only that exact
//! shape is accepted; bare hex runs or unbraced UUIDs are rejected.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

lazy_static! {
    static ref BRACED_GUID: Regex = Regex::new(
        r"^\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}$"
    )
    .unwrap();
}

/// A validated GPO/extension GUID.
///
/// Stored canonically; `Display` always renders the uppercase braced form
/// used in sysvol paths and directory entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(Uuid);

/// The token did not match the canonical braced GUID form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidParseError {
    pub input: String,
}

impl fmt::Display for GuidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid GUID token: {:?}", self.input)
    }
}

impl std::error::Error for GuidParseError {}

impl Guid {
    /// Parse a braced GUID token, case-insensitively.
    pub fn parse(input: &str) -> Result<Self, GuidParseError> {
        let token = input.trim();
        if !BRACED_GUID.is_match(token) {
            return Err(GuidParseError {
                input: input.to_string(),
            });
        }
        let inner = &token[1..token.len() - 1];
        let uuid = Uuid::parse_str(inner).map_err(|_| GuidParseError {
            input: input.to_string(),
        })?;
        Ok(Guid(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hyphenated = self.0.hyphenated().to_string().to_uppercase();
        write!(f, "{{{hyphenated}}}")
    }
}

impl FromStr for Guid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Guid::parse(s)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Guid::parse(&raw).map_err(D::Error::custom)
    }
}

/// Convenience validator: does `token` look like a well-formed braced GUID?
pub fn check_guid(token: &str) -> bool {
    Guid::parse(token).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_DOMAIN_POLICY: &str = "{31B2F340-016D-11D2-945F-00C04FB984F9}";

    #[test]
    fn parses_braced_guid() {
        let guid = Guid::parse(DEFAULT_DOMAIN_POLICY).unwrap();
        assert_eq!(guid.to_string(), DEFAULT_DOMAIN_POLICY);
    }

    #[test]
    fn lowercase_is_canonicalized() {
        let guid = Guid::parse("{31b2f340-016d-11d2-945f-00c04fb984f9}").unwrap();
        assert_eq!(guid.to_string(), DEFAULT_DOMAIN_POLICY);
    }

    #[test]
    fn rejects_bare_hex_run() {
        assert!(!check_guid("AAAAAABBBBBBBCCC"));
    }

    #[test]
    fn rejects_unbraced_uuid() {
        assert!(!check_guid("31B2F340-016D-11D2-945F-00C04FB984F9"));
    }

    #[test]
    fn rejects_wrong_group_lengths() {
        assert!(!check_guid("{31B2F34-016D-11D2-945F-00C04FB984F9}"));
        assert!(!check_guid("{31B2F340-016D-11D2-945F-00C04FB984F9AA}"));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(!check_guid("{31B2F340-016D-11D2-945F-00C04FB984GG}"));
    }

    #[test]
    fn accepts_valid_token() {
        assert!(check_guid("{827D319E-6EAC-11D2-A4EA-00C04F79F83A}"));
    }

    #[test]
    fn serde_roundtrip() {
        let guid = Guid::parse(DEFAULT_DOMAIN_POLICY).unwrap();
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, format!("\"{DEFAULT_DOMAIN_POLICY}\""));
        let back: Guid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guid);
    }

    #[test]
    fn deserialize_rejects_malformed() {
        let result: Result<Guid, _> = serde_json::from_str("\"AAAAAABBBBBBBCCC\"");
        assert!(result.is_err());
    }
}
