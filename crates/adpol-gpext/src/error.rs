//! Extension registry error type.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GpextError {
    /// Token is not a well-formed braced GUID.
    InvalidGuid(String),
    /// Config file did not parse.
    Parse(String),
    /// No registry entry for the given GUID.
    NotFound(String),
    /// Registration carried an empty module name/path or inert scope.
    InvalidEntry(String),
    /// Filesystem error (including a failed atomic rename).
    Io(String),
}

impl fmt::Display for GpextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGuid(token) => write!(f, "invalid extension GUID: {token}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::NotFound(guid) => write!(f, "no extension registered for {guid}"),
            Self::InvalidEntry(msg) => write!(f, "invalid extension entry: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for GpextError {}

pub type GpextResult<T> = Result<T, GpextError>;

impl From<std::io::Error> for GpextError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
