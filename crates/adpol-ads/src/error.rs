//! Directory connector error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum AdsError {
    /// Caller handed us an unusable configuration. Historically this class
    /// of mistake crashed the process; it is a checked error here.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Transport-level failure reaching the controller.
    #[error("connection to {server} failed: {reason}")]
    ConnectionFailed { server: String, reason: String },
    /// The controller rejected the bind credentials.
    #[error("bind failed: {0}")]
    AuthFailed(String),
    /// A search completed but returned something unusable.
    #[error("directory lookup failed: {0}")]
    LookupFailed(String),
    /// Un-parseable search output (malformed LDIF, bad GUID token).
    #[error("malformed directory entry: {0}")]
    Protocol(String),
    /// The ldapsearch binary could not be found.
    #[error("ldapsearch not found: {0}")]
    CliNotFound(String),
    /// Subprocess did not complete within the configured timeout.
    #[error("directory operation timed out: {0}")]
    Timeout(String),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type AdsResult<T> = Result<T, AdsError>;

impl From<std::io::Error> for AdsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
