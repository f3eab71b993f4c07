//! Cache error type.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheError {
    /// A remote path tried to escape the cache root.
    PathTraversal(String),
    /// GPT.INI did not parse.
    GptParse(String),
    /// Expected file missing from the cache or the source.
    MissingFile(String),
    /// Fetching from the sysvol source failed.
    Fetch(String),
    /// Local filesystem error.
    Io(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathTraversal(path) => write!(f, "path traversal rejected: {path}"),
            Self::GptParse(msg) => write!(f, "GPT.INI parse error: {msg}"),
            Self::MissingFile(path) => write!(f, "missing file: {path}"),
            Self::Fetch(msg) => write!(f, "sysvol fetch error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
