//! Remote path sanitization.
//!
//! Paths arriving from the directory or from share listings use backslash
//! separators, may carry a share-root prefix, and are attacker-influencable.
//! Everything written below the cache root goes through
//! [`sanitize_rel_path`] first.

use crate::error::{CacheError, CacheResult};

/// Sanitize a remote path into a slash-delimited relative path.
///
/// - `\` and `/` are both treated as separators
/// - if a `sysvol` segment is present (any case), it and everything before
///   it are dropped, leaving the path relative to the share root
/// - empty and `.` segments are dropped
/// - any `..` segment fails with [`CacheError::PathTraversal`]
///
/// Equivalent mixed-separator spellings canonicalize to the same output.
pub fn sanitize_rel_path(path: &str) -> CacheResult<String> {
    let mut segments: Vec<&str> = path.split(['/', '\\']).collect();

    if let Some(idx) = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("sysvol"))
    {
        segments.drain(..=idx);
    }

    if segments.iter().any(|s| *s == "..") {
        return Err(CacheError::PathTraversal(path.to_string()));
    }

    let clean: Vec<&str> = segments
        .into_iter()
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    Ok(clean.join("/"))
}
