//! # AdPol – Core
//!
//! Shared types used across the AdPol workspace:
//!
//! - **GUIDs** – parsing and validation of the braced, dashed hexadecimal
//!   tokens that identify GPOs and policy extensions
//! - **Policy scope** – machine/user applicability flags
//! - **Diagnostics** – reusable DNS/TCP probe helpers for checking domain
//!   controller reachability before a bind is attempted

pub mod diagnostics;
pub mod guid;
pub mod scope;

pub use guid::{check_guid, Guid, GuidParseError};
pub use scope::PolicyScope;
