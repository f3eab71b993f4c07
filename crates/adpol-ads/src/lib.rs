//! # AdPol – Directory Connector
//!
//! Binds to an Active Directory domain controller and enumerates the GPOs
//! that apply to a user. Provides:
//!
//! - **AdsConfig / Credentials** – validated, explicit connection parameters
//! - **GpoEntry** – type-safe listing entries (`LocalPolicy` vs `Remote`)
//! - **DirectoryBackend** – the seam between the connector and the wire;
//!   the shipped backend drives `ldapsearch` as a subprocess
//! - **AdsConnection** – the high-level connect / list API

pub mod backend;
pub mod connection;
pub mod error;
pub mod ldap_cli;
pub mod types;

pub use backend::{DirectoryBackend, InMemoryDirectory, RawGpo};
pub use connection::AdsConnection;
pub use error::{AdsError, AdsResult};
pub use ldap_cli::LdapCliBackend;
pub use types::{AdsConfig, Credentials, GpoEntry};
