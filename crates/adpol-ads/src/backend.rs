//! The seam between [`AdsConnection`](crate::connection::AdsConnection)
//! and the wire.
//!
//! A backend knows how to bind to a controller and enumerate the GPO
//! containers linked to a user. The shipped implementation drives
//! `ldapsearch` (see [`crate::ldap_cli`]); `InMemoryDirectory` serves
//! fixtures to tests and offline tooling.

use crate::error::{AdsError, AdsResult};
use crate::types::{AdsConfig, Credentials};
use adpol_core::guid::Guid;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A GPO as it exists in the directory, before local path derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGpo {
    /// `displayName` attribute.
    pub display_name: String,
    /// `cn` attribute, the braced GUID.
    pub guid: Guid,
}

#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    /// Verify the controller is reachable and the credentials bind.
    async fn bind(
        &self,
        server: &str,
        config: &AdsConfig,
        creds: &Credentials,
    ) -> AdsResult<()>;

    /// GPO containers applicable to `username`, in link order.
    async fn gpos_for_user(
        &self,
        server: &str,
        config: &AdsConfig,
        creds: &Credentials,
        username: &str,
    ) -> AdsResult<Vec<RawGpo>>;
}

/// Fixture backend: serves a fixed GPO list without touching the network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    pub gpos: Vec<RawGpo>,
    /// When set, `bind` fails with this message.
    pub bind_error: Option<String>,
}

impl InMemoryDirectory {
    pub fn with_gpos(gpos: Vec<RawGpo>) -> Self {
        InMemoryDirectory {
            gpos,
            bind_error: None,
        }
    }
}

#[async_trait]
impl DirectoryBackend for InMemoryDirectory {
    async fn bind(
        &self,
        server: &str,
        _config: &AdsConfig,
        _creds: &Credentials,
    ) -> AdsResult<()> {
        match &self.bind_error {
            Some(reason) => Err(AdsError::ConnectionFailed {
                server: server.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn gpos_for_user(
        &self,
        _server: &str,
        _config: &AdsConfig,
        _creds: &Credentials,
        _username: &str,
    ) -> AdsResult<Vec<RawGpo>> {
        Ok(self.gpos.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (AdsConfig, Credentials) {
        (
            AdsConfig::new("addom.samba.example.com"),
            Credentials::new("tester", "secret"),
        )
    }

    #[tokio::test]
    async fn in_memory_bind_ok() {
        let (config, creds) = fixture();
        let dir = InMemoryDirectory::default();
        assert!(dir.bind("dc1", &config, &creds).await.is_ok());
    }

    #[tokio::test]
    async fn in_memory_bind_failure() {
        let (config, creds) = fixture();
        let dir = InMemoryDirectory {
            gpos: Vec::new(),
            bind_error: Some("unreachable".into()),
        };
        let err = dir.bind("dc1", &config, &creds).await.unwrap_err();
        assert!(matches!(err, AdsError::ConnectionFailed { .. }));
    }
}
