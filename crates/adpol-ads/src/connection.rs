//! High-level connect / list API.
//!
//! `AdsConnection` owns the server address, validated configuration,
//! credentials, and a [`DirectoryBackend`]. It turns raw directory records
//! into [`GpoEntry`] values with the derived sysvol and directory-service
//! paths.

use crate::backend::DirectoryBackend;
use crate::error::AdsResult;
use crate::ldap_cli::LdapCliBackend;
use crate::types::{AdsConfig, Credentials, GpoEntry};
use adpol_core::diagnostics::{probe_endpoint, DiagnosticReport};
use log::info;
use std::time::Duration;

pub struct AdsConnection {
    server: String,
    config: AdsConfig,
    creds: Credentials,
    backend: Box<dyn DirectoryBackend>,
}

impl AdsConnection {
    /// Create a connection using the shipped `ldapsearch` backend.
    ///
    /// Fails with `AdsError::InvalidConfig` instead of accepting a broken
    /// configuration; nothing touches the network until [`connect`](Self::connect).
    pub fn new(server: &str, config: AdsConfig, creds: Credentials) -> AdsResult<Self> {
        Self::with_backend(server, config, creds, Box::new(LdapCliBackend::new()))
    }

    /// Create a connection over an explicit backend (fixtures, alternate
    /// transports).
    pub fn with_backend(
        server: &str,
        config: AdsConfig,
        creds: Credentials,
        backend: Box<dyn DirectoryBackend>,
    ) -> AdsResult<Self> {
        config.validate()?;
        Ok(AdsConnection {
            server: server.to_string(),
            config,
            creds,
            backend,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn config(&self) -> &AdsConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.creds
    }

    /// Bind to the controller.
    pub async fn connect(&self) -> AdsResult<()> {
        info!("binding to {} as {}", self.server, self.creds.username);
        self.backend
            .bind(&self.server, &self.config, &self.creds)
            .await
    }

    /// List the GPOs applicable to `username`, in processing order.
    ///
    /// The first entry is always the `LocalPolicy` sentinel; remote entries
    /// follow in the order the directory returned them.
    pub async fn get_gpo_list(&self, username: &str) -> AdsResult<Vec<GpoEntry>> {
        let raw = self
            .backend
            .gpos_for_user(&self.server, &self.config, &self.creds, username)
            .await?;
        info!(
            "directory returned {} GPO(s) for user {username}",
            raw.len()
        );
        let mut entries = Vec::with_capacity(raw.len() + 1);
        entries.push(GpoEntry::LocalPolicy);
        for gpo in raw {
            entries.push(GpoEntry::remote(&gpo.display_name, gpo.guid, &self.config));
        }
        Ok(entries)
    }

    /// DNS + TCP reachability report for the controller's LDAP port.
    pub fn diagnose(&self) -> DiagnosticReport {
        probe_endpoint(
            &self.server,
            self.config.ldap_port,
            Duration::from_secs(self.config.timeout_secs),
        )
    }
}
