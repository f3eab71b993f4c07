//! Connector configuration, credentials, and GPO listing entries.

use crate::error::{AdsError, AdsResult};
use adpol_core::guid::Guid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the sysvol share every domain controller exports.
pub const SYSVOL_SHARE: &str = "sysvol";

// ─── Configuration ──────────────────────────────────────────────────

/// Connection parameters for a domain. All values are explicit; nothing is
/// read from the process environment by the library itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdsConfig {
    /// DNS domain name, e.g. `addom.samba.example.com`.
    pub realm: String,
    /// Short (NetBIOS) domain name, e.g. `ADDOM`.
    pub workgroup: String,
    /// LDAP port on the controller.
    pub ldap_port: u16,
    /// Root directory for the local policy cache. `None` selects the
    /// platform default (see `adpol-cache`).
    pub cache_dir: Option<PathBuf>,
    /// Per-operation timeout for directory calls, in seconds.
    pub timeout_secs: u64,
}

impl AdsConfig {
    /// Build a config for `realm`, deriving the short domain name from the
    /// first DNS label.
    pub fn new(realm: &str) -> Self {
        let workgroup = realm
            .split('.')
            .next()
            .unwrap_or_default()
            .to_uppercase();
        AdsConfig {
            realm: realm.to_string(),
            workgroup,
            ldap_port: 389,
            cache_dir: None,
            timeout_secs: 30,
        }
    }

    /// Reject configurations that cannot possibly work before any network
    /// traffic happens.
    pub fn validate(&self) -> AdsResult<()> {
        if self.realm.is_empty() {
            return Err(AdsError::InvalidConfig("realm is empty".into()));
        }
        if !self.realm.contains('.') {
            return Err(AdsError::InvalidConfig(format!(
                "realm {:?} is not a DNS domain name",
                self.realm
            )));
        }
        if self
            .realm
            .chars()
            .any(|c| c.is_whitespace() || c == '\\' || c == '/')
        {
            return Err(AdsError::InvalidConfig(format!(
                "realm {:?} contains path or whitespace characters",
                self.realm
            )));
        }
        if self.workgroup.is_empty() {
            return Err(AdsError::InvalidConfig("workgroup is empty".into()));
        }
        if self.ldap_port == 0 {
            return Err(AdsError::InvalidConfig("ldap port is 0".into()));
        }
        Ok(())
    }

    /// The domain's distinguished name: `DC=addom,DC=samba,...`.
    pub fn realm_dn(&self) -> String {
        self.realm
            .split('.')
            .map(|label| format!("DC={label}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// DN of the container holding all GPO objects.
    pub fn policies_dn(&self) -> String {
        format!("CN=Policies,CN=System,{}", self.realm_dn())
    }

    /// UNC directory under which every GPO's file tree lives on sysvol.
    pub fn sysvol_policy_dir(&self) -> String {
        format!(
            "\\\\{realm}\\{SYSVOL_SHARE}\\{realm}\\Policies",
            realm = self.realm
        )
    }
}

/// Bind credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Overrides the config workgroup when set.
    pub domain: Option<String>,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
            domain: None,
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}

// ─── Listing entries ────────────────────────────────────────────────

/// One entry in a GPO listing.
///
/// The first entry of every listing is the `LocalPolicy` sentinel; it has
/// no sysvol or directory presence, which the variant encodes instead of
/// null-valued path fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GpoEntry {
    LocalPolicy,
    Remote {
        name: String,
        guid: Guid,
        /// UNC path of the GPO's file tree on sysvol.
        file_sys_path: String,
        /// DN of the GPO object in the directory.
        ds_path: String,
    },
}

impl GpoEntry {
    /// Construct the remote entry for `guid`, deriving both paths from the
    /// domain configuration.
    pub fn remote(name: &str, guid: Guid, config: &AdsConfig) -> Self {
        GpoEntry::Remote {
            name: name.to_string(),
            guid,
            file_sys_path: format!("{}\\{}", config.sysvol_policy_dir(), guid),
            ds_path: format!("CN={},{}", guid, config.policies_dn()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GpoEntry::LocalPolicy => "Local Policy",
            GpoEntry::Remote { name, .. } => name,
        }
    }

    pub fn guid(&self) -> Option<&Guid> {
        match self {
            GpoEntry::LocalPolicy => None,
            GpoEntry::Remote { guid, .. } => Some(guid),
        }
    }

    pub fn file_sys_path(&self) -> Option<&str> {
        match self {
            GpoEntry::LocalPolicy => None,
            GpoEntry::Remote { file_sys_path, .. } => Some(file_sys_path),
        }
    }

    pub fn ds_path(&self) -> Option<&str> {
        match self {
            GpoEntry::LocalPolicy => None,
            GpoEntry::Remote { ds_path, .. } => Some(ds_path),
        }
    }
}
