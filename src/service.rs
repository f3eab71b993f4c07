//! Policy service façade.
//!
//! Ties a [`ClientContext`] to a directory connection, a sysvol source, and
//! the extension registry behind a shared `Arc<Mutex<_>>` state handle.
//! Errors cross this boundary as strings; the typed errors live in the
//! member crates.

use crate::context::ClientContext;
use adpol_ads::backend::DirectoryBackend;
use adpol_ads::{AdsConnection, GpoEntry};
use adpol_cache::refresh::SysvolSource;
use adpol_cache::smb_cli::SmbCliSource;
use adpol_cache::{cache_path, refresh_gpo_list, sanitize_rel_path, sysvol_gpt_version, RefreshOutcome};
use adpol_core::diagnostics::DiagnosticReport;
use adpol_core::guid::Guid;
use adpol_core::scope::PolicyScope;
use adpol_gpext::registry::{self, ExtensionEntry};
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared policy service state.
pub type PolicyServiceState = Arc<Mutex<PolicyService>>;

pub struct PolicyService {
    context: ClientContext,
    connection: AdsConnection,
    source: Box<dyn SysvolSource>,
    /// Listing from the most recent `gpo_list` call.
    last_list: Vec<GpoEntry>,
}

impl PolicyService {
    /// Create a service backed by the shipped `ldapsearch` and `smbclient`
    /// bridges.
    pub fn new(context: ClientContext) -> Result<PolicyServiceState, String> {
        let connection = AdsConnection::new(
            &context.server,
            context.config.clone(),
            context.credentials.clone(),
        )
        .map_err(|e| e.to_string())?;
        let source = Box::new(SmbCliSource::new(
            &context.server,
            &context.config,
            &context.credentials,
        ));
        Ok(Self::assemble(context, connection, source))
    }

    /// Create a service over explicit backends (fixtures, local mirrors).
    pub fn with_backends(
        context: ClientContext,
        directory: Box<dyn DirectoryBackend>,
        source: Box<dyn SysvolSource>,
    ) -> Result<PolicyServiceState, String> {
        let connection = AdsConnection::with_backend(
            &context.server,
            context.config.clone(),
            context.credentials.clone(),
            directory,
        )
        .map_err(|e| e.to_string())?;
        Ok(Self::assemble(context, connection, source))
    }

    fn assemble(
        context: ClientContext,
        connection: AdsConnection,
        source: Box<dyn SysvolSource>,
    ) -> PolicyServiceState {
        Arc::new(Mutex::new(PolicyService {
            context,
            connection,
            source,
            last_list: Vec::new(),
        }))
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// Bind to the domain controller.
    pub async fn connect(&self) -> Result<(), String> {
        self.connection.connect().await.map_err(|e| e.to_string())
    }

    /// GPOs applicable to `username`, local policy first.
    pub async fn gpo_list(&mut self, username: &str) -> Result<Vec<GpoEntry>, String> {
        let list = self
            .connection
            .get_gpo_list(username)
            .await
            .map_err(|e| e.to_string())?;
        self.last_list = list.clone();
        Ok(list)
    }

    /// Mirror the listed GPOs into the local cache.
    ///
    /// Uses the most recent listing, fetching a fresh one when none exists.
    pub async fn refresh_cache(
        &mut self,
        username: &str,
        force: bool,
    ) -> Result<Vec<RefreshOutcome>, String> {
        if self.last_list.is_empty() {
            self.gpo_list(username).await?;
        }
        let outcomes = refresh_gpo_list(
            &self.context.config,
            &self.last_list,
            self.source.as_ref(),
            force,
        )
        .await
        .map_err(|e| e.to_string())?;
        info!(
            "cache refresh: {} GPO(s), {} updated",
            outcomes.len(),
            outcomes.iter().filter(|o| o.updated).count()
        );
        Ok(outcomes)
    }

    /// Root directory of the local policy cache.
    pub fn cache_root(&self) -> PathBuf {
        cache_path(&self.context.config)
    }

    /// Version recorded in the cached GPT.INI for `guid`.
    pub fn gpt_version(&self, guid: &Guid) -> Result<u32, String> {
        let share_rel = sanitize_rel_path(&self.context.config.sysvol_policy_dir())
            .map_err(|e| e.to_string())?;
        let gpo_dir = self
            .cache_root()
            .join(share_rel.to_uppercase())
            .join(guid.to_string());
        sysvol_gpt_version(&gpo_dir).map_err(|e| e.to_string())
    }

    fn gpext_conf(&self) -> PathBuf {
        // Sibling of the gpo_cache directory.
        self.cache_root().with_file_name("gpext.conf")
    }

    pub fn register_extension(
        &self,
        guid: &Guid,
        module_name: &str,
        module_path: &str,
        scope: PolicyScope,
    ) -> Result<(), String> {
        let conf = self.gpext_conf();
        if let Some(parent) = conf.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        registry::register_extension(&conf, guid, module_name, module_path, scope)
            .map_err(|e| e.to_string())
    }

    pub fn unregister_extension(&self, guid: &Guid) -> Result<(), String> {
        registry::unregister_extension(&self.gpext_conf(), guid).map_err(|e| e.to_string())
    }

    pub fn list_extensions(&self) -> Result<HashMap<String, ExtensionEntry>, String> {
        registry::list_extensions(&self.gpext_conf()).map_err(|e| e.to_string())
    }

    /// DNS + TCP reachability report for the controller.
    pub fn diagnose(&self) -> DiagnosticReport {
        self.connection.diagnose()
    }
}
