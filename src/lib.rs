//! # AdPol – Active Directory Group Policy Client
//!
//! Client-side retrieval and caching of Group Policy Objects:
//!
//! - `adpol-core`  — GUID handling, policy scope, endpoint diagnostics
//! - `adpol-ads`   — directory connection and GPO enumeration
//! - `adpol-cache` — sysvol mirroring, GPT.INI versions, safe paths
//! - `adpol-gpext` — client-side extension registry
//!
//! This crate ties them together behind [`PolicyService`], a shared-state
//! façade in the shape the rest of the application consumes services.
//!
//! ## Example
//!
//! ```no_run
//! use adpol::{AdsConfig, ClientContext, Credentials, PolicyService};
//!
//! # async fn run() -> Result<(), String> {
//! let context = ClientContext::new(
//!     "dc1.addom.samba.example.com",
//!     AdsConfig::new("addom.samba.example.com"),
//!     Credentials::new("tester", "secret"),
//! );
//! let state = PolicyService::new(context)?;
//! let mut service = state.lock().await;
//! service.connect().await?;
//! let gpos = service.gpo_list("tester").await?;
//! service.refresh_cache("tester", false).await?;
//! # let _ = gpos;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod service;
pub mod telemetry;

pub use context::ClientContext;
pub use service::{PolicyService, PolicyServiceState};
pub use telemetry::init_telemetry;

pub use adpol_ads::{
    AdsConfig, AdsConnection, AdsError, AdsResult, Credentials, DirectoryBackend, GpoEntry,
    InMemoryDirectory, RawGpo,
};
pub use adpol_cache::{
    cache_path, refresh_gpo_list, sanitize_rel_path, sysvol_gpt_version, CacheError, CacheResult,
    GptIni, LocalDirSource, RefreshOutcome, SmbCliSource, SysvolSource, GPT_INI,
};
pub use adpol_core::{check_guid, Guid, GuidParseError, PolicyScope};
pub use adpol_gpext::{
    list_extensions, register_extension, register_extension_token, unregister_extension,
    ExtensionEntry, GpextError, GpextResult,
};
