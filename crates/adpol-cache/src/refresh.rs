//! Cache refresh.
//!
//! Mirrors each listed GPO's sysvol file tree below the local cache root.
//! The cache layout mirrors the share layout with every path component
//! uppercased:
//!
//! ```text
//! <cache_root>/ADDOM.SAMBA.EXAMPLE.COM/POLICIES/{GUID}/GPT.INI
//! ```
//!
//! A GPO is only re-downloaded when its remote GPT.INI version differs from
//! the cached one (or `force` is set), so repeated refreshes with no
//! server-side change are cheap and idempotent.

use crate::error::{CacheError, CacheResult};
use crate::gpt::{GptIni, GPT_INI};
use crate::safe_path::sanitize_rel_path;
use adpol_ads::types::{AdsConfig, GpoEntry};
use adpol_core::guid::Guid;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Read access to a sysvol share, relative to the share root.
///
/// The shipped network implementation is
/// [`SmbCliSource`](crate::smb_cli::SmbCliSource); [`LocalDirSource`] serves
/// a local directory tree for tests and offline mirrors.
#[async_trait]
pub trait SysvolSource: Send + Sync {
    /// File paths below `rel_path`, relative to `rel_path`, recursively.
    async fn list_files(&self, rel_path: &str) -> CacheResult<Vec<String>>;

    /// Contents of the file at `rel_path`.
    async fn fetch(&self, rel_path: &str) -> CacheResult<Vec<u8>>;
}

/// Result of refreshing one GPO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub guid: Guid,
    /// Whether files were actually downloaded (false = version unchanged).
    pub updated: bool,
    pub version: u32,
    pub refreshed_at: DateTime<Utc>,
}

/// Root of the local GPO cache for this configuration.
pub fn cache_path(config: &AdsConfig) -> PathBuf {
    let base = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adpol"),
    };
    base.join("gpo_cache")
}

/// Ensure the cache root exists and mirror every remote GPO in `gpos`.
///
/// `LocalPolicy` entries have no file presence and are skipped.
pub async fn refresh_gpo_list(
    config: &AdsConfig,
    gpos: &[GpoEntry],
    source: &dyn SysvolSource,
    force: bool,
) -> CacheResult<Vec<RefreshOutcome>> {
    let cache_root = cache_path(config);
    fs::create_dir_all(&cache_root)?;

    let mut outcomes = Vec::new();
    for entry in gpos {
        let (guid, file_sys_path) = match entry {
            GpoEntry::LocalPolicy => {
                debug!("skipping local policy entry, nothing to fetch");
                continue;
            }
            GpoEntry::Remote {
                guid,
                file_sys_path,
                ..
            } => (*guid, file_sys_path.as_str()),
        };
        outcomes.push(refresh_one(&cache_root, guid, file_sys_path, source, force).await?);
    }
    Ok(outcomes)
}

async fn refresh_one(
    cache_root: &Path,
    guid: Guid,
    file_sys_path: &str,
    source: &dyn SysvolSource,
    force: bool,
) -> CacheResult<RefreshOutcome> {
    // UNC path -> share-relative path -> uppercased cache key.
    let share_rel = sanitize_rel_path(file_sys_path)?;
    let local_dir = cache_root.join(share_rel.to_uppercase());

    let remote_raw = source.fetch(&format!("{share_rel}/{GPT_INI}")).await?;
    let remote_gpt = GptIni::parse(&String::from_utf8_lossy(&remote_raw))?;
    let cached_version = GptIni::read(&local_dir).ok().map(|g| g.version);

    if !force && cached_version == Some(remote_gpt.version) {
        debug!("{guid} unchanged at version {}", remote_gpt.version);
        return Ok(RefreshOutcome {
            guid,
            updated: false,
            version: remote_gpt.version,
            refreshed_at: Utc::now(),
        });
    }

    info!(
        "refreshing {guid}: cached version {cached_version:?}, remote {}",
        remote_gpt.version
    );
    for file in source.list_files(&share_rel).await? {
        let file_rel = sanitize_rel_path(&file)?;
        if file_rel.is_empty() {
            continue;
        }
        let data = source.fetch(&format!("{share_rel}/{file_rel}")).await?;
        let target = local_dir.join(file_rel.to_uppercase());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
    }

    // The listing should always carry GPT.INI, but the cache entry is
    // unusable without it, so backstop with the copy we already fetched.
    if GptIni::read(&local_dir).is_err() {
        remote_gpt.write(&local_dir)?;
    }

    Ok(RefreshOutcome {
        guid,
        updated: true,
        version: remote_gpt.version,
        refreshed_at: Utc::now(),
    })
}

// ─── Local directory source ─────────────────────────────────────────

/// Serves a local directory tree laid out like a sysvol share root.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalDirSource { root: root.into() }
    }

    fn resolve(&self, rel_path: &str) -> CacheResult<PathBuf> {
        let rel = sanitize_rel_path(rel_path)?;
        Ok(self.root.join(rel))
    }
}

fn walk_files(dir: &Path, prefix: &str, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let rel = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        if entry.file_type()?.is_dir() {
            walk_files(&entry.path(), &rel, out)?;
        } else {
            out.push(rel);
        }
    }
    Ok(())
}

#[async_trait]
impl SysvolSource for LocalDirSource {
    async fn list_files(&self, rel_path: &str) -> CacheResult<Vec<String>> {
        let dir = self.resolve(rel_path)?;
        if !dir.is_dir() {
            return Err(CacheError::MissingFile(dir.display().to_string()));
        }
        let mut out = Vec::new();
        walk_files(&dir, "", &mut out)?;
        out.sort();
        Ok(out)
    }

    async fn fetch(&self, rel_path: &str) -> CacheResult<Vec<u8>> {
        let path = self.resolve(rel_path)?;
        fs::read(&path).map_err(|_| CacheError::MissingFile(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpol_ads::types::Credentials;

    const GUID: &str = "{31B2F340-016D-11D2-945F-00C04FB984F9}";
    const REALM: &str = "addom.samba.example.com";

    struct Fixture {
        _sysvol: tempfile::TempDir,
        _cache: tempfile::TempDir,
        config: AdsConfig,
        source: LocalDirSource,
        gpos: Vec<GpoEntry>,
    }

    fn fixture(version: u32) -> Fixture {
        let sysvol = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        let gpo_dir = sysvol
            .path()
            .join(REALM)
            .join("Policies")
            .join(GUID);
        GptIni { version }.write(&gpo_dir).unwrap();

        let mut config = AdsConfig::new(REALM);
        config.cache_dir = Some(cache.path().to_path_buf());
        let _creds = Credentials::new("tester", "secret");

        let source = LocalDirSource::new(sysvol.path());
        let guid = Guid::parse(GUID).unwrap();
        let gpos = vec![
            GpoEntry::LocalPolicy,
            GpoEntry::remote(GUID, guid, &config),
        ];

        Fixture {
            _sysvol: sysvol,
            _cache: cache,
            config,
            source,
            gpos,
        }
    }

    fn cached_gpt_ini(config: &AdsConfig) -> PathBuf {
        cache_path(config)
            .join(REALM.to_uppercase())
            .join("POLICIES")
            .join(GUID)
            .join(GPT_INI)
    }

    #[tokio::test]
    async fn refresh_creates_cache_layout() {
        let fx = fixture(3);
        let outcomes = refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();

        assert!(cache_path(&fx.config).exists());
        assert!(cached_gpt_ini(&fx.config).exists());
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].updated);
        assert_eq!(outcomes[0].version, 3);
    }

    #[tokio::test]
    async fn second_refresh_is_a_no_op() {
        let fx = fixture(3);
        refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();
        let outcomes = refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();
        assert!(!outcomes[0].updated);
        assert!(cached_gpt_ini(&fx.config).exists());
    }

    #[tokio::test]
    async fn version_bump_triggers_redownload() {
        let fx = fixture(3);
        refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();

        let gpo_dir = fx._sysvol.path().join(REALM).join("Policies").join(GUID);
        GptIni { version: 4 }.write(&gpo_dir).unwrap();

        let outcomes = refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();
        assert!(outcomes[0].updated);
        assert_eq!(outcomes[0].version, 4);

        let cached = GptIni::parse(&fs::read_to_string(cached_gpt_ini(&fx.config)).unwrap())
            .unwrap();
        assert_eq!(cached.version, 4);
    }

    #[tokio::test]
    async fn force_redownloads_unchanged_gpo() {
        let fx = fixture(3);
        refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();
        let outcomes = refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, true)
            .await
            .unwrap();
        assert!(outcomes[0].updated);
    }

    #[tokio::test]
    async fn local_policy_only_creates_just_the_root() {
        let fx = fixture(3);
        let outcomes = refresh_gpo_list(&fx.config, &fx.gpos[..1], &fx.source, false)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
        assert!(cache_path(&fx.config).exists());
    }

    #[tokio::test]
    async fn nested_files_are_mirrored_uppercased() {
        let fx = fixture(3);
        let machine_dir = fx
            ._sysvol
            .path()
            .join(REALM)
            .join("Policies")
            .join(GUID)
            .join("Machine");
        fs::create_dir_all(&machine_dir).unwrap();
        fs::write(machine_dir.join("Registry.pol"), b"PReg").unwrap();

        refresh_gpo_list(&fx.config, &fx.gpos, &fx.source, false)
            .await
            .unwrap();

        let mirrored = cache_path(&fx.config)
            .join(REALM.to_uppercase())
            .join("POLICIES")
            .join(GUID)
            .join("MACHINE")
            .join("REGISTRY.POL");
        assert_eq!(fs::read(mirrored).unwrap(), b"PReg");
    }

    #[tokio::test]
    async fn missing_remote_gpo_is_an_error() {
        let fx = fixture(3);
        let mut config = fx.config.clone();
        config.realm = "other.example.com".into();
        let guid = Guid::parse(GUID).unwrap();
        let gpos = vec![GpoEntry::remote(GUID, guid, &config)];
        let result = refresh_gpo_list(&config, &gpos, &fx.source, false).await;
        assert!(matches!(result, Err(CacheError::MissingFile(_))));
    }
}
