//! End-to-end checks over the public API: listing, caching, GPT versions,
//! path sanitising, and the extension registry.

use adpol::{
    cache_path, check_guid, refresh_gpo_list, sanitize_rel_path, sysvol_gpt_version, AdsConfig,
    AdsConnection, AdsError, CacheError, ClientContext, Credentials, GpoEntry, GptIni, Guid,
    InMemoryDirectory, LocalDirSource, PolicyService, PolicyScope, RawGpo, GPT_INI,
};
use std::fs;
use std::path::PathBuf;

const GUID: &str = "{31B2F340-016D-11D2-945F-00C04FB984F9}";
const EXT_GUID: &str = "{827D319E-6EAC-11D2-A4EA-00C04F79F83A}";
const REALM: &str = "addom.samba.example.com";
const SERVER: &str = "dc1.addom.samba.example.com";

fn config_with_cache(cache: &std::path::Path) -> AdsConfig {
    let mut config = AdsConfig::new(REALM);
    config.cache_dir = Some(cache.to_path_buf());
    config
}

fn directory_with_default_gpo() -> InMemoryDirectory {
    InMemoryDirectory::with_gpos(vec![RawGpo {
        display_name: GUID.to_string(),
        guid: Guid::parse(GUID).unwrap(),
    }])
}

fn seed_sysvol(sysvol: &std::path::Path, version: u32) {
    let gpo_dir = sysvol.join(REALM).join("Policies").join(GUID);
    GptIni { version }.write(&gpo_dir).unwrap();
}

fn cached_gpo_dir(config: &AdsConfig) -> PathBuf {
    cache_path(config)
        .join(REALM.to_uppercase())
        .join("POLICIES")
        .join(GUID)
}

// ─── Listing ────────────────────────────────────────────────────────

#[tokio::test]
async fn gpo_list_starts_with_local_policy_and_derives_paths() {
    let conn = AdsConnection::with_backend(
        SERVER,
        AdsConfig::new(REALM),
        Credentials::new("tester", "secret"),
        Box::new(directory_with_default_gpo()),
    )
    .unwrap();
    conn.connect().await.unwrap();

    let gpos = conn.get_gpo_list("tester").await.unwrap();
    assert_eq!(gpos.len(), 2);

    assert_eq!(gpos[0], GpoEntry::LocalPolicy);
    assert_eq!(gpos[0].name(), "Local Policy");
    assert!(gpos[0].file_sys_path().is_none());
    assert!(gpos[0].ds_path().is_none());

    assert_eq!(gpos[1].name(), GUID);
    assert_eq!(
        gpos[1].file_sys_path().unwrap(),
        format!(r"\\{REALM}\sysvol\{REALM}\Policies\{GUID}")
    );
    assert_eq!(
        gpos[1].ds_path().unwrap(),
        format!("CN={GUID},CN=Policies,CN=System,DC=addom,DC=samba,DC=example,DC=com")
    );
}

#[tokio::test]
async fn invalid_config_is_a_checked_error() {
    for realm in ["", "nodots", "bad realm.example.com"] {
        let result = AdsConnection::with_backend(
            SERVER,
            AdsConfig::new(realm),
            Credentials::new("tester", "secret"),
            Box::new(InMemoryDirectory::default()),
        );
        assert!(
            matches!(result, Err(AdsError::InvalidConfig(_))),
            "realm {realm:?} should be rejected"
        );
    }
}

// ─── GPT versions ───────────────────────────────────────────────────

#[test]
fn gpt_version_survives_write_read_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let gpo_dir = dir.path().join(GUID);

    for version in [0u32, 1, 42, 0x0001_0003, u32::MAX] {
        GptIni { version }.write(&gpo_dir).unwrap();
        assert_eq!(sysvol_gpt_version(&gpo_dir).unwrap(), version);
    }
}

#[test]
fn gpt_version_splits_into_machine_and_user_words() {
    let gpt = GptIni {
        version: (7 << 16) | 3,
    };
    assert_eq!(gpt.machine_version(), 3);
    assert_eq!(gpt.user_version(), 7);
}

#[test]
fn gpt_parse_is_case_insensitive() {
    let gpt = GptIni::parse("[general]\nversion=5\n").unwrap();
    assert_eq!(gpt.version, 5);
    assert!(matches!(
        GptIni::parse("[General]\nNothing=here\n"),
        Err(CacheError::GptParse(_))
    ));
}

// ─── Cache refresh ──────────────────────────────────────────────────

#[tokio::test]
async fn refresh_mirrors_sysvol_into_uppercased_cache() {
    let sysvol = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed_sysvol(sysvol.path(), 3);

    let config = config_with_cache(cache.path());
    let gpos = vec![
        GpoEntry::LocalPolicy,
        GpoEntry::remote(GUID, Guid::parse(GUID).unwrap(), &config),
    ];
    let source = LocalDirSource::new(sysvol.path());

    let outcomes = refresh_gpo_list(&config, &gpos, &source, false).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].updated);
    assert_eq!(outcomes[0].version, 3);

    let gpt_ini = cached_gpo_dir(&config).join(GPT_INI);
    assert!(gpt_ini.exists(), "expected {}", gpt_ini.display());
    assert_eq!(sysvol_gpt_version(&cached_gpo_dir(&config)).unwrap(), 3);
}

#[tokio::test]
async fn refresh_is_idempotent_until_the_version_moves() {
    let sysvol = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed_sysvol(sysvol.path(), 3);

    let config = config_with_cache(cache.path());
    let gpos = vec![GpoEntry::remote(GUID, Guid::parse(GUID).unwrap(), &config)];
    let source = LocalDirSource::new(sysvol.path());

    refresh_gpo_list(&config, &gpos, &source, false).await.unwrap();
    let second = refresh_gpo_list(&config, &gpos, &source, false).await.unwrap();
    assert!(!second[0].updated);

    seed_sysvol(sysvol.path(), 4);
    let third = refresh_gpo_list(&config, &gpos, &source, false).await.unwrap();
    assert!(third[0].updated);
    assert_eq!(sysvol_gpt_version(&cached_gpo_dir(&config)).unwrap(), 4);
}

#[tokio::test]
async fn service_refresh_uses_the_directory_listing() {
    let sysvol = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed_sysvol(sysvol.path(), 3);

    let context = ClientContext::new(
        SERVER,
        config_with_cache(cache.path()),
        Credentials::new("tester", "secret"),
    );
    let state = PolicyService::with_backends(
        context,
        Box::new(directory_with_default_gpo()),
        Box::new(LocalDirSource::new(sysvol.path())),
    )
    .unwrap();

    let mut service = state.lock().await;
    service.connect().await.unwrap();
    let outcomes = service.refresh_cache("tester", false).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        service.gpt_version(&Guid::parse(GUID).unwrap()).unwrap(),
        3
    );
}

// ─── Path sanitising ────────────────────────────────────────────────

#[test]
fn sanitizer_canonicalizes_mixed_separators() {
    let unc = format!(r"\\{REALM}\sysvol\{REALM}\Policies\{GUID}");
    assert_eq!(
        sanitize_rel_path(&unc).unwrap(),
        format!("{REALM}/Policies/{GUID}")
    );
    assert_eq!(sanitize_rel_path("/etc/passwd").unwrap(), "etc/passwd");
    assert_eq!(sanitize_rel_path(r"\\etc/\passwd").unwrap(), "etc/passwd");
}

#[test]
fn sanitizer_rejects_traversal() {
    assert!(matches!(
        sanitize_rel_path(r"..\..\etc\passwd"),
        Err(CacheError::PathTraversal(_))
    ));
    assert!(matches!(
        sanitize_rel_path("sysvol/../../secrets"),
        Err(CacheError::PathTraversal(_))
    ));
}

// ─── Extension registry ─────────────────────────────────────────────

#[test]
fn guid_tokens_are_checked() {
    assert!(check_guid(GUID));
    assert!(check_guid(EXT_GUID));
    assert!(!check_guid("AAAAAABBBBBBBCCC"));
    assert!(!check_guid("31B2F340-016D-11D2-945F-00C04FB984F9"));
}

#[test]
fn registry_lifecycle_and_auxiliary_sections() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("gpext.conf");
    let guid = Guid::parse(EXT_GUID).unwrap();

    adpol::register_extension(
        &conf,
        &guid,
        "security",
        "/usr/lib/adpol/security.so",
        PolicyScope::both(),
    )
    .unwrap();

    // An auxiliary section written through the same atomic cycle must not
    // disturb the registry entry.
    let mut doc = adpol_gpext::ConfDocument::load(&conf).unwrap();
    doc.ensure_section("test_section").set("test_var", EXT_GUID);
    adpol_gpext::atomic_write(&conf, &doc).unwrap();

    let listed = adpol::list_extensions(&conf).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed[EXT_GUID].module_path,
        "/usr/lib/adpol/security.so"
    );

    let mut doc = adpol_gpext::ConfDocument::load(&conf).unwrap();
    doc.remove_section("test_section");
    adpol_gpext::atomic_write(&conf, &doc).unwrap();

    assert_eq!(adpol::list_extensions(&conf).unwrap().len(), 1);
    adpol::unregister_extension(&conf, &guid).unwrap();
    assert!(adpol::list_extensions(&conf).unwrap().is_empty());

    let content = fs::read_to_string(&conf).unwrap();
    assert!(!content.contains(EXT_GUID));
}
