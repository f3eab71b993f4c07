//! CLI bridge for `ldapsearch`.
//!
//! Spawns subprocess invocations of the OpenLDAP `ldapsearch` tool for the
//! bind check and GPO container searches. Speaking the LDAP wire protocol
//! in-process is out of scope for this workspace; the subprocess bridge
//! keeps the dependency surface to a binary every AD-joined host already
//! carries.

use crate::backend::{DirectoryBackend, RawGpo};
use crate::error::{AdsError, AdsResult};
use crate::types::{AdsConfig, Credentials};
use adpol_core::guid::Guid;
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// `ldapsearch`-backed [`DirectoryBackend`].
#[derive(Debug, Clone, Default)]
pub struct LdapCliBackend {
    /// Path to the `ldapsearch` binary (None = look in PATH).
    cli_path: Option<String>,
}

impl LdapCliBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_path(mut self, path: &str) -> Self {
        self.cli_path = Some(path.to_string());
        self
    }

    fn ldapsearch_path(&self) -> &str {
        self.cli_path.as_deref().unwrap_or("ldapsearch")
    }

    fn bind_dn(config: &AdsConfig, creds: &Credentials) -> String {
        let domain = creds.domain.as_deref().unwrap_or(&config.workgroup);
        format!("{domain}\\{}", creds.username)
    }

    /// Stage the bind password in a private temp file for `-y`, keeping it
    /// out of the argument list (and the process table). `-y` treats every
    /// byte as password, so no trailing newline.
    fn write_password_file(password: &str) -> AdsResult<tempfile::NamedTempFile> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(password.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    /// Run one `ldapsearch` invocation and return raw LDIF stdout.
    async fn run_search(
        &self,
        server: &str,
        config: &AdsConfig,
        creds: &Credentials,
        base: &str,
        scope: &str,
        filter: &str,
        attrs: &[&str],
    ) -> AdsResult<String> {
        let url = format!("ldap://{server}:{}", config.ldap_port);
        let bind_dn = Self::bind_dn(config, creds);
        let password_file = Self::write_password_file(&creds.password)?;
        let password_path = password_file.path().to_string_lossy().to_string();
        let mut args = vec![
            "-LLL", "-o", "ldif-wrap=no", "-H", &url, "-D", &bind_dn, "-y", &password_path,
            "-b", base, "-s", scope, filter,
        ];
        args.extend_from_slice(attrs);
        debug!(
            "running ldapsearch -H {url} -b {base} -s {scope} {filter}"
        );

        let mut cmd = Command::new(self.ldapsearch_path());
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let timeout = Duration::from_secs(config.timeout_secs);
        let result = tokio::time::timeout(timeout, cmd.output()).await;
        drop(password_file);

        match result {
            Err(_) => Err(AdsError::Timeout(format!(
                "ldapsearch against {server} exceeded {}s",
                config.timeout_secs
            ))),
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(AdsError::CliNotFound(format!(
                        "'{}' is not installed or not in PATH",
                        self.ldapsearch_path()
                    )))
                } else {
                    Err(AdsError::Io(format!("failed to execute ldapsearch: {e}")))
                }
            }
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if !output.status.success() {
                    let code = output.status.code().unwrap_or(-1);
                    debug!("ldapsearch exited with code {code}: {stderr}");
                    // Exit 49 is LDAP invalidCredentials.
                    if code == 49 || stderr.contains("Invalid credentials") {
                        return Err(AdsError::AuthFailed(stderr.trim().to_string()));
                    }
                    if stderr.contains("Can't contact LDAP server") {
                        return Err(AdsError::ConnectionFailed {
                            server: server.to_string(),
                            reason: stderr.trim().to_string(),
                        });
                    }
                    return Err(AdsError::LookupFailed(format!(
                        "ldapsearch failed (exit {code}): {}",
                        stderr.trim()
                    )));
                }
                Ok(stdout)
            }
        }
    }
}

/// Parse `-LLL` LDIF output into GPO records.
///
/// Handles folded continuation lines (leading space) but not base64
/// attributes; `displayName`/`cn` of GPO containers are plain ASCII in
/// practice, and an entry missing either attribute is skipped.
pub fn parse_gpo_ldif(ldif: &str) -> AdsResult<Vec<RawGpo>> {
    let mut unfolded: Vec<String> = Vec::new();
    for line in ldif.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(prev) = unfolded.last_mut() {
                prev.push_str(rest);
                continue;
            }
        }
        unfolded.push(line.to_string());
    }

    let mut gpos = Vec::new();
    let mut display_name: Option<String> = None;
    let mut cn: Option<String> = None;
    let mut flush = |display_name: &mut Option<String>, cn: &mut Option<String>, gpos: &mut Vec<RawGpo>| -> AdsResult<()> {
        if let (Some(name), Some(token)) = (display_name.take(), cn.take()) {
            let guid = Guid::parse(&token)
                .map_err(|e| AdsError::Protocol(e.to_string()))?;
            gpos.push(RawGpo {
                display_name: name,
                guid,
            });
        }
        Ok(())
    };

    for line in &unfolded {
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut display_name, &mut cn, &mut gpos)?;
            continue;
        }
        if let Some((attr, value)) = line.split_once(':') {
            let value = value.trim();
            match attr {
                "displayName" => display_name = Some(value.to_string()),
                "cn" => cn = Some(value.to_string()),
                _ => {}
            }
        }
    }
    flush(&mut display_name, &mut cn, &mut gpos)?;
    Ok(gpos)
}

#[async_trait]
impl DirectoryBackend for LdapCliBackend {
    async fn bind(
        &self,
        server: &str,
        config: &AdsConfig,
        creds: &Credentials,
    ) -> AdsResult<()> {
        // A base-scope read of the domain object both authenticates and
        // proves the naming context exists.
        self.run_search(
            server,
            config,
            creds,
            &config.realm_dn(),
            "base",
            "(objectClass=*)",
            &["dn"],
        )
        .await?;
        Ok(())
    }

    async fn gpos_for_user(
        &self,
        server: &str,
        config: &AdsConfig,
        creds: &Credentials,
        username: &str,
    ) -> AdsResult<Vec<RawGpo>> {
        debug!("enumerating GPO containers for user {username}");
        let ldif = self
            .run_search(
                server,
                config,
                creds,
                &config.policies_dn(),
                "one",
                "(objectClass=groupPolicyContainer)",
                &["displayName", "cn"],
            )
            .await?;
        parse_gpo_ldif(&ldif)
    }
}
