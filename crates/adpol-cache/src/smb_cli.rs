//! CLI bridge for `smbclient`.
//!
//! Spawns subprocess invocations of `smbclient` against the controller's
//! sysvol share. The same rationale as the directory connector applies:
//! the workspace does not speak SMB in-process, it drives the client
//! binary the host already has.

use crate::error::{CacheError, CacheResult};
use crate::refresh::SysvolSource;
use adpol_ads::types::{AdsConfig, Credentials, SYSVOL_SHARE};
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// `smbclient`-backed [`SysvolSource`].
#[derive(Debug, Clone)]
pub struct SmbCliSource {
    server: String,
    workgroup: String,
    username: String,
    password: String,
    timeout: Duration,
    /// Path to the `smbclient` binary (None = look in PATH).
    cli_path: Option<String>,
}

impl SmbCliSource {
    pub fn new(server: &str, config: &AdsConfig, creds: &Credentials) -> Self {
        SmbCliSource {
            server: server.to_string(),
            workgroup: creds
                .domain
                .clone()
                .unwrap_or_else(|| config.workgroup.clone()),
            username: creds.username.clone(),
            password: creds.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cli_path: None,
        }
    }

    pub fn with_cli_path(mut self, path: &str) -> Self {
        self.cli_path = Some(path.to_string());
        self
    }

    fn smbclient_path(&self) -> &str {
        self.cli_path.as_deref().unwrap_or("smbclient")
    }

    /// Authentication arguments. The password never appears here; it goes
    /// through the `PASSWD` environment variable, which smbclient reads and
    /// which stays out of the process table.
    fn auth_args(&self) -> Vec<String> {
        vec![
            "-U".to_string(),
            self.username.clone(),
            "-W".to_string(),
            self.workgroup.clone(),
        ]
    }

    /// Run one `smbclient -c` command string against the sysvol share.
    async fn run(&self, command: &str) -> CacheResult<String> {
        let service = format!("//{}/{}", self.server, SYSVOL_SHARE);
        debug!("running smbclient {service} -c {command:?}");

        let mut cmd = Command::new(self.smbclient_path());
        cmd.arg(&service)
            .args(self.auth_args())
            .args(["-c", command])
            .env("PASSWD", &self.password)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;
        match result {
            Err(_) => Err(CacheError::Fetch(format!(
                "smbclient against {} timed out",
                self.server
            ))),
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(CacheError::Fetch(format!(
                        "'{}' is not installed or not in PATH",
                        self.smbclient_path()
                    )))
                } else {
                    Err(CacheError::Io(format!("failed to execute smbclient: {e}")))
                }
            }
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if !output.status.success() {
                    let code = output.status.code().unwrap_or(-1);
                    debug!("smbclient exited with code {code}: {stderr}");
                    return Err(CacheError::Fetch(format!(
                        "smbclient failed (exit {code}): {}",
                        if stderr.trim().is_empty() {
                            stdout.trim()
                        } else {
                            stderr.trim()
                        }
                    )));
                }
                Ok(stdout)
            }
        }
    }

    fn to_smb_path(rel_path: &str) -> String {
        format!("\\{}", rel_path.replace('/', "\\"))
    }
}

/// Parse `recurse; ls` output into file paths relative to the listed
/// directory.
///
/// The output interleaves directory headers (`\realm\Policies\{GUID}`) with
/// indented entry lines (`  GPT.INI    A    23  Mon Jun ...`). Directory
/// entries (attribute containing `D`) and the `.`/`..` pseudo-entries are
/// skipped. `base` is the share-relative directory the listing was taken
/// from.
pub fn parse_recursive_listing(output: &str, base: &str) -> Vec<String> {
    let base_smb = format!("\\{}", base.replace('/', "\\"));
    let mut files = Vec::new();
    let mut current_dir = String::new();

    for line in output.lines() {
        let trimmed = line.trim_end();
        if trimmed.starts_with('\\') {
            current_dir = trimmed.trim_end_matches('\\').to_string();
            continue;
        }
        if !line.starts_with("  ") || trimmed.trim().is_empty() {
            continue;
        }
        // "  <name>  <attrs>  <size>  <weekday month day time year>"
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 8 {
            continue;
        }
        let name_tokens = &tokens[..tokens.len() - 7];
        let attrs = tokens[tokens.len() - 7];
        let name = name_tokens.join(" ");
        if name.is_empty() || name == "." || name == ".." {
            continue;
        }
        if attrs.contains('D') {
            continue;
        }
        let dir_rel = current_dir
            .strip_prefix(&base_smb)
            .unwrap_or("")
            .trim_start_matches('\\')
            .replace('\\', "/");
        if dir_rel.is_empty() {
            files.push(name);
        } else {
            files.push(format!("{dir_rel}/{name}"));
        }
    }
    files.sort();
    files
}

#[async_trait]
impl SysvolSource for SmbCliSource {
    async fn list_files(&self, rel_path: &str) -> CacheResult<Vec<String>> {
        let dir = Self::to_smb_path(rel_path);
        let output = self
            .run(&format!("recurse ON; cd \"{dir}\"; ls"))
            .await?;
        Ok(parse_recursive_listing(&output, rel_path))
    }

    async fn fetch(&self, rel_path: &str) -> CacheResult<Vec<u8>> {
        let remote = Self::to_smb_path(rel_path);
        let tmp = tempfile::NamedTempFile::new()?;
        let local = tmp.path().to_string_lossy().to_string();
        self.run(&format!("get \"{remote}\" \"{local}\"")).await?;
        let data = std::fs::read(tmp.path())?;
        Ok(data)
    }
}
