//! Client context.
//!
//! Everything a policy client needs to talk to a domain: which controller,
//! which domain configuration, and which credentials. The library never
//! reads the process environment on its own; [`ClientContext::from_env`] is
//! an opt-in convenience for harnesses that configure themselves that way.

use adpol_ads::{AdsConfig, AdsError, AdsResult, Credentials};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    /// Domain controller host name or address.
    pub server: String,
    pub config: AdsConfig,
    pub credentials: Credentials,
}

impl ClientContext {
    pub fn new(server: &str, config: AdsConfig, credentials: Credentials) -> Self {
        ClientContext {
            server: server.to_string(),
            config,
            credentials,
        }
    }

    /// Build a context from `ADPOL_SERVER`, `ADPOL_REALM`, `ADPOL_USERNAME`,
    /// `ADPOL_PASSWORD` and the optional `ADPOL_CACHE_DIR`.
    pub fn from_env() -> AdsResult<Self> {
        let server = require_env("ADPOL_SERVER")?;
        let realm = require_env("ADPOL_REALM")?;
        let username = require_env("ADPOL_USERNAME")?;
        let password = require_env("ADPOL_PASSWORD")?;

        let mut config = AdsConfig::new(&realm);
        if let Ok(dir) = env::var("ADPOL_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        config.validate()?;

        Ok(ClientContext::new(
            &server,
            config,
            Credentials::new(&username, &password),
        ))
    }
}

fn require_env(key: &str) -> AdsResult<String> {
    env::var(key).map_err(|_| AdsError::InvalidConfig(format!("{key} is not set")))
}
