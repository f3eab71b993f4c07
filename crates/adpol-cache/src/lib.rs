//! # AdPol – GPO Cache
//!
//! Mirrors remote policy file trees into a local cache and tracks their
//! versions:
//!
//! - **safe_path** – sanitizes backslash-ridden, possibly hostile remote
//!   paths before they are used below the cache root
//! - **gpt** – GPT.INI version metadata (parse, read, write, split)
//! - **refresh** – pulls each listed GPO's file tree into the cache when
//!   its version changed, over a pluggable [`SysvolSource`]
//! - **smb_cli** – the `smbclient`-backed source

pub mod error;
pub mod gpt;
pub mod refresh;
pub mod safe_path;
pub mod smb_cli;

pub use error::{CacheError, CacheResult};
pub use gpt::{sysvol_gpt_version, GptIni, GPT_INI};
pub use refresh::{cache_path, refresh_gpo_list, LocalDirSource, RefreshOutcome, SysvolSource};
pub use safe_path::sanitize_rel_path;
pub use smb_cli::SmbCliSource;
