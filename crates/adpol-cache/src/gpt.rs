//! GPT.INI version metadata.
//!
//! Every GPO directory carries a small INI file with a single integer under
//! `[General]`:
//!
//! ```text
//! [General]
//! Version=65539
//! ```
//!
//! The version increases monotonically per GPO update and packs the user
//! version in the high 16 bits and the machine version in the low 16 bits.
//! Section and key names are matched case-insensitively, as the native
//! parsers do.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the per-GPO metadata file.
pub const GPT_INI: &str = "GPT.INI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GptIni {
    pub version: u32,
}

impl GptIni {
    /// Machine policy version (low word).
    pub fn machine_version(&self) -> u16 {
        (self.version & 0xffff) as u16
    }

    /// User policy version (high word).
    pub fn user_version(&self) -> u16 {
        (self.version >> 16) as u16
    }

    /// Parse GPT.INI content.
    pub fn parse(content: &str) -> CacheResult<Self> {
        let mut in_general = false;
        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                let section = &line[1..line.len() - 1];
                in_general = section.eq_ignore_ascii_case("General");
                continue;
            }
            if !in_general {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if key.trim().eq_ignore_ascii_case("Version") {
                    let version = value.trim().parse::<u32>().map_err(|_| {
                        CacheError::GptParse(format!("bad Version value {:?}", value.trim()))
                    })?;
                    return Ok(GptIni { version });
                }
            }
        }
        Err(CacheError::GptParse(
            "no Version key under [General]".into(),
        ))
    }

    pub fn render(&self) -> String {
        format!("[General]\nVersion={}\n", self.version)
    }

    /// Read `<gpo_dir>/GPT.INI`.
    pub fn read(gpo_dir: &Path) -> CacheResult<Self> {
        let path = gpo_dir.join(GPT_INI);
        let content = fs::read_to_string(&path)
            .map_err(|_| CacheError::MissingFile(path.display().to_string()))?;
        Self::parse(&content)
    }

    /// Write `<gpo_dir>/GPT.INI`, creating the directory chain as needed.
    pub fn write(&self, gpo_dir: &Path) -> CacheResult<()> {
        fs::create_dir_all(gpo_dir)?;
        fs::write(gpo_dir.join(GPT_INI), self.render())?;
        Ok(())
    }
}

/// Version of the GPO cached at `gpo_dir`.
pub fn sysvol_gpt_version(gpo_dir: &Path) -> CacheResult<u32> {
    Ok(GptIni::read(gpo_dir)?.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version() {
        let gpt = GptIni::parse("[General]\nVersion=42").unwrap();
        assert_eq!(gpt.version, 42);
    }

    #[test]
    fn case_insensitive_section_and_key() {
        let gpt = GptIni::parse("[general]\r\nversion=7\r\n").unwrap();
        assert_eq!(gpt.version, 7);
    }

    #[test]
    fn version_split() {
        let gpt = GptIni { version: 0x0003_0002 };
        assert_eq!(gpt.machine_version(), 2);
        assert_eq!(gpt.user_version(), 3);
    }

    #[test]
    fn rejects_missing_version() {
        assert!(GptIni::parse("[General]\nDisplayName=x").is_err());
        assert!(GptIni::parse("Version=5").is_err());
    }

    #[test]
    fn rejects_bad_integer() {
        assert!(matches!(
            GptIni::parse("[General]\nVersion=banana"),
            Err(CacheError::GptParse(_))
        ));
    }

    #[test]
    fn version_outside_general_is_ignored() {
        let content = "[Other]\nVersion=9\n[General]\nVersion=4\n";
        assert_eq!(GptIni::parse(content).unwrap().version, 4);
    }

    #[test]
    fn write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let gpo_dir = dir.path().join("{31B2F340-016D-11D2-945F-00C04FB984F9}");
        for version in [0u32, 1, 42, 65539, u32::MAX] {
            GptIni { version }.write(&gpo_dir).unwrap();
            assert_eq!(sysvol_gpt_version(&gpo_dir).unwrap(), version);
        }
    }

    #[test]
    fn restore_original_version() {
        let dir = tempfile::tempdir().unwrap();
        let gpo_dir = dir.path().to_path_buf();
        GptIni { version: 17 }.write(&gpo_dir).unwrap();
        let old = sysvol_gpt_version(&gpo_dir).unwrap();

        GptIni { version: 42 }.write(&gpo_dir).unwrap();
        assert_eq!(sysvol_gpt_version(&gpo_dir).unwrap(), 42);

        GptIni { version: old }.write(&gpo_dir).unwrap();
        assert_eq!(sysvol_gpt_version(&gpo_dir).unwrap(), old);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            sysvol_gpt_version(dir.path()),
            Err(CacheError::MissingFile(_))
        ));
    }
}
