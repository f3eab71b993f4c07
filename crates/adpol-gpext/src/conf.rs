//! Order-preserving INI-style config document.
//!
//! The registry file format: `[section]` headers, `key = value` lines,
//! `#`/`;` comment lines. Parsing preserves section and key order so a
//! parse → mutate → write cycle does not shuffle unrelated sections.
//! Comments are not round-tripped; the file is machine-managed.

use crate::error::{GpextError, GpextResult};
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfSection {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl ConfSection {
    pub fn new(name: &str) -> Self {
        ConfSection {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an existing key in place or append a new one.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfDocument {
    sections: Vec<ConfSection>,
}

impl ConfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> GpextResult<Self> {
        let mut doc = ConfDocument::new();
        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') {
                if !line.ends_with(']') || line.len() < 3 {
                    return Err(GpextError::Parse(format!(
                        "line {}: malformed section header {line:?}",
                        lineno + 1
                    )));
                }
                doc.sections
                    .push(ConfSection::new(&line[1..line.len() - 1]));
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(GpextError::Parse(format!(
                    "line {}: expected key = value, got {line:?}",
                    lineno + 1
                )));
            };
            let Some(section) = doc.sections.last_mut() else {
                return Err(GpextError::Parse(format!(
                    "line {}: entry before any section header",
                    lineno + 1
                )));
            };
            section.set(key.trim(), value.trim());
        }
        Ok(doc)
    }

    /// Load from `path`; a missing file is an empty document.
    pub fn load(path: &Path) -> GpextResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in section.entries() {
                out.push_str(&format!("{key} = {value}\n"));
            }
            out.push('\n');
        }
        out
    }

    pub fn section(&self, name: &str) -> Option<&ConfSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut ConfSection> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Existing section or a freshly appended one.
    pub fn ensure_section(&mut self, name: &str) -> &mut ConfSection {
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(ConfSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        self.sections.len() != before
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = &ConfSection> {
        self.sections.iter()
    }
}

/// Write `doc` to `path` atomically.
///
/// The content goes to a temp file in the same directory, is flushed to
/// disk, and renamed over the target. Any failure before the rename leaves
/// the prior file untouched; the temp file is discarded on drop.
pub fn atomic_write(path: &Path, doc: &ConfDocument) -> GpextResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new()?,
    };
    tmp.write_all(doc.render().as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| GpextError::Io(format!("atomic rename failed: {}", e.error)))?;
    Ok(())
}
