//! Registry operations over the config file.
//!
//! Each extension occupies one section named by its braced GUID. Sections
//! whose name is not a GUID are auxiliary and ignored by the listing.

use crate::conf::{atomic_write, ConfDocument};
use crate::error::{GpextError, GpextResult};
use adpol_core::guid::{check_guid, Guid};
use adpol_core::scope::PolicyScope;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const KEY_MODULE_NAME: &str = "ModuleName";
const KEY_MODULE_PATH: &str = "ModulePath";
const KEY_MACHINE: &str = "MachinePolicy";
const KEY_USER: &str = "UserPolicy";

/// Registered extension metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionEntry {
    pub module_name: String,
    pub module_path: String,
    pub scope: PolicyScope,
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        None => default,
    }
}

/// Associate `guid` with a module in the registry at `conf_path`.
///
/// Re-registering an existing GUID updates its entry in place.
pub fn register_extension(
    conf_path: &Path,
    guid: &Guid,
    module_name: &str,
    module_path: &str,
    scope: PolicyScope,
) -> GpextResult<()> {
    if module_name.is_empty() || module_path.is_empty() {
        return Err(GpextError::InvalidEntry(
            "module name and path must be non-empty".into(),
        ));
    }
    if scope.is_empty() {
        return Err(GpextError::InvalidEntry(format!(
            "extension {guid} would apply to neither machine nor user policy"
        )));
    }

    let mut doc = ConfDocument::load(conf_path)?;
    let section = doc.ensure_section(&guid.to_string());
    section.set(KEY_MODULE_NAME, module_name);
    section.set(KEY_MODULE_PATH, module_path);
    section.set(KEY_MACHINE, if scope.machine { "true" } else { "false" });
    section.set(KEY_USER, if scope.user { "true" } else { "false" });
    atomic_write(conf_path, &doc)?;
    info!("registered extension {guid} -> {module_path}");
    Ok(())
}

/// [`register_extension`] for callers holding an unvalidated GUID token
/// (config files, command-line input). Rejects anything that is not the
/// braced form with [`GpextError::InvalidGuid`].
pub fn register_extension_token(
    conf_path: &Path,
    token: &str,
    module_name: &str,
    module_path: &str,
    scope: PolicyScope,
) -> GpextResult<()> {
    let guid = Guid::parse(token).map_err(|_| GpextError::InvalidGuid(token.to_string()))?;
    register_extension(conf_path, &guid, module_name, module_path, scope)
}

/// Remove the entry for `guid`.
pub fn unregister_extension(conf_path: &Path, guid: &Guid) -> GpextResult<()> {
    let mut doc = ConfDocument::load(conf_path)?;
    if !doc.remove_section(&guid.to_string()) {
        return Err(GpextError::NotFound(guid.to_string()));
    }
    atomic_write(conf_path, &doc)?;
    info!("unregistered extension {guid}");
    Ok(())
}

/// The full GUID → metadata mapping. Auxiliary sections are skipped.
pub fn list_extensions(conf_path: &Path) -> GpextResult<HashMap<String, ExtensionEntry>> {
    let doc = ConfDocument::load(conf_path)?;
    let mut out = HashMap::new();
    for section in doc.sections() {
        if !check_guid(&section.name) {
            continue;
        }
        let module_name = section.get(KEY_MODULE_NAME).unwrap_or_default().to_string();
        let module_path = section.get(KEY_MODULE_PATH).unwrap_or_default().to_string();
        out.insert(
            section.name.clone(),
            ExtensionEntry {
                module_name,
                module_path,
                scope: PolicyScope {
                    machine: parse_flag(section.get(KEY_MACHINE), true),
                    user: parse_flag(section.get(KEY_USER), true),
                },
            },
        );
    }
    Ok(out)
}
