//! # AdPol – Extension Registry
//!
//! Client-side policy extensions are modules invoked during policy
//! processing, keyed by GUID. The registry lives in an INI-style config
//! file next to the policy cache:
//!
//! ```text
//! [{827D319E-6EAC-11D2-A4EA-00C04F79F83A}]
//! ModuleName = security
//! ModulePath = /usr/lib/adpol/security.so
//! MachinePolicy = true
//! UserPolicy = false
//! ```
//!
//! Updates are atomic: the file is parsed, mutated in memory, written to a
//! temp file in the same directory, and renamed over the original. A crash
//! mid-write leaves the prior file intact. Auxiliary sections that are not
//! GUID-keyed coexist with registry entries and survive registry updates.

pub mod conf;
pub mod error;
pub mod registry;

pub use conf::{atomic_write, ConfDocument, ConfSection};
pub use error::{GpextError, GpextResult};
pub use registry::{
    list_extensions, register_extension, register_extension_token, unregister_extension,
    ExtensionEntry,
};
