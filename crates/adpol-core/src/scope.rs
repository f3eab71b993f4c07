//! Policy scope flags.
//!
//! A client-side extension can apply during machine policy processing,
//! user policy processing, or both. The two flags are independent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyScope {
    pub machine: bool,
    pub user: bool,
}

impl PolicyScope {
    pub fn machine_only() -> Self {
        Self {
            machine: true,
            user: false,
        }
    }

    pub fn user_only() -> Self {
        Self {
            machine: false,
            user: true,
        }
    }

    pub fn both() -> Self {
        Self {
            machine: true,
            user: true,
        }
    }

    /// A scope that applies to neither processing pass is inert; callers
    /// registering extensions should reject it.
    pub fn is_empty(&self) -> bool {
        !self.machine && !self.user
    }
}

impl Default for PolicyScope {
    fn default() -> Self {
        Self::both()
    }
}
