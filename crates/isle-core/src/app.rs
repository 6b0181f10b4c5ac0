//! App records and state classification.
//!
//! An [`AppRecord`] is a snapshot of registry metadata for one package. It is
//! fetched fresh before every state-dependent decision and never cached
//! across operations, since the installer and the user can change it at any
//! time from outside the engine.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Package flags reported by the registry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AppFlags: u32 {
        /// Part of the system image.
        const SYSTEM = 1 << 0;
        /// Installed for the current user.
        const INSTALLED = 1 << 23;
    }
}

/// Registry metadata for a single package in the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Package identifier, the unique key.
    pub package: String,
    /// Installed and system flags.
    pub flags: AppFlags,
    /// Whether the package is enabled.
    pub enabled: bool,
}

impl AppRecord {
    /// Create a record.
    pub fn new(package: impl Into<String>, flags: AppFlags, enabled: bool) -> Self {
        Self { package: package.into(), flags, enabled }
    }

    /// Installed for the current user.
    pub fn is_installed(&self) -> bool {
        self.flags.contains(AppFlags::INSTALLED)
    }

    /// Shipped with the system image.
    pub fn is_system(&self) -> bool {
        self.flags.contains(AppFlags::SYSTEM)
    }
}

/// Derived lifecycle state of an app inside the island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppState {
    /// Not installed in the island.
    NotCloned,
    /// Installed but disabled by the user or the system.
    Disabled,
    /// Installed and hidden by the authority.
    Frozen,
    /// Installed, enabled and visible.
    Alive,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotCloned => "not-cloned",
            Self::Disabled => "disabled",
            Self::Frozen => "frozen",
            Self::Alive => "alive",
        };
        f.pad(name)
    }
}

/// Classify an app from its record and the authority's hidden bit.
///
/// Precedence: not installed, then not enabled, then hidden. The caller must
/// pass a freshly fetched record.
pub fn classify(record: &AppRecord, hidden: bool) -> AppState {
    if !record.is_installed() {
        return AppState::NotCloned;
    }
    if !record.enabled {
        return AppState::Disabled;
    }
    if hidden {
        return AppState::Frozen;
    }
    AppState::Alive
}
