//! Package registry.

use thiserror::Error;

use crate::{
    app::AppRecord,
    env::UserId,
    intent::{ComponentName, Intent, ResolveFlags, ResolveInfo},
};

/// Errors raised by the package registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The package is unknown to the registry, even among uninstalled ones.
    #[error("package not found: {0}")]
    NotFound(String),
}

/// Enabled setting of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Manifest default.
    Default,
    /// Explicitly enabled.
    Enabled,
    /// Explicitly disabled.
    Disabled,
}

/// Package metadata and activity resolution of the host.
pub trait PackageRegistry {
    /// Metadata of a package in the current user. With `include_uninstalled`
    /// packages known to another user are reported without the installed
    /// flag.
    fn application_info(
        &self,
        package: &str,
        include_uninstalled: bool,
    ) -> Result<AppRecord, RegistryError>;

    /// Best activity for an intent.
    fn resolve_activity(&self, intent: &Intent, flags: ResolveFlags) -> Option<ResolveInfo>;

    /// Launcher intent of a package.
    fn launch_intent(&self, package: &str) -> Option<Intent>;

    /// User-visible label of a package.
    fn app_label(&self, package: &str) -> Result<String, RegistryError>;

    /// Set a component's enabled state without killing its app.
    fn set_component_enabled(&self, component: &ComponentName, state: ComponentState);

    /// Whether a package is installed and enabled for another user.
    fn is_package_enabled_for(&self, package: &str, user: UserId) -> bool;
}
