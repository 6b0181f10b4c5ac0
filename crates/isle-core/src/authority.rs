//! Policy authority.
//!
//! [`PolicyAuthority`] is the raw administrative interface of the host,
//! bound to the engine's own admin component. Its calls can fail in two
//! expected ways: the host version does not support the call
//! ([`AuthorityError::PlatformIncompatible`]), or the host rejects the
//! arguments ([`AuthorityError::InvalidArgument`]).
//!
//! [`PolicyClient`] wraps an authority together with the
//! [`PlatformCapabilities`] detected at startup. It skips calls the platform
//! cannot serve and absorbs every failure at the call site with a log line,
//! so lifecycle code never sees an authority error.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    env::UserId,
    intent::{ComponentName, ForwardingFlags, Intent, IntentFilter},
};

/// Lowest platform level with managed profiles.
pub const LEVEL_MANAGED_PROFILES: u32 = 21;

/// Lowest platform level where the authority may write secure settings.
pub const LEVEL_SECURE_SETTINGS: u32 = 22;

/// Errors raised by the host authority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// The call is not available on this host version.
    #[error("{operation} is not supported by this platform")]
    PlatformIncompatible {
        /// Call that failed.
        operation: &'static str,
    },

    /// The host rejected the arguments.
    #[error("{operation} rejected: {reason}")]
    InvalidArgument {
        /// Call that failed.
        operation: &'static str,
        /// Host-provided reason.
        reason: String,
    },

    /// The caller lacks the privilege for the call.
    #[error("{operation} denied: {reason}")]
    Denied {
        /// Call that failed.
        operation: &'static str,
        /// Host-provided reason.
        reason: String,
    },
}

/// User restrictions the engine clears before installing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRestriction {
    /// Installing apps is disallowed.
    InstallApps,
    /// Installing from unknown sources is disallowed.
    InstallUnknownSources,
}

impl UserRestriction {
    /// Host key of the restriction.
    pub fn key(self) -> &'static str {
        match self {
            Self::InstallApps => "no_install_apps",
            Self::InstallUnknownSources => "no_install_unknown_sources",
        }
    }
}

bitflags! {
    /// Flags for wiping the user's data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WipeFlags: u32 {
        /// Also wipe external storage.
        const EXTERNAL_STORAGE = 0x0001;
        /// Also wipe factory reset protection data.
        const RESET_PROTECTION_DATA = 0x0002;
    }
}

/// Result alias for raw authority calls.
pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// Administrative calls of the host, issued on behalf of the engine's admin
/// component.
///
/// Implementations wrap a process-wide host service and therefore take
/// `&self`; any bookkeeping they need lives behind interior mutability.
pub trait PolicyAuthority {
    /// Hide or unhide a package. Returns whether the bit changed.
    fn set_application_hidden(&self, package: &str, hidden: bool) -> AuthorityResult<bool>;

    /// Whether a package is hidden.
    fn is_application_hidden(&self, package: &str) -> AuthorityResult<bool>;

    /// Install an existing system package for the current user.
    fn enable_system_app(&self, package: &str) -> AuthorityResult<()>;

    /// Install every system package resolving the intent. Returns the number
    /// of packages enabled.
    fn enable_system_app_for_intent(&self, intent: &Intent) -> AuthorityResult<u32>;

    /// Clear a user restriction.
    fn clear_user_restriction(&self, restriction: UserRestriction) -> AuthorityResult<()>;

    /// Write a secure setting.
    fn set_secure_setting(&self, key: &str, value: &str) -> AuthorityResult<()>;

    /// Set the display name of the managed profile.
    fn set_profile_name(&self, name: &str) -> AuthorityResult<()>;

    /// Enable the managed profile.
    fn set_profile_enabled(&self) -> AuthorityResult<()>;

    /// Register a cross-profile forwarding rule.
    fn add_cross_profile_intent_filter(
        &self,
        filter: &IntentFilter,
        flags: ForwardingFlags,
    ) -> AuthorityResult<()>;

    /// Whether the package is device owner.
    fn is_device_owner_app(&self, package: &str) -> AuthorityResult<bool>;

    /// Whether the package is profile owner of the current user.
    fn is_profile_owner_app(&self, package: &str) -> AuthorityResult<bool>;

    /// Whether the admin component is active.
    fn is_admin_active(&self) -> AuthorityResult<bool>;

    /// Give up device ownership.
    fn clear_device_owner_app(&self, package: &str) -> AuthorityResult<()>;

    /// Wipe the current user's data. Irreversible.
    fn wipe_data(&self, flags: WipeFlags) -> AuthorityResult<()>;

    /// Profile owner component of another user.
    fn profile_owner_as_user(&self, user: UserId) -> AuthorityResult<Option<ComponentName>>;
}

/// Authority surface available on the detected host version.
///
/// Selected once at startup from the platform level and consulted before
/// calls that only some versions support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformCapabilities {
    /// No managed profiles; no admin surface the engine can use.
    Unsupported,
    /// Managed profiles, but secure settings are read-only to the authority.
    ManagedProfiles,
    /// Managed profiles and authority-writable secure settings.
    SecureSettings,
}

impl PlatformCapabilities {
    /// Detect capabilities from a platform level.
    pub fn detect(level: u32) -> Self {
        if level >= LEVEL_SECURE_SETTINGS {
            Self::SecureSettings
        } else if level >= LEVEL_MANAGED_PROFILES {
            Self::ManagedProfiles
        } else {
            Self::Unsupported
        }
    }

    /// Whether the authority can write secure settings.
    pub fn can_write_secure_settings(self) -> bool {
        self == Self::SecureSettings
    }

    /// Whether profile owners of other users can be queried.
    pub fn can_query_profile_owner(self) -> bool {
        self != Self::Unsupported
    }
}

/// Absorbing client over a [`PolicyAuthority`].
#[derive(Debug)]
pub struct PolicyClient<A> {
    authority: A,
    capabilities: PlatformCapabilities,
}

impl<A: PolicyAuthority> PolicyClient<A> {
    /// Wrap an authority.
    pub fn new(authority: A, capabilities: PlatformCapabilities) -> Self {
        Self { authority, capabilities }
    }

    /// Underlying authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Detected capabilities.
    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// Hide or unhide a package; failures are logged and ignored.
    pub fn set_hidden(&self, package: &str, hidden: bool) {
        match self.authority.set_application_hidden(package, hidden) {
            Ok(changed) => debug!(package, hidden, changed, "set application hidden"),
            Err(e) => absorb(&e),
        }
    }

    /// Hidden bit of a package, `false` if it cannot be read.
    pub fn is_hidden(&self, package: &str) -> bool {
        self.authority.is_application_hidden(package).unwrap_or_else(|e| {
            absorb(&e);
            false
        })
    }

    /// Enable a system package. A rejection means it is already usable.
    pub fn enable_system_app(&self, package: &str) {
        match self.authority.enable_system_app(package) {
            Ok(()) => debug!(package, "system app enabled"),
            Err(AuthorityError::InvalidArgument { reason, .. }) => {
                warn!(package, %reason, "failed to enable system app");
            },
            Err(e) => absorb(&e),
        }
    }

    /// Enable the system packages resolving an intent.
    ///
    /// Some host versions throw after enabling when non-system apps also
    /// match; the system apps are enabled by then, so the rejection is
    /// ignored.
    pub fn enable_system_app_for_intent(&self, intent: &Intent) {
        match self.authority.enable_system_app_for_intent(intent) {
            Ok(0) => {},
            Ok(count) => debug!(count, %intent, "system apps enabled for intent"),
            Err(AuthorityError::InvalidArgument { .. }) => {
                warn!(%intent, "system apps may not be enabled for intent");
            },
            Err(e) => absorb(&e),
        }
    }

    /// Clear a user restriction, best-effort.
    pub fn clear_restriction(&self, restriction: UserRestriction) {
        if let Err(e) = self.authority.clear_user_restriction(restriction) {
            absorb(&e);
        }
    }

    /// Write a secure setting. Returns `false` when the platform does not
    /// allow it or the call failed.
    pub fn set_secure_setting(&self, key: &str, value: &str) -> bool {
        if !self.capabilities.can_write_secure_settings() {
            debug!(key, "secure settings are read-only on this platform");
            return false;
        }
        match self.authority.set_secure_setting(key, value) {
            Ok(()) => true,
            Err(e) => {
                absorb(&e);
                false
            },
        }
    }

    /// Name and enable the managed profile.
    pub fn enable_profile(&self, name: &str) {
        if let Err(e) = self.authority.set_profile_name(name) {
            absorb(&e);
        }
        if let Err(e) = self.authority.set_profile_enabled() {
            absorb(&e);
        }
    }

    /// Register a forwarding rule.
    pub fn add_forwarding(&self, filter: &IntentFilter, flags: ForwardingFlags) {
        match self.authority.add_cross_profile_intent_filter(filter, flags) {
            Ok(()) => debug!(?filter, ?flags, "forwarding rule added"),
            Err(e) => absorb(&e),
        }
    }

    /// Whether the package is device owner; unknown reads as `false`.
    pub fn is_device_owner(&self, package: &str) -> bool {
        self.authority.is_device_owner_app(package).unwrap_or_else(|e| {
            absorb(&e);
            false
        })
    }

    /// Whether the package is profile owner; unknown reads as `false`.
    pub fn is_profile_owner(&self, package: &str) -> bool {
        self.authority.is_profile_owner_app(package).unwrap_or_else(|e| {
            absorb(&e);
            false
        })
    }

    /// Whether the admin component is active; unknown reads as `false`.
    pub fn is_admin_active(&self) -> bool {
        self.authority.is_admin_active().unwrap_or_else(|e| {
            absorb(&e);
            false
        })
    }

    /// Clear device ownership. Returns whether the call went through.
    pub fn clear_device_owner(&self, package: &str) -> bool {
        match self.authority.clear_device_owner_app(package) {
            Ok(()) => true,
            Err(e) => {
                absorb(&e);
                false
            },
        }
    }

    /// Wipe the current user. Returns whether the call went through.
    pub fn wipe(&self, flags: WipeFlags) -> bool {
        match self.authority.wipe_data(flags) {
            Ok(()) => true,
            Err(e) => {
                absorb(&e);
                false
            },
        }
    }

    /// Profile owner of a user, `None` for none or failure.
    pub fn profile_owner_of(&self, user: UserId) -> Option<ComponentName> {
        if !self.capabilities.can_query_profile_owner() {
            warn!(%user, "profile owner lookup is not available on this platform");
            return None;
        }
        self.authority.profile_owner_as_user(user).unwrap_or_else(|e| {
            absorb(&e);
            None
        })
    }
}

fn absorb(error: &AuthorityError) {
    match error {
        AuthorityError::PlatformIncompatible { .. } => warn!(%error, "partially incompatible platform"),
        AuthorityError::InvalidArgument { .. } | AuthorityError::Denied { .. } => {
            warn!(%error, "authority call failed");
        },
    }
}
