//! Environment abstraction.
//!
//! Process-level facts the engine needs but must not read from ambient
//! globals: which user it runs as, which profiles exist, the platform level,
//! secure settings and whether an interactive surface is in front.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Secure setting controlling installs from outside the market.
pub const INSTALL_NON_MARKET_APPS: &str = "install_non_market_apps";

/// Host user handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl UserId {
    /// The primary (owner) user.
    pub const OWNER: Self = Self(0);

    /// Whether this is the primary user.
    pub fn is_owner(self) -> bool {
        self == Self::OWNER
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Host process environment.
///
/// Production reads these from the platform; the simulation harness serves
/// them from its device model.
pub trait Environment {
    /// User the engine runs as.
    fn current_user(&self) -> UserId;

    /// All profiles of the current user group, including the current user.
    fn user_profiles(&self) -> Vec<UserId>;

    /// Host platform API level.
    fn platform_level(&self) -> u32;

    /// Package name of the engine's own app.
    fn own_package(&self) -> String;

    /// Integer value of a secure setting, `None` if unset or not numeric.
    fn secure_setting(&self, key: &str) -> Option<i64>;

    /// Whether an interactive surface (an activity) originated the call.
    fn has_interactive_surface(&self) -> bool;
}
