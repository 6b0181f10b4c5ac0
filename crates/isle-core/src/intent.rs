//! Intents, filters and components.
//!
//! A minimal model of the host's activity routing vocabulary. The engine
//! builds intents and hands them back to the runtime inside actions; it
//! never resolves routing itself beyond asking the registry.

use std::{collections::BTreeMap, fmt};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::app::AppRecord;

/// Open a package installer for the data URI.
pub const ACTION_INSTALL_PACKAGE: &str = "android.intent.action.INSTALL_PACKAGE";
/// Open a package uninstaller for the data URI.
pub const ACTION_UNINSTALL_PACKAGE: &str = "android.intent.action.UNINSTALL_PACKAGE";
/// Display the data URI.
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
/// Main entry point.
pub const ACTION_MAIN: &str = "android.intent.action.MAIN";

/// Shown in the launcher.
pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";
/// Implicitly resolvable.
pub const CATEGORY_DEFAULT: &str = "android.intent.category.DEFAULT";

/// Package that initiated an install.
pub const EXTRA_INSTALLER_PACKAGE_NAME: &str = "android.intent.extra.INSTALLER_PACKAGE_NAME";
/// Ask the installer to report its result.
pub const EXTRA_RETURN_RESULT: &str = "android.intent.extra.RETURN_RESULT";

/// Scheme for package URIs.
pub const SCHEME_PACKAGE: &str = "package";
/// Scheme for app market URIs.
pub const SCHEME_MARKET: &str = "market";

bitflags! {
    /// Activity launch flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LaunchFlags: u32 {
        /// Start in a new task.
        const NEW_TASK = 0x1000_0000;
        /// Bring an existing task to front and reset it if needed.
        const RESET_TASK_IF_NEEDED = 0x0020_0000;
    }
}

bitflags! {
    /// Registry resolution flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResolveFlags: u32 {
        /// Include disabled components.
        const MATCH_DISABLED_COMPONENTS = 0x0000_0200;
        /// Include packages that are not installed for the user.
        const MATCH_UNINSTALLED_PACKAGES = 0x0000_2000;
    }
}

bitflags! {
    /// Direction of a cross-profile forwarding rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ForwardingFlags: u32 {
        /// Intents from the island may resolve in the owner.
        const MANAGED_CAN_ACCESS_PARENT = 1;
        /// Intents from the owner may resolve in the island.
        const PARENT_CAN_ACCESS_MANAGED = 2;
    }
}

/// Fully qualified component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentName {
    /// Owning package.
    pub package: String,
    /// Class name inside the package.
    pub class: String,
}

impl ComponentName {
    /// Create a component name.
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self { package: package.into(), class: class.into() }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Request to start an activity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    /// Action string.
    pub action: Option<String>,
    /// Data URI.
    pub data: Option<String>,
    /// Restrict resolution to this package.
    pub package: Option<String>,
    /// Categories, kept sorted.
    pub categories: Vec<String>,
    /// String extras.
    pub extras: BTreeMap<String, String>,
    /// Launch flags.
    pub flags: LaunchFlags,
}

impl Intent {
    /// Create an intent with an action.
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: Some(action.into()), ..Self::default() }
    }

    /// Install intent for a package.
    pub fn install_package(package: &str, installer: &str) -> Self {
        Self::new(ACTION_INSTALL_PACKAGE)
            .with_data(package_uri(package))
            .with_extra(EXTRA_INSTALLER_PACKAGE_NAME, installer)
    }

    /// Uninstall intent for a package.
    pub fn uninstall_package(package: &str) -> Self {
        Self::new(ACTION_UNINSTALL_PACKAGE).with_data(package_uri(package))
    }

    /// Market details page for a package.
    pub fn market_details(package: &str) -> Self {
        Self::new(ACTION_VIEW).with_data(format!("{SCHEME_MARKET}://details?id={package}"))
    }

    /// Launcher entry query for a package.
    pub fn launcher_query(package: &str) -> Self {
        Self::new(ACTION_MAIN).with_category(CATEGORY_LAUNCHER).with_package(package)
    }

    /// Set the data URI.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Restrict to a package.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Add a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if let Err(pos) = self.categories.binary_search(&category) {
            self.categories.insert(pos, category);
        }
        self
    }

    /// Put a string extra.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Add launch flags.
    #[must_use]
    pub fn with_flags(mut self, flags: LaunchFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Scheme of the data URI, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.data.as_deref().and_then(|data| data.split_once(':')).map(|(scheme, _)| scheme)
    }

    /// Package named by a `package:` data URI.
    pub fn data_package(&self) -> Option<&str> {
        self.data.as_deref().and_then(|data| data.strip_prefix("package:"))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Intent {{ act={}", self.action.as_deref().unwrap_or("-"))?;
        if let Some(data) = &self.data {
            write!(f, " dat={data}")?;
        }
        if let Some(package) = &self.package {
            write!(f, " pkg={package}")?;
        }
        f.write_str(" }")
    }
}

/// Matching rule for intents, used by cross-profile forwarding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentFilter {
    /// Accepted actions.
    pub actions: Vec<String>,
    /// Required categories.
    pub categories: Vec<String>,
    /// Accepted data schemes; empty accepts intents without data.
    pub schemes: Vec<String>,
}

impl IntentFilter {
    /// Filter for a single action.
    pub fn for_action(action: impl Into<String>) -> Self {
        Self { actions: vec![action.into()], ..Self::default() }
    }

    /// Add a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a data scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into());
        self
    }

    /// Whether the intent satisfies this filter.
    pub fn matches(&self, intent: &Intent) -> bool {
        let action_ok = intent.action.as_ref().is_some_and(|action| self.actions.contains(action));
        let categories_ok = intent.categories.iter().all(|c| {
            c == CATEGORY_DEFAULT || self.categories.contains(c)
        });
        let scheme_ok = match intent.scheme() {
            Some(scheme) => self.schemes.iter().any(|s| s == scheme),
            None => self.schemes.is_empty(),
        };
        action_ok && categories_ok && scheme_ok
    }
}

/// Result of resolving an intent to an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveInfo {
    /// Resolved activity.
    pub activity: ComponentName,
    /// Metadata of the package hosting the activity.
    pub app: AppRecord,
}

/// `package:` URI for a package.
pub fn package_uri(package: &str) -> String {
    format!("{SCHEME_PACKAGE}:{package}")
}
