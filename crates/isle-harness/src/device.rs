//! Simulated device state.
//!
//! [`SimDevice`] is a plain data model of everything the engine's
//! collaborators would read or change on a real host: packages of the
//! current user, secure settings, restrictions, ownership, forwarding rules
//! and disabled components. Every mutating authority call is appended to a
//! call log so tests can assert on exactly what was issued.

use std::collections::{BTreeMap, BTreeSet};

use isle_core::{
    AppFlags, AppRecord, ComponentName, ForwardingFlags, Intent, IntentFilter, UserId,
    UserRestriction, env::INSTALL_NON_MARKET_APPS, intent::ACTION_INSTALL_PACKAGE,
};

/// Package of the engine's own app in the simulation.
pub const OWN_PACKAGE: &str = "org.isle.engine";

/// User id of the simulated island profile.
pub const ISLAND_USER: UserId = UserId(10);

/// Mutating authority call, as recorded by the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityCall {
    /// Hidden bit written.
    SetHidden {
        /// Target package.
        package: String,
        /// New value.
        hidden: bool,
    },
    /// System package enabled by name.
    EnableSystemApp {
        /// Target package.
        package: String,
    },
    /// System packages enabled for an intent.
    EnableSystemAppForIntent {
        /// Matching intent.
        intent: Intent,
    },
    /// Restriction cleared.
    ClearRestriction(UserRestriction),
    /// Secure setting written.
    SetSecureSetting {
        /// Setting key.
        key: String,
        /// Setting value.
        value: String,
    },
    /// Profile named.
    SetProfileName(String),
    /// Profile enabled.
    SetProfileEnabled,
    /// Forwarding rule added.
    AddForwarding {
        /// Filter of the rule.
        filter: IntentFilter,
        /// Direction of the rule.
        flags: ForwardingFlags,
    },
    /// Device ownership cleared.
    ClearDeviceOwner,
    /// User data wiped.
    Wipe,
}

/// Failures injected into the simulated authority.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Operations reported as unsupported by the platform.
    pub incompatible: BTreeSet<&'static str>,
    /// Reject intent-based system app enabling after it has enabled the
    /// matching apps, as some host versions do.
    pub reject_intent_enable: bool,
}

/// One package known to the simulated registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPackage {
    /// Registry record in the current user.
    pub record: AppRecord,
    /// Hidden by the authority.
    pub hidden: bool,
    /// Display label.
    pub label: String,
    /// Has a launcher entry.
    pub launchable: bool,
    /// Installed and enabled in the owner user.
    pub enabled_for_owner: bool,
    /// Handles `market://` details pages.
    pub market: bool,
    /// Handles install intents.
    pub installer: bool,
}

impl SimPackage {
    fn new(package: &str, flags: AppFlags) -> Self {
        Self {
            record: AppRecord::new(package, flags, true),
            hidden: false,
            label: package.rsplit('.').next().unwrap_or(package).to_string(),
            launchable: true,
            enabled_for_owner: true,
            market: false,
            installer: false,
        }
    }

    /// A user-installed app, not installed in the current user.
    pub fn user_app(package: &str) -> Self {
        Self::new(package, AppFlags::empty())
    }

    /// A system app, not installed in the current user.
    pub fn system_app(package: &str) -> Self {
        Self::new(package, AppFlags::SYSTEM)
    }

    /// Mark installed in the current user.
    #[must_use]
    pub fn installed(mut self) -> Self {
        self.record.flags |= AppFlags::INSTALLED;
        self
    }

    /// Mark hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.record.enabled = false;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Remove the launcher entry.
    #[must_use]
    pub fn headless(mut self) -> Self {
        self.launchable = false;
        self
    }

    /// Only present in the island.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.enabled_for_owner = false;
        self
    }

    /// Handles market details pages.
    #[must_use]
    pub fn market(mut self) -> Self {
        self.market = true;
        self
    }

    /// Handles install intents.
    #[must_use]
    pub fn installer(mut self) -> Self {
        self.installer = true;
        self
    }

    /// Whether this package handles the intent.
    pub fn handles(&self, intent: &Intent) -> bool {
        if let Some(package) = &intent.package {
            return package == &self.record.package;
        }
        match intent.scheme() {
            Some("market") => self.market,
            Some("package") => {
                self.installer
                    && intent.action.as_deref() == Some(ACTION_INSTALL_PACKAGE)
            },
            _ => false,
        }
    }
}

/// Simulated device as seen by one user.
#[derive(Debug, Clone)]
pub struct SimDevice {
    /// User the engine runs as.
    pub user: UserId,
    /// Profiles of the user group.
    pub profiles: Vec<UserId>,
    /// Platform API level.
    pub level: u32,
    /// Whether an interactive surface originated calls.
    pub interactive: bool,
    /// Known packages.
    pub packages: BTreeMap<String, SimPackage>,
    /// Secure settings.
    pub settings: BTreeMap<String, i64>,
    /// Active user restrictions.
    pub restrictions: BTreeSet<&'static str>,
    /// Device owner package.
    pub device_owner: Option<String>,
    /// Profile owner package of the current user.
    pub profile_owner: Option<String>,
    /// Profile owners of other users.
    pub profile_owners: BTreeMap<UserId, ComponentName>,
    /// Admin component active.
    pub admin_active: bool,
    /// Forwarding rules.
    pub forwarding: Vec<(IntentFilter, ForwardingFlags)>,
    /// Explicitly disabled components.
    pub disabled_components: BTreeSet<ComponentName>,
    /// Profile display name.
    pub profile_name: Option<String>,
    /// Profile enabled.
    pub profile_enabled: bool,
    /// User data wiped.
    pub wiped: bool,
    /// Injected failures.
    pub faults: Faults,
    /// Mutating authority calls, in order.
    pub calls: Vec<AuthorityCall>,
}

impl SimDevice {
    fn base(user: UserId) -> Self {
        Self {
            user,
            profiles: vec![UserId::OWNER, ISLAND_USER],
            level: 28,
            interactive: true,
            packages: BTreeMap::new(),
            settings: BTreeMap::new(),
            restrictions: [
                UserRestriction::InstallApps.key(),
                UserRestriction::InstallUnknownSources.key(),
            ]
            .into_iter()
            .collect(),
            device_owner: None,
            profile_owner: None,
            profile_owners: BTreeMap::new(),
            admin_active: false,
            forwarding: Vec::new(),
            disabled_components: BTreeSet::new(),
            profile_name: None,
            profile_enabled: false,
            wiped: false,
            faults: Faults::default(),
            calls: Vec::new(),
        }
    }

    /// Engine running in the island, which it owns and administers.
    pub fn island() -> Self {
        let mut device = Self::base(ISLAND_USER);
        device.profile_owner = Some(OWN_PACKAGE.to_string());
        device.admin_active = true;
        device
            .profile_owners
            .insert(ISLAND_USER, ComponentName::new(OWN_PACKAGE, ".IslandDeviceAdminReceiver"));
        device
    }

    /// Engine running in the owner user without any authority.
    pub fn owner() -> Self {
        Self::base(UserId::OWNER)
    }

    /// Add a package.
    #[must_use]
    pub fn with_package(mut self, package: SimPackage) -> Self {
        self.packages.insert(package.record.package.clone(), package);
        self
    }

    /// Set the platform level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Allow installs from outside the market.
    #[must_use]
    pub fn with_non_market_allowed(mut self) -> Self {
        self.settings.insert(INSTALL_NON_MARKET_APPS.to_string(), 1);
        self
    }

    /// Run without an interactive surface.
    #[must_use]
    pub fn headless(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Make the engine device owner.
    #[must_use]
    pub fn with_device_owner(mut self) -> Self {
        self.device_owner = Some(OWN_PACKAGE.to_string());
        self
    }

    /// Inject faults.
    #[must_use]
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Whether a package is installed in the current user.
    pub fn is_installed(&self, package: &str) -> bool {
        self.packages.get(package).is_some_and(|p| p.record.is_installed())
    }

    /// Whether a package is hidden.
    pub fn is_hidden(&self, package: &str) -> bool {
        self.packages.get(package).is_some_and(|p| p.hidden)
    }

    /// Install a package as an out-of-process installer would.
    pub fn complete_install(&mut self, package: &str) -> bool {
        match self.packages.get_mut(package) {
            Some(p) if !p.record.is_installed() => {
                p.record.flags |= AppFlags::INSTALLED;
                p.hidden = false;
                true
            },
            _ => false,
        }
    }

    /// Uninstall a package as the user would from outside the engine.
    pub fn uninstall(&mut self, package: &str) -> bool {
        match self.packages.get_mut(package) {
            Some(p) if p.record.is_installed() => {
                p.record.flags.remove(AppFlags::INSTALLED);
                p.hidden = false;
                true
            },
            _ => false,
        }
    }

    /// Recorded by-package system app enable calls.
    pub fn enable_calls(&self) -> Vec<&AuthorityCall> {
        self.calls.iter().filter(|c| matches!(c, AuthorityCall::EnableSystemApp { .. })).collect()
    }
}
