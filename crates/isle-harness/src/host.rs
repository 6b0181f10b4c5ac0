//! Simulated host services.
//!
//! [`SimHost`] is a shared handle to one [`SimDevice`] and implements every
//! collaborator trait of the engine over it. Cloning the handle shares the
//! device, so a test keeps one clone to inspect and mutate the device while
//! the engine owns the others.

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use isle_core::{
    AppFlags, AppRecord, AuthorityError, ComponentName, ComponentState, EngineConfig, Environment,
    ForwardingFlags, Intent, IntentFilter, IslandEngine, MemoryGateStore, PackageRegistry,
    PolicyAuthority, RegistryError, ResolveFlags, ResolveInfo, UserId, UserRestriction,
    WipeFlags, authority::AuthorityResult,
};
use tracing::trace;

use crate::device::{AuthorityCall, OWN_PACKAGE, SimDevice};

/// Engine wired to a simulated host.
pub type SimEngine = IslandEngine<SimHost, SimHost, SimHost, MemoryGateStore>;

/// Shared handle to a simulated device.
#[derive(Debug, Clone)]
pub struct SimHost(Rc<RefCell<SimDevice>>);

impl SimHost {
    /// Wrap a device.
    pub fn new(device: SimDevice) -> Self {
        Self(Rc::new(RefCell::new(device)))
    }

    /// Read the device.
    pub fn device(&self) -> Ref<'_, SimDevice> {
        self.0.borrow()
    }

    /// Mutate the device.
    pub fn device_mut(&self) -> RefMut<'_, SimDevice> {
        self.0.borrow_mut()
    }

    /// Mutating authority calls so far.
    pub fn calls(&self) -> Vec<AuthorityCall> {
        self.device().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.device_mut().calls.clear();
    }

    /// Build an engine over this host with the given gates.
    pub fn engine_with(&self, gates: MemoryGateStore, config: EngineConfig) -> SimEngine {
        IslandEngine::new(self.clone(), self.clone(), self.clone(), gates, config)
    }

    /// Build an engine over this host with fresh gates and default config.
    pub fn engine(&self) -> SimEngine {
        self.engine_with(MemoryGateStore::new(), EngineConfig::default())
    }

    fn check(&self, operation: &'static str) -> AuthorityResult<()> {
        if self.device().faults.incompatible.contains(operation) {
            return Err(AuthorityError::PlatformIncompatible { operation });
        }
        Ok(())
    }

    fn record(&self, call: AuthorityCall) {
        trace!(?call, "authority call");
        self.device_mut().calls.push(call);
    }
}

impl PolicyAuthority for SimHost {
    fn set_application_hidden(&self, package: &str, hidden: bool) -> AuthorityResult<bool> {
        self.check("set_application_hidden")?;
        self.record(AuthorityCall::SetHidden { package: package.to_string(), hidden });
        let mut device = self.device_mut();
        match device.packages.get_mut(package) {
            Some(p) if p.record.is_installed() && p.hidden != hidden => {
                p.hidden = hidden;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    fn is_application_hidden(&self, package: &str) -> AuthorityResult<bool> {
        self.check("is_application_hidden")?;
        Ok(self.device().is_hidden(package))
    }

    fn enable_system_app(&self, package: &str) -> AuthorityResult<()> {
        self.check("enable_system_app")?;
        self.record(AuthorityCall::EnableSystemApp { package: package.to_string() });
        let mut device = self.device_mut();
        match device.packages.get_mut(package) {
            Some(p) if p.record.is_system() => {
                p.record.flags |= AppFlags::INSTALLED;
                Ok(())
            },
            _ => Err(AuthorityError::InvalidArgument {
                operation: "enable_system_app",
                reason: format!("only system apps can be enabled: {package}"),
            }),
        }
    }

    fn enable_system_app_for_intent(&self, intent: &Intent) -> AuthorityResult<u32> {
        self.check("enable_system_app_for_intent")?;
        self.record(AuthorityCall::EnableSystemAppForIntent { intent: intent.clone() });
        let mut device = self.device_mut();
        let mut enabled = 0;
        for p in device.packages.values_mut() {
            if p.record.is_system() && !p.record.is_installed() && p.handles(intent) {
                p.record.flags |= AppFlags::INSTALLED;
                enabled += 1;
            }
        }
        if device.faults.reject_intent_enable {
            return Err(AuthorityError::InvalidArgument {
                operation: "enable_system_app_for_intent",
                reason: "non-system apps also match".to_string(),
            });
        }
        Ok(enabled)
    }

    fn clear_user_restriction(&self, restriction: UserRestriction) -> AuthorityResult<()> {
        self.check("clear_user_restriction")?;
        self.record(AuthorityCall::ClearRestriction(restriction));
        self.device_mut().restrictions.remove(restriction.key());
        Ok(())
    }

    fn set_secure_setting(&self, key: &str, value: &str) -> AuthorityResult<()> {
        self.check("set_secure_setting")?;
        self.record(AuthorityCall::SetSecureSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
        let parsed = value.parse::<i64>().map_err(|e| AuthorityError::InvalidArgument {
            operation: "set_secure_setting",
            reason: e.to_string(),
        })?;
        self.device_mut().settings.insert(key.to_string(), parsed);
        Ok(())
    }

    fn set_profile_name(&self, name: &str) -> AuthorityResult<()> {
        self.check("set_profile_name")?;
        self.record(AuthorityCall::SetProfileName(name.to_string()));
        self.device_mut().profile_name = Some(name.to_string());
        Ok(())
    }

    fn set_profile_enabled(&self) -> AuthorityResult<()> {
        self.check("set_profile_enabled")?;
        self.record(AuthorityCall::SetProfileEnabled);
        self.device_mut().profile_enabled = true;
        Ok(())
    }

    fn add_cross_profile_intent_filter(
        &self,
        filter: &IntentFilter,
        flags: ForwardingFlags,
    ) -> AuthorityResult<()> {
        self.check("add_cross_profile_intent_filter")?;
        self.record(AuthorityCall::AddForwarding { filter: filter.clone(), flags });
        self.device_mut().forwarding.push((filter.clone(), flags));
        Ok(())
    }

    fn is_device_owner_app(&self, package: &str) -> AuthorityResult<bool> {
        self.check("is_device_owner_app")?;
        Ok(self.device().device_owner.as_deref() == Some(package))
    }

    fn is_profile_owner_app(&self, package: &str) -> AuthorityResult<bool> {
        self.check("is_profile_owner_app")?;
        Ok(self.device().profile_owner.as_deref() == Some(package))
    }

    fn is_admin_active(&self) -> AuthorityResult<bool> {
        self.check("is_admin_active")?;
        Ok(self.device().admin_active)
    }

    fn clear_device_owner_app(&self, package: &str) -> AuthorityResult<()> {
        self.check("clear_device_owner_app")?;
        let mut device = self.device_mut();
        if device.device_owner.as_deref() != Some(package) {
            return Err(AuthorityError::Denied {
                operation: "clear_device_owner_app",
                reason: format!("{package} is not device owner"),
            });
        }
        device.device_owner = None;
        device.calls.push(AuthorityCall::ClearDeviceOwner);
        Ok(())
    }

    fn wipe_data(&self, _flags: WipeFlags) -> AuthorityResult<()> {
        self.check("wipe_data")?;
        self.record(AuthorityCall::Wipe);
        let mut device = self.device_mut();
        device.wiped = true;
        device.profile_owner = None;
        device.admin_active = false;
        device.packages.clear();
        Ok(())
    }

    fn profile_owner_as_user(&self, user: UserId) -> AuthorityResult<Option<ComponentName>> {
        self.check("profile_owner_as_user")?;
        Ok(self.device().profile_owners.get(&user).cloned())
    }
}

impl PackageRegistry for SimHost {
    fn application_info(
        &self,
        package: &str,
        include_uninstalled: bool,
    ) -> Result<AppRecord, RegistryError> {
        let device = self.device();
        match device.packages.get(package) {
            Some(p) if include_uninstalled || p.record.is_installed() => Ok(p.record.clone()),
            _ => Err(RegistryError::NotFound(package.to_string())),
        }
    }

    fn resolve_activity(&self, intent: &Intent, flags: ResolveFlags) -> Option<ResolveInfo> {
        let device = self.device();
        let include_uninstalled = flags.contains(ResolveFlags::MATCH_UNINSTALLED_PACKAGES);
        let include_disabled = flags.contains(ResolveFlags::MATCH_DISABLED_COMPONENTS);
        device
            .packages
            .values()
            .filter(|p| include_uninstalled || p.record.is_installed())
            .filter(|p| include_disabled || p.record.enabled)
            .filter(|p| intent.package.is_none() || p.launchable)
            .find(|p| p.handles(intent))
            .map(|p| ResolveInfo {
                activity: ComponentName::new(&p.record.package, ".MainActivity"),
                app: p.record.clone(),
            })
    }

    fn launch_intent(&self, package: &str) -> Option<Intent> {
        let device = self.device();
        let p = device.packages.get(package)?;
        (p.record.is_installed() && p.record.enabled && p.launchable && !p.hidden)
            .then(|| Intent::launcher_query(package))
    }

    fn app_label(&self, package: &str) -> Result<String, RegistryError> {
        self.device()
            .packages
            .get(package)
            .map(|p| p.label.clone())
            .ok_or_else(|| RegistryError::NotFound(package.to_string()))
    }

    fn set_component_enabled(&self, component: &ComponentName, state: ComponentState) {
        let mut device = self.device_mut();
        match state {
            ComponentState::Disabled => {
                device.disabled_components.insert(component.clone());
            },
            ComponentState::Enabled | ComponentState::Default => {
                device.disabled_components.remove(component);
            },
        }
    }

    fn is_package_enabled_for(&self, package: &str, user: UserId) -> bool {
        user.is_owner() && self.device().packages.get(package).is_some_and(|p| p.enabled_for_owner)
    }
}

impl Environment for SimHost {
    fn current_user(&self) -> UserId {
        self.device().user
    }

    fn user_profiles(&self) -> Vec<UserId> {
        self.device().profiles.clone()
    }

    fn platform_level(&self) -> u32 {
        self.device().level
    }

    fn own_package(&self) -> String {
        OWN_PACKAGE.to_string()
    }

    fn secure_setting(&self, key: &str) -> Option<i64> {
        self.device().settings.get(key).copied()
    }

    fn has_interactive_surface(&self) -> bool {
        self.device().interactive
    }
}
