//! Lifecycle operations.
//!
//! [`IslandEngine`] owns the collaborators and exposes the operations the
//! controller needs. Every state-dependent decision re-reads the registry;
//! nothing about an app is cached between calls.
//!
//! Operations return the [`IslandAction`]s the runtime must execute. They
//! never fail on authority errors; only an unknown package surfaces as
//! [`EngineError::NotFound`].

use tracing::{debug, error, info};

use crate::{
    action::{Continuation, IslandAction, Notice, ResultRequest},
    app::{AppRecord, AppState, classify},
    authority::{PlatformCapabilities, PolicyAuthority, PolicyClient},
    config::EngineConfig,
    env::{Environment, UserId},
    error::EngineError,
    gate::GateStore,
    intent::{
        ACTION_INSTALL_PACKAGE, CATEGORY_DEFAULT, ComponentName, ForwardingFlags, Intent,
        IntentFilter, LaunchFlags, ResolveFlags, SCHEME_PACKAGE,
    },
    negotiator::{Negotiation, Negotiator},
    profile::ProfileLifecycle,
    registry::{ComponentState, PackageRegistry},
};

/// App lifecycle engine.
///
/// Collaborators are constructed by the caller and owned here for the
/// lifetime of the process.
#[derive(Debug)]
pub struct IslandEngine<A, R, E, G> {
    pub(crate) policy: PolicyClient<A>,
    pub(crate) registry: R,
    pub(crate) env: E,
    pub(crate) gates: G,
    pub(crate) config: EngineConfig,
    pub(crate) lifecycle: ProfileLifecycle,
}

impl<A, R, E, G> IslandEngine<A, R, E, G>
where
    A: PolicyAuthority,
    R: PackageRegistry,
    E: Environment,
    G: GateStore,
{
    /// Create an engine, detecting platform capabilities once.
    pub fn new(authority: A, registry: R, env: E, gates: G, config: EngineConfig) -> Self {
        let capabilities = PlatformCapabilities::detect(env.platform_level());
        info!(?capabilities, user = %env.current_user(), "island engine started");
        Self {
            policy: PolicyClient::new(authority, capabilities),
            registry,
            env,
            gates,
            config,
            lifecycle: ProfileLifecycle::new(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Absorbing policy client.
    pub fn policy(&self) -> &PolicyClient<A> {
        &self.policy
    }

    /// Package registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Host environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Confirmation gate store.
    pub fn gates(&self) -> &G {
        &self.gates
    }

    /// Re-arm every confirmation gate after the engine's app is reinstalled.
    pub fn on_reinstalled(&mut self) {
        info!("app reinstalled, re-arming confirmation gates");
        self.gates.reset();
    }

    /// Fresh record of a package, including packages not installed here.
    pub fn app_info(&self, package: &str) -> Option<AppRecord> {
        self.registry.application_info(package, true).ok()
    }

    /// Current state of a package.
    pub fn app_state(&self, package: &str) -> Result<AppState, EngineError> {
        let record = self.registry.application_info(package, true)?;
        Ok(self.state_of(&record))
    }

    /// Classify a freshly fetched record.
    pub fn state_of(&self, record: &AppRecord) -> AppState {
        let hidden =
            record.is_installed() && record.enabled && self.policy.is_hidden(&record.package);
        classify(record, hidden)
    }

    /// Hide an app. Idempotent.
    pub fn freeze_app(&self, package: &str) {
        self.policy.set_hidden(package, true);
    }

    /// Unhide an app. Idempotent.
    pub fn defreeze_app(&self, package: &str) {
        self.policy.set_hidden(package, false);
    }

    /// Launch an app through its launcher entry.
    pub fn launch_app(&self, package: &str) -> Vec<IslandAction> {
        let Some(intent) = self.registry.launch_intent(package) else {
            info!(package, "no launch entrance");
            return vec![IslandAction::Notify(Notice::NoLaunchEntrance {
                package: package.to_string(),
            })];
        };
        vec![IslandAction::StartActivity {
            intent: intent.with_flags(LaunchFlags::RESET_TASK_IF_NEEDED),
            result: ResultRequest::None,
        }]
    }

    /// Clone an app into the island.
    pub fn clone_app(&mut self, package: &str) -> Result<Negotiation, EngineError> {
        let record = self.registry.application_info(package, true).map_err(|e| {
            error!(package, "cannot clone unknown package");
            EngineError::from(e)
        })?;
        Ok(self.negotiate(&record))
    }

    pub(crate) fn negotiate(&mut self, record: &AppRecord) -> Negotiation {
        Negotiator {
            policy: &self.policy,
            registry: &self.registry,
            env: &self.env,
            gates: &mut self.gates,
            config: &self.config,
        }
        .negotiate(record)
    }

    /// Run the continuation of an accepted confirmation.
    pub fn resume(&mut self, continuation: Continuation) -> Result<Vec<IslandAction>, EngineError> {
        match continuation {
            Continuation::ResumeClone(token) => {
                debug!(package = %token.package, channel = ?token.channel, "resuming clone");
                Ok(self.clone_app(&token.package)?.actions)
            },
            Continuation::DeactivateDeviceOwner => self.deactivate_device_owner(),
            Continuation::ConfirmDestroyExclusives { clones } => {
                Ok(vec![self.confirm_destroy_exclusives(&clones)])
            },
            Continuation::RemoveProfileOwner => self.remove_profile_owner(),
        }
    }

    /// Open the details surface of an app so the user can enable it.
    pub fn enable_app(&mut self, package: &str) -> Vec<IslandAction> {
        self.show_app_details(package)
    }

    /// Remove a clone from the island.
    ///
    /// System apps cannot be uninstalled; they are unhidden and their details
    /// surface is opened instead.
    pub fn remove_clone(&mut self, package: &str) -> Result<Vec<IslandAction>, EngineError> {
        let record = self.registry.application_info(package, true).map_err(|e| {
            error!(package, "try to remove non-existent clone");
            EngineError::from(e)
        })?;

        if record.is_system() {
            // The details surface does not work for hidden apps.
            self.defreeze_app(package);
            return Ok(self.show_app_details(package));
        }

        Ok(vec![IslandAction::StartActivity {
            intent: Intent::uninstall_package(package),
            result: ResultRequest::None,
        }])
    }

    /// Install an app for the owner user by forwarding the install out of
    /// the island. No-op in the owner user.
    pub fn install_for_owner(&self, package: &str) -> Vec<IslandAction> {
        if self.env.current_user().is_owner() {
            debug!(package, "already in owner user");
            return Vec::new();
        }

        // Keeps the install from being forwarded back into the island.
        self.registry.set_component_enabled(&self.forward_installer(), ComponentState::Disabled);
        self.policy
            .add_forwarding(&forward_install_filter(), ForwardingFlags::PARENT_CAN_ACCESS_MANAGED);

        info!(package, "forwarding install to owner");
        vec![IslandAction::StartActivity {
            intent: Intent::install_package(package, &self.env.own_package()),
            result: ResultRequest::None,
        }]
    }

    /// User-visible name of an app.
    pub fn read_app_name(&self, package: &str) -> Result<String, EngineError> {
        Ok(self.registry.app_label(package)?)
    }

    /// Whether the app only exists in the island.
    pub fn is_clone_exclusive(&self, package: &str) -> bool {
        !self.registry.is_package_enabled_for(package, UserId::OWNER)
    }

    /// Whether the app has a launcher entry, even if disabled or uninstalled.
    pub fn is_launchable(&self, package: &str) -> bool {
        let flags = ResolveFlags::MATCH_DISABLED_COMPONENTS | ResolveFlags::MATCH_UNINSTALLED_PACKAGES;
        self.registry.resolve_activity(&Intent::launcher_query(package), flags).is_some()
    }

    /// Place a launch shortcut for an app.
    pub fn create_shortcut(&self, package: &str) -> Vec<IslandAction> {
        vec![IslandAction::CreateShortcut { package: package.to_string() }]
    }

    fn show_app_details(&mut self, package: &str) -> Vec<IslandAction> {
        let settings = self.config.settings_package.clone();
        let mut actions = self.ensure_system_app_enabled(&settings);
        actions.push(IslandAction::ShowAppDetails {
            package: package.to_string(),
            user: self.env.current_user(),
        });
        actions
    }

    /// Make a system app usable: unhide it if installed, clone it otherwise.
    pub fn ensure_system_app_enabled(&mut self, package: &str) -> Vec<IslandAction> {
        match self.registry.application_info(package, true) {
            Ok(record) if record.is_installed() => {
                self.defreeze_app(package);
                Vec::new()
            },
            Ok(record) => self.negotiate(&record).actions,
            Err(_) => {
                debug!(package, "system app not present");
                Vec::new()
            },
        }
    }

    fn forward_installer(&self) -> ComponentName {
        let own = self.env.own_package();
        let class = &self.config.forward_installer_class;
        let class = if class.starts_with('.') { format!("{own}{class}") } else { class.clone() };
        ComponentName::new(own, class)
    }
}

/// Filter of the installs forwarded between the island and the owner.
pub fn forward_install_filter() -> IntentFilter {
    IntentFilter::for_action(ACTION_INSTALL_PACKAGE)
        .with_category(CATEGORY_DEFAULT)
        .with_scheme(SCHEME_PACKAGE)
}
