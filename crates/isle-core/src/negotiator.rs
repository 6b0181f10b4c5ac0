//! Install channel negotiation.
//!
//! Cloning an app that is not yet installed in the island can go through
//! one of three channels:
//!
//! ```text
//!            ┌───────────┐ installed ┌───────────────┐
//!  record ──>│ installed?│──────────>│ AlreadyCloned │
//!            └───────────┘           └───────────────┘
//!                  │ no
//!                  ▼        system   ┌──────────────┐
//!            ┌───────────┐──────────>│ SystemEnable │
//!            │  system?  │           └──────────────┘
//!            └───────────┘
//!                  │ no
//!                  ▼      permitted  ┌─────────────────┐
//!       ┌────────────────────┐──────>│ ManualInstaller │
//!       │ non-market allowed?│       └─────────────────┘
//!       └────────────────────┘
//!                  │ no              ┌───────────────────┐
//!                  └────────────────>│ MarketApp(market) │
//!                                    └───────────────────┘
//! ```
//!
//! Installer and market channels explain themselves once per gate key. The
//! explanation carries a [`ResumeToken`]; accepting it re-runs the whole
//! negotiation from the top with a freshly fetched record, because the user
//! may accept arbitrarily later and the world may have changed.

use tracing::{debug, info, warn};

use crate::{
    action::{Confirmation, Continuation, IslandAction, Notice, Prompt, ResultRequest},
    app::AppRecord,
    authority::{PolicyAuthority, PolicyClient, UserRestriction},
    config::EngineConfig,
    env::{Environment, INSTALL_NON_MARKET_APPS},
    gate::{GateKey, GateStore},
    intent::{EXTRA_RETURN_RESULT, Intent, ResolveFlags},
    registry::PackageRegistry,
};

/// Channel chosen for one clone attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstallChannel {
    /// Install the existing system package for the island user.
    SystemEnable,
    /// Hand the package to the platform's manual installer.
    ManualInstaller,
    /// Navigate to the package's page in an app market.
    MarketApp {
        /// Package of the resolving market.
        market: String,
    },
}

/// Token for re-entering the negotiation after a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResumeToken {
    /// Package being cloned.
    pub package: String,
    /// Channel that asked for confirmation.
    pub channel: InstallChannel,
}

/// Result of one negotiation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Nothing to do.
    AlreadyCloned,
    /// The system package was enabled in place.
    SystemAppEnabled,
    /// Waiting for the user to accept an explanation.
    AwaitingConfirmation(InstallChannel),
    /// Installer or market launched; completion is observed by re-querying.
    Launched(InstallChannel),
    /// No channel can deliver the package.
    NoChannel,
}

/// Outcome plus the actions the runtime must execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    /// What happened.
    pub outcome: CloneOutcome,
    /// Effects to execute.
    pub actions: Vec<IslandAction>,
}

impl Negotiation {
    fn done(outcome: CloneOutcome) -> Self {
        Self { outcome, actions: Vec::new() }
    }

    fn confirm(package: &str, channel: InstallChannel, prompt: Prompt) -> Self {
        let token = ResumeToken { package: package.to_string(), channel: channel.clone() };
        let confirmation = Confirmation::new(prompt, Continuation::ResumeClone(token));
        Self {
            outcome: CloneOutcome::AwaitingConfirmation(channel),
            actions: vec![IslandAction::Confirm(confirmation)],
        }
    }

    fn launch(channel: InstallChannel, intent: Intent, result: ResultRequest) -> Self {
        Self {
            outcome: CloneOutcome::Launched(channel),
            actions: vec![IslandAction::StartActivity { intent, result }],
        }
    }
}

/// Borrowed view of the engine's collaborators for one negotiation.
pub(crate) struct Negotiator<'a, A, R, E, G> {
    pub(crate) policy: &'a PolicyClient<A>,
    pub(crate) registry: &'a R,
    pub(crate) env: &'a E,
    pub(crate) gates: &'a mut G,
    pub(crate) config: &'a EngineConfig,
}

impl<A, R, E, G> Negotiator<'_, A, R, E, G>
where
    A: PolicyAuthority,
    R: PackageRegistry,
    E: Environment,
    G: GateStore,
{
    pub(crate) fn negotiate(&mut self, app: &AppRecord) -> Negotiation {
        let package = app.package.as_str();
        if app.is_installed() {
            warn!(package, "already cloned");
            return Negotiation::done(CloneOutcome::AlreadyCloned);
        }

        if app.is_system() {
            self.policy.enable_system_app(package);
            info!(package, "cloned by enabling system app");
            return Negotiation::done(CloneOutcome::SystemAppEnabled);
        }

        let install = Intent::install_package(package, &self.env.own_package());
        self.policy.enable_system_app_for_intent(&install);
        self.policy.clear_restriction(UserRestriction::InstallApps);
        self.policy.clear_restriction(UserRestriction::InstallUnknownSources);

        if self.non_market_install_allowed() {
            self.via_installer(package, install)
        } else {
            self.via_market(package)
        }
    }

    fn non_market_install_allowed(&self) -> bool {
        if self.non_market_setting_on() {
            return true;
        }
        if !self.policy.set_secure_setting(INSTALL_NON_MARKET_APPS, "1") {
            return false;
        }
        self.non_market_setting_on()
    }

    fn non_market_setting_on(&self) -> bool {
        self.env.secure_setting(INSTALL_NON_MARKET_APPS).is_some_and(|value| value > 0)
    }

    fn via_installer(&mut self, package: &str, install: Intent) -> Negotiation {
        let channel = InstallChannel::ManualInstaller;
        if self.gates.mark(GateKey::CloneViaInstall.as_str()) {
            return Negotiation::confirm(package, channel, Prompt::CloneViaInstall);
        }

        debug!(package, "launching package installer");
        if self.env.has_interactive_surface() {
            let intent = install.with_extra(EXTRA_RETURN_RESULT, "true");
            let result = ResultRequest::ForResult { request_code: self.config.install_request_code };
            Negotiation::launch(channel, intent, result)
        } else {
            Negotiation::launch(channel, install, ResultRequest::None)
        }
    }

    fn via_market(&mut self, package: &str) -> Negotiation {
        let market_intent = Intent::market_details(package);
        self.policy.enable_system_app_for_intent(&market_intent);

        let Some(resolved) = self.registry.resolve_activity(&market_intent, ResolveFlags::empty())
        else {
            warn!(package, "no app market resolves the details page");
            return Negotiation {
                outcome: CloneOutcome::NoChannel,
                actions: vec![IslandAction::Notify(Notice::NoAppMarket {
                    package: package.to_string(),
                })],
            };
        };

        let privileged = resolved.app.is_system();
        let market = resolved.app.package;
        let channel = InstallChannel::MarketApp { market: market.clone() };

        // Only a privileged market can install into the island; the system
        // flag stands in for privilege.
        if !privileged {
            return Negotiation::confirm(package, channel, Prompt::CloneViaGooglePlay);
        }

        if market == self.config.market_package {
            if self.gates.mark(GateKey::CloneViaGooglePlay.as_str()) {
                return Negotiation::confirm(package, channel, Prompt::CloneViaGooglePlay);
            }
            self.policy.enable_system_app(&self.config.market_dependency_package);
        } else if self.gates.mark(GateKey::CloneViaBuiltinMarket.as_str()) {
            return Negotiation::confirm(package, channel, Prompt::CloneViaBuiltinMarket);
        }

        debug!(package, %market, "launching app market");
        Negotiation::launch(channel, market_intent, ResultRequest::None)
    }
}
