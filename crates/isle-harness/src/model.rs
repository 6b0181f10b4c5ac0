//! Reference model for model-based testing.
//!
//! [`ModelWorld`] tracks app states over a fixed catalog with plain booleans.
//! [`SimWorld`] runs the same operations against a real engine on a
//! simulated device. Both must agree on every clone outcome and on the state
//! of every catalog app after each step. A [`ChannelSetup`] picks which
//! install channel the device offers for user apps.

use arbitrary::Arbitrary;
use isle_core::{
    AppState, CloneOutcome, InstallChannel,
    authority::LEVEL_MANAGED_PROFILES,
    config::{PACKAGE_GOOGLE_PLAY_SERVICES, PACKAGE_GOOGLE_PLAY_STORE},
};

use crate::{
    device::{SimDevice, SimPackage},
    host::{SimEngine, SimHost},
};

/// One catalog app.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Package name.
    pub package: &'static str,
    /// Ships with the platform.
    pub system: bool,
    /// Installed in the island at start.
    pub installed: bool,
    /// Enabled by the registry.
    pub enabled: bool,
}

/// Apps every world starts with.
pub const CATALOG: [CatalogEntry; 5] = [
    CatalogEntry { package: "com.example.notes", system: false, installed: false, enabled: true },
    CatalogEntry { package: "com.example.chat", system: false, installed: true, enabled: true },
    CatalogEntry { package: "com.example.legacy", system: false, installed: true, enabled: false },
    CatalogEntry { package: "com.android.camera", system: true, installed: false, enabled: true },
    CatalogEntry { package: "com.android.calculator", system: true, installed: true, enabled: true },
];

/// Package of the built-in market offered by [`ChannelSetup::BuiltinMarket`].
pub const BUILTIN_MARKET: &str = "com.example.appstore";

/// How a world's device delivers user apps to the island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ChannelSetup {
    /// Non-market installs allowed; the platform installer is used.
    Installer,
    /// Non-market installs blocked; the first-party market is privileged.
    FirstPartyMarket,
    /// Non-market installs blocked; another system market is privileged.
    BuiltinMarket,
}

impl ChannelSetup {
    /// Every setup.
    pub const ALL: [Self; 3] = [Self::Installer, Self::FirstPartyMarket, Self::BuiltinMarket];

    /// Channel a user app clone goes through.
    pub fn install_channel(self) -> InstallChannel {
        match self {
            Self::Installer => InstallChannel::ManualInstaller,
            Self::FirstPartyMarket => {
                InstallChannel::MarketApp { market: PACKAGE_GOOGLE_PLAY_STORE.to_string() }
            },
            Self::BuiltinMarket => InstallChannel::MarketApp { market: BUILTIN_MARKET.to_string() },
        }
    }

    /// Island device offering this channel, without catalog apps.
    ///
    /// Market setups run on the first level with managed profiles, where the
    /// authority cannot turn on non-market installs.
    pub fn device(self) -> SimDevice {
        match self {
            Self::Installer => SimDevice::island().with_non_market_allowed(),
            Self::FirstPartyMarket => SimDevice::island()
                .with_level(LEVEL_MANAGED_PROFILES)
                .with_package(SimPackage::system_app(PACKAGE_GOOGLE_PLAY_STORE).installed().market())
                .with_package(SimPackage::system_app(PACKAGE_GOOGLE_PLAY_SERVICES).headless()),
            Self::BuiltinMarket => SimDevice::island()
                .with_level(LEVEL_MANAGED_PROFILES)
                .with_package(SimPackage::system_app(BUILTIN_MARKET).installed().market()),
        }
    }
}

/// Index into [`CATALOG`], wrapped on use.
pub type AppIndex = u8;

/// Package of a catalog index.
pub fn catalog_package(app: AppIndex) -> &'static str {
    CATALOG[usize::from(app) % CATALOG.len()].package
}

/// Operation applied to both worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Hide an app.
    Freeze {
        /// Target app.
        app: AppIndex,
    },
    /// Unhide an app.
    Defreeze {
        /// Target app.
        app: AppIndex,
    },
    /// Clone an app into the island.
    Clone {
        /// Target app.
        app: AppIndex,
    },
    /// The out-of-process installer finished.
    CompleteInstall {
        /// Target app.
        app: AppIndex,
    },
    /// The user uninstalled an app outside the engine.
    Uninstall {
        /// Target app.
        app: AppIndex,
    },
    /// The engine's own app was reinstalled.
    Reinstall,
}

#[derive(Debug, Clone)]
struct ModelApp {
    system: bool,
    installed: bool,
    enabled: bool,
    hidden: bool,
}

/// Reference model of the engine.
///
/// Each setup offers exactly one channel for user apps, so a single flag
/// tracks whether its one-shot explanation has been shown.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    apps: Vec<ModelApp>,
    channel: ChannelSetup,
    explained: bool,
}

impl ModelWorld {
    /// Model of a fresh device that allows non-market installs.
    pub fn new() -> Self {
        Self::with_channel(ChannelSetup::Installer)
    }

    /// Model of a fresh device offering the given channel.
    pub fn with_channel(channel: ChannelSetup) -> Self {
        let apps = CATALOG
            .iter()
            .map(|e| ModelApp {
                system: e.system,
                installed: e.installed,
                enabled: e.enabled,
                hidden: false,
            })
            .collect();
        Self { apps, channel, explained: false }
    }

    fn app(&mut self, app: AppIndex) -> &mut ModelApp {
        let len = self.apps.len();
        &mut self.apps[usize::from(app) % len]
    }

    /// Apply an operation, returning the clone outcome for clones.
    pub fn apply(&mut self, op: Operation) -> Option<CloneOutcome> {
        match op {
            Operation::Freeze { app } => {
                let app = self.app(app);
                if app.installed {
                    app.hidden = true;
                }
                None
            },
            Operation::Defreeze { app } => {
                let app = self.app(app);
                if app.installed {
                    app.hidden = false;
                }
                None
            },
            Operation::Clone { app } => Some(self.clone_app(app)),
            Operation::CompleteInstall { app } => {
                let app = self.app(app);
                if !app.installed {
                    app.installed = true;
                    app.hidden = false;
                }
                None
            },
            Operation::Uninstall { app } => {
                let app = self.app(app);
                if app.installed {
                    app.installed = false;
                    app.hidden = false;
                }
                None
            },
            Operation::Reinstall => {
                self.explained = false;
                None
            },
        }
    }

    fn clone_app(&mut self, app: AppIndex) -> CloneOutcome {
        let explained = self.explained;
        let channel = self.channel.install_channel();
        let entry = self.app(app);
        if entry.installed {
            return CloneOutcome::AlreadyCloned;
        }
        if entry.system {
            entry.installed = true;
            return CloneOutcome::SystemAppEnabled;
        }
        if explained {
            CloneOutcome::Launched(channel)
        } else {
            self.explained = true;
            CloneOutcome::AwaitingConfirmation(channel)
        }
    }

    /// Expected state of a catalog app.
    pub fn state(&self, app: AppIndex) -> AppState {
        let app = &self.apps[usize::from(app) % self.apps.len()];
        match (app.installed, app.enabled, app.hidden) {
            (false, _, _) => AppState::NotCloned,
            (true, false, _) => AppState::Disabled,
            (true, true, true) => AppState::Frozen,
            (true, true, false) => AppState::Alive,
        }
    }
}

impl Default for ModelWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Real engine over a simulated device, mirroring [`ModelWorld`].
pub struct SimWorld {
    host: SimHost,
    engine: SimEngine,
}

impl SimWorld {
    /// Fresh island device that allows non-market installs, seeded with the
    /// catalog.
    pub fn new() -> Self {
        Self::with_channel(ChannelSetup::Installer)
    }

    /// Fresh island device offering the given channel, seeded with the
    /// catalog.
    pub fn with_channel(channel: ChannelSetup) -> Self {
        let device = CATALOG.iter().fold(channel.device(), |device, e| {
            let package = if e.system {
                SimPackage::system_app(e.package)
            } else {
                SimPackage::user_app(e.package)
            };
            let package = if e.installed { package.installed() } else { package };
            let package = if e.enabled { package } else { package.disabled() };
            device.with_package(package)
        });
        let host = SimHost::new(device);
        let engine = host.engine();
        Self { host, engine }
    }

    /// Simulated host.
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// Engine under test.
    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    /// Apply an operation, returning the clone outcome for clones.
    ///
    /// A clone of a catalog package never fails, so an engine error is
    /// reported as [`CloneOutcome::NoChannel`].
    pub fn apply(&mut self, op: Operation) -> Option<CloneOutcome> {
        match op {
            Operation::Freeze { app } => {
                self.engine.freeze_app(catalog_package(app));
                None
            },
            Operation::Defreeze { app } => {
                self.engine.defreeze_app(catalog_package(app));
                None
            },
            Operation::Clone { app } => Some(
                self.engine
                    .clone_app(catalog_package(app))
                    .map_or(CloneOutcome::NoChannel, |negotiation| negotiation.outcome),
            ),
            Operation::CompleteInstall { app } => {
                self.host.device_mut().complete_install(catalog_package(app));
                None
            },
            Operation::Uninstall { app } => {
                self.host.device_mut().uninstall(catalog_package(app));
                None
            },
            Operation::Reinstall => {
                self.engine.on_reinstalled();
                None
            },
        }
    }

    /// Observed state of a catalog app.
    pub fn state(&self, app: AppIndex) -> Option<AppState> {
        self.engine.app_state(catalog_package(app)).ok()
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
