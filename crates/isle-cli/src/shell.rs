//! Interactive shell over a simulated island.

use std::{fmt::Display, io};

use isle_app::{Controller, Runtime, RuntimeError};
use isle_core::{EngineConfig, MemoryGateStore};
use isle_harness::{SimDevice, SimHost, SimPackage};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    commands::{Command, HELP},
    console::ConsoleDriver,
};

/// Fatal shell errors. Engine errors are printed and the shell goes on.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Output could not be written.
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
}

/// Whether the shell keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Startup options.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Run in the owner user as device owner instead of inside the island.
    pub owner: bool,
    /// Platform API level.
    pub sdk: u32,
    /// Display name of the island profile.
    pub profile_name: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self { owner: false, sdk: 28, profile_name: EngineConfig::default().profile_name }
    }
}

/// Device the shell starts with: a few user and system apps, a system
/// market, and one app only present in the island.
pub fn demo_device(options: &ShellOptions) -> SimDevice {
    let device = if options.owner {
        SimDevice::owner().with_device_owner()
    } else {
        SimDevice::island()
    };
    device
        .with_level(options.sdk)
        .with_package(SimPackage::user_app("com.example.notes").label("Notes"))
        .with_package(SimPackage::user_app("com.example.chat").installed().label("Chat"))
        .with_package(
            SimPackage::user_app("com.example.diary").installed().exclusive().label("Diary"),
        )
        .with_package(SimPackage::system_app("com.android.camera").label("Camera"))
        .with_package(SimPackage::system_app("com.android.calculator").installed().label("Calculator"))
        .with_package(SimPackage::system_app("com.android.settings").installed().label("Settings"))
        .with_package(
            SimPackage::system_app("com.android.vending").installed().market().label("Play Store"),
        )
        .with_package(SimPackage::system_app("com.google.android.gms").installed().headless())
}

type ShellRuntime<W> = Runtime<SimHost, SimHost, SimHost, MemoryGateStore, ConsoleDriver<W>>;

/// Shell state.
pub struct Shell<W> {
    host: SimHost,
    runtime: ShellRuntime<W>,
}

impl<W: io::Write> Shell<W> {
    /// Create a shell over the demo device.
    pub fn new(options: &ShellOptions, out: W) -> Self {
        Self::with_device(options, demo_device(options), out)
    }

    /// Create a shell over a given device.
    pub fn with_device(options: &ShellOptions, device: SimDevice, out: W) -> Self {
        let host = SimHost::new(device);
        let config =
            EngineConfig { profile_name: options.profile_name.clone(), ..EngineConfig::default() };
        let engine = host.engine_with(MemoryGateStore::new(), config);
        let runtime = Runtime::new(engine, ConsoleDriver::new(out));
        Self { host, runtime }
    }

    /// Simulated device handle.
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// Runtime under the shell.
    pub fn runtime(&self) -> &ShellRuntime<W> {
        &self.runtime
    }

    /// Consume the shell, returning the writer.
    pub fn into_output(self) -> W {
        self.runtime.into_driver().into_inner()
    }

    fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.runtime.driver_mut().out(), "{line}")
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Only output failures are fatal.
    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!(?command, "shell command");
        let result = match command {
            Command::List => {
                let packages: Vec<String> = self.host.device().packages.keys().cloned().collect();
                for package in packages {
                    match self.runtime.engine().app_state(&package) {
                        Ok(state) => self.say(format_args!("{state:<10} {package}"))?,
                        Err(e) => self.say(format_args!("error: {e}"))?,
                    }
                }
                Ok(())
            },
            Command::State { package } => match self.runtime.engine().app_state(&package) {
                Ok(state) => {
                    self.say(format_args!("{package}: {state}"))?;
                    Ok(())
                },
                Err(e) => Err(RuntimeError::Engine(e)),
            },
            Command::Clone { package } => self.runtime.clone_app(&package),
            Command::Freeze { package } => self.runtime.freeze_app(&package),
            Command::Defreeze { package } => self.runtime.defreeze_app(&package),
            Command::Launch { package } => self.runtime.launch_app(&package),
            Command::Remove { package } => self.runtime.remove_clone(&package),
            Command::Enable { package } => self.runtime.enable_app(&package),
            Command::OwnerInstall { package } => self.runtime.install_for_owner(&package),
            Command::Shortcut { package } => self.runtime.create_shortcut(&package),
            Command::Exclusive { package } => {
                let exclusive = self.runtime.is_clone_exclusive(&package);
                self.say(format_args!("{package}: {}", yes_no(exclusive)))?;
                Ok(())
            },
            Command::Launchable { package } => {
                let launchable = self.runtime.engine().is_launchable(&package);
                self.say(format_args!("{package}: {}", yes_no(launchable)))?;
                Ok(())
            },
            Command::Name { package } => match self.runtime.read_app_name(&package) {
                Ok(name) => {
                    self.say(format_args!("{package}: {name}"))?;
                    Ok(())
                },
                Err(e) => Err(e),
            },
            Command::Activate => match self.runtime.enable_profile() {
                Ok(()) => {
                    let name = self.runtime.engine().config().profile_name.clone();
                    self.say(format_args!("profile enabled as {name}"))?;
                    Ok(())
                },
                Err(e) => Err(e),
            },
            Command::Destroy => {
                let packages: Vec<String> = self.host.device().packages.keys().cloned().collect();
                self.runtime.destroy(&packages)
            },
            Command::Complete { package } => {
                let done = self.host.device_mut().complete_install(&package);
                self.say(format_args!("{package}: {}", if done { "installed" } else { "nothing to install" }))?;
                Ok(())
            },
            Command::Uninstall { package } => {
                let done = self.host.device_mut().uninstall(&package);
                self.say(format_args!("{package}: {}", if done { "uninstalled" } else { "not installed" }))?;
                Ok(())
            },
            Command::Reinstall => {
                self.runtime.engine_mut().on_reinstalled();
                Ok(())
            },
            Command::Yes => {
                if self.runtime.pending().is_none() {
                    self.say("nothing to confirm")?;
                }
                self.runtime.accept()
            },
            Command::No => {
                self.runtime.dismiss();
                Ok(())
            },
            Command::Help => {
                self.say(HELP)?;
                Ok(())
            },
            Command::Quit => return Ok(Flow::Quit),
            Command::Empty => Ok(()),
            Command::Unknown { input } => {
                self.say(format_args!("unknown command: {input}, try /help"))?;
                Ok(())
            },
            Command::InvalidArgs { error, .. } => {
                self.say(error)?;
                Ok(())
            },
        };

        match result {
            Ok(()) => {},
            Err(RuntimeError::Engine(e)) => self.say(format_args!("error: {e}"))?,
            Err(RuntimeError::Driver(e)) => return Err(ShellError::Io(e)),
        }

        if self.runtime.driver().finished() {
            info!("surface finished");
            self.say("island surface closed")?;
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
