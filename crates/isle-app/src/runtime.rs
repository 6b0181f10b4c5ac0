//! Generic runtime executing engine actions.
//!
//! The runtime owns the engine and a [`Driver`]. Every engine call returns
//! actions; the runtime hands them to the driver in order. A confirmation is
//! remembered as the pending dialog until the user answers it. Accepting
//! runs its continuation as a fresh engine call, so an answer that arrives
//! much later, twice, or never is handled the same way.

use isle_core::{
    Confirmation, Continuation, EngineError, Environment, GateStore, IslandAction, IslandEngine,
    Notice, PackageRegistry, PolicyAuthority,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{Controller, Driver};

/// Errors from the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError<E: std::error::Error + 'static> {
    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The driver failed to execute an action.
    #[error("driver failed: {0}")]
    Driver(#[source] E),
}

/// Runtime over an engine and a driver.
pub struct Runtime<A, R, E, G, D> {
    engine: IslandEngine<A, R, E, G>,
    driver: D,
    pending: Option<Confirmation>,
}

impl<A, R, E, G, D> Runtime<A, R, E, G, D>
where
    A: PolicyAuthority,
    R: PackageRegistry,
    E: Environment,
    G: GateStore,
    D: Driver,
{
    /// Create a runtime.
    pub fn new(engine: IslandEngine<A, R, E, G>, driver: D) -> Self {
        Self { engine, driver, pending: None }
    }

    /// The engine.
    pub fn engine(&self) -> &IslandEngine<A, R, E, G> {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut IslandEngine<A, R, E, G> {
        &mut self.engine
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Consume the runtime, returning the driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Confirmation currently waiting for the user.
    pub fn pending(&self) -> Option<&Confirmation> {
        self.pending.as_ref()
    }

    /// Execute actions in order.
    ///
    /// # Errors
    ///
    /// Stops at the first driver failure.
    pub fn execute(&mut self, actions: Vec<IslandAction>) -> Result<(), RuntimeError<D::Error>> {
        for action in actions {
            debug!(?action, "executing");
            match action {
                IslandAction::StartActivity { intent, result } => {
                    self.driver.start_activity(&intent, result).map_err(RuntimeError::Driver)?;
                },
                IslandAction::Confirm(confirmation) => {
                    self.driver.show_confirmation(&confirmation).map_err(RuntimeError::Driver)?;
                    self.pending = Some(confirmation);
                },
                IslandAction::Notify(notice) => self.driver.notify(&notice),
                IslandAction::ShowAppDetails { package, user } => {
                    self.driver.show_app_details(&package, user).map_err(RuntimeError::Driver)?;
                },
                IslandAction::CreateShortcut { package } => {
                    let notice = if self.driver.create_shortcut(&package) {
                        Notice::ShortcutCreated { package }
                    } else {
                        Notice::ShortcutFailed { package }
                    };
                    self.driver.notify(&notice);
                },
                IslandAction::FinishSurface => self.driver.finish_surface(),
            }
        }
        Ok(())
    }

    /// The user accepted the pending confirmation.
    ///
    /// Does nothing if no confirmation is pending or it was a plain notice.
    ///
    /// # Errors
    ///
    /// Returns engine or driver failures of the continuation.
    pub fn accept(&mut self) -> Result<(), RuntimeError<D::Error>> {
        let Some(confirmation) = self.pending.take() else {
            debug!("no pending confirmation");
            return Ok(());
        };
        match confirmation.on_accept {
            Some(continuation) => self.resume(continuation),
            None => Ok(()),
        }
    }

    /// The user declined or dismissed the pending confirmation.
    pub fn dismiss(&mut self) {
        if let Some(confirmation) = self.pending.take() {
            info!(prompt = ?confirmation.prompt, "confirmation dismissed");
        }
    }

    /// Run a continuation as a fresh engine call.
    ///
    /// # Errors
    ///
    /// Returns engine or driver failures.
    pub fn resume(&mut self, continuation: Continuation) -> Result<(), RuntimeError<D::Error>> {
        let actions = self.engine.resume(continuation)?;
        self.execute(actions)
    }

    /// Name and enable the island profile.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` once the authority has been torn down.
    pub fn enable_profile(&mut self) -> Result<(), RuntimeError<D::Error>> {
        Ok(self.engine.enable_profile()?)
    }

    /// Offer to destroy the island, listing the apps that only exist in it.
    ///
    /// # Errors
    ///
    /// Returns driver failures.
    pub fn destroy(&mut self, packages: &[String]) -> Result<(), RuntimeError<D::Error>> {
        let exclusive = self.exclusive_clone_labels(packages);
        let actions = self.engine.destroy(&exclusive);
        self.execute(actions)
    }

    /// Labels of the given packages that are installed in the island and
    /// not enabled in the owner user. Unknown packages are skipped.
    pub fn exclusive_clone_labels(&self, packages: &[String]) -> Vec<String> {
        packages
            .iter()
            .filter(|package| self.engine.app_info(package).is_some_and(|r| r.is_installed()))
            .filter(|package| self.engine.is_clone_exclusive(package))
            .filter_map(|package| self.engine.read_app_name(package).ok())
            .collect()
    }
}

impl<A, R, E, G, D> Controller for Runtime<A, R, E, G, D>
where
    A: PolicyAuthority,
    R: PackageRegistry,
    E: Environment,
    G: GateStore,
    D: Driver,
{
    type Error = RuntimeError<D::Error>;

    fn freeze_app(&mut self, package: &str) -> Result<(), Self::Error> {
        self.engine.freeze_app(package);
        Ok(())
    }

    fn defreeze_app(&mut self, package: &str) -> Result<(), Self::Error> {
        self.engine.defreeze_app(package);
        Ok(())
    }

    fn launch_app(&mut self, package: &str) -> Result<(), Self::Error> {
        let actions = self.engine.launch_app(package);
        self.execute(actions)
    }

    fn clone_app(&mut self, package: &str) -> Result<(), Self::Error> {
        let negotiation = self.engine.clone_app(package)?;
        info!(package, outcome = ?negotiation.outcome, "clone negotiated");
        self.execute(negotiation.actions)
    }

    fn enable_app(&mut self, package: &str) -> Result<(), Self::Error> {
        let actions = self.engine.enable_app(package);
        self.execute(actions)
    }

    fn remove_clone(&mut self, package: &str) -> Result<(), Self::Error> {
        let actions = self.engine.remove_clone(package)?;
        self.execute(actions)
    }

    fn install_for_owner(&mut self, package: &str) -> Result<(), Self::Error> {
        let actions = self.engine.install_for_owner(package);
        self.execute(actions)
    }

    fn read_app_name(&self, package: &str) -> Result<String, Self::Error> {
        Ok(self.engine.read_app_name(package)?)
    }

    fn is_clone_exclusive(&self, package: &str) -> bool {
        self.engine.is_clone_exclusive(package)
    }

    fn create_shortcut(&mut self, package: &str) -> Result<(), Self::Error> {
        let actions = self.engine.create_shortcut(package);
        self.execute(actions)
    }
}
