//! Authority lifecycle.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ enable_profile ┌────────┐ deactivate_device_owner ┌─────────────┐
//! │ Uninitialized │───────────────>│ Active │────────────────────────>│ Deactivated │
//! └───────────────┘                └────────┘                         └─────────────┘
//!                                      │ ↺ enable_profile
//!                                      │ remove_profile_owner         ┌───────────┐
//!                                      └─────────────────────────────>│ Destroyed │
//!                                                                     └───────────┘
//! ```
//!
//! The engine may start in a process where ownership was granted long ago,
//! so deactivation and removal are also accepted from `Uninitialized`. Both
//! terminal states reject every further transition.
//!
//! Destructive transitions are only reachable through a confirmation:
//! [`IslandEngine::destroy`] returns the prompt and the continuation, and the
//! wipe or deactivation runs when the runtime resumes it.

use tracing::{debug, info, warn};

use crate::{
    action::{Confirmation, Continuation, IslandAction, Prompt},
    authority::{PolicyAuthority, WipeFlags},
    engine::IslandEngine,
    env::{Environment, UserId},
    error::EngineError,
    gate::GateStore,
    intent::ComponentName,
    registry::PackageRegistry,
};

/// Lifecycle state of the island's administrative authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileState {
    /// Not activated by this process.
    Uninitialized,
    /// Profile named and enabled.
    Active,
    /// Device ownership given up.
    Deactivated,
    /// Profile wiped.
    Destroyed,
}

impl ProfileState {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deactivated | Self::Destroyed)
    }
}

/// Authority lifecycle state machine.
#[derive(Debug, Clone)]
pub struct ProfileLifecycle {
    state: ProfileState,
}

impl ProfileLifecycle {
    /// Create a lifecycle in `Uninitialized`.
    pub fn new() -> Self {
        Self { state: ProfileState::Uninitialized }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.state
    }

    /// Transition to `Active`. Re-entrant.
    ///
    /// # Errors
    /// Returns `InvalidState` from a terminal state.
    pub fn activate(&mut self) -> Result<(), EngineError> {
        self.ensure_live("enable_profile")?;
        self.state = ProfileState::Active;
        Ok(())
    }

    /// Check that a transition out of the current state is still possible.
    ///
    /// # Errors
    /// Returns `InvalidState` from a terminal state.
    pub fn ensure_live(&self, operation: &str) -> Result<(), EngineError> {
        if self.state.is_terminal() {
            return Err(EngineError::InvalidState {
                state: self.state,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Enter a terminal state.
    pub fn finish(&mut self, state: ProfileState) {
        debug_assert!(state.is_terminal());
        self.state = state;
    }
}

impl Default for ProfileLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the names of exclusive clones for the destroy confirmation.
///
/// At most `max` names are listed, one per line; a trailing `…` line marks
/// the omitted rest. The marker sits on its own line rather than after the
/// last listed name, so translated prompts must not append their own.
pub fn render_exclusive_listing(names: &[String], max: usize) -> String {
    let mut listing = names.iter().take(max).map(String::as_str).collect::<Vec<_>>().join("\n");
    if names.len() > max {
        listing.push_str("\n…");
    }
    listing
}

impl<A, R, E, G> IslandEngine<A, R, E, G>
where
    A: PolicyAuthority,
    R: PackageRegistry,
    E: Environment,
    G: GateStore,
{
    /// Current authority lifecycle state.
    pub fn profile_state(&self) -> ProfileState {
        self.lifecycle.state()
    }

    /// Name and enable the managed profile, making its apps visible in the
    /// launcher.
    pub fn enable_profile(&mut self) -> Result<(), EngineError> {
        self.lifecycle.activate()?;
        info!(name = %self.config.profile_name, "enable profile now");
        self.policy.enable_profile(&self.config.profile_name);
        Ok(())
    }

    /// Offer to tear down whatever authority this process holds.
    ///
    /// `exclusive_clones` are the labels of apps that exist only in the
    /// island and will be lost with it.
    pub fn destroy(&self, exclusive_clones: &[String]) -> Vec<IslandAction> {
        let user = self.env.current_user();
        let own = self.env.own_package();

        let confirmation = if user.is_owner() && self.policy.is_device_owner(&own) {
            Confirmation::new(Prompt::Deactivate, Continuation::DeactivateDeviceOwner)
        } else if !user.is_owner()
            && self.policy.is_profile_owner(&own)
            && self.policy.is_admin_active()
        {
            let next = if exclusive_clones.is_empty() {
                Continuation::RemoveProfileOwner
            } else {
                Continuation::ConfirmDestroyExclusives { clones: exclusive_clones.to_vec() }
            };
            Confirmation::new(Prompt::Destroy, next)
        } else {
            warn!(%user, "no authority to destroy");
            Confirmation::notice(Prompt::CannotDestroy)
        };

        vec![IslandAction::Confirm(confirmation)]
    }

    pub(crate) fn confirm_destroy_exclusives(&self, clones: &[String]) -> IslandAction {
        let listing = render_exclusive_listing(clones, self.config.max_destroy_listing);
        IslandAction::Confirm(Confirmation::new(
            Prompt::DestroyExclusives { count: clones.len(), listing },
            Continuation::RemoveProfileOwner,
        ))
    }

    /// Give up device ownership and close the originating surface.
    pub fn deactivate_device_owner(&mut self) -> Result<Vec<IslandAction>, EngineError> {
        self.lifecycle.ensure_live("deactivate_device_owner")?;
        if self.policy.clear_device_owner(&self.env.own_package()) {
            info!("device owner cleared");
            self.lifecycle.finish(ProfileState::Deactivated);
        }
        Ok(self.finish_surface())
    }

    /// Wipe the island and close the originating surface.
    ///
    /// The wipe only runs while this package is still profile owner of the
    /// current user, so the primary user is never wiped by mistake.
    pub fn remove_profile_owner(&mut self) -> Result<Vec<IslandAction>, EngineError> {
        self.lifecycle.ensure_live("remove_profile_owner")?;
        if self.policy.is_profile_owner(&self.env.own_package()) {
            if self.policy.wipe(WipeFlags::empty()) {
                info!(user = %self.env.current_user(), "island wiped");
                self.lifecycle.finish(ProfileState::Destroyed);
            }
        } else {
            warn!(user = %self.env.current_user(), "not profile owner, skipping wipe");
        }
        Ok(self.finish_surface())
    }

    fn finish_surface(&self) -> Vec<IslandAction> {
        if self.env.has_interactive_surface() {
            vec![IslandAction::FinishSurface]
        } else {
            Vec::new()
        }
    }

    /// Whether this package is device owner.
    pub fn is_device_owner(&self) -> bool {
        self.policy.is_device_owner(&self.env.own_package())
    }

    /// Whether this package is profile owner of the current user.
    pub fn is_profile_owner(&self) -> bool {
        self.policy.is_profile_owner(&self.env.own_package())
    }

    /// Whether the profile owner's admin is active.
    ///
    /// # Errors
    /// Returns `OwnerUser` when called in the owner user.
    pub fn is_profile_owner_active(&self) -> Result<bool, EngineError> {
        if self.env.current_user().is_owner() {
            return Err(EngineError::OwnerUser { operation: "is_profile_owner_active".to_string() });
        }
        Ok(self.policy.is_admin_active())
    }

    /// The island profile as seen from the current user. Only one managed
    /// profile can exist at a time.
    pub fn managed_profile(&self) -> Option<UserId> {
        let current = self.env.current_user();
        let profile = self.env.user_profiles().into_iter().find(|user| *user != current);
        debug!(?profile, "managed profile lookup");
        profile
    }

    /// Profile owner component of a user, `None` for none or failure.
    pub fn profile_owner_of(&self, user: UserId) -> Option<ComponentName> {
        self.policy.profile_owner_of(user)
    }
}
