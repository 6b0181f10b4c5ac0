//! Driver trait for abstracting platform effects.
//!
//! The [`Driver`] trait decouples the runtime from a specific host. Each
//! frontend implements it to start activities and draw dialogs, while the
//! generic [`crate::Runtime`] handles all orchestration.

use isle_core::{Confirmation, Intent, Notice, ResultRequest, UserId};

/// Executes platform effects for the runtime.
///
/// All calls happen on the caller's thread. Implementations must return
/// promptly: a confirmation is only shown here, and the user's answer comes
/// back later through [`crate::Runtime::accept`] or
/// [`crate::Runtime::dismiss`].
pub trait Driver {
    /// Platform-specific error type.
    type Error: std::error::Error + 'static;

    /// Start an activity.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing can handle the intent.
    fn start_activity(&mut self, intent: &Intent, result: ResultRequest) -> Result<(), Self::Error>;

    /// Show a confirmation dialog.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface can host the dialog.
    fn show_confirmation(&mut self, confirmation: &Confirmation) -> Result<(), Self::Error>;

    /// Show a transient notice.
    fn notify(&mut self, notice: &Notice);

    /// Open the platform's details surface of an app.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be opened.
    fn show_app_details(&mut self, package: &str, user: UserId) -> Result<(), Self::Error>;

    /// Place a launch shortcut. Returns whether the launcher accepted it.
    fn create_shortcut(&mut self, package: &str) -> bool;

    /// Close the surface that originated the current operation.
    fn finish_surface(&mut self);
}
