//! Operations exposed to the UI layer.

/// App operations a list view binds to.
///
/// Implemented by [`crate::Runtime`]; view models depend on this trait so
/// they can be tested against a stub.
pub trait Controller {
    /// Error returned by operations.
    type Error;

    /// Hide an app.
    fn freeze_app(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Unhide an app.
    fn defreeze_app(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Launch an app.
    fn launch_app(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Clone an app into the island.
    fn clone_app(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Open the details surface of a disabled app.
    fn enable_app(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Remove a clone.
    fn remove_clone(&mut self, package: &str) -> Result<(), Self::Error>;

    /// Install an app for the owner user.
    fn install_for_owner(&mut self, package: &str) -> Result<(), Self::Error>;

    /// User-visible name of an app.
    fn read_app_name(&self, package: &str) -> Result<String, Self::Error>;

    /// Whether the app only exists in the island.
    fn is_clone_exclusive(&self, package: &str) -> bool;

    /// Place a launch shortcut.
    fn create_shortcut(&mut self, package: &str) -> Result<(), Self::Error>;
}
