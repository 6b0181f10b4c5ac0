//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Package of the first-party app market.
pub const PACKAGE_GOOGLE_PLAY_STORE: &str = "com.android.vending";
/// System dependency of the first-party app market.
pub const PACKAGE_GOOGLE_PLAY_SERVICES: &str = "com.google.android.gms";
/// System settings app hosting app details.
pub const PACKAGE_SETTINGS: &str = "com.android.settings";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display name of the managed profile
    pub profile_name: String,
    /// Settings app opened for app details
    pub settings_package: String,
    /// Canonical first-party market
    pub market_package: String,
    /// System app the first-party market depends on
    pub market_dependency_package: String,
    /// Class of the local component forwarding installs to the owner
    pub forward_installer_class: String,
    /// Names listed before the exclusive-clone listing is ellipsized
    pub max_destroy_listing: usize,
    /// Request code for installer results
    pub install_request_code: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile_name: "Island".to_string(),
            settings_package: PACKAGE_SETTINGS.to_string(),
            market_package: PACKAGE_GOOGLE_PLAY_STORE.to_string(),
            market_dependency_package: PACKAGE_GOOGLE_PLAY_SERVICES.to_string(),
            forward_installer_class: ".engine.ForwardInstaller".to_string(),
            max_destroy_listing: 8,
            install_request_code: 0x101,
        }
    }
}
