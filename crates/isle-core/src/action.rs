//! Engine actions
//!
//! Declarative effects produced by the engine for the runtime to execute.
//! Anything that runs out of process or needs the user goes through here.

use crate::{env::UserId, intent::Intent, negotiator::ResumeToken};

/// Actions produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IslandAction {
    /// Start an activity.
    StartActivity {
        /// Intent to start.
        intent: Intent,
        /// Whether a result is expected.
        result: ResultRequest,
    },

    /// Ask the user to confirm before continuing.
    Confirm(Confirmation),

    /// Show a transient notice.
    Notify(Notice),

    /// Open the platform's details surface of an app.
    ShowAppDetails {
        /// Package to show.
        package: String,
        /// User the package lives in.
        user: UserId,
    },

    /// Place a launch shortcut for an app.
    CreateShortcut {
        /// Package to launch.
        package: String,
    },

    /// Close the surface that originated the operation.
    FinishSurface,
}

/// Result expectation for a started activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRequest {
    /// Fire and forget.
    None,
    /// Deliver the result to the originating surface.
    ForResult {
        /// Caller-defined request code.
        request_code: u32,
    },
}

/// Confirmation shown to the user.
///
/// Accepting runs the continuation as a fresh engine call. Declining, or a
/// notice without a continuation, ends the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// What to ask.
    pub prompt: Prompt,
    /// What to do on acceptance.
    pub on_accept: Option<Continuation>,
}

impl Confirmation {
    /// Confirmation with a continuation.
    pub fn new(prompt: Prompt, on_accept: Continuation) -> Self {
        Self { prompt, on_accept: Some(on_accept) }
    }

    /// Non-actionable notice.
    pub fn notice(prompt: Prompt) -> Self {
        Self { prompt, on_accept: None }
    }
}

/// Confirmation content. Localized text is rendered by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Cloning goes through the manual package installer.
    CloneViaInstall,
    /// Cloning goes through the first-party market, or a market that cannot
    /// install silently.
    CloneViaGooglePlay,
    /// Cloning goes through an alternate built-in market.
    CloneViaBuiltinMarket,
    /// Give up device ownership.
    Deactivate,
    /// Destroy the island.
    Destroy,
    /// Destroy the island although some apps only exist inside it.
    DestroyExclusives {
        /// Total number of exclusive clones.
        count: usize,
        /// Rendered, possibly ellipsized listing.
        listing: String,
    },
    /// The island cannot be destroyed from here.
    CannotDestroy,
}

/// Work resumed after the user accepts a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Re-run the clone negotiation from the top.
    ResumeClone(ResumeToken),
    /// Clear device ownership.
    DeactivateDeviceOwner,
    /// Show the stronger confirmation listing exclusive clones.
    ConfirmDestroyExclusives {
        /// Labels of the apps that only exist in the island.
        clones: Vec<String>,
    },
    /// Wipe the island.
    RemoveProfileOwner,
}

/// Transient user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The app has no launcher entry.
    NoLaunchEntrance {
        /// Package without an entrance.
        package: String,
    },
    /// No market resolves the details page of the app.
    NoAppMarket {
        /// Package that could not be cloned.
        package: String,
    },
    /// Shortcut placed on the launcher.
    ShortcutCreated {
        /// Package of the shortcut.
        package: String,
    },
    /// Shortcut could not be placed.
    ShortcutFailed {
        /// Package of the shortcut.
        package: String,
    },
}
