//! Recording driver.

use isle_app::Driver;
use isle_core::{Confirmation, Intent, Notice, ResultRequest, UserId};
use thiserror::Error;

/// Driver failures injected by tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// No activity could be started.
    #[error("no activity found to handle {0}")]
    ActivityNotFound(String),
}

/// Effect executed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// Activity started.
    Started {
        /// Started intent.
        intent: Intent,
        /// Result expectation.
        result: ResultRequest,
    },
    /// Confirmation shown.
    Confirmed(Confirmation),
    /// Notice shown.
    Notified(Notice),
    /// Details surface opened.
    Details {
        /// Package shown.
        package: String,
        /// User of the package.
        user: UserId,
    },
    /// Shortcut requested.
    Shortcut(String),
    /// Surface closed.
    Finished,
}

/// Driver that records every effect instead of executing it.
#[derive(Debug, Clone)]
pub struct RecordingDriver {
    events: Vec<DriverEvent>,
    /// Answer returned for shortcut requests.
    pub shortcuts_supported: bool,
    /// Fail every activity start.
    pub fail_starts: bool,
}

impl RecordingDriver {
    /// Create a driver that accepts everything.
    pub fn new() -> Self {
        Self { events: Vec::new(), shortcuts_supported: true, fail_starts: false }
    }

    /// Recorded effects, in order.
    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    /// Forget recorded effects.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Intents started so far.
    pub fn started(&self) -> Vec<&Intent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Started { intent, .. } => Some(intent),
                _ => None,
            })
            .collect()
    }

    /// Confirmations shown so far.
    pub fn confirmations(&self) -> Vec<&Confirmation> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Confirmed(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for RecordingDriver {
    type Error = SimError;

    fn start_activity(&mut self, intent: &Intent, result: ResultRequest) -> Result<(), SimError> {
        if self.fail_starts {
            return Err(SimError::ActivityNotFound(intent.to_string()));
        }
        self.events.push(DriverEvent::Started { intent: intent.clone(), result });
        Ok(())
    }

    fn show_confirmation(&mut self, confirmation: &Confirmation) -> Result<(), SimError> {
        self.events.push(DriverEvent::Confirmed(confirmation.clone()));
        Ok(())
    }

    fn notify(&mut self, notice: &Notice) {
        self.events.push(DriverEvent::Notified(notice.clone()));
    }

    fn show_app_details(&mut self, package: &str, user: UserId) -> Result<(), SimError> {
        self.events.push(DriverEvent::Details { package: package.to_string(), user });
        Ok(())
    }

    fn create_shortcut(&mut self, package: &str) -> bool {
        self.events.push(DriverEvent::Shortcut(package.to_string()));
        self.shortcuts_supported
    }

    fn finish_surface(&mut self) {
        self.events.push(DriverEvent::Finished);
    }
}
