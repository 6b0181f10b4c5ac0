//! Engine error types

use thiserror::Error;

use crate::{profile::ProfileState, registry::RegistryError};

/// Errors surfaced by engine operations.
///
/// Authority failures never appear here; the policy client absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The package is unknown to the registry.
    #[error("package not found: {package}")]
    NotFound {
        /// Requested package.
        package: String,
    },

    /// Operation not valid in the current authority lifecycle state.
    #[error("cannot {operation} in state {state:?}")]
    InvalidState {
        /// Current lifecycle state.
        state: ProfileState,
        /// Operation attempted.
        operation: String,
    },

    /// Operation only meaningful inside the island was called in the owner.
    #[error("{operation} must not be called in the owner user")]
    OwnerUser {
        /// Operation attempted.
        operation: String,
    },
}

impl From<RegistryError> for EngineError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound(package) => Self::NotFound { package },
        }
    }
}
