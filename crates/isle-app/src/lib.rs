//! Application layer for Isle
//!
//! Generic runtime that executes the actions of the pure island engine
//! through a platform driver, so the same orchestration runs against a real
//! host and against the simulation harness.
//!
//! # Components
//!
//! - [`Controller`]: Operations exposed to the UI layer
//! - [`Driver`]: Trait for platform-specific effects
//! - [`Runtime`]: Executes engine actions and resumes accepted confirmations

mod controller;
mod driver;
mod runtime;

pub use controller::Controller;
pub use driver::Driver;
pub use runtime::{Runtime, RuntimeError};
