//! Command-line shell for the island engine.
//!
//! Drives the runtime against a simulated device so the engine's flows can
//! be exercised by hand: clone negotiation with its confirmations, freezing,
//! owner installs and teardown.

#![forbid(unsafe_code)]

pub mod commands;
pub mod console;
pub mod shell;

pub use commands::{Command, parse};
pub use console::ConsoleDriver;
pub use shell::{Flow, Shell, ShellError, ShellOptions, demo_device};
