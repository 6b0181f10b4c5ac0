//! Isle engine core
//!
//! Pure lifecycle logic for apps cloned into an isolated managed profile (the
//! island), decoupled from the host platform. The engine classifies app
//! state, drives clone/freeze/defreeze/remove transitions, negotiates the
//! channel used to deliver an install, and manages the administrative
//! authority that owns the island.
//!
//! # Architecture
//!
//! Host services are reached through narrow collaborator traits owned by the
//! engine: [`PolicyAuthority`] for administrative calls, [`PackageRegistry`]
//! for package metadata, [`Environment`] for process facts, and [`GateStore`]
//! for one-shot confirmations. Administrative calls execute synchronously and
//! their failures are absorbed by [`PolicyClient`].
//!
//! Everything the user must see or that runs out of process (installer and
//! market navigation, confirmations, notices) is returned as a declarative
//! [`IslandAction`]. A runtime interprets those actions. Confirmations carry
//! a [`Continuation`] that re-enters the engine with a fresh call once the
//! user accepts, so no suspended operation is ever held in memory.
//!
//! # Components
//!
//! - [`app`]: app records, flags and the state classifier
//! - [`negotiator`]: install channel negotiation for cloning
//! - [`engine`]: lifecycle operations over the collaborators
//! - [`profile`]: authority lifecycle state machine
//! - [`authority`]: policy authority trait, capabilities and client
//! - [`registry`]: package registry trait
//! - [`gate`]: one-shot confirmation gates

pub mod action;
pub mod app;
pub mod authority;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod gate;
pub mod intent;
pub mod negotiator;
pub mod profile;
pub mod registry;

pub use action::{Confirmation, Continuation, IslandAction, Notice, Prompt, ResultRequest};
pub use app::{AppFlags, AppRecord, AppState, classify};
pub use authority::{
    AuthorityError, PlatformCapabilities, PolicyAuthority, PolicyClient, UserRestriction,
    WipeFlags,
};
pub use config::EngineConfig;
pub use engine::IslandEngine;
pub use env::{Environment, UserId};
pub use error::EngineError;
pub use gate::{GateKey, GateStore, MemoryGateStore};
pub use intent::{ComponentName, ForwardingFlags, Intent, IntentFilter, ResolveFlags, ResolveInfo};
pub use negotiator::{CloneOutcome, InstallChannel, Negotiation, ResumeToken};
pub use profile::{ProfileLifecycle, ProfileState};
pub use registry::{ComponentState, PackageRegistry, RegistryError};
