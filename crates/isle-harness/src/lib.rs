//! Deterministic simulation harness for island engine testing.
//!
//! A [`SimDevice`] holds the host state, [`SimHost`] implements every engine
//! collaborator over it, and [`RecordingDriver`] records what a runtime
//! would execute. The [`model`] module pairs a reference model with a real
//! engine for model-based and fuzz testing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod device;
pub mod driver;
pub mod host;
pub mod model;

pub use device::{AuthorityCall, Faults, ISLAND_USER, OWN_PACKAGE, SimDevice, SimPackage};
pub use driver::{DriverEvent, RecordingDriver, SimError};
pub use host::{SimEngine, SimHost};
pub use model::{CATALOG, ChannelSetup, ModelWorld, Operation, SimWorld, catalog_package};

use isle_app::Runtime;
use isle_core::MemoryGateStore;

/// Runtime wired to a simulated host and a recording driver.
pub type SimRuntime = Runtime<SimHost, SimHost, SimHost, MemoryGateStore, RecordingDriver>;

/// Build a runtime over a device, returning the host handle for inspection.
pub fn sim_runtime(device: SimDevice) -> (SimHost, SimRuntime) {
    let host = SimHost::new(device);
    let runtime = Runtime::new(host.engine(), RecordingDriver::new());
    (host, runtime)
}
