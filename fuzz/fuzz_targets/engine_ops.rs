//! Fuzz harness for engine operation sequences.
//!
//! Applies arbitrary freeze, clone, install and reinstall sequences to the
//! reference model and to a real engine on a simulated device, and aborts
//! on the first divergence. The device's install channel is fuzzed too.

#![no_main]
use isle_harness::{CATALOG, ChannelSetup, ModelWorld, Operation, SimWorld, model::AppIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (ChannelSetup, Vec<Operation>)| {
    let (setup, ops) = input;
    let mut model = ModelWorld::with_channel(setup);
    let mut real = SimWorld::with_channel(setup);

    for op in ops.into_iter().take(256) {
        assert_eq!(model.apply(op), real.apply(op), "outcome diverged at {op:?}");
        for app in 0..CATALOG.len() as AppIndex {
            assert_eq!(Some(model.state(app)), real.state(app), "state diverged after {op:?}");
        }
    }
});
