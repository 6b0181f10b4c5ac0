//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! engine behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld      SimWorld        Compare
//!      (reference)   (engine+device)   outcomes and states
//! ```

use isle_core::{AppState, CloneOutcome, GateKey, GateStore, InstallChannel};
use isle_harness::{
    CATALOG, ChannelSetup, ModelWorld, Operation, SimWorld,
    model::{AppIndex, BUILTIN_MARKET},
};
use proptest::prelude::*;

/// Strategy for the device's install channel.
fn channel_strategy() -> impl Strategy<Value = ChannelSetup> {
    prop_oneof![
        Just(ChannelSetup::Installer),
        Just(ChannelSetup::FirstPartyMarket),
        Just(ChannelSetup::BuiltinMarket),
    ]
}

/// Strategy for generating operations over the catalog.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    let app = 0..CATALOG.len() as AppIndex;

    prop_oneof![
        // Weight towards clones, the interesting path
        4 => app.clone().prop_map(|app| Operation::Clone { app }),
        2 => app.clone().prop_map(|app| Operation::Freeze { app }),
        2 => app.clone().prop_map(|app| Operation::Defreeze { app }),
        2 => app.clone().prop_map(|app| Operation::CompleteInstall { app }),
        1 => app.prop_map(|app| Operation::Uninstall { app }),
        1 => Just(Operation::Reinstall),
    ]
}

proptest! {
    /// Clone outcomes and app states match the model after every step.
    #[test]
    fn prop_model_matches_real(
        setup in channel_strategy(),
        ops in prop::collection::vec(operation_strategy(), 0..60),
    ) {
        let mut model = ModelWorld::with_channel(setup);
        let mut real = SimWorld::with_channel(setup);

        for (i, op) in ops.iter().enumerate() {
            let expected = model.apply(*op);
            let actual = real.apply(*op);
            prop_assert_eq!(
                &expected, &actual,
                "Outcome divergence at operation {}: {:?}", i, op
            );

            for app in 0..CATALOG.len() as AppIndex {
                prop_assert_eq!(
                    Some(model.state(app)), real.state(app),
                    "State divergence for {} after operation {}: {:?}",
                    CATALOG[app as usize].package, i, op
                );
            }
        }
    }

    /// A frozen app is always installed.
    #[test]
    fn prop_frozen_implies_cloned(
        setup in channel_strategy(),
        ops in prop::collection::vec(operation_strategy(), 0..60),
    ) {
        let mut real = SimWorld::with_channel(setup);
        for op in ops {
            real.apply(op);
        }

        for entry in CATALOG {
            let device = real.host().device();
            if device.is_hidden(entry.package) {
                prop_assert!(device.is_installed(entry.package));
            }
        }
    }

    /// System apps never need an installer or a market.
    #[test]
    fn prop_system_clones_complete_in_place(
        setup in channel_strategy(),
        ops in prop::collection::vec(operation_strategy(), 0..40),
    ) {
        let mut real = SimWorld::with_channel(setup);
        for op in ops {
            let outcome = real.apply(op);
            if let (Operation::Clone { app }, Some(outcome)) = (op, outcome)
                && CATALOG[app as usize].system
            {
                prop_assert!(matches!(
                    outcome,
                    CloneOutcome::AlreadyCloned | CloneOutcome::SystemAppEnabled
                ));
                prop_assert_ne!(real.state(app), Some(AppState::NotCloned));
            }
        }
    }
}

#[test]
fn clone_after_complete_install_is_already_cloned() {
    let mut real = SimWorld::new();

    real.apply(Operation::Clone { app: 0 });
    real.apply(Operation::CompleteInstall { app: 0 });

    assert_eq!(real.apply(Operation::Clone { app: 0 }), Some(CloneOutcome::AlreadyCloned));
    assert_eq!(real.state(0), Some(AppState::Alive));
}

#[test]
fn first_party_market_gate_is_consumed_once() {
    let mut real = SimWorld::with_channel(ChannelSetup::FirstPartyMarket);
    let channel = ChannelSetup::FirstPartyMarket.install_channel();

    assert_eq!(
        real.apply(Operation::Clone { app: 0 }),
        Some(CloneOutcome::AwaitingConfirmation(channel.clone()))
    );
    assert!(real.engine().gates().is_marked(GateKey::CloneViaGooglePlay.as_str()));
    assert_eq!(real.apply(Operation::Clone { app: 0 }), Some(CloneOutcome::Launched(channel)));
    assert!(!real.engine().gates().is_marked(GateKey::CloneViaInstall.as_str()));
}

#[test]
fn builtin_market_gate_rearms_on_reinstall() {
    let mut real = SimWorld::with_channel(ChannelSetup::BuiltinMarket);
    let channel = InstallChannel::MarketApp { market: BUILTIN_MARKET.to_string() };

    real.apply(Operation::Clone { app: 0 });
    assert!(real.engine().gates().is_marked(GateKey::CloneViaBuiltinMarket.as_str()));
    assert!(!real.engine().gates().is_marked(GateKey::CloneViaGooglePlay.as_str()));

    real.apply(Operation::Reinstall);
    assert_eq!(
        real.apply(Operation::Clone { app: 0 }),
        Some(CloneOutcome::AwaitingConfirmation(channel))
    );
}

#[test]
fn disabled_clone_keeps_its_state() {
    let mut real = SimWorld::new();
    let legacy = CATALOG.iter().position(|e| !e.enabled).unwrap() as AppIndex;

    real.apply(Operation::Freeze { app: legacy });
    assert_eq!(real.state(legacy), Some(AppState::Disabled));
    assert_eq!(real.apply(Operation::Clone { app: legacy }), Some(CloneOutcome::AlreadyCloned));

    real.apply(Operation::Uninstall { app: legacy });
    assert_eq!(real.state(legacy), Some(AppState::NotCloned));
    real.apply(Operation::CompleteInstall { app: legacy });
    assert_eq!(real.state(legacy), Some(AppState::Disabled));
}
