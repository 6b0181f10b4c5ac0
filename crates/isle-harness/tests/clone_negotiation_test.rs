//! Clone negotiation integration tests.
//!
//! Runs the negotiator against a simulated device:
//! - System apps are enabled in place
//! - Manual installer channel, with its one-shot explanation
//! - Market channels: first-party, built-in, unprivileged
//! - Resuming after the world changed
//! - Absorbed authority failures

use isle_core::{
    AppState, CloneOutcome, Confirmation, Continuation, EngineConfig, EngineError, GateKey,
    GateStore, InstallChannel, Intent, IslandAction, MemoryGateStore, Notice, Prompt,
    ResultRequest, ResumeToken, UserRestriction,
    env::INSTALL_NON_MARKET_APPS,
    intent::{ACTION_INSTALL_PACKAGE, EXTRA_INSTALLER_PACKAGE_NAME, EXTRA_RETURN_RESULT},
};
use isle_harness::{AuthorityCall, Faults, OWN_PACKAGE, SimDevice, SimHost, SimPackage};

const NOTES: &str = "com.example.notes";
const CAMERA: &str = "com.android.camera";
const PLAY_STORE: &str = "com.android.vending";
const PLAY_SERVICES: &str = "com.google.android.gms";

fn installer_device() -> SimDevice {
    SimDevice::island().with_non_market_allowed().with_package(SimPackage::user_app(NOTES))
}

/// Device where installs from outside the market cannot be allowed.
fn market_device(market: SimPackage) -> SimDevice {
    SimDevice::island().with_level(21).with_package(SimPackage::user_app(NOTES)).with_package(market)
}

fn started(actions: &[IslandAction]) -> Vec<(&Intent, ResultRequest)> {
    actions
        .iter()
        .filter_map(|a| match a {
            IslandAction::StartActivity { intent, result } => Some((intent, *result)),
            _ => None,
        })
        .collect()
}

#[test]
fn system_app_is_enabled_in_place() {
    let host = SimHost::new(SimDevice::island().with_package(SimPackage::system_app(CAMERA)));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(CAMERA).unwrap();

    assert_eq!(negotiation.outcome, CloneOutcome::SystemAppEnabled);
    assert!(negotiation.actions.is_empty());
    assert_eq!(host.calls(), vec![AuthorityCall::EnableSystemApp { package: CAMERA.to_string() }]);
    assert!(host.device().is_installed(CAMERA));
    assert_eq!(engine.app_state(CAMERA).unwrap(), AppState::Alive);
}

#[test]
fn system_clone_never_issues_install_intent() {
    let host = SimHost::new(
        SimDevice::island().with_non_market_allowed().with_package(SimPackage::system_app(CAMERA)),
    );
    let mut engine = host.engine();

    let negotiation = engine.clone_app(CAMERA).unwrap();

    assert!(started(&negotiation.actions).is_empty());
    assert!(
        !host
            .calls()
            .iter()
            .any(|c| matches!(c, AuthorityCall::EnableSystemAppForIntent { .. }))
    );
}

#[test]
fn installed_app_is_already_cloned() {
    let host = SimHost::new(SimDevice::island().with_package(SimPackage::user_app(NOTES).installed()));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert_eq!(negotiation.outcome, CloneOutcome::AlreadyCloned);
    assert!(negotiation.actions.is_empty());
    assert!(host.calls().is_empty());
}

#[test]
fn unknown_package_is_not_found() {
    let host = SimHost::new(SimDevice::island());
    let mut engine = host.engine();

    let result = engine.clone_app("com.example.missing");

    assert_eq!(
        result,
        Err(EngineError::NotFound { package: "com.example.missing".to_string() })
    );
}

#[test]
fn installer_channel_explains_then_launches() {
    let host = SimHost::new(installer_device());
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();
    let token = ResumeToken { package: NOTES.to_string(), channel: InstallChannel::ManualInstaller };
    assert_eq!(
        negotiation.outcome,
        CloneOutcome::AwaitingConfirmation(InstallChannel::ManualInstaller)
    );
    assert_eq!(
        negotiation.actions,
        vec![IslandAction::Confirm(Confirmation::new(
            Prompt::CloneViaInstall,
            Continuation::ResumeClone(token.clone()),
        ))]
    );

    let actions = engine.resume(Continuation::ResumeClone(token)).unwrap();
    let launches = started(&actions);
    assert_eq!(launches.len(), 1);

    let (intent, result) = launches[0];
    assert_eq!(intent.action.as_deref(), Some(ACTION_INSTALL_PACKAGE));
    assert_eq!(intent.data_package(), Some(NOTES));
    assert_eq!(
        intent.extras.get(EXTRA_INSTALLER_PACKAGE_NAME).map(String::as_str),
        Some(OWN_PACKAGE)
    );
    assert_eq!(intent.extras.get(EXTRA_RETURN_RESULT).map(String::as_str), Some("true"));
    assert_eq!(result, ResultRequest::ForResult { request_code: 0x101 });
}

#[test]
fn marked_gate_launches_installer_exactly_once() {
    let host = SimHost::new(installer_device());
    let gates = MemoryGateStore::with_marked([GateKey::CloneViaInstall.as_str()]);
    let mut engine = host.engine_with(gates, EngineConfig::default());

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert_eq!(negotiation.outcome, CloneOutcome::Launched(InstallChannel::ManualInstaller));
    assert_eq!(negotiation.actions.len(), 1);
    assert_eq!(started(&negotiation.actions).len(), 1);
}

#[test]
fn installer_without_surface_expects_no_result() {
    let host = SimHost::new(installer_device().headless());
    let gates = MemoryGateStore::with_marked([GateKey::CloneViaInstall.as_str()]);
    let mut engine = host.engine_with(gates, EngineConfig::default());

    let negotiation = engine.clone_app(NOTES).unwrap();
    let (intent, result) = started(&negotiation.actions)[0];

    assert_eq!(result, ResultRequest::None);
    assert!(!intent.extras.contains_key(EXTRA_RETURN_RESULT));
}

#[test]
fn install_restrictions_are_cleared() {
    let host = SimHost::new(installer_device());
    let mut engine = host.engine();

    engine.clone_app(NOTES).unwrap();

    assert!(host.device().restrictions.is_empty());
    let calls = host.calls();
    assert!(calls.contains(&AuthorityCall::ClearRestriction(UserRestriction::InstallApps)));
    assert!(calls.contains(&AuthorityCall::ClearRestriction(UserRestriction::InstallUnknownSources)));
}

#[test]
fn non_market_setting_is_written_when_supported() {
    let host = SimHost::new(SimDevice::island().with_package(SimPackage::user_app(NOTES)));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert!(host.calls().contains(&AuthorityCall::SetSecureSetting {
        key: INSTALL_NON_MARKET_APPS.to_string(),
        value: "1".to_string(),
    }));
    assert_eq!(
        negotiation.outcome,
        CloneOutcome::AwaitingConfirmation(InstallChannel::ManualInstaller)
    );
}

#[test]
fn level_21_never_writes_secure_settings() {
    let host = SimHost::new(SimDevice::island().with_level(21).with_package(SimPackage::user_app(NOTES)));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert!(
        !host.calls().iter().any(|c| matches!(c, AuthorityCall::SetSecureSetting { .. }))
    );
    assert_eq!(negotiation.outcome, CloneOutcome::NoChannel);
    assert_eq!(
        negotiation.actions,
        vec![IslandAction::Notify(Notice::NoAppMarket { package: NOTES.to_string() })]
    );
}

#[test]
fn first_party_market_explains_then_enables_dependency() {
    let host = SimHost::new(market_device(SimPackage::system_app(PLAY_STORE).installed().market()));
    let mut engine = host.engine();
    let channel = InstallChannel::MarketApp { market: PLAY_STORE.to_string() };

    let first = engine.clone_app(NOTES).unwrap();
    assert_eq!(first.outcome, CloneOutcome::AwaitingConfirmation(channel.clone()));
    assert!(matches!(
        &first.actions[..],
        [IslandAction::Confirm(Confirmation { prompt: Prompt::CloneViaGooglePlay, .. })]
    ));
    assert!(host.device().enable_calls().is_empty());

    let second = engine.clone_app(NOTES).unwrap();
    assert_eq!(second.outcome, CloneOutcome::Launched(channel));
    assert_eq!(
        host.device().enable_calls(),
        vec![&AuthorityCall::EnableSystemApp { package: PLAY_SERVICES.to_string() }]
    );
    let (intent, result) = started(&second.actions)[0];
    assert_eq!(intent, &Intent::market_details(NOTES));
    assert_eq!(result, ResultRequest::None);
}

#[test]
fn uninstalled_system_market_is_enabled_for_the_details_page() {
    let host = SimHost::new(market_device(SimPackage::system_app(PLAY_STORE).market()));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert!(host.device().is_installed(PLAY_STORE));
    assert_eq!(
        negotiation.outcome,
        CloneOutcome::AwaitingConfirmation(InstallChannel::MarketApp {
            market: PLAY_STORE.to_string()
        })
    );
}

#[test]
fn builtin_market_has_its_own_gate() {
    let store = "com.vendor.store";
    let host = SimHost::new(market_device(SimPackage::system_app(store).installed().market()));
    let mut engine = host.engine();

    let first = engine.clone_app(NOTES).unwrap();
    assert!(matches!(
        &first.actions[..],
        [IslandAction::Confirm(Confirmation { prompt: Prompt::CloneViaBuiltinMarket, .. })]
    ));
    assert!(engine.gates().is_marked(GateKey::CloneViaBuiltinMarket.as_str()));
    assert!(!engine.gates().is_marked(GateKey::CloneViaGooglePlay.as_str()));

    let second = engine.clone_app(NOTES).unwrap();
    assert_eq!(
        second.outcome,
        CloneOutcome::Launched(InstallChannel::MarketApp { market: store.to_string() })
    );
    assert!(host.device().enable_calls().is_empty());
}

#[test]
fn unprivileged_market_always_explains() {
    let store = "com.thirdparty.store";
    let host = SimHost::new(market_device(SimPackage::user_app(store).installed().market()));
    let mut engine = host.engine();

    for _ in 0..3 {
        let negotiation = engine.clone_app(NOTES).unwrap();
        assert!(matches!(
            &negotiation.actions[..],
            [IslandAction::Confirm(Confirmation { prompt: Prompt::CloneViaGooglePlay, .. })]
        ));
    }
    assert!(!engine.gates().is_marked(GateKey::CloneViaGooglePlay.as_str()));
}

#[test]
fn resume_observes_completed_install() {
    let host = SimHost::new(installer_device());
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();
    let Some(IslandAction::Confirm(Confirmation { on_accept: Some(continuation), .. })) =
        negotiation.actions.into_iter().next()
    else {
        panic!("expected a confirmation");
    };

    // Installed by someone else while the dialog was open
    host.device_mut().complete_install(NOTES);

    let actions = engine.resume(continuation).unwrap();
    assert!(actions.is_empty());
    assert_eq!(engine.app_state(NOTES).unwrap(), AppState::Alive);
}

#[test]
fn reinstall_rearms_explanations() {
    let host = SimHost::new(installer_device());
    let mut engine = host.engine();

    engine.clone_app(NOTES).unwrap();
    assert!(engine.gates().is_marked(GateKey::CloneViaInstall.as_str()));

    engine.on_reinstalled();

    let negotiation = engine.clone_app(NOTES).unwrap();
    assert_eq!(
        negotiation.outcome,
        CloneOutcome::AwaitingConfirmation(InstallChannel::ManualInstaller)
    );
}

#[test]
fn rejected_intent_enable_is_absorbed() {
    let faults = Faults { reject_intent_enable: true, ..Faults::default() };
    let host = SimHost::new(installer_device().with_faults(faults));
    let mut engine = host.engine();

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert_eq!(
        negotiation.outcome,
        CloneOutcome::AwaitingConfirmation(InstallChannel::ManualInstaller)
    );
}

#[test]
fn incompatible_restriction_calls_are_absorbed() {
    let faults = Faults {
        incompatible: ["clear_user_restriction", "enable_system_app_for_intent"].into_iter().collect(),
        ..Faults::default()
    };
    let host = SimHost::new(installer_device().with_faults(faults));
    let gates = MemoryGateStore::with_marked([GateKey::CloneViaInstall.as_str()]);
    let mut engine = host.engine_with(gates, EngineConfig::default());

    let negotiation = engine.clone_app(NOTES).unwrap();

    assert_eq!(negotiation.outcome, CloneOutcome::Launched(InstallChannel::ManualInstaller));
    assert_eq!(host.device().restrictions.len(), 2);
}
