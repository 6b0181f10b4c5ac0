//! Authority lifecycle integration tests.
//!
//! Tests the destroy flow and the lifecycle state machine:
//! - Deactivation of a device owner in the owner user
//! - Island wipe, with and without exclusive clones
//! - Terminal states
//! - Profile enabling and ownership queries

use isle_core::{
    ComponentName, Confirmation, Continuation, EngineError, IslandAction, ProfileState, Prompt,
    UserId,
};
use isle_harness::{AuthorityCall, ISLAND_USER, OWN_PACKAGE, SimDevice, SimHost};

fn labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("App {i}")).collect()
}

fn confirmation(actions: &[IslandAction]) -> &Confirmation {
    match actions {
        [IslandAction::Confirm(confirmation)] => confirmation,
        other => panic!("expected a single confirmation, got {other:?}"),
    }
}

#[test]
fn device_owner_in_owner_user_is_deactivated() {
    let host = SimHost::new(SimDevice::owner().with_device_owner());
    let mut engine = host.engine();

    let actions = engine.destroy(&[]);
    assert_eq!(
        confirmation(&actions),
        &Confirmation::new(Prompt::Deactivate, Continuation::DeactivateDeviceOwner)
    );

    let actions = engine.resume(Continuation::DeactivateDeviceOwner).unwrap();
    assert_eq!(actions, vec![IslandAction::FinishSurface]);
    assert_eq!(host.device().device_owner, None);
    assert_eq!(engine.profile_state(), ProfileState::Deactivated);
    assert!(!host.device().wiped);
}

#[test]
fn device_owner_path_wins_over_exclusive_clones() {
    let host = SimHost::new(SimDevice::owner().with_device_owner());
    let engine = host.engine();

    let actions = engine.destroy(&labels(3));

    assert_eq!(confirmation(&actions).prompt, Prompt::Deactivate);
}

#[test]
fn failed_deactivation_stays_live() {
    let host = SimHost::new(SimDevice::owner());
    let mut engine = host.engine();

    let actions = engine.deactivate_device_owner().unwrap();

    assert_eq!(actions, vec![IslandAction::FinishSurface]);
    assert_eq!(engine.profile_state(), ProfileState::Uninitialized);
}

#[test]
fn island_without_exclusives_goes_straight_to_wipe() {
    let host = SimHost::new(SimDevice::island());
    let mut engine = host.engine();

    let actions = engine.destroy(&[]);
    assert_eq!(
        confirmation(&actions),
        &Confirmation::new(Prompt::Destroy, Continuation::RemoveProfileOwner)
    );

    let actions = engine.resume(Continuation::RemoveProfileOwner).unwrap();
    assert_eq!(actions, vec![IslandAction::FinishSurface]);
    assert!(host.device().wiped);
    assert_eq!(host.calls(), vec![AuthorityCall::Wipe]);
    assert_eq!(engine.profile_state(), ProfileState::Destroyed);
}

#[test]
fn exclusive_clones_need_second_confirmation() {
    let host = SimHost::new(SimDevice::island());
    let mut engine = host.engine();
    let clones = labels(10);

    let actions = engine.destroy(&clones);
    let first = confirmation(&actions);
    assert_eq!(first.prompt, Prompt::Destroy);
    let continuation = first.on_accept.clone().unwrap();
    assert_eq!(continuation, Continuation::ConfirmDestroyExclusives { clones: clones.clone() });

    let actions = engine.resume(continuation).unwrap();
    let second = confirmation(&actions);
    let Prompt::DestroyExclusives { count, listing } = &second.prompt else {
        panic!("expected exclusive listing, got {:?}", second.prompt);
    };
    assert_eq!(*count, 10);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(&lines[..8], &clones.iter().take(8).map(String::as_str).collect::<Vec<_>>()[..]);
    assert_eq!(lines[8], "…");
    assert_eq!(second.on_accept, Some(Continuation::RemoveProfileOwner));

    // Nothing is wiped before the last confirmation
    assert!(!host.device().wiped);
}

#[test]
fn listing_limit_follows_config() {
    let host = SimHost::new(SimDevice::island());
    let config = isle_core::EngineConfig { max_destroy_listing: 2, ..Default::default() };
    let mut engine = host.engine_with(isle_core::MemoryGateStore::new(), config);

    let actions =
        engine.resume(Continuation::ConfirmDestroyExclusives { clones: labels(3) }).unwrap();

    assert_eq!(
        confirmation(&actions).prompt,
        Prompt::DestroyExclusives { count: 3, listing: "App 1\nApp 2\n…".to_string() }
    );
}

#[test]
fn no_authority_cannot_destroy() {
    let host = SimHost::new(SimDevice::owner());
    let engine = host.engine();

    let actions = engine.destroy(&labels(2));

    assert_eq!(confirmation(&actions), &Confirmation::notice(Prompt::CannotDestroy));
}

#[test]
fn inactive_admin_cannot_destroy() {
    let mut device = SimDevice::island();
    device.admin_active = false;
    let host = SimHost::new(device);
    let engine = host.engine();

    assert_eq!(confirmation(&engine.destroy(&[])).prompt, Prompt::CannotDestroy);
}

#[test]
fn wipe_requires_profile_ownership() {
    let mut device = SimDevice::island();
    device.profile_owner = None;
    let host = SimHost::new(device);
    let mut engine = host.engine();

    let actions = engine.remove_profile_owner().unwrap();

    assert_eq!(actions, vec![IslandAction::FinishSurface]);
    assert!(!host.device().wiped);
    assert_eq!(engine.profile_state(), ProfileState::Uninitialized);
}

#[test]
fn headless_teardown_has_no_surface_to_finish() {
    let host = SimHost::new(SimDevice::island().headless());
    let mut engine = host.engine();

    let actions = engine.remove_profile_owner().unwrap();

    assert!(actions.is_empty());
    assert!(host.device().wiped);
}

#[test]
fn terminal_state_rejects_transitions() {
    let host = SimHost::new(SimDevice::island());
    let mut engine = host.engine();
    engine.remove_profile_owner().unwrap();

    assert!(matches!(
        engine.enable_profile(),
        Err(EngineError::InvalidState { state: ProfileState::Destroyed, .. })
    ));
    assert!(matches!(
        engine.remove_profile_owner(),
        Err(EngineError::InvalidState { state: ProfileState::Destroyed, .. })
    ));
    assert!(engine.deactivate_device_owner().is_err());
    assert_eq!(host.calls(), vec![AuthorityCall::Wipe]);
}

#[test]
fn enable_profile_names_and_enables() {
    let host = SimHost::new(SimDevice::island());
    let mut engine = host.engine();

    engine.enable_profile().unwrap();
    engine.enable_profile().unwrap();

    assert_eq!(engine.profile_state(), ProfileState::Active);
    assert_eq!(host.device().profile_name.as_deref(), Some("Island"));
    assert!(host.device().profile_enabled);
    assert_eq!(
        host.calls()[..2],
        [AuthorityCall::SetProfileName("Island".to_string()), AuthorityCall::SetProfileEnabled]
    );
}

#[test]
fn ownership_queries() {
    let island = SimHost::new(SimDevice::island()).engine();
    assert!(island.is_profile_owner());
    assert!(!island.is_device_owner());
    assert_eq!(island.is_profile_owner_active(), Ok(true));
    assert_eq!(island.managed_profile(), Some(UserId::OWNER));

    let owner = SimHost::new(SimDevice::owner().with_device_owner()).engine();
    assert!(owner.is_device_owner());
    assert!(matches!(owner.is_profile_owner_active(), Err(EngineError::OwnerUser { .. })));
    assert_eq!(owner.managed_profile(), Some(ISLAND_USER));
}

#[test]
fn profile_owner_lookup_depends_on_platform() {
    let host = SimHost::new(SimDevice::island());
    let engine = host.engine();
    assert_eq!(
        engine.profile_owner_of(ISLAND_USER).map(|c| c.package),
        Some(OWN_PACKAGE.to_string())
    );
    assert_eq!(engine.profile_owner_of(UserId::OWNER), None);

    let legacy = SimHost::new(SimDevice::island().with_level(19)).engine();
    assert_eq!(legacy.profile_owner_of(ISLAND_USER), None::<ComponentName>);
}
