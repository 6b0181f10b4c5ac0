//! End-to-end shell tests.
//!
//! Feed command scripts to a shell over the demo device and check the
//! printed transcript and the resulting device state.

use isle_cli::{Flow, Shell, ShellOptions, parse};
use isle_harness::SimHost;

/// Run a script, returning each step's flow, the transcript and the device.
fn run_script(options: &ShellOptions, script: &[&str]) -> (Vec<Flow>, String, SimHost) {
    let mut shell = Shell::new(options, Vec::new());
    let flows = script.iter().map(|line| shell.execute(parse(line)).unwrap()).collect();
    let host = shell.host().clone();
    let out = String::from_utf8(shell.into_output()).unwrap();
    (flows, out, host)
}

#[test]
fn clone_through_installer() {
    let (_, out, host) = run_script(&ShellOptions::default(), &[
        "/clone com.example.notes",
        "/yes",
        "/complete com.example.notes",
        "/state com.example.notes",
    ]);

    assert!(out.contains("package installer"));
    assert!(out.contains("dat=package:com.example.notes"));
    assert!(out.contains("for result #0x101"));
    assert!(out.contains("com.example.notes: alive"));
    assert!(host.device().is_installed("com.example.notes"));
}

#[test]
fn system_app_clone_is_silent() {
    let (_, out, _) =
        run_script(&ShellOptions::default(), &["/clone com.android.camera", "/state com.android.camera"]);

    assert!(!out.contains("??"));
    assert!(out.contains("com.android.camera: alive"));
}

#[test]
fn freeze_round_trip_in_listing() {
    let (_, out, _) = run_script(&ShellOptions::default(), &[
        "/freeze com.example.chat",
        "/state com.example.chat",
        "/defreeze com.example.chat",
        "/state com.example.chat",
    ]);

    let states: Vec<&str> = out.lines().collect();
    assert_eq!(states, vec!["com.example.chat: frozen", "com.example.chat: alive"]);
}

#[test]
fn destroy_asks_twice_then_quits() {
    let (flows, out, host) = run_script(&ShellOptions::default(), &["/destroy", "/yes", "/yes"]);

    assert!(out.contains("Destroy the island"));
    assert!(out.contains("1 apps exist only in the island"));
    assert!(out.contains("Diary"));
    assert!(out.contains("island surface closed"));
    assert_eq!(flows.last(), Some(&Flow::Quit));
    assert!(host.device().wiped);
}

#[test]
fn declining_keeps_the_island() {
    let (flows, _, host) = run_script(&ShellOptions::default(), &["/destroy", "/no", "/yes"]);

    assert!(flows.iter().all(|flow| *flow == Flow::Continue));
    assert!(!host.device().wiped);
}

#[test]
fn owner_deactivates_device_owner() {
    let options = ShellOptions { owner: true, ..ShellOptions::default() };
    let (_, out, host) = run_script(&options, &["/destroy", "/yes"]);

    assert!(out.contains("Give up device ownership?"));
    assert_eq!(host.device().device_owner, None);
}

#[test]
fn activate_uses_profile_name() {
    let options = ShellOptions { profile_name: "Work".to_string(), ..ShellOptions::default() };
    let (_, out, host) = run_script(&options, &["/activate"]);

    assert!(out.contains("profile enabled as Work"));
    assert_eq!(host.device().profile_name.as_deref(), Some("Work"));
}

#[test]
fn engine_errors_are_printed() {
    let (flows, out, _) = run_script(&ShellOptions::default(), &["/clone com.example.missing"]);

    assert_eq!(flows, vec![Flow::Continue]);
    assert!(out.contains("error: package not found: com.example.missing"));
}

#[test]
fn quit_stops() {
    let (flows, _, _) = run_script(&ShellOptions::default(), &["/help", "/quit"]);
    assert_eq!(flows, vec![Flow::Continue, Flow::Quit]);
}
