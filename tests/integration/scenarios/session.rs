use bevy::prelude::*;

use scaffold::build::{
    BuildInputConfig, BuildRequest, BuildSession, CancelBuild, CommitBuild, CommitRefused,
    StartBuild,
};
use scaffold::constants::build::OFF_WORLD;
use scaffold::entities::{Collider, PhysicsBody, Placed};
use scaffold::input::ControlId;

use crate::harness::*;

fn start(app: &mut App, request: BuildRequest) {
    app.world_mut().write_message(StartBuild { request });
    tick(app);
}

#[test]
fn start_spawns_a_neutralized_preview() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Turret")));

    assert_placing(&app);
    assert_eq!(probe.spawned(), 1);
    assert_eq!(preview_count(&mut app), 1);

    // Every collider in the cloned hierarchy (root plus both turret parts)
    // must be switched off.
    let mut colliders = app.world_mut().query::<&Collider>();
    let states: Vec<bool> = colliders.iter(app.world()).map(|c| c.enabled).collect();
    assert_eq!(states.len(), 3, "turret should clone three colliders");
    assert!(states.iter().all(|enabled| !enabled));
}

#[test]
fn preview_physics_response_is_disabled() {
    let mut app = headless_app();
    tick(&mut app);

    start(&mut app, BuildRequest::new("Crate"));

    let preview = preview_entities(&mut app)[0];
    let body = app.world().get::<PhysicsBody>(preview).unwrap();
    assert!(!body.gravity, "preview must not respond to gravity");
}

#[test]
fn start_while_placing_cancels_the_previous_session_once() {
    let mut app = headless_app();
    tick(&mut app);

    let probe_x = HookProbe::new();
    start(&mut app, probe_x.attach(BuildRequest::new("Crate")));
    let old_preview = preview_entities(&mut app)[0];

    let probe_y = HookProbe::new();
    start(&mut app, probe_y.attach(BuildRequest::new("Turret")));

    assert_eq!(probe_x.cancelled(), 1, "old session must cancel exactly once");
    assert_eq!(probe_y.spawned(), 1);
    assert_eq!(preview_count(&mut app), 1, "old preview must be destroyed");
    assert_ne!(preview_entities(&mut app)[0], old_preview);

    let session = app.world().resource::<BuildSession>();
    assert_eq!(session.active().unwrap().prefab(), "Turret");

    // A few more ticks must not re-fire the old cancel hook.
    tick_n(&mut app, 3);
    assert_eq!(probe_x.cancelled(), 1);
}

#[test]
fn confirm_edge_commits_at_the_preview_pose() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Crate")));
    tick(&mut app);

    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);

    assert_idle(&app);
    assert_eq!(preview_count(&mut app), 0);
    assert_eq!(probe.built(), 1);

    let placed = placed_entities(&mut app);
    assert_eq!(placed.len(), 1, "exactly one persistent entity");
    assert_eq!(probe.built_entity(), Some(placed[0]));

    let world = app.world();
    assert_eq!(world.get::<Placed>(placed[0]).unwrap().prefab, "Crate");
    // No window means the pointer never resolves, so the preview sat at the
    // off-world fallback; the commit must land exactly there.
    assert_eq!(
        world.get::<Transform>(placed[0]).unwrap().translation,
        OFF_WORLD
    );
    // The committed instance is a live object again.
    assert!(world.get::<Collider>(placed[0]).unwrap().enabled);
    assert!(world.get::<PhysicsBody>(placed[0]).unwrap().gravity);
}

#[test]
fn refused_validator_keeps_the_session_open() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(
        &mut app,
        probe.attach(BuildRequest::new("Crate").validator(|_, _| false)),
    );

    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);

    assert_placing(&app);
    assert_eq!(preview_count(&mut app), 1);
    assert_eq!(probe.built(), 0);
    assert!(
        !app.world().resource::<Messages<CommitRefused>>().is_empty(),
        "refusal notification missing"
    );

    // Re-pressing re-evaluates the validator and refuses again.
    release_mouse(&mut app, MouseButton::Left);
    tick(&mut app);
    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);
    assert_placing(&app);
    assert_eq!(probe.built(), 0);
}

#[test]
fn accepting_validator_sees_the_preview_pose() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(
        &mut app,
        probe.attach(
            BuildRequest::new("Crate")
                .height_offset(2.0)
                .validator(|_, pose| pose.position == OFF_WORLD + Vec3::Y * 2.0),
        ),
    );
    tick(&mut app);

    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);
    assert_idle(&app);
    assert_eq!(probe.built(), 1);
}

#[test]
fn commit_message_resolves_programmatically() {
    let mut app = headless_app();
    tick(&mut app);

    start(&mut app, BuildRequest::new("Wall"));
    app.world_mut().write_message(CommitBuild);
    tick(&mut app);

    assert_idle(&app);
    assert_eq!(placed_count(&mut app), 1);
}

#[test]
fn cancel_destroys_the_preview_and_is_idempotent() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Crate")));

    app.world_mut().write_message(CancelBuild);
    tick(&mut app);

    assert_idle(&app);
    assert_eq!(preview_count(&mut app), 0);
    assert_eq!(probe.cancelled(), 1);
    assert_eq!(probe.built(), 0);

    // A second cancel is a no-op.
    app.world_mut().write_message(CancelBuild);
    tick(&mut app);
    assert_idle(&app);
    assert_eq!(probe.cancelled(), 1);
}

#[test]
fn right_click_cancels_under_the_default_scheme() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Crate")));
    tick(&mut app);

    press_mouse(&mut app, MouseButton::Right);
    tick(&mut app);

    assert_idle(&app);
    assert_eq!(probe.cancelled(), 1);
    assert_eq!(preview_count(&mut app), 0);
}

#[test]
fn confirm_held_across_start_requires_a_fresh_press() {
    let mut app = headless_app();
    tick(&mut app);

    // The button goes down before the session opens (say, the UI click that
    // triggered it) and stays down.
    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Crate")));
    tick_n(&mut app, 4);
    assert_placing(&app);
    assert_eq!(probe.built(), 0, "held confirm must not auto-commit");

    release_mouse(&mut app, MouseButton::Left);
    tick(&mut app);
    press_mouse(&mut app, MouseButton::Left);
    tick(&mut app);
    assert_idle(&app);
    assert_eq!(probe.built(), 1);
}

#[test]
fn unknown_prefab_fails_fast_at_start() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("NoSuchPrefab")));

    assert_idle(&app);
    assert_eq!(preview_count(&mut app), 0);
    assert_eq!(probe.spawned(), 0);
}

#[test]
fn bad_start_does_not_disturb_a_running_session() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    start(&mut app, probe.attach(BuildRequest::new("Crate")));

    start(&mut app, BuildRequest::new("NoSuchPrefab"));
    assert_placing(&app);
    assert_eq!(probe.cancelled(), 0, "failed start must not cancel anything");
    assert_eq!(preview_count(&mut app), 1);
}

#[test]
fn panicking_cancel_hook_still_resolves_the_session() {
    let mut app = headless_app();
    tick(&mut app);

    start(
        &mut app,
        BuildRequest::new("Crate").on_cancel(|| panic!("cancel hook blew up")),
    );

    app.world_mut().write_message(CancelBuild);
    tick(&mut app);

    assert_idle(&app);
    assert_eq!(preview_count(&mut app), 0, "preview must die despite the hook");

    // The machine is reusable afterwards.
    start(&mut app, BuildRequest::new("Wall"));
    assert_placing(&app);
}

#[test]
fn preview_parks_off_world_without_a_pointer() {
    let mut app = headless_app();
    tick(&mut app);

    start(&mut app, BuildRequest::new("Crate").height_offset(2.0));
    tick(&mut app);

    let pose = session_pose(&app).unwrap();
    assert_eq!(pose.position, OFF_WORLD + Vec3::Y * 2.0);

    let preview = preview_entities(&mut app)[0];
    assert_eq!(
        app.world().get::<Transform>(preview).unwrap().translation,
        pose.position
    );
}

#[test]
fn custom_scheme_overrides_the_default_controls() {
    let mut app = headless_app();
    tick(&mut app);

    let probe = HookProbe::new();
    let config = BuildInputConfig {
        confirm: ControlId::Key(KeyCode::Enter),
        cancel: ControlId::Key(KeyCode::Escape),
        rotate_left: ControlId::Key(KeyCode::KeyQ),
        rotate_right: ControlId::Key(KeyCode::KeyE),
        gamepad_cursor: false,
    };
    start(
        &mut app,
        probe.attach(BuildRequest::new("Crate").input_config(config)),
    );
    tick(&mut app);

    // The default confirm control means nothing to this session.
    press_mouse(&mut app, MouseButton::Left);
    tick_n(&mut app, 2);
    assert_placing(&app);
    assert_eq!(probe.built(), 0);

    press_key(&mut app, KeyCode::Enter);
    tick(&mut app);
    assert_idle(&app);
    assert_eq!(probe.built(), 1);
}

#[test]
fn gamepad_cursor_without_a_gamepad_degrades_gracefully() {
    let mut app = headless_app();
    tick(&mut app);

    let config = BuildInputConfig {
        confirm: ControlId::Key(KeyCode::Enter),
        cancel: ControlId::Key(KeyCode::Escape),
        rotate_left: ControlId::Key(KeyCode::KeyQ),
        rotate_right: ControlId::Key(KeyCode::KeyE),
        gamepad_cursor: true,
    };
    start(&mut app, BuildRequest::new("Crate").input_config(config));

    // No gamepad is connected; the session must keep ticking on the
    // fallback pose instead of crashing.
    tick_n(&mut app, 5);
    assert_placing(&app);
    assert_eq!(session_pose(&app).unwrap().position, OFF_WORLD);
}
