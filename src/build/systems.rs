use bevy::prelude::*;
use std::panic::AssertUnwindSafe;

use crate::constants::build::{CURSOR_SPEED, OFF_WORLD, ROTATE_RATE_DEG};
use crate::entities::{Collider, PhysicsBody, Placed, PreviewGhost};
use crate::input::bindings::run_isolated;
use crate::input::{DeviceInputs, EdgeDetector, InputSource};
use crate::prefabs::PrefabRegistry;

use super::config::{stick_direction, InputScheme};
use super::session::{
    ActivePlacement, BuildSession, CancelBuild, CommitBuild, CommitRefused, PreviewPose, StartBuild,
};

/// Screen-space pointer driven by the right stick when a session runs in
/// gamepad mode. Projected into the world exactly like the mouse cursor.
#[derive(Resource, Default)]
pub struct VirtualCursor {
    pub position: Option<Vec2>,
}

/// Opens sessions requested via [`StartBuild`]. Bad requests (unknown prefab,
/// no camera) fail fast here and never reach `Placing`.
pub fn handle_build_requests(
    mut commands: Commands,
    mut starts: ResMut<Messages<StartBuild>>,
    mut session: ResMut<BuildSession>,
    mut detector: ResMut<EdgeDetector>,
    mut cursor: ResMut<VirtualCursor>,
    registry: Option<Res<PrefabRegistry>>,
    cameras: Query<(), With<Camera>>,
    windows: Query<&Window>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
) {
    for StartBuild { request } in starts.drain() {
        let Some(registry) = registry.as_deref() else {
            error!("cannot start build: prefab registry not initialized");
            continue;
        };
        if !registry.contains(&request.prefab) {
            error!("cannot start build: unknown prefab {:?}", request.prefab);
            continue;
        }
        if cameras.is_empty() {
            error!("cannot start build: no active camera");
            continue;
        }

        // Implicit cancel: the running session resolves before its
        // replacement spawns, so orphan previews cannot accumulate.
        cancel_active(&mut session, &mut commands);

        let Some(preview) = registry.spawn(&mut commands, &request.prefab, Vec3::ZERO, 0.0)
        else {
            continue;
        };
        commands.entity(preview).insert(PreviewGhost);

        let scheme = match request.input {
            Some(config) => InputScheme::Custom(config),
            None => InputScheme::Default,
        };
        let confirm = scheme.confirm_inputs();
        let cancel = scheme.cancel_inputs();
        let source = DeviceInputs {
            keyboard: &keyboard,
            mouse: &mouse,
            gamepads: gamepads.iter().collect(),
        };
        for input in confirm.iter().chain(cancel.iter()) {
            detector.register(input.clone());
            // A control held while the session opens (say, the click that
            // triggered it) must be released and pressed again before it can
            // resolve the session.
            detector.prime(input, &source);
        }

        if scheme.gamepad_cursor() {
            let center = windows
                .single()
                .ok()
                .map_or(Vec2::ZERO, |window| {
                    Vec2::new(window.width() / 2.0, window.height() / 2.0)
                });
            cursor.position = Some(center);
        }

        let mut hooks = request.hooks;
        if let Some(hook) = hooks.on_spawned.as_mut() {
            run_isolated(|| hook(preview), || "build on_spawned hook".to_string());
        }

        session.begin(ActivePlacement {
            prefab: request.prefab,
            preview,
            pose: PreviewPose::default(),
            height_offset: request.height_offset,
            validator: request.validator,
            hooks,
            scheme,
            confirm,
            cancel,
        });
    }
}

/// Walks a freshly spawned preview and switches off every collider and
/// physics response in its hierarchy, so the ghost never touches the world.
pub fn neutralize_preview_physics(
    ghosts: Query<Entity, Added<PreviewGhost>>,
    children: Query<&Children>,
    mut colliders: Query<&mut Collider>,
    mut bodies: Query<&mut PhysicsBody>,
) {
    for root in &ghosts {
        for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
            if let Ok(mut collider) = colliders.get_mut(entity) {
                collider.enabled = false;
            }
            if let Ok(mut body) = bodies.get_mut(entity) {
                body.gravity = false;
            }
        }
    }
}

/// Nudges the virtual cursor from the right stick while a gamepad session is
/// active. Missing gamepad mid-session degrades to a logged skip.
pub fn drive_virtual_cursor(
    session: Res<BuildSession>,
    mut cursor: ResMut<VirtualCursor>,
    gamepads: Query<&Gamepad>,
    time: Res<Time>,
) {
    let Some(active) = session.active() else {
        return;
    };
    if !active.wants_virtual_cursor() {
        return;
    }
    let Some(gamepad) = gamepads.iter().next() else {
        warn!("gamepad cursor requested but no gamepad is connected; skipping this tick");
        return;
    };

    let direction = stick_direction(gamepad.right_stick());
    if direction == Vec2::ZERO {
        return;
    }
    let position = cursor.position.unwrap_or(Vec2::ZERO);
    // Viewport y grows downward; stick up moves the pointer up the screen.
    let step = Vec2::new(direction.x, -direction.y) * CURSOR_SPEED * time.delta_secs();
    cursor.position = Some(position + step);
}

/// Repositions the preview every tick from a world-space projection of the
/// current pointer.
pub fn update_preview_pose(
    mut session: ResMut<BuildSession>,
    cursor: Res<VirtualCursor>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut ghosts: Query<&mut Transform, With<PreviewGhost>>,
) {
    let Some(active) = session.active_mut() else {
        return;
    };

    let pointer = if active.wants_virtual_cursor() {
        cursor.position
    } else {
        windows.single().ok().and_then(Window::cursor_position)
    };
    let ground = pointer.and_then(|point| {
        let (camera, camera_transform) = cameras.single().ok()?;
        project_to_ground(camera, camera_transform, point)
    });

    // A ray miss is a defined fallback, not a failure: the preview parks
    // off-world until the pointer finds ground again.
    let base = ground.unwrap_or(OFF_WORLD);
    active.pose.position = base + Vec3::Y * active.height_offset;
    if let Ok(mut transform) = ghosts.get_mut(active.preview) {
        transform.translation = active.pose.position;
    }
}

fn project_to_ground(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    pointer: Vec2,
) -> Option<Vec3> {
    let ray = camera.viewport_to_world(camera_transform, pointer).ok()?;
    let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
    Some(ray.get_point(distance))
}

/// Turns the preview around the up axis while a rotate control is held, at a
/// fixed angular rate scaled by elapsed tick time.
pub fn rotate_preview(
    mut session: ResMut<BuildSession>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
    time: Res<Time>,
    mut ghosts: Query<&mut Transform, With<PreviewGhost>>,
) {
    let Some(active) = session.active_mut() else {
        return;
    };

    let step = ROTATE_RATE_DEG.to_radians() * time.delta_secs();
    let mut turned = false;
    let mut notify = false;
    match &active.scheme {
        InputScheme::Custom(config) => {
            let source = DeviceInputs {
                keyboard: &keyboard,
                mouse: &mouse,
                gamepads: gamepads.iter().collect(),
            };
            if source.is_active(config.rotate_left) {
                active.pose.yaw -= step;
                turned = true;
            } else if source.is_active(config.rotate_right) {
                active.pose.yaw += step;
                turned = true;
            }
        }
        // Default scheme: rotate key, or either shoulder bumper with the
        // direction depending on which one.
        InputScheme::Default => {
            if keyboard.pressed(KeyCode::KeyR) {
                active.pose.yaw += step;
                turned = true;
                notify = true;
            } else if gamepads
                .iter()
                .any(|pad| pad.pressed(GamepadButton::RightTrigger))
            {
                active.pose.yaw += step;
                turned = true;
                notify = true;
            } else if gamepads
                .iter()
                .any(|pad| pad.pressed(GamepadButton::LeftTrigger))
            {
                active.pose.yaw -= step;
                turned = true;
                notify = true;
            }
        }
    }

    if !turned {
        return;
    }
    if let Ok(mut transform) = ghosts.get_mut(active.preview) {
        transform.rotation = Quat::from_rotation_y(active.pose.yaw);
    }
    if notify {
        let preview = active.preview;
        if let Some(hook) = active.hooks.on_rotated.as_mut() {
            run_isolated(|| hook(preview), || "build on_rotated hook".to_string());
        }
    }
}

/// Resolves the session from this tick's confirm/cancel edges and any
/// programmatic [`CommitBuild`]/[`CancelBuild`] messages. Confirm is checked
/// first; both while idle are no-ops.
pub fn resolve_session(
    mut commands: Commands,
    mut session: ResMut<BuildSession>,
    registry: Option<Res<PrefabRegistry>>,
    detector: Res<EdgeDetector>,
    mut cancels: MessageReader<CancelBuild>,
    mut commits: MessageReader<CommitBuild>,
    mut refusals: MessageWriter<CommitRefused>,
) {
    let cancel_requested = cancels.read().count() > 0;
    let commit_requested = commits.read().count() > 0;

    if !session.is_placing() {
        return;
    }

    let confirm_edge = session
        .active()
        .is_some_and(|active| active.confirm.iter().any(|input| detector.just_fired(input)));
    let cancel_edge = session
        .active()
        .is_some_and(|active| active.cancel.iter().any(|input| detector.just_fired(input)));

    if confirm_edge || commit_requested {
        try_commit(&mut commands, &mut session, registry.as_deref(), &mut refusals);
    }
    if session.is_placing() && (cancel_edge || cancel_requested) {
        cancel_active(&mut session, &mut commands);
    }
}

fn try_commit(
    commands: &mut Commands,
    session: &mut BuildSession,
    registry: Option<&PrefabRegistry>,
    refusals: &mut MessageWriter<CommitRefused>,
) {
    let accepted = {
        let Some(active) = session.active() else {
            return;
        };
        match &active.validator {
            Some(validator) => {
                let preview = active.preview;
                let pose = active.pose;
                std::panic::catch_unwind(AssertUnwindSafe(|| validator(preview, &pose)))
                    .unwrap_or_else(|_| {
                        error!("placement validator panicked; treating the attempt as refused");
                        false
                    })
            }
            None => true,
        }
    };

    if !accepted {
        // Refusal is silent for the session itself: it stays open and the
        // preview stays where it is. Listeners may react to the message.
        if let Some(active) = session.active() {
            refusals.write(CommitRefused {
                prefab: active.prefab.clone(),
                position: active.pose.position,
            });
        }
        return;
    }

    let Some(mut active) = session.take() else {
        return;
    };
    let placed = registry.and_then(|registry| {
        registry.spawn(commands, &active.prefab, active.pose.position, active.pose.yaw)
    });
    commands.entity(active.preview).despawn();

    match placed {
        Some(entity) => {
            commands.entity(entity).insert(Placed {
                prefab: active.prefab.clone(),
            });
            if let Some(hook) = active.hooks.on_build.as_mut() {
                run_isolated(|| hook(entity), || "build on_build hook".to_string());
            }
        }
        None => error!(
            "prefab {:?} vanished from the registry mid-session; nothing was placed",
            active.prefab
        ),
    }
}

/// Destroys the preview and returns to idle. The despawn and the state
/// transition happen before the hook runs, so a failing hook cannot leave an
/// orphan preview behind. Returns false while idle.
pub(crate) fn cancel_active(session: &mut BuildSession, commands: &mut Commands) -> bool {
    let Some(mut active) = session.take() else {
        return false;
    };
    commands.entity(active.preview).despawn();
    if let Some(hook) = active.hooks.on_cancel.as_mut() {
        run_isolated(|| hook(), || "build on_cancel hook".to_string());
    }
    true
}
