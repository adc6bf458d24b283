use bevy::prelude::*;

use super::bindings::BindingRegistry;
use super::edge::EdgeDetector;
use super::source::DeviceInputs;

/// Marks the entity handed to edge listeners as dispatch context (the local
/// player, typically). With none spawned, listeners receive no actor.
#[derive(Component)]
pub struct InputActor;

/// Polls raw device state and records which registered inputs fired a rising
/// edge this tick. Runs before anything that consumes edges.
pub fn poll_edges(
    mut detector: ResMut<EdgeDetector>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
) {
    let source = DeviceInputs {
        keyboard: &keyboard,
        mouse: &mouse,
        gamepads: gamepads.iter().collect(),
    };
    detector.poll(&source);
}

/// Routes every fired edge through the binding registry.
pub fn dispatch_edges(
    detector: Res<EdgeDetector>,
    mut registry: ResMut<BindingRegistry>,
    actors: Query<Entity, With<InputActor>>,
) {
    let actor = actors.iter().next();
    for input in detector.fired() {
        registry.dispatch(input, actor);
    }
}
