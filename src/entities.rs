use bevy::prelude::*;

/// Axis-aligned box collider owned by the host world. Previews keep the
/// component but run with `enabled` false so they never touch anything.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub enabled: bool,
    pub half_extents: Vec3,
}

impl Collider {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            enabled: true,
            half_extents,
        }
    }
}

/// Minimal physics response flag. Gravity is switched off on previews.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub gravity: bool,
}

/// Marks the single transient preview entity of the active build session.
#[derive(Component)]
pub struct PreviewGhost;

/// Marks an entity committed out of a build session.
#[derive(Component, Debug)]
pub struct Placed {
    pub prefab: String,
}

/// Display data carried by prefab-spawned entities. Rendering is host glue:
/// the demo binary dresses these with meshes, headless worlds leave them bare.
#[derive(Component, Debug, Clone, Copy)]
pub struct Appearance {
    pub size: Vec3,
    pub color: (f32, f32, f32, f32),
}
