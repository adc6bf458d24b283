use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Appearance, Collider, PhysicsBody};

/// Prefab definitions bundled with the crate.
pub const BUILTIN_PREFABS: &str = include_str!("../assets/prefabs.ron");

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PrefabDef {
    pub name: String,
    pub size: (f32, f32, f32),
    pub color: (f32, f32, f32, f32), // RGBA
    pub collider: Option<(f32, f32, f32)>, // half extents
    pub gravity: bool,
    pub parts: Vec<PartDef>,
}

/// A child piece of a prefab, offset from the root. Parts carry their own
/// colliders so preview neutralization has a real hierarchy to walk.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PartDef {
    pub name: String,
    pub offset: (f32, f32, f32),
    pub size: (f32, f32, f32),
    pub color: (f32, f32, f32, f32),
    pub collider: Option<(f32, f32, f32)>,
}

/// Registry that loads prefab definitions from RON.
#[derive(Resource, Default)]
pub struct PrefabRegistry {
    definitions: HashMap<String, PrefabDef>,
}

impl PrefabRegistry {
    pub fn from_ron(ron_content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let definitions_vec: Vec<PrefabDef> = ron::from_str(ron_content)?;

        let mut definitions = HashMap::new();
        for def in definitions_vec {
            definitions.insert(def.name.clone(), def);
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, name: &str) -> Option<&PrefabDef> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Instantiates the named prefab at the given pose and returns the root
    /// entity, or `None` for an unknown name. Colliders spawn enabled; the
    /// caller decides whether the instance is a live object or a preview.
    pub fn spawn(
        &self,
        commands: &mut Commands,
        name: &str,
        position: Vec3,
        yaw: f32,
    ) -> Option<Entity> {
        let def = self.get(name)?;

        let mut root = commands.spawn((
            Name::new(def.name.clone()),
            Transform {
                translation: position,
                rotation: Quat::from_rotation_y(yaw),
                ..Default::default()
            },
            Appearance {
                size: Vec3::from(def.size),
                color: def.color,
            },
            PhysicsBody {
                gravity: def.gravity,
            },
        ));
        if let Some(half_extents) = def.collider {
            root.insert(Collider::new(Vec3::from(half_extents)));
        }

        root.with_children(|parent| {
            for part in &def.parts {
                let mut piece = parent.spawn((
                    Name::new(part.name.clone()),
                    Transform::from_translation(Vec3::from(part.offset)),
                    Appearance {
                        size: Vec3::from(part.size),
                        color: part.color,
                    },
                    PhysicsBody { gravity: false },
                ));
                if let Some(half_extents) = part.collider {
                    piece.insert(Collider::new(Vec3::from(half_extents)));
                }
            }
        });

        Some(root.id())
    }
}
