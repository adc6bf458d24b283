use bevy::prelude::*;
use rand::Rng;

use scaffold::build::{BuildModePlugin, BuildRequest, StartBuild};
use scaffold::configure_system_sets;
use scaffold::entities::{Appearance, PreviewGhost};
use scaffold::input::{
    BindingRegistry, ControlId, EdgeDetector, EdgeInputPlugin, InputActor, InputSystemSet,
    LogicalInput,
};

const PAD_SIZE: f32 = 32.0;
const PAD_RADIUS: f32 = 15.0;

fn main() {
    let mut app = App::new();
    configure_system_sets(&mut app);
    app.add_plugins(DefaultPlugins)
        .add_plugins((EdgeInputPlugin, BuildModePlugin))
        .add_systems(Startup, (setup_scene, register_demo_inputs))
        .add_systems(
            Update,
            (
                demo_build_controls.after(InputSystemSet::Poll),
                dress_props,
            ),
        )
        .run();
}

#[derive(Resource)]
struct DemoControls {
    selections: Vec<(LogicalInput, &'static str)>,
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(12.0, 14.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 9000.0,
            shadows_enabled: true,
            ..Default::default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
    ));
    commands.spawn((
        Name::new("Build Pad"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(PAD_SIZE, PAD_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.18, 0.22, 0.18),
            ..Default::default()
        })),
    ));

    // A few scattered props so placements have something to sit between.
    let mut rng = rand::thread_rng();
    for i in 0..12 {
        let x = rng.gen_range(-14.0..14.0);
        let z = rng.gen_range(-14.0..14.0);
        let scale = rng.gen_range(0.4..1.1);
        commands.spawn((
            Name::new(format!("Rock {i}")),
            Transform::from_xyz(x, scale / 2.0, z),
            Appearance {
                size: Vec3::splat(scale),
                color: (0.4, 0.4, 0.45, 1.0),
            },
        ));
    }

    commands.spawn((Name::new("Local Player"), InputActor));
}

fn register_demo_inputs(
    mut commands: Commands,
    mut detector: ResMut<EdgeDetector>,
    mut registry: ResMut<BindingRegistry>,
) {
    let selections = vec![
        (
            detector.register_single(ControlId::Key(KeyCode::Digit1)),
            "Crate",
        ),
        (
            detector.register_single(ControlId::Key(KeyCode::Digit2)),
            "Turret",
        ),
        (
            detector.register_single(ControlId::Key(KeyCode::Digit3)),
            "Wall",
        ),
        (
            detector.register_single(ControlId::Key(KeyCode::Digit4)),
            "Beacon",
        ),
    ];

    if let Some(help) = detector.register_chord([
        ControlId::Key(KeyCode::ShiftLeft),
        ControlId::Key(KeyCode::KeyH),
    ]) {
        registry.bind(help, |ctx| {
            info!(
                "build demo (actor {:?}): 1-4 start placement, left click commits, \
                 right click cancels, hold R to rotate",
                ctx.actor
            );
        });
    }

    commands.insert_resource(DemoControls { selections });
}

fn demo_build_controls(
    controls: Res<DemoControls>,
    detector: Res<EdgeDetector>,
    mut starts: MessageWriter<StartBuild>,
) {
    for (input, prefab) in &controls.selections {
        if !detector.just_fired(input) {
            continue;
        }
        let name = *prefab;
        starts.write(StartBuild {
            request: BuildRequest::new(name)
                .validator(|_, pose| pose.position.length() < PAD_RADIUS)
                .on_build(move |entity| info!("placed {name} as {entity:?}"))
                .on_cancel(move || info!("placement of {name} cancelled")),
        });
    }
}

/// Rendering glue: gives every prefab-spawned entity a mesh, translucent for
/// preview ghosts. The library itself stays renderer-agnostic.
fn dress_props(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<(Entity, &Appearance), Added<Appearance>>,
    ghosts: Query<(), With<PreviewGhost>>,
    parents: Query<&ChildOf>,
) {
    for (entity, appearance) in &added {
        let ghost = is_ghost_piece(entity, &ghosts, &parents);
        let (r, g, b, a) = appearance.color;
        let material = StandardMaterial {
            base_color: Color::srgba(r, g, b, if ghost { a * 0.45 } else { a }),
            alpha_mode: if ghost {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..Default::default()
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::new(
                appearance.size.x,
                appearance.size.y,
                appearance.size.z,
            ))),
            MeshMaterial3d(materials.add(material)),
        ));
    }
}

fn is_ghost_piece(
    entity: Entity,
    ghosts: &Query<(), With<PreviewGhost>>,
    parents: &Query<&ChildOf>,
) -> bool {
    let mut current = entity;
    loop {
        if ghosts.contains(current) {
            return true;
        }
        match parents.get(current) {
            Ok(child_of) => current = child_of.parent(),
            Err(_) => return false,
        }
    }
}
