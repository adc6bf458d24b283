pub mod config;
pub mod session;
pub mod systems;

pub use config::BuildInputConfig;
pub use session::{
    BuildRequest, BuildSession, CancelBuild, CommitBuild, CommitRefused, PlacementValidator,
    PreviewPose, SessionHooks, StartBuild,
};
pub use systems::VirtualCursor;

use bevy::prelude::*;

use crate::prefabs::{PrefabRegistry, BUILTIN_PREFABS};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum BuildSystemSet {
    Requests,
    Cursor,
    Preview,
    Resolve,
}

fn configure_build_system_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            BuildSystemSet::Requests,
            BuildSystemSet::Cursor,
            BuildSystemSet::Preview,
            BuildSystemSet::Resolve,
        )
            .chain()
            .in_set(crate::GameplaySet::BuildUpdate),
    );
}

pub fn setup(mut commands: Commands) {
    match PrefabRegistry::from_ron(BUILTIN_PREFABS) {
        Ok(registry) => commands.insert_resource(registry),
        Err(err) => {
            error!("failed to parse built-in prefab definitions: {err}");
            commands.insert_resource(PrefabRegistry::default());
        }
    }
}

pub struct BuildModePlugin;

impl Plugin for BuildModePlugin {
    fn build(&self, app: &mut App) {
        configure_build_system_sets(app);

        app.init_resource::<BuildSession>()
            .init_resource::<VirtualCursor>()
            .add_message::<StartBuild>()
            .add_message::<CancelBuild>()
            .add_message::<CommitBuild>()
            .add_message::<CommitRefused>()
            .add_systems(Startup, setup)
            .add_systems(
                Update,
                (
                    (
                        systems::handle_build_requests,
                        systems::neutralize_preview_physics,
                    )
                        .chain()
                        .in_set(BuildSystemSet::Requests),
                    systems::drive_virtual_cursor.in_set(BuildSystemSet::Cursor),
                    (systems::update_preview_pose, systems::rotate_preview)
                        .chain()
                        .in_set(BuildSystemSet::Preview),
                    systems::resolve_session.in_set(BuildSystemSet::Resolve),
                ),
            );
    }
}
