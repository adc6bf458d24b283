pub mod bindings;
pub mod controls;
pub mod edge;
pub mod source;
pub mod systems;

pub use bindings::{BindingId, BindingRegistry, EdgeContext};
pub use controls::{ControlId, LogicalInput};
pub use edge::EdgeDetector;
pub use source::{DeviceInputs, InputSource};
pub use systems::InputActor;

use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum InputSystemSet {
    Poll,
    Dispatch,
}

fn configure_input_system_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (InputSystemSet::Poll, InputSystemSet::Dispatch)
            .chain()
            .in_set(crate::GameplaySet::InputUpdate),
    );
}

pub struct EdgeInputPlugin;

impl Plugin for EdgeInputPlugin {
    fn build(&self, app: &mut App) {
        configure_input_system_sets(app);

        app.init_resource::<EdgeDetector>()
            .init_resource::<BindingRegistry>()
            // Present under DefaultPlugins already; headless hosts get them here.
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_systems(
                Update,
                (
                    systems::poll_edges.in_set(InputSystemSet::Poll),
                    systems::dispatch_edges.in_set(InputSystemSet::Dispatch),
                ),
            );
    }
}
