// Library target exists for the demo binary and integration tests — suppress
// library-API lints that don't apply to a game-extension crate.
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::implicit_hasher
)]

pub mod build;
pub mod constants;
pub mod entities;
pub mod input;
pub mod prefabs;

#[cfg(debug_assertions)]
pub mod invariants;

use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameplaySet {
    InputUpdate,
    BuildUpdate,
}

pub fn configure_system_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (GameplaySet::InputUpdate, GameplaySet::BuildUpdate).chain(),
    );
}
