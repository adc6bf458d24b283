use bevy::prelude::*;

use crate::build::BuildSession;
use crate::entities::{Collider, PreviewGhost};

pub struct InvariantPlugin;

impl Plugin for InvariantPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (check_single_preview, check_session_preview_link),
        );
    }
}

fn report_violation(message: &str) {
    let msg = format!("INVARIANT VIOLATION: {message}");
    if cfg!(test) {
        #[allow(clippy::panic)]
        {
            panic!("{msg}");
        }
    } else {
        error!("{msg}");
    }
}

fn check_single_preview(ghosts: Query<Entity, With<PreviewGhost>>) {
    if ghosts.iter().count() > 1 {
        report_violation("more than one preview ghost exists");
    }
}

fn check_session_preview_link(
    session: Res<BuildSession>,
    ghosts: Query<Entity, With<PreviewGhost>>,
    colliders: Query<&Collider>,
) {
    match session.active() {
        Some(active) => {
            if ghosts.get(active.preview()).is_err() {
                report_violation("placing session without a live preview ghost");
            }
            if let Ok(collider) = colliders.get(active.preview()) {
                if collider.enabled {
                    report_violation("preview ghost collider left enabled");
                }
            }
        }
        None => {
            if ghosts.iter().next().is_some() {
                report_violation("preview ghost outlived its session");
            }
        }
    }
}
