use bevy::prelude::*;

use crate::constants::build::STICK_THRESHOLD;
use crate::input::{ControlId, LogicalInput};

/// Explicit control assignments for one build session. Without one, the
/// default scheme below applies.
#[derive(Clone, Copy, Debug)]
pub struct BuildInputConfig {
    pub confirm: ControlId,
    pub cancel: ControlId,
    pub rotate_left: ControlId,
    pub rotate_right: ControlId,
    /// Drive the pointer from the right stick instead of the mouse.
    pub gamepad_cursor: bool,
}

/// How an active session reads its controls.
#[derive(Clone, Debug)]
pub(crate) enum InputScheme {
    /// Mouse + keyboard with gamepad equivalents accepted alongside.
    Default,
    Custom(BuildInputConfig),
}

impl InputScheme {
    pub(crate) fn confirm_inputs(&self) -> Vec<LogicalInput> {
        match self {
            Self::Default => vec![
                LogicalInput::single(ControlId::Mouse(MouseButton::Left)),
                LogicalInput::single(ControlId::Pad(GamepadButton::South)),
            ],
            Self::Custom(config) => vec![LogicalInput::single(config.confirm)],
        }
    }

    pub(crate) fn cancel_inputs(&self) -> Vec<LogicalInput> {
        match self {
            Self::Default => vec![
                LogicalInput::single(ControlId::Mouse(MouseButton::Right)),
                LogicalInput::single(ControlId::Pad(GamepadButton::RightTrigger2)),
            ],
            Self::Custom(config) => vec![LogicalInput::single(config.cancel)],
        }
    }

    pub(crate) fn gamepad_cursor(&self) -> bool {
        matches!(self, Self::Custom(config) if config.gamepad_cursor)
    }
}

/// Collapses analog stick deflection to a digital direction, matching how the
/// cursor responds to a d-pad style nudge rather than stick magnitude.
pub(crate) fn stick_direction(stick: Vec2) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if stick.y > STICK_THRESHOLD {
        direction.y = 1.0;
    } else if stick.y < -STICK_THRESHOLD {
        direction.y = -1.0;
    }
    if stick.x > STICK_THRESHOLD {
        direction.x = 1.0;
    } else if stick.x < -STICK_THRESHOLD {
        direction.x = -1.0;
    }
    direction
}
