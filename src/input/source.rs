use bevy::prelude::*;

use super::controls::ControlId;

/// Live device state the edge detector polls each tick. Absent devices and
/// unrecognized controls read as inactive, never as an error.
pub trait InputSource {
    fn is_active(&self, control: ControlId) -> bool;
}

/// [`InputSource`] over Bevy's device resources. Reads are idempotent, so the
/// same control can back several registered inputs without a per-tick cache.
pub struct DeviceInputs<'a> {
    pub keyboard: &'a ButtonInput<KeyCode>,
    pub mouse: &'a ButtonInput<MouseButton>,
    pub gamepads: Vec<&'a Gamepad>,
}

impl InputSource for DeviceInputs<'_> {
    fn is_active(&self, control: ControlId) -> bool {
        match control {
            ControlId::Key(key) => self.keyboard.pressed(key),
            ControlId::Mouse(button) => self.mouse.pressed(button),
            ControlId::Pad(button) => self.gamepads.iter().any(|pad| pad.pressed(button)),
        }
    }
}
