use bevy::prelude::*;
use std::hash::{DefaultHasher, Hash, Hasher};

/// A single physical control on any supported device. A `Pad` control with no
/// gamepad connected simply reads as inactive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlId {
    Key(KeyCode),
    Mouse(MouseButton),
    Pad(GamepadButton),
}

/// A named control or a chord of controls, identified structurally: two
/// chords with the same members in different declaration order are the same
/// logical input.
#[derive(Clone, Debug)]
pub struct LogicalInput {
    members: Vec<ControlId>,
}

impl LogicalInput {
    pub fn single(control: ControlId) -> Self {
        Self {
            members: vec![control],
        }
    }

    /// Builds a chord from the given controls, dropping duplicates.
    /// Returns `None` for an empty chord.
    pub fn chord(controls: impl IntoIterator<Item = ControlId>) -> Option<Self> {
        let mut members: Vec<ControlId> = Vec::new();
        for control in controls {
            if !members.contains(&control) {
                members.push(control);
            }
        }
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    pub fn members(&self) -> &[ControlId] {
        &self.members
    }

    pub fn is_chord(&self) -> bool {
        self.members.len() > 1
    }
}

impl PartialEq for LogicalInput {
    fn eq(&self, other: &Self) -> bool {
        // Members are deduplicated, so set equality reduces to a length check
        // plus containment. Chords are short; quadratic is fine.
        self.members.len() == other.members.len()
            && self.members.iter().all(|m| other.members.contains(m))
    }
}

impl Eq for LogicalInput {}

impl Hash for LogicalInput {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: combine standalone member hashes with XOR so the
        // hash agrees with the order-insensitive equality above.
        let mut combined = 0u64;
        for member in &self.members {
            let mut hasher = DefaultHasher::new();
            member.hash(&mut hasher);
            combined ^= hasher.finish();
        }
        state.write_u64(combined);
        state.write_usize(self.members.len());
    }
}
