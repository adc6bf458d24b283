use bevy::prelude::*;
use std::collections::HashSet;

use super::controls::{ControlId, LogicalInput};
use super::source::InputSource;

/// Turns raw per-tick pressed state into discrete press edges for registered
/// single inputs and chords.
///
/// Exactly two active-set generations exist: the one being built this tick
/// and the completed one from the previous tick. They are swapped, never
/// merged, at the end of each poll, so a continuously-held input fires its
/// edge exactly once and listeners never observe a half-updated generation.
#[derive(Resource, Default)]
pub struct EdgeDetector {
    registered: Vec<LogicalInput>,
    previous: HashSet<LogicalInput>,
    current: HashSet<LogicalInput>,
    fired: Vec<LogicalInput>,
}

impl EdgeDetector {
    pub fn register_single(&mut self, control: ControlId) -> LogicalInput {
        self.register(LogicalInput::single(control))
    }

    /// Registers a chord that fires only when every member is pressed in the
    /// same tick. Returns `None` for an empty chord.
    pub fn register_chord(
        &mut self,
        controls: impl IntoIterator<Item = ControlId>,
    ) -> Option<LogicalInput> {
        LogicalInput::chord(controls).map(|input| self.register(input))
    }

    /// Idempotent: re-registering an input (or the same chord in a different
    /// member order) keeps the existing registration.
    pub fn register(&mut self, input: LogicalInput) -> LogicalInput {
        if !self.registered.contains(&input) {
            self.registered.push(input.clone());
        }
        input
    }

    /// Seeds the previous generation with an input whose controls are already
    /// held, so registering mid-press does not fire a spurious edge. The
    /// control must be released and pressed again to become eligible.
    pub fn prime(&mut self, input: &LogicalInput, source: &dyn InputSource) {
        if input.members().iter().all(|&c| source.is_active(c)) {
            self.previous.insert(input.clone());
        }
    }

    /// Evaluates every registered input against `source` and returns the ones
    /// whose rising edge fired this tick. Chord evaluation short-circuits on
    /// the first inactive member.
    pub fn poll(&mut self, source: &dyn InputSource) -> &[LogicalInput] {
        self.current.clear();
        self.fired.clear();

        for input in &self.registered {
            let active = input.members().iter().all(|&c| source.is_active(c));
            if !active {
                continue;
            }
            if !self.previous.contains(input) {
                self.fired.push(input.clone());
            }
            self.current.insert(input.clone());
        }

        // Generation swap: this tick's active set becomes next tick's
        // reference, and the old reference is recycled as scratch.
        std::mem::swap(&mut self.previous, &mut self.current);
        &self.fired
    }

    /// Inputs whose edge fired during the most recent poll.
    pub fn fired(&self) -> &[LogicalInput] {
        &self.fired
    }

    pub fn just_fired(&self, input: &LogicalInput) -> bool {
        self.fired.contains(input)
    }
}
