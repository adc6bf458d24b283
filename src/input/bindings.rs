use bevy::prelude::*;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use super::controls::LogicalInput;

/// What a listener learns about the edge that reached it.
pub struct EdgeContext {
    pub input: LogicalInput,
    /// Entity carrying [`super::InputActor`], if one exists.
    pub actor: Option<Entity>,
}

type EdgeCallback = Box<dyn FnMut(&EdgeContext) + Send + Sync>;

/// Handle returned by [`BindingRegistry::bind`]. Closures have no identity of
/// their own, so unbinding goes through this instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// Maps logical inputs to ordered listener lists. Each registration is
/// tracked individually; several subsystems may bind the same input without
/// sharing anything.
#[derive(Resource, Default)]
pub struct BindingRegistry {
    bindings: HashMap<LogicalInput, Vec<(BindingId, EdgeCallback)>>,
    next_id: u64,
}

impl BindingRegistry {
    pub fn bind(
        &mut self,
        input: LogicalInput,
        callback: impl FnMut(&EdgeContext) + Send + Sync + 'static,
    ) -> BindingId {
        self.next_id += 1;
        let id = BindingId(self.next_id);
        self.bindings
            .entry(input)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// No-op if the id was never bound or was already unbound.
    pub fn unbind(&mut self, id: BindingId) {
        for listeners in self.bindings.values_mut() {
            listeners.retain(|(bound, _)| *bound != id);
        }
    }

    /// Invokes every listener bound to `input` in registration order. A
    /// listener that panics is logged and skipped; the remaining listeners
    /// and the rest of the tick still run.
    pub fn dispatch(&mut self, input: &LogicalInput, actor: Option<Entity>) {
        let Some(listeners) = self.bindings.get_mut(input) else {
            return;
        };
        let ctx = EdgeContext {
            input: input.clone(),
            actor,
        };
        for (id, callback) in listeners.iter_mut() {
            let id = *id;
            run_isolated(
                || callback(&ctx),
                || format!("input listener {id:?} for {:?}", ctx.input),
            );
        }
    }
}

/// Runs `f`, catching a panic so one failing listener cannot take down the
/// dispatch loop or leave a session half-resolved.
pub(crate) fn run_isolated(f: impl FnOnce(), label: impl FnOnce() -> String) {
    if std::panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        error!("{} panicked; continuing", label());
    }
}
