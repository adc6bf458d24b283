use bevy::prelude::*;

use super::config::{BuildInputConfig, InputScheme};
use crate::input::LogicalInput;

pub type EntityHook = Box<dyn FnMut(Entity) + Send + Sync>;
pub type CancelHook = Box<dyn FnMut() + Send + Sync>;

/// Pure accept/reject predicate over the preview at confirm time. Absent
/// means every pose is a legal commit target. Re-evaluated on every confirm
/// edge, so it must not mutate anything it reads.
pub type PlacementValidator = Box<dyn Fn(Entity, &PreviewPose) -> bool + Send + Sync>;

/// Lifecycle callbacks a caller hands to [`StartBuild`]. Each is optional and
/// each runs isolated: a panicking hook is logged and never corrupts the
/// session state machine.
#[derive(Default)]
pub struct SessionHooks {
    pub on_spawned: Option<EntityHook>,
    pub on_build: Option<EntityHook>,
    pub on_cancel: Option<CancelHook>,
    pub on_rotated: Option<EntityHook>,
}

/// World pose of the preview: ground position plus yaw around the up axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PreviewPose {
    pub position: Vec3,
    pub yaw: f32,
}

/// Everything needed to open a placement session.
pub struct BuildRequest {
    pub prefab: String,
    pub height_offset: f32,
    pub validator: Option<PlacementValidator>,
    pub hooks: SessionHooks,
    pub input: Option<BuildInputConfig>,
}

impl BuildRequest {
    pub fn new(prefab: impl Into<String>) -> Self {
        Self {
            prefab: prefab.into(),
            height_offset: 0.0,
            validator: None,
            hooks: SessionHooks::default(),
            input: None,
        }
    }

    pub fn height_offset(mut self, offset: f32) -> Self {
        self.height_offset = offset;
        self
    }

    pub fn validator(
        mut self,
        validator: impl Fn(Entity, &PreviewPose) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn on_spawned(mut self, hook: impl FnMut(Entity) + Send + Sync + 'static) -> Self {
        self.hooks.on_spawned = Some(Box::new(hook));
        self
    }

    pub fn on_build(mut self, hook: impl FnMut(Entity) + Send + Sync + 'static) -> Self {
        self.hooks.on_build = Some(Box::new(hook));
        self
    }

    pub fn on_cancel(mut self, hook: impl FnMut() + Send + Sync + 'static) -> Self {
        self.hooks.on_cancel = Some(Box::new(hook));
        self
    }

    pub fn on_rotated(mut self, hook: impl FnMut(Entity) + Send + Sync + 'static) -> Self {
        self.hooks.on_rotated = Some(Box::new(hook));
        self
    }

    pub fn input_config(mut self, config: BuildInputConfig) -> Self {
        self.input = Some(config);
        self
    }
}

/// Opens a session. If one is already placing it is cancelled first — its
/// `on_cancel` fires exactly once and its preview is destroyed before the new
/// preview spawns, so no orphan previews can accumulate.
#[derive(Message)]
pub struct StartBuild {
    pub request: BuildRequest,
}

/// Programmatic cancel; a no-op while idle.
#[derive(Message)]
pub struct CancelBuild;

/// Programmatic commit, equivalent to a confirm edge.
#[derive(Message)]
pub struct CommitBuild;

/// Written when a confirm attempt is refused by the validator. The session
/// stays open; interested parties may listen, nobody has to.
#[derive(Message, Debug, Clone)]
pub struct CommitRefused {
    pub prefab: String,
    pub position: Vec3,
}

/// State owned by a session in `Placing`.
pub struct ActivePlacement {
    pub(crate) prefab: String,
    pub(crate) preview: Entity,
    pub(crate) pose: PreviewPose,
    pub(crate) height_offset: f32,
    pub(crate) validator: Option<PlacementValidator>,
    pub(crate) hooks: SessionHooks,
    pub(crate) scheme: InputScheme,
    pub(crate) confirm: Vec<LogicalInput>,
    pub(crate) cancel: Vec<LogicalInput>,
}

impl ActivePlacement {
    pub fn prefab(&self) -> &str {
        &self.prefab
    }

    pub fn preview(&self) -> Entity {
        self.preview
    }

    pub fn pose(&self) -> PreviewPose {
        self.pose
    }

    pub(crate) fn wants_virtual_cursor(&self) -> bool {
        self.scheme.gamepad_cursor()
    }
}

#[derive(Default)]
enum SessionState {
    #[default]
    Idle,
    Placing(ActivePlacement),
}

/// The placement state machine. One per world; at most one placement can be
/// in flight, enforced by this being a single resource rather than a lock.
///
/// A preview entity exists exactly while the state is `Placing`. Every way
/// out — commit, cancel, implicit cancel on restart — destroys it.
#[derive(Resource, Default)]
pub struct BuildSession {
    state: SessionState,
}

impl BuildSession {
    pub fn is_placing(&self) -> bool {
        matches!(self.state, SessionState::Placing(_))
    }

    pub fn active(&self) -> Option<&ActivePlacement> {
        match &self.state {
            SessionState::Placing(active) => Some(active),
            SessionState::Idle => None,
        }
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActivePlacement> {
        match &mut self.state {
            SessionState::Placing(active) => Some(active),
            SessionState::Idle => None,
        }
    }

    pub(crate) fn begin(&mut self, placement: ActivePlacement) {
        self.state = SessionState::Placing(placement);
    }

    /// Returns to `Idle`, handing the caller the placement to resolve.
    pub(crate) fn take(&mut self) -> Option<ActivePlacement> {
        match std::mem::take(&mut self.state) {
            SessionState::Placing(active) => Some(active),
            SessionState::Idle => None,
        }
    }
}
