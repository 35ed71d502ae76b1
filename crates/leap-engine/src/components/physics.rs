use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::api::types::Side;

/// How raw velocities are turned into per-tick displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementType {
    /// Blend toward the target velocity each tick.
    #[default]
    Smooth,
    /// Apply the scaled target velocity directly.
    Linear,
}

/// A movement request consumed by the next physics tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum PhysicsIntent {
    #[default]
    GoLeft,
    GoRight,
    GoUp,
    GoDown,
    /// Jump if standing on something.
    Jump,
    /// Jump without the ground check.
    ForceJump,
}

/// Directional hooks fired by movement resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveHook {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Nothing,
}

/// Reaction fired when a contact on `side` involves an entity tagged `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionReaction {
    pub side: Side,
    pub target: String,
    pub action: Action,
    /// Invoke the action on the other participant instead of on the reacting entity.
    pub apply_to_collider: bool,
}

impl Default for CollisionReaction {
    fn default() -> Self {
        Self {
            side: Side::Left,
            target: "player".into(),
            action: Action::Empty,
            apply_to_collider: false,
        }
    }
}

impl CollisionReaction {
    pub fn new(side: Side, target: impl Into<String>, action: Action) -> Self {
        Self {
            side,
            target: target.into(),
            action,
            apply_to_collider: false,
        }
    }

    pub fn on_collider(mut self) -> Self {
        self.apply_to_collider = true;
        self
    }
}

/// Jump sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum JumpState {
    #[default]
    Grounded,
    /// Climbing until the entity's top reaches `target_top`.
    Jumping { target_top: f32 },
}

impl JumpState {
    pub fn is_jumping(&self) -> bool {
        matches!(self, JumpState::Jumping { .. })
    }
}

/// Movement and collision for an entity.
///
/// An entity whose active state holds this component blocks every other
/// mover (subject to tags and the platform rule). Movement is requested
/// through intents, which are consumed once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsComponent {
    /// Static entities never move, whatever intents they receive.
    pub is_static: bool,
    /// Raw speed added per directional intent.
    pub move_speed: f32,
    pub movement_type: MovementType,
    /// Per-entity gravity switch (the level has its own).
    pub gravity_enabled: bool,
    /// One-way: only blocks movers that are above it.
    pub is_platform: bool,
    /// Tags this entity moves through.
    pub ignore_tags: Vec<String>,
    /// First matching entry wins.
    pub collision_reactions: Vec<CollisionReaction>,
    pub jump_height: f32,
    pub on_left: Action,
    pub on_right: Action,
    pub on_up: Action,
    pub on_down: Action,
    pub on_jump: Action,
    pub on_nothing: Action,

    #[serde(skip)]
    pub(crate) intents: BTreeSet<PhysicsIntent>,
    #[serde(skip)]
    pub(crate) jump: JumpState,
    #[serde(skip)]
    pub(crate) velocity: Vec2,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self::fixed()
    }
}

impl PhysicsComponent {
    /// A solid entity that never moves.
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            move_speed: 0.0,
            movement_type: MovementType::Smooth,
            gravity_enabled: false,
            is_platform: false,
            ignore_tags: Vec::new(),
            collision_reactions: Vec::new(),
            jump_height: 0.0,
            on_left: Action::Empty,
            on_right: Action::Empty,
            on_up: Action::Empty,
            on_down: Action::Empty,
            on_jump: Action::Empty,
            on_nothing: Action::Empty,
            intents: BTreeSet::new(),
            jump: JumpState::Grounded,
            velocity: Vec2::ZERO,
        }
    }

    /// A moving entity affected by gravity.
    pub fn dynamic(move_speed: f32) -> Self {
        Self {
            is_static: false,
            move_speed,
            gravity_enabled: true,
            ..Self::fixed()
        }
    }

    /// A static one-way platform.
    pub fn platform() -> Self {
        Self {
            is_platform: true,
            ..Self::fixed()
        }
    }

    // -- Builder pattern --

    pub fn with_movement_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = movement_type;
        self
    }

    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.gravity_enabled = enabled;
        self
    }

    pub fn with_jump_height(mut self, height: f32) -> Self {
        self.jump_height = height;
        self
    }

    pub fn with_ignore_tag(mut self, tag: impl Into<String>) -> Self {
        self.ignore_tags.push(tag.into());
        self
    }

    pub fn with_reaction(mut self, reaction: CollisionReaction) -> Self {
        self.collision_reactions.push(reaction);
        self
    }

    pub fn with_hook(mut self, hook: MoveHook, action: Action) -> Self {
        *self.hook_mut(hook) = action;
        self
    }

    // -- Intents & simulation state --

    /// Queue an intent for the next tick. Intents are a set: repeats collapse.
    pub fn push_intent(&mut self, intent: PhysicsIntent) {
        self.intents.insert(intent);
    }

    pub fn pending_intents(&self) -> impl Iterator<Item = PhysicsIntent> + '_ {
        self.intents.iter().copied()
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    pub fn jump_state(&self) -> JumpState {
        self.jump
    }

    /// Scaled (and smoothed) velocity requested on the last tick, before collisions.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Drop everything that only makes sense while the owning state is active.
    pub(crate) fn reset_simulation(&mut self) {
        self.intents.clear();
        self.jump = JumpState::Grounded;
        self.velocity = Vec2::ZERO;
    }

    pub fn ignores(&self, tag: &str) -> bool {
        self.ignore_tags.iter().any(|t| t == tag)
    }

    /// First reaction configured for a contact on `side` with an entity tagged `tag`.
    pub fn reaction_for(&self, side: Side, tag: &str) -> Option<&CollisionReaction> {
        self.collision_reactions
            .iter()
            .find(|r| r.side.matches(side) && r.target == tag)
    }

    pub fn hook(&self, hook: MoveHook) -> &Action {
        match hook {
            MoveHook::Left => &self.on_left,
            MoveHook::Right => &self.on_right,
            MoveHook::Up => &self.on_up,
            MoveHook::Down => &self.on_down,
            MoveHook::Jump => &self.on_jump,
            MoveHook::Nothing => &self.on_nothing,
        }
    }

    fn hook_mut(&mut self, hook: MoveHook) -> &mut Action {
        match hook {
            MoveHook::Left => &mut self.on_left,
            MoveHook::Right => &mut self.on_right,
            MoveHook::Up => &mut self.on_up,
            MoveHook::Down => &mut self.on_down,
            MoveHook::Jump => &mut self.on_jump,
            MoveHook::Nothing => &mut self.on_nothing,
        }
    }

    /// Every action this component can fire, for validation.
    pub(crate) fn actions(&self) -> impl Iterator<Item = &Action> {
        [
            &self.on_left,
            &self.on_right,
            &self.on_up,
            &self.on_down,
            &self.on_jump,
            &self.on_nothing,
        ]
        .into_iter()
        .chain(self.collision_reactions.iter().map(|r| &r.action))
    }
}
