//! Component registry.
//!
//! Components are a closed set of tagged variants. The `kind` tag is the
//! stable discriminator used by documents, and every kind is rebuilt from its
//! fields alone (all fields default). Capabilities are expressed as traits
//! implemented by the concrete kinds and reached through `Component`.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::api::types::EntityId;
use crate::assets::registry::ResourceRegistry;
use crate::components::input::InputComponent;
use crate::components::physics::PhysicsComponent;
use crate::components::sound::SoundComponent;
use crate::components::sprite::TextureComponent;
use crate::components::timer::TimerComponent;
use crate::core::geometry::Rect;
use crate::input::queue::KeyboardState;
use crate::renderer::traits::DrawSurface;

/// Discriminator of a component kind. A state holds at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Physics,
    Timer,
    Input,
    Texture,
    Sound,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Physics,
        ComponentKind::Timer,
        ComponentKind::Input,
        ComponentKind::Texture,
        ComponentKind::Sound,
    ];
}

/// Handed to components when their state becomes active.
pub struct ActivationContext<'a> {
    pub entity: EntityId,
    pub resources: &'a ResourceRegistry,
}

/// Handed to updatable components once per tick.
/// Actions fired through `fire` run on the entity after its logic pass.
pub struct UpdateContext<'a> {
    pub entity: EntityId,
    pub dt: f32,
    pub keys: &'a KeyboardState,
    fired: Vec<Action>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(entity: EntityId, dt: f32, keys: &'a KeyboardState) -> Self {
        Self {
            entity,
            dt,
            keys,
            fired: Vec::new(),
        }
    }

    pub fn fire(&mut self, action: &Action) {
        if !action.is_empty() {
            self.fired.push(action.clone());
        }
    }

    pub fn into_fired(self) -> Vec<Action> {
        self.fired
    }
}

/// Per-tick logic.
pub trait Updatable {
    fn update(&mut self, ctx: &mut UpdateContext<'_>);
}

/// Draw hook invoked during the render pass.
pub trait Renderable {
    fn render(&self, rect: &Rect, surface: &mut dyn DrawSurface);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Component {
    Physics(PhysicsComponent),
    Timer(TimerComponent),
    Input(InputComponent),
    Texture(TextureComponent),
    Sound(SoundComponent),
}

impl Component {
    /// Default instance of a kind, as tooling creates them.
    pub fn from_kind(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Physics => Component::Physics(PhysicsComponent::default()),
            ComponentKind::Timer => Component::Timer(TimerComponent::default()),
            ComponentKind::Input => Component::Input(InputComponent::default()),
            ComponentKind::Texture => Component::Texture(TextureComponent::default()),
            ComponentKind::Sound => Component::Sound(SoundComponent::default()),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Physics(_) => ComponentKind::Physics,
            Component::Timer(_) => ComponentKind::Timer,
            Component::Input(_) => ComponentKind::Input,
            Component::Texture(_) => ComponentKind::Texture,
            Component::Sound(_) => ComponentKind::Sound,
        }
    }

    /// Physics counts as updatable but is driven by the physics pass,
    /// after every other updatable of the tick.
    pub fn is_updatable(&self) -> bool {
        matches!(
            self,
            Component::Physics(_) | Component::Timer(_) | Component::Input(_)
        )
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self, Component::Texture(_))
    }

    /// Logic-pass updatable, if this kind has one.
    pub fn as_updatable_mut(&mut self) -> Option<&mut dyn Updatable> {
        match self {
            Component::Timer(c) => Some(c),
            Component::Input(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_renderable(&self) -> Option<&dyn Renderable> {
        match self {
            Component::Texture(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn on_activate(&mut self, ctx: &ActivationContext<'_>) {
        match self {
            Component::Timer(c) => c.reset(),
            Component::Texture(c) => c.resolve(ctx.resources),
            Component::Sound(c) => c.resolve(ctx.resources),
            Component::Physics(_) | Component::Input(_) => {}
        }
    }

    pub(crate) fn on_deactivate(&mut self) {
        match self {
            Component::Physics(c) => c.reset_simulation(),
            Component::Texture(c) => c.release(),
            Component::Sound(c) => c.release(),
            Component::Timer(_) | Component::Input(_) => {}
        }
    }

    /// Actions this component can fire on its own entity.
    pub(crate) fn actions(&self) -> Vec<&Action> {
        match self {
            Component::Physics(c) => c.actions().collect(),
            Component::Timer(c) => vec![&c.action],
            Component::Input(c) => c.bindings.iter().map(|b| &b.action).collect(),
            Component::Texture(_) | Component::Sound(_) => Vec::new(),
        }
    }
}

impl From<PhysicsComponent> for Component {
    fn from(c: PhysicsComponent) -> Self {
        Component::Physics(c)
    }
}

impl From<TimerComponent> for Component {
    fn from(c: TimerComponent) -> Self {
        Component::Timer(c)
    }
}

impl From<InputComponent> for Component {
    fn from(c: InputComponent) -> Self {
        Component::Input(c)
    }
}

impl From<TextureComponent> for Component {
    fn from(c: TextureComponent) -> Self {
        Component::Texture(c)
    }
}

impl From<SoundComponent> for Component {
    fn from(c: SoundComponent) -> Self {
        Component::Sound(c)
    }
}
