use crate::actions::Action;
use crate::api::error::LevelError;
use crate::components::component::{ActivationContext, Component, ComponentKind, UpdateContext};
use crate::components::physics::PhysicsComponent;
use crate::components::sound::SoundComponent;
use crate::components::sprite::TextureComponent;
use crate::core::geometry::Rect;
use crate::renderer::traits::DrawSurface;

/// A named bundle of components. Exactly one state of an entity is active.
///
/// Components are kept in insertion order, which is also their update order.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: String,
    components: Vec<Component>,
    active: bool,
    /// Invoked on the owning entity each time this state becomes active.
    pub start_action: Action,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            active: false,
            start_action: Action::Empty,
        }
    }

    /// Builder form of `add_component` for inactive states. Duplicates are dropped.
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        if let Err(err) = self.add_component(component.into(), None) {
            log::warn!("state '{}': {}", self.name, err);
        }
        self
    }

    pub fn with_start_action(mut self, action: Action) -> Self {
        self.start_action = action;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Add a component. A kind already present is rejected and the state is
    /// left untouched. On an active state the component activates right away.
    pub(crate) fn add_component(
        &mut self,
        mut component: Component,
        ctx: Option<&ActivationContext<'_>>,
    ) -> Result<(), LevelError> {
        let kind = component.kind();
        if self.has(kind) {
            return Err(LevelError::DuplicateComponent { kind });
        }
        if self.active {
            if let Some(ctx) = ctx {
                component.on_activate(ctx);
            }
        }
        self.components.push(component);
        Ok(())
    }

    /// Remove the component of `kind`, releasing its transient resources.
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        let idx = self.components.iter().position(|c| c.kind() == kind)?;
        let mut component = self.components.remove(idx);
        if self.active {
            component.on_deactivate();
        }
        Some(component)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.kind() == kind)
    }

    pub fn physics(&self) -> Option<&PhysicsComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Physics(p) => Some(p),
            _ => None,
        })
    }

    pub fn physics_mut(&mut self) -> Option<&mut PhysicsComponent> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Physics(p) => Some(p),
            _ => None,
        })
    }

    pub fn texture_mut(&mut self) -> Option<&mut TextureComponent> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Texture(t) => Some(t),
            _ => None,
        })
    }

    pub fn sound(&self) -> Option<&SoundComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Sound(s) => Some(s),
            _ => None,
        })
    }

    pub(crate) fn activate(&mut self, ctx: &ActivationContext<'_>) {
        for component in &mut self.components {
            component.on_activate(ctx);
        }
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        for component in &mut self.components {
            component.on_deactivate();
        }
        self.active = false;
    }

    /// Run every logic-pass updatable in insertion order.
    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if !self.active {
            return;
        }
        for component in &mut self.components {
            if let Some(updatable) = component.as_updatable_mut() {
                updatable.update(ctx);
            }
        }
    }

    pub(crate) fn render(&self, rect: &Rect, surface: &mut dyn DrawSurface) {
        if !self.active {
            return;
        }
        for component in &self.components {
            if let Some(renderable) = component.as_renderable() {
                renderable.render(rect, surface);
            }
        }
    }

    /// Check that every component and action finds the components it needs
    /// in this state.
    pub fn validate(&self) -> Result<(), LevelError> {
        let start = std::iter::once(("start action", &self.start_action));
        let owned = self.components.iter().flat_map(|c| {
            c.actions()
                .into_iter()
                .map(move |a| (component_label(c.kind()), a))
        });
        for (owner, action) in start.chain(owned) {
            for (kind, required) in action.requirements() {
                if !self.has(required) {
                    return Err(LevelError::MissingRequiredComponent {
                        kind: format!("{kind:?} action in {owner}"),
                        required,
                    });
                }
            }
        }
        Ok(())
    }

    /// Reassemble a state from its persisted parts.
    pub(crate) fn from_parts(
        name: String,
        components: Vec<Component>,
        start_action: Action,
    ) -> Result<Self, LevelError> {
        let mut state = State::new(name).with_start_action(start_action);
        for component in components {
            state.add_component(component, None)?;
        }
        Ok(state)
    }
}

fn component_label(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Physics => "physics component",
        ComponentKind::Timer => "timer component",
        ComponentKind::Input => "input component",
        ComponentKind::Texture => "texture component",
        ComponentKind::Sound => "sound component",
    }
}
