use glam::Vec2;

use crate::actions::Action;
use crate::api::error::LevelError;
use crate::api::types::EntityId;
use crate::components::component::{ActivationContext, Component, UpdateContext};
use crate::components::physics::PhysicsComponent;
use crate::components::state::State;
use crate::core::geometry::Rect;
use crate::input::queue::KeyboardState;
use crate::renderer::traits::DrawSurface;

/// A simulated object: identity, a box, and a list of mutually exclusive states.
///
/// The box is only written through the level so the spatial grid never goes
/// stale. Once spawned, exactly one state is active.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Classifier used by collision filters, reactions and lookups.
    pub tag: String,
    rect: Rect,
    states: Vec<State>,
    current: usize,
}

impl Entity {
    /// Create an entity with a single empty "default" state.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            states: vec![State::new("default")],
            current: 0,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.rect.pos = pos;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.rect.size = size;
        self
    }

    /// Replace the state list.
    pub fn with_states(mut self, states: Vec<State>) -> Self {
        self.states = states;
        self
    }

    /// Stage a component in the current state.
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        if let Some(state) = self.states.get_mut(self.current) {
            if let Err(err) = state.add_component(component.into(), None) {
                log::warn!("entity {} state '{}': {}", self.id, state.name(), err);
            }
        }
        self
    }

    /// State to activate on spawn.
    pub fn with_current_state(mut self, index: usize) -> Self {
        self.current = index;
        self
    }

    // -- Accessors --

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    pub fn current_state_index(&self) -> usize {
        self.current
    }

    /// The current state. `None` only for an entity the level would refuse
    /// to spawn.
    pub fn active_state(&self) -> Option<&State> {
        self.states.get(self.current)
    }

    pub fn active_state_mut(&mut self) -> Option<&mut State> {
        self.states.get_mut(self.current)
    }

    pub fn physics(&self) -> Option<&PhysicsComponent> {
        self.states.get(self.current)?.physics()
    }

    pub fn physics_mut(&mut self) -> Option<&mut PhysicsComponent> {
        self.states.get_mut(self.current)?.physics_mut()
    }

    // -- Lifecycle --

    /// Activate the current state and make sure no other state is active.
    pub(crate) fn activate(&mut self, ctx: &ActivationContext<'_>) {
        for (i, state) in self.states.iter_mut().enumerate() {
            if i != self.current && state.is_active() {
                state.deactivate();
            }
        }
        if let Some(state) = self.states.get_mut(self.current) {
            if !state.is_active() {
                state.activate(ctx);
            }
        }
    }

    pub(crate) fn deactivate(&mut self) {
        for state in &mut self.states {
            if state.is_active() {
                state.deactivate();
            }
        }
    }

    /// Switch the active state.
    ///
    /// Returns `Ok(false)` when `index` is already current. An out-of-range
    /// index fails and leaves the entity untouched.
    pub(crate) fn set_state(
        &mut self,
        index: usize,
        ctx: &ActivationContext<'_>,
    ) -> Result<bool, LevelError> {
        if index >= self.states.len() {
            return Err(LevelError::InvalidStateIndex {
                entity: self.id,
                index,
                len: self.states.len(),
            });
        }
        if index == self.current {
            return Ok(false);
        }
        if let Some(old) = self.states.get_mut(self.current) {
            old.deactivate();
        }
        self.current = index;
        self.states[index].activate(ctx);
        log::debug!(
            "entity {} -> state {} '{}'",
            self.id,
            index,
            self.states[index].name()
        );
        Ok(true)
    }

    /// Add a component to state `index`, activating it right away when that
    /// state is the active one.
    pub(crate) fn add_component(
        &mut self,
        index: usize,
        component: Component,
        ctx: &ActivationContext<'_>,
    ) -> Result<(), LevelError> {
        let len = self.states.len();
        let state = self.states.get_mut(index).ok_or(LevelError::InvalidStateIndex {
            entity: self.id,
            index,
            len,
        })?;
        state.add_component(component, Some(ctx))
    }

    /// Logic pass: run the active state's updatables and hand back the
    /// actions they fired.
    pub(crate) fn update_logic(&mut self, dt: f32, keys: &KeyboardState) -> Vec<Action> {
        let mut ctx = UpdateContext::new(self.id, dt, keys);
        if let Some(state) = self.states.get_mut(self.current) {
            state.update(&mut ctx);
        }
        ctx.into_fired()
    }

    pub(crate) fn render(&self, surface: &mut dyn DrawSurface) {
        if let Some(state) = self.states.get(self.current) {
            state.render(&self.rect, surface);
        }
    }

    /// Check every state for missing component dependencies.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.states.is_empty() {
            return Err(LevelError::EmptyStates(self.id));
        }
        if self.current >= self.states.len() {
            return Err(LevelError::InvalidStateIndex {
                entity: self.id,
                index: self.current,
                len: self.states.len(),
            });
        }
        self.states.iter().try_for_each(State::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::registry::ResourceRegistry;
    use crate::components::component::ComponentKind;
    use crate::components::sprite::TextureComponent;

    fn two_states() -> Entity {
        Entity::new(EntityId(1)).with_states(vec![
            State::new("idle").with_component(TextureComponent::single("idle.png")),
            State::new("run").with_component(TextureComponent::single("run.png")),
        ])
    }

    fn active_count(entity: &Entity) -> usize {
        entity.states().iter().filter(|s| s.is_active()).count()
    }

    #[test]
    fn activation_leaves_one_active_state() {
        let resources = ResourceRegistry::new();
        let ctx = ActivationContext { entity: EntityId(1), resources: &resources };
        let mut entity = two_states();
        assert_eq!(active_count(&entity), 0);
        entity.activate(&ctx);
        assert_eq!(active_count(&entity), 1);
        assert!(entity.active_state().unwrap().is_active());
    }

    #[test]
    fn set_state_swaps_active_state() {
        let resources = ResourceRegistry::new();
        let ctx = ActivationContext { entity: EntityId(1), resources: &resources };
        let mut entity = two_states();
        entity.activate(&ctx);

        assert!(entity.set_state(1, &ctx).unwrap());
        assert_eq!(entity.current_state_index(), 1);
        assert_eq!(active_count(&entity), 1);
        assert!(!entity.states()[0].is_active());
        assert!(!entity.set_state(1, &ctx).unwrap(), "same index is a no-op");
    }

    #[test]
    fn out_of_range_state_fails_without_mutation() {
        let resources = ResourceRegistry::new();
        let ctx = ActivationContext { entity: EntityId(1), resources: &resources };
        let mut entity = two_states();
        entity.activate(&ctx);

        let err = entity.set_state(2, &ctx).unwrap_err();
        assert!(matches!(err, LevelError::InvalidStateIndex { index: 2, len: 2, .. }));
        assert_eq!(entity.current_state_index(), 0);
        assert!(entity.states()[0].is_active());
    }

    #[test]
    fn with_component_stages_into_current_state() {
        let entity = Entity::new(EntityId(3))
            .with_component(PhysicsComponent::platform())
            .with_component(PhysicsComponent::fixed());
        let state = entity.active_state().unwrap();
        assert_eq!(state.name(), "default");
        assert_eq!(state.components().len(), 1);
        assert!(entity.physics().unwrap().is_platform);
    }

    #[test]
    fn add_component_to_active_state_activates_it() {
        let resources = ResourceRegistry::new();
        let ctx = ActivationContext { entity: EntityId(1), resources: &resources };
        let mut entity = Entity::new(EntityId(1));
        entity.activate(&ctx);
        entity
            .add_component(0, TextureComponent::single("a.png").into(), &ctx)
            .unwrap();
        assert!(entity.active_state_mut().unwrap().texture_mut().unwrap().current_sprite().is_some());

        let err = entity
            .add_component(0, TextureComponent::single("b.png").into(), &ctx)
            .unwrap_err();
        assert!(matches!(err, LevelError::DuplicateComponent { kind: ComponentKind::Texture }));
    }

    #[test]
    fn validate_rejects_empty_states() {
        let entity = Entity::new(EntityId(4)).with_states(Vec::new());
        assert!(matches!(entity.validate(), Err(LevelError::EmptyStates(_))));
    }
}
