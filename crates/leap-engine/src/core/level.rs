use glam::Vec2;

use crate::actions::{Action, MAX_ACTION_DEPTH};
use crate::api::config::LevelConfig;
use crate::api::error::LevelError;
use crate::api::types::{Contact, EntityId, Side, SoundEvent};
use crate::assets::registry::ResourceRegistry;
use crate::bridge::document::{EntityDocument, LevelDocument};
use crate::components::component::{ActivationContext, Component};
use crate::components::entity::Entity;
use crate::components::physics::{PhysicsComponent, PhysicsIntent};
use crate::core::geometry::Rect;
use crate::core::grid::SpatialGrid;
use crate::core::scene::Scene;
use crate::input::queue::KeyboardState;
use crate::renderer::traits::DrawSurface;
use crate::systems::physics::{self, MoveOutcome};

/// Owns every entity of a running level together with the spatial grid,
/// the simulation parameters and the per-tick outputs (score, sounds,
/// contacts).
///
/// Every write to an entity box goes through the level, which clamps it to
/// the world bounds and relocates the entity in the grid.
pub struct Level {
    pub(crate) config: LevelConfig,
    pub(crate) scene: Scene,
    pub(crate) grid: SpatialGrid,
    resources: ResourceRegistry,
    score: i64,
    sounds: Vec<SoundEvent>,
    pub(crate) contacts: Vec<Contact>,
    pending_despawn: Vec<EntityId>,
    next_id: u32,
    action_depth: u32,
    tick: u64,
}

impl Level {
    pub fn new(config: LevelConfig) -> Result<Self, LevelError> {
        config.validate()?;
        Ok(Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            scene: Scene::new(),
            resources: ResourceRegistry::new(),
            score: 0,
            sounds: Vec::new(),
            contacts: Vec::new(),
            pending_despawn: Vec::new(),
            next_id: 1,
            action_depth: 0,
            tick: 0,
        })
    }

    /// Use `resources` for texture and sound lookups of entities spawned from now on.
    pub fn with_resources(mut self, resources: ResourceRegistry) -> Self {
        self.resources = resources;
        self
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Generate an entity ID not used by any spawned entity.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // -- Entity lifecycle --

    /// Add an entity to the level and activate its current state.
    ///
    /// The box is clamped to the world bounds. The start action of the
    /// activated state runs before this returns.
    pub fn spawn(&mut self, mut entity: Entity) -> Result<EntityId, LevelError> {
        let id = entity.id;
        if self.scene.contains(id) {
            return Err(LevelError::DuplicateEntity(id));
        }
        if entity.states().is_empty() {
            return Err(LevelError::EmptyStates(id));
        }
        if entity.current_state_index() >= entity.states().len() {
            return Err(LevelError::InvalidStateIndex {
                entity: id,
                index: entity.current_state_index(),
                len: entity.states().len(),
            });
        }
        let rect = entity.rect();
        self.check_extent(id, &rect)?;

        let rect = rect.clamped_within(&self.config.world_bounds);
        entity.set_rect(rect);
        let ctx = ActivationContext { entity: id, resources: &self.resources };
        entity.activate(&ctx);
        let start = entity.active_state().map(|s| s.start_action.clone());

        log::debug!("spawn entity {} '{}' at {:?}", id, entity.tag, rect.pos);
        self.grid.insert(id, rect);
        self.scene.spawn(entity);
        self.next_id = self.next_id.max(id.0.saturating_add(1));

        if let Some(action) = start {
            action.invoke(id, self);
        }
        Ok(id)
    }

    /// Remove an entity immediately, deactivating its state.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.scene.despawn(id)?;
        self.grid.remove(id);
        entity.deactivate();
        log::debug!("despawn entity {}", id);
        Some(entity)
    }

    /// Remove an entity once the current tick completes.
    pub fn queue_despawn(&mut self, id: EntityId) {
        if !self.pending_despawn.contains(&id) {
            self.pending_despawn.push(id);
        }
    }

    fn flush_despawns(&mut self) {
        for id in std::mem::take(&mut self.pending_despawn) {
            self.despawn(id);
        }
    }

    // -- Lookup --

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_mut(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.scene.iter()
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.scene.find_by_tag(tag)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.scene.find_all_by_tag(tag)
    }

    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    // -- Box writes --

    /// Place and resize an entity, clamped to the world bounds. Returns the
    /// box written. A size not strictly larger than epsilon is rejected.
    pub fn set_rect(&mut self, id: EntityId, rect: Rect) -> Result<Rect, LevelError> {
        if !self.scene.contains(id) {
            return Err(LevelError::UnknownEntity(id));
        }
        self.check_extent(id, &rect)?;
        self.write_rect(id, rect).ok_or(LevelError::UnknownEntity(id))
    }

    /// Teleport an entity without collision resolution.
    pub fn set_position(&mut self, id: EntityId, pos: Vec2) -> Option<Rect> {
        let rect = self.scene.get(id)?.rect();
        self.write_rect(id, Rect::from_pos_size(pos, rect.size))
    }

    fn write_rect(&mut self, id: EntityId, rect: Rect) -> Option<Rect> {
        let rect = rect.clamped_within(&self.config.world_bounds);
        let entity = self.scene.get_mut(id)?;
        entity.set_rect(rect);
        self.grid.relocate(id, rect);
        Some(rect)
    }

    fn check_extent(&self, id: EntityId, rect: &Rect) -> Result<(), LevelError> {
        if rect.min_extent() > self.config.epsilon {
            return Ok(());
        }
        Err(LevelError::EntityTooSmall {
            entity: id,
            min_extent: rect.min_extent(),
            epsilon: self.config.epsilon,
        })
    }

    // -- States & components --

    /// Switch an entity's active state, then run the new state's start action.
    /// Returns `Ok(false)` when the state was already active.
    pub fn set_state(&mut self, id: EntityId, index: usize) -> Result<bool, LevelError> {
        let entity = self.scene.get_mut(id).ok_or(LevelError::UnknownEntity(id))?;
        let ctx = ActivationContext { entity: id, resources: &self.resources };
        if !entity.set_state(index, &ctx)? {
            return Ok(false);
        }
        let start = entity.active_state().map(|s| s.start_action.clone());
        if let Some(action) = start {
            action.invoke(id, self);
        }
        Ok(true)
    }

    /// Add a component to the entity's active state; it activates immediately.
    pub fn add_component(&mut self, id: EntityId, component: impl Into<Component>) -> Result<(), LevelError> {
        let entity = self.scene.get_mut(id).ok_or(LevelError::UnknownEntity(id))?;
        let index = entity.current_state_index();
        let ctx = ActivationContext { entity: id, resources: &self.resources };
        entity.add_component(index, component.into(), &ctx)
    }

    /// Add a component to any state of the entity. Inactive states only stage it.
    pub fn add_component_to_state(
        &mut self,
        id: EntityId,
        state: usize,
        component: impl Into<Component>,
    ) -> Result<(), LevelError> {
        let entity = self.scene.get_mut(id).ok_or(LevelError::UnknownEntity(id))?;
        let ctx = ActivationContext { entity: id, resources: &self.resources };
        entity.add_component(state, component.into(), &ctx)
    }

    pub fn physics(&self, id: EntityId) -> Option<&PhysicsComponent> {
        self.scene.get(id)?.physics()
    }

    pub fn physics_mut(&mut self, id: EntityId) -> Option<&mut PhysicsComponent> {
        self.scene.get_mut(id)?.physics_mut()
    }

    /// Queue a movement intent. `false` if the entity has no active physics.
    pub fn push_intent(&mut self, id: EntityId, intent: PhysicsIntent) -> bool {
        match self.physics_mut(id) {
            Some(physics) => {
                physics.push_intent(intent);
                true
            }
            None => false,
        }
    }

    // -- Score, sounds, contacts --

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn add_score(&mut self, points: i32) {
        self.score += i64::from(points);
    }

    /// Sound triggers emitted since the last `drain_sounds`.
    pub fn sounds(&self) -> &[SoundEvent] {
        &self.sounds
    }

    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit sound `index` of the entity's active sound component.
    pub fn play_sound(&mut self, id: EntityId, index: usize) -> bool {
        let event = self
            .scene
            .get(id)
            .and_then(|e| e.active_state())
            .and_then(|s| s.sound())
            .and_then(|s| s.event(index));
        match event {
            Some(event) => {
                self.sounds.push(event);
                true
            }
            None => false,
        }
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    /// Every contact raised during the last tick, in both perspectives.
    ///
    /// The host reads this between ticks; it is cleared when the next tick
    /// starts. Components inside the level react to contacts through
    /// collision reactions instead.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contacts of the last tick seen from `id`.
    pub fn contacts_of(&self, id: EntityId) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(move |c| c.entity == id)
    }

    // -- Movement helpers --

    /// Resolve a displacement for `id` against the other entities, as the
    /// physics pass does, firing collision reactions but no movement hooks.
    pub fn move_entity(&mut self, id: EntityId, delta: Vec2) -> Option<MoveOutcome> {
        physics::move_entity(self, id, delta)
    }

    /// Entities touching the given side of `id` within the level epsilon.
    pub fn touching(&self, id: EntityId, side: Side) -> Vec<EntityId> {
        physics::entities_touching_side(self, id, side, self.config.epsilon)
    }

    // -- Tick --

    /// Advance the simulation by one tick of `dt` seconds.
    ///
    /// Logic components of every entity run first (in registration order),
    /// then movement resolution for every entity. Despawns requested during
    /// the tick happen at its end.
    pub fn update(&mut self, dt: f32, keys: &KeyboardState) {
        self.contacts.clear();
        let ids = self.scene.ids();

        for &id in &ids {
            let fired = match self.scene.get_mut(id) {
                Some(entity) => entity.update_logic(dt, keys),
                None => continue,
            };
            for action in fired {
                action.invoke(id, self);
            }
        }

        for &id in &ids {
            physics::update_physics(self, id, dt);
        }

        self.flush_despawns();
        self.tick += 1;
    }

    /// Hand every active renderable component to `surface`.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        for entity in self.scene.iter() {
            entity.render(surface);
        }
    }

    /// Report the first configuration error of any entity.
    pub fn validate(&self) -> Result<(), LevelError> {
        self.scene.iter().try_for_each(Entity::validate)
    }

    pub(crate) fn enter_action(&mut self) -> bool {
        if self.action_depth >= MAX_ACTION_DEPTH {
            return false;
        }
        self.action_depth += 1;
        true
    }

    pub(crate) fn leave_action(&mut self) {
        self.action_depth = self.action_depth.saturating_sub(1);
    }

    pub(crate) fn dispatch(&mut self, queued: Vec<(Action, EntityId)>) {
        for (action, target) in queued {
            if self.scene.contains(target) {
                action.invoke(target, self);
            } else {
                log::warn!("dropping {:?} action for despawned entity {}", action.kind(), target);
            }
        }
    }

    // -- Documents --

    /// Build a level from its document, spawning entities in document order.
    pub fn from_document(doc: LevelDocument, resources: ResourceRegistry) -> Result<Self, LevelError> {
        let mut level = Level::new(doc.config)?.with_resources(resources);
        for entity in doc.entities {
            level.spawn(entity.into_entity()?)?;
        }
        Ok(level)
    }

    pub fn to_document(&self) -> LevelDocument {
        LevelDocument {
            config: self.config.clone(),
            entities: self.scene.iter().map(EntityDocument::from_entity).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::sprite::TextureComponent;
    use crate::components::state::State;
    use crate::components::timer::TimerComponent;

    fn level() -> Level {
        Level::new(LevelConfig::default()).unwrap()
    }

    fn crate_at(id: u32, x: f32, y: f32) -> Entity {
        Entity::new(EntityId(id))
            .with_tag("crate")
            .with_rect(Rect::new(x, y, 16.0, 16.0))
            .with_component(PhysicsComponent::fixed())
    }

    #[test]
    fn spawn_registers_in_grid_and_activates() {
        let mut level = level();
        let id = level.spawn(crate_at(1, 10.0, 10.0)).unwrap();
        assert!(level.grid().query(&level.entity(id).unwrap().rect()).contains(&id));
        assert!(level.entity(id).unwrap().active_state().unwrap().is_active());
    }

    #[test]
    fn added_component_activates_only_on_the_active_state() {
        let mut level = level();
        let entity = Entity::new(EntityId(1))
            .with_rect(Rect::new(0.0, 0.0, 16.0, 16.0))
            .with_states(vec![State::new("idle"), State::new("hurt")]);
        let id = level.spawn(entity).unwrap();

        level.add_component(id, TextureComponent::single("a.png")).unwrap();
        level.add_component_to_state(id, 1, TextureComponent::single("b.png")).unwrap();

        let entity = level.entity_mut(id).unwrap();
        let active = entity.active_state_mut().unwrap();
        assert!(active.is_active());
        assert!(active.texture_mut().unwrap().current_sprite().is_some());
        assert!(!entity.state(1).unwrap().is_active());

        level.set_state(id, 1).unwrap();
        let entity = level.entity_mut(id).unwrap();
        assert!(entity.active_state_mut().unwrap().texture_mut().unwrap().current_sprite().is_some());
        assert!(!entity.state(0).unwrap().is_active());
    }

    #[test]
    fn spawn_rejects_bad_entities() {
        let mut level = level();
        level.spawn(crate_at(1, 0.0, 0.0)).unwrap();
        assert!(matches!(level.spawn(crate_at(1, 50.0, 0.0)), Err(LevelError::DuplicateEntity(_))));
        assert!(matches!(
            level.spawn(Entity::new(EntityId(2)).with_states(Vec::new())),
            Err(LevelError::EmptyStates(_))
        ));
        assert!(matches!(
            level.spawn(Entity::new(EntityId(3)).with_rect(Rect::new(0.0, 0.0, 0.1, 10.0))),
            Err(LevelError::EntityTooSmall { .. })
        ));
        assert_eq!(level.len(), 1);
    }

    #[test]
    fn spawn_clamps_to_world_bounds() {
        let mut level = level();
        let id = level.spawn(crate_at(1, -50.0, 5000.0)).unwrap();
        let rect = level.entity(id).unwrap().rect();
        assert_eq!(rect.pos, Vec2::new(0.0, 2048.0 - 16.0));
    }

    #[test]
    fn next_id_skips_spawned_ids() {
        let mut level = level();
        level.spawn(crate_at(7, 0.0, 0.0)).unwrap();
        assert_eq!(level.next_id(), EntityId(8));
    }

    #[test]
    fn set_rect_relocates_in_grid() {
        let mut level = level();
        let id = level.spawn(crate_at(1, 0.0, 0.0)).unwrap();
        let far = Rect::new(1000.0, 1000.0, 16.0, 16.0);
        level.set_rect(id, far).unwrap();
        assert!(level.grid().query(&far).contains(&id));
        assert!(!level.grid().query(&Rect::new(0.0, 0.0, 16.0, 16.0)).contains(&id));
    }

    #[test]
    fn set_rect_refuses_boxes_thinner_than_epsilon() {
        let mut level = level();
        let wall = level.spawn(crate_at(1, 100.0, 0.0)).unwrap();
        let before = level.entity(wall).unwrap().rect();

        let err = level.set_rect(wall, Rect::new(100.07, 0.0, 0.05, 500.0)).unwrap_err();
        assert!(matches!(err, LevelError::EntityTooSmall { entity, .. } if entity == wall));
        assert_eq!(level.entity(wall).unwrap().rect(), before);
        assert_eq!(level.grid().registered_rect(wall), Some(before));

        let at_epsilon = Rect::new(0.0, 0.0, 16.0, level.config().epsilon);
        assert!(level.set_rect(wall, at_epsilon).is_err());
        assert!(matches!(
            level.set_rect(EntityId(99), Rect::new(0.0, 0.0, 8.0, 8.0)),
            Err(LevelError::UnknownEntity(_))
        ));
    }

    #[test]
    fn set_state_runs_start_action_and_reports_errors() {
        let mut level = level();
        let entity = Entity::new(EntityId(1))
            .with_rect(Rect::new(0.0, 0.0, 16.0, 16.0))
            .with_states(vec![
                State::new("idle"),
                State::new("bonus").with_start_action(Action::Score { points: 5 }),
            ]);
        let id = level.spawn(entity).unwrap();
        assert!(level.set_state(id, 1).unwrap());
        assert_eq!(level.score(), 5);
        assert!(!level.set_state(id, 1).unwrap());
        assert_eq!(level.score(), 5);
        assert!(matches!(level.set_state(id, 9), Err(LevelError::InvalidStateIndex { .. })));
        assert!(matches!(level.set_state(EntityId(42), 0), Err(LevelError::UnknownEntity(_))));
        assert_eq!(level.entity(id).unwrap().current_state_index(), 1);
    }

    #[test]
    fn timers_fire_through_the_logic_pass() {
        let mut level = level();
        let entity = Entity::new(EntityId(1))
            .with_rect(Rect::new(0.0, 0.0, 16.0, 16.0))
            .with_component(TimerComponent::new(0.5, Action::Score { points: 1 }));
        level.spawn(entity).unwrap();
        let keys = KeyboardState::new();
        for _ in 0..70 {
            level.update(1.0 / 60.0, &keys);
        }
        assert_eq!(level.score(), 2);
        assert_eq!(level.tick_count(), 70);
    }

    #[test]
    fn find_by_tag_helpers() {
        let mut level = level();
        level.spawn(crate_at(1, 0.0, 0.0)).unwrap();
        level.spawn(crate_at(2, 40.0, 0.0)).unwrap();
        level
            .spawn(Entity::new(EntityId(3)).with_tag("player").with_rect(Rect::new(80.0, 0.0, 16.0, 16.0)))
            .unwrap();
        assert_eq!(level.find_by_tag("player").unwrap().id, EntityId(3));
        assert_eq!(level.find_all_by_tag("crate").len(), 2);
    }

    #[test]
    fn validate_surfaces_missing_components() {
        let mut level = level();
        let entity = Entity::new(EntityId(1))
            .with_rect(Rect::new(0.0, 0.0, 16.0, 16.0))
            .with_component(TimerComponent::new(1.0, Action::Texture { index: 0 }));
        level.spawn(entity).unwrap();
        assert!(matches!(level.validate(), Err(LevelError::MissingRequiredComponent { .. })));
    }

    #[test]
    fn despawn_removes_from_grid() {
        let mut level = level();
        let id = level.spawn(crate_at(1, 0.0, 0.0)).unwrap();
        let entity = level.despawn(id).unwrap();
        assert!(!entity.states()[0].is_active());
        assert!(!level.grid().contains(id));
        assert!(level.despawn(id).is_none());
    }
}
