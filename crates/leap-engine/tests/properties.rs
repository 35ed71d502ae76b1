//! Property tests for movement resolution and level bookkeeping.
//!
//! Random boxes, displacements and operation sequences are generated with
//! `proptest`; each test checks an invariant that must hold for all of them.

use glam::Vec2;
use leap_engine::{
    Entity, EntityId, KeyboardState, Level, LevelConfig, PhysicsComponent, PhysicsIntent, Rect,
    State,
};
use proptest::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Coordinates on a 0.5 grid, well inside the default world bounds.
fn coord(lo: i32, hi: i32) -> impl Strategy<Value = f32> {
    (lo * 2..hi * 2).prop_map(|v| v as f32 * 0.5)
}

fn extent() -> impl Strategy<Value = f32> {
    (2i32..80).prop_map(|v| v as f32 * 0.5)
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (coord(200, 900), coord(200, 900), extent(), extent()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn intent_strategy() -> impl Strategy<Value = PhysicsIntent> {
    prop_oneof![
        Just(PhysicsIntent::GoLeft),
        Just(PhysicsIntent::GoRight),
        Just(PhysicsIntent::GoUp),
        Just(PhysicsIntent::GoDown),
        Just(PhysicsIntent::Jump),
        Just(PhysicsIntent::ForceJump),
    ]
}

fn solid(id: u32, rect: Rect) -> Entity {
    Entity::new(EntityId(id))
        .with_tag("solid")
        .with_rect(rect)
        .with_component(PhysicsComponent::fixed())
}

fn mover(id: u32, rect: Rect) -> Entity {
    Entity::new(EntityId(id))
        .with_tag("mover")
        .with_rect(rect)
        .with_component(PhysicsComponent::dynamic(5.0).with_jump_height(40.0))
}

/// Operations on a level's entity set.
#[derive(Debug, Clone)]
enum LevelOp {
    Spawn(Rect),
    Despawn(usize),
    Teleport(usize, f32, f32),
    Push(usize, f32, f32),
    Tick,
}

fn level_op_strategy() -> impl Strategy<Value = LevelOp> {
    prop_oneof![
        rect_strategy().prop_map(LevelOp::Spawn),
        (0..20usize).prop_map(LevelOp::Despawn),
        (0..20usize, coord(-100, 5000), coord(-100, 3000)).prop_map(|(i, x, y)| LevelOp::Teleport(i, x, y)),
        (0..20usize, coord(-300, 300), coord(-300, 300)).prop_map(|(i, dx, dy)| LevelOp::Push(i, dx, dy)),
        Just(LevelOp::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn moves_never_end_inside_an_obstacle(
        start in rect_strategy(),
        obstacles in prop::collection::vec(rect_strategy(), 1..8),
        dx in coord(-400, 400),
        dy in coord(-400, 400),
    ) {
        prop_assume!(obstacles.iter().all(|o| !o.overlaps(&start)));

        let mut level = Level::new(LevelConfig::default()).unwrap();
        for (i, rect) in obstacles.iter().enumerate() {
            level.spawn(solid(i as u32 + 1, *rect)).unwrap();
        }
        let id = level.spawn(mover(100, start)).unwrap();

        let outcome = level.move_entity(id, Vec2::new(dx, dy)).unwrap();
        let end = level.entity(id).unwrap().rect();

        for obstacle in &obstacles {
            prop_assert!(!end.overlaps(obstacle), "ended inside {:?} at {:?}", obstacle, end);
        }
        prop_assert_eq!(end.pos - start.pos, outcome.displacement);
        prop_assert!(outcome.displacement.x.abs() <= dx.abs());
        prop_assert!(outcome.displacement.y.abs() <= dy.abs());
    }

    #[test]
    fn thin_walls_stop_fast_movers(
        x in coord(100, 300),
        wall_width in (1i32..8).prop_map(|v| v as f32 * 0.5),
        speed in coord(50, 2000),
    ) {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let wall_x = 400.0;
        level.spawn(solid(1, Rect::new(wall_x, 0.0, wall_width, 500.0))).unwrap();
        let id = level.spawn(mover(2, Rect::new(x, 100.0, 16.0, 16.0))).unwrap();

        level.move_entity(id, Vec2::new(speed, 0.0)).unwrap();

        prop_assert!(level.entity(id).unwrap().rect().right() <= wall_x);
    }

    #[test]
    fn static_entities_never_move(
        rect in rect_strategy(),
        ticks in prop::collection::vec(prop::collection::vec(intent_strategy(), 0..4), 1..20),
    ) {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let id = level.spawn(solid(1, rect)).unwrap();
        let keys = KeyboardState::new();

        for intents in ticks {
            for intent in intents {
                level.push_intent(id, intent);
            }
            level.update(DT, &keys);
            prop_assert_eq!(level.entity(id).unwrap().rect(), rect);
        }
        prop_assert!(level.move_entity(id, Vec2::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn platforms_only_block_from_above(
        platform_x in coord(200, 400),
        platform_y in coord(300, 600),
        offset in coord(1, 100),
        travel in coord(1, 400),
    ) {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let platform = Rect::new(platform_x, platform_y, 64.0, 8.0);
        level.spawn(
            Entity::new(EntityId(1))
                .with_tag("ledge")
                .with_rect(platform)
                .with_component(PhysicsComponent::platform()),
        ).unwrap();

        // Below: rising through never touches the platform.
        let below = level.spawn(mover(2, Rect::new(platform_x, platform_y - 16.0 - offset, 16.0, 16.0))).unwrap();
        let rising = level.move_entity(below, Vec2::new(0.0, offset + travel)).unwrap();
        prop_assert!(rising.contacts.is_empty());
        prop_assert!(!rising.blocked_y);
        level.despawn(below);

        // Above: falling lands flush on top once the fall reaches it.
        let above = level.spawn(mover(3, Rect::new(platform_x, platform.top() + offset, 16.0, 16.0))).unwrap();
        let falling = level.move_entity(above, Vec2::new(0.0, -(offset + travel))).unwrap();
        prop_assert!(falling.blocked_y);
        prop_assert_eq!(level.entity(above).unwrap().rect().bottom(), platform.top());
    }

    #[test]
    fn exactly_one_state_stays_active(
        switches in prop::collection::vec(0..6usize, 1..30),
    ) {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let entity = Entity::new(EntityId(1))
            .with_rect(Rect::new(10.0, 10.0, 16.0, 16.0))
            .with_states(vec![
                State::new("idle"),
                State::new("walk").with_component(PhysicsComponent::dynamic(2.0)),
                State::new("dead"),
            ]);
        let id = level.spawn(entity).unwrap();

        for index in switches {
            let before = level.entity(id).unwrap().current_state_index();
            let result = level.set_state(id, index);
            let entity = level.entity(id).unwrap();
            if index < 3 {
                prop_assert!(result.is_ok());
                prop_assert_eq!(entity.current_state_index(), index);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(entity.current_state_index(), before);
            }
            let active = entity.states().iter().filter(|s| s.is_active()).count();
            prop_assert_eq!(active, 1);
        }
    }

    #[test]
    fn grid_tracks_every_entity_box(ops in prop::collection::vec(level_op_strategy(), 1..40)) {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let keys = KeyboardState::new();
        let mut alive: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                LevelOp::Spawn(rect) => {
                    let id = level.next_id();
                    let entity = if id.0 % 2 == 0 { mover(id.0, rect) } else { solid(id.0, rect) };
                    level.spawn(entity).unwrap();
                    alive.push(id);
                }
                LevelOp::Despawn(i) => {
                    if !alive.is_empty() {
                        let id = alive.remove(i % alive.len());
                        prop_assert!(level.despawn(id).is_some());
                    }
                }
                LevelOp::Teleport(i, x, y) => {
                    if !alive.is_empty() {
                        level.set_position(alive[i % alive.len()], Vec2::new(x, y));
                    }
                }
                LevelOp::Push(i, dx, dy) => {
                    if !alive.is_empty() {
                        level.move_entity(alive[i % alive.len()], Vec2::new(dx, dy));
                    }
                }
                LevelOp::Tick => level.update(DT, &keys),
            }

            prop_assert_eq!(level.len(), alive.len());
            prop_assert_eq!(level.grid().len(), alive.len());
            let bounds = level.config().world_bounds;
            for entity in level.entities() {
                let rect = entity.rect();
                prop_assert_eq!(level.grid().registered_rect(entity.id), Some(rect));
                prop_assert!(rect.left() >= bounds.left() && rect.right() <= bounds.right());
                prop_assert!(rect.bottom() >= bounds.bottom() && rect.top() <= bounds.top());
                prop_assert!(level.grid().query(&rect).contains(&entity.id));
            }
        }
    }
}
