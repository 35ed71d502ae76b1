//! Movement and collision resolution.
//!
//! Each non-static entity turns its queued intents into a velocity, then
//! moves along Y and then X in epsilon steps against the other physics
//! entities found through the spatial grid. The first overlapping step of an
//! axis stops that axis flush against the obstacle and raises a contact.
//!
//! Actions raised while resolving an entity (jump hook, collision reactions,
//! movement hooks) are collected and run once its box has been written.

use glam::Vec2;

use crate::actions::Action;
use crate::api::types::{Contact, EntityId, Side};
use crate::components::physics::{JumpState, MoveHook, MovementType, PhysicsIntent};
use crate::core::geometry::{ranges_overlap, Rect};
use crate::core::level::Level;

/// Result of resolving one displacement.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Distance actually travelled.
    pub displacement: Vec2,
    /// Contacts raised by the move, seen from the mover.
    pub contacts: Vec<Contact>,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: EntityId,
    rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn offset(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }

    fn side(self, amount: f32) -> Side {
        match (self, amount > 0.0) {
            (Axis::X, true) => Side::Right,
            (Axis::X, false) => Side::Left,
            (Axis::Y, true) => Side::Up,
            (Axis::Y, false) => Side::Down,
        }
    }
}

struct AxisSweep {
    rect: Rect,
    hits: Vec<EntityId>,
    blocked: bool,
}

struct Resolution {
    outcome: MoveOutcome,
    end: Rect,
    reactions: Vec<(Action, EntityId)>,
}

/// Broad phase: physics entities in the area swept by `rect` moving by
/// `delta`, minus ignored tags and platforms the mover is not above.
fn collect_candidates(level: &Level, id: EntityId, rect: Rect, delta: Vec2) -> Vec<Candidate> {
    let Some(mover) = level.scene.get(id) else {
        return Vec::new();
    };
    let Some(mover_physics) = mover.physics() else {
        return Vec::new();
    };
    let area = rect.merge(&rect.translated(delta));
    level
        .grid
        .query(&area)
        .into_iter()
        .filter(|other| *other != id)
        .filter_map(|other| {
            let entity = level.scene.get(other)?;
            let physics = entity.physics()?;
            if mover_physics.ignores(&entity.tag) || physics.ignores(&mover.tag) {
                return None;
            }
            let other_rect = entity.rect();
            if physics.is_platform && rect.bottom() < other_rect.top() {
                return None;
            }
            Some(Candidate { id: other, rect: other_rect })
        })
        .collect()
}

/// Box placed exactly against the nearest of `hits` when travelling along `axis`.
fn flush_against(rect: Rect, axis: Axis, amount: f32, hits: &[&Candidate]) -> Option<Rect> {
    let mut placed = rect;
    match (axis, amount > 0.0) {
        (Axis::Y, false) => placed.pos.y = hits.iter().map(|c| c.rect.top()).reduce(f32::max)?,
        (Axis::Y, true) => {
            placed.pos.y = hits.iter().map(|c| c.rect.bottom()).reduce(f32::min)? - rect.size.y
        }
        (Axis::X, true) => {
            placed.pos.x = hits.iter().map(|c| c.rect.left()).reduce(f32::min)? - rect.size.x
        }
        (Axis::X, false) => placed.pos.x = hits.iter().map(|c| c.rect.right()).reduce(f32::max)?,
    }
    Some(placed)
}

/// Step `rect` along one axis by `epsilon` until it reaches `amount` or
/// overlaps a candidate. Candidates already overlapping at the start are
/// not obstacles for this axis.
fn sweep_axis(rect: Rect, amount: f32, axis: Axis, epsilon: f32, candidates: &[Candidate]) -> AxisSweep {
    if amount == 0.0 {
        return AxisSweep { rect, hits: Vec::new(), blocked: false };
    }
    let solid: Vec<&Candidate> = candidates.iter().filter(|c| !c.rect.overlaps(&rect)).collect();
    let dir = amount.signum();
    let total = amount.abs();
    let mut moved = 0.0_f32;

    while moved < total {
        let mut next = (moved + epsilon).min(total);
        if next <= moved {
            next = total;
        }
        let probe = rect.translated(axis.offset(dir * next));
        let hits: Vec<&Candidate> = solid.iter().copied().filter(|c| c.rect.overlaps(&probe)).collect();
        if !hits.is_empty() {
            let resting = rect.translated(axis.offset(dir * moved));
            let placed = flush_against(rect, axis, amount, &hits)
                .filter(|p| {
                    let travelled = match axis {
                        Axis::X => (p.pos.x - rect.pos.x) * dir,
                        Axis::Y => (p.pos.y - rect.pos.y) * dir,
                    };
                    (0.0..=next).contains(&travelled) && !hits.iter().any(|c| c.rect.overlaps(p))
                })
                .unwrap_or(resting);
            return AxisSweep {
                rect: placed,
                hits: hits.iter().map(|c| c.id).collect(),
                blocked: true,
            };
        }
        moved = next;
    }

    AxisSweep {
        rect: rect.translated(axis.offset(amount)),
        hits: Vec::new(),
        blocked: false,
    }
}

/// Zero vertical movement while overlapping something: lift the box onto
/// the obstacle's top. No contact is raised.
fn snap_onto_overlapped(mut rect: Rect, candidates: &[Candidate], bounds: &Rect) -> Rect {
    for candidate in candidates {
        if candidate.rect.overlaps(&rect) {
            rect.pos.y = candidate.rect.top().min(bounds.top() - rect.size.y);
        }
    }
    rect
}

/// Silent probe: would moving by `offset` overlap a candidate not already overlapped?
fn probe_blocked(level: &Level, id: EntityId, rect: Rect, offset: Vec2) -> bool {
    let probe = rect.translated(offset);
    collect_candidates(level, id, rect, offset)
        .iter()
        .any(|c| !c.rect.overlaps(&rect) && c.rect.overlaps(&probe))
}

fn is_supported(level: &Level, id: EntityId, rect: Rect) -> bool {
    rect.bottom() <= level.config.world_bounds.bottom()
        || probe_blocked(level, id, rect, Vec2::new(0.0, -level.config.epsilon))
}

/// Move `id` by `delta`, write its box and record contacts. Collision
/// reactions are returned for the caller to dispatch.
fn resolve(level: &mut Level, id: EntityId, delta: Vec2) -> Option<Resolution> {
    let bounds = level.config.world_bounds;
    let epsilon = level.config.epsilon;
    let start = level.scene.get(id)?.rect();
    // No axis travels further than the world extent.
    let delta = if delta.is_finite() {
        delta.clamp(-bounds.size, bounds.size)
    } else {
        log::warn!("entity {} asked to move by {:?}, ignored", id, delta);
        Vec2::ZERO
    };
    let candidates = collect_candidates(level, id, start, delta);

    let mut rect = start;
    let mut hits: Vec<(EntityId, Side)> = Vec::new();

    let blocked_y = if delta.y == 0.0 {
        rect = snap_onto_overlapped(rect, &candidates, &bounds);
        false
    } else {
        let sweep = sweep_axis(rect, delta.y, Axis::Y, epsilon, &candidates);
        rect = sweep.rect.clamped_within(&bounds);
        hits.extend(sweep.hits.into_iter().map(|h| (h, Axis::Y.side(delta.y))));
        sweep.blocked
    };

    let sweep = sweep_axis(rect, delta.x, Axis::X, epsilon, &candidates);
    rect = sweep.rect.clamped_within(&bounds);
    hits.extend(sweep.hits.into_iter().map(|h| (h, Axis::X.side(delta.x))));
    let blocked_x = sweep.blocked;

    let mover = level.scene.get_mut(id)?;
    mover.set_rect(rect);
    let mover_tag = mover.tag.clone();
    level.grid.relocate(id, rect);

    let mut contacts = Vec::with_capacity(hits.len());
    let mut reactions = Vec::new();
    for (index, (other, side)) in hits.into_iter().enumerate() {
        let trigger_index = index as u32;
        let contact = Contact { entity: id, other, side, trigger_index };
        log::trace!("contact {} -> {} on {:?} (#{})", id, other, side, trigger_index);
        level.contacts.push(contact);
        level.contacts.push(Contact {
            entity: other,
            other: id,
            side: -side,
            trigger_index,
        });
        contacts.push(contact);

        let Some(other_entity) = level.scene.get(other) else {
            continue;
        };
        if let Some(reaction) = level.physics(id).and_then(|p| p.reaction_for(side, &other_entity.tag)) {
            let target = if reaction.apply_to_collider { other } else { id };
            reactions.push((reaction.action.clone(), target));
        }
        if let Some(reaction) = other_entity.physics().and_then(|p| p.reaction_for(-side, &mover_tag)) {
            let target = if reaction.apply_to_collider { id } else { other };
            reactions.push((reaction.action.clone(), target));
        }
    }

    Some(Resolution {
        outcome: MoveOutcome {
            displacement: rect.pos - start.pos,
            contacts,
            blocked_x,
            blocked_y,
        },
        end: rect,
        reactions,
    })
}

/// Snap `previous` to the epsilon grid, then blend toward `target`.
/// Settles on `target` once within epsilon of it, or once blending no
/// longer reaches another grid step (the next tick would repeat this one).
fn smooth(previous: f32, target: f32, epsilon: f32, blend: f32) -> f32 {
    let snap = |v: f32| (v / epsilon).round() * epsilon;
    let snapped = snap(previous);
    let blended = snapped + (target - snapped) * blend;
    if (blended - target).abs() < epsilon || snap(blended) == snapped {
        target
    } else {
        blended
    }
}

/// One physics tick for `id`.
pub(crate) fn update_physics(level: &mut Level, id: EntityId, dt: f32) {
    let config = level.config.clone();
    let Some(entity) = level.scene.get_mut(id) else {
        return;
    };
    let rect = entity.rect();
    let Some(physics) = entity.physics_mut() else {
        return;
    };
    if physics.is_static {
        physics.intents.clear();
        return;
    }

    let intents = std::mem::take(&mut physics.intents);
    let move_speed = physics.move_speed;
    let local_gravity = physics.gravity_enabled;
    let jump_height = physics.jump_height;
    let movement_type = physics.movement_type;
    let previous = physics.velocity;
    let mut jump = physics.jump;

    let mut raw = Vec2::ZERO;
    let mut jump_request = None;
    for intent in intents {
        match intent {
            PhysicsIntent::GoLeft => raw.x -= move_speed,
            PhysicsIntent::GoRight => raw.x += move_speed,
            PhysicsIntent::GoUp => raw.y += move_speed,
            PhysicsIntent::GoDown => raw.y -= move_speed,
            PhysicsIntent::Jump | PhysicsIntent::ForceJump => jump_request = Some(intent),
        }
    }

    let mut started = false;
    if !config.gravity_enabled {
        jump = JumpState::Grounded;
    } else if let JumpState::Jumping { target_top } = jump {
        let finished = rect.top() >= target_top
            || rect.top() >= config.world_bounds.top()
            || probe_blocked(level, id, rect, Vec2::new(0.0, config.epsilon));
        if finished {
            jump = JumpState::Grounded;
        }
    } else if let Some(request) = jump_request {
        if local_gravity && (request == PhysicsIntent::ForceJump || is_supported(level, id, rect)) {
            jump = JumpState::Jumping { target_top: rect.top() + jump_height };
            started = true;
        }
    }

    if jump.is_jumping() {
        raw.y += config.gravity;
    } else if config.gravity_enabled && local_gravity {
        raw.y -= config.gravity;
    }

    let scaled = raw * config.speed_scale(dt);
    let velocity = match movement_type {
        MovementType::Linear => scaled,
        MovementType::Smooth => Vec2::new(
            smooth(previous.x, scaled.x, config.epsilon, config.smoothing),
            smooth(previous.y, scaled.y, config.epsilon, config.smoothing),
        ),
    };

    let mut queued = Vec::new();
    if let Some(physics) = level.physics_mut(id) {
        physics.jump = jump;
        physics.velocity = velocity;
        if jump.is_jumping() {
            physics.intents.insert(PhysicsIntent::Jump);
        }
        if started {
            queued.push((physics.on_jump.clone(), id));
        }
    }

    let Some(resolution) = resolve(level, id, velocity) else {
        return;
    };
    queued.extend(resolution.reactions);

    let bounds = config.world_bounds;
    let end = resolution.end;
    let outcome = &resolution.outcome;
    let mut hooks = Vec::new();
    if velocity.y > 0.0 && !outcome.blocked_y && end.top() < bounds.top() {
        hooks.push(MoveHook::Up);
    }
    if velocity.y < 0.0 && !outcome.blocked_y && end.bottom() > bounds.bottom() {
        hooks.push(MoveHook::Down);
    }
    if velocity.x > 0.0 && !outcome.blocked_x && end.right() < bounds.right() {
        hooks.push(MoveHook::Right);
    }
    if velocity.x < 0.0 && !outcome.blocked_x && end.left() > bounds.left() {
        hooks.push(MoveHook::Left);
    }
    if outcome.displacement.x.abs() <= config.epsilon && outcome.displacement.y.abs() <= config.epsilon {
        hooks.push(MoveHook::Nothing);
    }
    if let Some(physics) = level.physics(id) {
        queued.extend(
            hooks
                .into_iter()
                .map(|hook| physics.hook(hook))
                .filter(|action| !action.is_empty())
                .map(|action| (action.clone(), id)),
        );
    }

    level.dispatch(queued);
}

/// Resolve an explicit displacement for a non-static physics entity.
/// Collision reactions fire; movement hooks do not.
pub fn move_entity(level: &mut Level, id: EntityId, delta: Vec2) -> Option<MoveOutcome> {
    if level.physics(id)?.is_static {
        return None;
    }
    let resolution = resolve(level, id, delta)?;
    level.dispatch(resolution.reactions);
    Some(resolution.outcome)
}

fn touches(rect: &Rect, other: &Rect, side: Side, epsilon: f32) -> bool {
    let vertical = ranges_overlap(rect.bottom(), rect.top(), other.bottom(), other.top());
    let horizontal = ranges_overlap(rect.left(), rect.right(), other.left(), other.right());
    match side {
        Side::Left => vertical && (rect.left() - other.right()).abs() <= epsilon,
        Side::Right => vertical && (other.left() - rect.right()).abs() <= epsilon,
        Side::Up => horizontal && (other.bottom() - rect.top()).abs() <= epsilon,
        Side::Down => horizontal && (rect.bottom() - other.top()).abs() <= epsilon,
        Side::All => [Side::Left, Side::Right, Side::Up, Side::Down]
            .into_iter()
            .any(|s| touches(rect, other, s, epsilon)),
    }
}

/// Entities whose box touches the given edge of `id` within `epsilon`.
/// Any entity counts, with or without physics.
pub fn entities_touching_side(level: &Level, id: EntityId, side: Side, epsilon: f32) -> Vec<EntityId> {
    let Some(entity) = level.scene.get(id) else {
        return Vec::new();
    };
    let rect = entity.rect();
    level
        .grid
        .query(&rect.expanded(epsilon))
        .into_iter()
        .filter(|other| *other != id)
        .filter(|other| {
            level
                .scene
                .get(*other)
                .is_some_and(|e| touches(&rect, &e.rect(), side, epsilon))
        })
        .collect()
}
