use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Unique identifier for an entity in the level.
/// Stable for the entity's whole lifetime and never reused by `Level::next_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A sound trigger emitted by the simulation.
/// The numeric value maps to a sound the host audio layer knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    /// Trigger used when a sound path could not be resolved.
    pub const SILENT: SoundEvent = SoundEvent(0);
}

/// Side of a box, used for contacts, collision reactions and edge queries.
///
/// `All` is the wildcard: in a reaction it matches any side, in
/// `entities_touching_side` it unions the four single-side queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
    Up,
    Down,
    All,
}

impl Side {
    /// Does this (possibly wildcard) side accept a contact on `other`?
    pub fn matches(self, other: Side) -> bool {
        self == Side::All || self == other
    }
}

impl Neg for Side {
    type Output = Side;

    /// The side as seen from the other participant of a contact.
    fn neg(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Up => Side::Down,
            Side::Down => Side::Up,
            Side::All => Side::All,
        }
    }
}

/// One contact raised by movement resolution.
///
/// Every contact is reported twice on the level's contact channel: once from
/// the mover's point of view and once, with the side negated, from the
/// obstacle's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub entity: EntityId,
    pub other: EntityId,
    pub side: Side,
    /// Index of this contact within the resolution pass that raised it.
    pub trigger_index: u32,
}
