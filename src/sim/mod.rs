//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (integer microseconds)
//! - Seeded RNG only
//! - Stable iteration order (entity spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod state;
pub mod tick;

pub use collision::{Aabb, viewport_bounds};
pub use state::{
    Body, Direction, Entity, EntityKind, GameEvent, GamePhase, GameState, Player, RunSummary,
    Stats, Tint, Weapon, NPC_POSITION, QUEST_TEXT,
};
pub use tick::{TickInput, tick};
