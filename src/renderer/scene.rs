//! Scene building
//!
//! Turns a `GameState` into a flat triangle list in screen pixels plus the
//! text captions the overlay draws on top. Kept free of GPU types so it can
//! be tested without a device.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, tint_color};
use crate::sim::{Entity, EntityKind, GamePhase, GameState, Tint};
use crate::viewport_size;

/// Points counter position
pub const POINTS_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);

pub const WIN_TEXT: &str = "Congrats! You won!";
pub const LOSE_TEXT: &str = "LLLLLLLLLLLLL";

const CIRCLE_SEGMENTS: u32 = 24;

/// Which point of the text box `Caption::pos` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
}

/// A line of overlay text in viewport pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub pos: Vec2,
    pub anchor: Anchor,
}

impl Caption {
    fn centered(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pos: viewport_size() / 2.0,
            anchor: Anchor::Center,
        }
    }
}

/// Vertices for everything on screen during play. The end screen is the
/// bare background, so nothing is drawn once the run is over.
pub fn build_scene(state: &GameState) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    if state.phase.is_terminal() {
        return vertices;
    }

    for entity in state.entities.iter().filter(|e| e.alive) {
        vertices.extend(entity_shape(entity));
    }

    let player = &state.player;
    let color = tint_color(player.tint);
    // Warning and level-up tints fill the whole sprite box
    if player.tint == Tint::Green {
        vertices.extend(shapes::circle(
            player.body.pos,
            player.body.half_extents.x,
            color,
            CIRCLE_SEGMENTS,
        ));
    } else {
        let aabb = player.body.aabb();
        vertices.extend(shapes::rect(aabb.min, aabb.max, color));
    }

    vertices
}

/// Text for the current frame: the win/lose message alone once the run is
/// over, otherwise the points counter and any story line
pub fn captions(state: &GameState) -> Vec<Caption> {
    if let Some(message) = end_message(state.phase) {
        return vec![Caption::centered(message)];
    }

    let mut captions = vec![Caption {
        text: points_text(state.player.points),
        pos: POINTS_ORIGIN,
        anchor: Anchor::TopLeft,
    }];
    if let Some(story) = state.story {
        captions.push(Caption::centered(story));
    }
    captions
}

fn entity_shape(entity: &Entity) -> Vec<Vertex> {
    let color = tint_color(entity.tint);
    let body = &entity.body;
    let filled = match entity.kind {
        EntityKind::Obstacle | EntityKind::Follower { .. } => true,
        EntityKind::Boss { wounded } => wounded,
        EntityKind::Npc | EntityKind::Mob | EntityKind::Ball { .. } => false,
    };

    if filled {
        let aabb = body.aabb();
        shapes::rect(aabb.min, aabb.max, color)
    } else {
        shapes::circle(body.pos, body.half_extents.x, color, CIRCLE_SEGMENTS)
    }
}

pub fn points_text(points: u32) -> String {
    format!("Points: {}", points)
}

/// Message shown once a run is over
pub fn end_message(phase: GamePhase) -> Option<&'static str> {
    match phase {
        GamePhase::Won => Some(WIN_TEXT),
        GamePhase::Lost => Some(LOSE_TEXT),
        _ => None,
    }
}
