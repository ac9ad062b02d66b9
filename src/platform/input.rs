//! Keyboard state with both held and edge-triggered queries.
//!
//! Movement reads the held set every step. Interact and action fire once per
//! key press: `just_pressed` survives until `end_frame()`, which the host calls
//! only after a simulation step has consumed it, so a press on a frame with no
//! fixed step is not lost.

use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::sim::TickInput;

/// Game-level keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Talk to the NPC / accept the quest
    Interact,
    /// Melee, sword or ranged depending on what is touching the player
    Action,
    Quit,
}

/// Physical key binding
pub fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Space => Some(Key::Interact),
        KeyCode::KeyK => Some(Key::Action),
        KeyCode::Escape => Some(Key::Quit),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        // OS key repeat arrives as more presses; only the first counts
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Snapshot for one simulation step
    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_held(Key::Left),
            right: self.is_held(Key::Right),
            up: self.is_held(Key::Up),
            down: self.is_held(Key::Down),
            interact: self.is_just_pressed(Key::Interact),
            action: self.is_just_pressed(Key::Action),
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}
