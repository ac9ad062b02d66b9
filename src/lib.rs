//! Quest Arena - a single-screen arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, progression)
//! - `renderer`: wgpu rendering pipeline and scene building
//! - `platform`: Window/input/clock glue for the native host
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Viewport dimensions (pixels, y grows downward)
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 800.0;

    /// Fixed simulation timestep in microseconds (~60 Hz)
    pub const SIM_DT_US: u64 = 16_667;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// How long the win/lose screen stays up before the window closes
    pub const END_SCREEN_US: u64 = 3_000_000;

    /// Window title
    pub const WINDOW_TITLE: &str = "Open World Game";
}

/// Size of the viewport as a vector
#[inline]
pub fn viewport_size() -> Vec2 {
    Vec2::new(consts::VIEWPORT_WIDTH, consts::VIEWPORT_HEIGHT)
}

/// Convert microseconds to seconds for movement integration
#[inline]
pub fn us_to_secs(us: u64) -> f32 {
    us as f32 / 1_000_000.0
}

/// Convert microseconds to whole milliseconds (for logs and summaries)
#[inline]
pub fn us_to_ms(us: u64) -> u64 {
    us / 1_000
}
