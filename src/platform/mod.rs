//! Platform layer
//!
//! Everything between the OS and the simulation:
//! - Window attributes
//! - Keyboard state and its translation into `TickInput`
//! - Wall-clock to fixed-step conversion
//! - Host setup errors

pub mod clock;
pub mod input;

use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::window::WindowAttributes;

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WINDOW_TITLE};

pub use clock::FrameClock;
pub use input::{InputState, Key, map_key};

/// Window settings for the game
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            width: VIEWPORT_WIDTH as u32,
            height: VIEWPORT_HEIGHT as u32,
        }
    }
}

impl PlatformConfig {
    /// Fixed-size, non-resizable window attributes
    pub fn window_attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(self.width, self.height))
            .with_resizable(false)
    }
}

/// Failures while bringing up the window and GPU
#[derive(Debug, Error)]
pub enum HostError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface has no supported formats")]
    NoSurfaceFormat,

    #[error("GPU out of memory")]
    OutOfMemory,
}
