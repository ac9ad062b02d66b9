//! wgpu rendering module
//!
//! Shapes are one list of flat-colored triangles built on the CPU in screen
//! pixels, mapped to clip space and drawn in one pass. Text is drawn over
//! them by egui in a second pass.

pub mod overlay;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Anchor, Caption, build_scene, captions};
pub use vertex::{Vertex, colors};
