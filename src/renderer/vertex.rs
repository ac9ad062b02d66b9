//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::Tint;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const ORANGE: [f32; 4] = [1.0, 0.647, 0.0, 1.0];
    pub const PURPLE: [f32; 4] = [0.5, 0.0, 0.5, 1.0];
    pub const TURQUOISE: [f32; 4] = [0.25, 0.878, 0.816, 1.0];

    pub const BACKGROUND: [f32; 4] = WHITE;
    pub const TEXT: [f32; 4] = BLACK;
}

/// Display color of a tint
pub fn tint_color(tint: Tint) -> [f32; 4] {
    match tint {
        Tint::Green => colors::GREEN,
        Tint::Blue => colors::BLUE,
        Tint::Red => colors::RED,
        Tint::Purple => colors::PURPLE,
        Tint::Yellow => colors::YELLOW,
        Tint::Orange => colors::ORANGE,
        Tint::Turquoise => colors::TURQUOISE,
        Tint::Black => colors::BLACK,
    }
}
