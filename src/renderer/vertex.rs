//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

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

/// Colors for the parade ground
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.08, 0.1, 0.08, 1.0];
    pub const FIELD: [f32; 4] = [0.22, 0.45, 0.2, 1.0];
    pub const FIELD_LINE: [f32; 4] = [0.9, 0.95, 0.9, 0.35];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.25];

    pub const ZONE_OK: [f32; 4] = [0.3, 0.9, 0.4, 0.35];
    pub const ZONE_OUT: [f32; 4] = [0.95, 0.25, 0.2, 0.4];
    pub const ZONE_GRACE: [f32; 4] = [0.95, 0.85, 0.3, 0.3];
    pub const ZONE_RING: [f32; 4] = [1.0, 1.0, 1.0, 0.8];

    pub const NPC_UNIFORM: [f32; 4] = [0.1, 0.15, 0.45, 1.0];
    pub const NPC_PLUME: [f32; 4] = [0.85, 0.1, 0.15, 1.0];
    pub const PLAYER_UNIFORM: [f32; 4] = [0.9, 0.75, 0.2, 1.0];
    pub const PLAYER_PLUME: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SKIN: [f32; 4] = [0.96, 0.8, 0.65, 1.0];

    pub const STICK_BASE: [f32; 4] = [1.0, 1.0, 1.0, 0.15];
    pub const STICK_RING: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
    pub const STICK_KNOB: [f32; 4] = [1.0, 1.0, 1.0, 0.6];
}
