//! WebGPU rendering module
//!
//! The scene is flat-colored triangles built on the CPU each frame from a
//! `RenderFrame`; one alpha-blended pipeline draws them.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, canvas_to_ndc};
pub use vertex::Vertex;
