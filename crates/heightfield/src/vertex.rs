//! Interleaved vertex handed to the renderer.

use bytemuck::{Pod, Zeroable};

/// `vec3 position, vec3 normal, vec2 uv`, tightly packed (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Byte offsets of the three attributes, in shader-location order.
    pub const ATTRIBUTE_OFFSETS: [usize; 3] = [
        0,
        std::mem::size_of::<[f32; 3]>(),
        std::mem::size_of::<[f32; 6]>(),
    ];

    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}
