//! Procedural heightfields for the island scene: noise kernel, terrain shaping,
//! Gerstner ocean waves, and the grid meshes built from them.
//!
//! Everything here is pure CPU work. The crate produces position/normal/uv/index
//! arrays; uploading them and drawing is left to whatever renderer sits on top.

pub mod error;
pub mod grid;
pub mod kernel;
pub mod ocean;
pub mod resources;
pub mod shaping;
pub mod terrain;
pub mod vertex;
pub mod voronoi;
pub mod wave;

pub use error::HeightfieldError;
pub use grid::*;
pub use kernel::*;
pub use ocean::*;
pub use resources::*;
pub use shaping::*;
pub use terrain::*;
pub use vertex::*;
pub use voronoi::*;
pub use wave::*;

// Re-export commonly used types
pub use glam::{Vec2, Vec3};
