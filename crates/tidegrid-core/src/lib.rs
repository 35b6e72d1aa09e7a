//! # Tidegrid Core
//!
//! Foundational types shared by the Tidegrid crates.
//!
//! - **Math**: glam re-exports and an axis-aligned bounding box used for
//!   per-frame mesh bounds

pub mod math;

pub use math::{Aabb, Mat4, Vec2, Vec3};

/// Largest viewport edge, in pixels, that grid meshes are built for
pub const MAX_SCREEN_SIZE: u32 = 2048;

/// Default per-mesh vertex ceiling
pub const DEFAULT_VERTEX_CEILING: u32 = 65_000;
