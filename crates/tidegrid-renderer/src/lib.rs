//! # Tidegrid Renderer
//!
//! Screen-space grid meshes for projected grid rendering (oceans and other
//! planar surfaces displaced in the vertex shader).
//!
//! ## Features
//! - Quality levels mapped to grid cell sizes
//! - Viewport tessellation into tiles under a per-mesh vertex ceiling
//! - Border overscan with edge falloff for seam blending
//! - Per-context mesh caches rebuilt only on resolution changes

pub mod quality;
pub mod mesh;
pub mod tessellator;
pub mod cache;
pub mod projected_grid;

pub use quality::{GroupSpan, GroupTier, QualityLevel};
pub use mesh::{build_tile, GridMesh, GridVertex, MeshId};
pub use tessellator::{Tessellator, TierChoice};
pub use cache::{CacheStats, ViewportMeshCache, ViewportResolution};
pub use projected_grid::{
    CameraView, DrawSink, FrameReport, GridSettings, MaterialHandle, ProjectedGridCache,
    ProjectionProcessor, RenderContext, ShaderGlobals,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidegrid_core::{DEFAULT_VERTEX_CEILING, MAX_SCREEN_SIZE};

/// Grid errors
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown quality level: {0}")]
    UnknownQuality(String),

    #[error("Unknown group tier: {0}")]
    UnknownGroupTier(String),

    #[error("Invalid grid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Vertex density
    pub quality: QualityLevel,
    /// Requested tiling tier
    pub group_tier: GroupTier,
    /// Maximum vertices per mesh
    pub vertex_ceiling: u32,
    /// Largest viewport edge in pixels
    pub max_screen_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            quality: QualityLevel::Medium,
            group_tier: GroupTier::Single,
            vertex_ceiling: DEFAULT_VERTEX_CEILING,
            max_screen_size: MAX_SCREEN_SIZE,
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check limits that would make every tessellation degenerate
    pub fn validate(&self) -> GridResult<()> {
        if self.vertex_ceiling < 4 {
            return Err(GridError::InvalidArgument(format!(
                "vertex ceiling must allow at least one quad, got {}",
                self.vertex_ceiling
            )));
        }
        if self.max_screen_size == 0 || self.max_screen_size > MAX_SCREEN_SIZE {
            return Err(GridError::InvalidArgument(format!(
                "max screen size must be in 1..={}, got {}",
                MAX_SCREEN_SIZE, self.max_screen_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.quality, QualityLevel::Medium);
        assert_eq!(config.group_tier, GroupTier::Single);
        assert_eq!(config.vertex_ceiling, 65000);
        assert_eq!(config.max_screen_size, 2048);
    }

    #[test]
    fn test_config_json() {
        let config = GridConfig::from_json(r#"{ "quality": "ultra", "group_tier": "high" }"#).unwrap();
        assert_eq!(config.quality, QualityLevel::Ultra);
        assert_eq!(config.group_tier, GroupTier::High);
        assert_eq!(config.vertex_ceiling, 65000);

        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"ultra\""));
        assert_eq!(GridConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            GridConfig::from_json(r#"{ "quality": "huge" }"#),
            Err(GridError::Config(_))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{ "vertex_ceiling": 2 }"#),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(GridConfig::from_json(r#"{ "max_screen_size": 0 }"#).is_err());
        assert!(matches!(
            GridConfig::from_json(r#"{ "max_screen_size": 2147483647 }"#),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(GridConfig::from_json(r#"{ "max_screen_size": 2048 }"#).is_ok());
    }
}
