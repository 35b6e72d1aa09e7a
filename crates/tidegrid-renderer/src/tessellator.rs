//! Screen Tessellation
//!
//! Splits a viewport into grid tiles, escalating to smaller tiles when a
//! tile would exceed the per-mesh vertex ceiling.

use tidegrid_core::math::{round_up_to_multiple, Vec2};
use tidegrid_core::{DEFAULT_VERTEX_CEILING, MAX_SCREEN_SIZE};

use crate::mesh::{build_tile, GridMesh};
use crate::quality::{GroupSpan, GroupTier, QualityLevel};
use crate::{GridError, GridResult};

/// Outcome of the group tier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChoice {
    /// Tier actually used for tiling
    pub tier: GroupTier,
    /// Span of `tier`
    pub span: GroupSpan,
    /// Vertices per row of one tile
    pub verts_x: u32,
    /// Vertices per column of one tile
    pub verts_y: u32,
    /// Whether one tile fits under the vertex ceiling
    pub within_budget: bool,
}

impl TierChoice {
    pub fn verts_per_tile(&self) -> u64 {
        self.verts_x as u64 * self.verts_y as u64
    }
}

/// Builds the tile list for a viewport
#[derive(Debug, Clone, Copy)]
pub struct Tessellator {
    vertex_ceiling: u32,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_CEILING)
    }
}

impl Tessellator {
    pub fn new(vertex_ceiling: u32) -> Self {
        Self { vertex_ceiling }
    }

    /// Pick the tier whose tiles fit under the vertex ceiling
    ///
    /// Starts from `tier` and moves to finer tiers while a tile is over
    /// budget. Stopping at `Extreme` while still over budget is reported
    /// through [`TierChoice::within_budget`] and logged, never an error.
    pub fn choose_effective_tier(
        &self,
        cell_size: u32,
        tier: GroupTier,
        width: u32,
        height: u32,
    ) -> TierChoice {
        let cell_size = cell_size.max(1);
        let mut tier = tier;
        let mut span = tier.group_span();
        let (mut verts_x, mut verts_y) = match span {
            GroupSpan::Whole => (width / cell_size, height / cell_size),
            GroupSpan::Tiles(size) => (size / cell_size, size / cell_size),
        };

        let ceiling = self.vertex_ceiling as u64;
        while verts_x as u64 * verts_y as u64 > ceiling {
            let Some(next) = tier.next_finer() else {
                log::warn!(
                    "Grid tile of {}x{} vertices exceeds ceiling of {} even at the smallest group span",
                    verts_x, verts_y, self.vertex_ceiling
                );
                return TierChoice { tier, span, verts_x, verts_y, within_budget: false };
            };

            log::debug!("Group tier {} over vertex budget, trying {}", tier, next);
            tier = next;
            span = tier.group_span();
            if let GroupSpan::Tiles(size) = span {
                verts_x = size / cell_size;
                verts_y = size / cell_size;
            }
        }

        TierChoice { tier, span, verts_x, verts_y, within_budget: true }
    }

    /// Tessellate a `width` x `height` viewport
    ///
    /// Dimensions are expected to be clamped to [`MAX_SCREEN_SIZE`] already;
    /// larger ones are rejected. A zero dimension yields no tiles.
    pub fn tessellate(
        &self,
        width: u32,
        height: u32,
        quality: QualityLevel,
        tier: GroupTier,
    ) -> GridResult<Vec<GridMesh>> {
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        if width > MAX_SCREEN_SIZE || height > MAX_SCREEN_SIZE {
            return Err(GridError::InvalidArgument(format!(
                "viewport {width}x{height} exceeds {MAX_SCREEN_SIZE}x{MAX_SCREEN_SIZE}"
            )));
        }

        let choice = self.choose_effective_tier(quality.cell_size(), tier, width, height);

        let size = match choice.span {
            GroupSpan::Whole => {
                // Viewports narrower than two cells still get a valid tile.
                let mesh = build_tile(choice.verts_x.max(2), choice.verts_y.max(2), Vec2::ZERO, Vec2::ONE)?;
                return Ok(vec![mesh]);
            }
            GroupSpan::Tiles(size) => size,
        };

        let padded_width = round_up_to_multiple(width, size);
        let padded_height = round_up_to_multiple(height, size);
        let tiles_x = padded_width / size;
        let tiles_y = padded_height / size;
        let span = Vec2::new(size as f32 / padded_width as f32, size as f32 / padded_height as f32);

        let mut meshes = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for ix in 0..tiles_x {
            for iy in 0..tiles_y {
                let origin = Vec2::new(ix as f32, iy as f32) * span;
                meshes.push(build_tile(choice.verts_x, choice.verts_y, origin, span)?);
            }
        }

        log::debug!(
            "Tessellated {}x{} at {} into {} tile(s) of {}x{} vertices (tier {})",
            width, height, quality, meshes.len(), choice.verts_x, choice.verts_y, choice.tier
        );

        Ok(meshes)
    }
}
