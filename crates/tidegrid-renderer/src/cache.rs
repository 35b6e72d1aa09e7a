//! Viewport Mesh Cache
//!
//! Per-context store of grid mesh lists, keyed by quality level and tied to
//! the last screen resolution they were requested at.
//!
//! Only the requested quality level is rebuilt when the resolution changes.
//! Lists for other levels stay as they were until they are requested again,
//! at which point they are rebuilt at the new resolution.

use ahash::AHashMap;
use tidegrid_core::MAX_SCREEN_SIZE;

use crate::mesh::GridMesh;
use crate::quality::{GroupTier, QualityLevel};
use crate::tessellator::Tessellator;
use crate::GridConfig;

/// Screen size a mesh list was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportResolution {
    pub width: u32,
    pub height: u32,
}

impl ViewportResolution {
    /// Clamp raw camera pixel dimensions into `[0, max_size]`
    pub fn clamped(width: i32, height: i32, max_size: u32) -> Self {
        Self {
            width: (width.max(0) as u32).min(max_size),
            height: (height.max(0) as u32).min(max_size),
        }
    }
}

/// Cache activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: u64,
    /// Requests that tessellated a new list
    pub rebuilds: u64,
    /// Meshes created by rebuilds
    pub meshes_built: u64,
    /// Meshes dropped by rebuilds or releases
    pub meshes_released: u64,
}

#[derive(Debug)]
struct MeshList {
    /// Resolution the list was built at
    resolution: ViewportResolution,
    /// Tier the list was requested with
    tier: GroupTier,
    meshes: Vec<GridMesh>,
}

/// Mesh lists for one rendering context
#[derive(Debug)]
pub struct ViewportMeshCache {
    tessellator: Tessellator,
    max_screen_size: u32,
    last_resolution: Option<ViewportResolution>,
    entries: AHashMap<QualityLevel, MeshList>,
    stats: CacheStats,
}

impl Default for ViewportMeshCache {
    fn default() -> Self {
        Self::with_config(&GridConfig::default())
    }
}

impl ViewportMeshCache {
    /// Create an empty cache
    ///
    /// `max_screen_size` is capped at [`MAX_SCREEN_SIZE`].
    pub fn new(tessellator: Tessellator, max_screen_size: u32) -> Self {
        Self {
            tessellator,
            max_screen_size: max_screen_size.min(MAX_SCREEN_SIZE),
            last_resolution: None,
            entries: AHashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Create an empty cache sized from a grid configuration
    pub fn with_config(config: &GridConfig) -> Self {
        Self::new(Tessellator::new(config.vertex_ceiling), config.max_screen_size)
    }

    /// Get the mesh list for `quality` at the given camera size
    ///
    /// Returns the cached list when a list for `quality` exists that was
    /// built at the clamped resolution with the same `tier`. Otherwise only
    /// that quality level's list is rebuilt. The returned
    /// meshes may have their bounds updated in place.
    pub fn get_meshes(
        &mut self,
        width: i32,
        height: i32,
        quality: QualityLevel,
        tier: GroupTier,
    ) -> &mut [GridMesh] {
        let resolution = ViewportResolution::clamped(width, height, self.max_screen_size);

        let hit = self
            .entries
            .get(&quality)
            .is_some_and(|list| list.resolution == resolution && list.tier == tier);

        if hit {
            self.stats.hits += 1;
            log::trace!("Grid mesh cache hit for {} at {}x{}", quality, resolution.width, resolution.height);
        } else {
            self.rebuild(resolution, quality, tier);
        }

        &mut self
            .entries
            .entry(quality)
            .or_insert_with(|| MeshList { resolution, tier, meshes: Vec::new() })
            .meshes
    }

    fn rebuild(&mut self, resolution: ViewportResolution, quality: QualityLevel, tier: GroupTier) {
        log::debug!(
            "Rebuilding grid meshes for {} ({}) at {}x{}",
            quality, tier, resolution.width, resolution.height
        );

        self.last_resolution = Some(resolution);

        if let Some(old) = self.entries.remove(&quality) {
            self.stats.meshes_released += old.meshes.len() as u64;
        }

        let meshes = match self.tessellator.tessellate(resolution.width, resolution.height, quality, tier) {
            Ok(meshes) => meshes,
            Err(err) => {
                log::error!("Failed to tessellate grid for {}: {}", quality, err);
                Vec::new()
            }
        };

        self.stats.rebuilds += 1;
        self.stats.meshes_built += meshes.len() as u64;
        self.entries.insert(quality, MeshList { resolution, tier, meshes });
    }

    /// Drop every cached mesh and forget the last resolution
    pub fn release_all(&mut self) {
        let released: usize = self.entries.values().map(|list| list.meshes.len()).sum();
        if released > 0 {
            log::debug!("Releasing {} grid mesh(es)", released);
        }
        self.stats.meshes_released += released as u64;
        self.entries.clear();
        self.last_resolution = None;
    }

    /// Cached list for `quality`, possibly built at an older resolution
    pub fn meshes(&self, quality: QualityLevel) -> Option<&[GridMesh]> {
        self.entries.get(&quality).map(|list| list.meshes.as_slice())
    }

    pub fn contains(&self, quality: QualityLevel) -> bool {
        self.entries.contains_key(&quality)
    }

    /// Resolution of the most recent rebuild, `None` after a release
    pub fn last_resolution(&self) -> Option<ViewportResolution> {
        self.last_resolution
    }

    /// Number of quality levels with a cached list
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total meshes held across all quality levels
    pub fn mesh_count(&self) -> usize {
        self.entries.values().map(|list| list.meshes.len()).sum()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
