//! Projected Grid
//!
//! Per-frame entry point tying the viewport caches to the host renderer.
//! The host owns a [`ProjectedGridCache`] and calls it once per camera per
//! frame; projection math and draw submission stay on the host side behind
//! the collaborator traits below.

use tidegrid_core::math::{Aabb, Mat4, Vec3};

use crate::cache::ViewportMeshCache;
use crate::mesh::GridMesh;
use crate::quality::{GroupTier, QualityLevel};
use crate::GridConfig;

/// Shader global holding the projector view-projection matrix
pub const PROJECTOR_VIEW_PROJ_GLOBAL: &str = "_ProjectedGridViewPortMatrix";

/// Shader global holding the interpolation matrix
pub const INTERPOLATION_GLOBAL: &str = "_ProjectedGridInterpolationMatrix";

/// Kind of viewport a camera renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderContext {
    /// In-game camera
    Game,
    /// Editor scene view
    SceneView,
    /// Asset preview thumbnails
    Preview,
    /// Planar reflection cameras
    Reflection,
}

impl RenderContext {
    /// Whether the grid draws into this context at all
    pub fn is_supported(self) -> bool {
        matches!(self, RenderContext::Game | RenderContext::SceneView)
    }
}

/// Opaque reference to a host material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Camera state handed in by the host each frame
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub context: RenderContext,
    /// Viewport width in pixels
    pub pixel_width: i32,
    /// Viewport height in pixels
    pub pixel_height: i32,
    /// World-space camera position
    pub position: Vec3,
    /// Far clip distance
    pub far_clip: f32,
}

/// Grid settings, read every frame
pub trait GridSettings {
    fn mesh_quality(&self) -> QualityLevel;

    fn group_tier(&self) -> GroupTier {
        GroupTier::Single
    }

    /// Material to draw with; nothing is drawn without one
    fn material(&self) -> Option<MaterialHandle>;

    /// World height of the projected plane
    fn plane_height(&self) -> f32 {
        0.0
    }
}

/// Computes the matrices the grid shader projects vertices with
pub trait ProjectionProcessor {
    fn update_projection(
        &mut self,
        camera: &CameraView,
        projector_view_proj: &mut Mat4,
        interpolation: &mut Mat4,
    );
}

/// Receives grid meshes for drawing
pub trait DrawSink {
    fn draw_mesh(&mut self, mesh: &GridMesh, material: MaterialHandle, context: RenderContext);
}

/// Matrices published for the grid shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderGlobals {
    pub projector_view_proj: Mat4,
    pub interpolation: Mat4,
}

impl ShaderGlobals {
    /// Globals paired with their shader names
    pub fn named(&self) -> [(&'static str, Mat4); 2] {
        [
            (INTERPOLATION_GLOBAL, self.interpolation),
            (PROJECTOR_VIEW_PROJ_GLOBAL, self.projector_view_proj),
        ]
    }
}

impl Default for ShaderGlobals {
    fn default() -> Self {
        Self {
            projector_view_proj: Mat4::IDENTITY,
            interpolation: Mat4::IDENTITY,
        }
    }
}

/// Result of rendering one camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Meshes submitted to the draw sink
    pub meshes_drawn: usize,
    /// Whether the mesh list was rebuilt for this frame
    pub rebuilt: bool,
}

/// Grid mesh caches for the supported rendering contexts
#[derive(Debug)]
pub struct ProjectedGridCache {
    config: GridConfig,
    game: ViewportMeshCache,
    scene_view: ViewportMeshCache,
    globals: ShaderGlobals,
    initialized: bool,
}

impl Default for ProjectedGridCache {
    fn default() -> Self {
        Self::with_config(GridConfig::default())
    }
}

impl ProjectedGridCache {
    /// Create a cache; it serves nothing until [`initialize`](Self::initialize)
    pub fn with_config(config: GridConfig) -> Self {
        Self {
            game: ViewportMeshCache::with_config(&config),
            scene_view: ViewportMeshCache::with_config(&config),
            config,
            globals: ShaderGlobals::default(),
            initialized: false,
        }
    }

    /// Start serving frames with both caches empty
    ///
    /// Calling this again, with or without a release in between, discards
    /// all previous state.
    pub fn initialize(&mut self) {
        if self.initialized {
            self.release();
        }
        self.game = ViewportMeshCache::with_config(&self.config);
        self.scene_view = ViewportMeshCache::with_config(&self.config);
        self.globals = ShaderGlobals::default();
        self.initialized = true;
        log::info!("Projected grid initialized");
    }

    /// Stop serving frames and drop every cached mesh
    pub fn release(&mut self) {
        self.game.release_all();
        self.scene_view.release_all();
        if self.initialized {
            log::info!("Projected grid released");
        }
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next initialize
    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
    }

    /// Cache serving `context`, if the context is supported
    pub fn cache(&self, context: RenderContext) -> Option<&ViewportMeshCache> {
        match context {
            RenderContext::Game => Some(&self.game),
            RenderContext::SceneView => Some(&self.scene_view),
            RenderContext::Preview | RenderContext::Reflection => None,
        }
    }

    fn cache_mut(&mut self, context: RenderContext) -> Option<&mut ViewportMeshCache> {
        match context {
            RenderContext::Game => Some(&mut self.game),
            RenderContext::SceneView => Some(&mut self.scene_view),
            RenderContext::Preview | RenderContext::Reflection => None,
        }
    }

    /// Matrices from the most recent rendered camera
    pub fn shader_globals(&self) -> &ShaderGlobals {
        &self.globals
    }

    /// Mesh list for one camera this frame
    ///
    /// `None` when not initialized or when `context` is not drawn into.
    pub fn on_frame(
        &mut self,
        context: RenderContext,
        width: i32,
        height: i32,
        quality: QualityLevel,
        tier: GroupTier,
    ) -> Option<&mut [GridMesh]> {
        if !self.initialized {
            return None;
        }
        let cache = self.cache_mut(context)?;
        Some(cache.get_meshes(width, height, quality, tier))
    }

    /// Render the grid for one camera
    ///
    /// Resolves the mesh list, publishes fresh projection matrices, moves
    /// every mesh's bounds under the camera and submits the meshes to `sink`.
    /// Returns `None` when the camera is skipped.
    pub fn render_camera<S, P, D>(
        &mut self,
        camera: &CameraView,
        settings: &S,
        projector: &mut P,
        sink: &mut D,
    ) -> Option<FrameReport>
    where
        S: GridSettings + ?Sized,
        P: ProjectionProcessor + ?Sized,
        D: DrawSink + ?Sized,
    {
        if !self.initialized {
            return None;
        }
        let material = settings.material()?;

        let cache = match camera.context {
            RenderContext::Game => &mut self.game,
            RenderContext::SceneView => &mut self.scene_view,
            RenderContext::Preview | RenderContext::Reflection => return None,
        };

        let rebuilds_before = cache.stats().rebuilds;
        let meshes = cache.get_meshes(
            camera.pixel_width,
            camera.pixel_height,
            settings.mesh_quality(),
            settings.group_tier(),
        );

        projector.update_projection(
            camera,
            &mut self.globals.projector_view_proj,
            &mut self.globals.interpolation,
        );

        let extent = camera.far_clip * 2.0;
        let bounds = Aabb::from_center_size(
            Vec3::new(camera.position.x, settings.plane_height(), camera.position.z),
            Vec3::new(extent, 1.0, extent),
        );

        for mesh in meshes.iter_mut() {
            mesh.bounds = bounds;
            sink.draw_mesh(mesh, material, camera.context);
        }
        let meshes_drawn = meshes.len();

        Some(FrameReport {
            meshes_drawn,
            rebuilt: cache.stats().rebuilds != rebuilds_before,
        })
    }
}
