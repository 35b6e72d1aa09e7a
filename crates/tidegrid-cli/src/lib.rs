//! # Tidegrid CLI
//!
//! Command-line tools for inspecting projected grid meshes.
//!
//! ## Commands
//! - `tessellate` - Show how a viewport is split into grid tiles
//! - `simulate` - Replay a sequence of frames through the mesh cache
//! - `config` - Print or write the default grid configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use tidegrid_renderer::{
    CacheStats, GridConfig, GroupSpan, GroupTier, ProjectedGridCache, QualityLevel,
    RenderContext, Tessellator, TierChoice,
};

/// Tidegrid projected grid CLI
#[derive(Parser)]
#[command(name = "tidegrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Grid configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show how a viewport is split into grid tiles
    Tessellate {
        /// Viewport width in pixels
        #[arg(long)]
        width: u32,

        /// Viewport height in pixels
        #[arg(long)]
        height: u32,

        /// Quality level (low, medium, high, ultra, extreme)
        #[arg(short, long)]
        quality: Option<QualityLevel>,

        /// Group tier (single, low, medium, high, extreme)
        #[arg(short, long)]
        tier: Option<GroupTier>,

        /// Vertex ceiling per mesh
        #[arg(long)]
        ceiling: Option<u32>,
    },

    /// Replay frames through the mesh cache
    Simulate {
        /// Frames as WIDTHxHEIGHT or WIDTHxHEIGHT:QUALITY
        #[arg(required = true, num_args = 1..)]
        frames: Vec<FrameSpec>,

        /// Render into the scene view cache instead of the game cache
        #[arg(long)]
        scene_view: bool,
    },

    /// Print or write the default grid configuration
    Config {
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One simulated camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub width: i32,
    pub height: i32,
    pub quality: Option<QualityLevel>,
}

impl FromStr for FrameSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, quality) = match s.split_once(':') {
            Some((size, quality)) => {
                let quality = quality.parse::<QualityLevel>().map_err(|e| e.to_string())?;
                (size, Some(quality))
            }
            None => (s, None),
        };

        let (width, height) = size
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = width.trim().parse::<i32>().map_err(|e| format!("bad width in '{s}': {e}"))?;
        let height = height.trim().parse::<i32>().map_err(|e| format!("bad height in '{s}': {e}"))?;

        Ok(Self { width, height, quality })
    }
}

/// Tile layout for one viewport
#[derive(Debug, Clone)]
pub struct TessellationSummary {
    pub choice: TierChoice,
    pub tiles: usize,
    pub vertices_per_tile: usize,
    pub indices_per_tile: usize,
    pub total_vertices: usize,
}

/// Build the tiles for a viewport and summarize them
pub fn tessellate_summary(
    width: u32,
    height: u32,
    quality: QualityLevel,
    tier: GroupTier,
    ceiling: u32,
    max_screen_size: u32,
) -> Result<TessellationSummary> {
    let width = width.min(max_screen_size);
    let height = height.min(max_screen_size);
    let tessellator = Tessellator::new(ceiling);
    let choice = tessellator.choose_effective_tier(quality.cell_size(), tier, width, height);
    let meshes = tessellator.tessellate(width, height, quality, tier)?;

    Ok(TessellationSummary {
        choice,
        tiles: meshes.len(),
        vertices_per_tile: meshes.first().map_or(0, |m| m.vertex_count()),
        indices_per_tile: meshes.first().map_or(0, |m| m.indices.len()),
        total_vertices: meshes.iter().map(|m| m.vertex_count()).sum(),
    })
}

/// Replay `frames` through a fresh grid cache and return its counters
pub fn simulate_frames(config: &GridConfig, frames: &[FrameSpec], context: RenderContext) -> Result<CacheStats> {
    let mut grid = ProjectedGridCache::with_config(config.clone());
    grid.initialize();

    for (index, frame) in frames.iter().enumerate() {
        let quality = frame.quality.unwrap_or(config.quality);
        let Some(meshes) = grid.on_frame(context, frame.width, frame.height, quality, config.group_tier) else {
            bail!("context {:?} is not rendered by the projected grid", context);
        };
        log::info!(
            "Frame {}: {}x{} at {} -> {} mesh(es)",
            index, frame.width, frame.height, quality, meshes.len()
        );
    }

    let stats = grid
        .cache(context)
        .map(|cache| *cache.stats())
        .unwrap_or_default();
    grid.release();
    Ok(stats)
}

fn load_config(path: Option<&Path>) -> Result<GridConfig> {
    let Some(path) = path else {
        return Ok(GridConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GridConfig::from_json(&json).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Tessellate { width, height, quality, tier, ceiling } => {
            let quality = quality.unwrap_or(config.quality);
            let tier = tier.unwrap_or(config.group_tier);
            let ceiling = ceiling.unwrap_or(config.vertex_ceiling);

            let summary = tessellate_summary(width, height, quality, tier, ceiling, config.max_screen_size)?;
            let span = match summary.choice.span {
                GroupSpan::Whole => "whole viewport".to_string(),
                GroupSpan::Tiles(size) => format!("{size}px"),
            };

            log::info!("Tessellating {}x{} at {} ({})", width, height, quality, tier);
            log::info!("  Effective tier: {} ({})", summary.choice.tier, span);
            log::info!("  Tiles: {}", summary.tiles);
            log::info!("  Vertices per tile: {}", summary.vertices_per_tile);
            log::info!("  Indices per tile: {}", summary.indices_per_tile);
            log::info!("  Total vertices: {}", summary.total_vertices);
            if !summary.choice.within_budget {
                log::warn!("  Tiles exceed the vertex ceiling of {}", ceiling);
            }
        }

        Commands::Simulate { frames, scene_view } => {
            let context = if scene_view { RenderContext::SceneView } else { RenderContext::Game };
            let stats = simulate_frames(&config, &frames, context)?;
            log::info!("Cache hits: {}", stats.hits);
            log::info!("Rebuilds: {}", stats.rebuilds);
            log::info!("Meshes built: {}", stats.meshes_built);
            log::info!("Meshes released: {}", stats.meshes_released);
        }

        Commands::Config { output } => {
            let json = config.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    log::info!("Wrote grid config to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
