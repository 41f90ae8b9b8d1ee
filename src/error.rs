/*
 * Error Module
 *
 * Configuration problems are the only recoverable failures in the simulation.
 * They are caught once, before any birb or grid cell exists; the tick loop
 * itself never fails.
 */

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("world dimensions must be positive, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },

    #[error("birb count must be positive")]
    EmptyPopulation,

    #[error("visual distance must be positive, got {0}")]
    InvalidVisualDistance(f32),

    #[error("min distance {min} must lie in [0, {visual}) (the visual distance)")]
    InvalidMinDistance { min: f32, visual: f32 },

    #[error("cell size {cell} must be at least the visual distance {visual}")]
    InvalidCellSize { cell: f32, visual: f32 },

    #[error("grid cell size must be positive and finite, got {0}")]
    NonPositiveCellSize(f32),

    #[error("a {rows}x{cols} grid has too many cells (limit {limit})")]
    GridTooLarge { rows: usize, cols: usize, limit: usize },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f32 },

    #[error("a birb moves {distance} in one {frame_ms} ms tick, which must stay below the shorter world side {extent}")]
    SpeedExceedsWorld { distance: f32, frame_ms: f32, extent: f32 },

    #[error("{name} must be finite, got {value}")]
    NonFiniteFactor { name: &'static str, value: f32 },

    #[error("placement ({x}, {y}) lies outside the {width}x{height} world")]
    PlacementOutsideWorld { x: f32, y: f32, width: f32, height: f32 },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
