/*
 * Birbs Flocking Simulation - Module Definitions
 *
 * The flocking core (birb, grid, flocking, simulation, config, error) has no
 * knowledge of drawing. The viewer modules (app, camera, input, renderer, ui,
 * debug) drive it through the Simulation API.
 */

// Re-export key components for easier access
pub use birb::{Birb, CellCoord};
pub use config::{CameraConfig, Palette, SimulationConfig};
pub use error::{ConfigError, ConfigResult};
pub use flocking::{NeighborSearch, Steering, TickStats};
pub use grid::UniformGrid;
pub use simulation::{RenderBirb, Simulation};
pub use camera::Camera;
pub use debug::DebugInfo;
pub use app::Model;

// Define modules
pub mod error;
pub mod config;
pub mod birb;
pub mod grid;
pub mod flocking;
pub mod simulation;
pub mod camera;
pub mod debug;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;

// Constants
pub const BIRB_SIZE: f32 = 8.0;
// Longest frame fed into a single tick, in milliseconds
pub const MAX_FRAME_MS: f32 = 100.0;
