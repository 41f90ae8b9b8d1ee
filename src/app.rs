/*
 * Application Module
 *
 * This module defines the viewer's model and per-frame update. The viewer is
 * a thin driver around Simulation: it feeds elapsed frame time into one tick
 * per frame, keeps the camera on a followed birb and hands everything else to
 * the renderer and the stats panel.
 */

use std::sync::OnceLock;
use std::time::Instant;

use log::{debug, info};
use nannou::prelude::*;
use nannou_egui::Egui;

use crate::camera::Camera;
use crate::config::SimulationConfig;
use crate::debug::DebugInfo;
use crate::flocking::{NeighborSearch, TickStats};
use crate::input;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui::{self, Controls};
use crate::MAX_FRAME_MS;

// How often tick statistics are logged at debug level
const STATS_LOG_INTERVAL: u64 = 600;

// nannou builds the model from a plain fn, so the launch config is parked here
static LAUNCH_CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

pub struct Model {
    pub simulation: Simulation,
    pub controls: Controls,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
}

// Open the viewer window and run until it is closed
pub fn run(config: SimulationConfig) {
    if LAUNCH_CONFIG.set(config).is_err() {
        debug!("viewer already launched, keeping the first config");
    }
    nannou::app(model).update(update).run();
}

pub fn model(app: &App) -> Model {
    let config = LAUNCH_CONFIG.get().cloned().unwrap_or_default();
    let simulation = Simulation::new(config).expect("launch config was validated before the viewer started");

    let window_id = app
        .new_window()
        .title("Birbs")
        .size(1280, 800)
        .view(renderer::view)
        .key_pressed(input::key_pressed)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let world_center = vec2(
        simulation.config().world_width / 2.0,
        simulation.config().world_height / 2.0,
    );
    let camera = Camera::new(&simulation.config().camera, world_center);

    info!("viewer started with {} birbs", simulation.birbs().len());

    Model {
        simulation,
        controls: Controls::default(),
        egui,
        debug_info: DebugInfo::default(),
        camera,
        mouse_position: Vec2::ZERO,
    }
}

pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let search_before = model.controls.search;
    model.egui.set_elapsed_time(update.since_start);
    ui::update_ui(
        &mut model.egui,
        &mut model.controls,
        &model.debug_info,
        &model.simulation,
        model.camera.following,
    );
    if model.controls.search != search_before {
        debug!("neighbor search: {}", model.controls.search.label());
    }

    if !model.controls.paused {
        let elapsed_ms = frame_delta_ms(update.since_last.as_secs_f32());
        let started = Instant::now();
        let stats = model.simulation.step(elapsed_ms, model.controls.search);
        model
            .debug_info
            .record_tick(stats, started.elapsed(), model.simulation.ticks());
        log_stats(model.simulation.ticks(), model.controls.search, &stats);
    }

    if let Some(id) = model.camera.following {
        model.camera.track(model.simulation.follow(id));
    }
}

// Frame time in milliseconds, capped so a stalled window does not teleport birbs
pub fn frame_delta_ms(since_last_secs: f32) -> f32 {
    (since_last_secs * 1000.0).clamp(0.0, MAX_FRAME_MS)
}

fn log_stats(ticks: u64, search: NeighborSearch, stats: &TickStats) {
    if ticks % STATS_LOG_INTERVAL == 0 {
        debug!(
            "tick {ticks} ({}): {} candidates, {} neighbors, {} isolated, {} cell changes",
            search.label(),
            stats.candidates_examined,
            stats.perceived_neighbors,
            stats.isolated,
            stats.cell_changes
        );
    }
}
