/*
 * UI Module
 *
 * This module draws the stats panel with nannou_egui. The flocking
 * parameters are fixed for the whole run, so the panel only exposes the
 * viewer toggles: neighbor search mode, grid overlay and pause.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::flocking::NeighborSearch;
use crate::simulation::Simulation;

// Viewer state the panel and keyboard can flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub search: NeighborSearch,
    pub paused: bool,
    pub show_grid: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            search: NeighborSearch::Grid,
            paused: false,
            show_grid: false,
        }
    }
}

pub fn update_ui(
    egui: &mut Egui,
    controls: &mut Controls,
    debug_info: &DebugInfo,
    simulation: &Simulation,
    following: Option<usize>,
) {
    let ctx = egui.begin_frame();
    let grid = simulation.grid();

    egui::Window::new("Birbs")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.label(format!("FPS: {:.1}", debug_info.fps));
            ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
            ui.label(format!("Tick time: {:.2} ms", debug_info.tick_time.as_secs_f64() * 1000.0));
            ui.label(format!("Birbs: {}", simulation.birbs().len()));
            ui.label(format!("Ticks: {}", debug_info.ticks));

            ui.collapsing("Neighbor search", |ui| {
                let mut use_grid = controls.search == NeighborSearch::Grid;
                if ui.checkbox(&mut use_grid, "Use uniform grid (G)").changed() {
                    controls.search = if use_grid {
                        NeighborSearch::Grid
                    } else {
                        NeighborSearch::BruteForce
                    };
                }
                ui.label(format!(
                    "Grid: {} x {} cells of {:.0}",
                    grid.cols(),
                    grid.rows(),
                    grid.cell_size()
                ));
                ui.label(format!(
                    "Candidates per birb: {:.1}",
                    debug_info.candidates_per_birb(simulation.birbs().len())
                ));
                ui.label(format!("Neighbors seen: {}", debug_info.last_tick.perceived_neighbors));
                ui.label(format!("Isolated birbs: {}", debug_info.last_tick.isolated));
                ui.label(format!("Cell changes: {}", debug_info.last_tick.cell_changes));
            });

            ui.collapsing("View", |ui| {
                ui.checkbox(&mut controls.show_grid, "Show grid lines (L)");
                ui.checkbox(&mut controls.paused, "Pause (P)");
                match following {
                    Some(id) => ui.label(format!("Following birb #{id} (Esc to stop)")),
                    None => ui.label("Click a birb to follow it"),
                };
                ui.label("Drag to pan, scroll to zoom, R resets the camera");
            });
        });
}
