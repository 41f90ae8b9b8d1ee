/*
 * Simulation Module
 *
 * This module defines the Simulation struct, which owns the birb array, the
 * uniform grid and the validated config. It is the single surface a driver
 * talks to: one `step` per frame, plus read-only views for drawing, camera
 * following and grid overlays.
 */

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::birb::Birb;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::flocking::{self, NeighborSearch, Steering, TickStats};
use crate::grid::UniformGrid;

// What the renderer needs from a birb
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderBirb {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

impl From<&Birb> for RenderBirb {
    fn from(birb: &Birb) -> Self {
        Self {
            x: birb.x,
            y: birb.y,
            rotation: birb.rotation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    birbs: Vec<Birb>,
    grid: UniformGrid,
    ticks: u64,
}

impl Simulation {
    // Random population, seeded from the config when it carries a seed
    pub fn new(config: SimulationConfig) -> ConfigResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(config: SimulationConfig, rng: &mut R) -> ConfigResult<Self> {
        config.validate()?;
        let birbs = (0..config.birb_count)
            .map(|id| Birb::random(id, rng, config.world_width, config.world_height))
            .collect();
        Self::populate(config, birbs)
    }

    // Fixed `(x, y, rotation)` placements; the population size follows the slice
    pub fn from_placements(mut config: SimulationConfig, placements: &[(f32, f32, f32)]) -> ConfigResult<Self> {
        config.birb_count = placements.len();
        config.validate()?;

        let mut birbs = Vec::with_capacity(placements.len());
        for (id, &(x, y, rotation)) in placements.iter().enumerate() {
            if !((0.0..config.world_width).contains(&x) && (0.0..config.world_height).contains(&y)) {
                return Err(ConfigError::PlacementOutsideWorld {
                    x,
                    y,
                    width: config.world_width,
                    height: config.world_height,
                });
            }
            birbs.push(Birb::new(id, x, y, rotation));
        }
        Self::populate(config, birbs)
    }

    fn populate(config: SimulationConfig, mut birbs: Vec<Birb>) -> ConfigResult<Self> {
        let mut grid = UniformGrid::new(config.cell_size(), config.world_width, config.world_height)?;
        for birb in birbs.iter_mut() {
            grid.insert(birb);
        }

        info!(
            "created {} birbs in a {}x{} world, grid {}x{} cells of {}",
            birbs.len(),
            config.world_width,
            config.world_height,
            grid.cols(),
            grid.rows(),
            grid.cell_size()
        );

        Ok(Self {
            config,
            birbs,
            grid,
            ticks: 0,
        })
    }

    // Advance one tick. `delta_time` is in milliseconds.
    pub fn step(&mut self, delta_time: f32, search: NeighborSearch) -> TickStats {
        self.ticks += 1;
        flocking::step(&mut self.birbs, &mut self.grid, &self.config, delta_time, search)
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn birbs(&self) -> &[Birb] {
        &self.birbs
    }

    #[inline]
    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn render_view(&self) -> impl ExactSizeIterator<Item = RenderBirb> + '_ {
        self.birbs.iter().map(RenderBirb::from)
    }

    // Current position of one birb, for the camera to track
    pub fn follow(&self, id: usize) -> Option<(f32, f32)> {
        self.birbs.get(id).map(|birb| (birb.x, birb.y))
    }

    // Nearest birb to a world point within `radius`. Only the grid block around
    // the point is searched, so radii beyond one cell size are cut short.
    pub fn birb_near(&self, x: f32, y: f32, radius: f32) -> Option<usize> {
        let x = flocking::wrap_coordinate(x.rem_euclid(self.config.world_width), self.config.world_width);
        let y = flocking::wrap_coordinate(y.rem_euclid(self.config.world_height), self.config.world_height);
        let radius_sq = radius * radius;

        let mut candidates = Vec::new();
        self.grid.query_block(self.grid.cell_coordinates(x, y), &mut candidates);

        candidates
            .into_iter()
            .map(|id| (id, self.birbs[id].distance_sq_to(x, y)))
            .filter(|&(_, dist_sq)| dist_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    // The rule accumulators a birb would see right now, without moving anything
    pub fn steering_of(&self, id: usize, search: NeighborSearch) -> Option<Steering> {
        let birb = self.birbs.get(id)?;
        let steering = match search {
            NeighborSearch::Grid => {
                let mut candidates = Vec::new();
                self.grid.query_potential_neighbors(birb, &mut candidates);
                Steering::gather(&self.birbs, id, candidates, &self.config)
            }
            NeighborSearch::BruteForce => Steering::gather(&self.birbs, id, 0..self.birbs.len(), &self.config),
        };
        Some(steering)
    }

    // Every birb is filed exactly once, in the cell matching its position
    pub fn check_grid_membership(&self) -> bool {
        if self.grid.len() != self.birbs.len() {
            return false;
        }
        self.birbs.iter().all(|birb| {
            let expected = self.grid.cell_coordinates(birb.x, birb.y);
            birb.cached_cell == Some(expected)
                && self.grid.cell(expected).iter().filter(|&&id| id == birb.id).count() == 1
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            world_width: 400.0,
            world_height: 300.0,
            birb_count: 64,
            visual_distance: 40.0,
            min_distance: 15.0,
            birb_speed: 0.2,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn new_fills_grid() {
        let sim = Simulation::new(small_config()).expect("valid config");
        assert_eq!(sim.birbs().len(), 64);
        assert_eq!(sim.grid().cols(), 10);
        assert_eq!(sim.grid().rows(), 8);
        assert!(sim.check_grid_membership());
    }

    #[test]
    fn seeded_runs_repeat() {
        let a = Simulation::new(small_config()).expect("valid config");
        let b = Simulation::new(small_config()).expect("valid config");
        let a: Vec<_> = a.render_view().collect();
        let b: Vec<_> = b.render_view().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            visual_distance: -1.0,
            ..small_config()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn placements_outside_world_are_rejected() {
        let result = Simulation::from_placements(small_config(), &[(10.0, 10.0, 0.0), (400.0, 5.0, 0.0)]);
        assert!(matches!(result, Err(ConfigError::PlacementOutsideWorld { .. })));
    }

    #[test]
    fn world_crossed_in_one_frame_is_rejected() {
        let config = SimulationConfig {
            world_width: 100.0,
            world_height: 100.0,
            visual_distance: 30.0,
            min_distance: 10.0,
            ..Default::default()
        };
        let result = Simulation::from_placements(config.clone(), &[(50.0, 50.0, 0.0)]);
        assert!(matches!(result, Err(ConfigError::SpeedExceedsWorld { .. })));

        // Just under one side per frame: even stalled frames land inside the world
        let config = SimulationConfig { birb_speed: 0.99, ..config };
        let mut sim = Simulation::from_placements(config, &[(50.0, 50.0, 0.0)]).expect("valid");
        for delta in [100.0, 5000.0, 100.0] {
            sim.step(delta, NeighborSearch::Grid);
            let (x, y) = sim.follow(0).expect("birb 0 exists");
            assert!((0.0..100.0).contains(&x), "x = {x}");
            assert!((0.0..100.0).contains(&y), "y = {y}");
        }
        assert!(sim.check_grid_membership());
    }

    #[test]
    fn follow_tracks_position() {
        let mut sim = Simulation::from_placements(small_config(), &[(10.0, 10.0, 0.0)]).expect("valid");
        assert_eq!(sim.follow(0), Some((10.0, 10.0)));
        assert_eq!(sim.follow(1), None);

        sim.step(10.0, NeighborSearch::Grid);
        let (x, y) = sim.follow(0).expect("birb 0 exists");
        assert!((x - 12.0).abs() < 1e-5);
        assert_eq!(y, 10.0);
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn birb_near_picks_closest() {
        let sim = Simulation::from_placements(
            small_config(),
            &[(100.0, 100.0, 0.0), (108.0, 100.0, 0.0), (395.0, 100.0, 0.0)],
        )
        .expect("valid");

        assert_eq!(sim.birb_near(105.0, 100.0, 10.0), Some(1));
        assert_eq!(sim.birb_near(200.0, 200.0, 10.0), None);
        // Points off the world wrap back onto it
        assert_eq!(sim.birb_near(-4.0, 100.0, 10.0), Some(2));
    }
}
