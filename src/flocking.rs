/*
 * Flocking Module
 *
 * This module advances every birb by one tick according to the three
 * flocking rules:
 * 1. Alignment: steer towards the average heading of neighbors
 * 2. Cohesion: steer towards the average position of neighbors
 * 3. Separation: steer away from neighbors that are too close
 *
 * Birbs are processed in index order and read their neighbors' live fields,
 * so a birb late in the order sees neighbors that already moved this tick.
 * Grid and brute-force search only differ in which candidates get looked at;
 * the distance filter, steering and movement below are shared, so both modes
 * produce the same flock.
 */

use log::trace;

use crate::birb::Birb;
use crate::config::SimulationConfig;
use crate::grid::UniformGrid;
use crate::MAX_FRAME_MS;

// How candidates for the neighbor check are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborSearch {
    // 3x3 cell block around the birb
    #[default]
    Grid,
    // Every birb in the simulation
    BruteForce,
}

impl NeighborSearch {
    pub fn toggled(self) -> Self {
        match self {
            NeighborSearch::Grid => NeighborSearch::BruteForce,
            NeighborSearch::BruteForce => NeighborSearch::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NeighborSearch::Grid => "grid",
            NeighborSearch::BruteForce => "brute force",
        }
    }
}

// Summary of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub candidates_examined: usize,
    pub perceived_neighbors: usize,
    pub isolated: usize,
    pub cell_changes: usize,
}

// Rule accumulators gathered for one birb
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub heading_x: f32,
    pub heading_y: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub avoid_x: f32,
    pub avoid_y: f32,
    pub neighbors: usize,
    pub candidates: usize,
}

impl Steering {
    // Accumulate the rules over `candidates`, skipping the birb itself.
    // Displacements are not wrapped across the world edges.
    pub fn gather<I>(birbs: &[Birb], index: usize, candidates: I, config: &SimulationConfig) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let visual_sq = config.visual_distance_sq();
        let min_sq = config.min_distance_sq();
        let birb = &birbs[index];
        let mut steering = Steering::default();

        for other_index in candidates {
            steering.candidates += 1;
            if other_index == index {
                continue;
            }

            let other = &birbs[other_index];
            let dx = other.x - birb.x;
            let dy = other.y - birb.y;
            let dist_sq = dx * dx + dy * dy;

            if dist_sq < visual_sq {
                steering.heading_x += other.cached_cos;
                steering.heading_y += other.cached_sin;
                steering.center_x += other.x;
                steering.center_y += other.y;
                steering.neighbors += 1;

                if dist_sq < min_sq {
                    steering.avoid_x -= dx;
                    steering.avoid_y -= dy;
                }
            }
        }

        steering
    }

    // Heading the rules pull towards, or None when nobody was perceived
    pub fn target_rotation(&self, birb: &Birb, config: &SimulationConfig) -> Option<f32> {
        if self.neighbors == 0 {
            return None;
        }

        let count = self.neighbors as f32;
        let avg_cos = self.heading_x / count;
        let avg_sin = self.heading_y / count;
        let avg_x = self.center_x / count;
        let avg_y = self.center_y / count;

        // Separation is a raw sum, not averaged
        let target_vx = config.alignment_factor * avg_cos
            + config.cohesion_factor * (avg_x - birb.x)
            + config.separation_factor * self.avoid_x;
        let target_vy = config.alignment_factor * avg_sin
            + config.cohesion_factor * (avg_y - birb.y)
            + config.separation_factor * self.avoid_y;

        Some(target_vy.atan2(target_vx))
    }
}

// Shortest signed turn from `from` to `to`, in (-PI, PI]
#[inline]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    let raw = to - from;
    raw.sin().atan2(raw.cos())
}

// Single-step toroidal wrap into [0, extent)
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let mut value = value;
    if value < 0.0 {
        value += extent;
    }
    // Also catches a tiny negative rounding up to exactly `extent`
    if value >= extent {
        value -= extent;
    }
    value
}

// Turn towards the target within the turn budget, then move and wrap
pub fn advance(birb: &mut Birb, steering: &Steering, config: &SimulationConfig, delta_time: f32) {
    if let Some(target) = steering.target_rotation(birb, config) {
        let max_turn = config.turn_speed * delta_time;
        let angle_diff = angle_difference(birb.rotation, target).clamp(-max_turn, max_turn);
        birb.rotation += angle_diff;
    }

    let distance = config.birb_speed * delta_time;
    birb.x = wrap_coordinate(birb.x + distance * birb.rotation.cos(), config.world_width);
    birb.y = wrap_coordinate(birb.y + distance * birb.rotation.sin(), config.world_height);
}

// Advance every birb by one tick. The grid is kept in step with every move in
// both search modes.
pub fn step(
    birbs: &mut [Birb],
    grid: &mut UniformGrid,
    config: &SimulationConfig,
    delta_time: f32,
    search: NeighborSearch,
) -> TickStats {
    let delta_time = sanitize_delta(delta_time);
    let mut stats = TickStats::default();

    for index in 0..birbs.len() {
        birbs[index].refresh_trig();

        let steering = match search {
            NeighborSearch::Grid => {
                // Borrow the birb's own buffer while the others are read
                let mut candidates = std::mem::take(&mut birbs[index].potential_neighbors);
                grid.query_potential_neighbors(&birbs[index], &mut candidates);
                let steering = Steering::gather(birbs, index, candidates.iter().copied(), config);
                birbs[index].potential_neighbors = candidates;
                steering
            }
            NeighborSearch::BruteForce => Steering::gather(birbs, index, 0..birbs.len(), config),
        };

        stats.candidates_examined += steering.candidates;
        stats.perceived_neighbors += steering.neighbors;
        if steering.neighbors == 0 {
            stats.isolated += 1;
        }

        let birb = &mut birbs[index];
        advance(birb, &steering, config, delta_time);
        if grid.relocate(birb) {
            stats.cell_changes += 1;
        }
    }

    trace!(
        "tick ({}): {} candidates, {} neighbors, {} isolated, {} cell changes",
        search.label(),
        stats.candidates_examined,
        stats.perceived_neighbors,
        stats.isolated,
        stats.cell_changes
    );

    stats
}

// Negative, NaN and infinite elapsed times count as no time at all. Longer
// ticks are cut to MAX_FRAME_MS, the longest one the config allows for.
#[inline]
fn sanitize_delta(delta_time: f32) -> f32 {
    if delta_time.is_finite() && delta_time > 0.0 {
        delta_time.min(MAX_FRAME_MS)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn config() -> SimulationConfig {
        SimulationConfig {
            world_width: 200.0,
            world_height: 200.0,
            birb_count: 2,
            birb_speed: 0.1,
            turn_speed: 0.01,
            visual_distance: 40.0,
            min_distance: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn angle_difference_takes_short_way() {
        let diff = angle_difference(0.1, 2.0 * PI - 0.1);
        assert!((diff + 0.2).abs() < 1e-5);
        let diff = angle_difference(-3.0 * PI, 0.5 - 3.0 * PI);
        assert!((diff - 0.5).abs() < 1e-5);
    }

    #[test]
    fn wrap_coordinate_stays_in_range() {
        assert_eq!(wrap_coordinate(-1.0, 100.0), 99.0);
        assert_eq!(wrap_coordinate(100.0, 100.0), 0.0);
        assert_eq!(wrap_coordinate(101.5, 100.0), 1.5);
        assert_eq!(wrap_coordinate(42.0, 100.0), 42.0);
        let wrapped = wrap_coordinate(-1e-9, 100.0);
        assert!((0.0..100.0).contains(&wrapped));
    }

    #[test]
    fn gather_skips_self_and_far_birbs() {
        let config = config();
        let birbs = vec![
            Birb::new(0, 100.0, 100.0, 0.0),
            Birb::new(1, 120.0, 100.0, PI / 2.0),
            Birb::new(2, 180.0, 100.0, 0.0),
        ];
        let steering = Steering::gather(&birbs, 0, 0..3, &config);

        assert_eq!(steering.candidates, 3);
        assert_eq!(steering.neighbors, 1);
        assert_eq!(steering.center_x, 120.0);
        assert_eq!(steering.heading_y, (PI / 2.0).sin());
        // 20 apart is outside the separation radius
        assert_eq!(steering.avoid_x, 0.0);
    }

    #[test]
    fn separation_pushes_away() {
        let config = config();
        let birbs = vec![Birb::new(0, 100.0, 100.0, 0.0), Birb::new(1, 104.0, 97.0, 0.0)];
        let steering = Steering::gather(&birbs, 0, 0..2, &config);
        assert_eq!(steering.avoid_x, -4.0);
        assert_eq!(steering.avoid_y, 3.0);
    }

    #[test]
    fn lonely_birb_keeps_heading() {
        let config = config();
        let mut birb = Birb::new(0, 10.0, 10.0, 0.3);
        advance(&mut birb, &Steering::default(), &config, 16.0);

        assert_eq!(birb.rotation, 0.3);
        let distance = config.birb_speed * 16.0;
        assert!((birb.x - (10.0 + distance * 0.3f32.cos())).abs() < 1e-5);
        assert!((birb.y - (10.0 + distance * 0.3f32.sin())).abs() < 1e-5);
    }

    #[test]
    fn turn_is_clamped() {
        let config = config();
        // Neighbor heading straight up pulls hard to the left
        let birbs = vec![Birb::new(0, 100.0, 100.0, 0.0), Birb::new(1, 100.0, 130.0, PI / 2.0)];
        let steering = Steering::gather(&birbs, 0, 0..2, &config);

        let mut birb = birbs[0].clone();
        advance(&mut birb, &steering, &config, 5.0);
        assert!((birb.rotation - config.turn_speed * 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_delta_freezes_everything() {
        let config = config();
        let mut birbs = vec![Birb::new(0, 100.0, 100.0, 0.0), Birb::new(1, 110.0, 100.0, PI)];
        let mut grid = UniformGrid::new(config.cell_size(), 200.0, 200.0).expect("grid");
        for birb in birbs.iter_mut() {
            grid.insert(birb);
        }

        let before: Vec<_> = birbs.iter().map(|b| (b.x, b.y, b.rotation)).collect();
        step(&mut birbs, &mut grid, &config, f32::NAN, NeighborSearch::Grid);
        step(&mut birbs, &mut grid, &config, -4.0, NeighborSearch::BruteForce);
        let after: Vec<_> = birbs.iter().map(|b| (b.x, b.y, b.rotation)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn long_ticks_are_capped() {
        let config = SimulationConfig {
            world_width: 100.0,
            world_height: 100.0,
            birb_count: 1,
            birb_speed: 0.5,
            visual_distance: 30.0,
            min_distance: 10.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let mut birbs = vec![Birb::new(0, 80.0, 50.0, 0.0)];
        let mut grid = UniformGrid::new(config.cell_size(), 100.0, 100.0).expect("grid");
        grid.insert(&mut birbs[0]);

        // A stalled second-long frame moves no further than a capped one
        step(&mut birbs, &mut grid, &config, 1000.0, NeighborSearch::Grid);
        assert_eq!(birbs[0].x, 80.0 + 0.5 * MAX_FRAME_MS - 100.0);
        assert!((0.0..100.0).contains(&birbs[0].x));
        assert_eq!(birbs[0].y, 50.0);
        assert_eq!(birbs[0].cached_cell, Some(grid.cell_coordinates(birbs[0].x, 50.0)));

        step(&mut birbs, &mut grid, &config, f32::INFINITY, NeighborSearch::Grid);
        assert_eq!(birbs[0].x, 30.0);
    }

    #[test]
    fn step_reports_stats() {
        let config = config();
        let mut birbs = vec![
            Birb::new(0, 100.0, 100.0, 0.0),
            Birb::new(1, 110.0, 100.0, PI),
            Birb::new(2, 10.0, 10.0, 0.0),
        ];
        let mut grid = UniformGrid::new(config.cell_size(), 200.0, 200.0).expect("grid");
        for birb in birbs.iter_mut() {
            grid.insert(birb);
        }

        let stats = step(&mut birbs, &mut grid, &config, 1.0, NeighborSearch::BruteForce);
        assert_eq!(stats.candidates_examined, 9);
        assert_eq!(stats.perceived_neighbors, 2);
        assert_eq!(stats.isolated, 1);
    }

    #[test]
    fn search_toggles() {
        assert_eq!(NeighborSearch::Grid.toggled(), NeighborSearch::BruteForce);
        assert_eq!(NeighborSearch::BruteForce.toggled(), NeighborSearch::Grid);
    }
}
