/*
 * Birb Module
 *
 * This module defines the Birb struct, the per-agent simulation state.
 * A birb is plain data: position, heading, a lazily refreshed copy of the
 * heading's trig, and the grid cell it is currently filed under. Drawing is
 * handled elsewhere from a RenderBirb copy, so nothing here knows about the
 * renderer.
 */

use std::f32::consts::TAU;

use rand::Rng;

// Integer coordinates of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: isize,
    pub y: isize,
}

impl CellCoord {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct Birb {
    // Index into the owning simulation's birb array
    pub id: usize,
    pub x: f32,
    pub y: f32,
    // Radians, never normalized
    pub rotation: f32,
    pub cached_rotation: f32,
    pub cached_cos: f32,
    pub cached_sin: f32,
    // None while the birb is not filed in a grid
    pub cached_cell: Option<CellCoord>,
    // Scratch buffer overwritten by every grid query
    pub potential_neighbors: Vec<usize>,
}

impl Birb {
    pub fn new(id: usize, x: f32, y: f32, rotation: f32) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            id,
            x,
            y,
            rotation,
            cached_rotation: rotation,
            cached_cos: cos,
            cached_sin: sin,
            cached_cell: None,
            potential_neighbors: Vec::new(),
        }
    }

    // Uniformly random position inside the world and random heading
    pub fn random<R: Rng + ?Sized>(id: usize, rng: &mut R, world_width: f32, world_height: f32) -> Self {
        let x = rng.gen_range(0.0..world_width);
        let y = rng.gen_range(0.0..world_height);
        let rotation = rng.gen_range(0.0..TAU);
        Self::new(id, x, y, rotation)
    }

    // Recompute the cached trig if the heading moved since the last refresh.
    // Returns true when the cache was stale.
    #[inline]
    pub fn refresh_trig(&mut self) -> bool {
        if self.rotation == self.cached_rotation {
            return false;
        }
        let (sin, cos) = self.rotation.sin_cos();
        self.cached_rotation = self.rotation;
        self.cached_cos = cos;
        self.cached_sin = sin;
        true
    }

    #[inline]
    pub fn is_filed(&self) -> bool {
        self.cached_cell.is_some()
    }

    #[inline]
    pub fn distance_sq_to(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy
    }
}
