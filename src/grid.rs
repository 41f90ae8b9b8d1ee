/*
 * Uniform Grid Module
 *
 * This module defines the UniformGrid struct for neighbor lookups on the
 * toroidal world. The world is cut into `rows x cols` square cells and every
 * birb id is filed in exactly the cell containing its position, so "who might
 * be near me" only has to look at the 3x3 block of cells around a birb instead
 * of the whole population.
 *
 * Notes:
 * - Cells hold plain ids into the simulation's birb array, never the birbs
 * - Cells are a flat Vec indexed by `y * cols + x`
 * - The 3x3 block wraps at the edges: cell -1 is cell cols-1 (or rows-1)
 * - Membership changes only go through insert/remove/relocate, which keep the
 *   birb's cached cell in step with the grid
 */

use crate::birb::{Birb, CellCoord};
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f32,
    rows: usize,
    cols: usize,
    cells: Vec<Vec<usize>>,
}

// Largest number of cells a grid may allocate
pub const MAX_GRID_CELLS: usize = 1 << 24;

impl UniformGrid {
    pub fn new(cell_size: f32, world_width: f32, world_height: f32) -> ConfigResult<Self> {
        let (rows, cols) = Self::dimensions(cell_size, world_width, world_height)?;

        Ok(Self {
            cell_size,
            rows,
            cols,
            cells: vec![Vec::new(); rows * cols],
        })
    }

    // `(rows, cols)` of the grid covering the world, without allocating it
    pub fn dimensions(cell_size: f32, world_width: f32, world_height: f32) -> ConfigResult<(usize, usize)> {
        if !(world_width.is_finite() && world_height.is_finite() && world_width > 0.0 && world_height > 0.0) {
            return Err(ConfigError::InvalidWorld {
                width: world_width,
                height: world_height,
            });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::NonPositiveCellSize(cell_size));
        }

        // Float to int casts saturate, so huge ratios end up over the limit
        let cols = (world_width / cell_size).ceil() as usize;
        let rows = (world_height / cell_size).ceil() as usize;
        match rows.checked_mul(cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok((rows, cols)),
            _ => Err(ConfigError::GridTooLarge {
                rows,
                cols,
                limit: MAX_GRID_CELLS,
            }),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    // Number of filed birbs across all cells
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    #[inline]
    pub fn cell_coordinates(&self, x: f32, y: f32) -> CellCoord {
        CellCoord::new(
            (x / self.cell_size).floor() as isize,
            (y / self.cell_size).floor() as isize,
        )
    }

    // Ids filed in a cell; out-of-range coordinates wrap around
    pub fn cell(&self, coord: CellCoord) -> &[usize] {
        &self.cells[self.cell_index(coord)]
    }

    // Whether the birb is filed in the cell its cache points at
    pub fn contains(&self, birb: &Birb) -> bool {
        birb.cached_cell
            .map_or(false, |coord| self.cell(coord).contains(&birb.id))
    }

    pub fn insert(&mut self, birb: &mut Birb) {
        assert!(
            birb.cached_cell.is_none(),
            "birb {} is already filed in cell {:?}",
            birb.id,
            birb.cached_cell
        );

        let coord = self.cell_coordinates(birb.x, birb.y);
        let index = self.cell_index(coord);
        self.cells[index].push(birb.id);
        birb.cached_cell = Some(coord);
    }

    pub fn remove(&mut self, birb: &mut Birb) {
        let coord = match birb.cached_cell {
            Some(coord) => coord,
            None => panic!("birb {} is not filed in the grid", birb.id),
        };

        let index = self.cell_index(coord);
        let cell = &mut self.cells[index];
        match cell.iter().position(|&id| id == birb.id) {
            // Cells are unordered
            Some(slot) => {
                cell.swap_remove(slot);
            }
            None => panic!("birb {} is missing from its cached cell {:?}", birb.id, coord),
        }
        birb.cached_cell = None;
    }

    // Move the birb to the cell matching its current position. Returns true
    // if it changed cells.
    pub fn relocate(&mut self, birb: &mut Birb) -> bool {
        let current = self.cell_coordinates(birb.x, birb.y);
        match birb.cached_cell {
            Some(cached) if cached == current => false,
            Some(_) => {
                self.remove(birb);
                self.insert(birb);
                true
            }
            None => panic!("cannot relocate birb {}: it is not filed in the grid", birb.id),
        }
    }

    // Write every id in the wrapped 3x3 block around the birb's cell into `out`,
    // the birb itself included. The result is a superset of the birbs within
    // one cell size; callers filter by real distance.
    pub fn query_potential_neighbors(&self, birb: &Birb, out: &mut Vec<usize>) {
        let center = birb
            .cached_cell
            .unwrap_or_else(|| self.cell_coordinates(birb.x, birb.y));
        self.query_block(center, out);
    }

    // Refill the birb's own potential neighbor buffer
    pub fn update_potential_neighbors(&self, birb: &mut Birb) {
        let mut buffer = std::mem::take(&mut birb.potential_neighbors);
        self.query_potential_neighbors(birb, &mut buffer);
        birb.potential_neighbors = buffer;
    }

    // Write every id in the wrapped 3x3 block centered on `center` into `out`,
    // in ascending order
    pub fn query_block(&self, center: CellCoord, out: &mut Vec<usize>) {
        out.clear();

        // With fewer than three rows or columns the wrapped block would visit
        // a cell twice, so each axis only keeps distinct indices
        let (rows, row_count) = wrapped_span(center.y, self.rows);
        let (cols, col_count) = wrapped_span(center.x, self.cols);

        for &row in &rows[..row_count] {
            let row_start = row * self.cols;
            for &col in &cols[..col_count] {
                out.extend_from_slice(&self.cells[row_start + col]);
            }
        }

        // Neighbors are then summed in id order, the same order as a full scan
        out.sort_unstable();
    }

    #[inline]
    fn cell_index(&self, coord: CellCoord) -> usize {
        let x = coord.x.rem_euclid(self.cols as isize) as usize;
        let y = coord.y.rem_euclid(self.rows as isize) as usize;
        y * self.cols + x
    }
}

// Distinct indices of `center - 1 ..= center + 1` wrapped into `0..extent`
fn wrapped_span(center: isize, extent: usize) -> ([usize; 3], usize) {
    let mut span = [0usize; 3];
    let mut len = 0;
    for offset in -1..=1 {
        let index = (center + offset).rem_euclid(extent as isize) as usize;
        if !span[..len].contains(&index) {
            span[len] = index;
            len += 1;
        }
    }
    (span, len)
}
