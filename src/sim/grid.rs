//! Uniform grid broad-phase
//!
//! Space is cut into cubes of side `cell_size` covering the box plus a
//! one-cell margin. Every tick the grid is cleared and each body is dropped
//! into the cell holding its center. With `cell_size` at least the largest
//! contact distance, every touching pair sits in the same or an adjacent
//! cell, so a 3x3x3 lookup finds it.

use glam::{IVec3, UVec3, Vec3};

use super::body::BodySet;
use crate::config::ConfigError;
use crate::consts::MAX_GRID_CELLS;

/// Occupancy summary, mostly for spotting a grid that failed to partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub occupied_cells: usize,
    pub total_entries: usize,
    pub max_cell_load: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformGrid {
    cell_size: f32,
    /// Half-extent of the covered box
    bounds: Vec3,
    dims: UVec3,
    /// Body indices per cell, flattened x-fastest; each list is ascending
    cells: Vec<Vec<usize>>,
    /// Cell each body landed in on the last rebuild
    body_cells: Vec<Option<UVec3>>,
}

impl UniformGrid {
    pub fn new(bounds: Vec3, cell_size: f32) -> Result<Self, ConfigError> {
        let (dims, cell_count) = Self::dimensions(bounds, cell_size)?;

        log::debug!(
            "Uniform grid {}x{}x{} (cell size {:.3})",
            dims.x,
            dims.y,
            dims.z,
            cell_size
        );

        Ok(Self {
            cell_size,
            bounds,
            dims,
            cells: vec![Vec::new(); cell_count],
            body_cells: Vec::new(),
        })
    }

    /// Cells per axis (box plus margin) and their product
    ///
    /// Refuses grids over `MAX_GRID_CELLS`; sizes that would overflow
    /// report `usize::MAX` cells.
    pub fn dimensions(bounds: Vec3, cell_size: f32) -> Result<(UVec3, usize), ConfigError> {
        let too_large = |cells| ConfigError::GridTooLarge {
            cells,
            max: MAX_GRID_CELLS,
        };

        let mut dims = [0u32; 3];
        let mut cells: usize = 1;
        for axis in 0..3 {
            let span = (2.0 * bounds[axis] / cell_size).ceil() + 2.0;
            if !(span.is_finite() && span >= 0.0) || span > MAX_GRID_CELLS as f32 {
                return Err(too_large(usize::MAX));
            }
            dims[axis] = span as u32;
            cells = cells
                .checked_mul(span as usize)
                .ok_or_else(|| too_large(usize::MAX))?;
        }
        if cells > MAX_GRID_CELLS {
            return Err(too_large(cells));
        }
        Ok((UVec3::from_array(dims), cells))
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell index of a world coordinate along one axis
    ///
    /// `None` when the coordinate falls off the grid (or is not finite).
    pub fn cell_index(&self, coord: f32, axis: usize) -> Option<u32> {
        let offset = (coord + self.bounds[axis]) / self.cell_size;
        if !offset.is_finite() {
            return None;
        }
        let index = offset.ceil();
        if index < 0.0 || index >= self.dims[axis] as f32 {
            return None;
        }
        Some(index as u32)
    }

    /// Cell holding a world position
    pub fn cell_of(&self, position: Vec3) -> Option<UVec3> {
        Some(UVec3::new(
            self.cell_index(position.x, 0)?,
            self.cell_index(position.y, 1)?,
            self.cell_index(position.z, 2)?,
        ))
    }

    /// Bodies stored in a cell; empty for cells off the grid
    pub fn cell(&self, cell: IVec3) -> &[usize] {
        match self.flatten(cell) {
            Some(flat) => &self.cells[flat],
            None => &[],
        }
    }

    /// Cell a body was filed under by the last rebuild
    pub fn body_cell(&self, index: usize) -> Option<UVec3> {
        self.body_cells.get(index).copied().flatten()
    }

    /// Clear every cell and re-file each body by its current position
    pub fn rebuild(&mut self, bodies: &BodySet) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.body_cells.clear();

        for (index, body) in bodies.iter().enumerate() {
            let cell = self.cell_of(body.position);
            match cell.and_then(|c| self.flatten(c.as_ivec3())) {
                Some(flat) => self.cells[flat].push(index),
                None => log::warn!(
                    "Body {} at {:?} is outside the grid",
                    index,
                    body.position
                ),
            }
            self.body_cells.push(cell);
        }
    }

    /// Broad-phase candidates for a body: everything in the 3x3x3 block
    /// around its cell, itself excluded, ascending
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.neighbors_into(index, &mut out);
        out
    }

    /// Like [`neighbors`](Self::neighbors) but reuses `out`
    pub fn neighbors_into(&self, index: usize, out: &mut Vec<usize>) {
        assert!(
            index < self.body_cells.len(),
            "body index {} out of range (n = {})",
            index,
            self.body_cells.len()
        );
        out.clear();

        let Some(center) = self.body_cells[index] else {
            return;
        };
        let center = center.as_ivec3();

        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let cell = self.cell(center + IVec3::new(dx, dy, dz));
                    out.extend(cell.iter().copied().filter(|&other| other != index));
                }
            }
        }
        out.sort_unstable();
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats::default();
        for cell in self.cells.iter().filter(|c| !c.is_empty()) {
            stats.occupied_cells += 1;
            stats.total_entries += cell.len();
            stats.max_cell_load = stats.max_cell_load.max(cell.len());
        }
        stats
    }

    /// Flat index with explicit range checks; `None` off the grid
    fn flatten(&self, cell: IVec3) -> Option<usize> {
        let dims = self.dims.as_ivec3();
        if cell.cmplt(IVec3::ZERO).any() || cell.cmpge(dims).any() {
            return None;
        }
        Some((cell.x + dims.x * (cell.y + dims.y * cell.z)) as usize)
    }
}
