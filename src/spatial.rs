//! Uniform hash grid for neighbor queries
//!
//! Points are bucketed into square cells of `cell_size`. When the cell size is
//! at least the largest interaction distance, every interacting pair sits in
//! the same or an adjacent cell, so a 3x3 scan finds them all.

use std::collections::HashMap;

use glam::Vec2;

/// Sparse grid of point indices
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket `points` by index; `cell_size` must be positive and finite
    pub fn build(cell_size: f32, points: &[Vec2]) -> Self {
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
        };
        for (i, point) in points.iter().enumerate() {
            let cell = grid.cell_of(*point);
            grid.cells.entry(cell).or_default().push(i);
        }
        grid
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, point: Vec2) -> (i32, i32) {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// Indices in the cell containing `point` and its eight neighbors
    pub fn neighbors(&self, point: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(point);
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (cx.saturating_add(dx), cy.saturating_add(dy))))
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
    }
}
