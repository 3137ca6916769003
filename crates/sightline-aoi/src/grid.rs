//! Uniform grid partition of the plane.
//!
//! Each cell buckets the entities whose position fell inside it when they
//! were placed. Neighbour scans prune whole cells by the distance from the
//! observer to the closest point of the cell before looking at any entity.

use glam::DVec2;
use rustc_hash::FxHashMap;

use crate::entity::{EntityGuid, VisionEntity};

/// Column/row address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Entities bucketed in one cell, keyed by guid.
pub(crate) type Cell<E> = FxHashMap<EntityGuid, E>;

/// Returns `true` if `b` lies within `vision` of `a`. Uses squared-distance
/// comparison to avoid a square root.
pub(crate) fn within_vision(a: DVec2, b: DVec2, vision: f64) -> bool {
    vision >= 0.0 && a.distance_squared(b) <= vision * vision
}

/// A `columns` x `rows` array of cells, indexed `[x][y]`.
pub(crate) struct Grid<E> {
    cell_size: DVec2,
    columns: usize,
    rows: usize,
    cells: Vec<Vec<Cell<E>>>,
}

impl<E> Grid<E> {
    /// Allocate an empty `columns` x `rows` grid of `cell_size` cells. Both
    /// counts must be at least 1; callers take them from
    /// [`AoiSettings::grid_dimensions`](crate::AoiSettings::grid_dimensions).
    pub fn new(columns: usize, rows: usize, cell_size: DVec2) -> Self {
        let cells = (0..columns)
            .map(|_| (0..rows).map(|_| Cell::default()).collect())
            .collect();
        Self {
            cell_size,
            columns,
            rows,
            cells,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Returns `true` if `position` maps to a cell without clamping.
    pub fn covers(&self, position: DVec2) -> bool {
        let cell = position / self.cell_size;
        cell.x >= 0.0
            && cell.y >= 0.0
            && cell.x < self.columns as f64
            && cell.y < self.rows as f64
    }

    /// Cell containing `position`. Coordinates off the grid (including NaN)
    /// clamp to the nearest border cell.
    pub fn cell_coord(&self, position: DVec2) -> CellCoord {
        let cell = (position / self.cell_size).floor();
        CellCoord {
            x: (cell.x.max(0.0) as usize).min(self.columns - 1),
            y: (cell.y.max(0.0) as usize).min(self.rows - 1),
        }
    }

    pub fn insert(&mut self, coord: CellCoord, guid: EntityGuid, entity: E) {
        self.cells[coord.x][coord.y].insert(guid, entity);
    }

    pub fn remove(&mut self, coord: CellCoord, guid: EntityGuid) -> Option<E> {
        self.cells[coord.x][coord.y].remove(&guid)
    }

    pub fn get(&self, coord: CellCoord, guid: EntityGuid) -> Option<&E> {
        self.cells[coord.x][coord.y].get(&guid)
    }

    #[cfg(test)]
    pub fn cell(&self, coord: CellCoord) -> &Cell<E> {
        &self.cells[coord.x][coord.y]
    }

    /// Point of the cell rectangle nearest to `position`. Border cells are
    /// open towards the outside so clamped entities are never pruned away.
    fn closest_point(&self, coord: CellCoord, position: DVec2) -> DVec2 {
        let mut min = DVec2::new(coord.x as f64, coord.y as f64) * self.cell_size;
        let mut max = min + self.cell_size;
        if coord.x == 0 {
            min.x = f64::NEG_INFINITY;
        }
        if coord.y == 0 {
            min.y = f64::NEG_INFINITY;
        }
        if coord.x == self.columns - 1 {
            max.x = f64::INFINITY;
        }
        if coord.y == self.rows - 1 {
            max.y = f64::INFINITY;
        }
        DVec2::new(
            position.x.max(min.x).min(max.x),
            position.y.max(min.y).min(max.y),
        )
    }

    /// Cells within `vision` of `position`: the `ceil(vision / cell)` span
    /// around the centre cell, minus cells whose closest point is out of range.
    fn cells_in_range(&self, position: DVec2, vision: f64) -> Vec<CellCoord> {
        if !(vision >= 0.0) {
            return Vec::new();
        }
        let center = self.cell_coord(position);
        let span_x = (vision / self.cell_size.x).ceil() as usize;
        let span_y = (vision / self.cell_size.y).ceil() as usize;

        let start_x = center.x.saturating_sub(span_x);
        let end_x = center.x.saturating_add(span_x).min(self.columns - 1);
        let start_y = center.y.saturating_sub(span_y);
        let end_y = center.y.saturating_add(span_y).min(self.rows - 1);

        let mut coords = Vec::new();
        for x in start_x..=end_x {
            for y in start_y..=end_y {
                let coord = CellCoord::new(x, y);
                if within_vision(position, self.closest_point(coord, position), vision) {
                    coords.push(coord);
                }
            }
        }
        coords
    }
}

impl<E: VisionEntity + Clone> Grid<E> {
    /// Every entity other than `observer` within `vision` of `position`.
    pub fn visible_entities(&self, observer: EntityGuid, position: DVec2, vision: f64) -> Vec<E> {
        let coords = self.cells_in_range(position, vision);
        tracing::trace!(
            "AOI scan for {}: {} candidate cells",
            observer,
            coords.len()
        );

        let mut visible = Vec::new();
        for coord in coords {
            for (guid, entity) in &self.cells[coord.x][coord.y] {
                if *guid != observer && within_vision(position, entity.position(), vision) {
                    visible.push(entity.clone());
                }
            }
        }
        visible
    }

    /// Clone of every placed entity, in cell order.
    pub fn snapshot(&self) -> Vec<E> {
        self.cells
            .iter()
            .flatten()
            .flat_map(|cell| cell.values().cloned())
            .collect()
    }
}
