//! Static map model shared by every field.

use endless_defence_core::{CellCoord, CellPoint, WorldPoint};
use endless_defence_system_movement::point_along;
use thiserror::Error;

const STANDARD_COLUMNS: u32 = 14;
const STANDARD_ROWS: u32 = 8;
const STANDARD_TILE_LENGTH: f32 = 56.0;

const STANDARD_PATH: [(u32, u32); 16] = [
    (0, 3),
    (1, 3),
    (2, 3),
    (3, 3),
    (4, 3),
    (5, 3),
    (5, 4),
    (5, 5),
    (6, 5),
    (7, 5),
    (8, 5),
    (9, 5),
    (10, 5),
    (11, 5),
    (12, 5),
    (13, 5),
];

const STANDARD_BLOCKED: [(u32, u32); 6] = [(2, 1), (3, 1), (9, 2), (9, 3), (11, 1), (12, 1)];

/// Terrain of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Towers may be placed here.
    Buildable,
    /// Impassable scenery; nothing may be placed here.
    Blocked,
    /// Part of the enemy route.
    Path,
}

/// Problems detected while assembling a map.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The grid has no cells.
    #[error("map must have at least one column and one row")]
    EmptyGrid,
    /// The tile length is not a positive finite number.
    #[error("tile length must be positive and finite")]
    InvalidTileLength,
    /// The path has fewer than two waypoints.
    #[error("path needs at least two waypoints")]
    PathTooShort,
    /// A waypoint lies outside the grid.
    #[error("waypoint ({column}, {row}) lies outside the grid")]
    WaypointOutOfBounds {
        /// Column of the offending waypoint.
        column: u32,
        /// Row of the offending waypoint.
        row: u32,
    },
    /// Two consecutive waypoints are not orthogonal neighbours.
    #[error("waypoints ({column}, {row}) and its predecessor are not adjacent")]
    DisjointPath {
        /// Column of the offending waypoint.
        column: u32,
        /// Row of the offending waypoint.
        row: u32,
    },
    /// A blocked cell lies outside the grid or on the path.
    #[error("blocked cell ({column}, {row}) is outside the grid or on the path")]
    InvalidBlockedCell {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
    },
}

/// Immutable tile grid plus the waypoint path enemies follow.
#[derive(Clone, Debug, PartialEq)]
pub struct MapModel {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<Tile>,
    path: Vec<CellCoord>,
}

impl MapModel {
    /// Assembles and validates a map.
    ///
    /// The path must consist of at least two in-bounds waypoints, each an
    /// orthogonal neighbour of the previous one. Blocked cells must lie inside
    /// the grid and off the path.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        path: Vec<CellCoord>,
        blocked: &[CellCoord],
    ) -> Result<Self, MapError> {
        if columns == 0 || rows == 0 {
            return Err(MapError::EmptyGrid);
        }
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(MapError::InvalidTileLength);
        }
        if path.len() < 2 {
            return Err(MapError::PathTooShort);
        }

        let in_bounds = |cell: CellCoord| cell.column() < columns && cell.row() < rows;
        for (index, waypoint) in path.iter().enumerate() {
            if !in_bounds(*waypoint) {
                return Err(MapError::WaypointOutOfBounds {
                    column: waypoint.column(),
                    row: waypoint.row(),
                });
            }
            if index > 0 && !adjacent(path[index - 1], *waypoint) {
                return Err(MapError::DisjointPath {
                    column: waypoint.column(),
                    row: waypoint.row(),
                });
            }
        }

        for cell in blocked {
            if !in_bounds(*cell) || path.contains(cell) {
                return Err(MapError::InvalidBlockedCell {
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }

        Ok(Self::from_parts(columns, rows, tile_length, path, blocked))
    }

    /// The 14 by 8 map every field plays on.
    #[must_use]
    pub fn standard() -> Self {
        let path = STANDARD_PATH
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect();
        let blocked: Vec<CellCoord> = STANDARD_BLOCKED
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect();
        Self::from_parts(
            STANDARD_COLUMNS,
            STANDARD_ROWS,
            STANDARD_TILE_LENGTH,
            path,
            &blocked,
        )
    }

    fn from_parts(
        columns: u32,
        rows: u32,
        tile_length: f32,
        path: Vec<CellCoord>,
        blocked: &[CellCoord],
    ) -> Self {
        let mut tiles = vec![Tile::Buildable; columns as usize * rows as usize];
        for cell in blocked {
            tiles[index_of(columns, *cell)] = Tile::Blocked;
        }
        for cell in &path {
            tiles[index_of(columns, *cell)] = Tile::Path;
        }

        Self {
            columns,
            rows,
            tile_length,
            tiles,
            path,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Waypoints enemies walk, from spawn to base.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Number of unit segments between consecutive waypoints.
    #[must_use]
    pub fn segment_count(&self) -> u32 {
        u32::try_from(self.path.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Terrain of the cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if self.contains(cell) {
            Some(self.tiles[index_of(self.columns, cell)])
        } else {
            None
        }
    }

    /// Reports whether a tower may stand on the cell, ignoring occupancy.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.tile(cell) == Some(Tile::Buildable)
    }

    /// World position of a cell's centre.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        self.to_world(CellPoint::from(cell))
    }

    /// Maps a fractional cell location onto world units.
    #[must_use]
    pub fn to_world(&self, point: CellPoint) -> WorldPoint {
        WorldPoint::new(
            (point.column() + 0.5) * self.tile_length,
            (point.row() + 0.5) * self.tile_length,
        )
    }

    /// World position of an enemy at `progress` along the path.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> WorldPoint {
        self.to_world(point_along(&self.path, progress))
    }
}

impl Default for MapModel {
    fn default() -> Self {
        Self::standard()
    }
}

fn index_of(columns: u32, cell: CellCoord) -> usize {
    cell.row() as usize * columns as usize + cell.column() as usize
}

fn adjacent(a: CellCoord, b: CellCoord) -> bool {
    a.column().abs_diff(b.column()) + a.row().abs_diff(b.row()) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_has_fifteen_segments() {
        let map = MapModel::standard();
        assert_eq!(map.columns(), 14);
        assert_eq!(map.rows(), 8);
        assert_eq!(map.segment_count(), 15);
        assert_eq!(map.path().first(), Some(&CellCoord::new(0, 3)));
        assert_eq!(map.path().last(), Some(&CellCoord::new(13, 5)));
    }

    #[test]
    fn standard_map_passes_validation() {
        let blocked: Vec<CellCoord> = STANDARD_BLOCKED
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect();
        let validated = MapModel::new(
            STANDARD_COLUMNS,
            STANDARD_ROWS,
            STANDARD_TILE_LENGTH,
            MapModel::standard().path().to_vec(),
            &blocked,
        )
        .expect("standard map is valid");
        assert_eq!(validated, MapModel::standard());
    }

    #[test]
    fn tiles_are_classified() {
        let map = MapModel::standard();
        assert_eq!(map.tile(CellCoord::new(0, 3)), Some(Tile::Path));
        assert_eq!(map.tile(CellCoord::new(5, 4)), Some(Tile::Path));
        assert_eq!(map.tile(CellCoord::new(9, 2)), Some(Tile::Blocked));
        assert_eq!(map.tile(CellCoord::new(0, 0)), Some(Tile::Buildable));
        assert_eq!(map.tile(CellCoord::new(14, 0)), None);
        assert!(!map.is_buildable(CellCoord::new(12, 1)));
        assert!(map.is_buildable(CellCoord::new(4, 2)));
    }

    #[test]
    fn cells_map_to_their_centres() {
        let map = MapModel::standard();
        assert_eq!(
            map.cell_center(CellCoord::new(0, 0)),
            WorldPoint::new(28.0, 28.0)
        );
        assert_eq!(
            map.cell_center(CellCoord::new(2, 1)),
            WorldPoint::new(140.0, 84.0)
        );
        assert_eq!(map.position_at(0.5), WorldPoint::new(56.0, 196.0));
    }

    #[test]
    fn rejects_disjoint_paths() {
        let error = MapModel::new(
            4,
            4,
            10.0,
            vec![CellCoord::new(0, 0), CellCoord::new(2, 0)],
            &[],
        )
        .unwrap_err();
        assert_eq!(error, MapError::DisjointPath { column: 2, row: 0 });
    }

    #[test]
    fn rejects_blocked_path_cells() {
        let path = vec![CellCoord::new(0, 0), CellCoord::new(1, 0)];
        let error = MapModel::new(4, 4, 10.0, path, &[CellCoord::new(1, 0)]).unwrap_err();
        assert_eq!(error, MapError::InvalidBlockedCell { column: 1, row: 0 });
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert_eq!(
            MapModel::new(0, 4, 10.0, Vec::new(), &[]),
            Err(MapError::EmptyGrid)
        );
        assert_eq!(
            MapModel::new(4, 4, f32::NAN, Vec::new(), &[]),
            Err(MapError::InvalidTileLength)
        );
        assert_eq!(
            MapModel::new(4, 4, 10.0, vec![CellCoord::new(0, 0)], &[]),
            Err(MapError::PathTooShort)
        );
    }
}
