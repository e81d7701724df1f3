//! Grid module - owns the cells of one level attempt
//!
//! The grid is a `rows x cols` matrix stored as a flat row-major vector, plus a parallel
//! activity mask marking layout holes. Inactive cells never hold a tile and are skipped by
//! every query. Coordinates are `(row, col)` with row 0 at the top.
//!
//! Addressing a position outside the grid is a programmer error and panics; the session
//! layer validates player input before it reaches here.

use std::fmt;

use crate::level::LevelError;
use crate::rng::SpawnWeights;
use crate::tile::{Tile, TileId};
use crate::types::{Position, TileKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Option<Tile>>,
    active: Vec<bool>,
    next_id: u32,
}

impl Grid {
    /// Create an empty grid with every cell active
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be non-zero");
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            active: vec![true; rows * cols],
            next_id: 1,
        }
    }

    /// Build a grid from a text layout, one string per row
    ///
    /// Each character is a tile kind code (`F`, `O`, `C`, `P`, `W`, `S`), `#` for an
    /// inactive cell or `.` for an empty active cell. Whitespace is ignored.
    ///
    /// ```
    /// use tile_cascade_core::Grid;
    /// use tile_cascade_core::types::{Position, TileKind};
    ///
    /// let grid = Grid::from_layout(&["FOC", "#FF"]).unwrap();
    /// assert_eq!(grid.rows(), 2);
    /// assert!(!grid.is_active(Position::new(1, 0)));
    /// assert_eq!(grid.tile(Position::new(0, 2)).kind, TileKind::Crystal);
    /// ```
    pub fn from_layout(layout: &[&str]) -> Result<Self, LevelError> {
        let parsed: Vec<Vec<char>> = layout
            .iter()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let rows = parsed.len();
        let cols = parsed.first().map_or(0, |r| r.len());
        if rows == 0 || cols == 0 {
            return Err(LevelError::InvalidDimensions { rows, cols });
        }

        let mut grid = Self::new(rows, cols);
        for (row, line) in parsed.iter().enumerate() {
            if line.len() != cols {
                return Err(LevelError::RaggedLayout { row });
            }
            for (col, &ch) in line.iter().enumerate() {
                let pos = Position::new(row, col);
                match ch {
                    '#' => grid.set_active(pos, false),
                    '.' => {}
                    _ => {
                        let kind = TileKind::from_char(ch)
                            .ok_or(LevelError::UnknownLayoutCode { ch, pos })?;
                        grid.spawn_tile(pos, kind);
                    }
                }
            }
        }
        Ok(grid)
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> usize {
        assert!(
            self.in_bounds(pos),
            "position {} outside {}x{} grid",
            pos,
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn is_active(&self, pos: Position) -> bool {
        self.active[self.index(pos)]
    }

    /// Mark a cell as playable or as a layout hole; deactivating drops its tile
    pub fn set_active(&mut self, pos: Position, active: bool) {
        let idx = self.index(pos);
        self.active[idx] = active;
        if !active {
            self.cells[idx] = None;
        }
    }

    /// Tile at `pos`, or `None` for an empty or inactive cell
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.cells[self.index(pos)].as_ref()
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        let idx = self.index(pos);
        self.cells[idx].as_mut()
    }

    /// Tile at `pos`
    ///
    /// # Panics
    ///
    /// Panics if the cell is empty or inactive.
    pub fn tile(&self, pos: Position) -> &Tile {
        match self.get(pos) {
            Some(tile) => tile,
            None => panic!("no tile at {}", pos),
        }
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.is_active(pos) && self.get(pos).is_none()
    }

    /// Put a tile into an active cell, rewriting its coordinates
    ///
    /// # Panics
    ///
    /// Panics if the cell is inactive.
    pub fn place(&mut self, pos: Position, mut tile: Tile) {
        let idx = self.index(pos);
        assert!(self.active[idx], "cannot place a tile on inactive cell {}", pos);
        tile.row = pos.row;
        tile.col = pos.col;
        self.cells[idx] = Some(tile);
    }

    /// Remove and return the tile at `pos`, leaving the cell empty
    pub fn take(&mut self, pos: Position) -> Option<Tile> {
        let idx = self.index(pos);
        self.cells[idx].take()
    }

    /// Create a tile with a fresh id and place it at `pos`
    pub fn spawn_tile(&mut self, pos: Position, kind: TileKind) -> Tile {
        let tile = Tile::new(self.allocate_id(), pos, kind);
        self.place(pos, tile);
        tile
    }

    /// Reserve the next unused tile id
    pub fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Exchange the contents of two cells, fixing up tile coordinates
    pub(crate) fn swap_cells(&mut self, a: Position, b: Position) {
        let ia = self.index(a);
        let ib = self.index(b);
        self.cells.swap(ia, ib);
        for (idx, pos) in [(ia, a), (ib, b)] {
            if let Some(tile) = self.cells[idx].as_mut() {
                tile.row = pos.row;
                tile.col = pos.col;
            }
        }
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Position::new(i / cols, i % cols))
    }

    /// Active positions in row-major order
    pub fn active_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|p| self.active[p.row * self.cols + p.col])
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    /// Active cells currently holding no tile
    pub fn empty_positions(&self) -> Vec<Position> {
        self.active_positions()
            .filter(|p| self.get(*p).is_none())
            .collect()
    }

    /// True when every active cell holds a tile
    pub fn is_settled(&self) -> bool {
        self.active_positions().all(|p| self.get(p).is_some())
    }

    pub fn find_tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles().find(|t| t.id == id)
    }

    /// Every tile in `row`, left to right
    pub fn tiles_in_row(&self, row: usize) -> Vec<Tile> {
        assert!(row < self.rows, "row {} outside grid", row);
        (0..self.cols)
            .filter_map(|col| self.get(Position::new(row, col)).copied())
            .collect()
    }

    /// Every tile in `col`, top to bottom
    pub fn tiles_in_column(&self, col: usize) -> Vec<Tile> {
        assert!(col < self.cols, "column {} outside grid", col);
        (0..self.rows)
            .filter_map(|row| self.get(Position::new(row, col)).copied())
            .collect()
    }

    /// Tiles in the square of the given radius around `center`, clipped to the grid
    pub fn tiles_in_radius(&self, center: Position, radius: usize) -> Vec<Tile> {
        assert!(self.in_bounds(center), "position {} outside grid", center);
        let row_lo = center.row.saturating_sub(radius);
        let row_hi = center.row.saturating_add(radius).min(self.rows - 1);
        let col_lo = center.col.saturating_sub(radius);
        let col_hi = center.col.saturating_add(radius).min(self.cols - 1);

        let mut out = Vec::with_capacity((row_hi - row_lo + 1) * (col_hi - col_lo + 1));
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                if let Some(tile) = self.get(Position::new(row, col)) {
                    out.push(*tile);
                }
            }
        }
        out
    }

    /// Every tile of the given base kind
    pub fn tiles_by_kind(&self, kind: TileKind) -> Vec<Tile> {
        self.tiles().filter(|t| t.kind == kind).copied().collect()
    }

    /// Observed kind distribution, usable as spawn weights
    pub fn kind_counts(&self) -> SpawnWeights {
        let mut counts = SpawnWeights::default();
        for tile in self.tiles() {
            counts.set(tile.kind, counts.get(tile.kind) + 1);
        }
        counts
    }
}

/// Text layout: kind codes, `#` for holes, `.` for empty cells. Booster tiles print
/// lower-case.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.cols {
                let pos = Position::new(row, col);
                let ch = if !self.is_active(pos) {
                    '#'
                } else {
                    match self.get(pos) {
                        None => '.',
                        Some(t) if t.booster.is_some() => t.kind.as_char().to_ascii_lowercase(),
                        Some(t) => t.kind.as_char(),
                    }
                };
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(4, 5);
        assert_eq!(grid.index(Position::new(0, 0)), 0);
        assert_eq!(grid.index(Position::new(0, 4)), 4);
        assert_eq!(grid.index(Position::new(1, 0)), 5);
        assert_eq!(grid.index(Position::new(3, 4)), 19);
    }

    #[test]
    #[should_panic(expected = "outside 4x5 grid")]
    fn test_grid_out_of_bounds_panics() {
        let grid = Grid::new(4, 5);
        grid.get(Position::new(4, 0));
    }

    #[test]
    fn test_layout_display_roundtrip() {
        let grid = Grid::from_layout(&["FOC", "#.W", "SPF"]).unwrap();
        assert_eq!(grid.to_string(), "FOC\n#.W\nSPF");
    }

    #[test]
    fn test_ids_are_unique() {
        let grid = Grid::from_layout(&["FOCP", "WSFO"]).unwrap();
        let mut ids: Vec<_> = grid.tiles().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_swap_cells_updates_coordinates() {
        let mut grid = Grid::from_layout(&["FO"]).unwrap();
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);
        let id_a = grid.tile(a).id;

        grid.swap_cells(a, b);
        assert_eq!(grid.tile(b).id, id_a);
        assert_eq!(grid.tile(b).pos(), b);
        assert_eq!(grid.tile(a).kind, TileKind::Ore);
    }

    #[test]
    fn test_radius_clipped_at_corner() {
        let grid = Grid::from_layout(&["FFFF", "FFFF", "FFFF", "FFFF"]).unwrap();
        assert_eq!(grid.tiles_in_radius(Position::new(0, 0), 1).len(), 4);
        assert_eq!(grid.tiles_in_radius(Position::new(1, 1), 1).len(), 9);
        assert_eq!(grid.tiles_in_radius(Position::new(3, 3), 2).len(), 9);
    }

    #[test]
    fn test_huge_radius_covers_whole_grid() {
        let grid = Grid::from_layout(&["FFF", "F#F", "FFF"]).unwrap();
        assert_eq!(grid.tiles_in_radius(Position::new(2, 2), usize::MAX).len(), 8);
        assert_eq!(grid.tiles_in_radius(Position::new(0, 0), usize::MAX).len(), 8);
    }

    #[test]
    fn test_unknown_layout_code() {
        let err = Grid::from_layout(&["FX"]).unwrap_err();
        assert!(matches!(err, LevelError::UnknownLayoutCode { ch: 'X', .. }));
    }
}
