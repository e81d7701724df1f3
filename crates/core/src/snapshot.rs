use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::tile::{ObstacleState, TileId};
use crate::types::{BoosterKind, Position, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cell", rename_all = "snake_case")]
pub enum CellSnapshot {
    Hole,
    Empty,
    Tile {
        id: TileId,
        kind: TileKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        booster: Option<BoosterKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        obstacle: Option<ObstacleState>,
    },
}

impl CellSnapshot {
    /// Stable byte encoding fed to the board hash; tile ids are left out so that two
    /// boards with the same layout hash equal
    fn hash_bytes(&self) -> [u8; 4] {
        match *self {
            CellSnapshot::Hole => [0xff, 0, 0, 0],
            CellSnapshot::Empty => [0, 0, 0, 0],
            CellSnapshot::Tile {
                kind,
                booster,
                obstacle,
                ..
            } => [
                kind.index() as u8 + 1,
                booster.map_or(0, |b| b as u8 + 1),
                obstacle.map_or(0, |o| o.kind as u8 + 1),
                obstacle.map_or(0, |o| o.layers.min(u8::MAX as u32) as u8),
            ],
        }
    }
}

/// Plain-data copy of a grid for renderers, logs and regression checks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major
    pub cells: Vec<CellSnapshot>,
    pub board_hash: u64,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid) -> Self {
        let mut s = Self::default();
        s.capture_into(grid);
        s
    }

    /// Refresh in place, reusing the cell buffer
    pub fn capture_into(&mut self, grid: &Grid) {
        self.rows = grid.rows();
        self.cols = grid.cols();
        self.cells.clear();
        self.cells.extend(grid.positions().map(|pos| {
            if !grid.is_active(pos) {
                return CellSnapshot::Hole;
            }
            match grid.get(pos) {
                Some(t) => CellSnapshot::Tile {
                    id: t.id,
                    kind: t.kind,
                    booster: t.booster,
                    obstacle: t.obstacle,
                },
                None => CellSnapshot::Empty,
            }
        }));
        self.board_hash = self.compute_hash();
    }

    pub fn cell(&self, pos: Position) -> CellSnapshot {
        self.cells[pos.row * self.cols + pos.col]
    }

    pub fn tile_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, CellSnapshot::Tile { .. }))
            .count()
    }

    /// FNV-1a 64 over the dimensions and the per-cell encoding
    pub fn compute_hash(&self) -> u64 {
        let dims = [self.rows as u8, self.cols as u8];
        fnv1a64(
            dims.into_iter()
                .chain(self.cells.iter().flat_map(|c| c.hash_bytes())),
        )
    }
}

pub fn fnv1a64(bytes: impl Iterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_cells() {
        let grid = Grid::from_layout(&["F#", ".O"]).unwrap();
        let snap = GridSnapshot::capture(&grid);
        assert_eq!(snap.cells.len(), 4);
        assert_eq!(snap.cell(Position::new(0, 1)), CellSnapshot::Hole);
        assert_eq!(snap.cell(Position::new(1, 0)), CellSnapshot::Empty);
        assert_eq!(snap.tile_count(), 2);
        assert_eq!(snap.board_hash, snap.compute_hash());
    }

    #[test]
    fn test_hash_ignores_ids_but_not_layout() {
        let mut a = Grid::from_layout(&["FO"]).unwrap();
        let b = Grid::from_layout(&["FO"]).unwrap();
        a.spawn_tile(Position::new(0, 0), TileKind::Fuel);
        assert_eq!(
            GridSnapshot::capture(&a).board_hash,
            GridSnapshot::capture(&b).board_hash
        );

        let c = Grid::from_layout(&["OF"]).unwrap();
        assert_ne!(
            GridSnapshot::capture(&b).board_hash,
            GridSnapshot::capture(&c).board_hash
        );
    }

    #[test]
    fn test_snapshot_json_shape() {
        let grid = Grid::from_layout(&["#F"]).unwrap();
        let json = serde_json::to_value(GridSnapshot::capture(&grid)).unwrap();
        assert_eq!(json["cells"][0]["cell"], "hole");
        assert_eq!(json["cells"][1]["kind"], "fuel");
    }
}
