//! Booster activation - which tiles a special tile destroys
//!
//! The activator only borrows the grid; it computes tile lists and never mutates. Effects
//! are clipped to the grid and skip inactive and empty cells.
//!
//! Combo table for two swapped boosters (order-independent, pivot = second tile):
//!
//! | Pair | Effect |
//! |------|--------|
//! | line + line | full row and full column through the pivot |
//! | area + area | radius-2 square around the pivot |
//! | row line + area | three rows centred on the pivot |
//! | column line + area | three columns centred on the pivot |
//! | color + color | every tile on the board |
//! | color + other | every tile of the other booster's base kind |
//!
//! A color clear swapped with a plain tile clears every tile of the plain tile's kind.
//! Any other single booster swapped with a plain tile fires on its own.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::tile::{Tile, TileId};
use crate::types::{BoosterKind, Position, COMBO_AREA_RADIUS, DEFAULT_AREA_RADIUS};

/// Result of resolving a removal wave through every booster it touches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoosterBlast {
    /// Full removal set, deduplicated by id
    pub tiles: Vec<Tile>,
    /// Booster tiles that fired, in firing order
    pub activated: Vec<Tile>,
}

#[derive(Debug, Clone, Copy)]
pub struct BoosterActivator<'a> {
    grid: &'a Grid,
    area_radius: usize,
}

impl<'a> BoosterActivator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            area_radius: DEFAULT_AREA_RADIUS,
        }
    }

    pub fn with_area_radius(mut self, radius: usize) -> Self {
        self.area_radius = radius;
        self
    }

    /// Tiles destroyed by the booster on `tile`; empty if it carries none
    pub fn activate_booster(&self, tile: &Tile) -> Vec<Tile> {
        let Some(booster) = tile.booster else {
            return Vec::new();
        };

        match booster {
            BoosterKind::LineRow => self.grid.tiles_in_row(tile.row),
            BoosterKind::LineCol => self.grid.tiles_in_column(tile.col),
            BoosterKind::Area => self.grid.tiles_in_radius(tile.pos(), self.area_radius),
            BoosterKind::ColorClear => self.grid.tiles_by_kind(tile.kind),
        }
    }

    /// Combined effect of two boosters swapped into each other
    ///
    /// If only one side carries a booster this falls back to that booster's own effect
    /// plus both tiles, except that a color clear takes the plain tile's kind. It is
    /// empty only when neither tile is a booster.
    pub fn activate_booster_combo(&self, first: &Tile, second: &Tile) -> Vec<Tile> {
        let pivot = second.pos();
        let mut out = match (first.booster, second.booster) {
            (Some(_), Some(_)) => {
                let mut pair: ArrayVec<&Tile, 2> = [first, second].into_iter().collect();
                pair.sort_by_key(|t| t.booster);
                self.combo_effect(pair[0], pair[1], pivot)
            }
            (Some(BoosterKind::ColorClear), None) => self.grid.tiles_by_kind(second.kind),
            (None, Some(BoosterKind::ColorClear)) => self.grid.tiles_by_kind(first.kind),
            (Some(_), None) | (None, Some(_)) => {
                let mut union = self.activate_booster(first);
                union.extend(self.activate_booster(second));
                union
            }
            (None, None) => return Vec::new(),
        };

        out.push(*first);
        out.push(*second);
        dedup_by_id(out)
    }

    /// `lo.booster <= hi.booster` in enum order
    fn combo_effect(&self, lo: &Tile, hi: &Tile, pivot: Position) -> Vec<Tile> {
        use BoosterKind::*;

        match (lo.booster, hi.booster) {
            (Some(ColorClear), Some(ColorClear)) => self.grid.tiles().copied().collect(),
            // ColorClear sorts last, so `lo` is the partner whose colour gets adopted.
            (Some(_), Some(ColorClear)) => self.grid.tiles_by_kind(lo.kind),
            (Some(LineRow | LineCol), Some(LineRow | LineCol)) => {
                let mut tiles = self.grid.tiles_in_row(pivot.row);
                tiles.extend(self.grid.tiles_in_column(pivot.col));
                tiles
            }
            (Some(Area), Some(Area)) => self.grid.tiles_in_radius(pivot, COMBO_AREA_RADIUS),
            (Some(LineRow), Some(Area)) => self.band(pivot.row, self.grid.rows(), |r| {
                self.grid.tiles_in_row(r)
            }),
            (Some(LineCol), Some(Area)) => self.band(pivot.col, self.grid.cols(), |c| {
                self.grid.tiles_in_column(c)
            }),
            _ => {
                let mut union = self.activate_booster(lo);
                union.extend(self.activate_booster(hi));
                union
            }
        }
    }

    /// Three parallel lines centred on `center`, clipped to `limit`
    fn band(&self, center: usize, limit: usize, line: impl Fn(usize) -> Vec<Tile>) -> Vec<Tile> {
        let lo = center.saturating_sub(1);
        let hi = (center + 1).min(limit - 1);
        (lo..=hi).flat_map(line).collect()
    }

    /// Grow a removal wave through every booster it reaches
    ///
    /// `fired` lists boosters already consumed this step (e.g. a swapped combo pair);
    /// `keep` lists tiles that must stay on the board (new booster pivots).
    pub fn chain_activation(&self, wave: &[Tile], fired: &[TileId], keep: &[TileId]) -> BoosterBlast {
        let mut tiles: Vec<Tile> = Vec::new();
        let mut activated: Vec<Tile> = Vec::new();
        let mut fired: Vec<TileId> = fired.to_vec();

        let mut cursor = 0;
        tiles.extend(wave.iter().filter(|t| !keep.contains(&t.id)).copied());
        tiles = dedup_by_id(tiles);

        while cursor < tiles.len() {
            let tile = tiles[cursor];
            cursor += 1;

            // A shielded booster only loses a layer this step.
            if tile.booster.is_none() || tile.is_protected() || fired.contains(&tile.id) {
                continue;
            }
            fired.push(tile.id);
            activated.push(tile);

            for hit in self.activate_booster(&tile) {
                if keep.contains(&hit.id) || tiles.iter().any(|t| t.id == hit.id) {
                    continue;
                }
                tiles.push(hit);
            }
        }

        BoosterBlast { tiles, activated }
    }
}

/// Keep the first occurrence of each tile id
pub fn dedup_by_id(tiles: Vec<Tile>) -> Vec<Tile> {
    let mut out: Vec<Tile> = Vec::with_capacity(tiles.len());
    for tile in tiles {
        if !out.iter().any(|t| t.id == tile.id) {
            out.push(tile);
        }
    }
    out
}
