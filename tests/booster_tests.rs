//! Booster activation scenarios on full 8x8 boards

use tile_cascade::core::{BoosterActivator, Grid, Match3Engine, SpawnWeights, Tile};
use tile_cascade::types::{BoosterKind, Position, TileKind};

fn board(seed: u32) -> Match3Engine {
    let mut e = Match3Engine::new(seed);
    e.generate(8, 8, &SpawnWeights::first_kinds(5));
    e
}

fn arm(grid: &mut Grid, pos: Position, booster: BoosterKind) -> Tile {
    let tile = grid.get_mut(pos).unwrap();
    tile.booster = Some(booster);
    *tile
}

#[test]
fn test_line_row_hits_whole_row() {
    let mut e = board(1);
    let tile = arm(e.grid_mut(), Position::new(3, 3), BoosterKind::LineRow);
    let hit = BoosterActivator::new(e.grid()).activate_booster(&tile);
    assert_eq!(hit.len(), 8);
    assert!(hit.iter().all(|t| t.row == 3));
}

#[test]
fn test_area_clipped_at_corner() {
    let mut e = board(2);
    let tile = arm(e.grid_mut(), Position::new(0, 0), BoosterKind::Area);
    let hit = BoosterActivator::new(e.grid()).activate_booster(&tile);
    assert_eq!(hit.len(), 4);
    assert!(hit.iter().all(|t| t.row < 8 && t.col < 8));
    assert!(hit.iter().all(|t| t.row <= 1 && t.col <= 1));
}

#[test]
fn test_color_clear_hits_every_tile_of_its_kind() {
    let mut e = board(3);
    let pos = e
        .grid()
        .tiles()
        .find(|t| t.kind == TileKind::Fuel)
        .map(|t| t.pos())
        .unwrap();
    let n = e.grid().tiles_by_kind(TileKind::Fuel).len();

    let tile = arm(e.grid_mut(), pos, BoosterKind::ColorClear);
    let hit = BoosterActivator::new(e.grid()).activate_booster(&tile);
    assert_eq!(hit.len(), n);
    assert!(hit.iter().all(|t| t.kind == TileKind::Fuel));
}

#[test]
fn test_line_skips_holes() {
    let mut grid = Grid::from_layout(&["FOC", "O#F", "CFO"]).unwrap();
    let tile = arm(&mut grid, Position::new(0, 1), BoosterKind::LineCol);
    let hit = BoosterActivator::new(&grid).activate_booster(&tile);
    assert_eq!(hit.len(), 2);
    assert!(hit.iter().all(|t| t.pos() != Position::new(1, 1)));
}

#[test]
fn test_color_combo_lookup_is_order_independent() {
    let mut e = board(4);
    let cc = arm(e.grid_mut(), Position::new(2, 2), BoosterKind::ColorClear);
    let area = arm(e.grid_mut(), Position::new(2, 3), BoosterKind::Area);
    let act = BoosterActivator::new(e.grid());

    let mut ab: Vec<_> = act.activate_booster_combo(&cc, &area).iter().map(|t| t.id).collect();
    let mut ba: Vec<_> = act.activate_booster_combo(&area, &cc).iter().map(|t| t.id).collect();
    ab.sort();
    ba.sort();
    assert_eq!(ab, ba);

    // Partner's kind, plus the color-clear tile itself
    let partner = e.grid().tiles_by_kind(area.kind).len();
    let extra = usize::from(cc.kind != area.kind);
    assert_eq!(ab.len(), partner + extra);
}

#[test]
fn test_area_pair_is_radius_two() {
    let mut e = board(5);
    let a = arm(e.grid_mut(), Position::new(4, 3), BoosterKind::Area);
    let b = arm(e.grid_mut(), Position::new(4, 4), BoosterKind::Area);
    let hit = BoosterActivator::new(e.grid()).activate_booster_combo(&a, &b);
    assert_eq!(hit.len(), 25);
    assert!(hit.iter().all(|t| t.row.abs_diff(4) <= 2 && t.col.abs_diff(4) <= 2));
}

#[test]
fn test_combo_includes_both_boosters() {
    let mut e = board(6);
    let a = arm(e.grid_mut(), Position::new(0, 0), BoosterKind::LineCol);
    let b = arm(e.grid_mut(), Position::new(0, 1), BoosterKind::LineRow);
    let hit = BoosterActivator::new(e.grid()).activate_booster_combo(&a, &b);
    assert!(hit.iter().any(|t| t.id == a.id));
    assert!(hit.iter().any(|t| t.id == b.id));
    // Row 0 and column 1 through the pivot
    assert_eq!(hit.len(), 15);
}

#[test]
fn test_double_color_clear_takes_board() {
    let mut e = board(7);
    let a = arm(e.grid_mut(), Position::new(7, 6), BoosterKind::ColorClear);
    let b = arm(e.grid_mut(), Position::new(7, 7), BoosterKind::ColorClear);
    let hit = BoosterActivator::new(e.grid()).activate_booster_combo(&a, &b);
    assert_eq!(hit.len(), 64);
}
