//! Match detection and booster-reward tests

use tile_cascade::core::{find_matches, find_matches_with_boosters, Grid, ObstacleState};
use tile_cascade::types::{BoosterKind, Direction, ObstacleKind, Position, TileKind};

fn grid(layout: &[&str]) -> Grid {
    Grid::from_layout(layout).unwrap()
}

#[test]
fn test_no_matches_on_checkerboard() {
    let g = grid(&["FOFO", "OFOF", "FOFO"]);
    assert!(find_matches(&g).is_empty());
}

#[test]
fn test_row_and_column_reported_separately() {
    let g = grid(&[
        "OFO", //
        "FFF", //
        "OFO", //
    ]);
    let matches = find_matches(&g);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].direction, Direction::Row);
    assert_eq!(matches[1].direction, Direction::Col);
    assert!(matches.iter().all(|m| m.kind == TileKind::Fuel && m.len() == 3));
}

#[test]
fn test_hole_splits_run() {
    let g = grid(&["FFF#FF"]);
    let matches = find_matches(&g);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].tiles.last().unwrap().col, 2);

    assert!(find_matches(&grid(&["FF#FFF#F"])).len() == 1);
    assert!(find_matches(&grid(&["FF.F"])).is_empty());
}

#[test]
fn test_blocked_tile_splits_run() {
    let blocked = Some(ObstacleState::new(ObstacleKind::Blocked, 0));

    let mut g = grid(&["FFFFF"]);
    g.get_mut(Position::new(0, 2)).unwrap().obstacle = blocked;
    assert!(find_matches(&g).is_empty());

    let mut g = grid(&["FFFFFFF"]);
    g.get_mut(Position::new(0, 3)).unwrap().obstacle = blocked;
    let matches = find_matches(&g);
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.len() == 3));
    assert!(matches.iter().flat_map(|m| &m.tiles).all(|t| t.col != 3));
}

#[test]
fn test_maximal_run_reported_once() {
    let g = grid(&["OFFFFFO"]);
    let matches = find_matches(&g);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].len(), 5);
}

#[test]
fn test_four_in_row_gives_column_line() {
    let g = grid(&["OFFFFO"]);
    let res = find_matches_with_boosters(&g, &[]);
    assert_eq!(res.boosters_to_spawn.len(), 1);
    let spawn = res.boosters_to_spawn[0];
    assert_eq!(spawn.booster, BoosterKind::LineCol);
    assert_eq!(spawn.base_kind, TileKind::Fuel);
    // Middle of a 4-run is index 1
    assert_eq!(spawn.pos(), Position::new(0, 2));
    assert_eq!(res.tiles_to_remove.len(), 3);
}

#[test]
fn test_swap_position_is_preferred_pivot() {
    let g = grid(&["OFFFFO"]);
    let res = find_matches_with_boosters(&g, &[Position::new(0, 4), Position::new(1, 4)]);
    assert_eq!(res.boosters_to_spawn[0].pos(), Position::new(0, 4));
}

#[test]
fn test_l_shape_gives_area_at_corner() {
    let g = grid(&[
        "FOO", //
        "FCP", //
        "FFF", //
    ]);
    let res = find_matches_with_boosters(&g, &[]);
    assert_eq!(res.matches.len(), 2);
    assert_eq!(res.boosters_to_spawn.len(), 1);
    assert_eq!(res.boosters_to_spawn[0].booster, BoosterKind::Area);
    assert_eq!(res.boosters_to_spawn[0].pos(), Position::new(2, 0));
    // Five distinct tiles minus the pivot
    assert_eq!(res.tiles_to_remove.len(), 4);
}

#[test]
fn test_five_run_beats_intersection() {
    let g = grid(&[
        "OOFOO", //
        "OCFCO", //
        "FFFFF", //
    ]);
    let res = find_matches_with_boosters(&g, &[]);
    assert_eq!(res.boosters_to_spawn.len(), 1);
    assert_eq!(res.boosters_to_spawn[0].booster, BoosterKind::ColorClear);
}

#[test]
fn test_plain_three_has_no_reward() {
    let res = find_matches_with_boosters(&grid(&["CCCO"]), &[]);
    assert!(res.boosters_to_spawn.is_empty());
    assert_eq!(res.tiles_to_remove.len(), 3);
}
