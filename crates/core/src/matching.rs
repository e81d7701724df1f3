//! Match detection and booster-reward selection
//!
//! A match is a maximal run of at least [`MIN_MATCH_LEN`] identical, matchable tiles along
//! one axis. Runs stop at empty cells, inactive cells and Blocked tiles. Row and column runs
//! are reported independently, so a cross-shaped group yields one of each.
//!
//! Booster rewards are decided per group of matches sharing a tile, first rule wins:
//!
//! | Group shape | Reward |
//! |-------------|--------|
//! | any run of 5+ | `ColorClear` |
//! | row run crossing a column run | `Area` at the shared tile |
//! | run of exactly 4 along a row | `LineCol` |
//! | run of exactly 4 along a column | `LineRow` |
//! | anything else | none |

use serde::Serialize;

use crate::grid::Grid;
use crate::tile::{Tile, TileId};
use crate::types::{
    BoosterKind, Direction, Position, TileKind, COLOR_CLEAR_RUN, LINE_BOOSTER_RUN, MIN_MATCH_LEN,
};

/// A maximal run of identical tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Tiles in run order (left to right, or top to bottom)
    pub tiles: Vec<Tile>,
    pub kind: TileKind,
    pub direction: Direction,
}

impl Match {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.iter().any(|t| t.id == id)
    }
}

/// A booster to be created at a match pivot instead of removing the pivot tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoosterSpawn {
    pub row: usize,
    pub col: usize,
    pub booster: BoosterKind,
    /// Base kind the new booster tile keeps
    pub base_kind: TileKind,
}

impl BoosterSpawn {
    pub fn pos(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Matches plus what the cascade should do with them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResolution {
    pub matches: Vec<Match>,
    /// Matched tiles minus booster pivots, deduplicated by id
    pub tiles_to_remove: Vec<Tile>,
    pub boosters_to_spawn: Vec<BoosterSpawn>,
}

impl MatchResolution {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Find every row and column run of at least three matchable tiles
pub fn find_matches(grid: &Grid) -> Vec<Match> {
    let mut matches = Vec::new();

    for row in 0..grid.rows() {
        let line = (0..grid.cols()).map(|col| Position::new(row, col));
        scan_line(grid, line, Direction::Row, &mut matches);
    }
    for col in 0..grid.cols() {
        let line = (0..grid.rows()).map(|row| Position::new(row, col));
        scan_line(grid, line, Direction::Col, &mut matches);
    }

    matches
}

fn scan_line(
    grid: &Grid,
    line: impl Iterator<Item = Position>,
    direction: Direction,
    out: &mut Vec<Match>,
) {
    let mut run: Vec<Tile> = Vec::new();

    for pos in line {
        let tile = grid.get(pos).filter(|t| t.is_matchable()).copied();
        match tile {
            Some(tile) if run.last().is_some_and(|last| last.kind == tile.kind) => run.push(tile),
            Some(tile) => {
                flush_run(&mut run, direction, out);
                run.push(tile);
            }
            // Empty, inactive and blocked cells all terminate the run.
            None => flush_run(&mut run, direction, out),
        }
    }
    flush_run(&mut run, direction, out);
}

fn flush_run(run: &mut Vec<Tile>, direction: Direction, out: &mut Vec<Match>) {
    if run.len() >= MIN_MATCH_LEN {
        out.push(Match {
            kind: run[0].kind,
            tiles: std::mem::take(run),
            direction,
        });
    } else {
        run.clear();
    }
}

/// Find matches and decide which pivots become boosters
///
/// `swapped` lists the positions the player just swapped; a run passing through one of
/// them uses it as the pivot. Pass an empty slice for cascade steps after the first.
pub fn find_matches_with_boosters(grid: &Grid, swapped: &[Position]) -> MatchResolution {
    let matches = find_matches(grid);
    if matches.is_empty() {
        return MatchResolution::default();
    }

    let mut boosters_to_spawn = Vec::new();
    let mut pivots: Vec<TileId> = Vec::new();
    for group in group_matches(&matches) {
        if let Some((pivot, booster)) = choose_reward(&matches, &group, swapped) {
            pivots.push(pivot.id);
            boosters_to_spawn.push(BoosterSpawn {
                row: pivot.row,
                col: pivot.col,
                booster,
                base_kind: pivot.kind,
            });
        }
    }

    let mut tiles_to_remove: Vec<Tile> = Vec::new();
    for tile in matches.iter().flat_map(|m| m.tiles.iter()) {
        if pivots.contains(&tile.id) || tiles_to_remove.iter().any(|t| t.id == tile.id) {
            continue;
        }
        tiles_to_remove.push(*tile);
    }

    MatchResolution {
        matches,
        tiles_to_remove,
        boosters_to_spawn,
    }
}

/// Partition match indices into groups of runs that share at least one tile
fn group_matches(matches: &[Match]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..matches.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for a in 0..matches.len() {
        for b in (a + 1)..matches.len() {
            let shares = matches[a].tiles.iter().any(|t| matches[b].contains(t.id));
            if shares {
                let ra = root(&mut parent, a);
                let rb = root(&mut parent, b);
                if ra != rb {
                    parent[rb.max(ra)] = rb.min(ra);
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root: Vec<Option<usize>> = vec![None; matches.len()];
    for i in 0..matches.len() {
        let r = root(&mut parent, i);
        match group_of_root[r] {
            Some(g) => groups[g].push(i),
            None => {
                group_of_root[r] = Some(groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}

fn can_become_booster(tile: &Tile) -> bool {
    tile.booster.is_none() && !tile.is_protected()
}

fn choose_reward(
    matches: &[Match],
    group: &[usize],
    swapped: &[Position],
) -> Option<(Tile, BoosterKind)> {
    // First longest run wins ties.
    let longest = group
        .iter()
        .map(|&i| &matches[i])
        .fold(None::<&Match>, |best, m| match best {
            Some(b) if b.len() >= m.len() => Some(b),
            _ => Some(m),
        })?;

    if longest.len() >= COLOR_CLEAR_RUN {
        return run_pivot(longest, swapped).map(|t| (t, BoosterKind::ColorClear));
    }

    let has_row = group.iter().any(|&i| matches[i].direction == Direction::Row);
    let has_col = group.iter().any(|&i| matches[i].direction == Direction::Col);
    if has_row && has_col {
        return intersection_pivot(matches, group, swapped).map(|t| (t, BoosterKind::Area));
    }

    if longest.len() == LINE_BOOSTER_RUN {
        let booster = match longest.direction {
            Direction::Row => BoosterKind::LineCol,
            Direction::Col => BoosterKind::LineRow,
        };
        return run_pivot(longest, swapped).map(|t| (t, booster));
    }

    None
}

/// Swapped position first, then the middle tile, then the rest of the run in order
fn run_pivot(run: &Match, swapped: &[Position]) -> Option<Tile> {
    let at_swap = swapped
        .iter()
        .filter_map(|p| run.tiles.iter().find(|t| t.pos() == *p));
    let middle = run.tiles.get((run.len() - 1) / 2);

    at_swap
        .chain(middle)
        .chain(run.tiles.iter())
        .find(|t| can_become_booster(t))
        .copied()
}

fn intersection_pivot(matches: &[Match], group: &[usize], swapped: &[Position]) -> Option<Tile> {
    let mut shared: Vec<Tile> = Vec::new();
    for &a in group.iter().filter(|&&i| matches[i].direction == Direction::Row) {
        for &b in group.iter().filter(|&&i| matches[i].direction == Direction::Col) {
            for tile in matches[a].tiles.iter().filter(|t| matches[b].contains(t.id)) {
                if !shared.iter().any(|s| s.id == tile.id) {
                    shared.push(*tile);
                }
            }
        }
    }

    let at_swap = shared.iter().filter(|t| swapped.contains(&t.pos()));
    at_swap
        .chain(shared.iter())
        .find(|t| can_become_booster(t))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(layout: &[&str]) -> Grid {
        Grid::from_layout(layout).unwrap()
    }

    #[test]
    fn test_no_match_on_pairs() {
        let g = grid(&["FFO", "OOF", "FCC"]);
        assert!(find_matches(&g).is_empty());
    }

    #[test]
    fn test_row_and_col_reported_separately() {
        let g = grid(&["FFF", "OFO", "CFC"]);
        let matches = find_matches(&g);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].direction, Direction::Row);
        assert_eq!(matches[1].direction, Direction::Col);
        assert_eq!(matches[1].len(), 3);
    }

    #[test]
    fn test_inactive_cell_splits_run() {
        let g = grid(&["FFF#FF"]);
        let matches = find_matches(&g);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 3);

        let g = grid(&["FF#FFF"]);
        let matches = find_matches(&g);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].tiles[0].col, 3);
    }

    #[test]
    fn test_empty_cell_terminates_run() {
        let g = grid(&["FF.FF"]);
        assert!(find_matches(&g).is_empty());
    }

    #[test]
    fn test_four_in_row_creates_col_line_at_middle() {
        let g = grid(&["FFFF", "OCOC"]);
        let res = find_matches_with_boosters(&g, &[]);
        assert_eq!(res.boosters_to_spawn.len(), 1);
        let spawn = res.boosters_to_spawn[0];
        assert_eq!(spawn.booster, BoosterKind::LineCol);
        assert_eq!(spawn.pos(), Position::new(0, 1));
        assert_eq!(spawn.base_kind, TileKind::Fuel);
        assert_eq!(res.tiles_to_remove.len(), 3);
        assert!(res.tiles_to_remove.iter().all(|t| t.pos() != spawn.pos()));
    }

    #[test]
    fn test_four_in_col_creates_row_line_at_swap() {
        let g = grid(&["FO", "FC", "FO", "FC"]);
        let res = find_matches_with_boosters(&g, &[Position::new(3, 0)]);
        let spawn = res.boosters_to_spawn[0];
        assert_eq!(spawn.booster, BoosterKind::LineRow);
        assert_eq!(spawn.pos(), Position::new(3, 0));
    }

    #[test]
    fn test_five_creates_color_clear() {
        let g = grid(&["CCCCC"]);
        let res = find_matches_with_boosters(&g, &[]);
        assert_eq!(res.boosters_to_spawn[0].booster, BoosterKind::ColorClear);
        assert_eq!(res.boosters_to_spawn[0].pos(), Position::new(0, 2));
        assert_eq!(res.tiles_to_remove.len(), 4);
    }

    #[test]
    fn test_l_shape_creates_area_at_corner() {
        let g = grid(&["POO", "POC", "PPP"]);
        let res = find_matches_with_boosters(&g, &[]);
        assert_eq!(res.matches.len(), 2);
        assert_eq!(res.boosters_to_spawn.len(), 1);
        let spawn = res.boosters_to_spawn[0];
        assert_eq!(spawn.booster, BoosterKind::Area);
        assert_eq!(spawn.pos(), Position::new(2, 0));
        // 5 distinct tiles, one kept as the pivot.
        assert_eq!(res.tiles_to_remove.len(), 4);
    }

    #[test]
    fn test_three_creates_nothing() {
        let g = grid(&["WWW"]);
        let res = find_matches_with_boosters(&g, &[]);
        assert!(res.boosters_to_spawn.is_empty());
        assert_eq!(res.tiles_to_remove.len(), 3);
    }

    #[test]
    fn test_existing_booster_not_reused_as_pivot() {
        let mut g = grid(&["FFFF"]);
        g.get_mut(Position::new(0, 1)).unwrap().booster = Some(BoosterKind::Area);
        let res = find_matches_with_boosters(&g, &[]);
        assert_eq!(res.boosters_to_spawn[0].pos(), Position::new(0, 0));
    }
}
