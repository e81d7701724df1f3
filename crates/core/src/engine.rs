//! Grid engine - generation, matching, removal, gravity, refill and the cascade loop
//!
//! The engine owns the grid of one level attempt together with its seeded RNG, so a seed
//! plus a sequence of calls always reproduces the same boards. Every operation is
//! synchronous and bounded: generation and reshuffling give up after a fixed number of
//! attempts and accept their last result, and a cascade stops after
//! [`EngineRules::max_cascade_depth`] steps.
//!
//! The cascade order is fixed: find matches (with booster rewards) → fire boosters in the
//! removal set → damage obstacles → remove unprotected tiles → place new boosters →
//! gravity → refill. Drivers that step through this manually must keep the same order.

use arrayvec::ArrayVec;
use log::{debug, warn};
use serde::Serialize;

use crate::booster::{dedup_by_id, BoosterActivator};
use crate::grid::Grid;
use crate::level::{EngineRules, LevelConfig, LevelError};
use crate::matching::{self, BoosterSpawn, Match, MatchResolution};
use crate::rng::{SimpleRng, SpawnWeights};
use crate::snapshot::GridSnapshot;
use crate::tile::{ObstacleState, Tile, TileId};
use crate::types::{Position, TileKind, MIN_MATCH_LEN};

/// A tile changing cell, for the presentation layer to animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Movement {
    pub tile_id: TileId,
    pub from: Position,
    pub to: Position,
}

/// A freshly drawn tile filling an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpawnData {
    pub row: usize,
    pub col: usize,
    pub tile_id: TileId,
    pub kind: TileKind,
}

/// An obstacle whose last layer broke this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DestroyedObstacle {
    pub row: usize,
    pub col: usize,
    pub obstacle: ObstacleState,
}

/// Outcome of applying one wave of match damage to obstacles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleDamage {
    pub destroyed: Vec<DestroyedObstacle>,
    /// Tiles that were unprotected when the wave hit and may be removed this step
    pub removable: Vec<Tile>,
}

/// Everything that happened in one cascade step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeStep {
    pub matches: Vec<Match>,
    pub removed: Vec<Tile>,
    pub destroyed_obstacles: Vec<DestroyedObstacle>,
    pub boosters_created: Vec<Tile>,
    pub boosters_activated: Vec<Tile>,
    pub movements: Vec<Movement>,
    pub spawns: Vec<SpawnData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    pub steps: Vec<CascadeStep>,
    pub depth: u32,
    /// The cap stopped the cascade while matches were still on the board
    pub hit_cap: bool,
}

impl CascadeOutcome {
    pub fn all_matches(&self) -> Vec<Match> {
        self.steps.iter().flat_map(|s| s.matches.clone()).collect()
    }

    pub fn all_movements(&self) -> Vec<Movement> {
        self.steps.iter().flat_map(|s| s.movements.iter().copied()).collect()
    }

    pub fn all_spawns(&self) -> Vec<SpawnData> {
        self.steps.iter().flat_map(|s| s.spawns.iter().copied()).collect()
    }

    pub fn removed_count(&self) -> usize {
        self.steps.iter().map(|s| s.removed.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Match3Engine {
    grid: Option<Grid>,
    rng: SimpleRng,
    rules: EngineRules,
    spawn_weights: SpawnWeights,
    /// Cells of the last player swap, used to place booster rewards
    last_swap: ArrayVec<Position, 2>,
}

impl Match3Engine {
    /// Create an engine with no board; call [`generate`](Self::generate) before anything else
    pub fn new(seed: u32) -> Self {
        Self {
            grid: None,
            rng: SimpleRng::new(seed),
            rules: EngineRules::default(),
            spawn_weights: SpawnWeights::uniform(),
            last_swap: ArrayVec::new(),
        }
    }

    pub fn with_rules(mut self, rules: EngineRules) -> Self {
        self.rules = rules;
        self
    }

    /// Wrap an existing grid (e.g. parsed from a text layout); refills draw from `weights`
    pub fn from_grid(grid: Grid, weights: SpawnWeights, seed: u32) -> Self {
        let mut engine = Self::new(seed);
        engine.grid = Some(grid);
        engine.spawn_weights = weights;
        engine
    }

    /// Build the starting board of a level
    ///
    /// Holes and Blocked cells become inactive, pre-placed tiles go in first, the rest is
    /// filled with match-avoiding draws, then obstacles are attached.
    pub fn from_level(config: &LevelConfig, seed: u32) -> Result<Self, LevelError> {
        config.validate()?;

        let mut engine = Self::new(seed).with_rules(config.rules);
        engine.spawn_weights = config.spawn_weights;

        let mut grid = Grid::new(config.rows, config.cols);
        for pos in config.inactive_cells() {
            grid.set_active(pos, false);
        }
        for placement in &config.tiles {
            let pos = Position::new(placement.row, placement.col);
            let tile = grid.spawn_tile(pos, placement.kind);
            if let Some(booster) = placement.booster {
                grid.place(pos, tile.with_booster(booster));
            }
        }
        engine.grid = Some(grid);
        engine.fill_avoiding_matches(&config.spawn_weights);

        let grid = engine.grid_mut();
        for o in config.obstacles.iter().filter(|o| o.kind.is_destructible()) {
            if let Some(tile) = grid.get_mut(Position::new(o.row, o.col)) {
                tile.obstacle = Some(ObstacleState::new(o.kind, o.layers));
            }
        }

        debug!(
            "level {:?} ready: {}x{}, {} tiles",
            config.id,
            config.rows,
            config.cols,
            engine.grid().tiles().count()
        );
        Ok(engine)
    }

    /// # Panics
    ///
    /// Panics if no board has been generated yet.
    pub fn grid(&self) -> &Grid {
        match self.grid.as_ref() {
            Some(grid) => grid,
            None => panic!("grid has not been generated"),
        }
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        match self.grid.as_mut() {
            Some(grid) => grid,
            None => panic!("grid has not been generated"),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.grid.is_some()
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    pub fn spawn_weights(&self) -> &SpawnWeights {
        &self.spawn_weights
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(self.grid())
    }

    pub fn activator(&self) -> BoosterActivator<'_> {
        BoosterActivator::new(self.grid()).with_area_radius(self.rules.area_radius)
    }

    /// Replace the board with a fresh, fully active `rows x cols` grid with no matches
    ///
    /// Each cell is drawn in row-major order and redrawn while it would complete a run;
    /// after the attempt budget the last draw is kept.
    pub fn generate(&mut self, rows: usize, cols: usize, weights: &SpawnWeights) {
        self.grid = Some(Grid::new(rows, cols));
        self.spawn_weights = *weights;
        self.last_swap.clear();
        self.fill_avoiding_matches(weights);
    }

    /// Fill every empty active cell; returns how many cells exhausted their attempts
    fn fill_avoiding_matches(&mut self, weights: &SpawnWeights) -> usize {
        let attempts = self.rules.generation_attempts.max(1);
        let mut fallbacks = 0;

        for pos in self.grid().empty_positions() {
            let mut kind = weights.pick(&mut self.rng);
            let mut tries = 1;
            while self.would_complete_run(pos, kind) && tries < attempts {
                kind = weights.pick(&mut self.rng);
                tries += 1;
            }
            if self.would_complete_run(pos, kind) {
                fallbacks += 1;
            }
            self.grid_mut().spawn_tile(pos, kind);
        }

        if fallbacks > 0 {
            warn!(
                "generation accepted {} cell(s) completing a run after {} attempts",
                fallbacks, attempts
            );
        }
        fallbacks
    }

    /// Would `kind` at `pos` complete a run with the tiles already placed around it?
    fn would_complete_run(&self, pos: Position, kind: TileKind) -> bool {
        let grid = self.grid();
        let same = |row: usize, col: usize| {
            grid.get(Position::new(row, col))
                .is_some_and(|t| t.kind == kind && t.is_matchable())
        };

        let left = (0..pos.col).rev().take_while(|&c| same(pos.row, c)).count();
        let right = (pos.col + 1..grid.cols())
            .take_while(|&c| same(pos.row, c))
            .count();
        if left + right + 1 >= MIN_MATCH_LEN {
            return true;
        }

        let up = (0..pos.row).rev().take_while(|&r| same(r, pos.col)).count();
        let down = (pos.row + 1..grid.rows())
            .take_while(|&r| same(r, pos.col))
            .count();
        up + down + 1 >= MIN_MATCH_LEN
    }

    pub fn find_matches(&self) -> Vec<Match> {
        matching::find_matches(self.grid())
    }

    /// Matches plus booster rewards, pivoting on the last swapped cells if any
    pub fn find_matches_with_boosters(&self) -> MatchResolution {
        matching::find_matches_with_boosters(self.grid(), &self.last_swap)
    }

    /// Wear down obstacles on the given tiles
    ///
    /// Each protected tile loses exactly one layer per call and is not removable this
    /// step, even if that was its last layer. Broken obstacles are cleared from the tile.
    pub fn damage_obstacles(&mut self, tiles: &[Tile]) -> ObstacleDamage {
        let mut damage = ObstacleDamage::default();
        let grid = self.grid_mut();

        for hit in dedup_by_id(tiles.to_vec()) {
            let Some(tile) = grid.get_mut(hit.pos()).filter(|t| t.id == hit.id) else {
                continue;
            };

            match tile.obstacle {
                Some(o) if !o.kind.is_destructible() => {}
                Some(mut o) if o.layers > 0 => {
                    o.layers -= 1;
                    if o.layers == 0 {
                        tile.obstacle = None;
                        damage.destroyed.push(DestroyedObstacle {
                            row: tile.row,
                            col: tile.col,
                            obstacle: o,
                        });
                    } else {
                        tile.obstacle = Some(o);
                    }
                }
                _ => damage.removable.push(*tile),
            }
        }
        damage
    }

    /// Empty the cells of every listed tile that is still on the board and unprotected
    pub fn remove_matches(&mut self, tiles: &[Tile]) -> Vec<Tile> {
        let grid = self.grid_mut();
        let mut removed = Vec::with_capacity(tiles.len());

        for hit in tiles {
            let pos = hit.pos();
            let removable = grid
                .get(pos)
                .is_some_and(|t| t.id == hit.id && !t.is_protected());
            if removable {
                if let Some(tile) = grid.take(pos) {
                    removed.push(tile);
                }
            }
        }
        removed
    }

    /// Turn pivot cells into booster tiles carrying their base kind and a fresh id
    pub fn spawn_boosters(&mut self, spawns: &[BoosterSpawn]) -> Vec<Tile> {
        let grid = self.grid_mut();
        let mut created = Vec::with_capacity(spawns.len());

        for spawn in spawns {
            let pos = spawn.pos();
            let id = grid.allocate_id();
            let tile = Tile::new(id, pos, spawn.base_kind).with_booster(spawn.booster);
            grid.place(pos, tile);
            created.push(tile);
        }
        created
    }

    /// Let tiles fall to the lowest free active cells of their column
    ///
    /// Inactive cells are see-through: tiles fall past them rather than resting on them.
    /// Relative order inside a column is preserved.
    pub fn apply_gravity(&mut self) -> Vec<Movement> {
        let grid = self.grid_mut();
        let mut movements = Vec::new();

        for col in 0..grid.cols() {
            let slots: Vec<usize> = (0..grid.rows())
                .filter(|&row| grid.is_active(Position::new(row, col)))
                .collect();

            let mut write = slots.len();
            for read in (0..slots.len()).rev() {
                let from = Position::new(slots[read], col);
                let Some(tile) = grid.take(from) else {
                    continue;
                };
                write -= 1;
                let to = Position::new(slots[write], col);
                grid.place(to, tile);
                if to != from {
                    movements.push(Movement {
                        tile_id: tile.id,
                        from,
                        to,
                    });
                }
            }
        }
        movements
    }

    /// Fill every empty active cell with a fresh random tile
    pub fn spawn_new_tiles(&mut self, weights: &SpawnWeights) -> Vec<SpawnData> {
        let mut spawns = Vec::new();
        for pos in self.grid().empty_positions() {
            let kind = weights.pick(&mut self.rng);
            let tile = self.grid_mut().spawn_tile(pos, kind);
            spawns.push(SpawnData {
                row: pos.row,
                col: pos.col,
                tile_id: tile.id,
                kind,
            });
        }
        debug_assert!(self.grid().is_settled());
        spawns
    }

    /// Exchange the tiles of two cells without any validation
    ///
    /// Swapping the same pair twice restores the board exactly.
    ///
    /// # Panics
    ///
    /// Panics if either cell is out of bounds, inactive or empty.
    pub fn swap_tiles(&mut self, a: Position, b: Position) -> [Movement; 2] {
        let grid = self.grid_mut();
        let id_a = grid.tile(a).id;
        let id_b = grid.tile(b).id;
        grid.swap_cells(a, b);

        self.last_swap.clear();
        self.last_swap.push(a);
        self.last_swap.push(b);

        [
            Movement {
                tile_id: id_a,
                from: a,
                to: b,
            },
            Movement {
                tile_id: id_b,
                from: b,
                to: a,
            },
        ]
    }

    /// Forget the last player swap so booster rewards fall back to run centres
    pub fn clear_swap_hint(&mut self) {
        self.last_swap.clear();
    }

    /// First adjacent swap (row-major, right then down) that produces a match
    ///
    /// Each candidate is swapped in place, tested and swapped back.
    pub fn find_valid_move(&mut self) -> Option<(Position, Position)> {
        let positions: Vec<Position> = self.grid().active_positions().collect();
        for pos in positions {
            if self.grid().get(pos).is_none() {
                continue;
            }
            let neighbours = [
                Position::new(pos.row, pos.col + 1),
                Position::new(pos.row + 1, pos.col),
            ];
            for nb in neighbours {
                let grid = self.grid();
                if !grid.in_bounds(nb) || grid.get(nb).is_none() {
                    continue;
                }
                let grid = self.grid_mut();
                grid.swap_cells(pos, nb);
                let found = !matching::find_matches(grid).is_empty();
                grid.swap_cells(pos, nb);
                if found {
                    return Some((pos, nb));
                }
            }
        }
        None
    }

    pub fn has_valid_moves(&mut self) -> bool {
        self.find_valid_move().is_some()
    }

    /// Regenerate the board from its own kind distribution until it is match-free and
    /// playable
    ///
    /// Booster tiles stay where they are and obstacles stay on their cells. Returns
    /// `false` when the attempt budget ran out and the last attempt was kept.
    pub fn reshuffle_board(&mut self) -> bool {
        let weights = self.grid().kind_counts();
        if weights.is_empty() {
            return false;
        }

        let obstacles: Vec<(Position, ObstacleState)> = self
            .grid()
            .tiles()
            .filter_map(|t| t.obstacle.map(|o| (t.pos(), o)))
            .collect();

        let attempts = self.rules.reshuffle_attempts.max(1);
        for attempt in 1..=attempts {
            let grid = self.grid_mut();
            let plain: Vec<Position> = grid
                .tiles()
                .filter(|t| t.booster.is_none())
                .map(|t| t.pos())
                .collect();
            for pos in plain {
                grid.take(pos);
            }

            self.fill_avoiding_matches(&weights);

            let grid = self.grid_mut();
            for &(pos, obstacle) in &obstacles {
                if let Some(tile) = grid.get_mut(pos) {
                    tile.obstacle = Some(obstacle);
                }
            }

            if self.find_matches().is_empty() && self.has_valid_moves() {
                debug!("reshuffle succeeded after {} attempt(s)", attempt);
                self.last_swap.clear();
                return true;
            }
        }

        warn!(
            "reshuffle gave up after {} attempts; keeping last board",
            attempts
        );
        self.last_swap.clear();
        false
    }

    /// Resolve matches until the board is stable or the depth cap is reached
    pub fn process_turn(&mut self) -> CascadeOutcome {
        self.run_cascade(None)
    }

    /// Resolve an explicit removal wave (e.g. a booster combo) as the first cascade step,
    /// then keep cascading
    ///
    /// Boosters listed in `fired` have already been consumed and are removed without
    /// firing again.
    pub fn process_blast(&mut self, wave: Vec<Tile>, fired: &[TileId]) -> CascadeOutcome {
        self.run_cascade(Some((wave, fired.to_vec())))
    }

    fn run_cascade(&mut self, opening: Option<(Vec<Tile>, Vec<TileId>)>) -> CascadeOutcome {
        let cap = self.rules.max_cascade_depth.max(1);
        let mut steps: Vec<CascadeStep> = Vec::new();

        if let Some((wave, fired)) = opening {
            steps.push(self.resolve_step(Vec::new(), wave, Vec::new(), &fired));
            self.last_swap.clear();
        }

        while (steps.len() as u32) < cap {
            let resolution = self.find_matches_with_boosters();
            self.last_swap.clear();
            if resolution.is_empty() {
                break;
            }
            let MatchResolution {
                matches,
                tiles_to_remove,
                boosters_to_spawn,
            } = resolution;
            steps.push(self.resolve_step(matches, tiles_to_remove, boosters_to_spawn, &[]));
        }
        self.last_swap.clear();

        let depth = steps.len() as u32;
        let hit_cap = depth >= cap && !self.find_matches().is_empty();
        if hit_cap {
            warn!("cascade stopped at depth cap {} with matches remaining", cap);
        }

        CascadeOutcome {
            steps,
            depth,
            hit_cap,
        }
    }

    fn resolve_step(
        &mut self,
        matches: Vec<Match>,
        wave: Vec<Tile>,
        boosters: Vec<BoosterSpawn>,
        fired: &[TileId],
    ) -> CascadeStep {
        let grid = self.grid();
        let keep: Vec<TileId> = boosters
            .iter()
            .filter_map(|b| grid.get(b.pos()).map(|t| t.id))
            .collect();
        let blast = self.activator().chain_activation(&wave, fired, &keep);

        let damage = self.damage_obstacles(&blast.tiles);
        let removed = self.remove_matches(&damage.removable);
        let boosters_created = self.spawn_boosters(&boosters);
        let movements = self.apply_gravity();
        let weights = self.spawn_weights;
        let spawns = self.spawn_new_tiles(&weights);

        debug!(
            "cascade step: {} match(es), {} removed, {} obstacle(s) broken, {} booster(s) made, {} fired",
            matches.len(),
            removed.len(),
            damage.destroyed.len(),
            boosters_created.len(),
            blast.activated.len()
        );

        CascadeStep {
            matches,
            removed,
            destroyed_obstacles: damage.destroyed,
            boosters_created,
            boosters_activated: blast.activated,
            movements,
            spawns,
        }
    }
}
