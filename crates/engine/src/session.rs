//! Level session - one playthrough of a level
//!
//! A session owns the grid engine and the goal tracker and turns a player swap into a full
//! turn: validate, swap, resolve the cascade, feed the goals, spend the move, and reshuffle
//! a dead board. Presentation layers drive it and render from the returned [`TurnReport`].

use arrayvec::ArrayVec;
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::core::{
    CascadeOutcome, GoalEvent, Grid, GridSnapshot, LevelConfig, LevelError, LevelGoal,
    LevelGoalTracker, LevelState, Match3Engine, Movement, ObstacleState, SubscriptionId, Tile,
    TileId,
};
use crate::types::{BoosterKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("level is already finished")]
    Finished,
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
    #[error("position {0} is not an active cell")]
    Inactive(Position),
    #[error("position {0} holds no tile")]
    Empty(Position),
    #[error("positions {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),
    #[error("swap does not create a match")]
    NoMatch,
}

impl SwapError {
    pub fn code(self) -> &'static str {
        match self {
            SwapError::Finished => "level_finished",
            SwapError::OutOfBounds(_)
            | SwapError::Inactive(_)
            | SwapError::Empty(_)
            | SwapError::NotAdjacent(..) => "invalid_swap",
            SwapError::NoMatch => "no_match",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SwapError::Finished => "level is already won or lost",
            SwapError::OutOfBounds(_) => "swap position is outside the grid",
            SwapError::Inactive(_) => "swap position is a hole",
            SwapError::Empty(_) => "swap position holds no tile",
            SwapError::NotAdjacent(..) => "swap positions are not orthogonally adjacent",
            SwapError::NoMatch => "swap would not create a match and was reverted",
        }
    }
}

/// Everything one accepted swap caused
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub swap: [Movement; 2],
    /// Booster tiles consumed directly by the swap (combo or color clear)
    pub swap_boosters: Vec<Tile>,
    pub cascade: CascadeOutcome,
    pub events: Vec<GoalEvent>,
    pub moves_remaining: u32,
    pub state: LevelState,
    /// The board had no valid move left and was regenerated
    pub reshuffled: bool,
}

/// Plain-data view of a session for renderers and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub level_id: String,
    pub turn: u32,
    pub moves_remaining: u32,
    pub state: LevelState,
    pub goals: Vec<LevelGoal>,
    pub grid: GridSnapshot,
}

#[derive(Debug)]
pub struct LevelSession {
    level_id: String,
    engine: Match3Engine,
    tracker: LevelGoalTracker,
    turn: u32,
}

impl LevelSession {
    /// Validate the level, build its starting board and make sure it is playable
    pub fn new(config: &LevelConfig, seed: u32) -> Result<Self, LevelError> {
        let mut engine = Match3Engine::from_level(config, seed)?;
        if !engine.has_valid_moves() {
            debug!("level {:?} starts dead; reshuffling", config.id);
            engine.reshuffle_board();
        }

        Ok(Self {
            level_id: config.id.clone(),
            engine,
            tracker: LevelGoalTracker::new(config.moves, config.build_goals()),
            turn: 0,
        })
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn engine(&self) -> &Match3Engine {
        &self.engine
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    pub fn tracker(&self) -> &LevelGoalTracker {
        &self.tracker
    }

    pub fn state(&self) -> LevelState {
        self.tracker.state()
    }

    pub fn is_finished(&self) -> bool {
        self.tracker.is_finished()
    }

    pub fn moves_remaining(&self) -> u32 {
        self.tracker.moves_remaining()
    }

    pub fn goals(&self) -> &[LevelGoal] {
        self.tracker.goals()
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GoalEvent) + 'static) -> SubscriptionId {
        self.tracker.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tracker.unsubscribe(id)
    }

    /// First swap (row-major, right then down) that creates a match
    pub fn hint(&mut self) -> Option<(Position, Position)> {
        self.engine.find_valid_move()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level_id: self.level_id.clone(),
            turn: self.turn,
            moves_remaining: self.moves_remaining(),
            state: self.state(),
            goals: self.goals().to_vec(),
            grid: self.engine.snapshot(),
        }
    }

    fn check_cell(&self, pos: Position) -> Result<(), SwapError> {
        let grid = self.engine.grid();
        if !grid.in_bounds(pos) {
            return Err(SwapError::OutOfBounds(pos));
        }
        if !grid.is_active(pos) {
            return Err(SwapError::Inactive(pos));
        }
        if grid.get(pos).is_none() {
            return Err(SwapError::Empty(pos));
        }
        Ok(())
    }

    /// Play one move: swap the tiles at `a` and `b` and resolve everything it causes
    ///
    /// A rejected swap leaves the board and the move counter untouched.
    pub fn try_swap(&mut self, a: Position, b: Position) -> Result<TurnReport, SwapError> {
        if self.is_finished() {
            return Err(SwapError::Finished);
        }
        self.check_cell(a)?;
        self.check_cell(b)?;
        if !a.is_adjacent(b) {
            return Err(SwapError::NotAdjacent(a, b));
        }

        let swap = self.engine.swap_tiles(a, b);
        // After the swap: `moved` is the dragged tile, now on `b`; the combo pivots there.
        let moved = *self.engine.grid().tile(b);
        let target = *self.engine.grid().tile(a);

        let (cascade, swap_boosters) = match (moved.booster, target.booster) {
            (Some(_), Some(_)) => {
                let wave = self.engine.activator().activate_booster_combo(&target, &moved);
                let fired: ArrayVec<TileId, 2> = [target.id, moved.id].into_iter().collect();
                (self.engine.process_blast(wave, &fired), vec![target, moved])
            }
            (Some(BoosterKind::ColorClear), None) => self.clear_color(moved, target),
            (None, Some(BoosterKind::ColorClear)) => self.clear_color(target, moved),
            _ => {
                if self.engine.find_matches().is_empty() {
                    self.engine.swap_tiles(b, a);
                    self.engine.clear_swap_hint();
                    return Err(SwapError::NoMatch);
                }
                (self.engine.process_turn(), Vec::new())
            }
        };

        self.turn += 1;
        self.feed_goals(&cascade);
        self.tracker.decrement_moves();

        let reshuffled = !self.tracker.is_finished() && !self.engine.has_valid_moves();
        if reshuffled {
            debug!("turn {}: no valid move left; reshuffling", self.turn);
            self.engine.reshuffle_board();
        }

        debug!(
            "turn {}: {} <-> {}, depth {}, {} removed, state {:?}",
            self.turn,
            a,
            b,
            cascade.depth,
            cascade.removed_count(),
            self.state()
        );

        Ok(TurnReport {
            swap,
            swap_boosters,
            cascade,
            events: self.tracker.take_events(),
            moves_remaining: self.moves_remaining(),
            state: self.state(),
            reshuffled,
        })
    }

    /// A color clear swapped with a plain tile removes every tile of the plain tile's kind
    fn clear_color(&mut self, booster: Tile, plain: Tile) -> (CascadeOutcome, Vec<Tile>) {
        let wave = self
            .engine
            .activator()
            .activate_booster_combo(&booster, &plain);
        (self.engine.process_blast(wave, &[booster.id]), vec![booster])
    }

    fn feed_goals(&mut self, cascade: &CascadeOutcome) {
        for step in &cascade.steps {
            self.tracker.on_tiles_matched(&step.removed);

            let destroyed: Vec<ObstacleState> =
                step.destroyed_obstacles.iter().map(|d| d.obstacle).collect();
            if !destroyed.is_empty() {
                self.tracker.on_obstacles_destroyed(&destroyed);
            }

            for booster in step.boosters_created.iter().filter_map(|t| t.booster) {
                self.tracker.on_booster_created(booster);
            }
        }
    }
}
