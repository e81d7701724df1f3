//! Level goal tracking - progress counters, move budget and win/lose latching
//!
//! The tracker starts `InProgress` and latches into `Won` or `Lost` exactly once; every
//! later event is ignored. Win is checked eagerly after each progress update, before the
//! move counter is ever consulted, so finishing the goals on the last move always wins.
//!
//! Events are delivered synchronously to subscribed listeners in emission order, and are
//! also queued for callers that prefer polling via [`LevelGoalTracker::take_events`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile::{ObstacleState, Tile};
use crate::types::{BoosterKind, ObstacleKind, TileKind};

/// What a goal counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalTarget {
    Collect { tile: TileKind },
    DestroyObstacle { obstacle: ObstacleKind },
    CreateBooster { booster: BoosterKind },
}

/// One level objective
///
/// Invariant: `progress <= required`, and progress never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelGoal {
    pub target: GoalTarget,
    pub required: u32,
    #[serde(default)]
    pub progress: u32,
}

impl LevelGoal {
    pub fn new(target: GoalTarget, required: u32) -> Self {
        Self {
            target,
            required,
            progress: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }

    /// Add `amount`, clamped to `required`; returns whether progress moved
    fn advance(&mut self, amount: u32) -> bool {
        let next = self.progress.saturating_add(amount).min(self.required);
        let changed = next != self.progress;
        self.progress = next;
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelState {
    InProgress,
    Won,
    Lost,
}

impl LevelState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, LevelState::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalEvent {
    MovesChanged { remaining: u32 },
    GoalsUpdated { goals: Vec<LevelGoal> },
    LevelWon,
    LevelLost,
}

impl GoalEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalEvent::MovesChanged { .. } => "moves_changed",
            GoalEvent::GoalsUpdated { .. } => "goals_updated",
            GoalEvent::LevelWon => "level_won",
            GoalEvent::LevelLost => "level_lost",
        }
    }
}

/// Handle returned by [`LevelGoalTracker::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GoalEvent)>;

pub struct LevelGoalTracker {
    moves: u32,
    goals: Vec<LevelGoal>,
    state: LevelState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u32,
    /// Emitted events not yet taken by a poller
    events: Vec<GoalEvent>,
}

impl LevelGoalTracker {
    /// Starting progress is clamped to `required`. A tracker whose goals are already all
    /// complete (including an empty goal list) starts Won with a queued `LevelWon`.
    pub fn new(moves: u32, mut goals: Vec<LevelGoal>) -> Self {
        for goal in &mut goals {
            goal.progress = goal.progress.min(goal.required);
        }

        let mut tracker = Self {
            moves,
            goals,
            state: LevelState::InProgress,
            listeners: Vec::new(),
            next_subscription: 0,
            events: Vec::new(),
        };
        tracker.after_progress(false);
        tracker
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves
    }

    pub fn goals(&self) -> &[LevelGoal] {
        &self.goals
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn all_goals_complete(&self) -> bool {
        self.goals.iter().all(LevelGoal::is_complete)
    }

    /// Register a listener; it sees every later event synchronously, in order
    pub fn subscribe(&mut self, listener: impl FnMut(&GoalEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Take and clear the queued events.
    pub fn take_events(&mut self) -> Vec<GoalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Count matched tiles towards collect goals
    pub fn on_tiles_matched(&mut self, tiles: &[Tile]) {
        if self.is_finished() {
            return;
        }

        let mut changed = false;
        for goal in &mut self.goals {
            if let GoalTarget::Collect { tile: kind } = goal.target {
                let count = tiles
                    .iter()
                    .filter(|t| t.kind == kind && t.is_matchable())
                    .count();
                changed |= goal.advance(count as u32);
            }
        }
        self.after_progress(changed);
    }

    /// Count fully destroyed obstacles; partially damaged ones (layers > 0) never count
    pub fn on_obstacles_destroyed(&mut self, obstacles: &[ObstacleState]) {
        if self.is_finished() {
            return;
        }

        let mut changed = false;
        for goal in &mut self.goals {
            if let GoalTarget::DestroyObstacle { obstacle: kind } = goal.target {
                let count = obstacles
                    .iter()
                    .filter(|o| o.kind == kind && o.is_destroyed())
                    .count();
                changed |= goal.advance(count as u32);
            }
        }
        self.after_progress(changed);
    }

    pub fn on_booster_created(&mut self, kind: BoosterKind) {
        if self.is_finished() {
            return;
        }

        let mut changed = false;
        for goal in &mut self.goals {
            if goal.target == (GoalTarget::CreateBooster { booster: kind }) {
                changed |= goal.advance(1);
            }
        }
        self.after_progress(changed);
    }

    /// Spend one move; running out with goals outstanding loses the level
    pub fn decrement_moves(&mut self) {
        if self.is_finished() {
            return;
        }

        self.moves = self.moves.saturating_sub(1);
        self.emit(GoalEvent::MovesChanged {
            remaining: self.moves,
        });

        if self.moves == 0 && !self.all_goals_complete() {
            self.state = LevelState::Lost;
            self.emit(GoalEvent::LevelLost);
        }
    }

    fn after_progress(&mut self, changed: bool) {
        if changed {
            self.emit(GoalEvent::GoalsUpdated {
                goals: self.goals.clone(),
            });
        }
        if self.all_goals_complete() {
            self.state = LevelState::Won;
            self.emit(GoalEvent::LevelWon);
        }
    }

    fn emit(&mut self, event: GoalEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        self.events.push(event);
    }
}

impl fmt::Debug for LevelGoalTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelGoalTracker")
            .field("moves", &self.moves)
            .field("goals", &self.goals)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileId;
    use crate::types::Position;

    fn fuel(n: usize) -> Vec<Tile> {
        (0..n)
            .map(|i| Tile::new(TileId(i as u32 + 1), Position::new(0, i), TileKind::Fuel))
            .collect()
    }

    fn collect_fuel(required: u32) -> LevelGoal {
        LevelGoal::new(
            GoalTarget::Collect {
                tile: TileKind::Fuel,
            },
            required,
        )
    }

    #[test]
    fn test_progress_clamped() {
        let mut t = LevelGoalTracker::new(5, vec![collect_fuel(4), collect_fuel(10)]);
        t.on_tiles_matched(&fuel(6));
        assert_eq!(t.goals()[0].progress, 4);
        assert_eq!(t.goals()[1].progress, 6);
        assert_eq!(t.state(), LevelState::InProgress);
    }

    #[test]
    fn test_starting_progress_clamped() {
        let mut goal = collect_fuel(4);
        goal.progress = 9;
        let t = LevelGoalTracker::new(5, vec![goal, collect_fuel(2)]);
        assert_eq!(t.goals()[0].progress, 4);
        assert_eq!(t.state(), LevelState::InProgress);
    }

    #[test]
    fn test_empty_goal_list_is_won() {
        let mut t = LevelGoalTracker::new(1, Vec::new());
        assert_eq!(t.state(), LevelState::Won);
        assert_eq!(t.take_events(), vec![GoalEvent::LevelWon]);

        t.decrement_moves();
        assert_eq!(t.state(), LevelState::Won);
        assert_eq!(t.moves_remaining(), 1);
    }

    #[test]
    fn test_unrelated_kinds_ignored() {
        let mut t = LevelGoalTracker::new(5, vec![collect_fuel(3)]);
        let ore = vec![Tile::new(TileId(1), Position::new(0, 0), TileKind::Ore)];
        t.on_tiles_matched(&ore);
        assert_eq!(t.goals()[0].progress, 0);
        assert!(t.take_events().is_empty());
    }

    #[test]
    fn test_instant_win_with_moves_left() {
        let mut t = LevelGoalTracker::new(20, vec![collect_fuel(3)]);
        t.on_tiles_matched(&fuel(3));
        assert_eq!(t.state(), LevelState::Won);
        let events = t.take_events();
        assert_eq!(events.last(), Some(&GoalEvent::LevelWon));
    }

    #[test]
    fn test_terminal_state_ignores_events() {
        let mut t = LevelGoalTracker::new(1, vec![collect_fuel(3)]);
        t.decrement_moves();
        assert_eq!(t.state(), LevelState::Lost);
        t.take_events();

        t.on_tiles_matched(&fuel(3));
        t.decrement_moves();
        assert_eq!(t.state(), LevelState::Lost);
        assert_eq!(t.goals()[0].progress, 0);
        assert!(t.take_events().is_empty());
    }

    #[test]
    fn test_booster_goal() {
        let goal = LevelGoal::new(
            GoalTarget::CreateBooster {
                booster: BoosterKind::Area,
            },
            2,
        );
        let mut t = LevelGoalTracker::new(3, vec![goal]);
        t.on_booster_created(BoosterKind::LineRow);
        assert_eq!(t.goals()[0].progress, 0);
        t.on_booster_created(BoosterKind::Area);
        t.on_booster_created(BoosterKind::Area);
        assert_eq!(t.state(), LevelState::Won);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let mut t = LevelGoalTracker::new(3, vec![collect_fuel(9)]);
        let id = t.subscribe(move |_| *sink.borrow_mut() += 1);

        t.decrement_moves();
        assert!(t.unsubscribe(id));
        assert!(!t.unsubscribe(id));
        t.decrement_moves();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_goal_json_shape() {
        let goal: LevelGoal =
            serde_json::from_str(r#"{"target":{"kind":"destroy_obstacle","obstacle":"ice"},"required":4}"#)
                .unwrap();
        assert_eq!(
            goal.target,
            GoalTarget::DestroyObstacle {
                obstacle: ObstacleKind::Ice
            }
        );
        assert_eq!(goal.progress, 0);
    }
}
