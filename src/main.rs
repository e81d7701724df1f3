//! Headless level runner (default binary).
//!
//! Loads a level, then plays it greedily: each turn takes the first hinted swap until the
//! level is won, lost, or the turn limit is reached. Prints the board and goal progress
//! after every turn, or one JSON session snapshot per line with `--json`.
//!
//! ```text
//! tile-cascade [LEVEL.json] [--seed N] [--turns N] [--json]
//! ```
//!
//! `RUST_LOG=debug` shows per-turn and per-step cascade logs.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use tile_cascade::core::{GoalTarget, LevelConfig, LevelState};
use tile_cascade::engine::{LevelSession, SessionSnapshot};

const BUNDLED_LEVEL: &str = include_str!("../levels/level_01.json");

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunnerConfig {
    level_path: Option<PathBuf>,
    seed: u32,
    turns: u32,
    json: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            level_path: None,
            seed: 1,
            turns: 100,
            json: false,
        }
    }
}

impl RunnerConfig {
    /// Defaults, then `TILE_CASCADE_SEED` from the environment, then command-line arguments
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(seed) = std::env::var("TILE_CASCADE_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            config.seed = seed;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => config.seed = parse_value(&mut args, "--seed")?,
                "--turns" => config.turns = parse_value(&mut args, "--turns")?,
                "--json" => config.json = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                path => {
                    if config.level_path.is_some() {
                        bail!("more than one level path given");
                    }
                    config.level_path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(config)
    }

    fn load_level(&self) -> Result<LevelConfig> {
        let text = match &self.level_path {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading level {}", path.display()))?,
            None => BUNDLED_LEVEL.to_string(),
        };
        LevelConfig::from_json(&text).context("loading level")
    }
}

fn parse_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32> {
    let Some(value) = args.next() else {
        bail!("{flag} needs a value");
    };
    value
        .parse()
        .with_context(|| format!("{flag} expects a number, got {value:?}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RunnerConfig::from_args(std::env::args().skip(1))?;
    let level = config.load_level()?;
    let mut session = LevelSession::new(&level, config.seed)?;
    info!("playing {} with seed {}", session.level_id(), config.seed);

    print_state(&session.snapshot(), &session, config.json)?;

    for _ in 0..config.turns {
        if session.is_finished() {
            break;
        }
        let Some((a, b)) = session.hint() else {
            warn!("no valid move after reshuffle; stopping");
            break;
        };
        let report = session.try_swap(a, b)?;
        if !config.json {
            println!(
                "turn {}: swap {} <-> {}, cascade depth {}, {} tiles removed{}",
                session.turn(),
                a,
                b,
                report.cascade.depth,
                report.cascade.removed_count(),
                if report.reshuffled { ", reshuffled" } else { "" }
            );
        }
        print_state(&session.snapshot(), &session, config.json)?;
    }

    let outcome = match session.state() {
        LevelState::Won => "won",
        LevelState::Lost => "lost",
        LevelState::InProgress => "unfinished",
    };
    if !config.json {
        println!("{} {} after {} turn(s)", session.level_id(), outcome, session.turn());
    }
    Ok(())
}

fn print_state(snapshot: &SessionSnapshot, session: &LevelSession, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    println!("{}", session.grid());
    let goals: Vec<String> = snapshot
        .goals
        .iter()
        .map(|g| {
            let what = match g.target {
                GoalTarget::Collect { tile } => format!("collect {}", tile.as_str()),
                GoalTarget::DestroyObstacle { obstacle } => {
                    format!("break {}", obstacle.as_str())
                }
                GoalTarget::CreateBooster { booster } => format!("make {}", booster.as_str()),
            };
            format!("{what} {}/{}", g.progress, g.required)
        })
        .collect();
    println!(
        "moves left {} | {}\n",
        snapshot.moves_remaining,
        goals.join(", ")
    );
    Ok(())
}
