//! The episode driver: the stepping loop around the planner.
//!
//! Each tick asks the planner for an action, applies it to the world, and
//! hands the applied action back to the planner on the next tick. The
//! planner never touches the world mutably.

use babybot_planner::{BabyBot, BfsStats};
use babybot_types::{Action, Direction, GridPosition, WorldView};
use babybot_world::{GridWorld, StepOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EpisodeConfig;

/// Why an episode stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EpisodeEndReason {
    /// The planner emptied its stack and answered `done`.
    BotDone,
    /// The world reported mission success.
    MissionSucceeded,
    /// The world's step budget ran out.
    StepLimit,
    /// The planner gave up.
    PlannerFailed {
        /// The planner's error message.
        message: String,
    },
}

/// One applied action, as seen by an [`EpisodeObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Zero-based tick index.
    pub index: u32,
    /// The applied action.
    pub action: Action,
    /// What the world reported.
    pub outcome: StepOutcome,
    /// Agent position after the action.
    pub agent_pos: GridPosition,
    /// Agent facing after the action.
    pub agent_dir: Direction,
    /// Plan stack depth when the action was chosen.
    pub stack_depth: usize,
}

/// Summary of a finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Applied actions, in order. A final `done` is not included.
    pub actions: Vec<Action>,
    /// Sum of step rewards.
    pub reward: f64,
    /// Whether the mission was accomplished.
    pub success: bool,
    /// Why the episode stopped.
    pub end_reason: EpisodeEndReason,
    /// Subgoals the planner pushed during the episode.
    pub subgoals_pushed: u64,
    /// Pathfinding counters accumulated during the episode.
    pub bfs: BfsStats,
}

/// Per-step hook into the episode driver.
///
/// Every method has an empty default, so implementors only override what
/// they need.
pub trait EpisodeObserver {
    /// Called once before the first tick.
    fn on_start(&mut self, _world: &GridWorld) {}

    /// Called after every applied action.
    fn on_step(&mut self, _world: &GridWorld, _step: &StepRecord) {}

    /// Called once with the final result.
    fn on_end(&mut self, _result: &EpisodeResult) {}
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl EpisodeObserver for NoOpObserver {}

/// Run `bot` in `world` until the episode ends.
///
/// Ends when the planner answers `done`, when the mission succeeds and
/// `config.stop_on_success` is set, when the world truncates, or when the
/// planner fails. A planner failure is reported through
/// [`EpisodeEndReason::PlannerFailed`], not as an error.
pub fn run_episode<O: EpisodeObserver + ?Sized>(
    world: &mut GridWorld,
    bot: &mut BabyBot,
    config: &EpisodeConfig,
    observer: &mut O,
) -> EpisodeResult {
    let mission = world.mission().map_or_else(String::new, ToString::to_string);
    info!(
        mission = %mission,
        max_steps = world.max_steps(),
        agent = %world.agent_pos(),
        "episode started"
    );
    observer.on_start(world);

    let pushed_before = bot.subgoals_pushed();
    let bfs_before = bot.bfs_stats();
    let mut actions = Vec::new();
    let mut reward = 0.0;
    let mut last_action = None;

    let end_reason = loop {
        if world.step_count() >= world.max_steps() {
            break EpisodeEndReason::StepLimit;
        }

        let action = match bot.replan(&*world, last_action) {
            Ok(action) => action,
            Err(err) => {
                warn!(error = %err, step = world.step_count(), "planner failed");
                break EpisodeEndReason::PlannerFailed {
                    message: err.to_string(),
                };
            }
        };
        if action == Action::Done {
            break EpisodeEndReason::BotDone;
        }

        let stack_depth = bot.stack().len();
        let index = world.step_count();
        let outcome = world.step(action);
        actions.push(action);
        reward += outcome.reward;
        last_action = Some(action);

        let record = StepRecord {
            index,
            action,
            outcome,
            agent_pos: world.agent_pos(),
            agent_dir: world.agent_dir(),
            stack_depth,
        };
        debug!(
            step = index,
            action = %action,
            pos = %record.agent_pos,
            depth = stack_depth,
            "step applied"
        );
        observer.on_step(world, &record);

        if outcome.terminated && config.stop_on_success {
            break EpisodeEndReason::MissionSucceeded;
        }
        if outcome.truncated {
            break EpisodeEndReason::StepLimit;
        }
    };

    let bfs_after = bot.bfs_stats();
    let result = EpisodeResult {
        actions,
        reward,
        success: world.mission_succeeded(),
        end_reason,
        subgoals_pushed: bot.subgoals_pushed().saturating_sub(pushed_before),
        bfs: BfsStats {
            searches: bfs_after.searches.saturating_sub(bfs_before.searches),
            visited: bfs_after.visited.saturating_sub(bfs_before.visited),
        },
    };
    info!(
        steps = result.actions.len(),
        success = result.success,
        reward = result.reward,
        end = ?result.end_reason,
        subgoals_pushed = result.subgoals_pushed,
        "episode finished"
    );
    observer.on_end(&result);
    result
}
