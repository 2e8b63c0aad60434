//! Replaying a recorded action sequence on a copy of a world.
//!
//! Worlds are deterministic, so replaying an episode's actions from the same
//! start reproduces its final state exactly.

use babybot_types::{Action, Direction, GridPosition, WorldView};
use babybot_world::GridWorld;
use serde::{Deserialize, Serialize};

/// Where the agent stands and which way it faces.
///
/// Displays as `((x, y), d)` with east=0, south=1, west=2, north=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// Agent position.
    pub pos: GridPosition,
    /// Agent facing.
    pub dir: Direction,
}

impl AgentState {
    /// The agent's current state in `world`.
    pub fn of<W: WorldView>(world: &W) -> Self {
        Self {
            pos: world.agent_pos(),
            dir: world.agent_dir(),
        }
    }
}

impl core::fmt::Display for AgentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(({}, {}), {})", self.pos.col, self.pos.row, self.dir.index())
    }
}

/// What one replay achieved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Number of actions actually applied.
    pub applied: usize,
    /// Sum of step rewards.
    pub reward: f64,
    /// The mission was accomplished.
    pub terminated: bool,
    /// The step budget ran out first.
    pub truncated: bool,
    /// Where the agent ended up.
    pub final_state: AgentState,
}

/// Apply `actions` to a copy of `world`, stopping early once the episode
/// terminates or truncates. Returns the copy and a summary.
pub fn replay(world: &GridWorld, actions: &[Action]) -> (GridWorld, ReplayOutcome) {
    let mut copy = world.clone();
    let mut reward = 0.0;
    let mut applied: usize = 0;
    let mut terminated = false;
    let mut truncated = false;
    for &action in actions {
        let outcome = copy.step(action);
        applied = applied.saturating_add(1);
        reward += outcome.reward;
        if outcome.terminated || outcome.truncated {
            terminated = outcome.terminated;
            truncated = outcome.truncated;
            break;
        }
    }
    let outcome = ReplayOutcome {
        applied,
        reward,
        terminated,
        truncated,
        final_state: AgentState::of(&copy),
    };
    (copy, outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use babybot_types::{Color, Instruction, ObjectDescriptor, ObjectKind};
    use babybot_world::parse_map;

    use super::*;
    use crate::actions::parse_action_sequence;

    fn room() -> GridWorld {
        let mut world = parse_map(
            "
WWWWWWWWWWWW
WW>>......WW
WW........WW
WW......ARWW
WWWWWWWWWWWW
",
        )
        .unwrap();
        world.set_mission(Instruction::go_to(ObjectDescriptor::new(
            ObjectKind::Ball,
            Some(Color::Red),
        )));
        world
    }

    #[test]
    fn replay_stops_at_termination() {
        let world = room();
        let actions = parse_action_sequence("forward, forward, forward, right, forward, left, left");
        let (after, outcome) = replay(&world, &actions);
        assert!(outcome.terminated);
        assert!(!outcome.truncated);
        assert!(outcome.reward > 0.0);
        assert_eq!(outcome.applied, 5);
        assert_eq!(after.step_count(), 5);
        assert_eq!(outcome.final_state.to_string(), "((4, 2), 1)");
    }

    #[test]
    fn replay_leaves_the_original_alone() {
        let world = room();
        let (after, outcome) = replay(&world, &[Action::Forward, Action::Left]);
        assert_eq!(world.agent_pos(), GridPosition::new(1, 1));
        assert_eq!(world.step_count(), 0);
        assert_eq!(after.agent_pos(), GridPosition::new(2, 1));
        assert_eq!(outcome.final_state.dir, Direction::North);
        assert!(!outcome.terminated);
    }

    #[test]
    fn truncation_stops_the_replay() {
        let mut world = room();
        world.set_max_steps(2);
        let (_, outcome) = replay(&world, &[Action::Left; 4]);
        assert!(outcome.truncated);
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.final_state.dir, Direction::West);
    }
}
