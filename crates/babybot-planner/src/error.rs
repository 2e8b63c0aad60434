//! Error types for the `babybot-planner` crate.
//!
//! Recoverable obstructions (blocked paths, locked doors, full hands) never
//! surface here; the planner handles them by pushing corrective subgoals.
//! [`PlannerError`] carries only the conditions that end planning.

use babybot_types::GridPosition;

/// Unrecoverable planning failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    /// The agent toggled a box, which destroys it. The mission is assumed to
    /// be impossible from here.
    #[error("a box was opened at {position}; the mission can no longer be trusted")]
    BoxOpened {
        /// Where the box stood.
        position: GridPosition,
    },

    /// Exploration found no closed door to investigate.
    #[error("nothing left to explore")]
    NothingToExplore,

    /// A single replanning call exceeded its iteration budget.
    #[error("replanning did not settle on an action after {iterations} iterations")]
    Stuck {
        /// Number of plan-next-action calls made during the tick.
        iterations: u32,
    },

    /// A subgoal plan entry could not be parsed.
    #[error("invalid subgoal plan entry {entry:?}: {reason}")]
    PlanParse {
        /// The offending entry.
        entry: String,
        /// What went wrong.
        reason: String,
    },
}
