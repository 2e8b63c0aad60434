//! Planner configuration.
//!
//! Embedded in the top-level configuration file under the `planner` key.
//! Every field has a default, so an empty section is valid.

use serde::{Deserialize, Serialize};

/// How much of the grid the planner is allowed to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Observability {
    /// Every cell counts as observed from the start.
    #[default]
    Full,
    /// Cells become observed once they enter the agent's view and stay
    /// observed afterwards.
    Partial,
}

/// Planner tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Visibility model.
    #[serde(default)]
    pub observability: Observability,

    /// Maximum number of plan-next-action calls in one `replan` before the
    /// planner reports [`PlannerError::Stuck`](crate::PlannerError::Stuck).
    #[serde(default = "default_max_replan_iterations")]
    pub max_replan_iterations: u32,
}

const fn default_max_replan_iterations() -> u32 {
    10_000
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            observability: Observability::default(),
            max_replan_iterations: default_max_replan_iterations(),
        }
    }
}
