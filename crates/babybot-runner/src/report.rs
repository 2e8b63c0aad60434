//! The JSON run report printed on stdout.

use std::path::PathBuf;

use babybot_core::{AgentState, EpisodeObserver, EpisodeResult, StepRecord, format_action_sequence};
use babybot_world::GridWorld;
use serde::Serialize;

/// Collects every step when tracing is requested.
#[derive(Debug, Default)]
pub struct StepTrace {
    /// Recorded steps, in order.
    pub steps: Vec<StepRecord>,
}

impl EpisodeObserver for StepTrace {
    fn on_step(&mut self, _world: &GridWorld, step: &StepRecord) {
        self.steps.push(*step);
    }
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Mission text.
    pub mission: String,
    /// Scenario seed, when the world was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Map file, when the world was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<PathBuf>,
    /// The starting world in ASCII map form.
    pub start: String,
    /// Applied actions as `"left, forward, ..."`.
    pub action_sequence: String,
    /// Agent pose when the episode ended, as `((x, y), d)`.
    pub final_state: String,
    /// Episode summary.
    #[serde(flatten)]
    pub result: EpisodeResult,
    /// Per-step trace, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    /// Assemble a report from a finished episode.
    pub fn new(
        mission: String,
        seed: Option<u64>,
        map: Option<PathBuf>,
        start: String,
        final_state: AgentState,
        result: EpisodeResult,
        steps: Vec<StepRecord>,
    ) -> Self {
        Self {
            mission,
            seed,
            map,
            start,
            action_sequence: format_action_sequence(&result.actions),
            final_state: final_state.to_string(),
            result,
            steps,
        }
    }
}
