//! Error types for episode setup.
//!
//! Planner failures during an episode are not errors here: they end the
//! episode and are reported through
//! [`EpisodeEndReason`](crate::episode::EpisodeEndReason).

use std::path::PathBuf;

use babybot_planner::PlannerError;
use babybot_world::WorldError;

use crate::config::ConfigError;

/// Errors that can occur while preparing an episode.
#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A map file could not be read.
    #[error("failed to read map file {path}: {source}")]
    MapFile {
        /// The map file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The world could not be built (bad map, bad mission text, crowded
    /// scenario).
    #[error(transparent)]
    World(#[from] WorldError),

    /// A map file was given without a mission.
    #[error("a mission is required when loading a map file")]
    MissingMission,

    /// The configured subgoal plan could not be parsed.
    #[error(transparent)]
    Plan(#[from] PlannerError),

    /// Neither a subgoal plan nor a mission was given.
    #[error("the world has no mission and no subgoal plan was configured")]
    NoMission,
}
