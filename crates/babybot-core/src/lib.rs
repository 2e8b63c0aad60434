//! Configuration, episode driving, and replay around the `BabyBot`
//! planner.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `babybot-config.yaml` into
//!   strongly-typed structs, with `BABYBOT_*` environment overrides.
//! - [`setup`] -- Building the world and the planner from configuration.
//! - [`episode`] -- The stepping loop, its observer hook, and the episode
//!   summary.
//! - [`actions`] -- Comma-separated action sequence text.
//! - [`replay`](mod@replay) -- Replaying recorded actions on a copy of a world.
//! - [`error`] -- Setup errors.

pub mod actions;
pub mod config;
pub mod episode;
pub mod error;
pub mod replay;
pub mod setup;

pub use actions::{format_action_sequence, parse_action_sequence};
pub use config::{BabyBotConfig, ConfigError, EpisodeConfig};
pub use episode::{EpisodeEndReason, EpisodeObserver, EpisodeResult, NoOpObserver, StepRecord, run_episode};
pub use error::EpisodeError;
pub use replay::{AgentState, ReplayOutcome, replay};
pub use setup::{build_bot, build_world};
