//! Host grid world for the `BabyBot` planner.
//!
//! Owns the occupancy grid, the agent pose and carried object, the rules for
//! applying primitive actions, and mission verification. The planner only
//! ever sees it through [`babybot_types::WorldView`].
//!
//! # Modules
//!
//! - [`grid_world`] -- The [`GridWorld`] model and its action semantics
//! - [`verifier`] -- Mission progress tracking
//! - [`map`] -- ASCII map parsing and rendering
//! - [`mission`] -- Mission text grammar
//! - [`scenario`] -- Seeded scenario generation
//! - [`error`] -- Error types

pub mod error;
pub mod grid_world;
pub mod map;
pub mod mission;
pub mod scenario;
pub mod verifier;

pub use error::WorldError;
pub use grid_world::{AGENT_VIEW_SIZE, GridWorld, StepOutcome};
pub use map::{parse_map, render_map};
pub use mission::parse_mission;
pub use scenario::{ScenarioConfig, generate_go_to_red_ball};
pub use verifier::MissionProgress;
