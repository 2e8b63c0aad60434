//! Stack-based hierarchical planner for `BabyAI`-style grid missions.
//!
//! The planner keeps a LIFO stack of subgoals. Each tick the top subgoal
//! either proposes a primitive action or rewrites the stack (pushing
//! corrective subgoals such as "fetch the key" or "move the blocker away")
//! and lets the new top decide. An empty stack means the mission is done.
//!
//! # Modules
//!
//! - [`pathfinder`] -- Breadth-first search with blocker fallback, drop spots
//! - [`locator`] -- Choosing the closest reachable matching object
//! - [`subgoal`] -- Subgoal variants and their per-tick behavior
//! - [`stack`] -- The plan stack and its push counter
//! - [`bot`] -- The per-tick controller
//! - [`plan_text`] -- Parsing externally supplied subgoal plans
//! - [`config`] -- Planner configuration
//! - [`error`] -- Unrecoverable planning failures

pub mod bot;
pub mod config;
mod context;
pub mod error;
pub mod locator;
pub mod pathfinder;
pub mod plan_text;
pub mod stack;
pub mod subgoal;

pub use bot::BabyBot;
pub use config::{Observability, PlannerConfig};
pub use context::AgentSnapshot;
pub use error::PlannerError;
pub use pathfinder::{BfsStats, Blockers, Path, VisibilityMask};
pub use plan_text::parse_subgoal_plan;
pub use stack::PlanStack;
pub use subgoal::{Reason, Subgoal, SubgoalKind, Target};
