//! Command-line episode runner for the `BabyBot` planner.
//!
//! Loads `babybot-config.yaml` (or the path given as the first argument),
//! builds the world and the planner, runs one episode, and prints a JSON
//! report on stdout. Logs go to stderr.
//!
//! ```text
//! babybot-runner [CONFIG] [--trace]
//! ```
//!
//! `--trace` adds every step (action, outcome, pose, stack depth) to the
//! report.

mod report;

use std::path::PathBuf;

use anyhow::Context;
use babybot_core::{
    AgentState, BabyBotConfig, EpisodeObserver, NoOpObserver, build_bot, build_world, run_episode,
};
use babybot_world::render_map;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::report::{RunReport, StepTrace};

/// Config file used when no path is given.
const DEFAULT_CONFIG: &str = "babybot-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration, map, mission, or plan is invalid,
/// or if the report cannot be serialized.
fn main() -> anyhow::Result<()> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);
    let mut trace = false;
    for arg in std::env::args().skip(1) {
        if arg == "--trace" {
            trace = true;
        } else {
            config_path = PathBuf::from(arg);
        }
    }

    let config = BabyBotConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    init_logging(&config);
    info!(config = %config_path.display(), "babybot-runner starting");

    let mut world = build_world(&config.world, &config.scenario).context("building world")?;
    let start = render_map(&world);
    let mission = world.mission().map_or_else(String::new, ToString::to_string);
    let mut bot = build_bot(&world, &config).context("building planner")?;

    let mut step_trace = StepTrace::default();
    let mut no_op = NoOpObserver;
    let observer: &mut dyn EpisodeObserver = if trace { &mut step_trace } else { &mut no_op };
    let result = run_episode(&mut world, &mut bot, &config.episode, observer);

    let (seed, map) = match config.world.map {
        Some(path) => (None, Some(path)),
        None => (Some(config.world.seed), None),
    };
    let final_state = AgentState::of(&world);
    let report = RunReport::new(mission, seed, map, start, final_state, result, step_trace.steps);
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &BabyBotConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
