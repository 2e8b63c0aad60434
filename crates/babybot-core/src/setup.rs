//! Building a world and a planner from configuration.

use babybot_planner::{BabyBot, parse_subgoal_plan};
use babybot_world::{GridWorld, ScenarioConfig, generate_go_to_red_ball, parse_map, parse_mission};
use tracing::info;

use crate::config::{BabyBotConfig, WorldSettings};
use crate::error::EpisodeError;

/// Build the world described by `settings`.
///
/// With a map file, the mission text is mandatory. Without one, a scenario
/// is generated from `settings.seed` and `scenario`, and the mission text
/// (if any) replaces the generated "go to the red ball".
///
/// # Errors
///
/// Returns [`EpisodeError::MapFile`] if the map cannot be read,
/// [`EpisodeError::MissingMission`] for a map without a mission, and
/// [`EpisodeError::World`] for malformed maps, missions, or layouts.
pub fn build_world(settings: &WorldSettings, scenario: &ScenarioConfig) -> Result<GridWorld, EpisodeError> {
    let mut world = match &settings.map {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| EpisodeError::MapFile {
                path: path.clone(),
                source,
            })?;
            let mut world = parse_map(&text)?;
            let mission = settings.mission.as_deref().ok_or(EpisodeError::MissingMission)?;
            world.set_mission(parse_mission(mission)?);
            info!(path = %path.display(), mission, "world loaded from map");
            world
        }
        None => {
            let mut world = generate_go_to_red_ball(scenario, settings.seed)?;
            if let Some(mission) = settings.mission.as_deref() {
                world.set_mission(parse_mission(mission)?);
            }
            info!(
                seed = settings.seed,
                room_size = scenario.room_size,
                rows = scenario.num_rows,
                cols = scenario.num_cols,
                "world generated"
            );
            world
        }
    };

    if let Some(max_steps) = settings.max_steps {
        world.set_max_steps(max_steps);
    }
    Ok(world)
}

/// Build a planner for `world`.
///
/// A non-empty `episode.plan` seeds the stack directly; otherwise the
/// world's mission is decomposed.
///
/// # Errors
///
/// Returns [`EpisodeError::Plan`] if the configured plan does not parse,
/// or [`EpisodeError::NoMission`] if there is neither a plan nor a mission.
pub fn build_bot(world: &GridWorld, config: &BabyBotConfig) -> Result<BabyBot, EpisodeError> {
    if !config.episode.plan.is_empty() {
        let plan = parse_subgoal_plan(&config.episode.plan)?;
        info!(subgoals = plan.len(), "planner seeded from configured plan");
        return Ok(BabyBot::with_plan(world, config.planner.clone(), plan));
    }
    let mission = world.mission().ok_or(EpisodeError::NoMission)?;
    let mut bot = BabyBot::new(world, config.planner.clone());
    bot.provide_initial_subgoals(mission);
    Ok(bot)
}
