//! Seeded scenario generation.
//!
//! Builds a grid of square rooms that share walls, connects every pair of
//! neighboring rooms with a closed door, and scatters a red ball and grey
//! distractors. The mission is always "go to the red ball". The same seed
//! and configuration always produce the same world.

use babybot_types::{
    Color, Direction, GridPosition, Instruction, ObjectDescriptor, ObjectKind, WorldObject,
    WorldView,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::grid_world::GridWorld;

/// How many random cells to try before giving up on placing one object.
const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Layout parameters for generated scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Side length of each room, walls included.
    #[serde(default = "default_room_size")]
    pub room_size: i32,

    /// Number of room rows.
    #[serde(default = "default_room_count")]
    pub num_rows: i32,

    /// Number of room columns.
    #[serde(default = "default_room_count")]
    pub num_cols: i32,

    /// Number of grey distractor objects.
    #[serde(default = "default_num_distractors")]
    pub num_distractors: u32,
}

const fn default_room_size() -> i32 {
    8
}

const fn default_room_count() -> i32 {
    1
}

const fn default_num_distractors() -> u32 {
    7
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            room_size: default_room_size(),
            num_rows: default_room_count(),
            num_cols: default_room_count(),
            num_distractors: default_num_distractors(),
        }
    }
}

/// Top-left corner and side length of one room.
#[derive(Debug, Clone, Copy)]
struct Room {
    origin: GridPosition,
    size: i32,
}

impl Room {
    fn random_interior(self, rng: &mut StdRng) -> GridPosition {
        let last = self.size.saturating_sub(1);
        GridPosition::new(
            self.origin.col.saturating_add(rng.random_range(1..last)),
            self.origin.row.saturating_add(rng.random_range(1..last)),
        )
    }
}

/// Generate a "go to the red ball" world from `seed`.
///
/// # Errors
///
/// Returns [`WorldError::InvalidDimensions`] if the layout is degenerate,
/// or [`WorldError::PlacementFailed`] if the rooms are too crowded for the
/// requested number of objects.
pub fn generate_go_to_red_ball(config: &ScenarioConfig, seed: u64) -> Result<GridWorld, WorldError> {
    let size = config.room_size;
    if size < 4 || config.num_rows < 1 || config.num_cols < 1 {
        return Err(WorldError::InvalidDimensions {
            width: size,
            height: size,
        });
    }
    let stride = size.saturating_sub(1);
    let width = stride.saturating_mul(config.num_cols).saturating_add(1);
    let height = stride.saturating_mul(config.num_rows).saturating_add(1);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = GridWorld::new(width, height)?;

    let mut rooms = Vec::new();
    for room_row in 0..config.num_rows {
        for room_col in 0..config.num_cols {
            let room = Room {
                origin: GridPosition::new(
                    room_col.saturating_mul(stride),
                    room_row.saturating_mul(stride),
                ),
                size,
            };
            world.wall_rect(room.origin, size, size)?;
            rooms.push(room);
        }
    }

    // Doors on the east and south wall of every room that has a neighbor there.
    for room in &rooms {
        let last = size.saturating_sub(1);
        let east_wall = room.origin.col.saturating_add(last);
        let south_wall = room.origin.row.saturating_add(last);
        if east_wall < width.saturating_sub(1) {
            let row = room.origin.row.saturating_add(rng.random_range(1..last));
            world.set_cell(GridPosition::new(east_wall, row), Some(random_door(&mut rng)))?;
        }
        if south_wall < height.saturating_sub(1) {
            let col = room.origin.col.saturating_add(rng.random_range(1..last));
            world.set_cell(GridPosition::new(col, south_wall), Some(random_door(&mut rng)))?;
        }
    }

    let target = place_in_random_room(&mut world, &rooms, &mut rng, WorldObject::ball(Color::Red), "red ball")?;
    for _ in 0..config.num_distractors {
        let kind = match rng.random_range(0..3_u8) {
            0 => ObjectKind::Key,
            1 => ObjectKind::Ball,
            _ => ObjectKind::Box,
        };
        let distractor = WorldObject::new(kind, Color::Grey);
        place_in_random_room(&mut world, &rooms, &mut rng, distractor, "distractor")?;
    }

    let agent_pos = random_free_cell(&world, &rooms, &mut rng, "agent")?;
    let agent_dir = Direction::from_index(rng.random_range(0..4_u8)).unwrap_or(Direction::East);
    world.place_agent(agent_pos, agent_dir)?;

    world.set_mission(Instruction::go_to(ObjectDescriptor::new(
        ObjectKind::Ball,
        Some(Color::Red),
    )));
    debug!(
        seed,
        width,
        height,
        target = %target,
        agent = %agent_pos,
        "generated go-to-red-ball scenario"
    );
    Ok(world)
}

fn random_door(rng: &mut StdRng) -> WorldObject {
    let idx = rng.random_range(0..Color::ALL.len());
    let color = Color::ALL.get(idx).copied().unwrap_or(Color::Grey);
    WorldObject::door(color, false, false)
}

/// Place `object` on a free interior cell that does not touch a door, so
/// objects never block a doorway.
fn place_in_random_room(
    world: &mut GridWorld,
    rooms: &[Room],
    rng: &mut StdRng,
    object: WorldObject,
    what: &str,
) -> Result<GridPosition, WorldError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = random_room_cell(rooms, rng);
        let touches_door = pos
            .neighbors()
            .iter()
            .any(|n| world.cell(*n).is_some_and(WorldObject::is_door));
        if world.cell(pos).is_none() && !touches_door {
            world.set_cell(pos, Some(object))?;
            return Ok(pos);
        }
    }
    Err(WorldError::PlacementFailed {
        what: what.to_owned(),
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

fn random_free_cell(
    world: &GridWorld,
    rooms: &[Room],
    rng: &mut StdRng,
    what: &str,
) -> Result<GridPosition, WorldError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = random_room_cell(rooms, rng);
        if world.cell(pos).is_none() {
            return Ok(pos);
        }
    }
    Err(WorldError::PlacementFailed {
        what: what.to_owned(),
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

fn random_room_cell(rooms: &[Room], rng: &mut StdRng) -> GridPosition {
    let idx = rng.random_range(0..rooms.len().max(1));
    rooms
        .get(idx)
        .map_or(GridPosition::new(1, 1), |room| room.random_interior(rng))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::map::render_map;

    #[test]
    fn same_seed_same_world() {
        let config = ScenarioConfig::default();
        let a = generate_go_to_red_ball(&config, 7).unwrap();
        let b = generate_go_to_red_ball(&config, 7).unwrap();
        assert_eq!(render_map(&a), render_map(&b));
    }

    #[test]
    fn single_room_has_ball_and_distractors() {
        let config = ScenarioConfig::default();
        let world = generate_go_to_red_ball(&config, 3).unwrap();
        assert_eq!((world.width(), world.height()), (8, 8));
        let red = ObjectDescriptor::new(ObjectKind::Ball, Some(Color::Red));
        assert_eq!(world.resolve(red).len(), 1);
        let grey = world
            .objects()
            .filter(|(_, obj)| obj.color == Color::Grey && !obj.is_wall())
            .count();
        assert_eq!(grey, 7);
        assert!(world.mission().is_some());
    }

    #[test]
    fn multi_room_layout_has_doors() {
        let config = ScenarioConfig {
            room_size: 6,
            num_rows: 2,
            num_cols: 3,
            num_distractors: 2,
        };
        let world = generate_go_to_red_ball(&config, 11).unwrap();
        assert_eq!((world.width(), world.height()), (16, 11));
        let doors = world.objects().filter(|(_, obj)| obj.is_door()).count();
        // Two rows of two east doors plus three south doors.
        assert_eq!(doors, 7);
        assert!(world.objects().all(|(_, obj)| !obj.is_open_door()));
    }

    #[test]
    fn rejects_degenerate_rooms() {
        let config = ScenarioConfig {
            room_size: 3,
            ..ScenarioConfig::default()
        };
        assert!(generate_go_to_red_ball(&config, 0).is_err());
    }

    #[test]
    fn overcrowded_rooms_fail() {
        let config = ScenarioConfig {
            room_size: 4,
            num_distractors: 10,
            ..ScenarioConfig::default()
        };
        assert!(matches!(
            generate_go_to_red_ball(&config, 1),
            Err(WorldError::PlacementFailed { .. })
        ));
    }
}
