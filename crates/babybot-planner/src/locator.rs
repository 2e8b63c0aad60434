//! Choosing which matching object to go to.

use babybot_types::{GridPosition, ObjectDescriptor, ObjectKind, WorldObject, WorldView};

use crate::pathfinder::{BfsStats, Blockers, VisibilityMask, shortest_path};

/// Lower bound on the extra steps needed to move a blocker out of the way
/// with empty hands: pick up, turn, drop, turn back.
const BLOCKER_PENALTY_EMPTY_HANDED: usize = 4;

/// Lower bound when the agent first has to put down what it carries.
const BLOCKER_PENALTY_CARRYING: usize = 7;

/// Sentinel distance; anything reachable scores below it.
const UNREACHABLE: usize = 999;

/// Find the closest observed, reachable object matching `desc`.
///
/// Distances are path lengths, plus a penalty when the path crosses
/// blockers. Standing on a matching cell scores 2 (3 when `adjacent`);
/// with `adjacent`, a match exactly one step away also scores 3, since the
/// agent must face a free neighbor of the object rather than the object
/// itself. Ties go to the first candidate in registry order.
///
/// Searches for a colored key treat locked doors of that color as walls:
/// the key behind its own door is useless.
pub fn find_obj_pos<W: WorldView>(
    world: &W,
    mask: &VisibilityMask,
    stats: &mut BfsStats,
    desc: ObjectDescriptor,
    adjacent: bool,
) -> Option<(WorldObject, GridPosition)> {
    let penalty = if world.carrying().is_some() {
        BLOCKER_PENALTY_CARRYING
    } else {
        BLOCKER_PENALTY_EMPTY_HANDED
    };
    let locked_color = if desc.kind == ObjectKind::Key {
        desc.color
    } else {
        None
    };

    let mut best_distance = UNREACHABLE;
    let mut best = None;

    for (obj, obj_pos) in world.resolve(desc) {
        if obj.is_wall() || !mask.is_visible(obj_pos) {
            continue;
        }
        let accept = |pos: GridPosition, _: Option<&WorldObject>| pos == obj_pos;
        let Some(path) = shortest_path(world, mask, stats, &accept, Blockers::Fallback, locked_color)
        else {
            continue;
        };

        let mut distance = path.len();
        if path.with_blockers {
            distance = distance.saturating_add(penalty);
        }
        if distance == 0 {
            distance = if adjacent { 3 } else { 2 };
        }
        if adjacent && distance == 1 {
            distance = 3;
        }

        if distance < best_distance {
            best_distance = distance;
            best = Some((obj, obj_pos));
        }
    }

    best
}
