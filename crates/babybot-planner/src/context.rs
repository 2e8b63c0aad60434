//! Per-tick planning context.
//!
//! The world does not change while the planner thinks, so the agent's pose
//! is captured once per tick into an [`AgentSnapshot`] and shared by every
//! subgoal consulted during that tick. The previous tick's snapshot is kept
//! by the controller and lets subgoals tell whether the last action had any
//! effect.

use babybot_types::{Direction, GridPosition, ObjectDescriptor, Offset, WorldObject, WorldView};
use serde::{Deserialize, Serialize};

use crate::locator;
use crate::pathfinder::{self, BfsStats, Blockers, Path, VisibilityMask};
use crate::stack::PlanStack;
use crate::subgoal::Subgoal;

/// The agent's pose and surroundings at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Agent cell.
    pub pos: GridPosition,
    /// Facing direction.
    pub dir: Direction,
    /// The cell in front of the agent.
    pub fwd_pos: GridPosition,
    /// Contents of the cell in front of the agent.
    pub fwd_cell: Option<WorldObject>,
    /// The carried object.
    pub carrying: Option<WorldObject>,
}

impl AgentSnapshot {
    /// Read the agent's current state from `world`.
    pub fn capture<W: WorldView>(world: &W) -> Self {
        let pos = world.agent_pos();
        let dir = world.agent_dir();
        let fwd_pos = pos.offset(dir.vector());
        Self {
            pos,
            dir,
            fwd_pos,
            fwd_cell: world.cell(fwd_pos).copied(),
            carrying: world.carrying().copied(),
        }
    }

    /// Unit vector to the agent's right.
    pub const fn right_vec(&self) -> Offset {
        self.dir.right_vector()
    }

    /// The door in front of the agent, if any.
    pub fn fwd_door(&self) -> Option<WorldObject> {
        self.fwd_cell.filter(WorldObject::is_door)
    }
}

/// Everything a subgoal may read or change while planning one tick.
pub(crate) struct Planning<'a, W: WorldView> {
    pub world: &'a W,
    pub agent: &'a AgentSnapshot,
    /// Snapshot taken at the end of the previous tick; `None` on the first.
    pub memory: Option<&'a AgentSnapshot>,
    pub mask: &'a VisibilityMask,
    pub stats: &'a mut BfsStats,
    pub stack: &'a mut PlanStack,
}

impl<W: WorldView> Planning<'_, W> {
    pub fn push(&mut self, subgoal: Subgoal) {
        self.stack.push(subgoal);
    }

    pub fn pop(&mut self) {
        let _ = self.stack.pop();
    }

    pub fn find_drop_pos(&mut self, except: Option<GridPosition>) -> Option<GridPosition> {
        pathfinder::find_drop_pos(self.world, self.mask, self.stats, except)
    }

    pub fn find_obj_pos(
        &mut self,
        desc: ObjectDescriptor,
        adjacent: bool,
    ) -> Option<(WorldObject, GridPosition)> {
        locator::find_obj_pos(self.world, self.mask, self.stats, desc, adjacent)
    }

    /// A path to `target` that takes at least one step, crossing blockers
    /// only when there is no free path.
    pub fn path_to(&mut self, target: GridPosition) -> Option<Path> {
        let accept = |pos: GridPosition, _: Option<&WorldObject>| pos == target;
        pathfinder::shortest_path(self.world, self.mask, self.stats, &accept, Blockers::Fallback, None)
            .filter(|path| !path.is_empty())
    }

    /// Closest wall or door from the agent along `dir`.
    pub fn wall_distance(&self, dir: Offset) -> u32 {
        pathfinder::closest_wall_or_door(self.world, self.agent.pos, dir)
    }

    /// Whether the agent could step onto `pos`. Cells outside the grid never
    /// qualify.
    pub fn steppable(&self, pos: GridPosition) -> bool {
        self.world.contains(pos) && babybot_types::is_steppable(self.world.cell(pos))
    }
}
