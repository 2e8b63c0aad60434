//! Read-only view of a grid world.
//!
//! The planner never mutates the world. It reads cell contents, the agent
//! pose, and the carried object through [`WorldView`], and hands its chosen
//! [`Action`](crate::Action) back to whoever drives the simulation.

use crate::geometry::{Direction, GridPosition};
use crate::ids::ObjectId;
use crate::objects::{ObjectDescriptor, WorldObject};

/// Queries the planner issues against the world model.
pub trait WorldView {
    /// Grid width in cells.
    fn width(&self) -> i32;

    /// Grid height in cells.
    fn height(&self) -> i32;

    /// Contents of the cell at `pos`; `None` for empty or out-of-bounds cells.
    fn cell(&self, pos: GridPosition) -> Option<&WorldObject>;

    /// Current agent position.
    fn agent_pos(&self) -> GridPosition;

    /// Current agent facing.
    fn agent_dir(&self) -> Direction;

    /// The object in the agent's hand, if any.
    fn carrying(&self) -> Option<&WorldObject>;

    /// Whether `pos` lies inside the agent's current field of view.
    fn in_view(&self, pos: GridPosition) -> bool;

    /// Whether `pos` lies inside the grid.
    fn contains(&self, pos: GridPosition) -> bool {
        pos.col >= 0 && pos.row >= 0 && pos.col < self.width() && pos.row < self.height()
    }

    /// The cell directly in front of the agent.
    fn front_pos(&self) -> GridPosition {
        self.agent_pos().offset(self.agent_dir().vector())
    }

    /// All objects on the grid matching `desc`, with their positions, in
    /// registry order (column-major: all rows of column 0, then column 1).
    ///
    /// The carried object is not on the grid and is never returned.
    fn resolve(&self, desc: ObjectDescriptor) -> Vec<(WorldObject, GridPosition)> {
        let mut found = Vec::new();
        for col in 0..self.width() {
            for row in 0..self.height() {
                let pos = GridPosition::new(col, row);
                if let Some(obj) = self.cell(pos)
                    && desc.matches(obj)
                {
                    found.push((*obj, pos));
                }
            }
        }
        found
    }

    /// Current position of the object with the given identity, or `None`
    /// if it is carried or no longer exists.
    fn locate(&self, id: ObjectId) -> Option<GridPosition> {
        for col in 0..self.width() {
            for row in 0..self.height() {
                let pos = GridPosition::new(col, row);
                if self.cell(pos).is_some_and(|obj| obj.id == id) {
                    return Some(pos);
                }
            }
        }
        None
    }
}
