//! The grid world: an occupancy grid, the agent pose, and the carried object.
//!
//! [`GridWorld`] is the authoritative world model the planner reads through
//! [`WorldView`] and the episode driver mutates through [`GridWorld::step`].
//! Cells hold at most one [`WorldObject`]; the agent stands on an empty cell
//! or an open door and carries at most one object.
//!
//! # Action semantics
//!
//! | Action    | Effect |
//! |-----------|--------|
//! | `left`    | Rotate counter-clockwise |
//! | `right`   | Rotate clockwise |
//! | `forward` | Step into the forward cell if it is empty or an open door |
//! | `pickup`  | Take the key/ball/box in the forward cell if the hand is free |
//! | `drop`    | Put the carried object into the empty forward cell |
//! | `toggle`  | Open/close a door; unlock a locked door with the matching key; opening a box destroys it |
//! | `done`    | No effect on the world |

use babybot_types::{
    Action, Direction, GridPosition, Instruction, ObjectKind, WorldObject, WorldView,
    is_steppable,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::verifier::MissionProgress;

/// Side length of the agent's square egocentric view.
pub const AGENT_VIEW_SIZE: i32 = 7;

/// The outcome of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Reward earned by this step (non-zero only on mission success).
    pub reward: f64,
    /// The mission was accomplished by this step.
    pub terminated: bool,
    /// The step limit was reached.
    pub truncated: bool,
}

/// A rectangular grid world with a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    /// Grid width in cells.
    width: i32,
    /// Grid height in cells.
    height: i32,
    /// Row-major cell contents.
    cells: Vec<Option<WorldObject>>,
    /// Agent position.
    agent_pos: GridPosition,
    /// Agent facing.
    agent_dir: Direction,
    /// Object in the agent's hand.
    carrying: Option<WorldObject>,
    /// Number of actions applied so far.
    step_count: u32,
    /// Step budget; reaching it truncates the episode.
    max_steps: u32,
    /// Mission progress tracker, if a mission is set.
    mission: Option<MissionProgress>,
}

impl GridWorld {
    /// Create an empty grid with the agent at the origin, facing east.
    ///
    /// The default step budget is `4 * width * height`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is below 3.
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width < 3 || height < 3 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        let area = width
            .checked_mul(height)
            .and_then(|a| usize::try_from(a).ok())
            .ok_or(WorldError::InvalidDimensions { width, height })?;
        let max_steps = u32::try_from(width.saturating_mul(height).saturating_mul(4))
            .unwrap_or(u32::MAX);
        Ok(Self {
            width,
            height,
            cells: vec![None; area],
            agent_pos: GridPosition::new(0, 0),
            agent_dir: Direction::East,
            carrying: None,
            step_count: 0,
            max_steps,
            mission: None,
        })
    }

    /// Create a grid whose outer border is walled.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is below 3.
    pub fn walled(width: i32, height: i32) -> Result<Self, WorldError> {
        let mut world = Self::new(width, height)?;
        world.wall_rect(GridPosition::new(0, 0), width, height)?;
        Ok(world)
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let flat = pos.row.checked_mul(self.width)?.checked_add(pos.col)?;
        usize::try_from(flat).ok()
    }

    // -------------------------------------------------------------------
    // Construction helpers
    // -------------------------------------------------------------------

    /// Put `object` into the cell at `pos`, replacing its previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid.
    pub fn set_cell(&mut self, pos: GridPosition, object: Option<WorldObject>) -> Result<(), WorldError> {
        let idx = self.index(pos).ok_or(WorldError::OutOfBounds(pos))?;
        let slot = self.cells.get_mut(idx).ok_or(WorldError::OutOfBounds(pos))?;
        *slot = object;
        Ok(())
    }

    /// Place `object` at `pos` and return its identity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid.
    pub fn place(&mut self, pos: GridPosition, object: WorldObject) -> Result<babybot_types::ObjectId, WorldError> {
        self.set_cell(pos, Some(object))?;
        Ok(object.id)
    }

    /// Wall the outline of the rectangle with top-left corner `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the rectangle leaves the grid.
    pub fn wall_rect(&mut self, origin: GridPosition, width: i32, height: i32) -> Result<(), WorldError> {
        let right = origin.col.saturating_add(width).saturating_sub(1);
        let bottom = origin.row.saturating_add(height).saturating_sub(1);
        for col in origin.col..=right {
            self.set_cell(GridPosition::new(col, origin.row), Some(WorldObject::wall()))?;
            self.set_cell(GridPosition::new(col, bottom), Some(WorldObject::wall()))?;
        }
        for row in origin.row..=bottom {
            self.set_cell(GridPosition::new(origin.col, row), Some(WorldObject::wall()))?;
            self.set_cell(GridPosition::new(right, row), Some(WorldObject::wall()))?;
        }
        Ok(())
    }

    /// Place the agent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid, or
    /// [`WorldError::CellOccupied`] if the cell is not steppable.
    pub fn place_agent(&mut self, pos: GridPosition, dir: Direction) -> Result<(), WorldError> {
        if !self.contains(pos) {
            return Err(WorldError::OutOfBounds(pos));
        }
        if !is_steppable(self.cell(pos)) {
            return Err(WorldError::CellOccupied(pos));
        }
        self.agent_pos = pos;
        self.agent_dir = dir;
        Ok(())
    }

    /// Put `object` into the agent's hand (or empty it).
    pub const fn set_carrying(&mut self, object: Option<WorldObject>) {
        self.carrying = object;
    }

    /// Set the mission and reset its progress.
    pub fn set_mission(&mut self, instruction: Instruction) {
        self.mission = Some(MissionProgress::new(instruction));
    }

    /// Set the step budget.
    pub const fn set_max_steps(&mut self, max_steps: u32) {
        self.max_steps = max_steps;
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The current mission, if any.
    pub fn mission(&self) -> Option<&Instruction> {
        self.mission.as_ref().map(MissionProgress::instruction)
    }

    /// Whether the mission has been accomplished.
    pub fn mission_succeeded(&self) -> bool {
        self.mission.as_ref().is_some_and(MissionProgress::is_complete)
    }

    /// Number of actions applied so far.
    pub const fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Step budget.
    pub const fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Iterate over all occupied cells in row-major order.
    pub fn objects(&self) -> impl Iterator<Item = (GridPosition, &WorldObject)> {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            let obj = cell.as_ref()?;
            let flat = i32::try_from(idx).ok()?;
            Some((GridPosition::new(flat.checked_rem(width)?, flat.checked_div(width)?), obj))
        })
    }

    fn cell_mut(&mut self, pos: GridPosition) -> Option<&mut Option<WorldObject>> {
        let idx = self.index(pos)?;
        self.cells.get_mut(idx)
    }

    // -------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------

    /// Apply one primitive action and advance the step counter.
    ///
    /// Actions that cannot take effect (walking into a wall, picking up with
    /// a full hand, toggling a locked door without its key) are no-ops.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        self.step_count = self.step_count.saturating_add(1);
        let carried_before = self.carrying.map(|obj| obj.id);
        let front = self.front_pos();

        match action {
            Action::Left => self.agent_dir = self.agent_dir.turned_left(),
            Action::Right => self.agent_dir = self.agent_dir.turned_right(),
            Action::Forward => {
                if self.contains(front) && is_steppable(self.cell(front)) {
                    self.agent_pos = front;
                }
            }
            Action::Pickup => {
                if self.carrying.is_none()
                    && let Some(slot) = self.cell_mut(front)
                    && slot.is_some_and(|obj| obj.kind.is_portable())
                {
                    self.carrying = slot.take();
                }
            }
            Action::Drop => {
                let held = self.carrying;
                if held.is_some()
                    && let Some(slot) = self.cell_mut(front)
                    && slot.is_none()
                {
                    *slot = held;
                    self.carrying = None;
                }
            }
            Action::Toggle => self.toggle_front(front),
            Action::Done => {}
        }

        let mut outcome = StepOutcome {
            reward: 0.0,
            terminated: false,
            truncated: false,
        };

        let completed = match self.mission.take() {
            Some(mut progress) => {
                let done = progress.verify(self, action, carried_before);
                self.mission = Some(progress);
                done
            }
            None => false,
        };

        if completed {
            outcome.terminated = true;
            outcome.reward = self.success_reward();
            debug!(step = self.step_count, reward = outcome.reward, "mission accomplished");
        }
        if self.step_count >= self.max_steps {
            outcome.truncated = true;
        }
        outcome
    }

    fn toggle_front(&mut self, front: GridPosition) {
        let key = self.carrying;
        let Some(slot) = self.cell_mut(front) else {
            return;
        };
        let Some(obj) = slot.as_mut() else {
            return;
        };
        match obj.kind {
            ObjectKind::Door => {
                if obj.is_locked {
                    if key.is_some_and(|k| k.unlocks(obj)) {
                        obj.is_locked = false;
                        obj.is_open = true;
                    }
                } else {
                    obj.is_open = !obj.is_open;
                }
            }
            ObjectKind::Box => {
                // Boxes hold nothing in these worlds; opening one removes it.
                *slot = None;
            }
            ObjectKind::Wall | ObjectKind::Key | ObjectKind::Ball => {}
        }
    }

    /// Reward for accomplishing the mission at the current step count.
    fn success_reward(&self) -> f64 {
        if self.max_steps == 0 {
            return 1.0;
        }
        let used = f64::from(self.step_count) / f64::from(self.max_steps);
        0.9f64.mul_add(-used, 1.0)
    }
}

impl WorldView for GridWorld {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell(&self, pos: GridPosition) -> Option<&WorldObject> {
        let idx = self.index(pos)?;
        self.cells.get(idx)?.as_ref()
    }

    fn agent_pos(&self) -> GridPosition {
        self.agent_pos
    }

    fn agent_dir(&self) -> Direction {
        self.agent_dir
    }

    fn carrying(&self) -> Option<&WorldObject> {
        self.carrying.as_ref()
    }

    /// The view is a 7x7 square extending 6 cells ahead of the agent and 3
    /// cells to either side.
    fn in_view(&self, pos: GridPosition) -> bool {
        let ahead = AGENT_VIEW_SIZE.saturating_sub(1);
        let half = AGENT_VIEW_SIZE / 2;
        let GridPosition { col: ax, row: ay } = self.agent_pos;
        let (top_col, top_row) = match self.agent_dir {
            Direction::East => (ax, ay.saturating_sub(half)),
            Direction::South => (ax.saturating_sub(half), ay),
            Direction::West => (ax.saturating_sub(ahead), ay.saturating_sub(half)),
            Direction::North => (ax.saturating_sub(half), ay.saturating_sub(ahead)),
        };
        let bottom_col = top_col.saturating_add(AGENT_VIEW_SIZE);
        let bottom_row = top_row.saturating_add(AGENT_VIEW_SIZE);
        (top_col..bottom_col).contains(&pos.col) && (top_row..bottom_row).contains(&pos.row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use babybot_types::{Color, ObjectDescriptor};

    use super::*;

    fn room() -> GridWorld {
        let mut world = GridWorld::walled(7, 7).unwrap();
        world.place_agent(GridPosition::new(1, 1), Direction::East).unwrap();
        world
    }

    #[test]
    fn rejects_tiny_grids() {
        assert!(GridWorld::new(2, 5).is_err());
        assert!(GridWorld::new(5, 5).is_ok());
    }

    #[test]
    fn forward_stops_at_walls() {
        let mut world = room();
        world.place_agent(GridPosition::new(5, 1), Direction::East).unwrap();
        world.step(Action::Forward);
        assert_eq!(world.agent_pos(), GridPosition::new(5, 1));
        world.step(Action::Right);
        world.step(Action::Forward);
        assert_eq!(world.agent_pos(), GridPosition::new(5, 2));
        assert_eq!(world.agent_dir(), Direction::South);
    }

    #[test]
    fn pickup_and_drop_move_objects() {
        let mut world = room();
        let ball = world.place(GridPosition::new(2, 1), WorldObject::ball(Color::Red)).unwrap();
        world.step(Action::Pickup);
        assert_eq!(world.carrying().map(|o| o.id), Some(ball));
        assert!(world.cell(GridPosition::new(2, 1)).is_none());

        world.step(Action::Right);
        world.step(Action::Drop);
        assert!(world.carrying().is_none());
        assert_eq!(world.cell(GridPosition::new(1, 2)).map(|o| o.id), Some(ball));
    }

    #[test]
    fn pickup_requires_free_hand() {
        let mut world = room();
        world.set_carrying(Some(WorldObject::key(Color::Blue)));
        world.place(GridPosition::new(2, 1), WorldObject::ball(Color::Red)).unwrap();
        world.step(Action::Pickup);
        assert_eq!(world.carrying().map(|o| o.kind), Some(ObjectKind::Key));
        assert!(world.cell(GridPosition::new(2, 1)).is_some());
    }

    #[test]
    fn drop_needs_an_empty_front_cell() {
        let mut world = room();
        let key = WorldObject::key(Color::Blue);
        world.set_carrying(Some(key));
        let ball = world.place(GridPosition::new(2, 1), WorldObject::ball(Color::Red)).unwrap();

        world.step(Action::Drop);
        assert_eq!(world.carrying().map(|o| o.id), Some(key.id));
        assert_eq!(world.cell(GridPosition::new(2, 1)).map(|o| o.id), Some(ball));

        // North of (1, 1) is the outer wall.
        world.step(Action::Left);
        world.step(Action::Drop);
        assert_eq!(world.carrying().map(|o| o.id), Some(key.id));
        assert_eq!(world.cell(GridPosition::new(1, 0)).map(|o| o.kind), Some(ObjectKind::Wall));

        world.step(Action::Left);
        world.step(Action::Drop);
        assert!(world.carrying().is_none());
        assert_eq!(world.cell(GridPosition::new(1, 2)).map(|o| o.id), Some(key.id));
    }

    #[test]
    fn locked_door_needs_matching_key() {
        let mut world = room();
        let door_pos = GridPosition::new(2, 1);
        world.place(door_pos, WorldObject::door(Color::Red, false, true)).unwrap();

        world.step(Action::Toggle);
        assert!(world.cell(door_pos).is_some_and(|d| d.is_locked));

        world.set_carrying(Some(WorldObject::key(Color::Blue)));
        world.step(Action::Toggle);
        assert!(world.cell(door_pos).is_some_and(|d| d.is_locked));

        world.set_carrying(Some(WorldObject::key(Color::Red)));
        world.step(Action::Toggle);
        assert!(world.cell(door_pos).is_some_and(|d| !d.is_locked && d.is_open));
        // The key is not consumed.
        assert!(world.carrying().is_some());

        world.step(Action::Forward);
        assert_eq!(world.agent_pos(), door_pos);
    }

    #[test]
    fn toggling_a_box_destroys_it() {
        let mut world = room();
        world.place(GridPosition::new(2, 1), WorldObject::boxed(Color::Green)).unwrap();
        world.step(Action::Toggle);
        assert!(world.cell(GridPosition::new(2, 1)).is_none());
    }

    #[test]
    fn view_box_extends_ahead() {
        let mut world = GridWorld::new(20, 20).unwrap();
        world.place_agent(GridPosition::new(10, 10), Direction::North).unwrap();
        assert!(world.in_view(GridPosition::new(10, 4)));
        assert!(!world.in_view(GridPosition::new(10, 3)));
        assert!(world.in_view(GridPosition::new(13, 10)));
        assert!(!world.in_view(GridPosition::new(14, 10)));
        assert!(!world.in_view(GridPosition::new(10, 11)));
    }

    #[test]
    fn go_to_mission_rewards_and_terminates() {
        let mut world = room();
        world.place(GridPosition::new(3, 1), WorldObject::ball(Color::Red)).unwrap();
        world.set_mission(Instruction::go_to(ObjectDescriptor::new(
            ObjectKind::Ball,
            Some(Color::Red),
        )));
        let first = world.step(Action::Left);
        assert!(!first.terminated);
        world.step(Action::Right);
        let outcome = world.step(Action::Forward);
        assert!(outcome.terminated);
        assert!(outcome.reward > 0.0 && outcome.reward < 1.0);
        assert!(world.mission_succeeded());
    }

    #[test]
    fn step_limit_truncates() {
        let mut world = room();
        world.set_max_steps(2);
        assert!(!world.step(Action::Left).truncated);
        assert!(world.step(Action::Left).truncated);
    }

    #[test]
    fn objects_iterates_with_positions() {
        let mut world = GridWorld::new(4, 3).unwrap();
        world.place(GridPosition::new(3, 2), WorldObject::key(Color::Red)).unwrap();
        let found: Vec<GridPosition> = world.objects().map(|(pos, _)| pos).collect();
        assert_eq!(found, vec![GridPosition::new(3, 2)]);
    }
}
