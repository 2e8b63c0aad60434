//! Subgoals: the units of the hierarchical plan.
//!
//! A [`Subgoal`] is a small `Copy` value: a kind, an optional target, and an
//! optional reason. Behavior is a `match` on the kind. Each tick the active
//! subgoal first reacts to the action that was actually executed, then
//! either proposes a primitive action or rewrites the plan stack and asks to
//! be consulted again.
//!
//! Subgoals never hold references to each other or to the world. Targets
//! are positions, descriptors that are re-resolved on every use, or object
//! identities that are looked up on every use.

use std::fmt;

use babybot_types::{
    Action, GridPosition, ObjectDescriptor, ObjectId, ObjectKind, WorldObject, WorldView,
    carries_key_for,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Planning;
use crate::error::PlannerError;
use crate::pathfinder::{Blockers, Path, shortest_path};

/// What a subgoal tries to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubgoalKind {
    /// Stand next to a target and face it.
    GoNextTo,
    /// Pick up the object in front.
    Pickup,
    /// Drop the carried object in front.
    Drop,
    /// Open the door in front.
    Open,
    /// Close the door in front.
    Close,
    /// Find a closed door and open it.
    Explore,
}

impl SubgoalKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::GoNextTo,
        Self::Pickup,
        Self::Drop,
        Self::Open,
        Self::Close,
        Self::Explore,
    ];

    /// Parse a name produced by [`as_str`](Self::as_str). Exact match.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Name used in subgoal plan text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoNextTo => "GoNextToSubgoal",
            Self::Pickup => "PickupSubgoal",
            Self::Drop => "DropSubgoal",
            Self::Open => "OpenSubgoal",
            Self::Close => "CloseSubgoal",
            Self::Explore => "ExploreSubgoal",
        }
    }
}

/// Where a [`SubgoalKind::GoNextTo`] goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A fixed cell.
    Position(GridPosition),
    /// The closest reachable object matching a description, chosen afresh
    /// each tick.
    Descriptor(ObjectDescriptor),
    /// One particular object, wherever it is now.
    Object(ObjectId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(pos) => write!(f, "{pos}"),
            Self::Descriptor(desc) => write!(f, "{desc}"),
            Self::Object(id) => write!(f, "object {id}"),
        }
    }
}

/// Why a subgoal was created. Changes how some subgoals behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    /// Going to a door in order to open it.
    Open,
    /// Going to face a free cell next to the target, to put something there.
    PutNext,
    /// Going somewhere only to look around.
    Explore,
    /// Opening a locked door with a key that should be kept afterwards.
    KeepKey,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::PutNext => "PutNext",
            Self::Explore => "Explore",
            Self::KeepKey => "KeepKey",
        };
        f.write_str(name)
    }
}

/// One entry of the plan stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subgoal {
    /// What to do.
    pub kind: SubgoalKind,
    /// Where to go. Only used by [`SubgoalKind::GoNextTo`].
    pub target: Option<Target>,
    /// Why this subgoal exists.
    pub reason: Option<Reason>,
}

impl fmt::Display for Subgoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.kind.as_str())?;
        if let Some(target) = &self.target {
            write!(f, ": {target}")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ", reason: {reason}")?;
        }
        f.write_str(")")
    }
}

impl Subgoal {
    const fn of(kind: SubgoalKind) -> Self {
        Self {
            kind,
            target: None,
            reason: None,
        }
    }

    /// Go next to `target` and face it.
    pub const fn go_next_to(target: Target, reason: Option<Reason>) -> Self {
        Self {
            kind: SubgoalKind::GoNextTo,
            target: Some(target),
            reason,
        }
    }

    /// Go next to the cell at `pos`.
    pub const fn go_to_pos(pos: GridPosition) -> Self {
        Self::go_next_to(Target::Position(pos), None)
    }

    /// Pick up whatever is in front.
    pub const fn pickup() -> Self {
        Self::of(SubgoalKind::Pickup)
    }

    /// Drop the carried object in front.
    pub const fn drop() -> Self {
        Self::of(SubgoalKind::Drop)
    }

    /// Open the door in front.
    pub const fn open(reason: Option<Reason>) -> Self {
        Self {
            reason,
            ..Self::of(SubgoalKind::Open)
        }
    }

    /// Close the door in front.
    pub const fn close() -> Self {
        Self::of(SubgoalKind::Close)
    }

    /// Look for a closed door to open.
    pub const fn explore() -> Self {
        Self::of(SubgoalKind::Explore)
    }

    /// Whether the controller may discard this subgoal once control returns
    /// to it. Exploration is speculative and is re-derived when needed.
    pub fn is_exploratory(self) -> bool {
        match self.kind {
            SubgoalKind::Explore => true,
            SubgoalKind::GoNextTo => self.reason == Some(Reason::Explore),
            SubgoalKind::Pickup | SubgoalKind::Drop | SubgoalKind::Open | SubgoalKind::Close => {
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    /// Propose the next primitive action, or rewrite the stack and return
    /// `None` to have the new top consulted in the same tick.
    pub(crate) fn plan_next_action<W: WorldView>(
        self,
        ctx: &mut Planning<'_, W>,
    ) -> Result<Option<Action>, PlannerError> {
        match self.kind {
            SubgoalKind::GoNextTo => Ok(self.plan_go_next_to(ctx)),
            SubgoalKind::Pickup => Ok(Self::plan_pickup(ctx)),
            SubgoalKind::Drop => Ok(Self::plan_drop(ctx)),
            SubgoalKind::Open => Ok(Self::plan_open(ctx)),
            SubgoalKind::Close => Ok(Self::plan_close(ctx)),
            SubgoalKind::Explore => Self::plan_explore(ctx),
        }
    }

    fn plan_close<W: WorldView>(ctx: &mut Planning<'_, W>) -> Option<Action> {
        if ctx.agent.fwd_cell.is_some_and(|cell| cell.is_open_door()) {
            return Some(Action::Toggle);
        }
        ctx.pop();
        None
    }

    fn plan_drop<W: WorldView>(ctx: &mut Planning<'_, W>) -> Option<Action> {
        if ctx.agent.carrying.is_none() || ctx.agent.fwd_cell.is_some() {
            ctx.pop();
            return None;
        }
        Some(Action::Drop)
    }

    fn plan_pickup<W: WorldView>(ctx: &mut Planning<'_, W>) -> Option<Action> {
        if ctx.agent.carrying.is_none() {
            return Some(Action::Pickup);
        }
        // Hands are full: put the current object somewhere and come back.
        let Some(drop_pos) = ctx.find_drop_pos(None) else {
            ctx.push(Self::explore());
            return None;
        };
        ctx.push(Self::go_to_pos(ctx.agent.fwd_pos));
        ctx.push(Self::drop());
        ctx.push(Self::go_to_pos(drop_pos));
        None
    }

    fn plan_open<W: WorldView>(ctx: &mut Planning<'_, W>) -> Option<Action> {
        let Some(door) = ctx.agent.fwd_door() else {
            ctx.pop();
            return None;
        };

        let carrying = ctx.agent.carrying;
        if door.is_locked && !carries_key_for(carrying.as_ref(), &door) {
            let key = ObjectDescriptor::new(ObjectKind::Key, Some(door.color));
            let door_pos = ctx.agent.fwd_pos;
            if carrying.is_some() {
                let Some(drop_pos) = ctx.find_drop_pos(None) else {
                    ctx.push(Self::explore());
                    return None;
                };
                ctx.pop();
                // Last to first: take the stashed object back, open the
                // door, fetch the key, stash what we hold.
                ctx.push(Self::pickup());
                ctx.push(Self::go_to_pos(drop_pos));
                ctx.push(Self::open(None));
                ctx.push(Self::go_to_pos(door_pos));
                ctx.push(Self::pickup());
                ctx.push(Self::go_next_to(Target::Descriptor(key), None));
                ctx.push(Self::drop());
                ctx.push(Self::go_to_pos(drop_pos));
            } else {
                ctx.pop();
                ctx.push(Self::open(None));
                ctx.push(Self::go_to_pos(door_pos));
                ctx.push(Self::pickup());
                ctx.push(Self::go_next_to(Target::Descriptor(key), None));
            }
            debug!(door = %door_pos, color = %door.color, "locked door, fetching key");
            return None;
        }

        if door.is_open {
            ctx.push(Self::close());
            return None;
        }
        Some(Action::Toggle)
    }

    fn plan_explore<W: WorldView>(ctx: &mut Planning<'_, W>) -> Result<Option<Action>, PlannerError> {
        let closed_unlocked = |_: GridPosition, cell: Option<&WorldObject>| {
            cell.is_some_and(|obj| obj.is_door() && !obj.is_locked && !obj.is_open)
        };
        let closed = |_: GridPosition, cell: Option<&WorldObject>| {
            cell.is_some_and(|obj| obj.is_door() && !obj.is_open)
        };

        // Unlocked doors first: a locked one may send us back here through
        // its own key search.
        let found = shortest_path(ctx.world, ctx.mask, ctx.stats, &closed_unlocked, Blockers::Fallback, None)
            .or_else(|| shortest_path(ctx.world, ctx.mask, ctx.stats, &closed, Blockers::Fallback, None));
        let Some(door) = found.and_then(|path| ctx.world.cell(path.finish).copied()) else {
            return Err(PlannerError::NothingToExplore);
        };

        let reason = if door.is_locked && carries_key_for(ctx.agent.carrying.as_ref(), &door) {
            Some(Reason::KeepKey)
        } else {
            None
        };
        ctx.pop();
        ctx.push(Self::open(reason));
        ctx.push(Self::go_next_to(Target::Object(door.id), Some(Reason::Open)));
        Ok(None)
    }

    fn plan_go_next_to<W: WorldView>(self, ctx: &mut Planning<'_, W>) -> Option<Action> {
        let agent = *ctx.agent;
        let put_next = self.reason == Some(Reason::PutNext);
        let (target_obj, target_pos) = self.resolve_target(ctx)?;

        // Heading for a locked door with free hands: fetch its key first,
        // then come back to this very door.
        if self.reason == Some(Reason::Open)
            && let Some(door) = target_obj
            && door.is_door()
            && door.is_locked
            && agent.carrying.is_none()
        {
            let key = ObjectDescriptor::new(ObjectKind::Key, Some(door.color));
            ctx.pop();
            ctx.push(Self::go_next_to(Target::Object(door.id), Some(Reason::Open)));
            ctx.push(Self::pickup());
            ctx.push(Self::go_next_to(Target::Descriptor(key), None));
            return None;
        }

        // Standing where we should be facing: step off.
        if agent.pos.manhattan_distance(target_pos) == u32::from(put_next) {
            return Some(Self::step_off(ctx));
        }

        if put_next {
            if target_pos.manhattan_distance(agent.fwd_pos) == 1 {
                match agent.fwd_cell {
                    None => {
                        ctx.pop();
                        return None;
                    }
                    Some(cell) if cell.is_open_door() => {
                        // Nothing can be dropped in a doorway; go past it.
                        let beyond = agent.fwd_pos.offset(agent.dir.vector().scaled(2));
                        ctx.push(Self::go_to_pos(beyond));
                        return None;
                    }
                    Some(_) => {}
                }
            }
        } else if target_pos == agent.fwd_pos {
            ctx.pop();
            return None;
        }

        let Some(path) = ctx.path_to(target_pos) else {
            ctx.push(Self::explore());
            return None;
        };
        if self.interrupt_for_locked_door(ctx, &path, target_obj) {
            return None;
        }

        let next = path.next_cell()?;
        if next == agent.fwd_pos {
            return Self::step_into_front(ctx);
        }
        Some(Self::turn_towards(ctx, next))
    }

    /// Where the target is now. Returns `None` after rewriting the stack
    /// when the target cannot be found.
    fn resolve_target<W: WorldView>(
        self,
        ctx: &mut Planning<'_, W>,
    ) -> Option<(Option<WorldObject>, GridPosition)> {
        match self.target {
            Some(Target::Position(pos)) => Some((None, pos)),
            Some(Target::Descriptor(desc)) => {
                let adjacent = self.reason == Some(Reason::PutNext);
                let found = ctx.find_obj_pos(desc, adjacent);
                if found.is_none() {
                    ctx.push(Self::explore());
                }
                found.map(|(obj, pos)| (Some(obj), pos))
            }
            Some(Target::Object(id)) => {
                let world = ctx.world;
                let found = world
                    .locate(id)
                    .and_then(|pos| world.cell(pos).map(|obj| (Some(*obj), pos)));
                if found.is_none() {
                    // Carried away or destroyed: nothing left to go to.
                    ctx.pop();
                }
                found
            }
            None => {
                ctx.pop();
                None
            }
        }
    }

    /// Move off the current cell, preferring not to turn.
    fn step_off<W: WorldView>(ctx: &Planning<'_, W>) -> Action {
        let agent = ctx.agent;
        let right = agent.right_vec();
        if ctx.steppable(agent.fwd_pos) {
            Action::Forward
        } else if ctx.steppable(agent.pos.offset(right)) {
            Action::Right
        } else {
            // Turning left also covers the boxed-in case.
            Action::Left
        }
    }

    /// If the path crosses a locked door we hold no key for, replace this
    /// subgoal with: open that door, then retry. Only the first locked door
    /// on the path is considered.
    fn interrupt_for_locked_door<W: WorldView>(
        self,
        ctx: &mut Planning<'_, W>,
        path: &Path,
        target_obj: Option<WorldObject>,
    ) -> bool {
        let world = ctx.world;
        let carrying = ctx.agent.carrying;
        for &cell_pos in &path.cells {
            let Some(door) = world.cell(cell_pos).filter(|obj| obj.is_door() && obj.is_locked) else {
                continue;
            };
            if target_obj.is_some_and(|target| target.id == door.id) {
                continue;
            }
            if carries_key_for(carrying.as_ref(), door) {
                return false;
            }
            debug!(door = %cell_pos, subgoal = %self, "locked door on path");
            ctx.pop();
            ctx.push(self);
            ctx.push(Self::open(None));
            ctx.push(Self::go_next_to(Target::Object(door.id), Some(Reason::Open)));
            return true;
        }
        false
    }

    /// Turn towards `next`, a neighbor of the agent that is not in front.
    fn turn_towards<W: WorldView>(ctx: &Planning<'_, W>, next: GridPosition) -> Action {
        let agent = ctx.agent;
        let right = agent.right_vec();
        let delta = next.offset_from(agent.pos);
        if delta == right {
            return Action::Right;
        }
        if delta == right.reversed() {
            return Action::Left;
        }

        // The next cell is behind: turn towards the more open side.
        let distance_right = ctx.wall_distance(right);
        let distance_left = ctx.wall_distance(right.reversed());
        if distance_left > distance_right {
            Action::Left
        } else {
            Action::Right
        }
    }

    /// The path continues through the cell in front of the agent.
    fn step_into_front<W: WorldView>(ctx: &mut Planning<'_, W>) -> Option<Action> {
        let agent = *ctx.agent;
        let Some(cell) = agent.fwd_cell else {
            return Some(Action::Forward);
        };

        if cell.is_door() {
            if cell.is_open {
                return Some(Action::Forward);
            }
            let reason = if cell.is_locked && carries_key_for(agent.carrying.as_ref(), &cell) {
                Some(Reason::KeepKey)
            } else {
                None
            };
            ctx.push(Self::open(reason));
            return None;
        }

        if agent.carrying.is_some() {
            let drop_current = ctx.find_drop_pos(None);
            let drop_blocker = drop_current.and_then(|pos| ctx.find_drop_pos(Some(pos)));
            let (Some(drop_current), Some(drop_blocker)) = (drop_current, drop_blocker) else {
                ctx.push(Self::explore());
                return None;
            };
            // Last to first: take our object back, move the blocker out of
            // the way, put our object down.
            ctx.push(Self::pickup());
            ctx.push(Self::go_to_pos(drop_current));
            ctx.push(Self::drop());
            ctx.push(Self::go_to_pos(drop_blocker));
            ctx.push(Self::pickup());
            ctx.push(Self::go_to_pos(agent.fwd_pos));
            ctx.push(Self::drop());
            ctx.push(Self::go_to_pos(drop_current));
        } else {
            let Some(drop_pos) = ctx.find_drop_pos(None) else {
                ctx.push(Self::explore());
                return None;
            };
            ctx.push(Self::drop());
            ctx.push(Self::go_to_pos(drop_pos));
            ctx.push(Self::pickup());
        }
        debug!(blocker = %agent.fwd_pos, kind = %cell.kind, "clearing blocker");
        None
    }

    // ------------------------------------------------------------------
    // Reacting to executed actions
    // ------------------------------------------------------------------

    /// React to the action executed since the last tick. `None` means no
    /// action has been executed yet.
    pub(crate) fn on_action_result<W: WorldView>(self, ctx: &mut Planning<'_, W>, action: Option<Action>) {
        let Some(action) = action else {
            return;
        };
        match self.kind {
            SubgoalKind::GoNextTo => {
                if matches!(action, Action::Pickup | Action::Drop | Action::Toggle) {
                    Self::plan_undo(ctx, action);
                }
            }
            SubgoalKind::Pickup => match action {
                Action::Pickup => ctx.pop(),
                Action::Left | Action::Right => Self::plan_undo(ctx, action),
                _ => {}
            },
            SubgoalKind::Drop => match action {
                Action::Drop => ctx.pop(),
                Action::Forward | Action::Left | Action::Right => Self::plan_undo(ctx, action),
                _ => {}
            },
            SubgoalKind::Close => match action {
                Action::Toggle => ctx.pop(),
                Action::Forward | Action::Left | Action::Right => Self::plan_undo(ctx, action),
                _ => {}
            },
            SubgoalKind::Open => {
                if action == Action::Toggle {
                    ctx.pop();
                    self.plan_key_drop(ctx);
                } else {
                    Self::plan_undo(ctx, action);
                }
            }
            SubgoalKind::Explore => {}
        }
    }

    /// After unlocking a door with a carried key, put the key down unless it
    /// is meant to be kept.
    fn plan_key_drop<W: WorldView>(self, ctx: &mut Planning<'_, W>) {
        if self.reason == Some(Reason::KeepKey) {
            return;
        }
        let was_locked = ctx
            .memory
            .and_then(|memory| memory.fwd_door())
            .is_some_and(|door| door.is_locked);
        let Some(door) = ctx.agent.fwd_door() else {
            return;
        };
        if !was_locked || door.is_locked || !carries_key_for(ctx.agent.carrying.as_ref(), &door) {
            return;
        }
        match ctx.find_drop_pos(None) {
            Some(drop_pos) => {
                ctx.push(Self::drop());
                ctx.push(Self::go_to_pos(drop_pos));
            }
            None => debug!(door = %ctx.agent.fwd_pos, "no room to drop the key"),
        }
    }

    /// Push a subgoal that reverts the effect of `action`, if it had one.
    fn plan_undo<W: WorldView>(ctx: &mut Planning<'_, W>, action: Action) {
        let agent = *ctx.agent;
        let memory = ctx.memory.copied();
        let carried_id = |carrying: Option<WorldObject>| carrying.map(|obj| obj.id);
        let carrying_changed =
            memory.is_some_and(|memory| carried_id(memory.carrying) != carried_id(agent.carrying));

        let undo = match action {
            Action::Forward => memory
                .is_some_and(|memory| memory.pos != agent.pos)
                .then(|| Self::go_to_pos(agent.pos)),
            // The cell that was in front before the turn.
            Action::Left => Some(Self::go_to_pos(agent.pos.offset(agent.right_vec()))),
            Action::Right => Some(Self::go_to_pos(agent.pos.offset(agent.right_vec().reversed()))),
            Action::Drop => carrying_changed.then(Self::pickup),
            Action::Pickup => carrying_changed.then(Self::drop),
            Action::Toggle => {
                let was_open = memory.and_then(|memory| memory.fwd_door()).map(|door| door.is_open);
                agent.fwd_door().and_then(|door| {
                    was_open.is_some_and(|was_open| was_open != door.is_open).then(|| {
                        if door.is_open {
                            Self::close()
                        } else {
                            Self::open(None)
                        }
                    })
                })
            }
            Action::Done => None,
        };

        if let Some(undo) = undo {
            debug!(action = %action, undo = %undo, "undoing unplanned action");
            ctx.push(undo);
        }
    }
}
