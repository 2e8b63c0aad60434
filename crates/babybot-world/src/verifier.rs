//! Mission verification.
//!
//! [`MissionProgress`] mirrors an [`Instruction`] tree and is advanced once
//! per applied action. Atomic instructions are checked against the world
//! state after the action; sequencing nodes remember which branches are
//! already satisfied. Verification is lenient: doing things out of order
//! never fails a mission, it just does not count.

use babybot_types::{
    Action, GridPosition, Instruction, ObjectDescriptor, ObjectId, WorldView,
};
use serde::{Deserialize, Serialize};

/// An atomic check against the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Task {
    GoTo(ObjectDescriptor),
    Open(ObjectDescriptor),
    Pickup(ObjectDescriptor),
    PutNext {
        moving: ObjectDescriptor,
        fixed: ObjectDescriptor,
    },
}

impl Task {
    fn verify<W: WorldView>(self, world: &W, action: Action, carried_before: Option<ObjectId>) -> bool {
        let front = world.front_pos();
        match self {
            Self::GoTo(target) => world.cell(front).is_some_and(|obj| target.matches(obj)),
            Self::Open(target) => {
                action == Action::Toggle
                    && world
                        .cell(front)
                        .is_some_and(|obj| obj.is_door() && obj.is_open && target.matches(obj))
            }
            Self::Pickup(target) => {
                action == Action::Pickup
                    && carried_before.is_none()
                    && world.carrying().is_some_and(|obj| target.matches(obj))
            }
            Self::PutNext { moving, fixed } => {
                if action != Action::Drop {
                    return false;
                }
                let Some(dropped) = world.cell(front) else {
                    return false;
                };
                if !moving.matches(dropped) {
                    return false;
                }
                world
                    .resolve(fixed)
                    .iter()
                    .any(|(obj, pos)| obj.id != dropped.id && is_next_to(*pos, front))
            }
        }
    }
}

/// Whether two cells share an edge.
fn is_next_to(a: GridPosition, b: GridPosition) -> bool {
    a.manhattan_distance(b) == 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Node {
    Task(Task),
    /// Both branches, any order.
    Both {
        first: Box<Node>,
        second: Box<Node>,
        first_done: bool,
        second_done: bool,
    },
    /// `first`, then `second`.
    Sequence {
        first: Box<Node>,
        second: Box<Node>,
        first_done: bool,
    },
}

impl Node {
    fn build(instruction: &Instruction) -> Self {
        match instruction {
            Instruction::GoTo { target } => Self::Task(Task::GoTo(*target)),
            Instruction::Open { target } => Self::Task(Task::Open(*target)),
            Instruction::Pickup { target } => Self::Task(Task::Pickup(*target)),
            Instruction::PutNext { moving, fixed } => Self::Task(Task::PutNext {
                moving: *moving,
                fixed: *fixed,
            }),
            Instruction::And { first, second } => Self::Both {
                first: Box::new(Self::build(first)),
                second: Box::new(Self::build(second)),
                first_done: false,
                second_done: false,
            },
            Instruction::Before { first, second } => Self::Sequence {
                first: Box::new(Self::build(first)),
                second: Box::new(Self::build(second)),
                first_done: false,
            },
            // "A after you B" executes B first.
            Instruction::After { first, second } => Self::Sequence {
                first: Box::new(Self::build(second)),
                second: Box::new(Self::build(first)),
                first_done: false,
            },
        }
    }

    fn verify<W: WorldView>(&mut self, world: &W, action: Action, carried_before: Option<ObjectId>) -> bool {
        match self {
            Self::Task(task) => task.verify(world, action, carried_before),
            Self::Both {
                first,
                second,
                first_done,
                second_done,
            } => {
                if !*first_done {
                    *first_done = first.verify(world, action, carried_before);
                }
                if !*second_done {
                    *second_done = second.verify(world, action, carried_before);
                }
                *first_done && *second_done
            }
            Self::Sequence {
                first,
                second,
                first_done,
            } => {
                if !*first_done {
                    *first_done = first.verify(world, action, carried_before);
                    if !*first_done {
                        return false;
                    }
                }
                // The action that completes the first branch may complete
                // the second one too.
                second.verify(world, action, carried_before)
            }
        }
    }
}

/// Tracks progress of one mission across steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionProgress {
    instruction: Instruction,
    root: Node,
    complete: bool,
}

impl MissionProgress {
    /// Start tracking `instruction` with no progress.
    pub fn new(instruction: Instruction) -> Self {
        let root = Node::build(&instruction);
        Self {
            instruction,
            root,
            complete: false,
        }
    }

    /// The mission being tracked.
    pub const fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    /// Whether the mission has been accomplished.
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advance the tracker after `action` has been applied to `world`.
    ///
    /// `carried_before` is the identity of the object the agent held before
    /// the action. Returns `true` once the mission is accomplished; the
    /// result is sticky.
    pub fn verify<W: WorldView>(
        &mut self,
        world: &W,
        action: Action,
        carried_before: Option<ObjectId>,
    ) -> bool {
        if !self.complete {
            self.complete = self.root.verify(world, action, carried_before);
        }
        self.complete
    }
}
