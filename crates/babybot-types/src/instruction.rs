//! Mission instruction trees.
//!
//! A mission is a tree of atomic instructions (go to, open, pick up, put
//! next to) joined by sequencing operators. The planner decomposes the tree
//! into subgoals; the world verifies whether it has been accomplished.

use serde::{Deserialize, Serialize};

use crate::objects::ObjectDescriptor;

/// A mission instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Go to (face) an object matching the descriptor.
    GoTo {
        /// The object to go to.
        target: ObjectDescriptor,
    },
    /// Open a door matching the descriptor.
    Open {
        /// The door to open.
        target: ObjectDescriptor,
    },
    /// Pick up an object matching the descriptor.
    Pickup {
        /// The object to pick up.
        target: ObjectDescriptor,
    },
    /// Put an object next to another object.
    PutNext {
        /// The object to carry.
        moving: ObjectDescriptor,
        /// The object to place it next to.
        fixed: ObjectDescriptor,
    },
    /// Accomplish both instructions, in any order.
    And {
        /// First instruction.
        first: Box<Instruction>,
        /// Second instruction.
        second: Box<Instruction>,
    },
    /// Accomplish `first`, then `second`.
    Before {
        /// Instruction to accomplish first.
        first: Box<Instruction>,
        /// Instruction to accomplish second.
        second: Box<Instruction>,
    },
    /// Accomplish `first` after `second` has been accomplished.
    After {
        /// Instruction to accomplish last.
        first: Box<Instruction>,
        /// Instruction to accomplish before `first`.
        second: Box<Instruction>,
    },
}

impl Instruction {
    /// Shorthand for [`Instruction::GoTo`].
    pub const fn go_to(target: ObjectDescriptor) -> Self {
        Self::GoTo { target }
    }

    /// Shorthand for [`Instruction::Open`].
    pub const fn open(target: ObjectDescriptor) -> Self {
        Self::Open { target }
    }

    /// Shorthand for [`Instruction::Pickup`].
    pub const fn pickup(target: ObjectDescriptor) -> Self {
        Self::Pickup { target }
    }

    /// Shorthand for [`Instruction::PutNext`].
    pub const fn put_next(moving: ObjectDescriptor, fixed: ObjectDescriptor) -> Self {
        Self::PutNext { moving, fixed }
    }

    /// Shorthand for [`Instruction::And`].
    pub fn and(first: Self, second: Self) -> Self {
        Self::And {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Shorthand for [`Instruction::Before`].
    pub fn before(first: Self, second: Self) -> Self {
        Self::Before {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Shorthand for [`Instruction::After`].
    pub fn after(first: Self, second: Self) -> Self {
        Self::After {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// The descriptor of the first object this instruction leads the agent
    /// to, in execution order.
    pub fn primary_target(&self) -> ObjectDescriptor {
        match self {
            Self::GoTo { target } | Self::Open { target } | Self::Pickup { target } => *target,
            Self::PutNext { moving, .. } => *moving,
            Self::And { first, .. } | Self::Before { first, .. } => first.primary_target(),
            Self::After { second, .. } => second.primary_target(),
        }
    }
}

/// Write an object reference the way mission text does: "the red ball"
/// when a color is given, "a ball" otherwise.
fn write_object(f: &mut core::fmt::Formatter<'_>, desc: &ObjectDescriptor) -> core::fmt::Result {
    match desc.color {
        Some(_) => write!(f, "the {desc}"),
        None => write!(f, "a {desc}"),
    }
}

impl core::fmt::Display for Instruction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GoTo { target } => {
                f.write_str("go to ")?;
                write_object(f, target)
            }
            Self::Open { target } => {
                f.write_str("open ")?;
                write_object(f, target)
            }
            Self::Pickup { target } => {
                f.write_str("pick up ")?;
                write_object(f, target)
            }
            Self::PutNext { moving, fixed } => {
                f.write_str("put ")?;
                write_object(f, moving)?;
                f.write_str(" next to ")?;
                write_object(f, fixed)
            }
            Self::And { first, second } => write!(f, "{first} and {second}"),
            Self::Before { first, second } => write!(f, "{first}, then {second}"),
            Self::After { first, second } => write!(f, "{first} after you {second}"),
        }
    }
}
