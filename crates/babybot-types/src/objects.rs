//! World objects and object descriptors.
//!
//! A [`WorldObject`] is the contents of one grid cell (or of the agent's
//! hand). An [`ObjectDescriptor`] is a query by kind and optional color;
//! it holds no positions and is re-resolved against the live world every
//! time it is used, because objects get carried, moved, and uncovered.

use serde::{Deserialize, Serialize};

use crate::enums::{Color, ObjectKind};
use crate::ids::ObjectId;

/// An object occupying a grid cell or carried by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldObject {
    /// Stable identity of the object.
    pub id: ObjectId,
    /// What kind of object this is.
    pub kind: ObjectKind,
    /// Object color.
    pub color: Color,
    /// For doors: whether the door is open. Always `false` otherwise.
    pub is_open: bool,
    /// For doors: whether the door is locked. Always `false` otherwise.
    pub is_locked: bool,
}

impl WorldObject {
    /// Create a closed, unlocked object of the given kind and color.
    pub fn new(kind: ObjectKind, color: Color) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            color,
            is_open: false,
            is_locked: false,
        }
    }

    /// A grey wall segment.
    pub fn wall() -> Self {
        Self::new(ObjectKind::Wall, Color::Grey)
    }

    /// A door. A locked door is always closed.
    pub fn door(color: Color, is_open: bool, is_locked: bool) -> Self {
        Self {
            is_open: is_open && !is_locked,
            is_locked,
            ..Self::new(ObjectKind::Door, color)
        }
    }

    /// A key.
    pub fn key(color: Color) -> Self {
        Self::new(ObjectKind::Key, color)
    }

    /// A ball.
    pub fn ball(color: Color) -> Self {
        Self::new(ObjectKind::Ball, color)
    }

    /// A box.
    pub fn boxed(color: Color) -> Self {
        Self::new(ObjectKind::Box, color)
    }

    /// Whether this object is a door.
    pub fn is_door(&self) -> bool {
        self.kind == ObjectKind::Door
    }

    /// Whether this object is a wall.
    pub fn is_wall(&self) -> bool {
        self.kind == ObjectKind::Wall
    }

    /// Whether this object is a door that is currently open.
    pub fn is_open_door(&self) -> bool {
        self.is_door() && self.is_open
    }

    /// Whether this object is a key that unlocks `door`.
    pub fn unlocks(&self, door: &Self) -> bool {
        self.kind == ObjectKind::Key && door.is_door() && self.color == door.color
    }
}

/// Whether the agent can step onto a cell with these contents: the cell is
/// empty or holds an open door.
pub fn is_steppable(cell: Option<&WorldObject>) -> bool {
    cell.is_none_or(WorldObject::is_open_door)
}

/// Whether `carrying` is the key for `door`.
pub fn carries_key_for(carrying: Option<&WorldObject>, door: &WorldObject) -> bool {
    carrying.is_some_and(|held| held.unlocks(door))
}

/// A query for objects by kind and optional color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Required object kind.
    pub kind: ObjectKind,
    /// Required color, or `None` to match any color.
    pub color: Option<Color>,
}

impl ObjectDescriptor {
    /// Create a descriptor.
    pub const fn new(kind: ObjectKind, color: Option<Color>) -> Self {
        Self { kind, color }
    }

    /// Whether `object` satisfies this descriptor.
    pub fn matches(self, object: &WorldObject) -> bool {
        object.kind == self.kind && self.color.is_none_or(|c| c == object.color)
    }
}

impl core::fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.color {
            Some(color) => write!(f, "{color} {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_doors_are_never_open() {
        let door = WorldObject::door(Color::Red, true, true);
        assert!(door.is_locked);
        assert!(!door.is_open);
    }

    #[test]
    fn steppable_cells() {
        assert!(is_steppable(None));
        assert!(is_steppable(Some(&WorldObject::door(Color::Blue, true, false))));
        assert!(!is_steppable(Some(&WorldObject::door(Color::Blue, false, false))));
        assert!(!is_steppable(Some(&WorldObject::ball(Color::Blue))));
    }

    #[test]
    fn key_matches_door_by_color() {
        let door = WorldObject::door(Color::Yellow, false, true);
        assert!(carries_key_for(Some(&WorldObject::key(Color::Yellow)), &door));
        assert!(!carries_key_for(Some(&WorldObject::key(Color::Red)), &door));
        assert!(!carries_key_for(Some(&WorldObject::ball(Color::Yellow)), &door));
        assert!(!carries_key_for(None, &door));
    }

    #[test]
    fn descriptor_color_is_optional() {
        let any_key = ObjectDescriptor::new(ObjectKind::Key, None);
        let red_key = ObjectDescriptor::new(ObjectKind::Key, Some(Color::Red));
        let blue = WorldObject::key(Color::Blue);
        assert!(any_key.matches(&blue));
        assert!(!red_key.matches(&blue));
        assert_eq!(red_key.to_string(), "red key");
        assert_eq!(any_key.to_string(), "key");
    }
}
