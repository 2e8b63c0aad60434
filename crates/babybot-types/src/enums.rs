//! Enumeration types for the grid world: colors, object kinds, and the
//! primitive actions an agent can take.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// The color of a world object.
///
/// Doors and keys are matched by color: a locked door can only be unlocked
/// while carrying the key of the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Purple.
    Purple,
    /// Yellow.
    Yellow,
    /// Grey.
    Grey,
}

impl Color {
    /// All colors, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Yellow,
        Self::Grey,
    ];

    /// Lowercase color name as used in mission text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Yellow => "yellow",
            Self::Grey => "grey",
        }
    }

    /// Parse a lowercase color name (`"gray"` is accepted for grey).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "purple" => Some(Self::Purple),
            "yellow" => Some(Self::Yellow),
            "grey" | "gray" => Some(Self::Grey),
            _ => None,
        }
    }

    /// Single-letter code used by the ASCII map format.
    ///
    /// Grey uses `X` so it does not collide with green.
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Purple => 'P',
            Self::Yellow => 'Y',
            Self::Grey => 'X',
        }
    }

    /// Inverse of [`Color::letter`].
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'R' => Some(Self::Red),
            'G' => Some(Self::Green),
            'B' => Some(Self::Blue),
            'P' => Some(Self::Purple),
            'Y' => Some(Self::Yellow),
            'X' => Some(Self::Grey),
            _ => None,
        }
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

/// The kind of object that can occupy a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Impassable wall segment.
    Wall,
    /// Door between rooms; may be closed, open, or locked.
    Door,
    /// Key that unlocks doors of its color.
    Key,
    /// Ball; can be carried.
    Ball,
    /// Box; can be carried, and opening it destroys it.
    Box,
}

impl ObjectKind {
    /// Lowercase kind name as used in mission text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Key => "key",
            Self::Ball => "ball",
            Self::Box => "box",
        }
    }

    /// Parse a lowercase kind name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wall" => Some(Self::Wall),
            "door" => Some(Self::Door),
            "key" => Some(Self::Key),
            "ball" => Some(Self::Ball),
            "box" => Some(Self::Box),
            _ => None,
        }
    }

    /// Whether objects of this kind can be picked up by the agent.
    pub const fn is_portable(self) -> bool {
        matches!(self, Self::Key | Self::Ball | Self::Box)
    }
}

impl core::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A primitive action the agent can execute in one tick.
///
/// The integer indices (`0..=6`) are stable and match the order in which
/// action sequences are exchanged with external tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Turn 90 degrees counter-clockwise.
    Left,
    /// Turn 90 degrees clockwise.
    Right,
    /// Step into the forward cell.
    Forward,
    /// Pick up the object in the forward cell.
    Pickup,
    /// Drop the carried object into the forward cell.
    Drop,
    /// Open, close, or unlock the door (or open the box) in the forward cell.
    Toggle,
    /// Declare the mission complete.
    Done,
}

impl Action {
    /// All actions, ordered by index.
    pub const ALL: [Self; 7] = [
        Self::Left,
        Self::Right,
        Self::Forward,
        Self::Pickup,
        Self::Drop,
        Self::Toggle,
        Self::Done,
    ];

    /// Stable integer index of the action.
    pub const fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Forward => 2,
            Self::Pickup => 3,
            Self::Drop => 4,
            Self::Toggle => 5,
            Self::Done => 6,
        }
    }

    /// Inverse of [`Action::index`].
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Forward),
            3 => Some(Self::Pickup),
            4 => Some(Self::Drop),
            5 => Some(Self::Toggle),
            6 => Some(Self::Done),
            _ => None,
        }
    }

    /// Lowercase action name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Forward => "forward",
            Self::Pickup => "pickup",
            Self::Drop => "drop",
            Self::Toggle => "toggle",
            Self::Done => "done",
        }
    }

    /// Parse an action name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|a| a.as_str() == lowered)
    }

    /// Whether the action changes the agent's pose (position or facing).
    pub const fn is_movement(self) -> bool {
        matches!(self, Self::Forward | Self::Left | Self::Right)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_index_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(7), None);
    }

    #[test]
    fn action_names_are_case_insensitive() {
        assert_eq!(Action::from_name(" Forward "), Some(Action::Forward));
        assert_eq!(Action::from_name("TOGGLE"), Some(Action::Toggle));
        assert_eq!(Action::from_name("jump"), None);
    }

    #[test]
    fn color_letters_do_not_collide() {
        for color in Color::ALL {
            assert_eq!(Color::from_letter(color.letter()), Some(color));
        }
        assert_eq!(Color::from_name("gray"), Some(Color::Grey));
    }

    #[test]
    fn only_small_objects_are_portable() {
        assert!(ObjectKind::Key.is_portable());
        assert!(ObjectKind::Box.is_portable());
        assert!(!ObjectKind::Door.is_portable());
        assert!(!ObjectKind::Wall.is_portable());
    }

    #[test]
    fn action_serializes_lowercase() {
        let json = serde_json::to_string(&Action::Pickup).unwrap_or_default();
        assert_eq!(json, "\"pickup\"");
    }
}
