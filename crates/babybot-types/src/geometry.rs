//! Grid coordinates, offsets, and compass directions.
//!
//! Positions are `(col, row)` pairs with the origin in the top-left corner;
//! rows grow downwards. All arithmetic saturates so that probing past the
//! edge of a grid yields an out-of-bounds position rather than an overflow.

use serde::{Deserialize, Serialize};

/// A cell coordinate in the grid, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column index (x).
    pub col: i32,
    /// Row index (y).
    pub row: i32,
}

impl GridPosition {
    /// Create a position from a column and a row.
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The position displaced by `offset`.
    pub const fn offset(self, offset: Offset) -> Self {
        Self {
            col: self.col.saturating_add(offset.dx),
            row: self.row.saturating_add(offset.dy),
        }
    }

    /// The offset that leads from `origin` to `self`.
    pub const fn offset_from(self, origin: Self) -> Offset {
        Offset {
            dx: self.col.saturating_sub(origin.col),
            dy: self.row.saturating_sub(origin.row),
        }
    }

    /// Manhattan (4-connected) distance between two positions.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.col
            .abs_diff(other.col)
            .saturating_add(self.row.abs_diff(other.row))
    }

    /// The four orthogonal neighbors, in east, south, west, north order.
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(Direction::East.vector()),
            self.offset(Direction::South.vector()),
            self.offset(Direction::West.vector()),
            self.offset(Direction::North.vector()),
        ]
    }
}

impl core::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// A displacement between two grid positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Column delta.
    pub dx: i32,
    /// Row delta.
    pub dy: i32,
}

impl Offset {
    /// Create an offset.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// The offset pointing the opposite way.
    pub const fn reversed(self) -> Self {
        Self {
            dx: self.dx.saturating_neg(),
            dy: self.dy.saturating_neg(),
        }
    }

    /// The offset multiplied by `factor`.
    pub const fn scaled(self, factor: i32) -> Self {
        Self {
            dx: self.dx.saturating_mul(factor),
            dy: self.dy.saturating_mul(factor),
        }
    }

    /// The offset with its components swapped.
    pub const fn transposed(self) -> Self {
        Self {
            dx: self.dy,
            dy: self.dx,
        }
    }
}

/// One of the four compass directions the agent can face.
///
/// The numeric encoding (east=0, south=1, west=2, north=3) matches the way
/// agent states are written in text, e.g. `((3, 4), 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Facing increasing columns.
    East,
    /// Facing increasing rows.
    South,
    /// Facing decreasing columns.
    West,
    /// Facing decreasing rows.
    North,
}

impl Direction {
    /// Numeric encoding of the direction.
    pub const fn index(self) -> u8 {
        match self {
            Self::East => 0,
            Self::South => 1,
            Self::West => 2,
            Self::North => 3,
        }
    }

    /// Inverse of [`Direction::index`].
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::East),
            1 => Some(Self::South),
            2 => Some(Self::West),
            3 => Some(Self::North),
            _ => None,
        }
    }

    /// Unit vector pointing in this direction.
    pub const fn vector(self) -> Offset {
        match self {
            Self::East => Offset::new(1, 0),
            Self::South => Offset::new(0, 1),
            Self::West => Offset::new(-1, 0),
            Self::North => Offset::new(0, -1),
        }
    }

    /// Unit vector pointing to the agent's right-hand side.
    pub const fn right_vector(self) -> Offset {
        self.turned_right().vector()
    }

    /// Direction after a 90-degree counter-clockwise turn.
    pub const fn turned_left(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
            Self::North => Self::West,
        }
    }

    /// Direction after a 90-degree clockwise turn.
    pub const fn turned_right(self) -> Self {
        match self {
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
        }
    }

    /// The direction whose unit vector equals `offset`, if any.
    pub const fn from_vector(offset: Offset) -> Option<Self> {
        match (offset.dx, offset.dy) {
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            (0, -1) => Some(Self::North),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_vector_is_clockwise() {
        assert_eq!(Direction::East.right_vector(), Offset::new(0, 1));
        assert_eq!(Direction::North.right_vector(), Offset::new(1, 0));
    }

    #[test]
    fn four_turns_return_home() {
        let mut dir = Direction::West;
        for _ in 0..4 {
            dir = dir.turned_left();
        }
        assert_eq!(dir, Direction::West);
        assert_eq!(Direction::South.turned_left().turned_right(), Direction::South);
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = GridPosition::new(1, 5);
        let b = GridPosition::new(4, 1);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
    }

    #[test]
    fn offset_roundtrip() {
        let origin = GridPosition::new(3, 3);
        let target = GridPosition::new(1, 6);
        assert_eq!(origin.offset(target.offset_from(origin)), target);
    }

    #[test]
    fn direction_index_roundtrip() {
        for index in 0..4 {
            let dir = Direction::from_index(index);
            assert_eq!(dir.map(Direction::index), Some(index));
        }
        assert_eq!(Direction::from_vector(Offset::new(1, 1)), None);
    }
}
