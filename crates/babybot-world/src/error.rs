//! Error types for the `babybot-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use babybot_types::GridPosition;

/// Errors that can occur while building or parsing a grid world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The requested grid dimensions are unusable.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// A position lies outside the grid.
    #[error("position {0} is out of bounds")]
    OutOfBounds(GridPosition),

    /// The agent cannot be placed on a cell that holds a non-steppable object.
    #[error("cell {0} is occupied")]
    CellOccupied(GridPosition),

    /// The ASCII map could not be parsed.
    #[error("map parse error at line {line}, column {column}: {reason}")]
    MapParse {
        /// 1-based line number within the map text.
        line: usize,
        /// 1-based cell column within the line.
        column: usize,
        /// What went wrong.
        reason: String,
    },

    /// The map does not place the agent.
    #[error("map does not contain an agent")]
    MissingAgent,

    /// The mission text could not be parsed.
    #[error("mission parse error in {text:?}: {reason}")]
    MissionParse {
        /// The offending mission text.
        text: String,
        /// What went wrong.
        reason: String,
    },

    /// The scenario generator could not find room for an object.
    #[error("could not place {what} after {attempts} attempts")]
    PlacementFailed {
        /// Description of the object being placed.
        what: String,
        /// How many random positions were tried.
        attempts: u32,
    },
}
