//! ASCII map format.
//!
//! One line per grid row, two characters per cell:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `..`  | Empty cell |
//! | `WW`  | Wall |
//! | `Dc`  | Closed door of color `c` |
//! | `Oc`  | Open door of color `c` |
//! | `Lc`  | Locked door of color `c` |
//! | `Kc`  | Key of color `c` |
//! | `Ac`  | Ball of color `c` |
//! | `Bc`  | Box of color `c` |
//! | `>>` `vv` `<<` `^^` | The agent, facing east/south/west/north |
//!
//! Color letters are `R G B P Y X` (X is grey). Blank lines around the map
//! are ignored; every row must have the same width.

use babybot_types::{Color, Direction, GridPosition, ObjectKind, WorldObject, WorldView};

use crate::error::WorldError;
use crate::grid_world::GridWorld;

/// Parse an ASCII map into a world. The agent carries nothing.
///
/// # Errors
///
/// Returns [`WorldError::MapParse`] on a malformed token or ragged row,
/// [`WorldError::MissingAgent`] if no agent token is present, or
/// [`WorldError::InvalidDimensions`] if the map is smaller than 3x3.
pub fn parse_map(text: &str) -> Result<GridWorld, WorldError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .skip_while(|line| line.trim().is_empty())
        .collect();
    let rows: Vec<&str> = {
        let end = rows
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |idx| idx.saturating_add(1));
        rows.into_iter().take(end).collect()
    };

    let mut parsed: Vec<Vec<Token>> = Vec::with_capacity(rows.len());
    for (line_idx, line) in rows.iter().enumerate() {
        let line_no = line_idx.saturating_add(1);
        let chars: Vec<char> = line.trim_start().chars().collect();
        if chars.len() % 2 != 0 {
            return Err(WorldError::MapParse {
                line: line_no,
                column: chars.len().div_ceil(2),
                reason: "row has an odd number of characters".to_owned(),
            });
        }
        let mut row = Vec::with_capacity(chars.len() / 2);
        for (cell_idx, pair) in chars.chunks(2).enumerate() {
            let column = cell_idx.saturating_add(1);
            let (Some(&a), Some(&b)) = (pair.first(), pair.get(1)) else {
                continue;
            };
            let token = Token::parse(a, b).ok_or_else(|| WorldError::MapParse {
                line: line_no,
                column,
                reason: format!("unknown token `{a}{b}`"),
            })?;
            row.push(token);
        }
        if let Some(first) = parsed.first()
            && first.len() != row.len()
        {
            return Err(WorldError::MapParse {
                line: line_no,
                column: row.len(),
                reason: format!("expected {} cells, found {}", first.len(), row.len()),
            });
        }
        parsed.push(row);
    }

    let height = i32::try_from(parsed.len()).unwrap_or(i32::MAX);
    let width = i32::try_from(parsed.first().map_or(0, Vec::len)).unwrap_or(i32::MAX);
    let mut world = GridWorld::new(width, height)?;
    let mut agent = None;

    for (row, tokens) in (0..).zip(&parsed) {
        for (col, token) in (0..).zip(tokens) {
            let pos = GridPosition::new(col, row);
            match *token {
                Token::Empty => {}
                Token::Object(obj) => world.set_cell(pos, Some(obj))?,
                Token::Agent(dir) => agent = Some((pos, dir)),
            }
        }
    }

    let (pos, dir) = agent.ok_or(WorldError::MissingAgent)?;
    world.place_agent(pos, dir)?;
    Ok(world)
}

/// Render a world in the map format accepted by [`parse_map`].
pub fn render_map<W: WorldView>(world: &W) -> String {
    let mut out = String::new();
    for row in 0..world.height() {
        for col in 0..world.width() {
            let pos = GridPosition::new(col, row);
            if pos == world.agent_pos() {
                out.push_str(agent_token(world.agent_dir()));
            } else {
                out.push_str(&cell_token(world.cell(pos)));
            }
        }
        out.push('\n');
    }
    out
}

enum Token {
    Empty,
    Object(WorldObject),
    Agent(Direction),
}

impl Token {
    fn parse(a: char, b: char) -> Option<Self> {
        match (a, b) {
            ('.', '.') => return Some(Self::Empty),
            ('W', 'W') => return Some(Self::Object(WorldObject::wall())),
            ('>', '>') => return Some(Self::Agent(Direction::East)),
            ('v', 'v') => return Some(Self::Agent(Direction::South)),
            ('<', '<') => return Some(Self::Agent(Direction::West)),
            ('^', '^') => return Some(Self::Agent(Direction::North)),
            _ => {}
        }
        let color = Color::from_letter(b)?;
        let obj = match a {
            'D' => WorldObject::door(color, false, false),
            'O' => WorldObject::door(color, true, false),
            'L' => WorldObject::door(color, false, true),
            'K' => WorldObject::key(color),
            'A' => WorldObject::ball(color),
            'B' => WorldObject::boxed(color),
            _ => return None,
        };
        Some(Self::Object(obj))
    }
}

const fn agent_token(dir: Direction) -> &'static str {
    match dir {
        Direction::East => ">>",
        Direction::South => "vv",
        Direction::West => "<<",
        Direction::North => "^^",
    }
}

fn cell_token(cell: Option<&WorldObject>) -> String {
    let Some(obj) = cell else {
        return "..".to_owned();
    };
    let prefix = match obj.kind {
        ObjectKind::Wall => return "WW".to_owned(),
        ObjectKind::Door if obj.is_locked => 'L',
        ObjectKind::Door if obj.is_open => 'O',
        ObjectKind::Door => 'D',
        ObjectKind::Key => 'K',
        ObjectKind::Ball => 'A',
        ObjectKind::Box => 'B',
    };
    format!("{prefix}{}", obj.color.letter())
}
