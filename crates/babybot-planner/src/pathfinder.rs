//! Breadth-first pathfinding over the observed part of the grid.
//!
//! Each queued search state carries the direction it was entered from, and
//! neighbors are enqueued straight-ahead first, so among equally short paths
//! the search prefers the one with fewer turns.
//!
//! Two traversal policies exist:
//!
//! - **Avoid** stops at walls, closed or locked doors, and any cell holding
//!   an object.
//! - **Tolerate** only stops at walls. A tolerant search is seeded from every
//!   cell the avoiding search reached, and the final path is the avoiding
//!   prefix followed by the tolerant suffix, so blockers are crossed as late
//!   as possible.
//!
//! Cells outside the visibility mask may be accepted as goals but are never
//! expanded.

use std::collections::{BTreeMap, VecDeque};

use babybot_types::{Color, GridPosition, ObjectKind, Offset, WorldObject, WorldView};
use serde::{Deserialize, Serialize};

/// Which cells the agent has observed. Never shrinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMask {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl VisibilityMask {
    /// A `width` x `height` mask with every cell set to `visible`.
    pub fn new(width: i32, height: i32, visible: bool) -> Self {
        let area = usize::try_from(width.max(0))
            .unwrap_or(0)
            .saturating_mul(usize::try_from(height.max(0)).unwrap_or(0));
        Self {
            width,
            height,
            cells: vec![visible; area],
        }
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        if pos.col < 0 || pos.row < 0 || pos.col >= self.width || pos.row >= self.height {
            return None;
        }
        let flat = pos.row.checked_mul(self.width)?.checked_add(pos.col)?;
        usize::try_from(flat).ok()
    }

    /// Whether `pos` has been observed. Out-of-bounds cells never are.
    pub fn is_visible(&self, pos: GridPosition) -> bool {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx))
            .copied()
            .unwrap_or(false)
    }

    /// Mark `pos` as observed.
    pub fn mark(&mut self, pos: GridPosition) {
        if let Some(idx) = self.index(pos)
            && let Some(cell) = self.cells.get_mut(idx)
        {
            *cell = true;
        }
    }

    /// Mark every cell currently in the agent's view.
    pub fn observe<W: WorldView>(&mut self, world: &W) {
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = GridPosition::new(col, row);
                if world.in_view(pos) {
                    self.mark(pos);
                }
            }
        }
    }

    /// Number of observed cells.
    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|v| **v).count()
    }
}

/// Search instrumentation, accumulated over the life of a planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BfsStats {
    /// Number of breadth-first searches run.
    pub searches: u64,
    /// Number of states dequeued and visited across all searches.
    pub visited: u64,
}

/// Whether a search may fall back to crossing occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blockers {
    /// Only paths through free cells.
    Avoid,
    /// Retry through occupied cells if no free path exists.
    Fallback,
}

/// A path found by [`shortest_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Cells to walk through, excluding the agent's own cell and ending at
    /// `finish`. Empty when the agent already stands on the accepted cell.
    pub cells: Vec<GridPosition>,
    /// The accepted cell.
    pub finish: GridPosition,
    /// The path crosses at least one occupied cell.
    pub with_blockers: bool,
}

impl Path {
    /// Number of steps along the path.
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the agent already stands on the accepted cell.
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The first cell to move into, if any.
    pub fn next_cell(&self) -> Option<GridPosition> {
        self.cells.first().copied()
    }
}

#[derive(Clone, Copy)]
enum Traversal {
    Avoid,
    Tolerate,
}

struct SearchResult {
    /// Accepted cell back to the seed it was reached from.
    path: Option<Vec<GridPosition>>,
    /// Predecessor of every visited cell (`None` for seeds).
    previous: BTreeMap<GridPosition, Option<GridPosition>>,
    /// Visited cells in the order they were visited.
    order: Vec<GridPosition>,
}

/// Run one breadth-first search.
///
/// `locked_color`, when set, makes locked doors of that color impassable in
/// both traversal modes.
fn breadth_first_search<W, F>(
    world: &W,
    mask: &VisibilityMask,
    stats: &mut BfsStats,
    seeds: &[(GridPosition, Offset)],
    accept: &F,
    traversal: Traversal,
    locked_color: Option<Color>,
) -> SearchResult
where
    W: WorldView,
    F: Fn(GridPosition, Option<&WorldObject>) -> bool,
{
    stats.searches = stats.searches.saturating_add(1);

    let mut queue: VecDeque<(GridPosition, Offset, Option<GridPosition>)> =
        seeds.iter().map(|&(pos, dir)| (pos, dir, None)).collect();
    let mut previous: BTreeMap<GridPosition, Option<GridPosition>> = BTreeMap::new();
    let mut order = Vec::new();

    while let Some((pos, dir, prev)) = queue.pop_front() {
        if previous.contains_key(&pos) || !world.contains(pos) {
            continue;
        }
        stats.visited = stats.visited.saturating_add(1);

        let cell = world.cell(pos);
        previous.insert(pos, prev);
        order.push(pos);

        if accept(pos, cell) {
            let mut path = vec![pos];
            let mut cursor = prev;
            while let Some(step) = cursor {
                path.push(step);
                cursor = previous.get(&step).copied().flatten();
            }
            return SearchResult {
                path: Some(path),
                previous,
                order,
            };
        }

        if !mask.is_visible(pos) {
            continue;
        }

        if let Some(obj) = cell {
            let blocked = match obj.kind {
                ObjectKind::Wall => true,
                ObjectKind::Door if obj.is_locked => {
                    locked_color == Some(obj.color) || matches!(traversal, Traversal::Avoid)
                }
                ObjectKind::Door => !obj.is_open && matches!(traversal, Traversal::Avoid),
                ObjectKind::Key | ObjectKind::Ball | ObjectKind::Box => {
                    matches!(traversal, Traversal::Avoid)
                }
            };
            if blocked {
                continue;
            }
        }

        // Straight ahead first, then the two sides, then back.
        let ahead = dir;
        let side = dir.transposed();
        for step in [ahead, side, side.reversed(), ahead.reversed()] {
            queue.push_back((pos.offset(step), step, Some(pos)));
        }
    }

    SearchResult {
        path: None,
        previous,
        order,
    }
}

/// Shortest path from the agent to the nearest cell accepted by `accept`.
///
/// With [`Blockers::Fallback`], a free path is still preferred; only if none
/// exists is the search rerun through occupied cells.
pub fn shortest_path<W, F>(
    world: &W,
    mask: &VisibilityMask,
    stats: &mut BfsStats,
    accept: &F,
    blockers: Blockers,
    locked_color: Option<Color>,
) -> Option<Path>
where
    W: WorldView,
    F: Fn(GridPosition, Option<&WorldObject>) -> bool,
{
    let start = [(world.agent_pos(), world.agent_dir().vector())];
    let free = breadth_first_search(world, mask, stats, &start, accept, Traversal::Avoid, locked_color);

    let (mut cells, with_blockers) = match free.path {
        Some(path) => (path, false),
        None if blockers == Blockers::Fallback => {
            let seeds: Vec<(GridPosition, Offset)> = free
                .order
                .iter()
                .map(|&pos| (pos, Offset::new(1, 0)))
                .collect();
            let tolerant =
                breadth_first_search(world, mask, stats, &seeds, accept, Traversal::Tolerate, locked_color);
            let mut path = tolerant.path?;
            // Extend with the free prefix that leads to the tolerant seed.
            let mut cursor = path
                .last()
                .and_then(|seed| free.previous.get(seed).copied().flatten());
            while let Some(step) = cursor {
                path.push(step);
                cursor = free.previous.get(&step).copied().flatten();
            }
            (path, true)
        }
        None => return None,
    };

    let finish = *cells.first()?;
    cells.reverse();
    cells.remove(0);
    Some(Path {
        cells,
        finish,
        with_blockers,
    })
}

/// Distance to the nearest wall or door from `pos` along `dir`, counting
/// only cells in the agent's view. Returns the number of visible cells
/// before the view ends if no wall or door is seen.
pub fn closest_wall_or_door<W: WorldView>(world: &W, pos: GridPosition, dir: Offset) -> u32 {
    let mut distance: u32 = 1;
    loop {
        let probe = pos.offset(dir.scaled(i32::try_from(distance).unwrap_or(i32::MAX)));
        if !world.contains(probe) || !world.in_view(probe) {
            return distance.saturating_sub(1);
        }
        if world
            .cell(probe)
            .is_some_and(|obj| obj.is_wall() || obj.is_door())
        {
            return distance;
        }
        distance = distance.saturating_add(1);
    }
}

/// The eight cells around a candidate, clockwise from the top-left.
const RING: [Offset; 8] = [
    Offset::new(-1, -1),
    Offset::new(0, -1),
    Offset::new(1, -1),
    Offset::new(1, 0),
    Offset::new(1, 1),
    Offset::new(0, 1),
    Offset::new(-1, 1),
    Offset::new(-1, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingClass {
    Free,
    Wall,
    Occupied,
}

/// Whether dropping an object at `pos` keeps the free cells around it
/// connected and leaves every neighboring object reachable.
fn keeps_neighborhood_connected<W: WorldView>(
    world: &W,
    mask: &VisibilityMask,
    pos: GridPosition,
    except: Option<GridPosition>,
) -> bool {
    let agent = world.agent_pos();
    let classes: Vec<RingClass> = RING
        .iter()
        .map(|&off| {
            let nb = pos.offset(off);
            let cell = world.cell(nb);
            let visible = mask.is_visible(nb);
            if visible && cell.is_some_and(WorldObject::is_wall) {
                RingClass::Wall
            } else if visible
                && (cell.is_none_or(WorldObject::is_open_door) || nb == agent)
                && Some(nb) != except
            {
                RingClass::Free
            } else {
                RingClass::Occupied
            }
        })
        .collect();

    let class_at = |idx: usize| {
        idx.checked_rem(RING.len())
            .and_then(|wrapped| classes.get(wrapped))
            .copied()
            .unwrap_or(RingClass::Occupied)
    };
    let mut changes = 0_u32;
    for idx in 0..RING.len() {
        let here = class_at(idx);
        let next = class_at(idx.saturating_add(1));
        if (here == RingClass::Free) != (next == RingClass::Free) {
            changes = changes.saturating_add(1);
        }
        let prev = class_at(idx.saturating_add(RING.len()).saturating_sub(1));
        if here == RingClass::Occupied && prev != RingClass::Free && next != RingClass::Free {
            return false;
        }
    }
    changes <= 2
}

/// Find a cell to drop the carried object on, never `except`.
///
/// Tries, in order: a free path to a cell whose drop keeps its neighborhood
/// connected, a free path to any empty cell, then the same two allowing
/// blockers.
pub fn find_drop_pos<W: WorldView>(
    world: &W,
    mask: &VisibilityMask,
    stats: &mut BfsStats,
    except: Option<GridPosition>,
) -> Option<GridPosition> {
    let agent = world.agent_pos();
    let droppable = |pos: GridPosition, cell: Option<&WorldObject>| {
        pos != agent && Some(pos) != except && mask.is_visible(pos) && cell.is_none()
    };
    let unblocking = |pos: GridPosition, cell: Option<&WorldObject>| {
        droppable(pos, cell) && keeps_neighborhood_connected(world, mask, pos, except)
    };

    shortest_path(world, mask, stats, &unblocking, Blockers::Avoid, None)
        .or_else(|| shortest_path(world, mask, stats, &droppable, Blockers::Avoid, None))
        .or_else(|| shortest_path(world, mask, stats, &unblocking, Blockers::Fallback, None))
        .or_else(|| shortest_path(world, mask, stats, &droppable, Blockers::Fallback, None))
        .map(|path| path.finish)
}
