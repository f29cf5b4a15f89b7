#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* route planning over the mission grid.
//!
//! The search is deliberately small-scale: the open set is a plain vector
//! scanned linearly for the lowest `f` score (first encountered wins ties),
//! finalized cells are never reopened, and expansion stops after
//! [`MAX_EXPANSIONS`] rounds. These rules fix the exact route produced for a
//! given grid, not merely its length.

use last_protocol_core::{Direction, Position};
use last_protocol_world::Grid;
use tracing::debug;

/// Number of expansion rounds after which the search gives up.
pub const MAX_EXPANSIONS: usize = 100;

/// Neighbour generation order: West, East, North, South.
const EXPANSION_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::North,
    Direction::South,
];

/// Result of a bounded route search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A route was found.
    Found {
        /// Cells from start to goal, both inclusive.
        path: Vec<Position>,
        /// Expansion rounds consumed.
        expansions: usize,
    },
    /// The open set emptied before the goal was reached.
    Unreachable {
        /// Expansion rounds consumed.
        expansions: usize,
    },
    /// The expansion cap was hit before the goal was reached.
    Exhausted,
}

impl SearchOutcome {
    /// Consumes the outcome, yielding the route if one was found.
    #[must_use]
    pub fn into_path(self) -> Option<Vec<Position>> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::Unreachable { .. } | Self::Exhausted => None,
        }
    }
}

/// Finds a route from `start` to `goal`, or `None` if the goal is unreachable
/// or the expansion cap is hit first.
#[must_use]
pub fn find_path(start: Position, goal: Position, grid: &Grid) -> Option<Vec<Position>> {
    search(start, goal, grid, MAX_EXPANSIONS).into_path()
}

/// Runs the bounded search with an explicit expansion cap.
#[must_use]
pub fn search(start: Position, goal: Position, grid: &Grid, max_expansions: usize) -> SearchOutcome {
    let mut arena = vec![SearchNode {
        position: start,
        parent: None,
        g: 0,
        f: 0,
    }];
    let mut open: Vec<usize> = vec![0];
    let mut closed = ClosedSet::new(grid);
    let mut expansions = 0;

    while !open.is_empty() && expansions < max_expansions {
        expansions += 1;

        let mut current_slot = 0;
        for (slot, &candidate) in open.iter().enumerate() {
            if arena[candidate].f < arena[open[current_slot]].f {
                current_slot = slot;
            }
        }
        let current = open.remove(current_slot);
        let current_position = arena[current].position;
        let current_g = arena[current].g;
        closed.insert(current_position);

        if current_position == goal {
            return SearchOutcome::Found {
                path: reconstruct(&arena, current),
                expansions,
            };
        }

        for direction in EXPANSION_ORDER {
            let Some(neighbor) = current_position.checked_step(direction) else {
                continue;
            };
            if !grid.is_passable(neighbor) || closed.contains(neighbor) {
                continue;
            }

            let g = current_g.saturating_add(1);
            let h = neighbor.manhattan_distance(goal);
            let already_open = open.iter().any(|&index| {
                arena[index].position == neighbor && g >= arena[index].g
            });
            if already_open {
                continue;
            }

            arena.push(SearchNode {
                position: neighbor,
                parent: Some(current),
                g,
                f: g.saturating_add(h),
            });
            open.push(arena.len() - 1);
        }
    }

    if open.is_empty() {
        SearchOutcome::Unreachable { expansions }
    } else {
        debug!(%start, %goal, max_expansions, "route search hit its expansion cap");
        SearchOutcome::Exhausted
    }
}

/// Pairs every hop of a route with the direction taken to reach it.
pub fn route_steps(path: &[Position]) -> impl Iterator<Item = (Direction, Position)> + '_ {
    path.windows(2).filter_map(|pair| {
        let (from, to) = (pair[0], pair[1]);
        Direction::between(from, to).map(|direction| (direction, to))
    })
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    position: Position,
    parent: Option<usize>,
    g: u32,
    f: u32,
}

fn reconstruct(arena: &[SearchNode], goal: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(index) = cursor {
        path.push(arena[index].position);
        cursor = arena[index].parent;
    }
    path.reverse();
    path
}

/// Finalized cells, indexed densely by grid position.
#[derive(Debug)]
struct ClosedSet {
    columns: usize,
    cells: Vec<bool>,
}

impl ClosedSet {
    fn new(grid: &Grid) -> Self {
        let columns = grid.columns() as usize;
        let rows = grid.rows() as usize;
        Self {
            columns,
            cells: vec![false; columns * rows],
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        if column >= self.columns {
            return None;
        }
        let index = row.checked_mul(self.columns)?.checked_add(column)?;
        (index < self.cells.len()).then_some(index)
    }

    fn insert(&mut self, position: Position) {
        if let Some(index) = self.index(position) {
            self.cells[index] = true;
        }
    }

    fn contains(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| self.cells[index])
    }
}
