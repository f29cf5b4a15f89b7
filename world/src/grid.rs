//! Fixed mission grid and movement legality checks used by the world crate.

use last_protocol_core::{
    Direction, MoveRejection, NodeId, Position, Terrain, UNKNOWN_SECTOR,
};
use thiserror::Error;

const L: Terrain = Terrain::Base;
const T: Terrain = Terrain::Node(NodeId::Thamel);
const B: Terrain = Terrain::Node(NodeId::Baneshwor);
const D: Terrain = Terrain::Node(NodeId::DurbarSquare);
const H: Terrain = Terrain::Hub;
const X: Terrain = Terrain::Obstacle;
const O: Terrain = Terrain::Empty;

const MISSION_ROWS: [[Terrain; 8]; 4] = [
    [L, X, T, O, O, O, O, O],
    [O, O, O, O, O, B, X, O],
    [O, O, O, H, O, X, O, O],
    [D, O, O, O, O, O, X, O],
];

/// Dense row-major terrain grid.
///
/// The grid is immutable once built; the player's position is tracked by the
/// world and overlaid only when rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    columns: u32,
    cells: Vec<Terrain>,
}

impl Grid {
    /// Builds the fixed 4x8 mission map.
    #[must_use]
    pub fn mission() -> Self {
        let cells: Vec<Terrain> = MISSION_ROWS.iter().flatten().copied().collect();
        Self {
            rows: MISSION_ROWS.len() as u32,
            columns: MISSION_ROWS[0].len() as u32,
            cells,
        }
    }

    /// Parses a grid from legend rows such as `"L X T ."`.
    ///
    /// Whitespace inside a row is ignored, so both `"LXT."` and `"L X T ."`
    /// describe the same four cells.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let mut cells = Vec::new();
        let mut columns: Option<u32> = None;

        for (row_index, row) in rows.iter().enumerate() {
            let symbols: Vec<char> = row
                .as_ref()
                .chars()
                .filter(|symbol| !symbol.is_whitespace())
                .collect();
            let width = symbols.len() as u32;

            match columns {
                None if width == 0 => return Err(LayoutError::Empty),
                None => columns = Some(width),
                Some(expected) if expected != width => {
                    return Err(LayoutError::Ragged {
                        row: row_index,
                        found: width,
                        expected,
                    });
                }
                Some(_) => {}
            }

            for (column_index, symbol) in symbols.into_iter().enumerate() {
                let terrain =
                    Terrain::from_symbol(symbol).ok_or(LayoutError::UnknownSymbol {
                        symbol,
                        position: Position::new(row_index as i32, column_index as i32),
                    })?;
                cells.push(terrain);
            }
        }

        let columns = columns.ok_or(LayoutError::Empty)?;
        Ok(Self {
            rows: rows.len() as u32,
            columns,
            cells,
        })
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the position lies within the grid extents.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Terrain at the provided position, if it lies within the grid.
    #[must_use]
    pub fn terrain(&self, position: Position) -> Option<Terrain> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the player may stand on the provided position.
    #[must_use]
    pub fn is_passable(&self, position: Position) -> bool {
        self.terrain(position)
            .is_some_and(|terrain| !terrain.is_obstacle())
    }

    /// Landmark name of the position, or "Unknown Sector".
    #[must_use]
    pub fn place_name(&self, position: Position) -> &'static str {
        self.terrain(position)
            .and_then(Terrain::place_name)
            .unwrap_or(UNKNOWN_SECTOR)
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Terrain)> + '_ {
        let columns = self.columns.max(1) as usize;
        self.cells.iter().enumerate().map(move |(index, terrain)| {
            let row = (index / columns) as i32;
            let column = (index % columns) as i32;
            (Position::new(row, column), *terrain)
        })
    }

    /// Positions holding the provided terrain, in row-major order.
    pub fn locate(&self, terrain: Terrain) -> impl Iterator<Item = Position> + '_ {
        self.cells()
            .filter(move |(_, candidate)| *candidate == terrain)
            .map(|(position, _)| position)
    }

    pub(crate) fn landmarks(&self) -> Result<Landmarks, LayoutError> {
        let base = self.single(Terrain::Base, "base")?;
        let hub = self.single(Terrain::Hub, "hub")?;
        let mut nodes = [(NodeId::Thamel, base); 3];
        for (slot, node) in nodes.iter_mut().zip(NodeId::ALL) {
            *slot = (node, self.single(Terrain::Node(node), node.name())?);
        }
        Ok(Landmarks { base, hub, nodes })
    }

    fn single(&self, terrain: Terrain, what: &'static str) -> Result<Position, LayoutError> {
        let found: Vec<Position> = self.locate(terrain).collect();
        match found.as_slice() {
            [position] => Ok(*position),
            _ => Err(LayoutError::Landmark {
                what,
                found: found.len(),
            }),
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = u32::try_from(position.row()).ok()?;
        let column = u32::try_from(position.column()).ok()?;
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Landmark positions extracted from a validated grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Landmarks {
    pub(crate) base: Position,
    pub(crate) hub: Position,
    pub(crate) nodes: [(NodeId, Position); 3],
}

/// Errors raised while building a grid from legend rows.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contained no cells.
    #[error("layout contains no cells")]
    Empty,
    /// A row's width differed from the first row.
    #[error("row {row} has {found} cells; expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the offending row.
        found: u32,
        /// Width of the first row.
        expected: u32,
    },
    /// A symbol outside the map legend was encountered.
    #[error("unknown map symbol '{symbol}' at {position}")]
    UnknownSymbol {
        /// The unrecognised symbol.
        symbol: char,
        /// Where the symbol appeared.
        position: Position,
    },
    /// A landmark was missing or duplicated.
    #[error("layout must contain exactly one {what}, found {found}")]
    Landmark {
        /// Name of the landmark.
        what: &'static str,
        /// Number of occurrences found.
        found: usize,
    },
}

/// Result of evaluating a single step on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The step is legal and lands on the contained position.
    Moved(Position),
    /// The step is illegal for the contained reason.
    Rejected(MoveRejection),
}

/// Evaluates a unit step from `from` in `direction` without mutating anything.
#[must_use]
pub fn attempt_move(grid: &Grid, from: Position, direction: Direction) -> MoveOutcome {
    let Some(candidate) = from.checked_step(direction) else {
        return MoveOutcome::Rejected(MoveRejection::OutOfBounds);
    };
    match grid.terrain(candidate) {
        None => MoveOutcome::Rejected(MoveRejection::OutOfBounds),
        Some(terrain) if terrain.is_obstacle() => MoveOutcome::Rejected(MoveRejection::Blocked),
        Some(_) => MoveOutcome::Moved(candidate),
    }
}
