//! The calendar grid and its cell state.
//!
//! The grid is a flat array of typed cells with explicit height and width.
//! Cell kind and goal flags are fixed at construction; only occupancy
//! mutates during search. Out-of-range lookups return `None` rather than
//! failing, since neighbor probes routinely step outside the grid.

use thiserror::Error;

use crate::geometry::Position;

/// The calendar layout dimensions: 8 rows by 7 columns.
pub const CALENDAR_SHAPE: (usize, usize) = (8, 7);

/// Layout corner positions whose ordering weight is forced to a dominant
/// constant so the search fills the awkward pockets first.
pub const PINNED_CORNERS: [Position; 6] = [
    Position::new(0, 0),
    Position::new(0, 5),
    Position::new(2, 6),
    Position::new(6, 0),
    Position::new(7, 4),
    Position::new(7, 6),
];

/// What a cell represents on the calendar face.
///
/// The payload is the semantic value: month 1-12, day 1-31, weekday 0-6
/// with Sunday as 0. `Blocked` cells are outside the playable area.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Month(u8),
    Day(u8),
    Weekday(u8),
    Blocked,
}

/// Who currently claims a cell.
///
/// `Dead` marks a cell artificially claimed by pruning: no remaining brick
/// can ever cover it, so the search refuses to continue past it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Occupancy {
    #[default]
    Open,
    Brick(usize),
    Dead,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub is_goal: bool,
    pub occupancy: Occupancy,
}

impl Cell {
    pub const fn new(kind: CellKind) -> Self {
        Self {
            kind,
            is_goal: false,
            occupancy: Occupancy::Open,
        }
    }

    pub const fn month(value: u8) -> Self {
        Self::new(CellKind::Month(value))
    }

    pub const fn day(value: u8) -> Self {
        Self::new(CellKind::Day(value))
    }

    pub const fn weekday(value: u8) -> Self {
        Self::new(CellKind::Weekday(value))
    }

    pub const fn blocked() -> Self {
        Self::new(CellKind::Blocked)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// No cell carries the requested calendar value.
    #[error("no {kind} cell with value {value}")]
    NoSuchCell { kind: &'static str, value: u8 },
    /// The layout rows are not all the same width.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A rectangular grid of cells.
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from rows of cells, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(GridError::RaggedLayout {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        Ok(Self {
            height,
            width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// (height, width) in cells.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn in_range(&self, pos: Position) -> bool {
        pos.row >= 0
            && (pos.row as usize) < self.height
            && pos.col >= 0
            && (pos.col as usize) < self.width
    }

    /// Bounds-checked lookup; `None` is the non-cell sentinel for
    /// out-of-range positions.
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if !self.in_range(pos) {
            return None;
        }
        Some(&self.cells[pos.row as usize * self.width + pos.col as usize])
    }

    pub fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        if !self.in_range(pos) {
            return None;
        }
        Some(&mut self.cells[pos.row as usize * self.width + pos.col as usize])
    }

    /// True iff the cell exists, is playable, is not a goal, and nothing
    /// claims it. Exactly the placement-candidate predicate.
    pub fn is_open(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| {
            cell.occupancy == Occupancy::Open
                && !cell.is_goal
                && cell.kind != CellKind::Blocked
        })
    }

    /// True iff the cell exists and is claimed by pruning rather than a brick.
    pub fn is_dead(&self, pos: Position) -> bool {
        self.cell(pos)
            .is_some_and(|cell| cell.occupancy == Occupancy::Dead)
    }

    /// The four orthogonally adjacent positions. Not bounds-checked;
    /// callers probe validity through `is_open`/`is_in_range`.
    pub fn neighbors(pos: Position) -> [Position; 4] {
        [
            Position::new(pos.row, pos.col + 1),
            Position::new(pos.row, pos.col - 1),
            Position::new(pos.row + 1, pos.col),
            Position::new(pos.row - 1, pos.col),
        ]
    }

    /// Claims a cell for a brick. Keeping the open set and dead counter
    /// consistent is the caller's job.
    pub fn mark_occupied(&mut self, pos: Position, owner: usize) {
        self.cell_required(pos).occupancy = Occupancy::Brick(owner);
    }

    /// Claims a cell for the pruning mechanism.
    pub fn mark_dead(&mut self, pos: Position) {
        self.cell_required(pos).occupancy = Occupancy::Dead;
    }

    /// Releases a cell back to open.
    pub fn mark_open(&mut self, pos: Position) {
        self.cell_required(pos).occupancy = Occupancy::Open;
    }

    fn cell_required(&mut self, pos: Position) -> &mut Cell {
        self.cell_mut(pos)
            .expect("occupancy update addressed a position outside the grid")
    }

    /// Iterates cells in row-major order with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (
                Position::new((i / width) as i32, (i % width) as i32),
                cell,
            )
        })
    }

    /// Marks the three goal cells for a target date.
    ///
    /// Exactly one cell of each kind matches a valid value in the calendar
    /// layout; a value no cell carries is a configuration error.
    pub fn mark_date(&mut self, month: u8, day: u8, weekday: u8) -> Result<(), GridError> {
        let goals = [
            self.find_cell(CellKind::Month(month))
                .ok_or(GridError::NoSuchCell {
                    kind: "month",
                    value: month,
                })?,
            self.find_cell(CellKind::Day(day)).ok_or(GridError::NoSuchCell {
                kind: "day",
                value: day,
            })?,
            self.find_cell(CellKind::Weekday(weekday))
                .ok_or(GridError::NoSuchCell {
                    kind: "weekday",
                    value: weekday,
                })?,
        ];
        for pos in goals {
            self.cell_required(pos).is_goal = true;
        }
        Ok(())
    }

    fn find_cell(&self, kind: CellKind) -> Option<Position> {
        self.iter().find(|(_, cell)| cell.kind == kind).map(|(pos, _)| pos)
    }
}

/// Builds the 8x7 calendar face.
///
/// Rows 0-1 carry the twelve months with a blocked cell at the right end,
/// rows 2-5 the days 1-28, row 6 the days 29-31 followed by weekdays 0-3,
/// and row 7 four blocked cells followed by weekdays 4-6.
pub fn build_calendar() -> Grid {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    rows.push((1u8..=6).map(Cell::month).chain([Cell::blocked()]).collect());
    rows.push((7u8..=12).map(Cell::month).chain([Cell::blocked()]).collect());
    for week in 0u8..4 {
        rows.push((week * 7 + 1..=week * 7 + 7).map(Cell::day).collect());
    }
    rows.push((29u8..=31).map(Cell::day).chain((0u8..4).map(Cell::weekday)).collect());
    rows.push(
        (0..4)
            .map(|_| Cell::blocked())
            .chain((4u8..7).map(Cell::weekday))
            .collect(),
    );

    let grid = Grid::from_rows(rows).expect("calendar rows are all the same width");
    debug_assert_eq!(grid.shape(), CALENDAR_SHAPE);
    grid
}
