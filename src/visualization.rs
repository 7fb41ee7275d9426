//! Terminal rendering of the calendar grid, brick shapes, and live search
//! progress.
//!
//! Colors are plain ANSI escape sequences; each brick id maps to a stable
//! palette entry so colors stay consistent across frames. Dead cells render
//! black, goal and open cells plain, so the target date stays readable.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crate::geometry::{Position, Shape};
use crate::grid::{CellKind, Grid, Occupancy};
use crate::solver::SearchObserver;

pub const RESET: &str = "\x1b[0m";
const FG_BLACK: &str = "\x1b[30m";

/// Foreground colors for brick ids, in id order: blue, cyan, green,
/// yellow, red, magenta, then the bright variants.
const PALETTE: [&str; 10] = [
    "\x1b[34m", "\x1b[36m", "\x1b[32m", "\x1b[33m", "\x1b[31m", "\x1b[35m", "\x1b[91m",
    "\x1b[93m", "\x1b[90m", "\x1b[92m",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The display color for a brick id. The mapping is stable so a brick
/// keeps its color across renders.
pub fn brick_color(id: usize) -> &'static str {
    PALETTE[id % PALETTE.len()]
}

/// Resets the terminal and moves the cursor home.
pub fn clear_screen() {
    print!("\x1bc");
}

fn month_name(value: u8) -> &'static str {
    MONTHS
        .get(usize::from(value).wrapping_sub(1))
        .copied()
        .unwrap_or("???")
}

fn weekday_name(value: u8) -> &'static str {
    WEEKDAYS.get(usize::from(value)).copied().unwrap_or("???")
}

/// The three-character label a cell shows on the calendar face.
pub fn cell_label(cell_kind: CellKind) -> String {
    match cell_kind {
        CellKind::Month(value) => month_name(value).to_string(),
        CellKind::Day(value) => format!("{value:>3}"),
        CellKind::Weekday(value) => weekday_name(value).to_string(),
        CellKind::Blocked => "   ".to_string(),
    }
}

/// Renders the grid as one string, one labeled row per grid row.
///
/// Every row is preceded by a marker line: blank, or an arrow over the
/// cursor column when a cursor is given. With `color` set, cells owned by a
/// brick take its palette color and dead cells turn black.
pub fn render_grid(grid: &Grid, color: bool, cursor: Option<Position>) -> String {
    let (height, width) = grid.shape();
    let mut output = String::new();

    for row in 0..height {
        match cursor {
            Some(pos) if pos.row == row as i32 && pos.col >= 0 => {
                output.push_str(&" ".repeat(4 * pos.col as usize));
                output.push_str("⬇\n");
            }
            _ => output.push('\n'),
        }

        let mut line = String::new();
        for col in 0..width {
            let pos = Position::new(row as i32, col as i32);
            let cell = grid.cell(pos).expect("render loop stays in range");
            let label = cell_label(cell.kind);
            if color {
                match cell.occupancy {
                    Occupancy::Brick(id) => {
                        line.push_str(brick_color(id));
                        line.push_str(&label);
                        line.push_str(RESET);
                    }
                    Occupancy::Dead => {
                        line.push_str(FG_BLACK);
                        line.push_str(&label);
                        line.push_str(RESET);
                    }
                    Occupancy::Open => line.push_str(&label),
                }
            } else {
                line.push_str(&label);
            }
            line.push(' ');
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

/// Draws a shape as `██` blocks on its bounding box.
pub fn render_shape(shape: &Shape) -> String {
    let offsets = shape.offsets();
    if offsets.is_empty() {
        return String::new();
    }
    let min_row = offsets.iter().map(|p| p.row).min().unwrap_or(0);
    let max_row = offsets.iter().map(|p| p.row).max().unwrap_or(0);
    let min_col = offsets.iter().map(|p| p.col).min().unwrap_or(0);
    let max_col = offsets.iter().map(|p| p.col).max().unwrap_or(0);

    let mut output = String::new();
    for row in min_row..=max_row {
        let mut line = String::new();
        for col in min_col..=max_col {
            line.push_str(if shape.contains(Position::new(row, col)) {
                "██"
            } else {
                "  "
            });
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

/// Live progress display: redraws the grid with a cursor over the current
/// candidate, the shape being tried, and the remaining-brick count.
///
/// Purely a spectator; it never touches search state.
pub struct StatusDisplay {
    frame_delay: Duration,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(7),
        }
    }
}

impl SearchObserver for StatusDisplay {
    fn on_candidate(&mut self, grid: &Grid, origin: Position, shape: &Shape, remaining: usize) {
        clear_screen();
        print!("{}", render_grid(grid, true, Some(origin)));
        print!("{}", render_shape(shape));
        println!("{remaining} left");
        let _ = io::stdout().flush();
        thread::sleep(self.frame_delay);
    }
}
