//! Calendar Brick Puzzle Solver
//!
//! Covers the 8x7 calendar face with ten polyomino bricks so that only the
//! cells naming the target month, day, and weekday stay visible. Solves for
//! today's date by default and prints the colored solution to the terminal.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;

use dayblock::grid::build_calendar;
use dayblock::pieces::{default_bricks, load_bricks, Brick};
use dayblock::solver::{solve, solve_with_observer, Solution, SolveOptions};
use dayblock::visualization::{brick_color, render_grid, render_shape, StatusDisplay, RESET};

/// Solves the calendar brick puzzle for a given date.
#[derive(Parser)]
#[command(name = "dayblock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Date to solve for (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Load a custom brick set from a JSON file.
    #[arg(long)]
    bricks: Option<PathBuf>,

    /// Seed for the candidate-ordering jitter.
    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// Animate search progress in the terminal.
    #[arg(long)]
    watch: bool,

    /// Print the brick shapes before solving.
    #[arg(long)]
    show_bricks: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let month = date.month() as u8;
    let day = date.day() as u8;
    let weekday = date.weekday().num_days_from_sunday() as u8;

    let bricks = match &cli.bricks {
        Some(path) => load_bricks(path)
            .with_context(|| format!("loading bricks from {}", path.display()))?,
        None => default_bricks(),
    };

    let mut grid = build_calendar();
    grid.mark_date(month, day, weekday)
        .with_context(|| format!("marking {date} on the calendar"))?;

    if cli.show_bricks {
        print_bricks(&bricks);
    }

    let options = SolveOptions {
        seed: cli.seed,
        ..SolveOptions::for_calendar()
    };
    let solution = if cli.watch {
        let mut display = StatusDisplay::default();
        solve_with_observer(&mut grid, &bricks, &options, &mut display)
    } else {
        solve(&mut grid, &bricks, &options)
    };

    match solution {
        Some(placements) => {
            println!("{}", render_grid(&grid, true, None));
            print_placements(&bricks, &placements);
            Ok(())
        }
        None => bail!("no solution for {date}"),
    }
}

/// Prints each brick's shape in its display color.
fn print_bricks(bricks: &[Brick]) {
    for brick in bricks {
        print!("{}", brick_color(brick.id));
        print!("{}", render_shape(&brick.shape));
        println!("{RESET}");
    }
}

/// Prints where each brick landed and how it was oriented.
fn print_placements(bricks: &[Brick], placements: &Solution) {
    for (brick, placement) in bricks.iter().zip(placements) {
        println!(
            "brick {:>2} at {} {:?}",
            brick.id, placement.origin, placement.transform
        );
    }
}
