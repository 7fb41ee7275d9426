//! Calendar Brick Puzzle Solver Library
//!
//! Provides the search engine and collaborators for the daily calendar
//! packing puzzle: bricks must cover every cell of an 8x7 calendar face
//! except the three cells naming the target month, day, and weekday.

pub mod geometry;
pub mod grid;
pub mod pieces;
pub mod solver;
pub mod visualization;
