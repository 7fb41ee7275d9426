//! 2D positions, brick shapes, and the symmetry group of the square.
//!
//! A free polyomino has 8 possible orientations in the plane: 4 rotations,
//! each optionally composed with a mirror. Symmetric bricks produce fewer
//! distinct shapes; `all_orientations` deduplicates them.

use std::fmt;
use std::ops::Add;

use rustc_hash::FxHashSet;

/// A grid coordinate or a relative offset within a brick.
///
/// Ordered row-first, then by column.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the 8 symmetry operations: 4 rotations, plus each rotation
/// composed with a mirror across the row axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Transform {
    Rot0,
    Rot90,
    Rot180,
    Rot270,
    MirrorRot0,
    MirrorRot90,
    MirrorRot180,
    MirrorRot270,
}

impl Transform {
    /// All 8 operations, rotations first. This order fixes which operation
    /// represents a shape when several produce the same one.
    pub const ALL: [Transform; 8] = [
        Transform::Rot0,
        Transform::Rot90,
        Transform::Rot180,
        Transform::Rot270,
        Transform::MirrorRot0,
        Transform::MirrorRot90,
        Transform::MirrorRot180,
        Transform::MirrorRot270,
    ];

    fn mirrored(self) -> bool {
        matches!(
            self,
            Transform::MirrorRot0
                | Transform::MirrorRot90
                | Transform::MirrorRot180
                | Transform::MirrorRot270
        )
    }

    /// Applies this operation to a relative offset.
    ///
    /// Rotations are linear maps on integer pairs (90 degrees sends
    /// (r, c) to (c, -r)); mirroring negates the row axis before rotating.
    pub fn apply(self, pos: Position) -> Position {
        let pos = if self.mirrored() {
            Position::new(-pos.row, pos.col)
        } else {
            pos
        };
        match self {
            Transform::Rot0 | Transform::MirrorRot0 => pos,
            Transform::Rot90 | Transform::MirrorRot90 => Position::new(pos.col, -pos.row),
            Transform::Rot180 | Transform::MirrorRot180 => Position::new(-pos.row, -pos.col),
            Transform::Rot270 | Transform::MirrorRot270 => Position::new(-pos.col, pos.row),
        }
    }
}

/// A brick shape: a set of relative offsets in canonical (sorted) order.
///
/// Equality and hashing go through the sorted sequence, so two shapes
/// built from the same offsets in different orders compare equal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Shape {
    offsets: Vec<Position>,
}

impl Shape {
    pub fn new(mut offsets: Vec<Position>) -> Self {
        offsets.sort_unstable();
        offsets.dedup();
        Self { offsets }
    }

    pub fn offsets(&self) -> &[Position] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.offsets.binary_search(&pos).is_ok()
    }

    /// Applies a symmetry operation to every offset.
    pub fn transformed(&self, transform: Transform) -> Shape {
        Shape::new(self.offsets.iter().map(|&p| transform.apply(p)).collect())
    }
}

/// Generates the distinct orientations of a shape.
///
/// Applies all 8 operations and deduplicates by canonical shape equality;
/// the first operation producing a given shape represents it. Offsets are
/// compared as transformed (not re-anchored), so a domino keeps 4 distinct
/// orientations even though two of them are translates of the other two.
pub fn all_orientations(shape: &Shape) -> Vec<(Shape, Transform)> {
    let mut seen = FxHashSet::default();
    let mut orientations = Vec::new();
    for transform in Transform::ALL {
        let candidate = shape.transformed(transform);
        if seen.insert(candidate.clone()) {
            orientations.push((candidate, transform));
        }
    }
    orientations
}
