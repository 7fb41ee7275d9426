//! Brick definitions and the brick-set loader.
//!
//! Bricks are flat polyominoes given as `[row, col]` offset lists in a JSON
//! array; the embedded default set covers the calendar face exactly (47
//! cells for the 50 playable cells minus the three goals). List order fixes
//! the solver's processing order.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{Position, Shape, Transform};

/// The default brick set: square, L and S tetrominoes plus the P, U, L, N,
/// Y, V and Z pentominoes.
const DEFAULT_SET: &str = include_str!("../bricks.json");

/// A puzzle piece: an identifier plus one canonical shape.
///
/// The id doubles as the cell owner tag and the display color index.
#[derive(Clone, Debug)]
pub struct Brick {
    pub id: usize,
    pub shape: Shape,
}

impl Brick {
    /// The absolute cells this brick covers when placed at `origin` in the
    /// given orientation.
    pub fn oriented_cells(&self, transform: Transform, origin: Position) -> Vec<Position> {
        self.shape
            .transformed(transform)
            .offsets()
            .iter()
            .map(|&offset| origin + offset)
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum BrickError {
    #[error("failed to read brick file")]
    Io(#[from] io::Error),
    #[error("invalid brick JSON")]
    Parse(#[from] serde_json::Error),
    #[error("brick {index} has no cells")]
    Empty { index: usize },
}

#[derive(Debug, Deserialize)]
struct RawBrick(Vec<[i32; 2]>);

/// Parses a brick set from its JSON text.
pub fn parse_bricks(json: &str) -> Result<Vec<Brick>, BrickError> {
    let raw: Vec<RawBrick> = serde_json::from_str(json)?;
    let mut bricks = Vec::with_capacity(raw.len());
    for (index, RawBrick(offsets)) in raw.into_iter().enumerate() {
        if offsets.is_empty() {
            return Err(BrickError::Empty { index });
        }
        let shape = Shape::new(
            offsets
                .into_iter()
                .map(|[row, col]| Position::new(row, col))
                .collect(),
        );
        bricks.push(Brick { id: index, shape });
    }
    Ok(bricks)
}

/// Loads a brick set from a JSON file.
pub fn load_bricks(path: &Path) -> Result<Vec<Brick>, BrickError> {
    parse_bricks(&fs::read_to_string(path)?)
}

/// The embedded default brick set.
pub fn default_bricks() -> Vec<Brick> {
    parse_bricks(DEFAULT_SET).expect("embedded brick set is valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_covers_the_calendar_face() {
        let bricks = default_bricks();
        assert_eq!(bricks.len(), 10);

        let total: usize = bricks.iter().map(|b| b.shape.len()).sum();
        assert_eq!(total, 47);
    }

    #[test]
    fn test_default_ids_follow_list_order() {
        for (index, brick) in default_bricks().iter().enumerate() {
            assert_eq!(brick.id, index);
        }
    }

    #[test]
    fn test_default_shapes_contain_the_origin() {
        for brick in default_bricks() {
            assert!(
                brick.shape.contains(Position::new(0, 0)),
                "brick {} does not cover its origin",
                brick.id
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_bricks("[[0, 1]]").is_err());
        assert!(parse_bricks("not json").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_brick() {
        let err = parse_bricks("[[], [[0, 0]]]").unwrap_err();
        assert!(matches!(err, BrickError::Empty { index: 0 }));
    }

    #[test]
    fn test_oriented_cells_translate_the_transformed_shape() {
        let brick = Brick {
            id: 0,
            shape: Shape::new(vec![Position::new(0, 0), Position::new(0, 1)]),
        };
        let cells = brick.oriented_cells(Transform::Rot90, Position::new(3, 4));
        // Rot90 sends (0, 1) to (1, 0), so the domino stands vertically.
        assert_eq!(cells, vec![Position::new(3, 4), Position::new(4, 4)]);
    }
}
