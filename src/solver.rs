//! Backtracking search with dead-region pruning.
//!
//! The solver walks the brick list in order, trying every orientation of
//! the current brick at every open origin, committing a placement, and
//! recursing. After each commit it flood-fills the open regions bordering
//! the new brick; a region too small for the remaining bricks, or one no
//! remaining brick fits into, is marked dead and counted. A nonzero dead
//! count fails the branch immediately, so the search never descends into a
//! state it cannot complete. Undo restores the brick's cells and revives
//! every bordering dead region, which is the exact inverse of the commit.

use std::collections::{BTreeSet, VecDeque};

use log::debug;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::geometry::{all_orientations, Position, Shape, Transform};
use crate::grid::{Grid, Occupancy, PINNED_CORNERS};
use crate::pieces::Brick;

/// Per-cell ordering score; higher scores are tried first.
type Weight = u32;

/// Score forced onto pinned layout corners, dominating every computed one.
const PINNED_WEIGHT: Weight = 1_000;

/// A committed brick: where its shape's origin landed and which symmetry
/// operation oriented it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub origin: Position,
    pub transform: Transform,
}

/// One placement per brick, index-aligned with the brick list.
pub type Solution = Vec<Placement>;

/// Tuning knobs for a solve.
#[derive(Clone, Debug)]
pub struct SolveOptions {
    /// Seed for the ordering jitter; fixed seed means reproducible search.
    pub seed: u64,
    /// Positions whose score is forced to the dominant pinned weight.
    pub pinned: Vec<Position>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            seed: 2024,
            pinned: Vec::new(),
        }
    }
}

impl SolveOptions {
    /// Options for the standard calendar face, pinning its corner pockets.
    pub fn for_calendar() -> Self {
        Self {
            pinned: PINNED_CORNERS.to_vec(),
            ..Self::default()
        }
    }
}

/// Read-only hook invoked once per candidate placement, before the
/// feasibility check. Observers must not touch search state; the solver
/// treats them as pure spectators.
pub trait SearchObserver {
    fn on_candidate(&mut self, _grid: &Grid, _origin: Position, _shape: &Shape, _remaining: usize) {
    }
}

/// The default spectator: does nothing.
pub struct NullObserver;

impl SearchObserver for NullObserver {}

/// Solves the puzzle, returning the first placement sequence that covers
/// every open cell, or `None` when the search space is exhausted.
///
/// On success the grid's final occupancy is the solution; on failure the
/// grid is restored to its initial state.
pub fn solve(grid: &mut Grid, bricks: &[Brick], options: &SolveOptions) -> Option<Solution> {
    solve_with_observer(grid, bricks, options, &mut NullObserver)
}

/// Like [`solve`], with a progress observer called per candidate.
pub fn solve_with_observer(
    grid: &mut Grid,
    bricks: &[Brick],
    options: &SolveOptions,
    observer: &mut dyn SearchObserver,
) -> Option<Solution> {
    let mut state = SearchState::new(grid, bricks, options, observer);
    let mut records: Vec<Option<Placement>> = vec![None; bricks.len()];

    if state.try_place(0, &mut records) {
        debug!("solved after {} candidate attempts", state.attempts);
        Some(
            records
                .into_iter()
                .map(|record| record.expect("every brick records a placement on success"))
                .collect(),
        )
    } else {
        debug!("exhausted after {} candidate attempts", state.attempts);
        None
    }
}

/// All mutable search state, threaded through the recursion by `&mut` so
/// independent solves cannot interfere.
struct SearchState<'a> {
    grid: &'a mut Grid,
    bricks: &'a [Brick],
    /// Distinct orientations per brick, computed once before the search.
    orientations: Vec<Vec<(Shape, Transform)>>,
    /// Per-cell ordering score, computed once at init and never refreshed.
    weights: FxHashMap<Position, Weight>,
    /// Placement-eligible origins, ordered by (weight, position).
    open: BTreeSet<(Weight, Position)>,
    /// Total cells currently marked dead; nonzero fails a branch in O(1).
    dead_count: usize,
    attempts: u64,
    observer: &'a mut dyn SearchObserver,
}

impl<'a> SearchState<'a> {
    fn new(
        grid: &'a mut Grid,
        bricks: &'a [Brick],
        options: &SolveOptions,
        observer: &'a mut dyn SearchObserver,
    ) -> Self {
        let mut rng = Pcg64::seed_from_u64(options.seed);
        let shape = grid.shape();

        let mut weights = FxHashMap::default();
        for (pos, _) in grid.iter() {
            weights.insert(pos, centrality_weight(shape, pos, &mut rng));
        }
        for &pos in &options.pinned {
            if let Some(weight) = weights.get_mut(&pos) {
                *weight = PINNED_WEIGHT;
            }
        }

        let open = grid
            .iter()
            .map(|(pos, _)| pos)
            .filter(|&pos| grid.is_open(pos))
            .map(|pos| (weights[&pos], pos))
            .collect();

        let orientations = bricks
            .iter()
            .map(|brick| all_orientations(&brick.shape))
            .collect();

        Self {
            grid,
            bricks,
            orientations,
            weights,
            open,
            dead_count: 0,
            attempts: 0,
            observer,
        }
    }

    /// Places bricks `cur..` recursively; true means the whole suffix fit.
    fn try_place(&mut self, cur: usize, records: &mut Vec<Option<Placement>>) -> bool {
        if cur == self.bricks.len() {
            assert_eq!(
                self.dead_count, 0,
                "dead cells survived to a completed placement sequence"
            );
            assert!(
                self.open.is_empty(),
                "{} open cells remain uncovered after the last brick",
                self.open.len()
            );
            return true;
        }
        if self.dead_count > 0 {
            return false;
        }

        // Highest weight first: pinned corners, then cells far from center.
        let candidates: Vec<Position> = self.open.iter().rev().map(|&(_, pos)| pos).collect();
        let remaining = self.bricks.len() - cur;

        for slot in 0..self.orientations[cur].len() {
            let (shape, transform) = self.orientations[cur][slot].clone();
            for &origin in &candidates {
                self.attempts += 1;
                if self.attempts % 1000 == 0 {
                    debug!("round {}: {} bricks left", self.attempts, remaining);
                }
                self.observer.on_candidate(self.grid, origin, &shape, remaining);

                if !self.fits(&shape, origin) {
                    continue;
                }

                self.place_brick(cur, &shape, origin);
                if self.try_place(cur + 1, records) {
                    records[cur] = Some(Placement { origin, transform });
                    return true;
                }
                self.lift_brick(cur, &shape, origin);
            }
        }
        false
    }

    /// True iff every cell of the translated shape is currently open.
    fn fits(&self, shape: &Shape, origin: Position) -> bool {
        shape
            .offsets()
            .iter()
            .all(|&offset| self.grid.is_open(origin + offset))
    }

    /// Commits a brick, then prunes: every open region bordering the new
    /// cells that cannot host any remaining brick is marked dead.
    fn place_brick(&mut self, cur: usize, shape: &Shape, origin: Position) {
        for &offset in shape.offsets() {
            self.claim(origin + offset, cur);
        }

        for &offset in shape.offsets() {
            for neighbor in Grid::neighbors(origin + offset) {
                let region = self.region(neighbor, Grid::is_open);
                if region.is_empty() {
                    // Out of range, blocked, or a region this step already killed.
                    continue;
                }
                if !self.region_useful(&region, cur + 1) {
                    self.kill_region(&region);
                }
            }
        }
    }

    /// Reverts a commit: reopens the brick's cells, then revives every dead
    /// region bordering them.
    ///
    /// The search never recurses while the dead count is nonzero, so every
    /// dead region found here was created when this brick was placed;
    /// restoring them all makes lift the exact inverse of place.
    fn lift_brick(&mut self, cur: usize, shape: &Shape, origin: Position) {
        for &offset in shape.offsets() {
            let pos = origin + offset;
            debug_assert_eq!(
                self.grid.cell(pos).map(|cell| cell.occupancy),
                Some(Occupancy::Brick(cur)),
                "undo addressed a cell this brick does not own"
            );
            self.release(pos);
        }

        for &offset in shape.offsets() {
            for neighbor in Grid::neighbors(origin + offset) {
                let region = self.region(neighbor, Grid::is_dead);
                if !region.is_empty() {
                    self.rescue_region(&region);
                }
            }
        }
    }

    /// The connected region around `start` satisfying `pred`, via
    /// breadth-first flood fill over 4-connectivity. Empty when `start`
    /// itself fails the predicate.
    fn region(&self, start: Position, pred: fn(&Grid, Position) -> bool) -> Vec<Position> {
        let mut area = Vec::new();
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            if !seen.insert(pos) || !pred(self.grid, pos) {
                continue;
            }
            area.push(pos);
            queue.extend(Grid::neighbors(pos));
        }
        area
    }

    /// Whether a region can still host bricks: nonempty, at least as large
    /// as the smallest remaining brick, and some remaining brick fits
    /// somewhere inside it. A cheap necessary test, not a tiling check.
    fn region_useful(&self, region: &[Position], next: usize) -> bool {
        let remaining = &self.bricks[next..];
        if remaining.is_empty() {
            return true;
        }

        let smallest = remaining
            .iter()
            .map(|brick| brick.shape.len())
            .min()
            .unwrap_or(0);
        if region.len() < smallest {
            return false;
        }

        for index in next..self.bricks.len() {
            for (shape, _) in &self.orientations[index] {
                for &pos in region {
                    if self.fits(shape, pos) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn kill_region(&mut self, region: &[Position]) {
        for &pos in region {
            self.grid.mark_dead(pos);
            self.remove_open(pos);
        }
        self.dead_count += region.len();
    }

    fn rescue_region(&mut self, region: &[Position]) {
        for &pos in region {
            self.release(pos);
        }
        self.dead_count -= region.len();
    }

    fn claim(&mut self, pos: Position, owner: usize) {
        self.grid.mark_occupied(pos, owner);
        self.remove_open(pos);
    }

    fn release(&mut self, pos: Position) {
        self.grid.mark_open(pos);
        let inserted = self.open.insert((self.weights[&pos], pos));
        debug_assert!(inserted, "released cell {pos} was already in the open set");
    }

    fn remove_open(&mut self, pos: Position) {
        let removed = self.open.remove(&(self.weights[&pos], pos));
        debug_assert!(removed, "claimed cell {pos} was not in the open set");
    }
}

/// Score from the doubled row/column distance to the grid center, each axis
/// scaled by a small random factor. Doubled coordinates keep the center
/// exact for both even and odd spans without floating point.
fn centrality_weight(shape: (usize, usize), pos: Position, rng: &mut Pcg64) -> Weight {
    let (height, width) = shape;
    let row_distance = (2 * pos.row - (height as i32 - 1)).unsigned_abs();
    let col_distance = (2 * pos.col - (width as i32 - 1)).unsigned_abs();
    row_distance * rng.random_range(3..=7) + col_distance * rng.random_range(3..=7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, CellKind};

    /// A fully-open grid of day cells.
    fn open_grid(height: usize, width: usize) -> Grid {
        let rows = (0..height)
            .map(|r| (0..width).map(|c| Cell::day((r * width + c + 1) as u8)).collect())
            .collect();
        Grid::from_rows(rows).unwrap()
    }

    fn brick(id: usize, offsets: &[(i32, i32)]) -> Brick {
        Brick {
            id,
            shape: Shape::new(offsets.iter().map(|&(r, c)| Position::new(r, c)).collect()),
        }
    }

    fn options() -> SolveOptions {
        SolveOptions {
            seed: 7,
            pinned: Vec::new(),
        }
    }

    fn occupancies(grid: &Grid) -> Vec<Occupancy> {
        grid.iter().map(|(_, cell)| cell.occupancy).collect()
    }

    /// Checks the coverage and piece-integrity properties: every open,
    /// non-goal cell owned by exactly one brick, and each brick's cells
    /// matching its recorded orientation translated by its origin.
    fn assert_solution_covers(grid: &Grid, bricks: &[Brick], solution: &[Placement]) {
        let mut covered = FxHashSet::default();
        for (brick, placement) in bricks.iter().zip(solution) {
            for pos in brick.oriented_cells(placement.transform, placement.origin) {
                let cell = grid.cell(pos).expect("placed cell is in range");
                assert_eq!(cell.occupancy, Occupancy::Brick(brick.id));
                assert!(!cell.is_goal);
                assert!(covered.insert(pos), "cell {pos} covered twice");
            }
        }
        for (pos, cell) in grid.iter() {
            if !cell.is_goal && cell.kind != CellKind::Blocked {
                assert!(covered.contains(&pos), "cell {pos} left uncovered");
            }
        }
    }

    #[test]
    fn test_square_fills_a_two_by_two_grid() {
        let mut grid = open_grid(2, 2);
        let bricks = vec![brick(0, &[(0, 0), (0, 1), (1, 0), (1, 1)])];

        let solution = solve(&mut grid, &bricks, &options()).unwrap();

        assert_eq!(solution[0].origin, Position::new(0, 0));
        assert_eq!(solution[0].transform, Transform::Rot0);
        assert_solution_covers(&grid, &bricks, &solution);
    }

    #[test]
    fn test_goal_cell_stays_uncovered() {
        let mut grid = open_grid(2, 2);
        let goal = Position::new(1, 1);
        grid.cell_mut(goal).unwrap().is_goal = true;
        let bricks = vec![brick(0, &[(0, 0), (0, 1), (1, 0)])];

        let solution = solve(&mut grid, &bricks, &options()).unwrap();

        assert_eq!(grid.cell(goal).unwrap().occupancy, Occupancy::Open);
        assert_solution_covers(&grid, &bricks, &solution);
    }

    #[test]
    fn test_placement_kills_regions_too_small_for_remaining_bricks() {
        let mut grid = open_grid(1, 5);
        let bricks = vec![brick(0, &[(0, 0), (0, 1)]), brick(1, &[(0, 0), (0, 1), (0, 2)])];
        let mut observer = NullObserver;
        let mut state = SearchState::new(&mut grid, &bricks, &options(), &mut observer);

        let before_open = state.open.clone();
        let before_cells = occupancies(state.grid);

        // The domino in the middle strands one cell on its left and two on
        // its right; neither pocket can host the 3-cell brick.
        let domino = state.orientations[0][0].0.clone();
        state.place_brick(0, &domino, Position::new(0, 1));

        assert_eq!(state.dead_count, 3);
        assert!(state.grid.is_dead(Position::new(0, 0)));
        assert!(state.grid.is_dead(Position::new(0, 3)));
        assert!(state.grid.is_dead(Position::new(0, 4)));

        state.lift_brick(0, &domino, Position::new(0, 1));

        assert_eq!(state.dead_count, 0);
        assert_eq!(state.open, before_open);
        assert_eq!(occupancies(state.grid), before_cells);
    }

    #[test]
    fn test_no_solution_when_a_cell_is_unreachable() {
        // The goal splits the row into a lone cell and a 3-cell run; two
        // dominoes can never cover both sides.
        let mut grid = open_grid(1, 5);
        grid.cell_mut(Position::new(0, 1)).unwrap().is_goal = true;
        let bricks = vec![brick(0, &[(0, 0), (0, 1)]), brick(1, &[(0, 0), (0, 1)])];

        assert!(solve(&mut grid, &bricks, &options()).is_none());

        // Failure restores the grid to its initial state.
        for (_, cell) in grid.iter() {
            assert_eq!(cell.occupancy, Occupancy::Open);
        }
    }

    #[test]
    fn test_solvable_split_around_a_goal() {
        let mut grid = open_grid(1, 5);
        grid.cell_mut(Position::new(0, 2)).unwrap().is_goal = true;
        let bricks = vec![brick(0, &[(0, 0), (0, 1)]), brick(1, &[(0, 0), (0, 1)])];

        let solution = solve(&mut grid, &bricks, &options()).unwrap();
        assert_solution_covers(&grid, &bricks, &solution);
    }

    #[test]
    fn test_two_trominoes_tile_two_by_three() {
        let mut grid = open_grid(2, 3);
        let bricks = vec![
            brick(0, &[(0, 0), (0, 1), (1, 0)]),
            brick(1, &[(0, 0), (0, 1), (1, 0)]),
        ];

        let solution = solve(&mut grid, &bricks, &options()).unwrap();
        assert_solution_covers(&grid, &bricks, &solution);
    }

    #[test]
    fn test_same_seed_gives_identical_solutions() {
        let bricks = vec![
            brick(0, &[(0, 0), (0, 1), (1, 0)]),
            brick(1, &[(0, 0), (0, 1), (1, 0)]),
        ];

        let mut first_grid = open_grid(2, 3);
        let first = solve(&mut first_grid, &bricks, &options()).unwrap();
        let mut second_grid = open_grid(2, 3);
        let second = solve(&mut second_grid, &bricks, &options()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_open_set_excludes_goals_and_blocked_cells() {
        let mut grid = crate::grid::build_calendar();
        grid.mark_date(8, 7, 5).unwrap();
        let bricks = crate::pieces::default_bricks();
        let mut observer = NullObserver;
        let state = SearchState::new(&mut grid, &bricks, &SolveOptions::for_calendar(), &mut observer);

        // 56 cells minus 6 blocked minus 3 goals.
        assert_eq!(state.open.len(), 47);
    }

    #[test]
    fn test_pinned_corners_sort_first() {
        let mut grid = crate::grid::build_calendar();
        let bricks = crate::pieces::default_bricks();
        let mut observer = NullObserver;
        let state = SearchState::new(&mut grid, &bricks, &SolveOptions::for_calendar(), &mut observer);

        let first: Vec<Position> = state
            .open
            .iter()
            .rev()
            .take(PINNED_CORNERS.len())
            .map(|&(weight, pos)| {
                assert_eq!(weight, PINNED_WEIGHT);
                pos
            })
            .collect();
        for corner in PINNED_CORNERS {
            assert!(first.contains(&corner));
        }
    }

    #[test]
    #[should_panic(expected = "remain uncovered")]
    fn test_undersized_brick_set_trips_the_coverage_assertion() {
        let mut grid = open_grid(1, 3);
        let bricks = vec![brick(0, &[(0, 0), (0, 1)])];
        let _ = solve(&mut grid, &bricks, &options());
    }
}
