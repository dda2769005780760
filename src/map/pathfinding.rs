//! Shortest cardinal routes across a [`Grid`].

use std::collections::HashSet;

use glam::IVec2;
use pathfinding::prelude::astar;
use smallvec::SmallVec;

use crate::constants::MAX_PATH_HOPS;
use crate::map::direction::Direction;
use crate::map::grid::Grid;

/// Manhattan distance between two cells.
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}

/// Cells reachable in one step from `cell`.
///
/// A neighbour must be inside the grid, statically walkable, and free of any
/// occupant unless it is the goal itself.
fn successors(grid: &Grid, occupied: &HashSet<IVec2>, goal: IVec2, cell: IVec2) -> SmallVec<[(IVec2, u32); 4]> {
    Direction::DIRECTIONS
        .iter()
        .map(|d| cell + d.as_ivec2())
        .filter(|&next| grid.is_walkable(next) && (next == goal || !occupied.contains(&next)))
        .map(|next| (next, 1))
        .collect()
}

/// Finds a shortest path from `start` to `goal` using A* with unit step cost.
///
/// The returned cells exclude `start` and include `goal`. An empty path means
/// `start == goal` or no route exists. Paths are cut to the first
/// [`MAX_PATH_HOPS`] steps; callers recompute before they run out.
pub fn find_path(grid: &Grid, occupied: &HashSet<IVec2>, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    if start == goal {
        return Vec::new();
    }

    astar(
        &start,
        |&cell| successors(grid, occupied, goal, cell),
        |&cell| manhattan(cell, goal),
        |&cell| cell == goal,
    )
    .map(|(path, _cost)| path.into_iter().skip(1).take(MAX_PATH_HOPS).collect())
    .unwrap_or_default()
}
