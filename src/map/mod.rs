//! Level geometry: the tile grid, board parsing, built-in rooms and routing.

pub mod direction;
pub mod grid;
pub mod levels;
pub mod parser;
pub mod pathfinding;
