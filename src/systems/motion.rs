//! Tile-to-tile movement shared by every actor.
//!
//! A move is logically complete the instant it starts: the actor's
//! [`TilePosition`](crate::systems::TilePosition) is committed to the destination and only the
//! visual position lags behind, following a [`Step`] until it finishes.

use std::collections::HashSet;
use std::f32::consts::PI;

use glam::{IVec2, Vec2};

use crate::map::grid::Grid;

/// One tile-to-tile move in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: IVec2,
    pub to: IVec2,
    pub started_at: u64,
    pub duration: u64,
}

impl Step {
    pub fn new(from: IVec2, to: IVec2, started_at: u64, duration: u64) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// Fraction of the move completed at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: u64) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at) as f32;
        (elapsed / self.duration as f32).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now: u64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Pixel position at `now`, lifted by a sine arc of `arc_height` pixels.
    ///
    /// Once complete the position is exactly the destination's center.
    pub fn visual(&self, now: u64, arc_height: f32) -> Vec2 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return Grid::pixel_center(self.to);
        }
        let base = Grid::pixel_center(self.from).lerp(Grid::pixel_center(self.to), progress);
        base - Vec2::new(0.0, arc_height * (progress * PI).sin())
    }
}

/// Outcome of checking a single move before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCheck {
    /// The destination is free; the move may start.
    Free(IVec2),
    /// Not exactly one cardinal step.
    NotCardinal,
    /// Out of bounds or statically blocking.
    Blocked,
    /// Another actor of the same class stands there.
    Occupied,
    /// An opposing actor stands there; the mover resolves contact instead of moving.
    Contact(IVec2),
}

/// Validates a move of `offset` from `from`.
///
/// `blockers` are cells the mover may not enter; `opponents` are cells where it
/// makes contact instead. Either set may be empty.
pub fn check_move(
    grid: &Grid,
    from: IVec2,
    offset: IVec2,
    blockers: &HashSet<IVec2>,
    opponents: &HashSet<IVec2>,
) -> MoveCheck {
    if offset.x.abs() + offset.y.abs() != 1 {
        return MoveCheck::NotCardinal;
    }
    let to = from + offset;
    if grid.is_blocking(to) {
        MoveCheck::Blocked
    } else if opponents.contains(&to) {
        MoveCheck::Contact(to)
    } else if blockers.contains(&to) {
        MoveCheck::Occupied
    } else {
        MoveCheck::Free(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps() {
        let step = Step::new(IVec2::ZERO, IVec2::X, 1_000, 200);
        assert_eq!(step.progress(900), 0.0);
        assert_eq!(step.progress(1_100), 0.5);
        assert_eq!(step.progress(5_000), 1.0);
    }

    #[test]
    fn test_visual_arc_peaks_midway() {
        let step = Step::new(IVec2::ZERO, IVec2::X, 0, 200);
        let mid = step.visual(100, 5.0);
        let expected = (Grid::pixel_center(IVec2::ZERO) + Grid::pixel_center(IVec2::X)) / 2.0;
        assert!((mid.x - expected.x).abs() < 1e-4);
        assert!((mid.y - (expected.y - 5.0)).abs() < 1e-4);
        assert_eq!(step.visual(200, 5.0), Grid::pixel_center(IVec2::X));
    }

    #[test]
    fn test_check_move_order() {
        let grid = Grid::open(3, 3);
        let none = HashSet::new();
        let here = IVec2::new(1, 1);
        assert_eq!(check_move(&grid, here, IVec2::new(1, 1), &none, &none), MoveCheck::NotCardinal);
        assert_eq!(check_move(&grid, IVec2::ZERO, -IVec2::X, &none, &none), MoveCheck::Blocked);
        let taken = HashSet::from([IVec2::new(2, 1)]);
        assert_eq!(check_move(&grid, here, IVec2::X, &taken, &none), MoveCheck::Occupied);
        assert_eq!(
            check_move(&grid, here, IVec2::X, &none, &taken),
            MoveCheck::Contact(IVec2::new(2, 1))
        );
        assert_eq!(check_move(&grid, here, IVec2::Y, &none, &none), MoveCheck::Free(IVec2::new(1, 2)));
    }
}
