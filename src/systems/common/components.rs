use bevy_ecs::{component::Component, resource::Resource};
use glam::{IVec2, Vec2};
use rand::{rngs::SmallRng, SeedableRng};

use crate::map::direction::Direction;

/// Frame clock supplied by the owner of the loop.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameTime {
    /// Absolute time of this frame, in milliseconds.
    pub now: u64,
    /// Milliseconds since the previous frame.
    pub delta: u64,
}

impl GameTime {
    pub fn at(now: u64) -> Self {
        Self { now, delta: 0 }
    }

    /// Delta in seconds, for velocity-based movement.
    pub fn delta_seconds(&self) -> f32 {
        self.delta as f32 / 1000.0
    }
}

/// Seeded randomness shared by every system that shuffles or picks.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

/// The logical cell an actor occupies. Always the destination of the current move.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePosition(pub IVec2);

/// Interpolated pixel position, for presentation only.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualPosition(pub Vec2);

impl VisualPosition {
    pub fn at_cell(cell: IVec2) -> Self {
        Self(crate::map::grid::Grid::pixel_center(cell))
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Facing(pub Direction);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Removes up to `amount` health. Returns true if this emptied it.
    pub fn damage(&mut self, amount: u32) -> bool {
        self.current = self.current.saturating_sub(amount);
        self.is_depleted()
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

/// Tag for the player-controlled actor.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Tag for hostile actors.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Static facts about the level being played.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub number: u8,
    pub player_start: IVec2,
    pub exit: IVec2,
}

/// Updated once per frame; read by whoever owns level transitions.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelStatus {
    pub enemies_remaining: usize,
    pub objective_met: bool,
}
