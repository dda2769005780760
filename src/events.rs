use bevy_ecs::prelude::*;

use crate::map::direction::Direction;

/// Discrete player intents delivered by whatever owns the input devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    MovePlayer(Direction),
    Shoot,
    /// Respawn after death. Ignored while the player is alive.
    Restart,
}

/// Everything that flows through the frame's event queue: incoming commands
/// and the outcomes systems report back to the presentation layer.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// A new beat fired; carries the beat counter.
    Beat(u32),
    Shot,
    PlayerHurt { health: u32 },
    PlayerDied,
    PlayerRespawned,
    EnemyHit { health: u32 },
    EnemyDefeated,
    /// The streak was lost; carries the streak value before the reset.
    StreakBroken { streak: u32 },
}

impl GameEvent {
    /// True for events produced by systems rather than queued input.
    pub fn is_outcome(&self) -> bool {
        !matches!(self, GameEvent::Command(_))
    }
}
