use bevy_ecs::{
    query::With,
    system::{Query, Res, ResMut},
};
use tracing::info;

use crate::systems::{Enemy, LevelInfo, LevelStatus, Player, TilePosition};

/// Publishes whether the level's objective is met: no enemies left and the
/// player standing on the exit cell. Transitions are left to the caller.
pub fn level_status_system(
    level: Res<LevelInfo>,
    mut status: ResMut<LevelStatus>,
    enemies: Query<(), With<Enemy>>,
    players: Query<&TilePosition, With<Player>>,
) {
    let enemies_remaining = enemies.iter().count();
    let on_exit = players.single().is_ok_and(|position| position.0 == level.exit);
    let next = LevelStatus {
        enemies_remaining,
        objective_met: enemies_remaining == 0 && on_exit,
    };

    if next.objective_met && !status.objective_met {
        info!(level = level.number, "Level objective met");
    }
    if *status != next {
        *status = next;
    }
}
