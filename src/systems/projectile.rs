use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::With,
    system::{Commands, Query, Res},
};
use glam::{IVec2, Vec2};
use tracing::debug;

use crate::{
    config::Tuning,
    constants::TILE_SIZE,
    events::GameEvent,
    map::grid::Grid,
    systems::{Enemy, GameTime, Health, HitFlash, TilePosition},
};

/// A shot in flight, moving in a straight line at constant speed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Pixel position.
    pub position: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
    pub spawned_at: u64,
}

impl Projectile {
    pub fn cell(&self) -> IVec2 {
        Grid::cell_of_pixel(self.position)
    }
}

/// Longest distance a projectile moves between collision checks. Half a tile
/// guarantees every cell along a cardinal line is visited.
const MAX_SWEEP_STEP: f32 = TILE_SIZE / 2.0;

/// What stopped a projectile during its sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Impact {
    Wall,
    Enemy(Entity, IVec2),
}

/// Advances the projectile by `travel` in sub-steps, stopping at the first
/// blocking cell or enemy. Walls are checked before enemies in each cell.
fn sweep(projectile: &mut Projectile, travel: Vec2, grid: &Grid, enemy_at: impl Fn(IVec2) -> Option<Entity>) -> Option<Impact> {
    let steps = (travel.length() / MAX_SWEEP_STEP).ceil().max(1.0) as u32;
    let step = travel / steps as f32;

    for _ in 0..steps {
        projectile.position += step;
        let cell = projectile.cell();
        if grid.is_blocking(cell) {
            return Some(Impact::Wall);
        }
        if let Some(enemy) = enemy_at(cell) {
            return Some(Impact::Enemy(enemy, cell));
        }
    }
    None
}

/// Moves projectiles and resolves what they run into.
///
/// A projectile ends when its lifetime runs out, when it leaves the grid or
/// enters a blocking cell, or when it reaches a cell holding an enemy, which
/// then takes damage. Every cell crossed during the frame is checked, so a
/// long frame cannot carry a shot through a wall or an enemy. Enemies whose
/// health runs out are despawned.
pub fn projectile_system(
    mut commands: Commands,
    time: Res<GameTime>,
    tuning: Res<Tuning>,
    grid: Res<Grid>,
    mut events: EventWriter<GameEvent>,
    mut projectiles: Query<(Entity, &mut Projectile)>,
    mut enemies: Query<(Entity, &TilePosition, &mut Health, &mut HitFlash), With<Enemy>>,
) {
    let now = time.now;
    let dt = time.delta_seconds();

    for (entity, mut projectile) in projectiles.iter_mut() {
        if now.saturating_sub(projectile.spawned_at) > tuning.projectile_lifetime_ms {
            commands.entity(entity).despawn();
            continue;
        }

        let travel = projectile.velocity * dt;
        // Enemies already emptied this frame are waiting on their despawn.
        let impact = sweep(&mut projectile, travel, &grid, |cell| {
            enemies
                .iter()
                .find(|(_, position, health, _)| position.0 == cell && !health.is_depleted())
                .map(|(enemy, ..)| enemy)
        });

        let (enemy, cell) = match impact {
            None => continue,
            Some(Impact::Wall) => {
                commands.entity(entity).despawn();
                continue;
            }
            Some(Impact::Enemy(enemy, cell)) => (enemy, cell),
        };

        commands.entity(entity).despawn();
        let Ok((_, _, mut health, mut flash)) = enemies.get_mut(enemy) else {
            continue;
        };
        flash.hit(now);
        let defeated = health.damage(tuning.projectile_damage);
        events.write(GameEvent::EnemyHit { health: health.current });
        if defeated {
            debug!(cell = %cell, "Enemy defeated");
            commands.entity(enemy).despawn();
            events.write(GameEvent::EnemyDefeated);
        } else {
            debug!(cell = %cell, health = health.current, "Enemy hit");
        }
    }
}
