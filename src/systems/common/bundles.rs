use bevy_ecs::bundle::Bundle;
use glam::IVec2;

use crate::{
    config::Tuning,
    map::{direction::Direction, grid::Grid},
    systems::{
        Ammo, Enemy, EnemyBrain, EnemyState, Facing, Health, HitFlash, Invulnerability, Player, PlayerState, Projectile,
        Pursuit, TilePosition, VisualPosition,
    },
};

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub position: TilePosition,
    pub visual: VisualPosition,
    pub facing: Facing,
    pub health: Health,
    pub state: PlayerState,
    pub invulnerability: Invulnerability,
    pub ammo: Ammo,
}

impl PlayerBundle {
    pub fn new(cell: IVec2, tuning: &Tuning) -> Self {
        Self {
            player: Player,
            position: TilePosition(cell),
            visual: VisualPosition::at_cell(cell),
            facing: Facing::default(),
            health: Health::full(tuning.player_max_health),
            state: PlayerState::Idle,
            invulnerability: Invulnerability::default(),
            ammo: Ammo::empty(tuning.max_ammo),
        }
    }
}

#[derive(Bundle)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub position: TilePosition,
    pub visual: VisualPosition,
    pub health: Health,
    pub state: EnemyState,
    pub brain: EnemyBrain,
    pub pursuit: Pursuit,
    pub flash: HitFlash,
}

impl EnemyBundle {
    pub fn new(cell: IVec2, health: u32, move_every: u32) -> Self {
        Self {
            enemy: Enemy,
            position: TilePosition(cell),
            visual: VisualPosition::at_cell(cell),
            health: Health::full(health),
            state: EnemyState::Idle,
            brain: EnemyBrain::new(move_every),
            pursuit: Pursuit::default(),
            flash: HitFlash::default(),
        }
    }
}

#[derive(Bundle)]
pub struct ProjectileBundle {
    pub projectile: Projectile,
}

impl ProjectileBundle {
    /// A projectile leaving the center of `cell` toward `direction`.
    pub fn new(cell: IVec2, direction: Direction, now: u64, speed: f32) -> Self {
        Self {
            projectile: Projectile {
                position: Grid::pixel_center(cell),
                velocity: direction.as_ivec2().as_vec2() * speed,
                spawned_at: now,
            },
        }
    }
}
