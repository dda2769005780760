//! Gameplay tuning.
//!
//! Every field has a default matching the shipped game; any of them can be
//! overridden with an `OFFBEAT_`-prefixed environment variable, e.g.
//! `OFFBEAT_BEAT_INTERVAL_MS=500`.

use bevy_ecs::resource::Resource;
use figment::{providers::Env, Figment};
use serde::Deserialize;
use tracing::debug;

use crate::constants::{beat, enemy, player, projectile};
use crate::error::ConfigError;

/// Tunable values for one play session.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub beat_interval_ms: u64,
    pub beat_window_ms: u64,
    pub perfect_window_ms: u64,
    pub latency_offset_ms: i64,
    pub flash_duration_ms: u64,

    pub player_move_ms: u64,
    pub hop_arc_height: f32,
    pub player_max_health: u32,
    pub invulnerability_ms: u64,
    pub hurt_ms: u64,
    pub max_ammo: u32,
    pub on_beat_move_reward: u32,
    pub off_beat_move_cost: u32,
    /// Ammo removed on every off-beat action. Zero disables the penalty.
    pub rhythm_break_penalty: u32,
    pub contact_damage: u32,

    pub enemy_move_ms: u64,
    pub enemy_detection_range: f32,
    pub enemy_move_every: Vec<u32>,

    pub projectile_speed: f32,
    pub projectile_lifetime_ms: u64,
    pub projectile_damage: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            beat_interval_ms: beat::INTERVAL,
            beat_window_ms: beat::WINDOW,
            perfect_window_ms: beat::PERFECT_WINDOW,
            latency_offset_ms: beat::LATENCY_OFFSET,
            flash_duration_ms: beat::FLASH_DURATION,
            player_move_ms: player::MOVE_DURATION,
            hop_arc_height: player::HOP_ARC_HEIGHT,
            player_max_health: player::MAX_HEALTH,
            invulnerability_ms: player::INVULNERABILITY,
            hurt_ms: player::HURT_DURATION,
            max_ammo: player::MAX_AMMO,
            on_beat_move_reward: player::ON_BEAT_MOVE_REWARD,
            off_beat_move_cost: player::OFF_BEAT_MOVE_COST,
            rhythm_break_penalty: player::RHYTHM_BREAK_PENALTY,
            contact_damage: player::CONTACT_DAMAGE,
            enemy_move_ms: enemy::MOVE_DURATION,
            enemy_detection_range: enemy::DETECTION_RANGE,
            enemy_move_every: enemy::MOVE_EVERY.to_vec(),
            projectile_speed: projectile::SPEED,
            projectile_lifetime_ms: projectile::LIFETIME,
            projectile_damage: projectile::DAMAGE,
        }
    }
}

impl Tuning {
    /// Loads tuning from `OFFBEAT_*` environment variables layered over the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Env::prefixed("OFFBEAT_")))
    }

    /// Extracts and validates tuning from an arbitrary provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let tuning: Tuning = figment.extract().map_err(Box::new)?;
        tuning.validate()?;
        debug!(
            interval = tuning.beat_interval_ms,
            window = tuning.beat_window_ms,
            perfect = tuning.perfect_window_ms,
            offset = tuning.latency_offset_ms,
            "Tuning loaded"
        );
        Ok(tuning)
    }

    /// Rejects combinations the beat clock and the actors cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beat_interval_ms == 0 {
            return Err(ConfigError::Invalid("beat interval must be positive".to_string()));
        }
        if self.perfect_window_ms > self.beat_window_ms {
            return Err(ConfigError::Invalid(format!(
                "perfect window ({}ms) exceeds beat window ({}ms)",
                self.perfect_window_ms, self.beat_window_ms
            )));
        }
        if self.player_move_ms == 0 || self.enemy_move_ms == 0 {
            return Err(ConfigError::Invalid("move durations must be positive".to_string()));
        }
        if self.enemy_move_every.is_empty() || self.enemy_move_every.contains(&0) {
            return Err(ConfigError::Invalid(
                "enemy_move_every needs at least one non-zero beat divisor".to_string(),
            ));
        }
        Ok(())
    }
}
