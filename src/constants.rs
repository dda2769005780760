//! This module contains all the constants used in the game.

use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of each cell, in pixels.
pub const TILE_SIZE: f32 = 24.0;

/// Upper bound on the number of hops a pursuit path may contain.
pub const MAX_PATH_HOPS: usize = 20;

/// Beat clock defaults. All values are milliseconds.
pub mod beat {
    /// Time between two beats.
    pub const INTERVAL: u64 = 600;
    /// Radius around a beat that still counts as on-beat.
    pub const WINDOW: u64 = 125;
    /// Radius around a beat that counts as perfect.
    pub const PERFECT_WINDOW: u64 = 30;
    /// Added to the current time before classifying, to counter output lag.
    pub const LATENCY_OFFSET: i64 = 25;
    /// How long the visual flash takes to fade after a beat.
    pub const FLASH_DURATION: u64 = 100;
}

/// Player defaults.
pub mod player {
    pub const MOVE_DURATION: u64 = 200;
    /// Peak height of the hop arc, in pixels.
    pub const HOP_ARC_HEIGHT: f32 = 5.0;
    pub const MAX_HEALTH: u32 = 6;
    pub const INVULNERABILITY: u64 = 1500;
    pub const HURT_DURATION: u64 = 300;
    pub const MAX_AMMO: u32 = 12;
    pub const ON_BEAT_MOVE_REWARD: u32 = 1;
    pub const OFF_BEAT_MOVE_COST: u32 = 2;
    pub const RHYTHM_BREAK_PENALTY: u32 = 0;
    pub const CONTACT_DAMAGE: u32 = 1;
}

/// Enemy defaults.
pub mod enemy {
    pub const MOVE_DURATION: u64 = 200;
    /// Euclidean distance, in tiles, at which an enemy starts pursuing.
    pub const DETECTION_RANGE: f32 = 8.0;
    /// Each enemy moves on every Nth beat, with N drawn from this list at spawn.
    pub const MOVE_EVERY: [u32; 2] = [2, 3];
    pub const DEFAULT_HEALTH: u32 = 3;
}

/// Projectile defaults.
pub mod projectile {
    /// Pixels per second.
    pub const SPEED: f32 = 300.0;
    pub const LIFETIME: u64 = 2000;
    pub const DAMAGE: u32 = 1;
}
