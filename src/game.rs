//! This module contains the main game logic and state for one level.

use bevy_ecs::event::{EventCursor, EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule};
use bevy_ecs::world::World;
use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::config::Tuning;
use crate::constants;
use crate::error::GameResult;
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::map::direction::Direction;
use crate::map::levels::Level;
use crate::systems::{
    self, Ammo, Conductor, Enemy, EnemyBundle, EnemyState, Facing, GameRng, GameTime, Health, HitFlash, Invulnerability,
    LevelInfo, LevelStatus, Player, PlayerBundle, PlayerState, Projectile, RhythmState, Timing, TilePosition,
    VisualPosition,
};

/// What the presentation layer needs to draw the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub cell: IVec2,
    pub position: Vec2,
    pub facing: Direction,
    pub state: PlayerState,
    pub health: u32,
    pub max_health: u32,
    pub ammo: u32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyView {
    pub cell: IVec2,
    pub position: Vec2,
    pub state: EnemyState,
    pub health: u32,
    pub max_health: u32,
    pub last_hit_at: Option<u64>,
}

/// A read-only picture of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub level: u8,
    pub now: u64,
    pub player: Option<PlayerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<Vec2>,
    pub beat: u32,
    pub beat_flash: f32,
    /// Live classification of the current instant.
    pub timing: Timing,
    /// Classification of the last registered action.
    pub last_hit_timing: Timing,
    pub streak: u32,
    pub max_streak: u32,
    pub streak_broken: bool,
    pub objective_met: bool,
}

/// One playable level: an ECS world and the schedule that advances it.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    outcomes: EventCursor<GameEvent>,
}

impl Game {
    /// Builds a level and starts its beat clock at `now`.
    ///
    /// `seed` drives every random choice made in this level.
    pub fn new(level: Level, tuning: Tuning, seed: u64, now: u64) -> Game {
        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::spawn_actors(&mut world, &level, &tuning, seed);
        Self::insert_resources(&mut world, level, tuning, seed, now);
        Self::configure_schedule(&mut schedule);

        Game {
            world,
            schedule,
            outcomes: EventCursor::default(),
        }
    }

    /// Builds one of the built-in levels.
    pub fn builtin(number: u8, tuning: Tuning, seed: u64, now: u64) -> GameResult<Game> {
        Ok(Self::new(Level::builtin(number)?, tuning, seed, now))
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameEvent>(world);
    }

    fn insert_resources(world: &mut World, level: Level, tuning: Tuning, seed: u64, now: u64) {
        let mut conductor = Conductor::new(&tuning);
        conductor.start(now);

        world.insert_resource(GameTime::at(now));
        world.insert_resource(GameRng::seeded(seed));
        world.insert_resource(conductor);
        world.insert_resource(RhythmState::default());
        world.insert_resource(LevelInfo {
            number: level.number,
            player_start: level.player_start,
            exit: level.exit,
        });
        world.insert_resource(LevelStatus {
            enemies_remaining: level.enemies.len(),
            objective_met: false,
        });
        world.insert_resource(level.grid);
        world.insert_resource(tuning);
    }

    fn spawn_actors(world: &mut World, level: &Level, tuning: &Tuning, seed: u64) {
        // Kept apart from the gameplay stream so rosters stay stable as systems change.
        let mut rng = GameRng::seeded(seed ^ 0x5EED);

        world.spawn(PlayerBundle::new(level.player_start, tuning));
        for spawn in &level.enemies {
            let move_every = tuning
                .enemy_move_every
                .choose(&mut rng.0)
                .copied()
                .unwrap_or(constants::enemy::MOVE_EVERY[0]);
            world.spawn(EnemyBundle::new(spawn.cell, spawn.health, move_every));
            debug!(cell = %spawn.cell, health = spawn.health, move_every, "Enemy spawned");
        }

        info!(
            level = level.number,
            width = level.grid.width(),
            height = level.grid.height(),
            enemies = level.enemies.len(),
            "Level constructed"
        );
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule.add_systems(
            (
                systems::conductor_system,
                systems::rhythm_sweep_system,
                systems::player_command_system,
                systems::player_motion_system,
                systems::projectile_system,
                systems::enemy_decision_system,
                systems::enemy_motion_system,
                systems::level_status_system,
            )
                .chain(),
        );
    }

    /// Queues a player command for the next tick.
    pub fn post(&mut self, command: GameCommand) {
        self.world
            .resource_mut::<Events<GameEvent>>()
            .send(GameEvent::Command(command));
    }

    /// Runs one frame at `now` and returns the outcomes it produced.
    ///
    /// Times earlier than the previous frame are treated as that frame's time.
    pub fn tick(&mut self, now: u64) -> Vec<GameEvent> {
        let previous = self.world.resource::<GameTime>().now;
        let now = now.max(previous);
        self.world.insert_resource(GameTime {
            now,
            delta: now - previous,
        });

        self.schedule.run(&mut self.world);

        let outcomes: Vec<GameEvent> = {
            let events = self.world.resource::<Events<GameEvent>>();
            self.outcomes.read(events).filter(|e| e.is_outcome()).copied().collect()
        };
        self.world.resource_mut::<Events<GameEvent>>().update();

        formatter::record_frame(self.conductor().beat_count());
        outcomes
    }

    /// True once every enemy is gone and the player stands on the exit.
    pub fn objective_met(&self) -> bool {
        self.world.resource::<LevelStatus>().objective_met
    }

    pub fn level(&self) -> LevelInfo {
        *self.world.resource::<LevelInfo>()
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<GameTime>().now
    }

    pub fn conductor(&self) -> &Conductor {
        self.world.resource::<Conductor>()
    }

    pub fn rhythm(&self) -> &RhythmState {
        self.world.resource::<RhythmState>()
    }

    /// Stops the beat clock; timing reads [`Timing::None`] afterwards.
    pub fn stop(&mut self) {
        self.world.resource_mut::<Conductor>().stop();
    }

    /// Captures the current frame for presentation. Does not change any state.
    pub fn snapshot(&self) -> FrameSnapshot {
        let world = &self.world;
        let now = self.now();
        let conductor = self.conductor();
        let rhythm = self.rhythm();

        let player = world
            .try_query_filtered::<(
                &TilePosition,
                &VisualPosition,
                &Facing,
                &PlayerState,
                &Health,
                &Ammo,
                &Invulnerability,
            ), With<Player>>()
            .and_then(|mut query| {
                query
                    .iter(world)
                    .next()
                    .map(|(cell, visual, facing, state, health, ammo, invulnerability)| PlayerView {
                        cell: cell.0,
                        position: visual.0,
                        facing: facing.0,
                        state: *state,
                        health: health.current,
                        max_health: health.max,
                        ammo: ammo.count,
                        invulnerable: invulnerability.is_active(),
                    })
            });

        let enemies = world
            .try_query_filtered::<(&TilePosition, &VisualPosition, &EnemyState, &Health, &HitFlash), With<Enemy>>()
            .map(|mut query| {
                query
                    .iter(world)
                    .map(|(cell, visual, state, health, flash)| EnemyView {
                        cell: cell.0,
                        position: visual.0,
                        state: *state,
                        health: health.current,
                        max_health: health.max,
                        last_hit_at: flash.at,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let projectiles = world
            .try_query::<&Projectile>()
            .map(|mut query| query.iter(world).map(|p| p.position).collect())
            .unwrap_or_default();

        FrameSnapshot {
            level: self.level().number,
            now,
            player,
            enemies,
            projectiles,
            beat: conductor.beat_count(),
            beat_flash: conductor.flash(),
            timing: conductor.classify(now),
            last_hit_timing: conductor.last_hit_timing(),
            streak: rhythm.streak,
            max_streak: rhythm.max_streak,
            streak_broken: rhythm.streak_broken,
            objective_met: self.objective_met(),
        }
    }
}
