use std::collections::HashSet;

use bevy_ecs::{
    component::Component,
    event::{EventReader, EventWriter},
    query::{With, Without},
    system::{Commands, ParamSet, Query, Res, ResMut},
};
use glam::IVec2;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::{
    config::Tuning,
    events::{GameCommand, GameEvent},
    map::{direction::Direction, grid::Grid},
    systems::{
        check_move, judge_action, ActionRhythm, Conductor, Enemy, Facing, GameRng, GameTime, Health, LevelInfo, MoveCheck,
        Player, ProjectileBundle, RhythmState, Step, TilePosition, VisualPosition,
    },
};

/// Motion and lifecycle state of the player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Moving(Step),
    /// Recovering from a hit that found no knockback direction.
    Hurt {
        since: u64,
    },
    /// Terminal until a restart.
    Dead,
}

impl PlayerState {
    /// Only an idle player accepts moves and shots.
    pub fn is_idle(self) -> bool {
        matches!(self, PlayerState::Idle)
    }

    pub fn is_dead(self) -> bool {
        matches!(self, PlayerState::Dead)
    }

    /// The state this one settles into at `now`.
    pub fn advanced(self, now: u64, hurt_ms: u64, alive: bool) -> PlayerState {
        match self {
            PlayerState::Moving(step) if step.is_complete(now) => PlayerState::Idle,
            PlayerState::Hurt { since } if alive && now.saturating_sub(since) > hurt_ms => PlayerState::Idle,
            other => other,
        }
    }
}

/// Grace period after a hit or a respawn during which damage is ignored.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invulnerability {
    since: Option<u64>,
}

impl Invulnerability {
    pub fn start(&mut self, now: u64) {
        self.since = Some(now);
    }

    pub fn is_active(&self) -> bool {
        self.since.is_some()
    }

    /// Ends the window once strictly more than `duration` has elapsed.
    pub fn expire(&mut self, now: u64, duration: u64) {
        if self.since.is_some_and(|since| now.saturating_sub(since) > duration) {
            self.since = None;
        }
    }
}

/// Projectiles the player can fire, earned by moving on beat.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ammo {
    pub count: u32,
    pub max: u32,
}

impl Ammo {
    pub fn empty(max: u32) -> Self {
        Self { count: 0, max }
    }

    pub fn gain(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount).min(self.max);
    }

    pub fn lose(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
    }

    /// Takes one unit if any is left.
    pub fn take_one(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

/// Result of a hit that landed on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHit {
    pub health: u32,
    pub died: bool,
}

/// Applies a hit to the player and knocks them one cell in a random direction.
///
/// Returns `None` when the hit is ignored because the player is invulnerable or
/// already dead. The knockback destination only has to be walkable; other actors
/// do not block it.
#[allow(clippy::too_many_arguments)]
pub fn damage_player(
    amount: u32,
    now: u64,
    tuning: &Tuning,
    grid: &Grid,
    rng: &mut GameRng,
    state: &mut PlayerState,
    health: &mut Health,
    invulnerability: &mut Invulnerability,
    position: &mut TilePosition,
) -> Option<PlayerHit> {
    if invulnerability.is_active() || state.is_dead() {
        return None;
    }

    health.damage(amount);
    *state = PlayerState::Hurt { since: now };
    invulnerability.start(now);

    let mut directions = Direction::DIRECTIONS;
    directions.shuffle(&mut rng.0);
    if let Some(to) = directions
        .iter()
        .map(|d| position.0 + d.as_ivec2())
        .find(|&to| grid.is_walkable(to))
    {
        *state = PlayerState::Moving(Step::new(position.0, to, now, tuning.player_move_ms));
        position.0 = to;
    }

    let died = health.is_depleted();
    if died {
        *state = PlayerState::Dead;
        debug!(cell = %position.0, "Player died");
    } else {
        debug!(health = health.current, cell = %position.0, "Player hurt");
    }

    Some(PlayerHit {
        health: health.current,
        died,
    })
}

fn report_hit(hit: PlayerHit, events: &mut EventWriter<GameEvent>) {
    events.write(GameEvent::PlayerHurt { health: hit.health });
    if hit.died {
        events.write(GameEvent::PlayerDied);
    }
}

/// Applies queued player commands: moves, shots and restarts.
///
/// Every move or shot that succeeds is judged against the beat. Moves also feed
/// the ammo economy, and any off-beat action pays the rhythm-break penalty.
#[allow(clippy::too_many_arguments)]
pub fn player_command_system(
    mut commands: Commands,
    time: Res<GameTime>,
    tuning: Res<Tuning>,
    grid: Res<Grid>,
    level: Res<LevelInfo>,
    mut conductor: ResMut<Conductor>,
    mut rhythm: ResMut<RhythmState>,
    mut rng: ResMut<GameRng>,
    mut events: ParamSet<(EventReader<GameEvent>, EventWriter<GameEvent>)>,
    mut players: Query<
        (
            &mut PlayerState,
            &mut Facing,
            &mut TilePosition,
            &mut VisualPosition,
            &mut Health,
            &mut Invulnerability,
            &mut Ammo,
        ),
        With<Player>,
    >,
    enemies: Query<&TilePosition, (With<Enemy>, Without<Player>)>,
) {
    let queued: Vec<GameCommand> = events
        .p0()
        .read()
        .filter_map(|event| match event {
            GameEvent::Command(command) => Some(*command),
            _ => None,
        })
        .collect();
    if queued.is_empty() {
        return;
    }

    let Ok((mut state, mut facing, mut position, mut visual, mut health, mut invulnerability, mut ammo)) =
        players.single_mut()
    else {
        return;
    };

    let now = time.now;
    let enemy_cells: HashSet<IVec2> = enemies.iter().map(|p| p.0).collect();
    let mut writer = events.p1();

    for command in queued {
        if let GameCommand::Restart = command {
            if state.is_dead() {
                *state = PlayerState::Idle;
                position.0 = level.player_start;
                *visual = VisualPosition::at_cell(level.player_start);
                health.restore();
                invulnerability.start(now);
                debug!(cell = %level.player_start, "Player respawned");
                writer.write(GameEvent::PlayerRespawned);
            }
            continue;
        }

        if !state.is_idle() {
            trace!(?command, state = ?*state, "Ignoring command while busy");
            continue;
        }

        let rhythm_result = match command {
            GameCommand::MovePlayer(direction) => {
                facing.0 = direction;
                match check_move(&grid, position.0, direction.as_ivec2(), &HashSet::new(), &enemy_cells) {
                    MoveCheck::Free(to) => {
                        *state = PlayerState::Moving(Step::new(position.0, to, now, tuning.player_move_ms));
                        position.0 = to;
                        trace!(direction = direction.as_ref(), cell = %to, "Player moved");

                        let result = judge_action(&mut conductor, &mut rhythm, now);
                        if result.is_on_beat() {
                            ammo.gain(tuning.on_beat_move_reward);
                        } else {
                            ammo.lose(tuning.off_beat_move_cost);
                        }
                        Some(result)
                    }
                    MoveCheck::Contact(cell) => {
                        trace!(cell = %cell, "Player bumped into an enemy");
                        if let Some(hit) = damage_player(
                            tuning.contact_damage,
                            now,
                            &tuning,
                            &grid,
                            &mut rng,
                            &mut state,
                            &mut health,
                            &mut invulnerability,
                            &mut position,
                        ) {
                            report_hit(hit, &mut writer);
                        }
                        None
                    }
                    _ => None,
                }
            }
            GameCommand::Shoot => {
                if !ammo.take_one() {
                    continue;
                }
                commands.spawn(ProjectileBundle::new(position.0, facing.0, now, tuning.projectile_speed));
                writer.write(GameEvent::Shot);
                trace!(direction = facing.0.as_ref(), ammo = ammo.count, "Player shot");
                Some(judge_action(&mut conductor, &mut rhythm, now))
            }
            GameCommand::Restart => None,
        };

        if let Some(ActionRhythm::OffBeat { broken }) = rhythm_result {
            ammo.lose(tuning.rhythm_break_penalty);
            if let Some(streak) = broken {
                writer.write(GameEvent::StreakBroken { streak });
            }
        }
    }
}

/// Advances the player's timers and interpolation.
pub fn player_motion_system(
    time: Res<GameTime>,
    tuning: Res<Tuning>,
    mut players: Query<
        (
            &mut PlayerState,
            &mut Invulnerability,
            &Health,
            &TilePosition,
            &mut VisualPosition,
        ),
        With<Player>,
    >,
) {
    let now = time.now;
    for (mut state, mut invulnerability, health, position, mut visual) in players.iter_mut() {
        invulnerability.expire(now, tuning.invulnerability_ms);

        let next = state.advanced(now, tuning.hurt_ms, !health.is_depleted());
        if next != *state {
            *state = next;
        }

        visual.0 = match *state {
            PlayerState::Moving(step) => step.visual(now, tuning.hop_arc_height),
            _ => Grid::pixel_center(position.0),
        };
    }
}
