use std::collections::{HashMap, HashSet, VecDeque};

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use glam::IVec2;
use rand::seq::SliceRandom;
use tracing::{trace, warn};

use crate::{
    config::Tuning,
    events::GameEvent,
    map::{direction::Direction, grid::Grid, pathfinding::find_path},
    systems::{
        check_move, damage_player, Conductor, Enemy, GameRng, GameTime, Health, Invulnerability, MoveCheck, Player,
        PlayerState, Step, TilePosition, VisualPosition,
    },
};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Moving(Step),
}

impl EnemyState {
    pub fn is_idle(self) -> bool {
        matches!(self, EnemyState::Idle)
    }
}

/// Beat bookkeeping for an enemy's decisions.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyBrain {
    /// The enemy acts on beats divisible by this.
    pub move_every: u32,
    /// Last beat this enemy has seen.
    pub last_beat: u32,
}

impl EnemyBrain {
    pub fn new(move_every: u32) -> Self {
        Self {
            move_every: move_every.max(1),
            last_beat: 0,
        }
    }

    /// Records `beat` if it is new. Returns true if the enemy should act on it.
    pub fn observe(&mut self, beat: u32) -> bool {
        if beat <= self.last_beat {
            return false;
        }
        self.last_beat = beat;
        beat % self.move_every == 0
    }
}

/// The route an enemy is currently following toward the player.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Pursuit {
    pub path: VecDeque<IVec2>,
}

/// When the enemy was last hit, for a presentation flash.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitFlash {
    pub at: Option<u64>,
}

impl HitFlash {
    pub fn hit(&mut self, now: u64) {
        self.at = Some(now);
    }
}

/// Starts a step and commits the logical cell.
fn begin_step(state: &mut EnemyState, position: &mut TilePosition, to: IVec2, now: u64, duration: u64) {
    *state = EnemyState::Moving(Step::new(position.0, to, now, duration));
    position.0 = to;
}

/// Tries the four directions in random order and takes the first free one.
fn move_randomly(
    grid: &Grid,
    occupied: &HashSet<IVec2>,
    rng: &mut GameRng,
    state: &mut EnemyState,
    position: &mut TilePosition,
    now: u64,
    duration: u64,
) -> bool {
    let mut directions = Direction::DIRECTIONS;
    directions.shuffle(&mut rng.0);

    let none = HashSet::new();
    for direction in directions {
        if let MoveCheck::Free(to) = check_move(grid, position.0, direction.as_ivec2(), occupied, &none) {
            trace!(from = %position.0, to = %to, "Enemy wandering");
            begin_step(state, position, to, now, duration);
            return true;
        }
    }
    false
}

/// Takes the next step of the pursuit path.
///
/// A step that is not one cardinal tile away drops the path and wanders
/// instead, as does an empty path. A step into a blocked or occupied cell drops
/// the path and the enemy stays put this beat.
#[allow(clippy::too_many_arguments)]
pub fn follow_path(
    grid: &Grid,
    occupied: &HashSet<IVec2>,
    rng: &mut GameRng,
    pursuit: &mut Pursuit,
    state: &mut EnemyState,
    position: &mut TilePosition,
    now: u64,
    duration: u64,
) -> bool {
    let Some(next) = pursuit.path.front().copied() else {
        return move_randomly(grid, occupied, rng, state, position, now, duration);
    };

    match check_move(grid, position.0, next - position.0, occupied, &HashSet::new()) {
        MoveCheck::Free(to) => {
            pursuit.path.pop_front();
            begin_step(state, position, to, now, duration);
            true
        }
        MoveCheck::NotCardinal => {
            warn!(from = %position.0, next = %next, "Discarding malformed path");
            pursuit.path.clear();
            move_randomly(grid, occupied, rng, state, position, now, duration)
        }
        _ => {
            pursuit.path.clear();
            false
        }
    }
}

/// Decides each enemy's move on the beats it acts on.
///
/// An enemy with the player inside its detection range recomputes its route
/// (treating other enemies as obstacles) and takes the first step. Without a
/// route it wanders. A route whose next step fails is dropped.
#[allow(clippy::too_many_arguments)]
pub fn enemy_decision_system(
    time: Res<GameTime>,
    tuning: Res<Tuning>,
    grid: Res<Grid>,
    conductor: Res<Conductor>,
    mut rng: ResMut<GameRng>,
    players: Query<&TilePosition, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(Entity, &mut EnemyBrain, &mut EnemyState, &mut TilePosition, &mut Pursuit), With<Enemy>>,
) {
    if !conductor.is_active() {
        return;
    }
    let now = time.now;
    let beat = conductor.beat_count();
    let player = players.single().ok().map(|p| p.0);

    let mut cells: HashMap<Entity, IVec2> = enemies.iter().map(|(entity, _, _, position, _)| (entity, position.0)).collect();

    for (entity, mut brain, mut state, mut position, mut pursuit) in enemies.iter_mut() {
        if !brain.observe(beat) || !state.is_idle() {
            continue;
        }

        let occupied: HashSet<IVec2> = cells
            .iter()
            .filter(|(other, _)| **other != entity)
            .map(|(_, cell)| *cell)
            .collect();

        let target = player.filter(|&cell| cell.as_vec2().distance(position.0.as_vec2()) <= tuning.enemy_detection_range);
        if let Some(goal) = target {
            pursuit.path = find_path(&grid, &occupied, position.0, goal).into();
            trace!(from = %position.0, goal = %goal, hops = pursuit.path.len(), "Enemy recomputed path");
        }

        let duration = tuning.enemy_move_ms;
        let moved = if target.is_some() {
            follow_path(&grid, &occupied, &mut rng, &mut pursuit, &mut state, &mut position, now, duration)
        } else {
            move_randomly(&grid, &occupied, &mut rng, &mut state, &mut position, now, duration)
        };

        if moved {
            cells.insert(entity, position.0);
        }
    }
}

/// Interpolates moving enemies and resolves their arrival.
///
/// An enemy finishing its step on the player's cell damages the player after
/// the move completes.
#[allow(clippy::type_complexity)]
pub fn enemy_motion_system(
    time: Res<GameTime>,
    tuning: Res<Tuning>,
    grid: Res<Grid>,
    mut rng: ResMut<GameRng>,
    mut events: EventWriter<GameEvent>,
    mut enemies: Query<(&mut EnemyState, &TilePosition, &mut VisualPosition), (With<Enemy>, Without<Player>)>,
    mut players: Query<
        (&mut PlayerState, &mut Health, &mut Invulnerability, &mut TilePosition),
        (With<Player>, Without<Enemy>),
    >,
) {
    let now = time.now;
    for (mut state, position, mut visual) in enemies.iter_mut() {
        let EnemyState::Moving(step) = *state else {
            continue;
        };

        if !step.is_complete(now) {
            visual.0 = step.visual(now, 0.0);
            continue;
        }

        *state = EnemyState::Idle;
        visual.0 = Grid::pixel_center(position.0);

        let Ok((mut player_state, mut health, mut invulnerability, mut player_position)) = players.single_mut() else {
            continue;
        };
        if player_position.0 != position.0 {
            continue;
        }

        trace!(cell = %position.0, "Enemy landed on the player");
        if let Some(hit) = damage_player(
            tuning.contact_damage,
            now,
            &tuning,
            &grid,
            &mut rng,
            &mut player_state,
            &mut health,
            &mut invulnerability,
            &mut player_position,
        ) {
            events.write(GameEvent::PlayerHurt { health: hit.health });
            if hit.died {
                events.write(GameEvent::PlayerDied);
            }
        }
    }
}
