#![allow(dead_code)]

use bevy_ecs::{entity::Entity, event::Events, world::World};
use glam::IVec2;
use offbeat::{
    config::Tuning,
    events::{GameCommand, GameEvent},
    map::{grid::Grid, parser::BoardParser},
    systems::{
        Conductor, EnemyBundle, GameRng, GameTime, LevelInfo, LevelStatus, PlayerBundle, RhythmState,
    },
};

/// A 7x7 room: walls around an open 5x5 floor.
pub const TEST_BOARD: &[&str] = &[
    "###D###",
    "#.....#",
    "#.....#",
    "#.....#",
    "#.....#",
    "#.....#",
    "#######",
];

/// Default tuning without latency compensation, so timings read as written.
pub fn test_tuning() -> Tuning {
    Tuning {
        latency_offset_ms: 0,
        ..Tuning::default()
    }
}

/// Creates a world on the given board with every resource the systems need.
/// The beat clock is started at t=0.
pub fn create_test_world_with(board: &[&str], tuning: Tuning) -> World {
    let grid = BoardParser::parse_grid(board).expect("Test board should parse");
    let exit = IVec2::new(grid.width() / 2, 1);

    let mut conductor = Conductor::new(&tuning);
    conductor.start(0);

    let mut world = World::new();
    world.insert_resource(Events::<GameEvent>::default());
    world.insert_resource(GameTime::at(0));
    world.insert_resource(GameRng::seeded(7));
    world.insert_resource(conductor);
    world.insert_resource(RhythmState::default());
    world.insert_resource(LevelInfo {
        number: 1,
        player_start: IVec2::new(1, 1),
        exit,
    });
    world.insert_resource(LevelStatus::default());
    world.insert_resource(grid);
    world.insert_resource(tuning);
    world
}

pub fn create_test_world() -> World {
    create_test_world_with(TEST_BOARD, test_tuning())
}

/// An unobstructed grid, for routing tests.
pub fn open_world(width: usize, height: usize) -> World {
    let mut world = create_test_world();
    world.insert_resource(Grid::open(width, height));
    world
}

pub fn spawn_test_player(world: &mut World, cell: IVec2) -> Entity {
    let tuning = world.resource::<Tuning>().clone();
    world.spawn(PlayerBundle::new(cell, &tuning)).id()
}

pub fn spawn_test_enemy(world: &mut World, cell: IVec2, health: u32, move_every: u32) -> Entity {
    world.spawn(EnemyBundle::new(cell, health, move_every)).id()
}

pub fn send_game_event(world: &mut World, event: GameEvent) {
    let mut events = world.resource_mut::<Events<GameEvent>>();
    events.send(event);
}

/// Drops every buffered event, so the next system run only sees what follows.
pub fn clear_events(world: &mut World) {
    world.resource_mut::<Events<GameEvent>>().clear();
}

/// Queues a player command.
pub fn send_command(world: &mut World, command: GameCommand) {
    send_game_event(world, GameEvent::Command(command));
}

/// Moves the frame clock to `now`, recording the delta from the previous frame.
pub fn set_time(world: &mut World, now: u64) {
    let previous = world.resource::<GameTime>().now;
    world.insert_resource(GameTime {
        now,
        delta: now.saturating_sub(previous),
    });
}

/// Advances the beat clock to `now`, one tick per call like a frame would.
pub fn tick_conductor(world: &mut World, now: u64) -> bool {
    set_time(world, now);
    world.resource_mut::<Conductor>().tick(now)
}

/// Every outcome currently buffered, ignoring queued commands.
pub fn outcomes(world: &World) -> Vec<GameEvent> {
    world
        .resource::<Events<GameEvent>>()
        .iter_current_update_events()
        .filter(|event| event.is_outcome())
        .copied()
        .collect()
}
