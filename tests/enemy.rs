use std::collections::HashSet;

use bevy_ecs::{entity::Entity, system::RunSystemOnce, world::World};
use glam::IVec2;
use offbeat::{
    events::GameEvent,
    map::{direction::Direction, grid::Grid, pathfinding::manhattan},
    systems::{
        enemy_decision_system, enemy_motion_system, follow_path, Conductor, EnemyState, GameRng, Health,
        Invulnerability, Pursuit, Step, TilePosition,
    },
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn decide(world: &mut World) {
    world
        .run_system_once(enemy_decision_system)
        .expect("System should run successfully");
}

fn settle(world: &mut World, now: u64) {
    common::set_time(world, now);
    world
        .run_system_once(enemy_motion_system)
        .expect("System should run successfully");
}

fn cell(world: &World, entity: Entity) -> IVec2 {
    world.get::<TilePosition>(entity).expect("Entity should have a position").0
}

fn state(world: &World, entity: Entity) -> EnemyState {
    *world.get::<EnemyState>(entity).expect("Entity should be an enemy")
}

#[test]
fn test_pursuit_takes_first_step_toward_player() {
    let mut world = common::create_test_world();
    let player = IVec2::new(2, 2);
    common::spawn_test_player(&mut world, player);
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(4, 4), 3, 1);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);

    let to = cell(&world, enemy);
    assert_that(&manhattan(to, player)).is_equal_to(3);
    assert_eq!(state(&world, enemy), EnemyState::Moving(Step::new(IVec2::new(4, 4), to, 600, 200)));

    // The rest of the route is kept for the next beat.
    let pursuit = world.get::<Pursuit>(enemy).unwrap();
    assert_that(&pursuit.path.len()).is_equal_to(3);
    assert_eq!(pursuit.path.back(), Some(&player));
}

#[test]
fn test_enemy_waits_for_its_beat() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world, IVec2::new(2, 2));
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(4, 4), 3, 2);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);
    assert_eq!(cell(&world, enemy), IVec2::new(4, 4));
    assert_eq!(state(&world, enemy), EnemyState::Idle);

    common::tick_conductor(&mut world, 1_200);
    decide(&mut world);
    assert_that(&cell(&world, enemy)).is_not_equal_to(IVec2::new(4, 4));
}

#[test]
fn test_enemy_acts_once_per_beat() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world, IVec2::new(1, 1));
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(5, 5), 3, 1);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);
    let first = cell(&world, enemy);

    // Finished moving, but the beat has not changed.
    settle(&mut world, 800);
    decide(&mut world);
    assert_eq!(cell(&world, enemy), first);
}

#[test]
fn test_no_decisions_while_clock_stopped() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world, IVec2::new(2, 2));
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(4, 4), 3, 1);

    common::tick_conductor(&mut world, 600);
    world.resource_mut::<Conductor>().stop();
    decide(&mut world);

    assert_eq!(state(&world, enemy), EnemyState::Idle);
}

#[test]
fn test_pursuit_detours_around_other_enemies() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world, IVec2::new(4, 2));
    let chaser = common::spawn_test_enemy(&mut world, IVec2::new(1, 2), 3, 1);
    let blocker = common::spawn_test_enemy(&mut world, IVec2::new(2, 2), 3, 2);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);

    let to = cell(&world, chaser);
    assert!(to == IVec2::new(1, 1) || to == IVec2::new(1, 3), "unexpected step to {to}");
    assert_eq!(cell(&world, blocker), IVec2::new(2, 2));
}

#[test]
fn test_out_of_range_enemy_wanders() {
    let mut world = common::open_world(30, 5);
    common::spawn_test_player(&mut world, IVec2::new(0, 2));
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(20, 2), 3, 1);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);

    let to = cell(&world, enemy);
    assert!(Direction::from_offset(to - IVec2::new(20, 2)).is_some());
    assert!(matches!(state(&world, enemy), EnemyState::Moving(_)));
    assert_that(&world.get::<Pursuit>(enemy).unwrap().path.len()).is_equal_to(0);
}

#[test]
fn test_arrival_on_player_damages_after_move_completes() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, IVec2::new(2, 2));
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(3, 2), 3, 1);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);
    assert_eq!(cell(&world, enemy), IVec2::new(2, 2));

    settle(&mut world, 700);
    assert_that(&world.get::<Health>(player).unwrap().current).is_equal_to(6);
    assert_that(&common::outcomes(&world)).is_empty();

    settle(&mut world, 800);
    assert_eq!(state(&world, enemy), EnemyState::Idle);
    assert_that(&world.get::<Health>(player).unwrap().current).is_equal_to(5);
    assert!(world.get::<Invulnerability>(player).unwrap().is_active());
    assert_that(&cell(&world, player)).is_not_equal_to(IVec2::new(2, 2));
    assert_eq!(common::outcomes(&world), vec![GameEvent::PlayerHurt { health: 5 }]);
}

#[test]
fn test_arrival_during_invulnerability_is_harmless() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, IVec2::new(2, 2));
    world.get_mut::<Invulnerability>(player).unwrap().start(500);
    common::spawn_test_enemy(&mut world, IVec2::new(3, 2), 3, 1);

    common::tick_conductor(&mut world, 600);
    decide(&mut world);
    settle(&mut world, 800);

    assert_that(&world.get::<Health>(player).unwrap().current).is_equal_to(6);
    assert_eq!(cell(&world, player), IVec2::new(2, 2));
    assert_that(&common::outcomes(&world)).is_empty();
}

#[test]
fn test_malformed_path_is_dropped_for_a_random_step() {
    let grid = Grid::open(5, 5);
    let mut rng = GameRng::seeded(3);
    let mut pursuit = Pursuit {
        path: [IVec2::new(4, 2), IVec2::new(4, 3)].into(),
    };
    let mut state = EnemyState::Idle;
    let mut position = TilePosition(IVec2::new(2, 2));

    let moved = follow_path(&grid, &HashSet::new(), &mut rng, &mut pursuit, &mut state, &mut position, 600, 200);

    assert!(moved);
    assert_that(&pursuit.path.len()).is_equal_to(0);
    assert!(Direction::from_offset(position.0 - IVec2::new(2, 2)).is_some());
    assert_eq!(state, EnemyState::Moving(Step::new(IVec2::new(2, 2), position.0, 600, 200)));
}

#[test]
fn test_occupied_path_step_is_dropped_and_enemy_waits() {
    let grid = Grid::open(5, 5);
    let mut rng = GameRng::seeded(3);
    let mut pursuit = Pursuit {
        path: [IVec2::new(3, 2), IVec2::new(4, 2)].into(),
    };
    let mut state = EnemyState::Idle;
    let mut position = TilePosition(IVec2::new(2, 2));
    let occupied = HashSet::from([IVec2::new(3, 2)]);

    let moved = follow_path(&grid, &occupied, &mut rng, &mut pursuit, &mut state, &mut position, 600, 200);

    assert!(!moved);
    assert_that(&pursuit.path.len()).is_equal_to(0);
    assert_eq!(position.0, IVec2::new(2, 2));
    assert!(state.is_idle());
}
