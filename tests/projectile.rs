use bevy_ecs::{entity::Entity, system::RunSystemOnce, world::World};
use glam::IVec2;
use offbeat::{
    events::GameEvent,
    map::direction::Direction,
    systems::{projectile_system, GameTime, Health, HitFlash, Projectile, ProjectileBundle},
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn shoot(world: &mut World, cell: IVec2, direction: Direction, now: u64) -> Entity {
    world.spawn(ProjectileBundle::new(cell, direction, now, 300.0)).id()
}

fn run(world: &mut World) {
    world
        .run_system_once(projectile_system)
        .expect("System should run successfully");
}

#[test]
fn test_projectile_hits_enemy_in_its_cell() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(3, 1), 3, 2);
    let projectile = shoot(&mut world, IVec2::new(1, 1), Direction::Right, 0);

    // 300 px/s for 120 ms carries the shot two tiles over.
    common::set_time(&mut world, 120);
    run(&mut world);

    assert!(world.get_entity(projectile).is_err());
    assert_that(&world.get::<Health>(enemy).unwrap().current).is_equal_to(2);
    assert_eq!(world.get::<HitFlash>(enemy).unwrap().at, Some(120));
    assert_eq!(common::outcomes(&world), vec![GameEvent::EnemyHit { health: 2 }]);
}

#[test]
fn test_projectile_travels_until_it_reaches_an_enemy() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(5, 3), 3, 2);
    let projectile = shoot(&mut world, IVec2::new(1, 3), Direction::Right, 0);

    common::set_time(&mut world, 50);
    run(&mut world);

    let position = world.get::<Projectile>(projectile).unwrap().position;
    assert!((position.x - 51.0).abs() < 1e-3);
    assert_that(&world.get::<Health>(enemy).unwrap().current).is_equal_to(3);
    assert_that(&common::outcomes(&world)).is_empty();
}

#[test]
fn test_projectile_expires_after_lifetime() {
    let mut world = common::open_world(200, 3);
    let projectile = shoot(&mut world, IVec2::new(0, 1), Direction::Right, 0);

    world.insert_resource(GameTime { now: 2_000, delta: 0 });
    run(&mut world);
    assert!(world.get_entity(projectile).is_ok());

    world.insert_resource(GameTime { now: 2_001, delta: 0 });
    run(&mut world);
    assert!(world.get_entity(projectile).is_err());
}

#[test]
fn test_projectile_stops_at_walls() {
    let mut world = common::create_test_world();
    let projectile = shoot(&mut world, IVec2::new(1, 1), Direction::Left, 0);

    common::set_time(&mut world, 20);
    run(&mut world);
    assert!(world.get_entity(projectile).is_ok());

    common::set_time(&mut world, 60);
    run(&mut world);
    assert!(world.get_entity(projectile).is_err());
}

#[test]
fn test_projectile_leaving_the_grid_is_removed() {
    let mut world = common::open_world(3, 3);
    let projectile = shoot(&mut world, IVec2::new(1, 0), Direction::Up, 0);

    common::set_time(&mut world, 50);
    run(&mut world);
    assert!(world.get_entity(projectile).is_err());
}

#[test]
fn test_defeated_enemy_is_despawned() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(3, 1), 1, 2);
    shoot(&mut world, IVec2::new(1, 1), Direction::Right, 0);

    common::set_time(&mut world, 120);
    run(&mut world);

    assert!(world.get_entity(enemy).is_err());
    assert_eq!(
        common::outcomes(&world),
        vec![GameEvent::EnemyHit { health: 0 }, GameEvent::EnemyDefeated]
    );
}

#[test]
fn test_second_shot_in_same_frame_passes_defeated_enemy() {
    let mut world = common::create_test_world();
    common::spawn_test_enemy(&mut world, IVec2::new(3, 1), 1, 2);
    let first = shoot(&mut world, IVec2::new(1, 1), Direction::Right, 0);
    let second = shoot(&mut world, IVec2::new(1, 1), Direction::Right, 0);

    common::set_time(&mut world, 120);
    run(&mut world);

    let survivors = [first, second]
        .into_iter()
        .filter(|&entity| world.get_entity(entity).is_ok())
        .count();
    assert_that(&survivors).is_equal_to(1);
    assert_eq!(
        common::outcomes(&world),
        vec![GameEvent::EnemyHit { health: 0 }, GameEvent::EnemyDefeated]
    );
}

#[test]
fn test_long_frame_does_not_skip_adjacent_enemy() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(2, 1), 3, 2);
    let projectile = shoot(&mut world, IVec2::new(1, 1), Direction::Right, 0);

    // 54 px in one frame would land two cells over without a sweep.
    common::set_time(&mut world, 180);
    run(&mut world);

    assert!(world.get_entity(projectile).is_err());
    assert_that(&world.get::<Health>(enemy).unwrap().current).is_equal_to(2);
    assert_eq!(common::outcomes(&world), vec![GameEvent::EnemyHit { health: 2 }]);
}

#[test]
fn test_long_frame_does_not_skip_a_table() {
    let board = &["#######", "#..T..#", "#######"];
    let mut world = common::create_test_world_with(board, common::test_tuning());
    let projectile = shoot(&mut world, IVec2::new(2, 1), Direction::Right, 0);

    common::set_time(&mut world, 180);
    run(&mut world);

    assert!(world.get_entity(projectile).is_err());
    assert_that(&common::outcomes(&world)).is_empty();
}

#[test]
fn test_wall_in_front_of_enemy_takes_the_shot() {
    let board = &["######", "#..T.#", "######"];
    let mut world = common::create_test_world_with(board, common::test_tuning());
    let enemy = common::spawn_test_enemy(&mut world, IVec2::new(4, 1), 3, 2);
    shoot(&mut world, IVec2::new(2, 1), Direction::Right, 0);

    common::set_time(&mut world, 200);
    run(&mut world);

    assert_that(&world.get::<Health>(enemy).unwrap().current).is_equal_to(3);
    assert_that(&common::outcomes(&world)).is_empty();
}
