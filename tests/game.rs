use glam::IVec2;
use offbeat::{
    events::{GameCommand, GameEvent},
    game::Game,
    map::{direction::Direction, levels::Level},
    systems::{PlayerState, Timing},
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

/// A corridor with the exit one step to the right of the start.
const EXIT_BOARD: &[&str] = &[
    "##D##", //
    "#@..#",
    "#####",
];

fn exit_game() -> Game {
    let level = Level::from_layout(1, EXIT_BOARD, &[]).unwrap();
    Game::new(level, common::test_tuning(), 11, 0)
}

#[test]
fn test_beat_is_reported_once() {
    let mut game = exit_game();

    assert_that(&game.tick(300)).is_empty();
    assert_eq!(game.tick(600), vec![GameEvent::Beat(1)]);
    assert_that(&game.tick(601)).is_empty();
    assert_eq!(game.tick(1_200), vec![GameEvent::Beat(2)]);
}

#[test]
fn test_time_never_runs_backwards() {
    let mut game = exit_game();
    game.tick(600);
    game.tick(500);

    assert_that(&game.now()).is_equal_to(600);
    assert_that(&game.conductor().beat_count()).is_equal_to(1);
}

#[test]
fn test_snapshot_after_on_beat_move() {
    let mut game = Game::builtin(1, common::test_tuning(), 5, 0).unwrap();
    game.tick(600);

    game.post(GameCommand::MovePlayer(Direction::Right));
    game.tick(610);

    let snapshot = game.snapshot();
    let player = snapshot.player.expect("Level should have a player");
    assert_eq!(player.cell, IVec2::new(2, 1));
    assert_eq!(player.facing, Direction::Right);
    assert!(matches!(player.state, PlayerState::Moving(_)));
    assert_that(&player.ammo).is_equal_to(1);
    assert_that(&player.health).is_equal_to(6);

    assert_that(&snapshot.level).is_equal_to(1);
    assert_that(&snapshot.beat).is_equal_to(1);
    assert_that(&snapshot.timing).is_equal_to(Timing::Late);
    assert_that(&snapshot.last_hit_timing).is_equal_to(Timing::Perfect);
    assert_that(&snapshot.streak).is_equal_to(1);
    assert_that(&snapshot.enemies).has_length(1);
    assert!(!snapshot.objective_met);

    // Halfway through the step the sprite sits between the two cells.
    game.tick(710);
    let player = game.snapshot().player.unwrap();
    assert!(player.position.x > 1.5 * 24.0 && player.position.x < 2.5 * 24.0);
}

#[test]
fn test_snapshot_is_pure() {
    let mut game = Game::builtin(2, common::test_tuning(), 5, 0).unwrap();
    game.tick(600);

    let first = game.snapshot();
    let second = game.snapshot();
    assert_eq!(first, second);
    assert_that(&game.now()).is_equal_to(600);
}

#[test]
fn test_commands_wait_for_the_next_tick() {
    let mut game = exit_game();
    game.tick(590);

    game.post(GameCommand::MovePlayer(Direction::Right));
    assert_eq!(game.snapshot().player.unwrap().cell, IVec2::new(1, 1));

    game.tick(600);
    assert_eq!(game.snapshot().player.unwrap().cell, IVec2::new(2, 1));
}

#[test]
fn test_objective_met_on_exit_with_no_enemies() {
    let mut game = exit_game();
    game.tick(0);
    assert!(!game.objective_met());

    game.tick(600);
    game.post(GameCommand::MovePlayer(Direction::Right));
    game.tick(610);

    assert!(game.objective_met());
    assert!(game.snapshot().objective_met);
}

#[test]
fn test_enemies_block_the_objective() {
    let level = Level::from_layout(1, &["##D##", "#@.s#", "#####"], &[]).unwrap();
    let mut game = Game::new(level, common::test_tuning(), 11, 0);
    game.tick(600);
    game.post(GameCommand::MovePlayer(Direction::Right));
    game.tick(610);

    assert_eq!(game.snapshot().player.unwrap().cell, IVec2::new(2, 1));
    assert!(!game.objective_met());
}

#[test]
fn test_shot_outcome_and_projectile_in_snapshot() {
    let mut game = exit_game();
    game.tick(600);
    game.post(GameCommand::MovePlayer(Direction::Right));
    game.tick(610);

    // Earned one shot; wait out the move, then fire on the next beat.
    game.tick(1_200);
    game.post(GameCommand::Shoot);
    let outcomes = game.tick(1_210);

    assert_that(&outcomes).contains(GameEvent::Shot);
    assert_that(&game.snapshot().player.unwrap().ammo).is_equal_to(0);
    assert_that(&game.snapshot().projectiles).has_length(1);
}

#[test]
fn test_stopped_game_reports_no_timing() {
    let mut game = exit_game();
    game.tick(600);
    game.stop();

    assert_that(&game.snapshot().timing).is_equal_to(Timing::None);
    assert_that(&game.tick(1_200)).is_empty();
}
