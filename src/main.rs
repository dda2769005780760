#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Headless autoplay harness: plays the built-in levels with a simple bot that
//! acts on the beat, logging outcomes and frame timing.

use std::collections::HashSet;
use std::env;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use circular_buffer::CircularBuffer;
use glam::IVec2;
use offbeat::{
    config::Tuning,
    constants::LOOP_TIME,
    events::{GameCommand, GameEvent},
    formatter::CustomFormatter,
    game::{FrameSnapshot, Game},
    map::{direction::Direction, grid::Grid, pathfinding::find_path},
    session::{Screen, Session},
    systems::{PlayerState, Timing},
};
use rand::{rngs::SmallRng, RngCore, SeedableRng};
use tracing::{debug, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

const DEFAULT_RUN_SECONDS: u64 = 180;
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(CustomFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("Could not set global tracing subscriber")
}

/// Picks the bot's action for the current beat window.
fn choose_command(game: &Game, snapshot: &FrameSnapshot) -> Option<GameCommand> {
    let player = snapshot.player?;
    if player.state.is_dead() {
        return Some(GameCommand::Restart);
    }
    if !matches!(player.state, PlayerState::Idle) {
        return None;
    }

    let grid = game.world.resource::<Grid>();
    let enemy_cells: HashSet<IVec2> = snapshot.enemies.iter().map(|e| e.cell).collect();

    // Shoot along a clear line if we are already facing an enemy.
    if player.ammo > 0 && enemy_in_line(grid, player.cell, player.facing, &enemy_cells) {
        return Some(GameCommand::Shoot);
    }

    let goal = snapshot
        .enemies
        .iter()
        .map(|e| e.cell)
        .min_by_key(|cell| (*cell - player.cell).abs().element_sum())
        .unwrap_or(game.level().exit);

    let mut occupied = enemy_cells.clone();
    occupied.remove(&goal);
    let next = find_path(grid, &occupied, player.cell, goal).first().copied()?;
    let direction = Direction::from_offset(next - player.cell)?;

    // Stepping into an enemy hurts, so sidestep instead.
    if enemy_cells.contains(&next) {
        return Direction::DIRECTIONS
            .into_iter()
            .find(|d| *d != direction && grid.is_walkable(player.cell + d.as_ivec2()))
            .map(GameCommand::MovePlayer);
    }
    Some(GameCommand::MovePlayer(direction))
}

fn enemy_in_line(grid: &Grid, from: IVec2, facing: Direction, enemies: &HashSet<IVec2>) -> bool {
    let mut cell = from + facing.as_ivec2();
    while grid.is_walkable(cell) {
        if enemies.contains(&cell) {
            return true;
        }
        cell += facing.as_ivec2();
    }
    false
}

/// Identifies the beat a timing window belongs to, so the bot acts once per beat.
fn window_beat(game: &Game, now: u64) -> Option<u32> {
    let conductor = game.conductor();
    match conductor.classify(now) {
        Timing::Early => Some(conductor.beat_count() + 1),
        Timing::Late => Some(conductor.beat_count()),
        _ => None,
    }
}

fn report(frame_timings: &CircularBuffer<1_000, f64>, elapsed: Duration) {
    if frame_timings.is_empty() {
        return;
    }
    let count = frame_timings.len() as f64;
    let mean = frame_timings.iter().sum::<f64>() / count;
    let variance = frame_timings.iter().map(|value| (mean - value).powi(2)).sum::<f64>() / count;

    info!(
        frames = frame_timings.len(),
        fps = format!("{:.1}", count / elapsed.as_secs_f64()),
        mean = format!("{:.3?}", Duration::from_secs_f64(mean)),
        std_dev = format!("{:.3?}", Duration::from_secs_f64(variance.sqrt())),
        "Frame timing"
    );
}

fn main() -> Result<()> {
    init_tracing()?;

    let run_for = env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>().context("Run length must be a number of seconds"))
        .transpose()?
        .map_or(Duration::from_secs(DEFAULT_RUN_SECONDS), Duration::from_secs);

    let tuning = Tuning::load()?;
    let seed = SmallRng::from_os_rng().next_u64();
    info!(seed, run_for = ?run_for, "Starting autoplay");

    let clock = Instant::now();
    let mut session = Session::new(tuning, seed, 0)?;
    let mut last_window = None;
    let mut frame_timings = CircularBuffer::<1_000, f64>::new();
    let mut last_report = Instant::now();

    while clock.elapsed() < run_for {
        let frame_start = Instant::now();
        let now = clock.elapsed().as_millis() as u64;

        let window = session.game().and_then(|game| window_beat(game, now));
        if window.is_some() && window != last_window {
            last_window = window;
            if let Some(command) = session.game().and_then(|game| choose_command(game, &game.snapshot())) {
                debug!(?command, "Bot acting");
                session.post(command);
            }
        }

        for outcome in session.tick(now)? {
            match outcome {
                GameEvent::Beat(_) => {}
                GameEvent::PlayerDied | GameEvent::EnemyDefeated | GameEvent::PlayerRespawned => {
                    info!(?outcome, "Outcome")
                }
                other => debug!(outcome = ?other, "Outcome"),
            }
        }

        if session.screen() == Screen::Finale {
            info!(elapsed = ?clock.elapsed(), "All levels cleared");
            break;
        }

        let frame_time = frame_start.elapsed();
        frame_timings.push_back(frame_time.as_secs_f64());
        if frame_time > LOOP_TIME.mul_f32(1.2) {
            warn!(frame_time = ?frame_time, budget = ?LOOP_TIME, "Frame over budget");
        }
        if last_report.elapsed() >= REPORT_INTERVAL {
            report(&frame_timings, last_report.elapsed());
            frame_timings.clear();
            last_report = Instant::now();
        }

        if let Some(remaining) = LOOP_TIME.checked_sub(frame_time) {
            spin_sleep::sleep(remaining);
        }
    }

    if let Some(game) = session.game() {
        let snapshot = game.snapshot();
        info!(
            level = snapshot.level,
            streak = snapshot.streak,
            max_streak = snapshot.max_streak,
            enemies = snapshot.enemies.len(),
            "Autoplay finished"
        );
    }
    Ok(())
}
