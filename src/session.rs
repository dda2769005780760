//! Level progression for a play session.

use tracing::info;

use crate::config::Tuning;
use crate::error::GameResult;
use crate::events::{GameCommand, GameEvent};
use crate::game::Game;
use crate::map::levels::LEVEL_COUNT;

/// The screen a session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing(u8),
    /// Every level has been cleared.
    Finale,
}

/// Owns the active level and moves on to the next one when its objective is met.
pub struct Session {
    tuning: Tuning,
    seed: u64,
    screen: Screen,
    game: Option<Game>,
}

impl Session {
    /// Starts a session on the first level at `now`.
    pub fn new(tuning: Tuning, seed: u64, now: u64) -> GameResult<Session> {
        Self::starting_at(1, tuning, seed, now)
    }

    /// Starts a session on a specific level.
    pub fn starting_at(level: u8, tuning: Tuning, seed: u64, now: u64) -> GameResult<Session> {
        let game = Game::builtin(level, tuning.clone(), Self::level_seed(seed, level), now)?;
        info!(level, "Session started");
        Ok(Session {
            tuning,
            seed,
            screen: Screen::Playing(level),
            game: Some(game),
        })
    }

    fn level_seed(seed: u64, level: u8) -> u64 {
        seed.wrapping_add(level as u64)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut Game> {
        self.game.as_mut()
    }

    /// Forwards a command to the active level. Ignored on the finale.
    pub fn post(&mut self, command: GameCommand) {
        if let Some(game) = self.game.as_mut() {
            game.post(command);
        }
    }

    /// Ticks the active level and advances when its objective is met.
    ///
    /// The next level's clock starts at `now`.
    pub fn tick(&mut self, now: u64) -> GameResult<Vec<GameEvent>> {
        let Some(game) = self.game.as_mut() else {
            return Ok(Vec::new());
        };

        let outcomes = game.tick(now);
        if game.objective_met() {
            self.advance(now)?;
        }
        Ok(outcomes)
    }

    fn advance(&mut self, now: u64) -> GameResult<()> {
        let Screen::Playing(current) = self.screen else {
            return Ok(());
        };
        if let Some(game) = self.game.as_mut() {
            game.stop();
        }

        if current >= LEVEL_COUNT {
            info!(level = current, "Final level cleared");
            self.screen = Screen::Finale;
            self.game = None;
            return Ok(());
        }

        let next = current + 1;
        let game = Game::builtin(next, self.tuning.clone(), Self::level_seed(self.seed, next), now)?;
        info!(from = current, to = next, "Advancing level");
        self.screen = Screen::Playing(next);
        self.game = Some(game);
        Ok(())
    }
}
