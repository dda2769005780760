//! Built-in room layouts and level construction.

use glam::IVec2;
use tracing::debug;

use crate::constants::enemy::DEFAULT_HEALTH;
use crate::error::{GameResult, MapError, ParseError};
use crate::map::grid::Grid;
use crate::map::parser::BoardParser;

/// Number of built-in levels.
pub const LEVEL_COUNT: u8 = 3;

/// An enemy placed when a level is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    pub cell: IVec2,
    pub health: u32,
}

impl EnemySpawn {
    pub const fn new(x: i32, y: i32, health: u32) -> Self {
        Self {
            cell: IVec2::new(x, y),
            health,
        }
    }
}

/// Static description of a room: its board and enemy roster.
#[derive(Debug, Clone, Copy)]
pub struct LevelLayout {
    pub board: &'static [&'static str],
    pub enemies: &'static [EnemySpawn],
}

const LEVEL_1: LevelLayout = LevelLayout {
    board: &[
        "#####D#####",
        "#@.......p#",
        "#.........#",
        "#TT.....TT#",
        "#TT.....TT#",
        "#p........#",
        "#p........#",
        "#.........#",
        "###########",
    ],
    enemies: &[EnemySpawn::new(3, 6, 1)],
};

const LEVEL_2: LevelLayout = LevelLayout {
    board: &[
        "#####D#####",
        "#@........#",
        "#.TT......#",
        "#.TT......#",
        "#.........#",
        "#TT....TT.#",
        "#TT....TT.#",
        "#.........#",
        "###########",
    ],
    enemies: &[EnemySpawn::new(5, 4, DEFAULT_HEALTH), EnemySpawn::new(3, 7, DEFAULT_HEALTH)],
};

const LEVEL_3: LevelLayout = LevelLayout {
    board: &[
        "#####D#####",
        "#@........#",
        "#.TT......#",
        "#.TT......#",
        "#.........#",
        "#p........#",
        "#.........#",
        "#.........#",
        "###########",
    ],
    enemies: &[EnemySpawn::new(3, 6, 10)],
};

/// A fully parsed and validated level, ready to be populated.
#[derive(Debug, Clone)]
pub struct Level {
    pub number: u8,
    pub grid: Grid,
    pub player_start: IVec2,
    pub enemies: Vec<EnemySpawn>,
    /// The cell the player must stand on once every enemy is gone.
    pub exit: IVec2,
}

impl Level {
    /// Loads one of the built-in levels (numbered from 1).
    pub fn builtin(number: u8) -> GameResult<Level> {
        let layout = match number {
            1 => LEVEL_1,
            2 => LEVEL_2,
            3 => LEVEL_3,
            _ => return Err(MapError::UnknownLevel(number).into()),
        };
        Self::from_layout(number, layout.board, layout.enemies)
    }

    /// Builds a level from a board and an explicit enemy roster.
    ///
    /// Spawn cells (`s`) on the board are added to the roster with default health.
    /// The exit is the cell directly below the middle of the top wall.
    pub fn from_layout(number: u8, board: &[&str], roster: &[EnemySpawn]) -> GameResult<Level> {
        let parsed = BoardParser::parse_board(board)?;
        let player_start = parsed.player_start.ok_or(ParseError::MissingPlayerStart)?;

        let mut enemies = roster.to_vec();
        enemies.extend(parsed.grid.spawn_cells().map(|cell| EnemySpawn {
            cell,
            health: DEFAULT_HEALTH,
        }));

        for spawn in std::iter::once(player_start).chain(enemies.iter().map(|e| e.cell)) {
            if !parsed.grid.in_bounds(spawn) {
                return Err(MapError::SpawnOutOfBounds(spawn).into());
            }
            if parsed.grid.is_blocking(spawn) {
                return Err(MapError::SpawnOnBlockedCell(spawn).into());
            }
        }

        let exit = IVec2::new(parsed.grid.width() / 2, 1);
        debug!(
            level = number,
            width = parsed.grid.width(),
            height = parsed.grid.height(),
            enemies = enemies.len(),
            "Level parsed"
        );

        Ok(Level {
            number,
            grid: parsed.grid,
            player_start,
            enemies,
            exit,
        })
    }
}
