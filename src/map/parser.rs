//! Board parsing functionality for converting ASCII layouts into a [`Grid`].

use glam::IVec2;

use crate::error::ParseError;
use crate::map::grid::{Cell, CellFlags, Grid, TileKind};

/// A single character of a board, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTile {
    Tile(TileKind),
    /// Floor where an enemy with default health is placed.
    SpawnFloor,
    /// Floor holding the player's starting position.
    PlayerStart,
}

/// Represents the parsed data from a raw board layout.
#[derive(Debug, Clone)]
pub struct ParsedBoard {
    pub grid: Grid,
    pub player_start: Option<IVec2>,
}

/// Parser for converting raw board layouts into structured map data.
pub struct BoardParser;

impl BoardParser {
    /// Parses a single character into a board tile.
    pub fn parse_character(c: char) -> Option<BoardTile> {
        match c {
            '#' => Some(BoardTile::Tile(TileKind::Wall)),
            '.' => Some(BoardTile::Tile(TileKind::Floor)),
            'p' => Some(BoardTile::Tile(TileKind::PaperStack)),
            'T' => Some(BoardTile::Tile(TileKind::Table)),
            'D' => Some(BoardTile::Tile(TileKind::Door)),
            's' => Some(BoardTile::SpawnFloor),
            '@' => Some(BoardTile::PlayerStart),
            _ => None,
        }
    }

    /// Parses a raw board layout into a grid plus the markers found on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the board is empty, if rows differ in length, or if
    /// the board contains unknown characters.
    pub fn parse_board(rows: &[&str]) -> Result<ParsedBoard, ParseError> {
        let width = rows.first().ok_or(ParseError::EmptyBoard)?.chars().count();
        if width == 0 {
            return Err(ParseError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut player_start = None;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ParseError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, character) in row.chars().enumerate() {
                let tile = Self::parse_character(character).ok_or(ParseError::UnknownCharacter { character, x, y })?;
                let position = IVec2::new(x as i32, y as i32);

                let cell = match tile {
                    BoardTile::Tile(kind) => Cell::new(kind),
                    BoardTile::SpawnFloor => {
                        let mut cell = Cell::new(TileKind::Floor);
                        cell.flags |= CellFlags::ENEMY_SPAWN;
                        cell
                    }
                    BoardTile::PlayerStart => {
                        player_start = Some(position);
                        Cell::new(TileKind::Floor)
                    }
                };
                cells.push(cell);
            }
        }

        Ok(ParsedBoard {
            grid: Grid::from_cells(width, rows.len(), cells),
            player_start,
        })
    }

    /// Parses a board that is only used as terrain, discarding its markers.
    pub fn parse_grid(rows: &[&str]) -> Result<Grid, ParseError> {
        Self::parse_board(rows).map(|parsed| parsed.grid)
    }
}
