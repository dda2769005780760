//! The static tile grid of a level.

use bevy_ecs::resource::Resource;
use bitflags::bitflags;
use glam::{IVec2, Vec2};
use strum_macros::AsRefStr;

use crate::constants::TILE_SIZE;

bitflags! {
    /// Static properties of a cell.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        /// Actors and projectiles cannot enter the cell.
        const BLOCKING = 1 << 0;
        /// An enemy with default health is placed here when the level is built.
        const ENEMY_SPAWN = 1 << 1;
    }
}

/// The kind of tile occupying a cell, kept for presentation lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TileKind {
    Floor,
    Wall,
    Door,
    Table,
    PaperStack,
}

impl TileKind {
    pub fn flags(self) -> CellFlags {
        match self {
            TileKind::Floor | TileKind::PaperStack => CellFlags::empty(),
            TileKind::Wall | TileKind::Door | TileKind::Table => CellFlags::BLOCKING,
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub kind: TileKind,
    pub flags: CellFlags,
}

impl Cell {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            flags: kind.flags(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.flags.contains(CellFlags::BLOCKING)
    }

    pub fn can_spawn_enemies(&self) -> bool {
        self.flags.contains(CellFlags::ENEMY_SPAWN)
    }
}

/// Row-major grid of cells. Immutable once a level has been built.
#[derive(Resource, Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from row-major cells. `cells.len()` must equal `width * height`.
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width: width as i32,
            height: height as i32,
            cells,
        }
    }

    /// An unobstructed grid of floor cells.
    pub fn open(width: usize, height: usize) -> Self {
        Self::from_cells(width, height, vec![Cell::new(TileKind::Floor); width * height])
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    pub fn cell_at(&self, cell: IVec2) -> Option<Cell> {
        self.in_bounds(cell)
            .then(|| self.cells[(cell.y * self.width + cell.x) as usize])
    }

    /// Out-of-bounds cells count as blocking.
    pub fn is_blocking(&self, cell: IVec2) -> bool {
        self.cell_at(cell).is_none_or(|c| c.is_blocking())
    }

    /// True when the cell is inside the grid and not statically blocked.
    pub fn is_walkable(&self, cell: IVec2) -> bool {
        !self.is_blocking(cell)
    }

    pub fn can_spawn_enemies(&self, cell: IVec2) -> bool {
        self.cell_at(cell).is_some_and(|c| c.can_spawn_enemies())
    }

    /// Iterates over every cell flagged as an enemy spawn point.
    pub fn spawn_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
            .filter(|&cell| self.can_spawn_enemies(cell))
    }

    /// Pixel position of the center of a cell.
    pub fn pixel_center(cell: IVec2) -> Vec2 {
        (cell.as_vec2() + Vec2::splat(0.5)) * TILE_SIZE
    }

    /// The cell containing a pixel position. Negative positions map to negative cells.
    pub fn cell_of_pixel(position: Vec2) -> IVec2 {
        (position / TILE_SIZE).floor().as_ivec2()
    }
}
