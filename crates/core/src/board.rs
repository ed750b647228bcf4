//! Board module - owns the grid of tiles
//!
//! The board is a `width x height` grid where each cell can be empty or hold one tile.
//! Uses a flat vector for cache locality; sized once per level session.
//! Coordinates: (x, y) where x ranges 0..width (left to right), y ranges 0..height
//! (bottom to top). Gravity pulls toward y = 0.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::error::GridError;
use crate::layout::{SpawnBody, TileSpawn};
use crate::rules::Rules;
use crate::types::{Kind, Position, Tile, TileId, NEIGHBOR_OFFSETS};

/// A cell on the board
pub type Cell = Option<Tile>;

/// The game board using flat vector storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u16,
    height: u16,
    /// Row-major cells (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Build a board from spawn data, assigning tile ids `1..` in spawn order.
    ///
    /// Obstacles take their gravity and strength from `rules`.
    pub fn from_spawns(
        width: u16,
        height: u16,
        spawns: &[TileSpawn],
        rules: &Rules,
    ) -> Result<Self, GridError> {
        let mut board = Board::new(width, height);
        for (i, spawn) in spawns.iter().enumerate() {
            let id = TileId(i as u32 + 1);
            let tile = match spawn.body {
                SpawnBody::Matchable { kind } => Tile::matchable(id, spawn.position, kind),
                SpawnBody::Obstacle { kind } => {
                    Tile::obstacle(id, spawn.position, kind, rules.obstacle_profile(kind))
                }
                SpawnBody::Special => Tile::special(id, spawn.position),
            };
            board.place(spawn.position, tile)?;
        }
        Ok(board)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    pub fn index(&self, pos: Position) -> Option<usize> {
        if !pos.in_bounds(self.width, self.height) {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Flat index or `OutOfBounds`
    pub fn check(&self, pos: Position) -> Result<usize, GridError> {
        self.index(pos).ok_or(GridError::OutOfBounds {
            position: pos,
            width: self.width,
            height: self.height,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells (`width * height`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Get the tile at a position.
    /// Returns None if the cell is empty or out of bounds.
    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        match self.index(pos) {
            Some(idx) => self.cells[idx].as_mut(),
            None => None,
        }
    }

    /// Kind of the matchable tile at a position, if any
    #[inline]
    pub fn kind_at(&self, pos: Position) -> Option<Kind> {
        self.get(pos).and_then(Tile::kind)
    }

    /// Check if position is within bounds and empty
    pub fn is_vacant(&self, pos: Position) -> bool {
        matches!(self.index(pos).map(|idx| &self.cells[idx]), Some(None))
    }

    /// Put a tile into an empty cell, updating its cached position
    pub fn place(&mut self, pos: Position, mut tile: Tile) -> Result<(), GridError> {
        let idx = self.check(pos)?;
        if self.cells[idx].is_some() {
            return Err(GridError::CellOccupied(pos));
        }
        tile.position = pos;
        self.cells[idx] = Some(tile);
        Ok(())
    }

    /// Remove and return the tile at a position
    pub fn take(&mut self, pos: Position) -> Result<Tile, GridError> {
        let idx = self.check(pos)?;
        self.cells[idx].take().ok_or(GridError::AlreadyRemoved(pos))
    }

    /// Move the tile at `from` into the empty cell `to`, returning the moved tile
    pub fn relocate(&mut self, from: Position, to: Position) -> Result<Tile, GridError> {
        let dst = self.check(to)?;
        if self.cells[dst].is_some() {
            return Err(GridError::CellOccupied(to));
        }
        let mut tile = self.take(from)?;
        tile.position = to;
        self.cells[dst] = Some(tile);
        Ok(tile)
    }

    /// In-bounds 4-neighbours of a position
    pub fn neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        for &(dx, dy) in &NEIGHBOR_OFFSETS {
            if let Some(n) = pos.neighbor(dx, dy, self.width, self.height) {
                out.push(n);
            }
        }
        out
    }

    /// 4-neighbours holding a matchable tile
    pub fn matchable_neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = self.neighbors(pos);
        out.retain(|n| self.kind_at(*n).is_some());
        out
    }

    /// All positions, row by row from the bottom
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Position::new(x, y)))
    }

    /// All tiles on the board, row by row from the bottom
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn count_matchable(&self) -> usize {
        self.tiles().filter(|t| t.is_matchable()).count()
    }

    /// Count matchable tiles per kind
    pub fn kind_counts(&self) -> BTreeMap<Kind, usize> {
        let mut counts = BTreeMap::new();
        for kind in self.tiles().filter_map(Tile::kind) {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }

    /// Remove every tile, returning them row by row from the bottom
    pub fn drain_tiles(&mut self) -> Vec<Tile> {
        self.cells.iter_mut().filter_map(Option::take).collect()
    }

    /// Get a reference to the internal cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Encode the board as bytes, row-major from the bottom:
    /// `0` empty, `1 + kind` matchable, `0xF0 + strength` obstacle, `0xFF` special.
    pub fn write_u8_grid(&self, out: &mut Vec<u8>) {
        use crate::types::TileBody;

        out.clear();
        out.extend(self.cells.iter().map(|cell| match cell {
            None => 0,
            Some(tile) => match tile.body {
                TileBody::Matchable { kind, .. } => kind.saturating_add(1).min(0xEF),
                TileBody::Obstacle { strength, .. } => 0xF0 + strength.min(0x0E),
                TileBody::Special => 0xFF,
            },
        }));
    }

    /// Render rows top first using the layout alphabet (see [`crate::layout`])
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| crate::layout::glyph(self.get(Position::new(x, y))))
                    .collect()
            })
            .collect()
    }

    /// Parse a textual layout (top row first) into a board with default rules
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_blast_core::Board;
    /// use tile_blast_core::types::Position;
    ///
    /// let board = Board::from_rows(&["0#", "10"]).unwrap();
    /// assert_eq!(board.kind_at(Position::new(0, 0)), Some(1));
    /// assert!(board.get(Position::new(1, 1)).unwrap().is_obstacle());
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, GridError> {
        let layout = crate::layout::parse_rows(rows)?;
        Board::from_spawns(layout.width, layout.height, &layout.spawns, &Rules::default())
    }
}
