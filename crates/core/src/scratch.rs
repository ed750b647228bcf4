//! Reusable scratch buffers for flood fills and pairing passes.
//!
//! A stamp grid marks a cell "seen" by writing the current tick into it; starting a new
//! pass bumps the tick instead of clearing the grid. Buffers are resized to the board
//! before each pass. The engine is single-threaded, so one [`Scratch`] owned by the
//! [`GridState`](crate::GridState) serves every call.

use crate::types::Position;

/// Per-cell visit stamps with O(1) reset
#[derive(Debug, Clone, Default)]
pub struct StampGrid {
    width: u16,
    height: u16,
    tick: u32,
    stamps: Vec<u32>,
}

impl StampGrid {
    /// Resize for a board and start a fresh pass
    pub fn begin(&mut self, width: u16, height: u16) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.stamps = vec![0; width as usize * height as usize];
            self.tick = 0;
        }

        if self.tick == u32::MAX {
            self.stamps.iter_mut().for_each(|s| *s = 0);
            self.tick = 0;
        }
        self.tick += 1;
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    #[inline]
    pub fn is_marked(&self, pos: Position) -> bool {
        self.stamps[self.index(pos)] == self.tick
    }

    #[inline]
    pub fn mark(&mut self, pos: Position) {
        let idx = self.index(pos);
        self.stamps[idx] = self.tick;
    }
}

/// Buffers shared by the analyzer and the reshuffle planner
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    pub(crate) visited: StampGrid,
    pub(crate) used: StampGrid,
    pub(crate) stack: Vec<Position>,
    pub(crate) frontier: Vec<Position>,
    pub(crate) members: Vec<Position>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }
}
