//! Board snapshot - flat cell encoding plus a content hash
//!
//! A [`BoardSnapshot`] is refilled in place by [`GridState::snapshot_into`](crate::GridState::snapshot_into)
//! so a runner can capture every move without reallocating. Two boards with equal
//! encodings have equal `board_hash` values.

use crate::board::Board;

/// FNV-1a 64-bit over a byte stream
pub fn fnv1a64(bytes: impl IntoIterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}

/// Flat copy of the board for logging and assertions.
///
/// `cells` uses the encoding of [`Board::write_u8_grid`], row-major from the bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<u8>,
    pub board_hash: u64,
    pub moves_left: Option<u32>,
    pub finished: bool,
}

impl BoardSnapshot {
    /// Refresh board fields, reusing the cell buffer
    pub fn capture_board(&mut self, board: &Board) {
        self.width = board.width();
        self.height = board.height();
        board.write_u8_grid(&mut self.cells);
        self.board_hash = fnv1a64(self.cells.iter().copied());
    }

    /// Encoded cell at `(x, y)`
    pub fn cell(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn playable(&self) -> bool {
        !self.finished
    }
}
