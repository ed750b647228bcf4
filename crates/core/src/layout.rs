//! Level layouts - spawn data for board initialization
//!
//! A layout is the list of tiles a level starts with. Level files produce it directly;
//! tests and tools usually write it as text rows, top row first:
//!
//! | Glyph | Cell |
//! |-------|------|
//! | `.` | empty |
//! | `0`-`9`, `a`-`z` | matchable tile of kind 0-35 |
//! | `#` | wooden box obstacle |
//! | `*` | special tile |

use crate::error::GridError;
use crate::types::{Kind, ObstacleKind, Position, Tile, TileBody};

/// What to spawn in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnBody {
    Matchable { kind: Kind },
    Obstacle { kind: ObstacleKind },
    Special,
}

/// A single tile to place when a level starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSpawn {
    pub position: Position,
    pub body: SpawnBody,
}

impl TileSpawn {
    pub fn matchable(x: u16, y: u16, kind: Kind) -> Self {
        Self {
            position: Position::new(x, y),
            body: SpawnBody::Matchable { kind },
        }
    }

    pub fn obstacle(x: u16, y: u16, kind: ObstacleKind) -> Self {
        Self {
            position: Position::new(x, y),
            body: SpawnBody::Obstacle { kind },
        }
    }

    pub fn special(x: u16, y: u16) -> Self {
        Self {
            position: Position::new(x, y),
            body: SpawnBody::Special,
        }
    }
}

/// Parsed textual layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub spawns: Vec<TileSpawn>,
}

/// Parse text rows (top row first) into spawn data
pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<Layout, GridError> {
    let height = rows.len();
    if height == 0 {
        return Err(GridError::invalid("layout has no rows"));
    }
    let width = rows[0].as_ref().chars().count();
    if width == 0 {
        return Err(GridError::invalid("layout rows are empty"));
    }
    if width > u16::MAX as usize || height > u16::MAX as usize {
        return Err(GridError::invalid("layout is too large"));
    }

    let mut spawns = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.chars().count() != width {
            return Err(GridError::invalid(format!(
                "layout row {} has {} cells, expected {}",
                row_idx,
                row.chars().count(),
                width
            )));
        }
        let y = (height - 1 - row_idx) as u16;
        for (x, ch) in row.chars().enumerate() {
            let x = x as u16;
            let spawn = match ch {
                '.' => continue,
                '#' => TileSpawn::obstacle(x, y, ObstacleKind::WoodenBox),
                '*' => TileSpawn::special(x, y),
                c => match c.to_digit(36) {
                    Some(kind) => TileSpawn::matchable(x, y, kind as Kind),
                    None => {
                        return Err(GridError::invalid(format!(
                            "unknown layout glyph {:?} at row {}",
                            c, row_idx
                        )))
                    }
                },
            };
            spawns.push(spawn);
        }
    }

    Ok(Layout {
        width: width as u16,
        height: height as u16,
        spawns,
    })
}

/// Layout glyph for a cell
pub fn glyph(cell: Option<&Tile>) -> char {
    match cell.map(|t| t.body) {
        None => '.',
        Some(TileBody::Matchable { kind, .. }) => {
            std::char::from_digit(kind as u32, 36).unwrap_or('?')
        }
        Some(TileBody::Obstacle { .. }) => '#',
        Some(TileBody::Special) => '*',
    }
}
