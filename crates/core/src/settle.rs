//! Gravity and refill for the columns touched by a batch of removals
//!
//! Each touched column is compacted bottom-up. Tiles that fall with gravity drop onto
//! the nearest floor below them; a gravity-immune obstacle stays put and becomes the
//! floor for everything above it. Every cell left vacant afterwards (the top of the
//! column, plus any gap trapped beneath an immune obstacle) is refilled with a fresh
//! matchable tile.
//!
//! This module only mutates the board and reports what happened; notifications and
//! re-analysis are the coordinator's job.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::error::GridError;
use crate::types::{Position, Tile};

/// A tile that fell during compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub tile: Tile,
    pub from: Position,
    pub to: Position,
}

/// Result of compacting one column, before refill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCollapse {
    pub moves: Vec<TileMove>,
    /// Cells left empty, bottom to top
    pub vacancies: Vec<Position>,
}

/// Everything a settle pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Distinct touched columns, ascending
    pub columns: Vec<u16>,
    pub moves: Vec<TileMove>,
    pub created: Vec<Tile>,
}

impl SettleReport {
    /// Every cell whose content changed: move origins and targets, refilled cells
    pub fn changed_cells(&self) -> Vec<Position> {
        let mut cells = Vec::with_capacity(self.moves.len() * 2 + self.created.len());
        for m in &self.moves {
            cells.push(m.from);
            cells.push(m.to);
        }
        cells.extend(self.created.iter().map(|t| t.position));
        cells
    }
}

/// Distinct columns of a set of emptied cells, ascending
pub fn touched_columns<'a>(emptied: impl IntoIterator<Item = &'a Position>) -> Vec<u16> {
    emptied
        .into_iter()
        .map(|p| p.x)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Compact one column under gravity
pub fn collapse_column(board: &mut Board, column: u16) -> Result<ColumnCollapse, GridError> {
    board.check(Position::new(column, 0))?;

    let mut out = ColumnCollapse::default();
    let mut target: u16 = 0;

    for y in 0..board.height() {
        let pos = Position::new(column, y);
        let Some(tile) = board.get(pos) else {
            continue;
        };

        if !tile.falls_with_gravity() {
            out.vacancies
                .extend((target..y).map(|gap| Position::new(column, gap)));
            target = y + 1;
            continue;
        }

        if y != target {
            let to = Position::new(column, target);
            let moved = board.relocate(pos, to)?;
            out.moves.push(TileMove {
                tile: moved,
                from: pos,
                to,
            });
        }
        target += 1;
    }

    out.vacancies
        .extend((target..board.height()).map(|y| Position::new(column, y)));
    Ok(out)
}

/// Collapse and refill `columns`, creating each new tile with `spawn`.
///
/// Refill order is column by column, bottom to top, so a seeded spawner reproduces the
/// same board.
pub fn settle_columns(
    board: &mut Board,
    columns: &[u16],
    mut spawn: impl FnMut(Position) -> Tile,
) -> Result<SettleReport, GridError> {
    let mut report = SettleReport {
        columns: columns.to_vec(),
        ..SettleReport::default()
    };

    for &column in columns {
        let collapse = collapse_column(board, column)?;
        report.moves.extend(collapse.moves);

        for pos in collapse.vacancies {
            let tile = spawn(pos);
            board.place(pos, tile)?;
            if let Some(placed) = board.get(pos) {
                report.created.push(*placed);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileId;

    fn spawner(kind: u8) -> impl FnMut(Position) -> Tile {
        let mut next = 100;
        move |pos| {
            next += 1;
            Tile::matchable(TileId(next), pos, kind)
        }
    }

    #[test]
    fn test_tiles_fall_into_gaps() {
        // column 0, bottom to top: 1 . 2 .
        let mut board = Board::from_rows(&[".", "2", ".", "1"]).unwrap();
        let collapse = collapse_column(&mut board, 0).unwrap();

        assert_eq!(collapse.moves.len(), 1);
        assert_eq!(collapse.moves[0].from, Position::new(0, 2));
        assert_eq!(collapse.moves[0].to, Position::new(0, 1));
        assert_eq!(collapse.moves[0].tile.position, Position::new(0, 1));
        assert_eq!(
            collapse.vacancies,
            vec![Position::new(0, 2), Position::new(0, 3)]
        );
        assert_eq!(board.to_rows(), vec![".", ".", "2", "1"]);
    }

    #[test]
    fn test_immune_obstacle_is_a_floor() {
        // bottom to top: M . # . M
        let mut board = Board::from_rows(&["3", ".", "#", ".", "1"]).unwrap();
        let collapse = collapse_column(&mut board, 0).unwrap();

        assert_eq!(board.to_rows(), vec![".", "3", "#", ".", "1"]);
        assert_eq!(
            collapse.vacancies,
            vec![Position::new(0, 1), Position::new(0, 4)]
        );
    }

    #[test]
    fn test_settle_fills_column_around_obstacle() {
        let mut board = Board::from_rows(&["3", ".", "#", ".", "1"]).unwrap();
        let report = settle_columns(&mut board, &[0], spawner(7)).unwrap();

        assert_eq!(board.to_rows(), vec!["7", "3", "#", "7", "1"]);
        assert_eq!(report.created.len(), 2);
        assert_eq!(report.moves.len(), 1);
        assert!(report.created.iter().all(|t| t.kind() == Some(7)));
    }

    #[test]
    fn test_falling_obstacle_moves_like_a_tile() {
        use crate::rules::Rules;
        use crate::types::{ObstacleKind, ObstacleProfile};

        let mut rules = Rules::default();
        rules.obstacle_profiles.insert(
            ObstacleKind::WoodenBox,
            ObstacleProfile {
                falls_with_gravity: true,
                strength: 2,
            },
        );
        let layout = crate::layout::parse_rows(&["#", "."]).unwrap();
        let mut board = Board::from_spawns(1, 2, &layout.spawns, &rules).unwrap();

        let collapse = collapse_column(&mut board, 0).unwrap();
        assert_eq!(collapse.moves.len(), 1);
        assert_eq!(board.to_rows(), vec![".", "#"]);
    }

    #[test]
    fn test_untouched_columns_stay_put() {
        let mut board = Board::from_rows(&["1.", ".2"]).unwrap();
        let report = settle_columns(&mut board, &[1], spawner(0)).unwrap();
        assert_eq!(report.columns, vec![1]);
        assert_eq!(board.to_rows(), vec!["10", ".2"]);
    }

    #[test]
    fn test_special_tiles_fall() {
        let mut board = Board::from_rows(&["*", "."]).unwrap();
        collapse_column(&mut board, 0).unwrap();
        assert_eq!(board.to_rows(), vec![".", "*"]);
    }

    #[test]
    fn test_collapse_out_of_range_column() {
        let mut board = Board::new(2, 2);
        assert!(matches!(
            collapse_column(&mut board, 2),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_touched_columns_dedup_sorted() {
        let cells = [
            Position::new(3, 0),
            Position::new(1, 2),
            Position::new(3, 1),
        ];
        assert_eq!(touched_columns(&cells), vec![1, 3]);
    }

    #[test]
    fn test_changed_cells_cover_moves_and_refills() {
        let mut board = Board::from_rows(&[".", "2", "."]).unwrap();
        let report = settle_columns(&mut board, &[0], spawner(1)).unwrap();
        let mut changed = report.changed_cells();
        changed.sort();
        changed.dedup();
        assert_eq!(
            changed,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
        );
    }
}
