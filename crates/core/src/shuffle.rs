//! Reshuffle planner - recolor a deadlocked board so a move exists
//!
//! Invoked only when a full analysis finds no group of size >= 2. The plan reassigns a
//! kind to every considered matchable cell without creating or destroying any kind:
//! for every kind, the number of assignments equals its count before the shuffle.
//!
//! Shape of the plan (pair-first):
//!
//! 1. Visit cells in random order; pair each unpaired cell with a random unpaired
//!    4-neighbour from the considered set, or leave it single.
//! 2. Give pairs kinds round-robin from per-kind pair quotas (`count / 2`), so no one
//!    kind absorbs all the pairs.
//! 3. Pairs left once quotas run out take any kind with two remaining, else split
//!    into singles.
//! 4. Singles take a remaining kind that none of their current neighbours has, else
//!    any remaining kind.
//!
//! A pair is produced whenever two considered cells are adjacent and some kind occurs
//! at least twice, so applying the plan ends the deadlock in that case. The planner
//! never computes tiers; the caller re-analyzes after applying.

use std::collections::{BTreeMap, VecDeque};

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::error::GridError;
use crate::rng::SimpleRng;
use crate::scratch::{Scratch, StampGrid};
use crate::types::{Kind, Position};

/// New kind for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShuffleAssignment {
    pub position: Position,
    pub kind: Kind,
}

/// Reassignments covering exactly the considered matchable cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShufflePlan {
    pub assignments: Vec<ShuffleAssignment>,
    /// Adjacent pairs that received a shared kind
    pub pairs: usize,
}

impl ShufflePlan {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Assignments per kind
    pub fn kind_counts(&self) -> BTreeMap<Kind, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.assignments {
            *counts.entry(a.kind).or_insert(0) += 1;
        }
        counts
    }

    /// The kind assigned to a position
    pub fn kind_at(&self, pos: Position) -> Option<Kind> {
        self.assignments
            .iter()
            .find(|a| a.position == pos)
            .map(|a| a.kind)
    }

    fn assign(&mut self, position: Position, kind: Kind, remaining: &mut BTreeMap<Kind, usize>) {
        self.assignments.push(ShuffleAssignment { position, kind });
        if let Some(count) = remaining.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Plan a count-preserving reshuffle of `matchable_cells`.
///
/// `kind_counts` must describe the kinds currently on those cells (as produced by a
/// full analysis); if its total disagrees with the cell list, counts are re-read from
/// the board. Fewer than two cells yields an empty plan.
///
/// Every cell must be on the board, hold a matchable tile and appear once; anything
/// else is rejected before the RNG is touched.
pub fn plan_reshuffle(
    board: &Board,
    matchable_cells: &[Position],
    kind_counts: &BTreeMap<Kind, usize>,
    rng: &mut SimpleRng,
    scratch: &mut Scratch,
) -> Result<ShufflePlan, GridError> {
    let Scratch { visited, used, .. } = scratch;
    // `visited` marks the considered set so pairing never reaches outside it.
    visited.begin(board.width(), board.height());
    for &cell in matchable_cells {
        board.check(cell)?;
        if board.kind_at(cell).is_none() {
            return Err(GridError::invalid(format!(
                "reshuffle cell {} holds no matchable tile",
                cell
            )));
        }
        if visited.is_marked(cell) {
            return Err(GridError::invalid(format!(
                "reshuffle cell {} listed twice",
                cell
            )));
        }
        visited.mark(cell);
    }

    let mut plan = ShufflePlan::default();
    if matchable_cells.len() < 2 {
        return Ok(plan);
    }

    let mut cells = matchable_cells.to_vec();
    let mut remaining = if kind_counts.values().sum::<usize>() == cells.len() {
        kind_counts.clone()
    } else {
        counts_on_board(board, &cells)
    };

    rng.shuffle(&mut cells);

    let (mut pairs, mut singles) = build_adjacent_pairs(board, &cells, visited, used, rng);

    let mut quotas: VecDeque<(Kind, usize)> = remaining
        .iter()
        .filter(|(_, count)| **count >= 2)
        .map(|(kind, count)| (*kind, count / 2))
        .collect();

    rng.shuffle(&mut pairs);
    let mut pending = pairs.into_iter();

    // Round-robin: one pair per kind per round until quotas or pairs run out.
    while let Some((kind, need)) = quotas.pop_front() {
        let Some((a, b)) = pending.next() else {
            break;
        };
        plan.assign(a, kind, &mut remaining);
        plan.assign(b, kind, &mut remaining);
        plan.pairs += 1;
        if need > 1 {
            quotas.push_back((kind, need - 1));
        }
    }

    for (a, b) in pending {
        match first_with_at_least(&remaining, 2) {
            Some(kind) => {
                plan.assign(a, kind, &mut remaining);
                plan.assign(b, kind, &mut remaining);
                plan.pairs += 1;
            }
            None => {
                singles.push(a);
                singles.push(b);
            }
        }
    }

    for &cell in &singles {
        let neighbor_kinds: ArrayVec<Kind, 4> = board
            .matchable_neighbors(cell)
            .iter()
            .filter_map(|n| board.kind_at(*n))
            .collect();

        let pick = remaining
            .iter()
            .find(|(kind, count)| **count > 0 && !neighbor_kinds.contains(kind))
            .or_else(|| remaining.iter().find(|(_, count)| **count > 0))
            .map(|(kind, _)| *kind);

        // Remaining counts always total the unassigned cells, so a pick exists.
        let Some(kind) = pick else {
            continue;
        };
        plan.assign(cell, kind, &mut remaining);
    }

    Ok(plan)
}

fn build_adjacent_pairs(
    board: &Board,
    cells: &[Position],
    considered: &StampGrid,
    used: &mut StampGrid,
    rng: &mut SimpleRng,
) -> (Vec<(Position, Position)>, Vec<Position>) {
    let mut pairs = Vec::with_capacity(cells.len() / 2);
    let mut singles = Vec::new();

    used.begin(board.width(), board.height());

    for &cell in cells {
        if used.is_marked(cell) {
            continue;
        }

        let mut neighbors = board.matchable_neighbors(cell);
        neighbors.retain(|n| considered.is_marked(*n));
        rng.shuffle(&mut neighbors);

        match neighbors.iter().copied().find(|n| !used.is_marked(*n)) {
            Some(partner) => {
                used.mark(cell);
                used.mark(partner);
                pairs.push((cell, partner));
            }
            None => singles.push(cell),
        }
    }

    (pairs, singles)
}

fn first_with_at_least(remaining: &BTreeMap<Kind, usize>, min: usize) -> Option<Kind> {
    remaining
        .iter()
        .find(|(_, count)| **count >= min)
        .map(|(kind, _)| *kind)
}

fn counts_on_board(board: &Board, cells: &[Position]) -> BTreeMap<Kind, usize> {
    let mut counts = BTreeMap::new();
    for kind in cells.iter().filter_map(|p| board.kind_at(*p)) {
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
}
