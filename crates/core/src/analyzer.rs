//! Group analysis - connected components of same-kind matchable tiles
//!
//! A flood fill over the board that reports, for every component it reaches:
//! member positions, per-kind totals and the size-derived [`Tier`] of each member.
//! It also answers the one question the settle pipeline cares about: does any
//! component of size >= 2 exist (otherwise the board is deadlocked).
//!
//! Scans are either full-board or scoped to a dirty frontier (changed cells plus their
//! 4-neighbours). A scoped scan still follows each component it touches to its full
//! extent, so every reported component is exact; components that never touch the
//! frontier are simply not reported.
//!
//! The fill is iterative with an explicit stack and uses the stamp grid in [`Scratch`],
//! so no per-call allocation of a visited set is needed and board size never threatens
//! the call stack.

use std::collections::BTreeMap;

use crate::board::Board;
use crate::error::GridError;
use crate::scratch::Scratch;
use crate::types::{Kind, Position, Tier, TierThresholds};

/// Summary of one connected component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupInfo {
    pub kind: Kind,
    pub size: usize,
    pub tier: Tier,
    /// First member found; popping here removes the whole group
    pub seed: Position,
}

/// Output of one analysis pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Any reported component has at least two members
    pub has_pair: bool,
    /// Every member of every reported component, each exactly once
    pub matchable_cells: Vec<Position>,
    /// Members per kind across reported components
    pub kind_counts: BTreeMap<Kind, usize>,
    /// `(member, tier of its component)` for every reported member
    pub tier_assignments: Vec<(Position, Tier)>,
    pub groups: Vec<GroupInfo>,
}

impl AnalysisResult {
    /// Tier assigned to a position, if it was part of a reported component
    pub fn tier_at(&self, pos: Position) -> Option<Tier> {
        self.tier_assignments
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|(_, tier)| *tier)
    }

    /// Components a player could pop
    pub fn playable_groups(&self) -> impl Iterator<Item = &GroupInfo> {
        self.groups.iter().filter(|g| g.size >= 2)
    }

    pub fn largest_group(&self) -> Option<&GroupInfo> {
        self.groups.iter().max_by_key(|g| g.size)
    }
}

/// Analyze the board.
///
/// With `full_scan` (or an empty `dirty` list) every cell seeds the search; otherwise
/// only the dirty cells and their in-bounds 4-neighbours do.
pub fn analyze(
    board: &Board,
    dirty: &[Position],
    tiers: TierThresholds,
    full_scan: bool,
    scratch: &mut Scratch,
) -> AnalysisResult {
    let Scratch {
        visited,
        stack,
        frontier,
        members,
        ..
    } = scratch;

    visited.begin(board.width(), board.height());

    frontier.clear();
    if full_scan || dirty.is_empty() {
        frontier.extend(board.positions());
    } else {
        for &cell in dirty {
            if board.in_bounds(cell) {
                frontier.push(cell);
            }
            frontier.extend(board.neighbors(cell));
        }
    }

    let mut result = AnalysisResult::default();

    for &seed in frontier.iter() {
        if visited.is_marked(seed) {
            continue;
        }
        // Empty and non-matchable cells are boundaries, never seeds.
        visited.mark(seed);
        let Some(kind) = board.kind_at(seed) else {
            continue;
        };

        stack.clear();
        members.clear();
        stack.push(seed);

        while let Some(cur) = stack.pop() {
            members.push(cur);
            for next in board.neighbors(cur) {
                if visited.is_marked(next) || board.kind_at(next) != Some(kind) {
                    continue;
                }
                visited.mark(next);
                stack.push(next);
            }
        }

        let size = members.len();
        let tier = tiers.classify(size);
        if size >= 2 {
            result.has_pair = true;
        }

        *result.kind_counts.entry(kind).or_insert(0) += size;
        result.matchable_cells.extend_from_slice(members);
        result
            .tier_assignments
            .extend(members.iter().map(|&pos| (pos, tier)));
        result.groups.push(GroupInfo {
            kind,
            size,
            tier,
            seed,
        });
    }

    result
}

/// Full-board analysis
pub fn analyze_full(board: &Board, tiers: TierThresholds, scratch: &mut Scratch) -> AnalysisResult {
    analyze(board, &[], tiers, true, scratch)
}

/// The connected group containing `pos`.
///
/// Empty when the cell is empty or not matchable; `OutOfBounds` for positions off the board.
pub fn find_connected_group(
    board: &Board,
    pos: Position,
    scratch: &mut Scratch,
) -> Result<Vec<Position>, GridError> {
    board.check(pos)?;
    let Some(kind) = board.kind_at(pos) else {
        return Ok(Vec::new());
    };

    let Scratch { visited, stack, .. } = scratch;
    visited.begin(board.width(), board.height());
    stack.clear();

    let mut group = Vec::new();
    visited.mark(pos);
    stack.push(pos);

    while let Some(cur) = stack.pop() {
        group.push(cur);
        for next in board.neighbors(cur) {
            if visited.is_marked(next) || board.kind_at(next) != Some(kind) {
                continue;
            }
            visited.mark(next);
            stack.push(next);
        }
    }

    Ok(group)
}
