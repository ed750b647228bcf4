//! Grid state - owns the board and coordinates removals, settles and reshuffles
//!
//! [`GridState`] is the single writer of the board. Removals are accumulated inside
//! nestable resolution batches; when the outermost batch closes, one settle pass runs:
//!
//! 1. `RefillTriggered` for the touched columns
//! 2. gravity and refill per column (`TileMoved`, `TileCreated`)
//! 3. a full analysis; on deadlock, one reshuffle (`KindChanged`, `Reshuffled`)
//! 4. tiers written back to every member of every group (`TierChanged` on change)
//!
//! Notifications are buffered in order and handed out by [`GridState::drain_events`].

use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use crate::analyzer::{self, AnalysisResult};
use crate::board::Board;
use crate::error::GridError;
use crate::layout::{Layout, SpawnBody, TileSpawn};
use crate::rng::SimpleRng;
use crate::rules::Rules;
use crate::scratch::Scratch;
use crate::settle::{settle_columns, touched_columns};
use crate::shuffle::{plan_reshuffle, ShufflePlan};
use crate::snapshot::BoardSnapshot;
use crate::types::{GridEvent, Kind, Position, Tile, TileBody, TileId};

/// Result of a click on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    /// The group was removed and one move consumed
    Popped { kind: Kind, size: usize },
    /// A lone tile; nothing removed, no move consumed
    TooSmall,
    /// Empty cell, obstacle or special tile
    NotMatchable,
    /// The move budget is spent
    MovesExhausted,
}

impl PopOutcome {
    pub fn is_popped(&self) -> bool {
        matches!(self, PopOutcome::Popped { .. })
    }
}

/// Complete engine state for one level session
#[derive(Debug, Clone)]
pub struct GridState {
    board: Board,
    rules: Rules,
    rng: SimpleRng,
    scratch: Scratch,
    /// Open resolution batches
    batch_depth: u32,
    /// Cells emptied since the outermost batch opened
    emptied: BTreeSet<Position>,
    /// Cells changed by the last settle (emptied, moved, refilled)
    last_frontier: Vec<Position>,
    last_analysis: AnalysisResult,
    events: Vec<GridEvent>,
    /// Monotonic tile id; never reused within a session
    next_tile_id: u32,
    moves_left: Option<u32>,
    moves_used: u32,
    reshuffles: u32,
}

impl GridState {
    /// Create an engine with an empty board sized by `rules`
    pub fn new(rules: Rules) -> Result<Self, GridError> {
        rules.validate()?;
        Ok(Self {
            board: Board::new(rules.width, rules.height),
            rng: SimpleRng::new(rules.seed),
            moves_left: rules.move_limit,
            rules,
            scratch: Scratch::new(),
            batch_depth: 0,
            emptied: BTreeSet::new(),
            last_frontier: Vec::new(),
            last_analysis: AnalysisResult::default(),
            events: Vec::new(),
            next_tile_id: 1,
            moves_used: 0,
            reshuffles: 0,
        })
    }

    /// Place a level's starting tiles on a fresh `width x height` board.
    ///
    /// Reseeds the RNG from the rules, restores the move budget, then runs the initial
    /// analysis (including a reshuffle if the level starts deadlocked).
    pub fn initialize_board(
        &mut self,
        width: u16,
        height: u16,
        spawns: &[TileSpawn],
    ) -> Result<(), GridError> {
        let rules = Rules {
            width,
            height,
            ..self.rules.clone()
        };
        rules.validate()?;

        for spawn in spawns {
            if let SpawnBody::Matchable { kind } = spawn.body {
                if kind >= rules.kind_count {
                    return Err(GridError::invalid(format!(
                        "kind {} at {} exceeds kind count {}",
                        kind, spawn.position, rules.kind_count
                    )));
                }
            }
        }

        let mut board = Board::new(width, height);
        let mut created = Vec::with_capacity(spawns.len());
        for spawn in spawns {
            let id = self.alloc_id();
            let tile = match spawn.body {
                SpawnBody::Matchable { kind } => Tile::matchable(id, spawn.position, kind),
                SpawnBody::Obstacle { kind } => {
                    Tile::obstacle(id, spawn.position, kind, rules.obstacle_profile(kind))
                }
                SpawnBody::Special => Tile::special(id, spawn.position),
            };
            board.place(spawn.position, tile)?;
            created.push(tile);
        }

        self.board = board;
        self.rng = SimpleRng::new(rules.seed);
        self.moves_left = rules.move_limit;
        self.moves_used = 0;
        self.rules = rules;
        self.batch_depth = 0;
        self.emptied.clear();
        self.last_frontier.clear();

        self.events.extend(created.into_iter().map(|tile| GridEvent::TileCreated {
            tile,
            position: tile.position,
        }));

        self.refresh_analysis()
    }

    /// [`initialize_board`](Self::initialize_board) from a parsed layout
    pub fn initialize_layout(&mut self, layout: &Layout) -> Result<(), GridError> {
        self.initialize_board(layout.width, layout.height, &layout.spawns)
    }

    /// Remove every tile without damage or settle, ready for another attempt
    pub fn reset_board(&mut self) {
        let removed = self.board.drain_tiles();
        self.events
            .extend(removed.into_iter().map(|tile| GridEvent::TileRemoved {
                tile,
                position: tile.position,
            }));
        self.batch_depth = 0;
        self.emptied.clear();
        self.last_frontier.clear();
        self.last_analysis = AnalysisResult::default();
    }

    /// Replace the seed used for the next initialization and refills
    pub fn reseed(&mut self, seed: u32) {
        self.rules.seed = seed;
        self.rng = SimpleRng::new(seed);
    }

    // ---- Resolution batches ----

    /// Open a batch that closes when the guard is dropped or [`ResolutionBatch::close`]d
    pub fn open_batch(&mut self) -> ResolutionBatch<'_> {
        self.begin_batch();
        ResolutionBatch {
            state: self,
            closed: false,
        }
    }

    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.emptied.clear();
        }
        self.batch_depth += 1;
    }

    /// Close one batch level; closing the outermost runs the settle pass
    pub fn end_batch(&mut self) -> Result<(), GridError> {
        debug_assert!(
            self.batch_depth > 0,
            "resolution batch closed without a matching open"
        );
        if self.batch_depth == 0 {
            return Err(GridError::UnbalancedBatch);
        }

        self.batch_depth -= 1;
        if self.batch_depth == 0 && !self.emptied.is_empty() {
            let emptied = std::mem::take(&mut self.emptied);
            self.settle(&emptied)?;
        }
        Ok(())
    }

    pub fn batch_depth(&self) -> u32 {
        self.batch_depth
    }

    // ---- Removal ----

    /// Remove the tile at `pos`.
    ///
    /// Returns `Ok(None)` (and records `RemovalIgnored`) for an already-empty cell.
    /// Outside a batch, the removal is settled before returning.
    pub fn remove_tile(&mut self, pos: Position) -> Result<Option<Tile>, GridError> {
        self.board.check(pos)?;

        if self.batch_depth > 0 {
            return self.remove_in_batch(pos);
        }

        let mut batch = self.open_batch();
        let removed = batch.remove_in_batch(pos)?;
        batch.close()?;
        Ok(removed)
    }

    fn remove_in_batch(&mut self, pos: Position) -> Result<Option<Tile>, GridError> {
        let tile = match self.board.take(pos) {
            Ok(tile) => tile,
            Err(GridError::AlreadyRemoved(position)) => {
                self.events.push(GridEvent::RemovalIgnored { position });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.emptied.insert(pos);
        self.events.push(GridEvent::TileRemoved {
            tile,
            position: pos,
        });

        if !tile.is_obstacle() {
            self.damage_adjacent_obstacles(pos)?;
        }
        Ok(Some(tile))
    }

    fn damage_adjacent_obstacles(&mut self, pos: Position) -> Result<(), GridError> {
        for n in self.board.neighbors(pos) {
            let Some(tile) = self.board.get_mut(n) else {
                continue;
            };
            let TileBody::Obstacle { strength, .. } = &mut tile.body else {
                continue;
            };

            *strength = strength.saturating_sub(1);
            let left = *strength;
            let damaged = *tile;
            self.events.push(GridEvent::ObstacleDamaged {
                tile: damaged,
                strength: left,
            });

            if left == 0 {
                let broken = self.board.take(n)?;
                self.emptied.insert(n);
                self.events.push(GridEvent::TileRemoved {
                    tile: broken,
                    position: n,
                });
            }
        }
        Ok(())
    }

    // ---- Click resolution ----

    /// Connected same-kind group containing `pos` (empty for non-matchable cells)
    pub fn find_connected_group(&mut self, pos: Position) -> Result<Vec<Position>, GridError> {
        analyzer::find_connected_group(&self.board, pos, &mut self.scratch)
    }

    /// Pop the group under `pos` if it has at least two members
    pub fn pop_group(&mut self, pos: Position) -> Result<PopOutcome, GridError> {
        let group = self.find_connected_group(pos)?;
        if self.is_finished() {
            return Ok(PopOutcome::MovesExhausted);
        }
        let Some(kind) = self.board.kind_at(pos) else {
            return Ok(PopOutcome::NotMatchable);
        };
        if group.len() <= 1 {
            return Ok(PopOutcome::TooSmall);
        }

        self.consume_move();

        let mut batch = self.open_batch();
        for &member in &group {
            batch.remove_tile(member)?;
        }
        batch.close()?;

        Ok(PopOutcome::Popped {
            kind,
            size: group.len(),
        })
    }

    fn consume_move(&mut self) {
        self.moves_used += 1;
        if let Some(left) = self.moves_left.as_mut() {
            *left = left.saturating_sub(1);
            let left = *left;
            self.events.push(GridEvent::MoveConsumed { moves_left: left });
            if left == 0 {
                self.events.push(GridEvent::MovesExhausted);
            }
        }
    }

    // ---- Settle pipeline ----

    fn settle(&mut self, emptied: &BTreeSet<Position>) -> Result<(), GridError> {
        let columns = touched_columns(emptied);
        self.events.push(GridEvent::RefillTriggered {
            columns: columns.clone(),
        });

        let kind_count = self.rules.kind_count;
        let GridState {
            board,
            rng,
            next_tile_id,
            ..
        } = self;
        let report = settle_columns(board, &columns, |pos| {
            let id = TileId(*next_tile_id);
            *next_tile_id += 1;
            Tile::matchable(id, pos, rng.next_kind(kind_count))
        })?;

        for m in &report.moves {
            self.events.push(GridEvent::TileMoved {
                tile: m.tile,
                from: m.from,
                to: m.to,
            });
        }
        for tile in &report.created {
            self.events.push(GridEvent::TileCreated {
                tile: *tile,
                position: tile.position,
            });
        }

        let mut frontier: Vec<Position> = emptied.iter().copied().collect();
        frontier.extend(report.changed_cells());
        frontier.sort_unstable();
        frontier.dedup();
        self.last_frontier = frontier;

        self.refresh_analysis()
    }

    /// Full analysis, one reshuffle on deadlock, then tier write-back
    fn refresh_analysis(&mut self) -> Result<(), GridError> {
        let mut analysis = analyzer::analyze_full(&self.board, self.rules.tiers, &mut self.scratch);

        if !analysis.has_pair && analysis.matchable_cells.len() >= 2 {
            analysis = self.reshuffle(&analysis)?;
        }

        self.apply_tiers(&analysis);
        self.last_analysis = analysis;
        Ok(())
    }

    fn reshuffle(&mut self, deadlocked: &AnalysisResult) -> Result<AnalysisResult, GridError> {
        let plan = plan_reshuffle(
            &self.board,
            &deadlocked.matchable_cells,
            &deadlocked.kind_counts,
            &mut self.rng,
            &mut self.scratch,
        )?;
        if plan.is_empty() {
            return Ok(deadlocked.clone());
        }

        self.apply_plan(&plan)?;
        self.reshuffles += 1;

        let after = analyzer::analyze_full(&self.board, self.rules.tiers, &mut self.scratch);
        self.events.push(GridEvent::Reshuffled {
            assignments: plan.len(),
            resolved: after.has_pair,
        });
        Ok(after)
    }

    /// Rewrite kinds in place; no tiles are created or destroyed
    fn apply_plan(&mut self, plan: &ShufflePlan) -> Result<(), GridError> {
        for a in &plan.assignments {
            self.board.check(a.position)?;
            let Some(tile) = self.board.get_mut(a.position) else {
                return Err(GridError::AlreadyRemoved(a.position));
            };
            match tile.set_kind(a.kind) {
                Some(from) if from != a.kind => {
                    let tile = *tile;
                    self.events.push(GridEvent::KindChanged {
                        tile,
                        from,
                        to: a.kind,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_tiers(&mut self, analysis: &AnalysisResult) {
        for &(pos, tier) in &analysis.tier_assignments {
            let Some(tile) = self.board.get_mut(pos) else {
                continue;
            };
            if tile.set_tier(tier) {
                let tile = *tile;
                self.events.push(GridEvent::TierChanged { tile, tier });
            }
        }
    }

    fn alloc_id(&mut self) -> TileId {
        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;
        id
    }

    // ---- Queries ----

    /// Analyze the current board without writing tiers back.
    ///
    /// An incremental scan is scoped to the cells changed by the last settle.
    pub fn analyze(&mut self, full_scan: bool) -> AnalysisResult {
        analyzer::analyze(
            &self.board,
            &self.last_frontier,
            self.rules.tiers,
            full_scan,
            &mut self.scratch,
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Result of the analysis that ran after the last settle or initialization
    pub fn last_analysis(&self) -> &AnalysisResult {
        &self.last_analysis
    }

    pub fn last_settle_frontier(&self) -> &[Position] {
        &self.last_frontier
    }

    pub fn has_moves(&self) -> bool {
        self.last_analysis.has_pair
    }

    pub fn moves_left(&self) -> Option<u32> {
        self.moves_left
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// The move budget is spent
    pub fn is_finished(&self) -> bool {
        self.moves_left == Some(0)
    }

    pub fn reshuffle_count(&self) -> u32 {
        self.reshuffles
    }

    /// Pending notifications, oldest first
    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.capture_board(&self.board);
        out.moves_left = self.moves_left;
        out.finished = self.is_finished();
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

/// Scoped resolution batch.
///
/// Dropping the guard closes the batch on every exit path; a settle error is only
/// reported through [`close`](Self::close).
#[derive(Debug)]
pub struct ResolutionBatch<'a> {
    state: &'a mut GridState,
    closed: bool,
}

impl ResolutionBatch<'_> {
    pub fn close(mut self) -> Result<(), GridError> {
        self.closed = true;
        self.state.end_batch()
    }
}

impl Deref for ResolutionBatch<'_> {
    type Target = GridState;

    fn deref(&self) -> &GridState {
        self.state
    }
}

impl DerefMut for ResolutionBatch<'_> {
    fn deref_mut(&mut self) -> &mut GridState {
        self.state
    }
}

impl Drop for ResolutionBatch<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.state.end_batch();
        }
    }
}
