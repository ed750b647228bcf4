//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains the rules of a tile-matching puzzle: group discovery, tier
//! classification, deadlock reshuffles, gravity and refill. It has **no dependencies**
//! on rendering, input or I/O, so it can run under a view layer, a headless runner
//! or a benchmark unchanged.
//!
//! - **Deterministic**: Same seed and same pops produce identical boards
//! - **Single writer**: [`GridState`] owns the board; helpers borrow it
//! - **Allocation-light**: flood fills reuse stamp grids and stacks across calls
//!
//! # Module Structure
//!
//! - [`board`]: flat `width x height` grid of optional tiles
//! - [`analyzer`]: iterative flood fill, per-kind counts, size-based tiers
//! - [`shuffle`]: count-preserving reshuffle that guarantees a pair when one is possible
//! - [`settle`]: per-column gravity and refill
//! - [`grid_state`]: resolution batches, removals, click resolution, notifications
//! - [`layout`]: spawn data and the text-row layout format used by tests and tools
//! - [`rules`]: level configuration and its validation
//! - [`rng`]: seeded LCG used for refills and reshuffles
//! - [`snapshot`]: flat board copy with an FNV-1a hash
//!
//! # Example
//!
//! ```
//! use tile_blast_core::{layout, GridState, PopOutcome, Rules};
//! use tile_blast_core::types::Position;
//!
//! let mut state = GridState::new(Rules::with_size(3, 2)).unwrap();
//! let level = layout::parse_rows(&["001", "122"]).unwrap();
//! state.initialize_layout(&level).unwrap();
//!
//! // Pop the two 0s in the top row; the board settles and refills.
//! let outcome = state.pop_group(Position::new(0, 1)).unwrap();
//! assert_eq!(outcome, PopOutcome::Popped { kind: 0, size: 2 });
//! assert!(state.board().cells().iter().all(Option::is_some));
//!
//! for event in state.drain_events() {
//!     let _ = event.as_str();
//! }
//! ```

pub mod analyzer;
pub mod board;
pub mod error;
pub mod grid_state;
pub mod layout;
pub mod rng;
pub mod rules;
pub mod scratch;
pub mod settle;
pub mod shuffle;
pub mod snapshot;

pub use tile_blast_types as types;

// Re-export commonly used types for convenience
pub use analyzer::{analyze, analyze_full, find_connected_group, AnalysisResult, GroupInfo};
pub use board::Board;
pub use error::GridError;
pub use grid_state::{GridState, PopOutcome, ResolutionBatch};
pub use layout::{Layout, SpawnBody, TileSpawn};
pub use rng::SimpleRng;
pub use rules::Rules;
pub use scratch::Scratch;
pub use settle::{collapse_column, settle_columns, SettleReport, TileMove};
pub use shuffle::{plan_reshuffle, ShuffleAssignment, ShufflePlan};
pub use snapshot::{fnv1a64, BoardSnapshot};
