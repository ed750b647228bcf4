//! Tile Blast (workspace facade crate).
//!
//! Re-exports the engine as `tile_blast::{core, types}` and adds the I/O edge around it:
//! level files, the JSONL event log and runner configuration.

pub use tile_blast_core as core;
pub use tile_blast_types as types;

pub mod config;
pub mod level;
pub mod log;
