//! Event log - line-delimited JSON record of engine notifications
//!
//! One object per line: `seq`, `type` (the event's camelCase name) and whichever payload
//! fields the event carries. Enabled with `TILE_BLAST_LOG_PATH` or `--log <path>`; the
//! file is appended to, so several runs can share one log.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::{GridEvent, Position, Tile, TileBody};

pub const LOG_PATH_ENV: &str = "TILE_BLAST_LOG_PATH";

/// Log path from the environment; blank values count as unset
pub fn log_path_from_env() -> Option<String> {
    env::var(LOG_PATH_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .and_then(|s| if s.is_empty() { None } else { Some(s) })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub id: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,
}

impl From<&Tile> for TileRecord {
    fn from(tile: &Tile) -> Self {
        let obstacle = match tile.body {
            TileBody::Obstacle { kind, .. } => Some(kind.as_str().to_string()),
            _ => None,
        };
        Self {
            id: tile.id.0,
            category: tile.category_str().to_string(),
            kind: tile.kind(),
            tier: tile.tier().map(|t| t.as_str().to_string()),
            obstacle,
            strength: tile.strength(),
        }
    }
}

/// Serde mirror of a [`GridEvent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub seq: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[u16; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<[u16; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<[u16; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_kind: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_kind: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves_left: Option<u32>,
}

fn xy(p: Position) -> Option<[u16; 2]> {
    Some([p.x, p.y])
}

impl EventRecord {
    fn empty(seq: u64, event: &GridEvent) -> Self {
        Self {
            seq,
            event_type: event.as_str().to_string(),
            tile: None,
            position: None,
            from: None,
            to: None,
            tier: None,
            from_kind: None,
            to_kind: None,
            columns: None,
            assignments: None,
            resolved: None,
            strength: None,
            moves_left: None,
        }
    }

    pub fn from_event(seq: u64, event: &GridEvent) -> Self {
        let mut r = Self::empty(seq, event);
        match event {
            GridEvent::TileCreated { tile, position } | GridEvent::TileRemoved { tile, position } => {
                r.tile = Some(tile.into());
                r.position = xy(*position);
            }
            GridEvent::TileMoved { tile, from, to } => {
                r.tile = Some(tile.into());
                r.from = xy(*from);
                r.to = xy(*to);
            }
            GridEvent::TierChanged { tile, tier } => {
                r.tile = Some(tile.into());
                r.tier = Some(tier.as_str().to_string());
            }
            GridEvent::KindChanged { tile, from, to } => {
                r.tile = Some(tile.into());
                r.from_kind = Some(*from);
                r.to_kind = Some(*to);
            }
            GridEvent::RefillTriggered { columns } => {
                r.columns = Some(columns.clone());
            }
            GridEvent::Reshuffled {
                assignments,
                resolved,
            } => {
                r.assignments = Some(*assignments);
                r.resolved = Some(*resolved);
            }
            GridEvent::ObstacleDamaged { tile, strength } => {
                r.tile = Some(tile.into());
                r.strength = Some(*strength);
            }
            GridEvent::RemovalIgnored { position } => {
                r.position = xy(*position);
            }
            GridEvent::MoveConsumed { moves_left } => {
                r.moves_left = Some(*moves_left);
            }
            GridEvent::MovesExhausted => {}
        }
        r
    }
}

/// JSONL writer for engine events
#[derive(Debug)]
pub struct EventLog<W: Write = BufWriter<File>> {
    out: W,
    seq: u64,
    buf: Vec<u8>,
}

impl EventLog {
    /// Open (append) a log file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("log: cannot open {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventLog<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            seq: 0,
            buf: Vec::with_capacity(256),
        }
    }

    /// Records written so far
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn record(&mut self, event: &GridEvent) -> Result<()> {
        self.seq += 1;
        let rec = EventRecord::from_event(self.seq, event);
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, &rec)?;
        self.buf.push(b'\n');
        self.out.write_all(&self.buf)?;
        Ok(())
    }

    pub fn record_all(&mut self, events: &[GridEvent]) -> Result<()> {
        for event in events {
            self.record(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
