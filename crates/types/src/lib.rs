//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine logic, event logging, level loading, a view layer).
//!
//! # Coordinates
//!
//! Boards are `width x height` grids addressed by [`Position`]:
//!
//! - **x**: column, `0..width` (left to right)
//! - **y**: row, `0..height` (bottom to top)
//!
//! Gravity pulls tiles toward `y = 0`; refills enter from the top.
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 8 | Board columns |
//! | `DEFAULT_HEIGHT` | 8 | Board rows |
//! | `DEFAULT_KIND_COUNT` | 5 | Distinct matchable kinds (colors) |
//! | `DEFAULT_TIERS` | 4 / 7 / 9 | Group sizes for tiers A / B / C |
//! | `MIN_TIER_THRESHOLD` | 2 | Smallest legal tier threshold |
//! | `WOODEN_BOX_STRENGTH` | 2 | Hits needed to break a wooden box |
//!
//! # Examples
//!
//! ```
//! use tile_blast_types::{ObstacleKind, Position, Tier, TierThresholds};
//!
//! let tiers = TierThresholds::new(3, 5, 7);
//! assert_eq!(tiers.classify(2), Tier::Default);
//! assert_eq!(tiers.classify(4), Tier::A);
//! assert_eq!(tiers.classify(7), Tier::C);
//!
//! let p = Position::new(0, 0);
//! assert_eq!(p.neighbor(-1, 0, 4, 4), None);
//! assert_eq!(p.neighbor(1, 0, 4, 4), Some(Position::new(1, 0)));
//!
//! assert_eq!(ObstacleKind::from_str("woodenBox"), Some(ObstacleKind::WoodenBox));
//! ```

use std::fmt;

/// Default board width in cells
pub const DEFAULT_WIDTH: u16 = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: u16 = 8;

/// Default number of matchable kinds
pub const DEFAULT_KIND_COUNT: u8 = 5;

/// Smallest group size a tier threshold may use
pub const MIN_TIER_THRESHOLD: u16 = 2;

/// Default tier thresholds (A, B, C)
pub const DEFAULT_TIERS: TierThresholds = TierThresholds::new(4, 7, 9);

/// Default level seed
pub const DEFAULT_SEED: u32 = 12345;

/// Starting strength of a wooden box
pub const WOODEN_BOX_STRENGTH: u8 = 2;

/// 4-neighbour offsets (left, right, down, up)
pub const NEIGHBOR_OFFSETS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Matchable tile kind (its color). Equal kinds connect.
pub type Kind = u8;

/// A cell coordinate on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)`, returning `None` if the result leaves a `width x height` board.
    #[inline]
    pub fn neighbor(self, dx: i8, dy: i8, width: u16, height: u16) -> Option<Position> {
        let x = self.x as i32 + dx as i32;
        let y = self.y as i32 + dy as i32;
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            return None;
        }
        Some(Position::new(x as u16, y as u16))
    }

    /// Check whether the position lies on a `width x height` board
    #[inline]
    pub fn in_bounds(self, width: u16, height: u16) -> bool {
        self.x < width && self.y < height
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Stable identity of a tile for the lifetime of a board session.
///
/// Ids are never reused within a session, so a view layer can key sprites by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Obstacle kinds a level may place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObstacleKind {
    WoodenBox,
}

impl ObstacleKind {
    /// Parse obstacle kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_blast_types::ObstacleKind;
    ///
    /// assert_eq!(ObstacleKind::from_str("woodenbox"), Some(ObstacleKind::WoodenBox));
    /// assert_eq!(ObstacleKind::from_str("wooden_box"), Some(ObstacleKind::WoodenBox));
    /// assert_eq!(ObstacleKind::from_str("rock"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "woodenbox" => Some(ObstacleKind::WoodenBox),
            _ => None,
        }
    }

    /// Convert to camelCase string (level files, event log)
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::WoodenBox => "woodenBox",
        }
    }

    /// Built-in gravity and strength for this kind
    pub fn default_profile(&self) -> ObstacleProfile {
        match self {
            ObstacleKind::WoodenBox => ObstacleProfile {
                falls_with_gravity: false,
                strength: WOODEN_BOX_STRENGTH,
            },
        }
    }
}

/// Per-obstacle-kind behaviour supplied by level data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleProfile {
    pub falls_with_gravity: bool,
    pub strength: u8,
}

/// Presentation tier of a connected group, ordered by size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Tier {
    #[default]
    Default,
    A,
    B,
    C,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Default => "default",
            Tier::A => "a",
            Tier::B => "b",
            Tier::C => "c",
        }
    }
}

/// Group-size thresholds for tiers A, B and C.
///
/// Valid thresholds are each >= [`MIN_TIER_THRESHOLD`] and ascending (`a <= b <= c`);
/// validation happens where rules are accepted, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierThresholds {
    pub a: u16,
    pub b: u16,
    pub c: u16,
}

impl TierThresholds {
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        Self { a, b, c }
    }

    /// Classify a group size
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_blast_types::{Tier, TierThresholds};
    ///
    /// let t = TierThresholds::new(3, 5, 7);
    /// assert_eq!(t.classify(1), Tier::Default);
    /// assert_eq!(t.classify(3), Tier::A);
    /// assert_eq!(t.classify(5), Tier::B);
    /// assert_eq!(t.classify(70), Tier::C);
    /// ```
    pub fn classify(&self, size: usize) -> Tier {
        if size >= self.c as usize {
            Tier::C
        } else if size >= self.b as usize {
            Tier::B
        } else if size >= self.a as usize {
            Tier::A
        } else {
            Tier::Default
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.a <= self.b && self.b <= self.c
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        DEFAULT_TIERS
    }
}

/// Category-specific payload of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileBody {
    /// Joins flood-fill groups with equal `kind`; always falls with gravity
    Matchable { kind: Kind, tier: Tier },
    /// Never part of a group; damaged by adjacent pops
    Obstacle {
        kind: ObstacleKind,
        falls_with_gravity: bool,
        strength: u8,
    },
    /// Placeholder for power-ups; falls with gravity, never matches
    Special,
}

/// A tile on the board.
///
/// `position` is a cached back-reference kept current by whoever moves the tile.
/// It is never used to locate or mutate board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub position: Position,
    pub body: TileBody,
}

impl Tile {
    pub fn matchable(id: TileId, position: Position, kind: Kind) -> Self {
        Self {
            id,
            position,
            body: TileBody::Matchable {
                kind,
                tier: Tier::Default,
            },
        }
    }

    pub fn obstacle(id: TileId, position: Position, kind: ObstacleKind, profile: ObstacleProfile) -> Self {
        Self {
            id,
            position,
            body: TileBody::Obstacle {
                kind,
                falls_with_gravity: profile.falls_with_gravity,
                strength: profile.strength,
            },
        }
    }

    pub fn special(id: TileId, position: Position) -> Self {
        Self {
            id,
            position,
            body: TileBody::Special,
        }
    }

    #[inline]
    pub fn is_matchable(&self) -> bool {
        matches!(self.body, TileBody::Matchable { .. })
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        matches!(self.body, TileBody::Obstacle { .. })
    }

    /// Matchable kind, `None` for obstacles and specials
    #[inline]
    pub fn kind(&self) -> Option<Kind> {
        match self.body {
            TileBody::Matchable { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self.body {
            TileBody::Matchable { tier, .. } => Some(tier),
            _ => None,
        }
    }

    /// Rewrite a matchable tile's kind, returning the previous kind
    pub fn set_kind(&mut self, new_kind: Kind) -> Option<Kind> {
        match &mut self.body {
            TileBody::Matchable { kind, .. } => Some(std::mem::replace(kind, new_kind)),
            _ => None,
        }
    }

    /// Store a new tier; `true` if it differs from the stored one
    pub fn set_tier(&mut self, new_tier: Tier) -> bool {
        match &mut self.body {
            TileBody::Matchable { tier, .. } if *tier != new_tier => {
                *tier = new_tier;
                true
            }
            _ => false,
        }
    }

    pub fn strength(&self) -> Option<u8> {
        match self.body {
            TileBody::Obstacle { strength, .. } => Some(strength),
            _ => None,
        }
    }

    #[inline]
    pub fn falls_with_gravity(&self) -> bool {
        match self.body {
            TileBody::Matchable { .. } | TileBody::Special => true,
            TileBody::Obstacle {
                falls_with_gravity, ..
            } => falls_with_gravity,
        }
    }

    pub fn category_str(&self) -> &'static str {
        match self.body {
            TileBody::Matchable { .. } => "match",
            TileBody::Obstacle { .. } => "obstacle",
            TileBody::Special => "special",
        }
    }
}

/// Notifications for the view/animation layer.
///
/// The engine pushes these in the order the changes happened; nothing in the engine
/// depends on anyone consuming them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    TileCreated {
        tile: Tile,
        position: Position,
    },
    TileRemoved {
        tile: Tile,
        position: Position,
    },
    TileMoved {
        tile: Tile,
        from: Position,
        to: Position,
    },
    TierChanged {
        tile: Tile,
        tier: Tier,
    },
    /// A reshuffle rewrote the tile's kind in place
    KindChanged {
        tile: Tile,
        from: Kind,
        to: Kind,
    },
    /// One settle pass started for these columns (ascending)
    RefillTriggered {
        columns: Vec<u16>,
    },
    /// A deadlock reshuffle was applied; `resolved` reports whether a pair now exists
    Reshuffled {
        assignments: usize,
        resolved: bool,
    },
    ObstacleDamaged {
        tile: Tile,
        strength: u8,
    },
    /// Removal of an already-empty cell was ignored
    RemovalIgnored {
        position: Position,
    },
    MoveConsumed {
        moves_left: u32,
    },
    MovesExhausted,
}

impl GridEvent {
    /// camelCase event name (event log `type` field)
    pub fn as_str(&self) -> &'static str {
        match self {
            GridEvent::TileCreated { .. } => "tileCreated",
            GridEvent::TileRemoved { .. } => "tileRemoved",
            GridEvent::TileMoved { .. } => "tileMoved",
            GridEvent::TierChanged { .. } => "tierChanged",
            GridEvent::KindChanged { .. } => "kindChanged",
            GridEvent::RefillTriggered { .. } => "refillTriggered",
            GridEvent::Reshuffled { .. } => "reshuffled",
            GridEvent::ObstacleDamaged { .. } => "obstacleDamaged",
            GridEvent::RemovalIgnored { .. } => "removalIgnored",
            GridEvent::MoveConsumed { .. } => "moveConsumed",
            GridEvent::MovesExhausted => "movesExhausted",
        }
    }
}
