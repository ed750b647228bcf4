//! Level definitions - JSON level files turned into engine rules and spawns
//!
//! ```json
//! {
//!   "name": "first steps",
//!   "width": 4, "height": 3, "kindCount": 3,
//!   "tiers": [3, 5, 7], "seed": 1234, "moveCount": 10,
//!   "cells": [
//!     { "type": "match", "x": 0, "y": 0, "kind": 1 },
//!     { "type": "obstacle", "x": 1, "y": 0, "obstacle": "woodenBox" }
//!   ]
//! }
//! ```
//!
//! A level without `cells` is filled at random from its seed. On a retry with
//! `remapColorsOnRetry`, the layout is kept but kind ids are permuted and the run seed
//! becomes `seed + attempt`.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Rules, SimpleRng, TileSpawn};
use crate::types::{
    Kind, ObstacleKind, ObstacleProfile, TierThresholds, DEFAULT_KIND_COUNT, DEFAULT_SEED,
};

fn default_kind_count() -> u8 {
    DEFAULT_KIND_COUNT
}

fn default_seed() -> u32 {
    DEFAULT_SEED
}

fn default_true() -> bool {
    true
}

/// One starting cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellDefinition {
    Match { x: u16, y: u16, kind: Kind },
    Obstacle { x: u16, y: u16, obstacle: String },
    Special { x: u16, y: u16 },
}

/// Per-kind obstacle override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDefinition {
    pub obstacle: String,
    pub falls_with_gravity: bool,
    pub strength: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    #[serde(default)]
    pub name: String,
    pub width: u16,
    pub height: u16,
    #[serde(default = "default_kind_count")]
    pub kind_count: u8,
    /// Group sizes for tiers A, B, C
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<[u16; 3]>,
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_count: Option<u32>,
    #[serde(default = "default_true")]
    pub remap_colors_on_retry: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<ObstacleDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<CellDefinition>,
}

impl LevelDefinition {
    /// A randomly filled level with the given rules
    pub fn random(rules: &Rules) -> Self {
        let t = rules.tiers;
        Self {
            name: String::from("random"),
            width: rules.width,
            height: rules.height,
            kind_count: rules.kind_count,
            tiers: Some([t.a, t.b, t.c]),
            seed: rules.seed,
            move_count: rules.move_limit,
            remap_colors_on_retry: true,
            obstacles: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("level: invalid JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("level: cannot read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("level: {}", path.display()))
    }

    /// Seed for refills and reshuffles on a given attempt (0 = first try)
    pub fn run_seed(&self, attempt: u32) -> u32 {
        if self.remap_colors_on_retry {
            self.seed.wrapping_add(attempt)
        } else {
            self.seed
        }
    }

    /// Engine rules for an attempt, validated
    pub fn rules(&self, attempt: u32) -> Result<Rules> {
        let tiers = match self.tiers {
            Some([a, b, c]) => TierThresholds::new(a, b, c),
            None => TierThresholds::default(),
        };

        let mut rules = Rules {
            width: self.width,
            height: self.height,
            kind_count: self.kind_count,
            tiers,
            seed: self.run_seed(attempt),
            move_limit: self.move_count,
            ..Rules::default()
        };
        for o in &self.obstacles {
            let kind = parse_obstacle(&o.obstacle)?;
            rules.obstacle_profiles.insert(
                kind,
                ObstacleProfile {
                    falls_with_gravity: o.falls_with_gravity,
                    strength: o.strength,
                },
            );
        }

        rules
            .validate()
            .map_err(|e| anyhow!("level {:?}: {}", self.name, e))?;
        Ok(rules)
    }

    /// Starting tiles for an attempt
    pub fn spawns(&self, attempt: u32) -> Result<Vec<TileSpawn>> {
        if self.cells.is_empty() {
            return Ok(self.random_spawns());
        }

        let remap: Option<Vec<Kind>> = (self.remap_colors_on_retry && attempt > 0)
            .then(|| SimpleRng::new(self.run_seed(attempt)).permutation(self.kind_count));

        self.cells
            .iter()
            .map(|cell| -> Result<TileSpawn> {
                Ok(match cell {
                    CellDefinition::Match { x, y, kind } => {
                        let kind = match &remap {
                            Some(perm) => perm.get(*kind as usize).copied().unwrap_or(*kind),
                            None => *kind,
                        };
                        TileSpawn::matchable(*x, *y, kind)
                    }
                    CellDefinition::Obstacle { x, y, obstacle } => {
                        TileSpawn::obstacle(*x, *y, parse_obstacle(obstacle)?)
                    }
                    CellDefinition::Special { x, y } => TileSpawn::special(*x, *y),
                })
            })
            .collect()
    }

    fn random_spawns(&self) -> Vec<TileSpawn> {
        let mut rng = SimpleRng::new(self.seed);
        let mut spawns = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                spawns.push(TileSpawn::matchable(x, y, rng.next_kind(self.kind_count)));
            }
        }
        spawns
    }
}

fn parse_obstacle(name: &str) -> Result<ObstacleKind> {
    ObstacleKind::from_str(name).ok_or_else(|| anyhow!("level: unknown obstacle kind: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpawnBody;

    const SAMPLE: &str = r#"{
        "name": "sample",
        "width": 3, "height": 2, "kindCount": 3,
        "tiers": [3, 5, 7], "seed": 40, "moveCount": 5,
        "cells": [
            { "type": "match", "x": 0, "y": 0, "kind": 0 },
            { "type": "match", "x": 1, "y": 0, "kind": 2 },
            { "type": "obstacle", "x": 2, "y": 0, "obstacle": "woodenBox" },
            { "type": "special", "x": 0, "y": 1 }
        ]
    }"#;

    #[test]
    fn test_parse_and_convert() {
        let level = LevelDefinition::from_json(SAMPLE).unwrap();
        assert!(level.remap_colors_on_retry);

        let rules = level.rules(0).unwrap();
        assert_eq!((rules.width, rules.height, rules.kind_count), (3, 2, 3));
        assert_eq!(rules.tiers, TierThresholds::new(3, 5, 7));
        assert_eq!(rules.move_limit, Some(5));
        assert_eq!(rules.seed, 40);

        let spawns = level.spawns(0).unwrap();
        assert_eq!(spawns.len(), 4);
        assert_eq!(spawns[1], TileSpawn::matchable(1, 0, 2));
        assert_eq!(
            spawns[2].body,
            SpawnBody::Obstacle {
                kind: ObstacleKind::WoodenBox
            }
        );
    }

    #[test]
    fn test_retry_remaps_colors_and_seed() {
        let level = LevelDefinition::from_json(SAMPLE).unwrap();
        assert_eq!(level.rules(2).unwrap().seed, 42);

        let first: Vec<_> = level.spawns(0).unwrap();
        let retry: Vec<_> = level.spawns(2).unwrap();
        assert_eq!(first.len(), retry.len());
        for (a, b) in first.iter().zip(&retry) {
            assert_eq!(a.position, b.position);
        }
        // Distinct kinds stay distinct under a permutation.
        let kind = |s: &TileSpawn| match s.body {
            SpawnBody::Matchable { kind } => Some(kind),
            _ => None,
        };
        assert_ne!(kind(&retry[0]), kind(&retry[1]));
    }

    #[test]
    fn test_no_remap_keeps_everything() {
        let mut level = LevelDefinition::from_json(SAMPLE).unwrap();
        level.remap_colors_on_retry = false;
        assert_eq!(level.spawns(3).unwrap(), level.spawns(0).unwrap());
        assert_eq!(level.rules(3).unwrap().seed, 40);
    }

    #[test]
    fn test_random_fill_covers_board() {
        let level = LevelDefinition::random(&Rules::with_size(5, 4));
        let spawns = level.spawns(0).unwrap();
        assert_eq!(spawns.len(), 20);
        assert!(spawns.iter().all(|s| match s.body {
            SpawnBody::Matchable { kind } => kind < level.kind_count,
            _ => false,
        }));
    }

    #[test]
    fn test_invalid_tiers_are_rejected() {
        let mut level = LevelDefinition::from_json(SAMPLE).unwrap();
        level.tiers = Some([5, 3, 7]);
        assert!(level.rules(0).is_err());
    }

    #[test]
    fn test_unknown_obstacle_is_rejected() {
        let text = SAMPLE.replace("woodenBox", "rock");
        let level = LevelDefinition::from_json(&text).unwrap();
        let err = level.spawns(0).unwrap_err();
        assert!(err.to_string().contains("rock"));
    }

    #[test]
    fn test_obstacle_override() {
        let mut level = LevelDefinition::from_json(SAMPLE).unwrap();
        level.obstacles.push(ObstacleDefinition {
            obstacle: String::from("wooden_box"),
            falls_with_gravity: true,
            strength: 3,
        });
        let rules = level.rules(0).unwrap();
        let profile = rules.obstacle_profile(ObstacleKind::WoodenBox);
        assert!(profile.falls_with_gravity);
        assert_eq!(profile.strength, 3);
    }
}
