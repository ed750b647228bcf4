//! Level rules - board dimensions, kind count, tier thresholds, obstacle behaviour
//!
//! Rules are supplied by level-loading code and validated once when a [`GridState`]
//! is created or re-initialized.
//!
//! [`GridState`]: crate::GridState

use std::collections::BTreeMap;

use crate::error::GridError;
use crate::types::{
    ObstacleKind, ObstacleProfile, TierThresholds, DEFAULT_HEIGHT, DEFAULT_KIND_COUNT,
    DEFAULT_SEED, DEFAULT_WIDTH, MIN_TIER_THRESHOLD,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub width: u16,
    pub height: u16,
    /// Refills draw kinds uniformly from `0..kind_count`
    pub kind_count: u8,
    pub tiers: TierThresholds,
    pub seed: u32,
    /// Accepted pops before the level ends; `None` for unlimited
    pub move_limit: Option<u32>,
    /// Overrides of [`ObstacleKind::default_profile`]
    pub obstacle_profiles: BTreeMap<ObstacleKind, ObstacleProfile>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            kind_count: DEFAULT_KIND_COUNT,
            tiers: TierThresholds::default(),
            seed: DEFAULT_SEED,
            move_limit: None,
            obstacle_profiles: BTreeMap::new(),
        }
    }
}

impl Rules {
    /// Rules for a `width x height` board, defaults elsewhere
    pub fn with_size(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Gravity and strength for an obstacle kind
    pub fn obstacle_profile(&self, kind: ObstacleKind) -> ObstacleProfile {
        self.obstacle_profiles
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_profile())
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::invalid(format!(
                "board must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.kind_count == 0 {
            return Err(GridError::invalid("kind count must be at least 1"));
        }
        let t = self.tiers;
        if t.a < MIN_TIER_THRESHOLD || t.b < MIN_TIER_THRESHOLD || t.c < MIN_TIER_THRESHOLD {
            return Err(GridError::invalid(format!(
                "tier thresholds must be >= {}, got ({}, {}, {})",
                MIN_TIER_THRESHOLD, t.a, t.b, t.c
            )));
        }
        if !t.is_ascending() {
            return Err(GridError::invalid(format!(
                "tier thresholds must be ascending, got ({}, {}, {})",
                t.a, t.b, t.c
            )));
        }
        for (kind, profile) in &self.obstacle_profiles {
            if profile.strength == 0 {
                return Err(GridError::invalid(format!(
                    "obstacle {} must have strength >= 1",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}
