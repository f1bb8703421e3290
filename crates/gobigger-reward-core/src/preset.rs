//! Named reward presets
//!
//! Each preset is a [`RewardConfig`] for the same engine; presets differ only
//! in their weight table, windows and enabled component set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{ComponentSet, RewardConfig};
use crate::reward::component;
use crate::RewardError;

/// Built-in reward presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Base reward plus food efficiency only
    Basic,
    /// Coarse exploration and split timing, no heading diversity
    Enhanced,
    /// Full single-agent shaping
    Optimized,
    /// Full shaping with opponent elimination and team rank
    MultiAgent,
}

const PRESETS: &[(&str, Preset)] = &[
    ("basic", Preset::Basic),
    ("enhanced", Preset::Enhanced),
    ("optimized", Preset::Optimized),
    ("multi_agent", Preset::MultiAgent),
];

impl Preset {
    /// Name under which the preset is registered
    #[must_use]
    pub fn name(self) -> &'static str {
        PRESETS
            .iter()
            .find(|(_, p)| *p == self)
            .map_or("basic", |(name, _)| name)
    }

    /// List registered preset names
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        PRESETS.iter().map(|(name, _)| *name).collect()
    }

    /// Build the configuration for this preset
    #[must_use]
    pub fn config(self) -> RewardConfig {
        let base = RewardConfig::default();
        match self {
            Self::Basic => RewardConfig {
                enabled: ComponentSet {
                    exploration: false,
                    diversity: false,
                    split: false,
                    food_efficiency: true,
                    opponents: false,
                },
                ..base
            },
            Self::Enhanced => RewardConfig {
                enabled: ComponentSet {
                    diversity: false,
                    ..ComponentSet::default()
                },
                cell_size: 200.0,
                smart_split_interval_threshold: 20,
                smart_split_score_threshold: 0.0,
                survival_reward: 0.02,
                death_penalty: -15.0,
                ..base
            }
            .with_weight(component::EXPLORATION_BONUS, 0.5)
            .with_weight(component::SMART_SPLIT_BONUS, 1.5)
            .with_weight(component::WASTE_SPLIT_PENALTY, -0.2)
            .with_weight(component::FOOD_EFFICIENCY, 1.0),
            Self::Optimized => RewardConfig {
                cell_size: 80.0,
                diversity_window: 15,
                split_efficiency_window: 60,
                ..base
            },
            Self::MultiAgent => RewardConfig {
                enabled: ComponentSet {
                    opponents: true,
                    ..ComponentSet::default()
                },
                split_efficiency_window: 30,
                death_penalty: -10.0,
                rank_weight: 100.0,
                ..base
            }
            .with_weight(component::EXPLORATION_BONUS, 1.5)
            .with_weight(component::SPLIT_TO_EAT_BONUS, 20.0)
            .with_weight(component::EXPIRED_SPLIT_PENALTY, -5.0),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        PRESETS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, preset)| *preset)
            .ok_or_else(|| RewardError::UnknownPreset(s.to_string()))
    }
}

impl From<Preset> for RewardConfig {
    fn from(preset: Preset) -> Self {
        preset.config()
    }
}
