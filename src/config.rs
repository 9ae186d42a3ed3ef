//! Game configuration: upgrade table, achievement thresholds, and timing.
//!
//! The engine never hard-codes an upgrade identifier. Everything that the
//! store sells and every currency threshold that unlocks an achievement is
//! data in [`GameConfig`], which can be overridden from JSON.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::games::boba::state::{Multiplier, UpgradeEffect};

/// Errors raised while parsing or validating a JSON configuration override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("upgrade id '{0}' is defined more than once")]
    DuplicateUpgrade(String),
    #[error("upgrade '{id}' has invalid cost {cost}")]
    InvalidCost { id: String, cost: f64 },
    #[error("upgrade '{id}' has invalid production rate {rate}")]
    InvalidRate { id: String, rate: f64 },
    #[error("cost growth must be a finite factor >= 1, got {0}")]
    InvalidGrowth(f64),
    #[error("tick interval must be positive, got {0}ms")]
    InvalidInterval(f64),
    #[error("frame limit must be a positive number of ms, got {0}")]
    InvalidFrameLimit(f64),
    #[error("achievement '{id}' has invalid threshold {threshold}")]
    InvalidThreshold { id: String, threshold: f64 },
    #[error("achievement id '{0}' is defined more than once")]
    DuplicateAchievement(String),
}

/// One purchasable entry in the store.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    /// Price of the first unit.
    pub cost: f64,
    pub effect: UpgradeEffect,
}

/// An achievement unlocked once currency reaches `threshold`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ThresholdAchievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub threshold: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Key of the persisted record in the browser's localStorage.
    pub storage_key: String,
    /// Real-time cadence of passive accrual.
    pub tick_interval_ms: f64,
    /// Upper bound on the elapsed time a single frame may contribute.
    pub max_frame_ms: f64,
    /// Cost factor applied to repeatable upgrades after each purchase.
    pub cost_growth: f64,
    pub upgrades: Vec<UpgradeDef>,
    pub achievements: Vec<ThresholdAchievement>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            storage_key: "bobaGame".into(),
            tick_interval_ms: 1000.0,
            max_frame_ms: 5000.0,
            cost_growth: 1.15,
            upgrades: default_upgrades(),
            achievements: default_achievements(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON override. Missing top-level fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cost_growth.is_finite() || self.cost_growth < 1.0 {
            return Err(ConfigError::InvalidGrowth(self.cost_growth));
        }
        if !self.tick_interval_ms.is_finite() || self.tick_interval_ms <= 0.0 {
            return Err(ConfigError::InvalidInterval(self.tick_interval_ms));
        }
        if !self.max_frame_ms.is_finite() || self.max_frame_ms <= 0.0 {
            return Err(ConfigError::InvalidFrameLimit(self.max_frame_ms));
        }

        let mut seen = HashSet::new();
        for def in &self.upgrades {
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::DuplicateUpgrade(def.id.clone()));
            }
            if !def.cost.is_finite() || def.cost <= 0.0 {
                return Err(ConfigError::InvalidCost {
                    id: def.id.clone(),
                    cost: def.cost,
                });
            }
            if let UpgradeEffect::Production { rate, .. } = def.effect {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(ConfigError::InvalidRate {
                        id: def.id.clone(),
                        rate,
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for a in &self.achievements {
            if !seen.insert(a.id.as_str()) {
                return Err(ConfigError::DuplicateAchievement(a.id.clone()));
            }
            if !a.threshold.is_finite() || a.threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    id: a.id.clone(),
                    threshold: a.threshold,
                });
            }
        }
        Ok(())
    }
}

fn default_upgrades() -> Vec<UpgradeDef> {
    let def = |id: &str, name: &str, cost: f64, effect: UpgradeEffect| UpgradeDef {
        id: id.into(),
        name: name.into(),
        cost,
        effect,
    };
    vec![
        def(
            "spoon",
            "Spoon",
            10.0,
            UpgradeEffect::Production {
                rate: 1.0,
                scaled_by: None,
            },
        ),
        def(
            "mixer",
            "Mixer",
            100.0,
            UpgradeEffect::Production {
                rate: 5.0,
                scaled_by: Some(Multiplier::Mixer),
            },
        ),
        def(
            "machine",
            "Machine",
            1_000.0,
            UpgradeEffect::Production {
                rate: 25.0,
                scaled_by: Some(Multiplier::Machine),
            },
        ),
        def(
            "robot",
            "Robot",
            10_000.0,
            UpgradeEffect::Production {
                rate: 100.0,
                scaled_by: None,
            },
        ),
        def("clickBoost", "Bigger Straw", 50.0, UpgradeEffect::ClickBonus),
        def(
            "mixerBoost",
            "Turbo Mixer",
            500.0,
            UpgradeEffect::DoubleMultiplier {
                target: Multiplier::Mixer,
            },
        ),
        def(
            "machineBoost",
            "Overclocked Machine",
            5_000.0,
            UpgradeEffect::DoubleMultiplier {
                target: Multiplier::Machine,
            },
        ),
    ]
}

fn default_achievements() -> Vec<ThresholdAchievement> {
    let def = |id: &str, title: &str, description: &str, icon: &str, threshold: f64| {
        ThresholdAchievement {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            threshold,
        }
    };
    vec![
        def("first_100", "First Sips", "Collect 100 boba", "🧋", 100.0),
        def("first_10000", "Pearl Hoarder", "Collect 10,000 boba", "🫧", 10_000.0),
        def("first_1m", "Boba Tycoon", "Collect 1,000,000 boba", "👑", 1_000_000.0),
    ]
}
