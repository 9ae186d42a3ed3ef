/// Boba Shop game state definitions.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::config::GameConfig;

/// The multipliers an upgrade can scale by or double.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Multiplier {
    Click,
    Mixer,
    Machine,
}

/// What owning an upgrade does.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeEffect {
    /// Passive boba per second per owned unit, optionally scaled by a multiplier.
    Production {
        rate: f64,
        #[serde(default)]
        scaled_by: Option<Multiplier>,
    },
    /// One-time: adds 1 to the click base term.
    ClickBonus,
    /// One-time: doubles `target`.
    DoubleMultiplier { target: Multiplier },
}

impl UpgradeEffect {
    /// Production upgrades can be bought any number of times; boosts once.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, UpgradeEffect::Production { .. })
    }
}

/// A single store entry and how many the player owns.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeRecord {
    pub id: String,
    pub name: String,
    /// Price of the next unit.
    pub cost: f64,
    pub owned: u32,
    pub effect: UpgradeEffect,
}

impl UpgradeRecord {
    pub fn is_repeatable(&self) -> bool {
        self.effect.is_repeatable()
    }

    #[cfg(test)]
    pub fn base_rate(&self) -> Option<f64> {
        match self.effect {
            UpgradeEffect::Production { rate, .. } => Some(rate),
            _ => None,
        }
    }

    /// True for a one-time boost that has already been bought.
    pub fn is_sold_out(&self) -> bool {
        !self.is_repeatable() && self.owned >= 1
    }
}

/// Full state of a Boba Shop game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Boba on hand.
    pub boba: f64,
    /// Boba per second. Derived; see `logic::recompute_production_rate`.
    pub production_rate: f64,
    pub click_multiplier: f64,
    pub mixer_multiplier: f64,
    pub machine_multiplier: f64,
    /// Store entries, in config order.
    pub upgrades: Vec<UpgradeRecord>,
    pub achievements: BTreeSet<String>,
    /// Highest power-of-two boba threshold already crossed.
    pub last_milestone: f64,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let upgrades = config
            .upgrades
            .iter()
            .map(|def| UpgradeRecord {
                id: def.id.clone(),
                name: def.name.clone(),
                cost: def.cost,
                owned: 0,
                effect: def.effect.clone(),
            })
            .collect();

        Self {
            boba: 0.0,
            production_rate: 0.0,
            click_multiplier: 1.0,
            mixer_multiplier: 1.0,
            machine_multiplier: 1.0,
            upgrades,
            achievements: BTreeSet::new(),
            last_milestone: 1.0,
        }
    }

    pub fn multiplier(&self, m: Multiplier) -> f64 {
        match m {
            Multiplier::Click => self.click_multiplier,
            Multiplier::Mixer => self.mixer_multiplier,
            Multiplier::Machine => self.machine_multiplier,
        }
    }

    pub fn multiplier_mut(&mut self, m: Multiplier) -> &mut f64 {
        match m {
            Multiplier::Click => &mut self.click_multiplier,
            Multiplier::Mixer => &mut self.mixer_multiplier,
            Multiplier::Machine => &mut self.machine_multiplier,
        }
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeRecord> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn upgrade_mut(&mut self, id: &str) -> Option<&mut UpgradeRecord> {
        self.upgrades.iter_mut().find(|u| u.id == id)
    }

    pub fn owned(&self, id: &str) -> u32 {
        self.upgrade(id).map(|u| u.owned).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.achievements.contains(achievement_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_defaults() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.boba, 0.0);
        assert_eq!(state.production_rate, 0.0);
        assert_eq!(state.click_multiplier, 1.0);
        assert_eq!(state.mixer_multiplier, 1.0);
        assert_eq!(state.machine_multiplier, 1.0);
        assert_eq!(state.last_milestone, 1.0);
        assert!(state.achievements.is_empty());
        assert!(state.upgrades.iter().all(|u| u.owned == 0));
    }

    #[test]
    fn upgrades_follow_config_order() {
        let state = GameState::new(&GameConfig::default());
        let ids: Vec<&str> = state.upgrades.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(
            ids,
            ["spoon", "mixer", "machine", "robot", "clickBoost", "mixerBoost", "machineBoost"]
        );
    }

    #[test]
    fn base_rate_absent_for_boosts() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.upgrade("machine").unwrap().base_rate(), Some(25.0));
        assert_eq!(state.upgrade("clickBoost").unwrap().base_rate(), None);
        assert_eq!(state.upgrade("machineBoost").unwrap().base_rate(), None);
    }

    #[test]
    fn sold_out_only_for_owned_boosts() {
        let mut state = GameState::new(&GameConfig::default());
        state.upgrade_mut("spoon").unwrap().owned = 5;
        state.upgrade_mut("mixerBoost").unwrap().owned = 1;
        assert!(!state.upgrade("spoon").unwrap().is_sold_out());
        assert!(state.upgrade("mixerBoost").unwrap().is_sold_out());
        assert!(!state.upgrade("machineBoost").unwrap().is_sold_out());
    }

    #[test]
    fn multiplier_accessors_agree() {
        let mut state = GameState::new(&GameConfig::default());
        *state.multiplier_mut(Multiplier::Machine) *= 2.0;
        assert_eq!(state.multiplier(Multiplier::Machine), 2.0);
        assert_eq!(state.machine_multiplier, 2.0);
        assert_eq!(state.multiplier(Multiplier::Mixer), 1.0);
    }

    #[test]
    fn owned_of_unknown_is_zero() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.owned("teapot"), 0);
    }
}
