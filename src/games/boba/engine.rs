//! The game state engine: one owner for state, config and storage.
//!
//! Each public action applies the pure rules from `logic`, runs achievement
//! evaluation, and writes the snapshot before returning. A failed write is
//! logged and otherwise ignored.

use tracing::{debug, info, warn};

use crate::config::GameConfig;

use super::achievements::{self, AchievementEvent};
use super::logic::{self, PurchaseError};
use super::save;
use super::state::GameState;
use super::storage::KeyValueStore;

pub struct BobaEngine {
    state: GameState,
    config: GameConfig,
    store: Box<dyn KeyValueStore>,
}

impl BobaEngine {
    /// Load the saved game from `store`, or start fresh.
    pub fn new(config: GameConfig, store: Box<dyn KeyValueStore>) -> Self {
        let raw = store.get(&config.storage_key);
        let state = save::load(raw.as_deref(), &config);
        info!(
            boba = state.boba,
            production_rate = state.production_rate,
            achievements = state.achievements.len(),
            "game loaded"
        );
        Self {
            state,
            config,
            store,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn can_afford(&self, id: &str) -> bool {
        logic::can_afford(&self.state, id)
    }

    pub fn click(&mut self) -> Vec<AchievementEvent> {
        let amount = logic::click(&mut self.state);
        debug!(amount, boba = self.state.boba, "click");
        self.settle()
    }

    /// One passive accrual firing. With no production nothing is evaluated
    /// or written.
    pub fn tick(&mut self) -> Vec<AchievementEvent> {
        if !logic::tick(&mut self.state) {
            return Vec::new();
        }
        self.settle()
    }

    pub fn purchase(&mut self, id: &str) -> Result<Vec<AchievementEvent>, PurchaseError> {
        if let Err(e) = logic::purchase(&mut self.state, id, self.config.cost_growth) {
            debug!(error = %e, "purchase rejected");
            return Err(e);
        }
        if let Some(u) = self.state.upgrade(id) {
            info!(
                %id,
                owned = u.owned,
                next_cost = u.cost,
                production_rate = self.state.production_rate,
                "upgrade purchased"
            );
        }
        Ok(self.settle())
    }

    /// Wipe the saved record and start over.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!(error = %e, "could not delete save data");
        }
        self.state = GameState::new(&self.config);
        info!("game reset");
    }

    fn settle(&mut self) -> Vec<AchievementEvent> {
        let events = achievements::evaluate(&mut self.state, &self.config.achievements);
        for event in &events {
            info!(id = %event.id, title = %event.title, "achievement unlocked");
        }
        self.persist();
        events
    }

    fn persist(&mut self) {
        let json = match save::serialize(&self.state) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "save serialization failed");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.config.storage_key, &json) {
            warn!(error = %e, "save write failed");
        }
    }
}
