//! Achievement unlock detection.
//!
//! `evaluate` is safe to call after every mutation: an unlocked id is never
//! unlocked twice and never removed.

use crate::config::ThresholdAchievement;

use super::logic::format_number;
use super::state::GameState;

const DOUBLING_PREFIX: &str = "double_";
const DOUBLING_ICON: &str = "✨";

/// A newly unlocked achievement, ready to be shown as a notification.
#[derive(Clone, Debug, PartialEq)]
pub struct AchievementEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl AchievementEvent {
    fn from_threshold(def: &ThresholdAchievement) -> Self {
        Self {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
        }
    }

    fn doubling(milestone: f64) -> Self {
        Self {
            id: doubling_id(milestone),
            title: format!("Doubled to {}", format_number(milestone)),
            description: format!("Hold {} boba at once", format_number(milestone)),
            icon: DOUBLING_ICON.into(),
        }
    }
}

/// `double_<n>` for a power-of-two milestone `n`.
pub fn doubling_id(milestone: f64) -> String {
    format!("{}{:.0}", DOUBLING_PREFIX, milestone)
}

/// Unlock every achievement the current state qualifies for.
///
/// Threshold achievements are checked first, in catalog order. Then the
/// doubling milestone advances one power of two at a time while boba is at
/// least twice the last milestone, emitting one event per step in
/// ascending order.
pub fn evaluate(state: &mut GameState, catalog: &[ThresholdAchievement]) -> Vec<AchievementEvent> {
    let mut events = Vec::new();

    for def in catalog {
        if state.boba >= def.threshold && state.achievements.insert(def.id.clone()) {
            events.push(AchievementEvent::from_threshold(def));
        }
    }

    while state.boba >= state.last_milestone * 2.0 {
        let next = state.last_milestone * 2.0;
        if !next.is_finite() {
            break;
        }
        state.last_milestone = next;
        let event = AchievementEvent::doubling(next);
        if state.achievements.insert(event.id.clone()) {
            events.push(event);
        }
    }

    events
}

/// Display data for an already unlocked id, e.g. to rebuild the badge row
/// after a reload.
pub fn describe(id: &str, catalog: &[ThresholdAchievement]) -> Option<AchievementEvent> {
    if let Some(def) = catalog.iter().find(|a| a.id == id) {
        return Some(AchievementEvent::from_threshold(def));
    }
    let milestone: f64 = id.strip_prefix(DOUBLING_PREFIX)?.parse().ok()?;
    Some(AchievementEvent::doubling(milestone))
}
