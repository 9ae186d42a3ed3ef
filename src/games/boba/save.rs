//! Boba Shop save format and load/serialize.
//!
//! The persisted record (localStorage key `"bobaGame"` by default):
//!
//! ```json
//! {
//!   "boba": 1234.0,
//!   "upgrades": { "spoon": { "owned": 3, "cost": 15.0, "name": "Spoon" } },
//!   "clickMultiplier": 1.0,
//!   "mixerMultiplier": 2.0,
//!   "machineMultiplier": 1.0,
//!   "achievementsUnlocked": { "first_100": true },
//!   "lastBobaMilestone": 1024.0
//! }
//! ```
//!
//! Every field is parse-or-default: a missing field, a field of the wrong
//! type, or an out-of-range value falls back to that field's default
//! without affecting its neighbours. Loading never fails.
//!
//! Fields are kept as raw JSON until they are read, so a value serde_json
//! cannot represent (`1e999`) only costs its own field. A repeated key keeps
//! its last value.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{debug, warn};

use crate::config::GameConfig;

use super::logic::recompute_production_rate;
use super::state::GameState;

/// A JSON object whose member values are still unparsed.
type RawObject = BTreeMap<String, Box<RawValue>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveData {
    boba: f64,
    upgrades: BTreeMap<String, UpgradeSave>,
    click_multiplier: f64,
    mixer_multiplier: f64,
    machine_multiplier: f64,
    achievements_unlocked: BTreeMap<String, bool>,
    last_boba_milestone: f64,
}

#[derive(Serialize)]
struct UpgradeSave {
    owned: u32,
    cost: f64,
    name: String,
}

/// `raw` as an object, or `None` for anything else (arrays, scalars, garbage).
fn object(raw: &str) -> Option<RawObject> {
    serde_json::from_str(raw).ok()
}

/// Member `key` of `obj` when present and of type `T`.
fn field<T: DeserializeOwned>(obj: &RawObject, key: &str) -> Option<T> {
    serde_json::from_str(obj.get(key)?.get()).ok()
}

/// Take `field` if present and `valid`, else `default`.
fn parse_or<T>(field: Option<T>, default: T, valid: impl Fn(&T) -> bool) -> T {
    match field {
        Some(v) if valid(&v) => v,
        _ => default,
    }
}

fn is_amount(v: &f64) -> bool {
    v.is_finite() && *v >= 0.0
}

fn is_multiplier(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

fn is_milestone(v: &f64) -> bool {
    v.is_finite() && *v >= 1.0 && v.log2().fract() == 0.0
}

/// Rebuild a `GameState` from a raw snapshot, or the defaults when `raw`
/// is absent or not a JSON object.
pub fn load(raw: Option<&str>, config: &GameConfig) -> GameState {
    let mut state = GameState::new(config);
    let Some(raw) = raw else {
        debug!("no save data; starting fresh");
        return state;
    };
    let Some(save) = object(raw) else {
        warn!("save data is not a JSON object; starting fresh");
        return state;
    };

    apply_save(&mut state, &save);
    state.production_rate = recompute_production_rate(&state);
    state
}

fn apply_save(state: &mut GameState, save: &RawObject) {
    state.boba = parse_or(field(save, "boba"), state.boba, is_amount);
    state.click_multiplier =
        parse_or(field(save, "clickMultiplier"), state.click_multiplier, is_multiplier);
    state.mixer_multiplier =
        parse_or(field(save, "mixerMultiplier"), state.mixer_multiplier, is_multiplier);
    state.machine_multiplier =
        parse_or(field(save, "machineMultiplier"), state.machine_multiplier, is_multiplier);
    state.last_milestone =
        parse_or(field(save, "lastBobaMilestone"), state.last_milestone, is_milestone);

    let upgrades = save.get("upgrades").and_then(|raw| object(raw.get())).unwrap_or_default();
    for (id, raw) in &upgrades {
        let Some(record) = state.upgrade_mut(id) else {
            debug!(%id, "ignoring unknown upgrade in save");
            continue;
        };
        let Some(entry) = object(raw.get()) else {
            debug!(%id, "ignoring malformed upgrade entry");
            continue;
        };
        let owned = parse_or(field(&entry, "owned"), record.owned, |_| true);
        if record.is_repeatable() {
            record.owned = owned;
            record.cost = parse_or(field(&entry, "cost"), record.cost, |c: &f64| {
                c.is_finite() && *c > 0.0
            });
        } else {
            record.owned = owned.min(1);
        }
    }

    let unlocked = save
        .get("achievementsUnlocked")
        .and_then(|raw| object(raw.get()))
        .unwrap_or_default();
    for (id, raw) in unlocked {
        if serde_json::from_str::<bool>(raw.get()).unwrap_or(false) {
            state.achievements.insert(id);
        }
    }
}

/// Produce the persisted record for `state`.
pub fn serialize(state: &GameState) -> Result<String, serde_json::Error> {
    let save = SaveData {
        boba: state.boba,
        upgrades: state
            .upgrades
            .iter()
            .map(|u| {
                let entry = UpgradeSave {
                    owned: u.owned,
                    cost: u.cost,
                    name: u.name.clone(),
                };
                (u.id.clone(), entry)
            })
            .collect(),
        click_multiplier: state.click_multiplier,
        mixer_multiplier: state.mixer_multiplier,
        machine_multiplier: state.machine_multiplier,
        achievements_unlocked: state.achievements.iter().map(|id| (id.clone(), true)).collect(),
        last_boba_milestone: state.last_milestone,
    };
    serde_json::to_string(&save)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn played_state() -> GameState {
        let config = config();
        let mut state = GameState::new(&config);
        state.boba = 12_345.6;
        state.mixer_multiplier = 2.0;
        state.machine_multiplier = 4.0;
        state.upgrade_mut("spoon").unwrap().owned = 7;
        state.upgrade_mut("spoon").unwrap().cost = 26.0;
        state.upgrade_mut("mixer").unwrap().owned = 2;
        state.upgrade_mut("mixer").unwrap().cost = 132.0;
        state.upgrade_mut("mixerBoost").unwrap().owned = 1;
        state.achievements.insert("first_100".into());
        state.achievements.insert("first_10000".into());
        state.achievements.insert("double_8192".into());
        state.last_milestone = 8192.0;
        state.production_rate = recompute_production_rate(&state);
        state
    }

    #[test]
    fn serialize_then_load_reproduces_state() {
        let original = played_state();
        let json = serialize(&original).unwrap();
        let restored = load(Some(&json), &config());
        assert_eq!(restored, original);
        assert_eq!(restored.production_rate, 7.0 + 2.0 * 5.0 * 2.0);
    }

    #[test]
    fn serialized_record_uses_persisted_field_names() {
        let json = serialize(&played_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "boba",
            "upgrades",
            "clickMultiplier",
            "mixerMultiplier",
            "machineMultiplier",
            "achievementsUnlocked",
            "lastBobaMilestone",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["upgrades"]["spoon"]["owned"], 7);
        assert_eq!(value["achievementsUnlocked"]["first_100"], true);
    }

    #[test]
    fn absent_snapshot_gives_defaults() {
        assert_eq!(load(None, &config()), GameState::new(&config()));
    }

    #[test]
    fn garbage_snapshot_gives_defaults() {
        let fresh = GameState::new(&config());
        assert_eq!(load(Some("not json at all"), &config()), fresh);
        assert_eq!(load(Some("[1, 2, 3]"), &config()), fresh);
        assert_eq!(load(Some("42"), &config()), fresh);
        assert_eq!(load(Some(""), &config()), fresh);
    }

    #[test]
    fn partial_snapshot_fills_missing_fields() {
        // 最初期の形式: boba と upgrades だけ
        let json = r#"{
            "boba": 55,
            "upgrades": {
                "spoon":   { "cost": 13, "owned": 2, "perSecond": 1, "name": "Spoon" },
                "mixer":   { "cost": 100, "owned": 0, "perSecond": 5, "name": "Mixer" }
            }
        }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.boba, 55.0);
        assert_eq!(state.upgrade("spoon").unwrap().owned, 2);
        assert_eq!(state.upgrade("spoon").unwrap().cost, 13.0);
        assert_eq!(state.upgrade("robot").unwrap().cost, 10_000.0);
        assert_eq!(state.mixer_multiplier, 1.0);
        assert_eq!(state.last_milestone, 1.0);
        assert!(state.achievements.is_empty());
        assert_eq!(state.production_rate, 2.0);
    }

    #[test]
    fn wrong_types_fall_back_per_field() {
        let json = r#"{
            "boba": "lots",
            "clickMultiplier": null,
            "mixerMultiplier": 4,
            "machineMultiplier": -2,
            "lastBobaMilestone": 12,
            "achievementsUnlocked": { "first_100": true, "first_1m": "yes" },
            "upgrades": "none"
        }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.boba, 0.0);
        assert_eq!(state.click_multiplier, 1.0);
        assert_eq!(state.mixer_multiplier, 4.0);
        assert_eq!(state.machine_multiplier, 1.0);
        assert_eq!(state.last_milestone, 1.0); // not a power of two
        assert!(state.is_unlocked("first_100"));
        assert!(!state.is_unlocked("first_1m"));
        assert!(state.upgrades.iter().all(|u| u.owned == 0));
    }

    #[test]
    fn malformed_and_unknown_upgrade_entries_ignored() {
        let json = r#"{
            "upgrades": {
                "spoon": 17,
                "teapot": { "owned": 9, "cost": 1 },
                "mixer": { "owned": -1, "cost": "cheap" },
                "robot": { "owned": 2 }
            }
        }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.upgrade("spoon").unwrap().owned, 0);
        assert!(state.upgrade("teapot").is_none());
        let mixer = state.upgrade("mixer").unwrap();
        assert_eq!(mixer.owned, 0);
        assert_eq!(mixer.cost, 100.0);
        let robot = state.upgrade("robot").unwrap();
        assert_eq!(robot.owned, 2);
        assert_eq!(robot.cost, 10_000.0);
        assert_eq!(state.production_rate, 200.0);
    }

    #[test]
    fn one_time_upgrade_owned_is_clamped_and_cost_fixed() {
        let json = r#"{ "upgrades": { "machineBoost": { "owned": 3, "cost": 1 } } }"#;
        let state = load(Some(json), &config());
        let boost = state.upgrade("machineBoost").unwrap();
        assert_eq!(boost.owned, 1);
        assert_eq!(boost.cost, 5_000.0);
    }

    #[test]
    fn negative_or_huge_boba_rejected() {
        let state = load(Some(r#"{ "boba": -5, "upgrades": { "spoon": { "owned": 2 } } }"#), &config());
        assert_eq!(state.boba, 0.0);
        assert_eq!(state.upgrade("spoon").unwrap().owned, 2);

        let json = r#"{
            "boba": 1e999,
            "upgrades": { "spoon": { "owned": 5, "cost": 20 } },
            "mixerMultiplier": 2
        }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.boba, 0.0);
        assert_eq!(state.upgrade("spoon").unwrap().owned, 5);
        assert_eq!(state.upgrade("spoon").unwrap().cost, 20.0);
        assert_eq!(state.mixer_multiplier, 2.0);
        assert_eq!(state.production_rate, 5.0);
    }

    #[test]
    fn out_of_range_number_inside_upgrade_only_costs_that_field() {
        let json = r#"{ "boba": 7, "upgrades": { "spoon": { "owned": 3, "cost": 1e400 } } }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.boba, 7.0);
        let spoon = state.upgrade("spoon").unwrap();
        assert_eq!(spoon.owned, 3);
        assert_eq!(spoon.cost, 10.0);
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let json = r#"{ "boba": 50, "boba": 60, "upgrades": { "spoon": { "owned": 5 } } }"#;
        let state = load(Some(json), &config());
        assert_eq!(state.boba, 60.0);
        assert_eq!(state.upgrade("spoon").unwrap().owned, 5);
    }

    #[test]
    fn array_snapshot_is_not_read_positionally() {
        let json = r#"[500, {}, 8, 1, 1, {"first_1m": true}, 4]"#;
        assert_eq!(load(Some(json), &config()), GameState::new(&config()));
    }

    #[test]
    fn unknown_top_level_fields_ignored() {
        let json = r#"{ "boba": 3, "version": 7, "future": { "x": 1 } }"#;
        assert_eq!(load(Some(json), &config()).boba, 3.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_load_serialize_roundtrip(
            boba in 0.0f64..1e15,
            spoons in 0u32..500,
            robots in 0u32..50,
            boosted in any::<bool>(),
            doublings in 0u32..40,
        ) {
            let config = GameConfig::default();
            let mut state = GameState::new(&config);
            state.boba = boba;
            state.upgrade_mut("spoon").unwrap().owned = spoons;
            state.upgrade_mut("robot").unwrap().owned = robots;
            if boosted {
                state.upgrade_mut("machineBoost").unwrap().owned = 1;
                state.machine_multiplier = 2.0;
            }
            state.last_milestone = 2f64.powi(doublings as i32);
            state.achievements.insert(format!("double_{}", state.last_milestone));
            state.production_rate = recompute_production_rate(&state);

            let json = serialize(&state).unwrap();
            prop_assert_eq!(load(Some(&json), &config), state);
        }

        #[test]
        fn prop_load_never_panics(raw in ".{0,200}") {
            let state = load(Some(&raw), &GameConfig::default());
            prop_assert!(state.boba >= 0.0);
        }
    }
}
