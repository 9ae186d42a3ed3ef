//! Boba Shop game logic — pure functions over `GameState`, fully testable.
//!
//! Side effects that belong to a whole action (achievement evaluation and
//! persistence) are sequenced by `engine::BobaEngine`, not here.

use thiserror::Error;

use super::state::{GameState, UpgradeEffect};

/// Why a purchase was refused. The state is untouched in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    #[error("no upgrade named '{id}'")]
    UnknownUpgrade { id: String },
    #[error("'{id}' is a one-time upgrade and is already owned")]
    AlreadyOwned { id: String },
    #[error("need {shortfall} more boba for '{id}'")]
    InsufficientFunds { id: String, shortfall: f64 },
}

/// Boba earned by one manual click: `(1 + click bonuses owned) × click multiplier`.
pub fn click_yield(state: &GameState) -> f64 {
    let bonus: u32 = state
        .upgrades
        .iter()
        .filter(|u| u.effect == UpgradeEffect::ClickBonus)
        .map(|u| u.owned)
        .sum();
    (1.0 + bonus as f64) * state.click_multiplier
}

/// Manual click. Returns the amount added.
pub fn click(state: &mut GameState) -> f64 {
    let amount = click_yield(state);
    state.boba += amount;
    amount
}

/// One passive accrual step. Returns false (and changes nothing) when
/// there is no production.
pub fn tick(state: &mut GameState) -> bool {
    if state.production_rate <= 0.0 {
        return false;
    }
    state.boba += state.production_rate;
    true
}

/// Sum of `owned × base rate × scaling multiplier` over production upgrades.
pub fn recompute_production_rate(state: &GameState) -> f64 {
    state
        .upgrades
        .iter()
        .map(|u| match u.effect {
            UpgradeEffect::Production { rate, scaled_by } => {
                let scale = scaled_by.map(|m| state.multiplier(m)).unwrap_or(1.0);
                u.owned as f64 * rate * scale
            }
            _ => 0.0,
        })
        .sum()
}

/// Buy one unit of upgrade `id`.
///
/// Checks run in order: unknown id, one-time already owned, insufficient
/// funds. On success the cost is deducted, the effect applied, a repeatable
/// upgrade's cost grows by `cost_growth` (floored), and the production rate
/// is recomputed.
pub fn purchase(state: &mut GameState, id: &str, cost_growth: f64) -> Result<(), PurchaseError> {
    let idx = state
        .upgrades
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| PurchaseError::UnknownUpgrade { id: id.to_string() })?;

    let upgrade = &state.upgrades[idx];
    if upgrade.is_sold_out() {
        return Err(PurchaseError::AlreadyOwned { id: id.to_string() });
    }
    if state.boba < upgrade.cost {
        return Err(PurchaseError::InsufficientFunds {
            id: id.to_string(),
            shortfall: upgrade.cost - state.boba,
        });
    }

    let cost = upgrade.cost;
    let effect = upgrade.effect.clone();

    state.boba -= cost;
    state.upgrades[idx].owned += 1;
    apply_effect(state, &effect);
    if effect.is_repeatable() {
        state.upgrades[idx].cost = (cost * cost_growth).floor();
    }
    state.production_rate = recompute_production_rate(state);
    Ok(())
}

fn apply_effect(state: &mut GameState, effect: &UpgradeEffect) {
    match effect {
        // Both read `owned` directly.
        UpgradeEffect::Production { .. } | UpgradeEffect::ClickBonus => {}
        UpgradeEffect::DoubleMultiplier { target } => {
            *state.multiplier_mut(*target) *= 2.0;
        }
    }
}

/// True if `id` exists, is not sold out, and is within budget.
pub fn can_afford(state: &GameState, id: &str) -> bool {
    state
        .upgrade(id)
        .map(|u| !u.is_sold_out() && state.boba >= u.cost)
        .unwrap_or(false)
}

/// Format a number with commas (e.g. 1234567 → "1,234,567").
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return if n.is_nan() { "NaN".into() } else { "∞".into() };
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    // Round to tenths first so 1.96 becomes "2", not "1".
    let total_tenths = (n * 10.0).round();
    let int_part = (total_tenths / 10.0).floor();
    let tenths = (total_tenths - int_part * 10.0) as u8;

    let digits = format!("{:.0}", int_part);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if tenths > 0 {
        format!("{}.{}", grouped, tenths)
    } else {
        grouped
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::GameConfig;
    use proptest::prelude::*;

    fn arb_upgrade_id() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("spoon"),
            Just("mixer"),
            Just("machine"),
            Just("robot"),
            Just("clickBoost"),
            Just("mixerBoost"),
            Just("machineBoost"),
        ]
    }

    proptest! {
        #[test]
        fn prop_rate_matches_recompute_after_purchases(
            boba in 0.0f64..1e7,
            ids in prop::collection::vec(arb_upgrade_id(), 0..40),
        ) {
            let mut state = GameState::new(&GameConfig::default());
            state.boba = boba;
            for id in ids {
                let _ = purchase(&mut state, id, 1.15);
                prop_assert_eq!(state.production_rate, recompute_production_rate(&state));
            }
        }

        #[test]
        fn prop_failed_purchase_leaves_state_unchanged(
            boba in 0.0f64..9.99,
        ) {
            let mut state = GameState::new(&GameConfig::default());
            state.boba = boba;
            let before = state.clone();
            prop_assert!(purchase(&mut state, "spoon", 1.15).is_err());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_purchase_deducts_exact_cost(
            extra in 0.0f64..1e6,
            id in arb_upgrade_id(),
        ) {
            let mut state = GameState::new(&GameConfig::default());
            let cost = state.upgrade(id).unwrap().cost;
            state.boba = cost + extra;
            purchase(&mut state, id, 1.15).unwrap();
            prop_assert!((state.boba - extra).abs() < 1e-6);
        }

        #[test]
        fn prop_cost_never_decreases(
            n in 1usize..30,
            id in arb_upgrade_id(),
        ) {
            let mut state = GameState::new(&GameConfig::default());
            state.boba = 1e300;
            let mut last = state.upgrade(id).unwrap().cost;
            for _ in 0..n {
                let _ = purchase(&mut state, id, 1.15);
                let cost = state.upgrade(id).unwrap().cost;
                prop_assert!(cost >= last);
                last = cost;
            }
            if !state.upgrade(id).unwrap().is_repeatable() {
                prop_assert_eq!(state.upgrade(id).unwrap().owned, 1);
            }
        }

        #[test]
        fn prop_tick_never_reduces_boba(boba in 0.0f64..1e12, spoons in 0u32..50) {
            let mut state = GameState::new(&GameConfig::default());
            state.boba = boba;
            state.upgrade_mut("spoon").unwrap().owned = spoons;
            state.production_rate = recompute_production_rate(&state);
            tick(&mut state);
            prop_assert!(state.boba >= boba);
        }

        #[test]
        fn prop_format_number_no_panic(n in -1e15f64..1e15) {
            let _ = format_number(n);
        }

        #[test]
        fn prop_format_number_integer_digits(int_val in 0u64..1_000_000_000_000) {
            let s = format_number(int_val as f64);
            prop_assert_eq!(s.replace(',', ""), int_val.to_string());
        }
    }
}
