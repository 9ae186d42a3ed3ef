//! Semantic action IDs for Boba Shop click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.
//! Keyboard shortcuts map onto the same IDs.

pub const SIP: u16 = 0;
pub const DISMISS_TOAST: u16 = 1;

// ── Reset flow ──────────────────────────────────────────────────
pub const RESET_REQUEST: u16 = 10;
pub const RESET_CONFIRM: u16 = 11;
pub const RESET_CANCEL: u16 = 12;

// ── Store purchase (base + upgrade index) ───────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

/// Upgrades beyond this index are click-only.
pub const MAX_KEYED_UPGRADES: usize = 9;

/// Keyboard shortcut → action ID.
pub fn key_action(key: char) -> Option<u16> {
    match key {
        'c' | ' ' => Some(SIP),
        'x' => Some(DISMISS_TOAST),
        'R' => Some(RESET_REQUEST),
        'y' => Some(RESET_CONFIRM),
        'n' => Some(RESET_CANCEL),
        '1'..='9' => Some(BUY_UPGRADE_BASE + (key as u16 - '1' as u16)),
        _ => None,
    }
}

/// The shortcut shown next to store row `index`, if it has one.
pub fn upgrade_key(index: usize) -> Option<char> {
    if index < MAX_KEYED_UPGRADES {
        char::from_digit(index as u32 + 1, 10)
    } else {
        None
    }
}
