/// Boba Shop — an incremental boba clicker.

pub mod achievements;
pub mod actions;
pub mod engine;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;
pub mod storage;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent};

use achievements::AchievementEvent;
use engine::BobaEngine;
use logic::{format_number, PurchaseError};

/// How many scheduler firings an achievement toast stays up.
pub const TOAST_TICKS: u32 = 5;
/// Toasts beyond this are dropped oldest-first (they remain in the log).
const MAX_TOASTS: usize = 3;
const MAX_LOG: usize = 50;

/// Log entry for the Boba game.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub event: AchievementEvent,
    pub ticks_left: u32,
}

pub struct BobaGame {
    pub engine: BobaEngine,
    pub log: Vec<LogEntry>,
    /// Oldest first.
    pub toasts: VecDeque<Toast>,
    /// Waiting for the player to confirm a reset.
    pub confirm_reset: bool,
}

impl BobaGame {
    pub fn new(engine: BobaEngine) -> Self {
        let mut game = Self {
            engine,
            log: Vec::new(),
            toasts: VecDeque::new(),
            confirm_reset: false,
        };
        let boba = game.engine.state().boba;
        if boba > 0.0 {
            game.add_log(&format!("Welcome back! {} boba waiting.", format_number(boba.floor())), true);
        } else {
            game.add_log("Welcome to the Boba Shop!", true);
        }
        game
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    fn announce(&mut self, events: Vec<AchievementEvent>) {
        for event in events {
            self.add_log(
                &format!("🏆 {} {}: {}", event.icon, event.title, event.description),
                true,
            );
            self.toasts.push_back(Toast {
                event,
                ticks_left: TOAST_TICKS,
            });
            if self.toasts.len() > MAX_TOASTS {
                self.toasts.pop_front();
            }
        }
    }

    fn sip(&mut self) {
        let events = self.engine.click();
        self.announce(events);
    }

    fn buy(&mut self, index: usize) {
        let Some(upgrade) = self.engine.state().upgrades.get(index) else {
            return;
        };
        let id = upgrade.id.clone();
        let name = upgrade.name.clone();

        match self.engine.purchase(&id) {
            Ok(events) => {
                let owned = self.engine.state().owned(&id);
                if self.engine.state().upgrade(&id).map(|u| u.is_repeatable()).unwrap_or(false) {
                    self.add_log(&format!("Bought {}! ({} owned)", name, owned), false);
                } else {
                    self.add_log(&format!("✦ {} unlocked!", name), true);
                }
                self.announce(events);
            }
            Err(PurchaseError::InsufficientFunds { shortfall, .. }) => {
                self.add_log(&format!("Need {} more boba!", format_number(shortfall)), false);
            }
            Err(PurchaseError::AlreadyOwned { .. }) => {
                self.add_log(&format!("{} is already yours.", name), false);
            }
            Err(e @ PurchaseError::UnknownUpgrade { .. }) => {
                self.add_log(&e.to_string(), false);
            }
        }
    }

    fn dispatch(&mut self, action: u16) -> bool {
        if self.confirm_reset {
            self.confirm_reset = false;
            if action == actions::RESET_CONFIRM {
                self.engine.reset();
                self.toasts.clear();
                self.log.clear();
                self.add_log("Fresh start. Welcome to the Boba Shop!", true);
            } else {
                self.add_log("Reset cancelled.", false);
            }
            return true;
        }

        match action {
            actions::SIP => self.sip(),
            actions::DISMISS_TOAST => {
                self.toasts.pop_front();
            }
            actions::RESET_REQUEST => {
                self.confirm_reset = true;
                self.add_log("Reset all progress? Press Y to confirm.", true);
            }
            a if a >= actions::BUY_UPGRADE_BASE => {
                self.buy((a - actions::BUY_UPGRADE_BASE) as usize);
            }
            _ => return false,
        }
        true
    }
}

impl Game for BobaGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let action = match event {
            InputEvent::Key(c) => match actions::key_action(*c) {
                Some(a) => a,
                None => return false,
            },
            InputEvent::Click(id) => *id,
        };
        self.dispatch(action)
    }

    fn tick(&mut self, delta_ticks: u32) {
        for _ in 0..delta_ticks {
            let events = self.engine.tick();
            for toast in &mut self.toasts {
                toast.ticks_left = toast.ticks_left.saturating_sub(1);
            }
            self.toasts.retain(|t| t.ticks_left > 0);
            self.announce(events);
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
