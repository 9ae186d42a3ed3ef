mod config;
mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tracing::{debug, info, warn};

use config::GameConfig;
use games::boba::engine::BobaEngine;
use games::boba::{storage, BobaGame};
use games::Game;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use time::TickScheduler;

/// Id of the optional `<script type="application/json">` holding a config override.
const CONFIG_ELEMENT_ID: &str = "boba-config";

/// The page's config override, or the built-in defaults.
fn load_config() -> GameConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let Some(text) = text else {
        return GameConfig::default();
    };
    match GameConfig::from_json(&text) {
        Ok(config) => {
            info!(upgrades = config.upgrades.len(), "using page config");
            config
        }
        Err(e) => {
            warn!(error = %e, "invalid page config, using defaults");
            GameConfig::default()
        }
    }
}

/// Milliseconds from a monotonic clock when the page has one.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Query the grid container's bounding rect and convert a pointer position to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;
    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let config = load_config();
    let scheduler = RefCell::new(TickScheduler::new(config.tick_interval_ms, config.max_frame_ms));
    let engine = BobaEngine::new(config, storage::open_default());
    let game: Box<dyn Game> = Box::new(BobaGame::new(engine));
    let game = Rc::new(RefCell::new(game));
    let click_state = Rc::new(RefCell::new(ClickState::new()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed || mouse_event.button != MouseButton::Left {
                return;
            }
            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };
            debug!(?action, "click");
            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    terminal.draw_web(move |f| {
        let ticks = scheduler.borrow_mut().update(now_ms());
        if ticks > 0 {
            game.borrow_mut().tick(ticks);
        }

        let area = f.area();
        {
            let mut cs = click_state.borrow_mut();
            cs.terminal_cols = area.width;
            cs.terminal_rows = area.height;
            cs.clear_targets();
        }
        game.borrow().render(f, area, &click_state);
    });

    Ok(())
}
