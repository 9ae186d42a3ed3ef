//! Boba Shop rendering: counter, toasts, store, badges, log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::achievements::describe;
use super::actions::{self, BUY_UPGRADE_BASE};
use super::logic::{click_yield, format_number};
use super::state::{Multiplier, UpgradeEffect, UpgradeRecord};
use super::BobaGame;

const BORDER: Color = Color::Rgb(200, 140, 90);

pub fn render(game: &BobaGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    // 80 桁以上ならログを右に出す
    let (main_area, log_area) = if area.width >= 80 {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (h[0], Some(h[1]))
    } else {
        (area, None)
    };

    let toast_height = if game.toasts.is_empty() {
        0
    } else {
        game.toasts.len() as u16 + 3
    };
    let footer_height = if game.confirm_reset { 3 } else { 2 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(toast_height),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(footer_height),
        ])
        .split(main_area);

    render_counter(game, f, chunks[0], click_state);
    if toast_height > 0 {
        render_toasts(game, f, chunks[1], click_state);
    }
    render_store(game, f, chunks[2], click_state);
    render_badges(game, f, chunks[3]);
    render_footer(game, f, chunks[4], click_state);

    if let Some(log_area) = log_area {
        render_log(game, f, log_area);
    }
}

fn render_counter(game: &BobaGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = game.engine.state();
    let mut cl = ClickableList::new();

    cl.push(Line::from(vec![
        Span::raw(" 🧋 "),
        Span::styled(
            format_number(state.boba.floor()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" boba"),
    ]));
    cl.push(Line::from(Span::styled(
        format!("    {} per second", format_number(state.production_rate)),
        Style::default().fg(Color::Gray),
    )));
    let sip = format!(" ▶ [C] Sip (+{})", format_number(click_yield(state)));
    cl.push_clickable(
        Line::from(Span::styled(sip, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        actions::SIP,
    );

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(" Boba Shop "),
    );
    f.render_widget(widget, area);
}

fn render_toasts(game: &BobaGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    for toast in &game.toasts {
        let e = &toast.event;
        cl.push(Line::from(vec![
            Span::raw(format!(" {} ", e.icon)),
            Span::styled(e.title.clone(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", e.description), Style::default().fg(Color::Gray)),
        ]));
    }
    cl.push_clickable(
        Line::from(Span::styled(" [X] dismiss", Style::default().fg(Color::DarkGray))),
        actions::DISMISS_TOAST,
    );

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Achievement! "),
    );
    f.render_widget(widget, area);
}

fn effect_text(effect: &UpgradeEffect) -> String {
    let name = |m: Multiplier| match m {
        Multiplier::Click => "clicks",
        Multiplier::Mixer => "mixers",
        Multiplier::Machine => "machines",
    };
    match effect {
        UpgradeEffect::Production { rate, .. } => format!("+{}/s", format_number(*rate)),
        UpgradeEffect::ClickBonus => "+1 per sip".into(),
        UpgradeEffect::DoubleMultiplier { target } => format!("x2 {}", name(*target)),
    }
}

fn store_line(index: usize, upgrade: &UpgradeRecord, affordable: bool, narrow: bool) -> Line<'static> {
    let key = match actions::upgrade_key(index) {
        Some(k) => format!(" [{}] ", k),
        None => "     ".into(),
    };

    if upgrade.is_sold_out() {
        let style = Style::default().fg(Color::DarkGray);
        return Line::from(vec![
            Span::styled(key, style),
            Span::styled(upgrade.name.clone(), style),
            Span::styled("  ✔ owned", Style::default().fg(Color::Green)),
        ]);
    }

    let (name_style, cost_style) = if affordable {
        (
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Green),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::Red))
    };

    let mut spans = vec![
        Span::styled(key, name_style),
        Span::styled(format!("{:<20}", upgrade.name), name_style),
        Span::styled(format!("{:>8}", format_number(upgrade.cost)), cost_style),
    ];
    if upgrade.is_repeatable() {
        spans.push(Span::styled(
            format!("  x{}", upgrade.owned),
            Style::default().fg(Color::Cyan),
        ));
    }
    if !narrow {
        spans.push(Span::styled(
            format!("  {}", effect_text(&upgrade.effect)),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn render_store(game: &BobaGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let narrow = is_narrow_layout(area.width);
    let mut cl = ClickableList::new();
    for (i, upgrade) in game.engine.state().upgrades.iter().enumerate() {
        let line = store_line(i, upgrade, game.engine.can_afford(&upgrade.id), narrow);
        cl.push_clickable(line, BUY_UPGRADE_BASE + i as u16);
    }

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(" Store "),
    );
    f.render_widget(widget, area);
}

fn render_badges(game: &BobaGame, f: &mut Frame, area: Rect) {
    let state = game.engine.state();
    let catalog = &game.engine.config().achievements;

    let line = if state.achievements.is_empty() {
        Line::from(Span::styled(" none yet", Style::default().fg(Color::DarkGray)))
    } else {
        let mut spans = vec![Span::raw(" ")];
        spans.extend(
            state
                .achievements
                .iter()
                .filter_map(|id| describe(id, catalog))
                .map(|e| Span::raw(format!("{} ", e.icon))),
        );
        Line::from(spans)
    };

    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Badges ({}) ", state.achievements.len())),
    );
    f.render_widget(widget, area);
}

fn render_footer(game: &BobaGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    if game.confirm_reset {
        let warn = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        cl.push_clickable(Line::from(Span::styled(" [Y] Yes, erase everything", warn)), actions::RESET_CONFIRM);
        cl.push_clickable(Line::from(" [N] Keep playing"), actions::RESET_CANCEL);
    } else {
        cl.push_clickable(
            Line::from(Span::styled(" [R] Reset game", Style::default().fg(Color::DarkGray))),
            actions::RESET_REQUEST,
        );
    }

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 0);
    let widget = Paragraph::new(cl.into_lines())
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(widget, area);
}

fn render_log(game: &BobaGame, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = game
        .log
        .iter()
        .rev()
        .take(visible_height)
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!(" {}", entry.text), style))
        })
        .collect();
    lines.reverse();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
