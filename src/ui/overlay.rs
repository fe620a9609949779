use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::warn;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use typespeed::commands::{MenuAction, MenuItem, Prompter};
use typespeed::editor::Scratchpad;
use typespeed::runtime::{EventSource, Runner, Step, TermEvent, Ticker};

use super::{draw, StatusBar};

/// Modal menu and confirmation dialogs drawn over the scratchpad.
///
/// While a dialog is open the idle deadline is not serviced; the session is
/// scored as of its deadline once the dialog closes.
pub struct TuiPrompter<'a, B: Backend, S: EventSource<TermEvent>, T: Ticker> {
    terminal: &'a mut Terminal<B>,
    runner: &'a Runner<TermEvent, S, T>,
    pad: &'a Scratchpad,
    status: StatusBar,
}

impl<'a, B: Backend, S: EventSource<TermEvent>, T: Ticker> TuiPrompter<'a, B, S, T> {
    pub fn new(
        terminal: &'a mut Terminal<B>,
        runner: &'a Runner<TermEvent, S, T>,
        pad: &'a Scratchpad,
        status: StatusBar,
    ) -> Self {
        Self {
            terminal,
            runner,
            pad,
            status,
        }
    }

    fn redraw(&mut self, overlay: impl Fn(&mut Frame)) -> bool {
        let (pad, status) = (self.pad, &self.status);
        match self.terminal.draw(|f| {
            draw(f, pad, status);
            overlay(f);
        }) {
            Ok(_) => true,
            Err(err) => {
                warn!("failed to draw dialog: {err}");
                false
            }
        }
    }

    fn next_key(&self) -> Option<KeyEvent> {
        loop {
            match self.runner.step(None) {
                Step::Event(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    return Some(key)
                }
                Step::Disconnected => return None,
                _ => {}
            }
        }
    }
}

impl<B: Backend, S: EventSource<TermEvent>, T: Ticker> Prompter for TuiPrompter<'_, B, S, T> {
    fn pick(&mut self, items: &[MenuItem]) -> Option<MenuAction> {
        if items.is_empty() {
            return None;
        }
        let mut selected = 0usize;
        loop {
            if !self.redraw(|f| render_menu(f, items, selected)) {
                return None;
            }
            match self.next_key()?.code {
                KeyCode::Up => selected = selected.saturating_sub(1),
                KeyCode::Down => selected = (selected + 1).min(items.len() - 1),
                KeyCode::Enter => return Some(items[selected].action),
                KeyCode::Esc => return None,
                _ => {}
            }
        }
    }

    fn confirm<'c>(&mut self, message: &str, choices: &[&'c str]) -> Option<&'c str> {
        if choices.is_empty() {
            return None;
        }
        let mut selected = 0usize;
        loop {
            if !self.redraw(|f| render_confirm(f, message, choices, selected)) {
                return None;
            }
            match self.next_key()?.code {
                KeyCode::Left | KeyCode::BackTab => selected = selected.saturating_sub(1),
                KeyCode::Right | KeyCode::Tab => selected = (selected + 1).min(choices.len() - 1),
                KeyCode::Enter => return Some(choices[selected]),
                KeyCode::Esc => return None,
                _ => {}
            }
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..vertical[1]
    }
}

fn highlight(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn render_menu(f: &mut Frame, items: &[MenuItem], selected: usize) {
    let area = centered(f.area(), 50, items.len() as u16 * 2 + 2);
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| {
            [
                Line::from(Span::styled(item.label, highlight(i == selected))),
                Line::from(Span::styled(
                    item.description,
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ]
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Select an option "),
        ),
        area,
    );
}

pub fn render_confirm(f: &mut Frame, message: &str, choices: &[&str], selected: usize) {
    let area = centered(f.area(), 56, 6);
    let mut buttons = Vec::with_capacity(choices.len() * 2);
    for (i, choice) in choices.iter().enumerate() {
        if i > 0 {
            buttons.push(Span::raw("   "));
        }
        buttons.push(Span::styled(format!(" {choice} "), highlight(i == selected)));
    }

    let body = vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(buttons),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Confirm ")),
        area,
    );
}
