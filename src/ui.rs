pub mod overlay;

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use typespeed::display::{DisplaySink, StatusView};
use typespeed::editor::Scratchpad;

const HORIZONTAL_MARGIN: u16 = 1;
const HINT: &str = "Ctrl-R menu · Esc quit";

/// Status-bar display sink for the terminal host
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    view: StatusView,
    message: Option<String>,
}

impl StatusBar {
    pub fn view(&self) -> StatusView {
        self.view
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

impl DisplaySink for StatusBar {
    fn render(&mut self, view: StatusView) {
        self.view = view;
    }

    fn notify(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }
}

pub fn status_text(view: StatusView) -> String {
    match view.current {
        Some(wpm) => format!("⚡ {} WPM (★ {} WPM)", wpm, view.best),
        None => format!("⚡ -- WPM (★ {} WPM)", view.best),
    }
}

pub fn draw(f: &mut Frame, pad: &Scratchpad, status: &StatusBar) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    draw_scratchpad(f, pad, chunks[0]);
    draw_status(f, status, chunks[1]);
}

fn draw_scratchpad(f: &mut Frame, pad: &Scratchpad, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" scratchpad ")
        .border_style(Style::default().add_modifier(Modifier::DIM));
    let inner = block.inner(area);

    let lines: Vec<&str> = pad.text().split('\n').collect();
    let visible = inner.height.max(1) as usize;
    let skip = lines.len().saturating_sub(visible);
    let shown: Vec<Line> = lines[skip..]
        .iter()
        .map(|line| Line::from(line.to_string()))
        .collect();

    f.render_widget(Paragraph::new(shown).block(block), area);

    // Cursor sits after the last character of the last visible line.
    if let Some(last) = lines.last() {
        let row = (lines.len() - skip - 1) as u16;
        let col = (last.width() as u16).min(inner.width.saturating_sub(1));
        f.set_cursor_position(Position::new(inner.x + col, inner.y + row));
    }
}

fn draw_status(f: &mut Frame, status: &StatusBar, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled(
        status_text(status.view()),
        bold.fg(Color::Yellow),
    )];

    match status.message() {
        Some(message) => {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.to_string(), Style::default().fg(Color::Green)));
        }
        None => {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                HINT,
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ));
        }
    }

    let bar = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    let padded = Rect {
        x: area.x + HORIZONTAL_MARGIN,
        width: area.width.saturating_sub(HORIZONTAL_MARGIN * 2),
        ..area
    };
    f.render_widget(bar, padded);
}
