use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, NARROW_WIDTH_THRESHOLD};
use crate::view::ViewMode;

fn hints(mode: ViewMode, narrow: bool) -> &'static [(&'static str, &'static str)] {
    match (mode, narrow) {
        (ViewMode::List, false) => &[
            ("↑↓/jk", "navigate"),
            ("Enter", "details"),
            ("o", "open"),
            ("s", "switch repo"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        (ViewMode::List, true) => &[
            ("j/k", "nav"),
            ("⏎", "view"),
            ("s", "repo"),
            ("r", "ref"),
            ("q", "quit"),
        ],
        (ViewMode::Detail, false) => &[
            ("↑↓/jk", "scroll"),
            ("Esc", "back"),
            ("o", "open"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        (ViewMode::Detail, true) => &[("j/k", "scroll"), ("Esc", "back"), ("q", "quit")],
        (ViewMode::RepoInput, _) => &[("Enter", "confirm"), ("Esc", "cancel")],
    }
}

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < NARROW_WIDTH_THRESHOLD;

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints(state.mode, narrow).iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !narrow && state.mode != ViewMode::RepoInput {
        spans.push(Span::styled(
            format!("  auto-refresh: {}s", state.countdown.interval().as_secs()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_hints_are_shorter() {
        for mode in [ViewMode::List, ViewMode::Detail] {
            assert!(hints(mode, true).len() < hints(mode, false).len());
        }
    }

    #[test]
    fn every_mode_offers_an_exit() {
        for mode in [ViewMode::List, ViewMode::Detail, ViewMode::RepoInput] {
            assert!(hints(mode, false)
                .iter()
                .any(|(_, desc)| *desc == "quit" || *desc == "cancel"));
        }
    }
}
