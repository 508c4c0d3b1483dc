use crate::app::AppState;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let input = &state.repo_input;
    let welcome = state.repo.is_none();

    let mut lines = Vec::new();
    if welcome {
        lines.push(Line::from(Span::styled(
            "Welcome! Which repository should be watched?",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if let Some(notice) = &input.notice {
            lines.push(Line::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Switch repository",
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Repository (owner/name): ", Style::default().fg(Color::Cyan)),
        Span::raw(input.buffer.as_str()),
        Span::styled("█", Style::default().fg(Color::Cyan)),
    ]));
    if let Some(hint) = &input.rejected {
        lines.push(Line::from(Span::styled(
            hint.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    if welcome {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Esc quits",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let [_, middle, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(lines.len() as u16 + 2),
        Constraint::Min(0),
    ])
    .areas(area);

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(panel, middle);
}
