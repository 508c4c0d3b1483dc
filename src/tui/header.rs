use crate::app::AppState;
use crate::tui::spinner;
use crate::view::ViewMode;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled(
            format!(" ghaw v{} ", state.config.version_string),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            state.repo.as_deref().unwrap_or("no repository"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ];

    if state.mode == ViewMode::Detail {
        if let Some(number) = state.detail_run_number() {
            spans.push(Span::styled(
                format!(" › #{number}"),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    // First fetch spinner, otherwise the refresh countdown
    if state.is_loading() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            spinner::frame(state.spinner_frame).to_string(),
            Style::default().fg(Color::Yellow),
        ));
    } else if state.mode != ViewMode::RepoInput {
        spans.push(Span::styled(
            format!("  refresh in {}s", state.countdown.remaining()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
