use crate::app::AppState;
use crate::tui::{footer, header, repo_input, run_detail, run_list};
use crate::view::ViewMode;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub fn render(f: &mut Frame, state: &AppState) {
    let [top, body, bottom] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(2),
    ])
    .areas(f.area());

    header::render(f, top, state);

    // Errors show as a banner above the last-known-good content
    let body = if let Some(err) = state.error_message() {
        let [banner, rest] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(body);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" ! ", Style::default().fg(Color::Black).bg(Color::Red)),
                Span::styled(format!(" {err}"), Style::default().fg(Color::Red)),
            ])),
            banner,
        );
        rest
    } else {
        body
    };

    match state.mode {
        ViewMode::List => run_list::render(f, body, state),
        ViewMode::Detail => run_detail::render(f, body, state),
        ViewMode::RepoInput => repo_input::render(f, body, state),
    }

    footer::render(f, bottom, state);
}
