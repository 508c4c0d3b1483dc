use crate::app::{fit, AppState};
use crate::status::BADGE_WIDTH;
use crate::viewport::{self, DisplayLine, LineKind};
use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    if state.detail_lines.is_empty() {
        let msg = if state.detail.is_loading() {
            "Loading run details..."
        } else {
            "No details available"
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let now = Utc::now();
    let window = viewport::visible_window(
        &state.detail_lines,
        state.selection.detail_scroll,
        usize::from(area.height),
    );
    let lines: Vec<Line> = window.iter().map(|l| paint(l, now)).collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn paint(line: &DisplayLine, now: DateTime<Utc>) -> Line<'static> {
    let mut spans = Vec::new();
    if line.indent > 0 {
        spans.push(Span::raw(" ".repeat(line.indent)));
    }
    if let Some(badge) = line.badge {
        spans.push(Span::styled(
            format!("{} ", fit(badge.label(), BADGE_WIDTH)),
            Style::default().fg(badge.color()),
        ));
    }
    let text_style = match line.kind {
        LineKind::Title | LineKind::Job => Style::default().add_modifier(Modifier::BOLD),
        LineKind::Meta | LineKind::Separator => Style::default().fg(Color::DarkGray),
        LineKind::Spacer | LineKind::Step => Style::default(),
    };
    spans.push(Span::styled(line.text.clone(), text_style));
    if let Some(duration) = line.duration(now) {
        spans.push(Span::styled(
            format!(" ({duration})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
