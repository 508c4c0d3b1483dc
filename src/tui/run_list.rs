use crate::app::{compute_duration, fit, relative_time, AppState, RunStatus, WorkflowRun};
use crate::status::{self, BADGE_WIDTH};
use crate::viewport::{self, ListColumns};
use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let runs = state.run_list();

    if runs.is_empty() {
        let msg = if state.runs.is_loading() {
            "Loading workflow runs..."
        } else {
            "No workflow runs found"
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let cols = ListColumns::for_width(area.width);
    let height = usize::from(area.height);
    let start = viewport::list_window_start(state.selection.index, runs.len(), height);
    let now = Utc::now();

    let lines: Vec<Line> = runs
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, run)| run_row(run, cols, i == state.selection.index, now))
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// Elapsed time for running runs, age since creation otherwise.
fn time_label(run: &WorkflowRun, now: DateTime<Utc>) -> String {
    if run.status == RunStatus::InProgress {
        compute_duration(run.created_at, None, now)
    } else {
        relative_time(run.created_at, now)
    }
}

fn run_row(
    run: &WorkflowRun,
    cols: ListColumns,
    selected: bool,
    now: DateTime<Utc>,
) -> Line<'static> {
    let badge = status::classify(run.status, run.conclusion);
    let base = if selected {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(if selected { "> " } else { "  " }, base.fg(Color::Cyan)),
        Span::styled(
            format!("{}  ", fit(badge.label(), BADGE_WIDTH)),
            base.fg(badge.color()),
        ),
    ];
    if cols.show_workflow {
        spans.push(Span::styled(
            format!("{} ", fit(run.workflow_label(), ListColumns::WORKFLOW_WIDTH)),
            base.fg(Color::Blue),
        ));
    }
    if cols.show_branch {
        spans.push(Span::styled(
            format!("{} ", fit(&run.head_branch, ListColumns::BRANCH_WIDTH)),
            base.fg(Color::Magenta),
        ));
    }
    spans.push(Span::styled(fit(&run.display_title, cols.title_width), base));
    if cols.show_time {
        spans.push(Span::styled(
            format!(
                " {:>width$}",
                time_label(run, now),
                width = ListColumns::TIME_WIDTH
            ),
            base.fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
