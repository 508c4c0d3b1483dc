//! Pure layout helpers: flattening a run detail into display lines, clamping scroll
//! offsets, windowing, and choosing which list columns fit a terminal width.

use crate::app::{compute_duration, RunDetail};
use crate::status::{self, Badge};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Meta,
    Separator,
    Spacer,
    Job,
    Step,
}

/// Start and (optional) end of a timed job or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub started_at: DateTime<Utc>,
    /// `None` while still running; the elapsed time is measured against now.
    pub completed_at: Option<DateTime<Utc>>,
}

/// One row of the detail view. Durations are left as timestamps so a line only
/// changes when the underlying data does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub badge: Option<Badge>,
    pub text: String,
    pub timing: Option<Timing>,
    /// Leading spaces before the badge.
    pub indent: usize,
}

impl DisplayLine {
    fn plain(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            badge: None,
            text: text.into(),
            timing: None,
            indent: 0,
        }
    }

    pub fn duration(&self, now: DateTime<Utc>) -> Option<String> {
        self.timing
            .map(|t| compute_duration(t.started_at, t.completed_at, now))
    }
}

/// Flatten a run into title, meta, separator, then each job followed by its steps.
pub fn detail_lines(detail: &RunDetail) -> Vec<DisplayLine> {
    let run = &detail.run;
    let mut lines = vec![
        DisplayLine {
            badge: Some(status::classify(run.status, run.conclusion)),
            ..DisplayLine::plain(LineKind::Title, run.display_title.as_str())
        },
        DisplayLine::plain(
            LineKind::Meta,
            format!(
                "{} #{} on {} ({})",
                run.workflow_label(),
                run.number,
                run.head_branch,
                run.event
            ),
        ),
        DisplayLine::plain(LineKind::Separator, "---"),
    ];

    for job in &detail.jobs {
        lines.push(DisplayLine::plain(LineKind::Spacer, ""));
        lines.push(DisplayLine {
            badge: Some(status::classify(job.status, job.conclusion)),
            timing: job.started_at.map(|started_at| Timing {
                started_at,
                completed_at: job.completed_at,
            }),
            ..DisplayLine::plain(LineKind::Job, job.name.as_str())
        });
        for step in &job.steps {
            // A step only shows a duration once it has both ends.
            let timing = match (step.started_at, step.completed_at) {
                (Some(started_at), Some(completed_at)) => Some(Timing {
                    started_at,
                    completed_at: Some(completed_at),
                }),
                _ => None,
            };
            lines.push(DisplayLine {
                badge: Some(status::classify(step.status, step.conclusion)),
                timing,
                indent: 2,
                ..DisplayLine::plain(LineKind::Step, step.name.as_str())
            });
        }
    }
    lines
}

/// Largest valid offset still shows at least one line.
pub fn clamp_scroll(offset: usize, line_count: usize) -> usize {
    offset.min(line_count.saturating_sub(1))
}

/// Lines visible at `offset` in a viewport `height` rows tall.
pub fn visible_window<T>(lines: &[T], offset: usize, height: usize) -> &[T] {
    let start = clamp_scroll(offset, lines.len());
    let end = start.saturating_add(height).min(lines.len());
    &lines[start.min(end)..end]
}

/// First row to draw so the selected row stays visible, keeping it at the bottom
/// edge once the list is scrolled.
pub fn list_window_start(selected: usize, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    let selected = selected.min(len - 1);
    if selected < height {
        0
    } else {
        (selected + 1 - height).min(len - height)
    }
}

// ── Responsive list columns ──

/// Widths, in columns, of the optional run-list fields.
const WORKFLOW_WIDTH: usize = 20;
const BRANCH_WIDTH: usize = 18;
const TIME_WIDTH: usize = 8;
/// Cursor gutter plus the badge column.
const FIXED_WIDTH: usize = 2 + status::BADGE_WIDTH + 2;
const MIN_TITLE_WIDTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListColumns {
    pub show_workflow: bool,
    pub show_branch: bool,
    pub show_time: bool,
    pub title_width: usize,
}

impl ListColumns {
    pub const WORKFLOW_WIDTH: usize = WORKFLOW_WIDTH;
    pub const BRANCH_WIDTH: usize = BRANCH_WIDTH;
    pub const TIME_WIDTH: usize = TIME_WIDTH;

    /// Columns drop out as the terminal narrows: time below 70, branch below 55,
    /// workflow below 40. Each shown column also costs a one-space separator.
    pub fn for_width(width: u16) -> Self {
        let width = usize::from(width);
        let show_time = width >= 70;
        let show_branch = width >= 55;
        let show_workflow = width >= 40;

        let mut used = FIXED_WIDTH;
        if show_workflow {
            used += WORKFLOW_WIDTH + 1;
        }
        if show_branch {
            used += BRANCH_WIDTH + 1;
        }
        if show_time {
            used += TIME_WIDTH + 1;
        }
        Self {
            show_workflow,
            show_branch,
            show_time,
            title_width: width.saturating_sub(used).max(MIN_TITLE_WIDTH),
        }
    }
}
