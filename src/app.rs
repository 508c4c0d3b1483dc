//! Application data model, formatting helpers, and the state owned by the event loop.

use crate::countdown::Countdown;
use crate::poller::{PollOutcome, PollState, Ticket};
use crate::view::{RepoInput, Selection, ViewMode};
use crate::viewport::{self, DisplayLine};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::{Duration, Instant};

// ── Shared utility functions ──

/// Format a duration in seconds into a human-readable string (e.g. "2m 5s").
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Duration between two timestamps; a missing end means "still running" and uses `now`.
pub fn compute_duration(
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let end = completed_at.unwrap_or(now);
    format_duration(end.signed_duration_since(started_at).num_seconds())
}

/// Coarse age of a timestamp: "42s ago", "5m ago", "3h ago", "2d ago".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(at).num_seconds().max(0);
    if secs < 60 {
        return format!("{secs}s ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Unicode-width-aware truncation with ellipsis.
/// Returns `""` when `max_width` is 0.
pub fn truncate(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(s) <= max_width {
        s.to_string()
    } else {
        let mut result = String::new();
        let mut width = 0;
        for c in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if width + cw + 1 > max_width {
                break;
            }
            result.push(c);
            width += cw;
        }
        result.push('\u{2026}');
        result
    }
}

/// Truncate to `width` columns, then right-pad with spaces so columns line up.
pub fn fit(s: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    let mut out = truncate(s, width);
    let used = UnicodeWidthStr::width(out.as_str());
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

// ── Data model ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    InProgress,
    Queued,
    Requested,
    Waiting,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::Queued | Self::Requested | Self::Waiting | Self::Pending
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    #[serde(other)]
    Unknown,
}

impl Conclusion {
    fn from_wire(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            "skipped" => Self::Skipped,
            "timed_out" => Self::TimedOut,
            "action_required" => Self::ActionRequired,
            "neutral" => Self::Neutral,
            "stale" => Self::Stale,
            _ => Self::Unknown,
        }
    }
}

/// `gh` reports an unfinished conclusion as `null` or `""`; both mean "absent".
fn conclusion_or_none<'de, D>(deserializer: D) -> Result<Option<Conclusion>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.is_empty())
        .map(|s| Conclusion::from_wire(&s)))
}

/// `gh` reports unset step/job timestamps as `0001-01-01T00:00:00Z`.
fn timestamp_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(raw.filter(|t| t.year() > 1))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub database_id: u64,
    pub display_title: String,
    pub name: String,
    #[serde(default)]
    pub workflow_name: String,
    pub head_branch: String,
    pub event: String,
    pub number: u64,
    pub status: RunStatus,
    #[serde(default, deserialize_with = "conclusion_or_none")]
    pub conclusion: Option<Conclusion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

impl WorkflowRun {
    /// Workflow label for display; older `gh` versions omit `workflowName`.
    pub fn workflow_label(&self) -> &str {
        if self.workflow_name.is_empty() {
            &self.name
        } else {
            &self.workflow_name
        }
    }
}

/// A run plus its jobs, as returned by `gh run view --json ...,jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetail {
    #[serde(flatten)]
    pub run: WorkflowRun,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// `None` while GitHub is still provisioning the job.
    #[serde(default)]
    pub database_id: Option<u64>,
    pub name: String,
    pub status: RunStatus,
    #[serde(default, deserialize_with = "conclusion_or_none")]
    pub conclusion: Option<Conclusion>,
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    /// 1-based position within the job.
    pub number: u64,
    pub status: RunStatus,
    #[serde(default, deserialize_with = "conclusion_or_none")]
    pub conclusion: Option<Conclusion>,
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ── Application state ──

/// Must match the length of `FRAMES` in `tui::spinner`.
pub const SPINNER_FRAME_COUNT: usize = 8;
/// Below 60 cols the footer switches to its compact hint set.
pub const NARROW_WIDTH_THRESHOLD: u16 = 60;

/// Immutable configuration set at startup.
pub struct AppConfig {
    pub interval: Duration,
    pub limit: usize,
    pub version_string: String,
}

pub struct AppState {
    pub config: AppConfig,
    /// `None` until detected or entered at the prompt.
    pub repo: Option<String>,

    // View state machine
    pub mode: ViewMode,
    pub selection: Selection,
    pub repo_input: RepoInput,

    // Polled data, keyed by repository and by run id
    pub runs: PollState<String, Vec<WorkflowRun>>,
    pub detail: PollState<u64, RunDetail>,
    /// Rebuilt only when `detail` publishes a changed value.
    pub detail_lines: Vec<DisplayLine>,

    pub countdown: Countdown,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, now: Instant) -> Self {
        let countdown = Countdown::new(config.interval, now);
        Self {
            config,
            repo: None,
            mode: ViewMode::List,
            selection: Selection::default(),
            repo_input: RepoInput::default(),
            runs: PollState::new(),
            detail: PollState::new(),
            detail_lines: Vec::new(),
            countdown,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Last known run list, empty until the first successful fetch.
    pub fn run_list(&self) -> &[WorkflowRun] {
        self.runs.value().map_or(&[], |runs| runs.as_slice())
    }

    pub fn selected_run(&self) -> Option<&WorkflowRun> {
        self.run_list().get(self.selection.index)
    }

    /// True while the active subject has never shown data (first fetch outstanding).
    pub fn is_loading(&self) -> bool {
        match self.mode {
            ViewMode::List => self.runs.is_loading(),
            ViewMode::Detail => self.detail.is_loading(),
            ViewMode::RepoInput => false,
        }
    }

    /// Inline error banner for the current mode.
    pub fn error_message(&self) -> Option<&str> {
        match self.mode {
            ViewMode::List => self.runs.error(),
            ViewMode::Detail => self.detail.error(),
            ViewMode::RepoInput => None,
        }
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    /// Per-frame countdown update; returns the seconds shown.
    pub fn tick(&mut self, now: Instant) -> u64 {
        self.countdown.tick(now)
    }

    /// Restart the countdown when the visible list's loop starts a fetch.
    pub fn runs_fetch_started(&mut self, ticket: Ticket, at: Instant) -> bool {
        let current = self.mode == ViewMode::List && self.runs.is_current(ticket);
        if current {
            self.countdown.reset(at);
        }
        current
    }

    /// Restart the countdown when the visible detail's loop starts a fetch.
    pub fn detail_fetch_started(&mut self, ticket: Ticket, at: Instant) -> bool {
        let current = self.mode == ViewMode::Detail && self.detail.is_current(ticket);
        if current {
            self.countdown.reset(at);
        }
        current
    }

    /// Number of the run shown in detail mode, taken from the detail subject rather
    /// than the list cursor.
    pub fn detail_run_number(&self) -> Option<u64> {
        let run_id = self.selection.run_id?;
        self.detail.value().map(|d| d.run.number).or_else(|| {
            self.run_list()
                .iter()
                .find(|r| r.database_id == run_id)
                .map(|r| r.number)
        })
    }

    /// Feed a list fetch result through the change-detecting cache.
    pub fn apply_runs(&mut self, ticket: Ticket, result: Result<Vec<WorkflowRun>, String>) -> PollOutcome {
        let outcome = self.runs.apply(ticket, result);
        if outcome == PollOutcome::Changed {
            let len = self.run_list().len();
            self.selection.clamp(len);
        }
        outcome
    }

    /// Feed a detail fetch result through the change-detecting cache.
    pub fn apply_detail(&mut self, ticket: Ticket, result: Result<RunDetail, String>) -> PollOutcome {
        let outcome = self.detail.apply(ticket, result);
        if outcome == PollOutcome::Changed {
            self.detail_lines = self
                .detail
                .value()
                .map(|d| viewport::detail_lines(d))
                .unwrap_or_default();
            self.selection.detail_scroll =
                viewport::clamp_scroll(self.selection.detail_scroll, self.detail_lines.len());
        }
        outcome
    }
}
