//! View state machine: list, detail and repository prompt.
//!
//! Key actions mutate [`AppState`] and return the [`Command`]s the poll loops must
//! carry out. Only one loop runs at a time: the list loop in list mode, the detail
//! loop in detail mode, and neither while the prompt is open. Stopped list data is
//! retained so returning to the list does not flash a loading state.

use crate::app::AppState;
use crate::cli::validate_repo_format;
use crate::input::Action;
use crate::poller::Ticket;
use crate::viewport;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Detail,
    RepoInput,
}

/// Cursor position in the list plus the detail view's scroll offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// Run shown in detail mode; `None` in list mode.
    pub run_id: Option<u64>,
    pub detail_scroll: usize,
}

impl Selection {
    pub fn move_up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }
}

/// Text buffer for the repository prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInput {
    pub buffer: String,
    /// Validation hint from the last rejected confirm.
    pub rejected: Option<String>,
    /// Why auto-detection failed; shown on the welcome prompt.
    pub notice: Option<String>,
}

/// Work for the poll loops, produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PollRuns { repo: String, ticket: Ticket },
    PollDetail { repo: String, run_id: u64, ticket: Ticket },
    StopRuns,
    StopDetail,
    RefreshRuns,
    RefreshDetail,
    OpenUrl(String),
    Quit,
}

impl AppState {
    /// Initial transition once startup has resolved (or failed to resolve) a repository.
    pub fn start(&mut self, now: Instant) -> Vec<Command> {
        match self.repo.clone() {
            Some(repo) => self.resume_list(repo, now),
            None => {
                self.mode = ViewMode::RepoInput;
                self.repo_input.buffer.clear();
                self.repo_input.rejected = None;
                Vec::new()
            }
        }
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Vec<Command> {
        if action == Action::Quit {
            self.should_quit = true;
            return vec![Command::Quit];
        }
        match self.mode {
            ViewMode::List => self.on_list(action, now),
            ViewMode::Detail => self.on_detail(action, now),
            ViewMode::RepoInput => self.on_repo_input(action, now),
        }
    }

    fn on_list(&mut self, action: Action, now: Instant) -> Vec<Command> {
        match action {
            Action::MoveUp => {
                self.selection.move_up();
                Vec::new()
            }
            Action::MoveDown => {
                let len = self.run_list().len();
                self.selection.move_down(len);
                Vec::new()
            }
            Action::Select => self.enter_detail(now),
            Action::Refresh => {
                self.countdown.reset(now);
                vec![Command::RefreshRuns]
            }
            Action::OpenBrowser => self
                .selected_run()
                .map(|run| vec![Command::OpenUrl(run.url.clone())])
                .unwrap_or_default(),
            Action::SwitchRepo => {
                self.mode = ViewMode::RepoInput;
                self.repo_input = RepoInput {
                    buffer: self.repo.clone().unwrap_or_default(),
                    ..RepoInput::default()
                };
                vec![Command::StopRuns]
            }
            _ => Vec::new(),
        }
    }

    fn on_detail(&mut self, action: Action, now: Instant) -> Vec<Command> {
        match action {
            Action::MoveUp => {
                self.selection.detail_scroll = self.selection.detail_scroll.saturating_sub(1);
                Vec::new()
            }
            Action::MoveDown => {
                self.selection.detail_scroll = viewport::clamp_scroll(
                    self.selection.detail_scroll + 1,
                    self.detail_lines.len(),
                );
                Vec::new()
            }
            Action::Back => self.back_to_list(now),
            Action::Refresh => {
                self.countdown.reset(now);
                vec![Command::RefreshDetail]
            }
            Action::OpenBrowser => {
                let url = self
                    .detail
                    .value()
                    .map(|d| d.run.url.clone())
                    .or_else(|| self.selected_run().map(|r| r.url.clone()));
                url.map(|u| vec![Command::OpenUrl(u)]).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    fn on_repo_input(&mut self, action: Action, now: Instant) -> Vec<Command> {
        match action {
            Action::InsertChar(c) => {
                self.repo_input.buffer.push(c);
                self.repo_input.rejected = None;
                Vec::new()
            }
            Action::DeleteChar => {
                self.repo_input.buffer.pop();
                self.repo_input.rejected = None;
                Vec::new()
            }
            Action::Confirm => self.confirm_repo(now),
            Action::Cancel => match self.repo.clone() {
                Some(repo) => self.resume_list(repo, now),
                None => {
                    self.should_quit = true;
                    vec![Command::Quit]
                }
            },
            _ => Vec::new(),
        }
    }

    fn enter_detail(&mut self, now: Instant) -> Vec<Command> {
        let (Some(repo), Some(run_id)) = (self.repo.clone(), self.selected_run().map(|r| r.database_id))
        else {
            return Vec::new();
        };
        self.selection.run_id = Some(run_id);
        self.selection.detail_scroll = 0;
        self.detail_lines.clear();
        self.detail.reset();
        let ticket = self.detail.begin(run_id);
        self.countdown.reset(now);
        self.mode = ViewMode::Detail;
        vec![
            Command::StopRuns,
            Command::PollDetail {
                repo,
                run_id,
                ticket,
            },
        ]
    }

    fn back_to_list(&mut self, now: Instant) -> Vec<Command> {
        self.selection.run_id = None;
        self.selection.detail_scroll = 0;
        self.detail_lines.clear();
        self.detail.reset();
        let mut commands = vec![Command::StopDetail];
        if let Some(repo) = self.repo.clone() {
            commands.extend(self.resume_list(repo, now));
        } else {
            self.mode = ViewMode::List;
        }
        commands
    }

    fn confirm_repo(&mut self, now: Instant) -> Vec<Command> {
        let candidate = self.repo_input.buffer.trim().to_string();
        if let Err(hint) = validate_repo_format(&candidate) {
            self.repo_input.rejected = Some(hint);
            return Vec::new();
        }
        if self.repo.as_deref() != Some(candidate.as_str()) {
            self.runs.reset();
            self.selection = Selection::default();
        }
        self.repo = Some(candidate.clone());
        self.resume_list(candidate, now)
    }

    /// Enter list mode and (re)start the list loop. Same repository keeps its data.
    fn resume_list(&mut self, repo: String, now: Instant) -> Vec<Command> {
        self.mode = ViewMode::List;
        self.repo_input = RepoInput::default();
        let ticket = self.runs.begin(repo.clone());
        self.countdown.reset(now);
        vec![Command::PollRuns { repo, ticket }]
    }
}
