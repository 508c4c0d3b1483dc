use crate::cli::validate_repo_format;
use crate::traits::FetchGateway;
use crate::tui::spinner;
use color_eyre::eyre::{eyre, Result};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::future::Future;
use std::time::Duration;

enum PhaseStatus {
    InProgress,
    Done,
    Failed(String),
}

struct StartupPhase {
    label: &'static str,
    detail: Option<String>,
    status: PhaseStatus,
}

/// Outcome of the startup checks. A failed detection is not fatal: the dashboard
/// opens on the repository prompt and shows `detection_error`.
pub struct StartupResult {
    pub repo: Option<String>,
    pub detection_error: Option<String>,
}

fn render_startup<B: Backend>(terminal: &mut Terminal<B>, phases: &[StartupPhase], frame: usize) {
    let drawn = terminal.draw(|f| {
        let area = f.area();
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(phases.len() as u16),
            Constraint::Min(0),
        ])
        .split(area);

        let lines: Vec<Line> = phases
            .iter()
            .map(|phase| {
                let (icon, icon_style) = match &phase.status {
                    PhaseStatus::InProgress => (
                        spinner::frame(frame).to_string(),
                        Style::default().fg(Color::Yellow),
                    ),
                    PhaseStatus::Done => ("\u{2713}".to_string(), Style::default().fg(Color::Green)),
                    PhaseStatus::Failed(_) => {
                        ("\u{2717}".to_string(), Style::default().fg(Color::Red))
                    }
                };

                let mut spans = vec![
                    Span::styled(format!("  {icon} "), icon_style),
                    Span::styled(phase.label, Style::default().fg(Color::White)),
                ];
                if let Some(detail) = &phase.detail {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(detail.as_str(), Style::default().fg(Color::DarkGray)));
                }
                if let PhaseStatus::Failed(msg) = &phase.status {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Red)));
                }
                Line::from(spans)
            })
            .collect();

        f.render_widget(Paragraph::new(lines), vertical[1]);
    });
    if drawn.is_err() {
        tracing::warn!("Failed to draw startup screen");
    }
}

/// Run one phase with an animated spinner until `fut` resolves.
async fn run_phase<B, F, T>(
    terminal: &mut Terminal<B>,
    phases: &mut Vec<StartupPhase>,
    label: &'static str,
    fut: F,
) -> Result<T>
where
    B: Backend,
    F: Future<Output = Result<T>>,
{
    phases.push(StartupPhase {
        label,
        detail: None,
        status: PhaseStatus::InProgress,
    });
    render_startup(terminal, phases, 0);

    let mut ticker = tokio::time::interval(Duration::from_millis(80));
    let mut frame = 0usize;
    tokio::pin!(fut);

    loop {
        tokio::select! {
            result = &mut fut => {
                if let Some(phase) = phases.last_mut() {
                    phase.status = match &result {
                        Ok(_) => PhaseStatus::Done,
                        Err(e) => PhaseStatus::Failed(e.to_string()),
                    };
                }
                render_startup(terminal, phases, frame);
                return result;
            }
            _ = ticker.tick() => {
                frame += 1;
                render_startup(terminal, phases, frame);
            }
        }
    }
}

/// Checks that `gh` is installed (fatal) and resolves the repository to watch.
pub async fn run_startup<B: Backend>(
    terminal: &mut Terminal<B>,
    gateway: &dyn FetchGateway,
    repo_flag: Option<&str>,
) -> Result<StartupResult> {
    let mut phases: Vec<StartupPhase> = Vec::new();

    run_phase(terminal, &mut phases, "Checking GitHub CLI", gateway.check_available()).await?;

    if let Some(repo) = repo_flag {
        let repo = repo.trim();
        let status = match validate_repo_format(repo) {
            Ok(()) => PhaseStatus::Done,
            Err(msg) => PhaseStatus::Failed(msg),
        };
        let invalid = matches!(status, PhaseStatus::Failed(_));
        phases.push(StartupPhase {
            label: "Using repository",
            detail: Some(repo.to_string()),
            status,
        });
        render_startup(terminal, &phases, 0);
        if invalid {
            return Err(eyre!("Invalid --repo value '{repo}'. Expected 'owner/name'."));
        }
        return Ok(StartupResult {
            repo: Some(repo.to_string()),
            detection_error: None,
        });
    }

    match run_phase(terminal, &mut phases, "Detecting repository", gateway.detect_repository()).await {
        Ok(repo) => {
            if let Some(phase) = phases.last_mut() {
                phase.detail = Some(repo.clone());
            }
            render_startup(terminal, &phases, 0);
            tracing::info!(%repo, "Repository detected");
            Ok(StartupResult {
                repo: Some(repo),
                detection_error: None,
            })
        }
        Err(e) => {
            tracing::info!("Repository detection failed: {e}");
            Ok(StartupResult {
                repo: None,
                detection_error: Some(e.to_string()),
            })
        }
    }
}
