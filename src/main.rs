use ghaw::app::{AppConfig, AppState};
use ghaw::cli::{self, Cli};
use ghaw::events::{AppEvent, EventHandler};
use ghaw::gh::executor::GhGateway;
use ghaw::input::{self, InputContext};
use ghaw::poller::Pollers;
use ghaw::traits::FetchGateway;
use ghaw::tui;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn setup_verbose_logging() -> Result<()> {
    let state_dir = state_dir();
    std::fs::create_dir_all(&state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = state_dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    tracing::info!("ghaw v{} starting with verbose logging", cli::VERSION);
    Ok(())
}

fn state_dir() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        PathBuf::from(state).join("ghaw")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("state").join("ghaw")
    } else {
        PathBuf::from("/tmp/ghaw")
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, SetTitle(""))?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.verbose {
        setup_verbose_logging()?;
    }

    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Failed to disable raw mode during panic: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, SetTitle("")) {
            eprintln!("Failed to leave alternate screen during panic: {e}");
        }
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let gateway: Arc<dyn FetchGateway> = Arc::new(GhGateway);

    let startup = match tui::startup::run_startup(
        &mut terminal,
        gateway.as_ref(),
        args.repo.as_deref(),
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            restore_terminal(&mut terminal)?;
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(repo) = &startup.repo {
        execute!(io::stdout(), SetTitle(format!("watching {repo}")))?;
    }

    let now = Instant::now();
    let mut state = AppState::new(
        AppConfig {
            interval: args.interval(),
            limit: args.limit(),
            version_string: cli::VERSION.to_string(),
        },
        now,
    );
    state.repo = startup.repo;
    state.repo_input.notice = startup.detection_error;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut pollers = Pollers::new(gateway, events.sender(), args.interval(), args.limit());
    pollers.dispatch(state.start(now));

    let result = run_app(&mut terminal, &mut state, events, &mut pollers).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    pollers: &mut Pollers,
) -> Result<()> {
    let mut title_repo = state.repo.clone();

    loop {
        terminal.draw(|f| tui::render::render(f, state))?;

        let Some(event) = events.next().await else {
            tracing::warn!("Event channel closed");
            return Ok(());
        };
        let now = Instant::now();

        match event {
            AppEvent::Key(key) => {
                let action = input::map_key(key, &InputContext { mode: state.mode });
                let commands = state.handle_action(action, now);
                pollers.dispatch(commands);
            }
            AppEvent::Resize => {}
            AppEvent::Tick => {
                state.advance_spinner();
                state.tick(now);
            }
            AppEvent::RunsFetchStarted { ticket, at } => {
                state.runs_fetch_started(ticket, at);
            }
            AppEvent::DetailFetchStarted { ticket, at } => {
                state.detail_fetch_started(ticket, at);
            }
            AppEvent::RunsFetched { ticket, result } => {
                let outcome = state.apply_runs(ticket, result);
                tracing::debug!(?outcome, version = state.runs.version(), "List poll applied");
            }
            AppEvent::DetailFetched { ticket, result } => {
                let outcome = state.apply_detail(ticket, result);
                tracing::debug!(?outcome, version = state.detail.version(), "Detail poll applied");
            }
            AppEvent::Error(e) => tracing::warn!("{e}"),
        }

        if state.repo != title_repo {
            title_repo = state.repo.clone();
            if let Some(repo) = &title_repo {
                execute!(io::stdout(), SetTitle(format!("watching {repo}")))?;
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}
