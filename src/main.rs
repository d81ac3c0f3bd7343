//! userdesk binary entry point.
//!
//! Parses flags, starts the network runtime, initializes the terminal in raw
//! mode, runs the TUI event loop, and restores the terminal state on exit.
//!
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use userdesk::api::UserClient;
use userdesk::app::requests::TokioRequests;
use userdesk::app::{self, AppState};
use userdesk::config::{Cli, Settings};
use userdesk::{Result, logging};

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_file.as_deref())?;
    let settings = Settings::load(&cli)?;
    let client = UserClient::new(&settings.api_base)?;
    tracing::info!(api_base = %client.base(), page_size = settings.page_size, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("userdesk-net")
        .build()?;
    let (requests, mut completions) = TokioRequests::new(client, runtime.handle().clone());
    let mut state = AppState::new(&settings);

    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;

    let res = app::run(&mut terminal, &mut state, &requests, &mut completions);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();
    runtime.shutdown_background();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
