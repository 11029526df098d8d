mod app;
mod persist;
mod store;
mod ui;
mod view;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ticklist", about = "A to-do list for the terminal")]
struct Cli {
    /// Path to the save file
    #[arg(long, default_value = "tasks.redb")]
    db: String,
    /// Path to the log file (stdout belongs to the TUI)
    #[arg(long, default_value = "ticklist.log")]
    log: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // ── Boot the store ─────────────────────────────────────────
    // Opening the save file is the one fatal error path; everything after
    // boot surfaces as a recoverable status message instead.
    let save_file = persist::SaveFile::open(&cli.db)?;
    let store = store::TaskStore::open(save_file)?;
    tracing::info!(db = %cli.db, tasks = store.list().len(), "store loaded");

    let mut app = app::App::new(store);

    // ── Terminal ───────────────────────────────────────────────
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, &mut app);

    // Restore the terminal on both the quit and the error path.
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut app::App,
) -> Result<(), Box<dyn Error>> {
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}
