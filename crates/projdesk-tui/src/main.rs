//! Projdesk TUI - interactive edit view for a single project
//!
//! Fetches the project, lets the user edit it field by field, and saves it
//! back. Requests run on background tasks; their results come back to the
//! event loop over a channel.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use projdesk_core::config::Config;
use projdesk_core::edit::{ProjectEditView, SaveRequest};
use projdesk_core::resource::{HttpProvider, MemoryProvider, ResourceProvider};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::app::{App, AppCommand, AppMessage, NOTIFICATION_TTL};

const LOG_FILE: &str = "projdesk-tui.log";

#[derive(Parser)]
#[command(name = "projdesk-tui")]
#[command(author, version, about = "Interactive project edit view", long_about = None)]
struct Args {
    /// Project ID
    id: i64,

    /// Serve records from a JSON fixtures file instead of the API
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::load()?;
    init_logging()?;

    let provider: Arc<dyn ResourceProvider> = match &args.fixtures {
        Some(path) => Arc::new(MemoryProvider::from_fixtures_file(path)?),
        None => Arc::new(HttpProvider::from_config(&config.api)?),
    };
    let app = App::new(ProjectEditView::new(config.api.resource.clone(), args.id));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app, provider).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file in the config dir; the terminal belongs to the UI
fn init_logging() -> anyhow::Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("projdesk=info".parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    provider: Arc<dyn ResourceProvider>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pending_save: Option<JoinHandle<()>> = None;

    let ticket = app.view.begin_load();
    {
        let provider = Arc::clone(&provider);
        let tx = tx.clone();
        let resource = app.view.resource().to_string();
        let id = app.view.id();
        tokio::spawn(async move {
            let result = provider.get_one(&resource, id).await;
            let _ = tx.send(AppMessage::Loaded(ticket, result));
        });
    }

    loop {
        while let Ok(message) = rx.try_recv() {
            app.handle_message(message);
        }
        app.expire_notifications(Instant::now(), NOTIFICATION_TTL);

        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key) {
                    AppCommand::Quit => {
                        // Ctrl+C may leave while an update is in flight; let it land
                        if let Some(handle) = pending_save.take() {
                            if !handle.is_finished() {
                                info!(id = app.view.id(), "Waiting for pending save");
                            }
                            let _ = handle.await;
                        }
                        info!(id = app.view.id(), "Edit view closed");
                        return Ok(());
                    }
                    AppCommand::Save(request) => {
                        pending_save = Some(spawn_save(&provider, &tx, request));
                    }
                    AppCommand::None => {}
                }
            }
        }
    }
}

fn spawn_save(
    provider: &Arc<dyn ResourceProvider>,
    tx: &mpsc::UnboundedSender<AppMessage>,
    request: SaveRequest,
) -> JoinHandle<()> {
    let provider = Arc::clone(provider);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = provider
            .update(&request.resource, request.id, request.payload)
            .await;
        let _ = tx.send(AppMessage::Saved(result));
    })
}

#[cfg(test)]
mod main_tests;
